// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Liste des modules:
//   - health : Health check API
//   - users : Comptes (client / admin)
//   - categories : Catégories de produits
//   - products : Produits (sans la photo)
//   - product_photos : Photos des produits (binaire + content-type)
//   - orders : Commandes payées et leur statut
//   - order_items : Références produits de chaque commande (ordre du panier)
//   - payment : Résultat de vente de la passerelle (JSON dans orders)
//   - dto : Requêtes / réponses de l'API
//
// Points d'attention:
//   - Aucune FK entre order_items et products (références orphelines possibles)
//   - Les listes de produits n'incluent jamais la photo
//
// ============================================================================

pub mod categories;
pub mod dto;
pub mod health;
pub mod order_items;
pub mod orders;
pub mod payment;
pub mod product_photos;
pub mod products;
pub mod users;
