// ============================================================================
// SERVICE : COMMANDES
// ============================================================================
//
// Workflow du checkout (place_order):
//   1. Vérifier le panier (non vide, produits existants)
//   2. Calculer le total depuis les prix en BD (jamais ceux du client)
//   3. Débiter via la passerelle de paiement
//   4. Si succès: insérer la commande + ses lignes dans une transaction
//      Si échec: rien n'est écrit
//
// Statut: ensemble plat, toute transition est permise.
//
// ============================================================================

use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::*;

use crate::error::AppError;
use crate::models::dto::{BuyerSummary, CartItem, OrderView};
use crate::models::orders::OrderStatus;
use crate::models::{order_items, orders, products, users};
use crate::services::payment::{PaymentError, PaymentGateway};

pub struct OrderService;

impl OrderService {
    pub async fn place_order(
        db: &DatabaseConnection,
        gateway: &dyn PaymentGateway,
        buyer_id: i32,
        cart: &[CartItem],
        nonce: &str,
    ) -> Result<orders::Model, AppError> {
        if cart.is_empty() {
            return Err(AppError::Validation("Cart is empty".to_string()));
        }
        if nonce.trim().is_empty() {
            return Err(AppError::Validation("Payment nonce is required".to_string()));
        }

        // Un token encore valide peut survivre à son utilisateur: pas de débit dans ce cas
        if users::Entity::find_by_id(buyer_id).one(db).await?.is_none() {
            return Err(AppError::Unauthenticated("User not found".to_string()));
        }

        // 1. Prix de référence depuis la BD
        let product_ids: Vec<i32> = cart.iter().map(|item| item.id).collect();
        let unique_ids: BTreeSet<i32> = product_ids.iter().copied().collect();
        let prices: HashMap<i32, Decimal> = products::Entity::find()
            .filter(products::Column::Id.is_in(unique_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|p| (p.id, p.price))
            .collect();

        // 2. Total: une ligne de panier = une unité
        let mut total = Decimal::ZERO;
        for id in &product_ids {
            match prices.get(id) {
                Some(price) => total += *price,
                None => return Err(AppError::Validation("Product not found".to_string())),
            }
        }

        // 3. Paiement
        let payment = gateway.sale(total, nonce).await?;
        if !payment.success {
            let reason = payment
                .message
                .clone()
                .unwrap_or_else(|| "payment declined".to_string());
            tracing::warn!(%total, %reason, "payment not accepted, no order written");
            return Err(PaymentError::Gateway(reason).into());
        }
        let transaction_id = payment
            .transaction
            .as_ref()
            .map(|t| t.id.clone())
            .unwrap_or_default();

        // 4. Commande + lignes
        let txn = db.begin().await?;
        let now = Utc::now();
        let order = orders::ActiveModel {
            buyer_id: Set(buyer_id),
            payment: Set(payment),
            status: Set(OrderStatus::default()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .inspect_err(|e| {
            tracing::error!(error = %e, %transaction_id, "payment captured but order insert failed")
        })?;

        let items = product_ids
            .iter()
            .enumerate()
            .map(|(position, product_id)| order_items::ActiveModel {
                order_id: Set(order.id),
                product_id: Set(*product_id),
                position: Set(position as i32),
                ..Default::default()
            });
        order_items::Entity::insert_many(items).exec(&txn).await?;
        txn.commit().await?;

        tracing::info!(order_id = order.id, %total, %transaction_id, "order placed");
        Ok(order)
    }

    /// Écrase le statut et renvoie la commande APRÈS écriture.
    /// `None` si la commande n'existe pas (échec "doux", à gérer par l'appelant).
    pub async fn update_status(
        db: &DatabaseConnection,
        order_id: i32,
        status: OrderStatus,
    ) -> Result<Option<orders::Model>, AppError> {
        let Some(order) = orders::Entity::find_by_id(order_id).one(db).await? else {
            return Ok(None);
        };

        let previous = order.status;
        let mut active: orders::ActiveModel = order.into();
        active.status = Set(status);
        active.updated_at = Set(Utc::now());
        let order = active.update(db).await?;

        tracing::info!(
            order_id,
            from = previous.as_str(),
            to = status.as_str(),
            "order status updated"
        );
        Ok(Some(order))
    }

    /// Commandes d'un acheteur, plus récentes d'abord
    pub async fn orders_for_buyer(
        db: &DatabaseConnection,
        buyer_id: i32,
    ) -> Result<Vec<OrderView>, AppError> {
        let orders = orders::Entity::find()
            .filter(orders::Column::BuyerId.eq(buyer_id))
            .order_by_desc(orders::Column::CreatedAt)
            .order_by_desc(orders::Column::Id)
            .all(db)
            .await?;
        Self::resolve(db, orders).await
    }

    /// Toutes les commandes (admin), plus récentes d'abord
    pub async fn all_orders(db: &DatabaseConnection) -> Result<Vec<OrderView>, AppError> {
        let orders = orders::Entity::find()
            .order_by_desc(orders::Column::CreatedAt)
            .order_by_desc(orders::Column::Id)
            .all(db)
            .await?;
        Self::resolve(db, orders).await
    }

    /// Résout produits (sans photo, dans l'ordre du panier) et acheteur.
    /// Un produit supprimé depuis la commande est simplement absent.
    async fn resolve(
        db: &DatabaseConnection,
        orders: Vec<orders::Model>,
    ) -> Result<Vec<OrderView>, AppError> {
        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let order_ids: Vec<i32> = orders.iter().map(|o| o.id).collect();
        let items = order_items::Entity::find()
            .filter(order_items::Column::OrderId.is_in(order_ids))
            .order_by_asc(order_items::Column::OrderId)
            .order_by_asc(order_items::Column::Position)
            .all(db)
            .await?;

        let product_ids: BTreeSet<i32> = items.iter().map(|i| i.product_id).collect();
        let products: HashMap<i32, products::Model> = if product_ids.is_empty() {
            HashMap::new()
        } else {
            products::Entity::find()
                .filter(products::Column::Id.is_in(product_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|p| (p.id, p))
                .collect()
        };

        let buyer_ids: BTreeSet<i32> = orders.iter().map(|o| o.buyer_id).collect();
        let buyers: HashMap<i32, BuyerSummary> = users::Entity::find()
            .filter(users::Column::Id.is_in(buyer_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|u| (u.id, BuyerSummary::from(u)))
            .collect();

        let mut lines: HashMap<i32, Vec<products::Model>> = HashMap::new();
        for item in items {
            if let Some(product) = products.get(&item.product_id) {
                lines.entry(item.order_id).or_default().push(product.clone());
            }
        }

        Ok(orders
            .into_iter()
            .map(|order| OrderView {
                id: order.id,
                products: lines.remove(&order.id).unwrap_or_default(),
                buyer: buyers.get(&order.buyer_id).cloned(),
                payment: order.payment,
                status: order.status,
                created_at: order.created_at,
                updated_at: order.updated_at,
            })
            .collect())
    }
}
