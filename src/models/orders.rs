// ============================================================================
// MODÈLE : ORDERS
// ============================================================================
//
// Une commande = un checkout payé. Créée uniquement après confirmation de
// la passerelle de paiement (pas d'état "pending").
//
// Colonnes:
//   - buyer_id : FK vers users
//   - payment : résultat de la vente (JSON, voir models::payment)
//   - status : un des OrderStatus, "Not Process" par défaut
//   - created_at : tri chronologique des listes
//
// Les produits commandés sont dans order_items (références, pas de copie).
//
// ============================================================================

use sea_orm::Iterable;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::payment::PaymentResult;

/// Statuts possibles. Les libellés exacts font partie du contrat HTTP.
/// Toutes les transitions sont permises (correction manuelle par l'admin).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum OrderStatus {
    #[default]
    #[sea_orm(string_value = "Not Process")]
    #[serde(rename = "Not Process")]
    NotProcess,
    #[sea_orm(string_value = "Not Processed")]
    #[serde(rename = "Not Processed")]
    NotProcessed,
    #[sea_orm(string_value = "Processing")]
    Processing,
    #[sea_orm(string_value = "Shipped")]
    Shipped,
    #[sea_orm(string_value = "Delivered")]
    Delivered,
    #[sea_orm(string_value = "Cancelled")]
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::NotProcess => "Not Process",
            OrderStatus::NotProcessed => "Not Processed",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// Correspondance exacte (casse et espaces compris)
    pub fn parse(value: &str) -> Option<Self> {
        OrderStatus::iter().find(|status| status.as_str() == value)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub buyer_id: i32,
    #[sea_orm(column_type = "Json")]
    pub payment: PaymentResult,
    pub status: OrderStatus,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::BuyerId",
        to = "super::users::Column::Id"
    )]
    Buyer,

    #[sea_orm(has_many = "super::order_items::Entity")]
    Items,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Buyer.def()
    }
}

impl Related<super::order_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
