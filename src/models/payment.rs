use rust_decimal::Decimal;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

/// Résultat d'une vente renvoyé par la passerelle de paiement.
/// Stocké tel quel (JSON) dans orders.payment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct PaymentResult {
    pub success: bool,
    pub transaction: Option<PaymentTransaction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentTransaction {
    pub id: String,
    pub amount: Decimal,
    pub status: String,
}
