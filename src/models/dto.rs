// Requêtes et réponses structurées de l'API
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::orders::OrderStatus;
use super::payment::PaymentResult;
use super::{categories, products, users};

// ---------------------------------------------------------------- auth

#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub answer: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    pub email: Option<String>,
    pub answer: Option<String>,
    pub new_password: Option<String>,
}

/// `email` est accepté mais ignoré: l'email ne change jamais
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub user: users::Model,
    pub token: String,
}

// ---------------------------------------------------------------- catalogue

#[derive(Debug, Default, Deserialize)]
pub struct CategoryRequest {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoUpload {
    pub data: String, // base64
    pub content_type: String,
}

/// Formulaire produit. Prix et quantité arrivent en nombre ou en texte
/// (formulaires HTML), ils sont validés par utils::validation.
#[derive(Debug, Default, Deserialize)]
pub struct ProductForm {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Value>,
    pub category: Option<i32>,
    pub quantity: Option<Value>,
    pub shipping: Option<bool>,
    pub photo: Option<PhotoUpload>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductFilterRequest {
    #[serde(default)]
    pub checked: Vec<i32>, // ids de catégories
    #[serde(default)]
    pub radio: Vec<Decimal>, // [min, max]
}

/// Produit avec sa catégorie résolue (sans photo)
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: products::Model,
    pub category: Option<categories::Model>,
}

impl From<(products::Model, Option<categories::Model>)> for ProductView {
    fn from((product, category): (products::Model, Option<categories::Model>)) -> Self {
        ProductView { product, category }
    }
}

// ---------------------------------------------------------------- commandes

/// Ligne de panier envoyée par le client. Le prix éventuel est ignoré:
/// le total est recalculé depuis la BD.
#[derive(Debug, Clone, Deserialize)]
pub struct CartItem {
    #[serde(alias = "_id")]
    pub id: i32,
}

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub nonce: String,
    #[serde(default)]
    pub cart: Vec<CartItem>,
}

#[derive(Debug, Deserialize)]
pub struct OrderStatusRequest {
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuyerSummary {
    pub id: i32,
    pub name: String,
    pub email: String,
}

impl From<users::Model> for BuyerSummary {
    fn from(user: users::Model) -> Self {
        BuyerSummary {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    pub id: i32,
    pub products: Vec<products::Model>,
    pub buyer: Option<BuyerSummary>,
    pub payment: PaymentResult,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
