// ============================================================================
// RÈGLES DE VALIDATION DES FORMULAIRES
// ============================================================================
//
// Règles partagées entre création et mise à jour (produits, catégories,
// comptes). Chaque fonction renvoie le message exact affiché au client.
//
// Points d'attention:
//   - Le prix est validé sur son texte: "10.500" est refusé (3 décimales)
//   - Photo: 1 MB max, types image limités à ALLOWED_PHOTO_TYPES
//
// ============================================================================

use std::str::FromStr;

use base64::{Engine, engine::general_purpose::STANDARD};
use rust_decimal::Decimal;
use serde_json::Value;
use validator::ValidateEmail;

use super::slug::slugify;

pub const MAX_PHOTO_BYTES: usize = 1_000_000;
pub const ALLOWED_PHOTO_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Renvoie la valeur si elle est présente et non vide, sinon le message
pub fn required<'a>(value: Option<&'a str>, message: &str) -> Result<&'a str, String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(message.to_string()),
    }
}

pub fn is_valid_email(email: &str) -> bool {
    email.validate_email()
}

pub fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

pub fn validate_category_name(name: Option<&str>) -> Result<String, String> {
    let name = required(name, "Name is required")?.trim();

    if name.chars().all(|c| c.is_numeric()) {
        return Err("Category name cannot contain only numbers".to_string());
    }
    if !name.chars().any(|c| c.is_alphanumeric()) {
        return Err("Category name cannot contain only symbols".to_string());
    }
    ensure_sluggable(name)?;

    Ok(name.to_string())
}

/// Le slug sert d'identifiant d'URL: il ne peut pas être vide
pub fn ensure_sluggable(name: &str) -> Result<(), String> {
    if slugify(name).is_empty() {
        return Err("Name must contain at least one latin letter or digit".to_string());
    }
    Ok(())
}

/// Prix: obligatoire, strictement positif, au plus 2 décimales
pub fn parse_price(value: Option<&Value>) -> Result<Decimal, String> {
    let text = match value {
        None | Some(Value::Null) => return Err("Price is Required".to_string()),
        Some(Value::String(s)) if s.trim().is_empty() => {
            return Err("Price is Required".to_string());
        }
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(_) => return Err("Price must be a positive number".to_string()),
    };

    let price = Decimal::from_str(&text).map_err(|_| "Price must be a positive number".to_string())?;

    if price <= Decimal::ZERO {
        return Err("Price must be a positive number".to_string());
    }
    if price.scale() > 2 {
        return Err("Price can have at most 2 decimal places".to_string());
    }

    Ok(price)
}

/// Quantité: obligatoire, entier, jamais négatif
pub fn parse_quantity(value: Option<&Value>) -> Result<i32, String> {
    let invalid = || "Quantity must be a non-negative integer".to_string();

    let quantity = match value {
        None | Some(Value::Null) => return Err("Quantity is Required".to_string()),
        Some(Value::String(s)) if s.trim().is_empty() => {
            return Err("Quantity is Required".to_string());
        }
        Some(Value::String(s)) => s.trim().parse::<i64>().map_err(|_| invalid())?,
        Some(Value::Number(n)) => n.as_i64().ok_or_else(invalid)?,
        Some(_) => return Err(invalid()),
    };

    if quantity < 0 {
        return Err(invalid());
    }

    i32::try_from(quantity).map_err(|_| invalid())
}

/// Décode une photo envoyée en base64 et applique les limites taille/type
pub fn decode_photo(data: &str, content_type: &str) -> Result<Vec<u8>, String> {
    if !ALLOWED_PHOTO_TYPES.contains(&content_type.trim().to_ascii_lowercase().as_str()) {
        return Err("Photo must be a JPEG, PNG, GIF or WEBP image".to_string());
    }

    // Taille décodée ~ 3/4 de la taille base64: refus avant décodage si trop gros
    if data.len() / 4 * 3 > MAX_PHOTO_BYTES + 3 {
        return Err("Photo should be less than 1MB".to_string());
    }

    let bytes = STANDARD
        .decode(data.trim())
        .map_err(|_| "Photo data is not valid base64".to_string())?;

    if bytes.len() > MAX_PHOTO_BYTES {
        return Err("Photo should be less than 1MB".to_string());
    }

    Ok(bytes)
}

/// Règle serveur pour le changement de mot de passe: longueur seulement
pub fn validate_new_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        ));
    }
    Ok(())
}
