pub mod auth;
pub mod category;
pub mod health;
pub mod product;

use actix_web::{error, web};

use crate::error::AppError;

// Le base64 d'une photo de 1MB dépasse largement la limite par défaut
const JSON_LIMIT: usize = 4 * 1024 * 1024;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .app_data(json_config())
            .service(health::health_check)
            .configure(auth::auth_routes)
            .configure(category::category_routes)
            .configure(product::product_routes),
    );
}

/// Les corps JSON illisibles sortent au même format que les autres erreurs
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT)
        .error_handler(|err, _req| {
            let message = match &err {
                error::JsonPayloadError::OverflowKnownLength { .. }
                | error::JsonPayloadError::Overflow { .. } => "Request body is too large".to_string(),
                other => format!("Invalid request body: {}", other),
            };
            AppError::Validation(message).into()
        })
}
