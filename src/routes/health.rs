use actix_web::{HttpResponse, get, web};
use chrono::Utc;
use sea_orm::DatabaseConnection;

use crate::models::health::HealthResponse;

#[get("/health")]
pub async fn health_check(db: web::Data<DatabaseConnection>) -> HttpResponse {
    let database = match db.ping().await {
        Ok(()) => "up",
        Err(e) => {
            tracing::error!(error = %e, "database ping failed");
            "down"
        }
    };

    let response = HealthResponse {
        status: "ok",
        database,
        time: Utc::now(),
    };

    HttpResponse::Ok().json(response)
}
