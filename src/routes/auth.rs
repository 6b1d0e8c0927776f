use actix_web::{HttpResponse, get, post, put, web};
use sea_orm::DatabaseConnection;
use serde_json::json;

use crate::config::AppConfig;
use crate::error::{AppError, WithMessage};
use crate::middleware::{AdminUser, AuthUser};
use crate::models::dto::{
    AuthResponse, ForgotPasswordRequest, LoginRequest, OrderStatusRequest, RegisterRequest,
    UpdateProfileRequest,
};
use crate::models::orders::OrderStatus;
use crate::services::auth_service::AuthService;
use crate::services::order_service::OrderService;

/// POST /auth/register - Créer un compte (PUBLIC)
#[post("/register")]
pub async fn register(
    body: web::Json<RegisterRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let user = AuthService::register(db.get_ref(), body.into_inner())
        .await
        .with_message("Error in Registration")?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "User Register Successfully",
        "user": user,
    })))
}

/// POST /auth/login - Se connecter (PUBLIC)
#[post("/login")]
pub async fn login(
    body: web::Json<LoginRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    let (user, token) = AuthService::login(db.get_ref(), config.get_ref(), body.into_inner())
        .await
        .with_message("Error in login")?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        success: true,
        message: "Login successfully".to_string(),
        user,
        token,
    }))
}

/// POST /auth/forgot-password - Reset par question secrète (PUBLIC)
#[post("/forgot-password")]
pub async fn forgot_password(
    body: web::Json<ForgotPasswordRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    AuthService::forgot_password(db.get_ref(), body.into_inner())
        .await
        .with_message("Something went wrong")?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Password Reset Successfully",
    })))
}

/// PUT /auth/profile - Modifier son profil (PROTÉGÉ)
#[put("/profile")]
pub async fn update_profile(
    auth: AuthUser,
    body: web::Json<UpdateProfileRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let user = AuthService::update_profile(db.get_ref(), auth.user_id, body.into_inner())
        .await
        .with_message("Error while updating profile")?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Profile Updated Successfully",
        "updatedUser": user,
    })))
}

/// GET /auth/user-auth - Session valide ?
#[get("/user-auth")]
pub async fn user_auth(_auth: AuthUser) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "ok": true }))
}

/// GET /auth/admin-auth - Session admin ?
#[get("/admin-auth")]
pub async fn admin_auth(_admin: AdminUser) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "ok": true }))
}

/// GET /auth/orders - Commandes de l'utilisateur connecté
#[get("/orders")]
pub async fn orders(
    auth: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let mine = OrderService::orders_for_buyer(db.get_ref(), auth.user_id)
        .await
        .with_message("Error While Getting Orders")?;

    Ok(HttpResponse::Ok().json(mine))
}

/// GET /auth/all-orders - Toutes les commandes (ADMIN)
#[get("/all-orders")]
pub async fn all_orders(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let all = OrderService::all_orders(db.get_ref())
        .await
        .with_message("Error While Getting Orders")?;

    Ok(HttpResponse::Ok().json(all))
}

/// PUT /auth/order-status/{orderId} - Changer le statut (ADMIN)
#[put("/order-status/{order_id}")]
pub async fn order_status(
    admin: AdminUser,
    path: web::Path<i32>,
    body: web::Json<OrderStatusRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let status = OrderStatus::parse(&body.status)
        .ok_or_else(|| AppError::Validation("Invalid order status".to_string()))?;

    let order = OrderService::update_status(db.get_ref(), order_id, status)
        .await
        .with_message("Error While Updating Order")?;

    match order {
        Some(order) => Ok(HttpResponse::Ok().json(order)),
        None => {
            tracing::warn!(order_id, admin_id = admin.user.id, "status update on unknown order");
            Err(AppError::NotFound("Order not found".to_string()))
        }
    }
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(register)
            .service(login)
            .service(forgot_password)
            .service(update_profile)
            .service(user_auth)
            .service(admin_auth)
            .service(orders)
            .service(all_orders)
            .service(order_status),
    );
}
