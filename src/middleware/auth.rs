use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures::future::{LocalBoxFuture, Ready, ready};
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::users::{self, Role};
use crate::services::auth_service::AuthService;
use crate::utils::jwt;

/// Utilisateur authentifié par son JWT de session.
/// Utilisé comme extracteur dans les routes protégées.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: i32,
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthUser, AppError> {
    // 1. Header Authorization (token brut ou "Bearer <token>")
    let header = req
        .headers()
        .get("Authorization")
        .ok_or_else(|| AppError::Unauthenticated("Missing Authorization header".to_string()))?;

    let value = header
        .to_str()
        .map_err(|_| AppError::Unauthenticated("Invalid Authorization header".to_string()))?;

    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    if token.is_empty() {
        return Err(AppError::Unauthenticated("Missing token".to_string()));
    }

    // 2. Vérification de la signature et de l'expiration
    let config = req.app_data::<web::Data<AppConfig>>().ok_or_else(|| {
        AppError::internal("Something went wrong", anyhow::anyhow!("AppConfig not registered"))
    })?;

    let claims = jwt::verify_token(token, &config.jwt_secret).map_err(|e| {
        tracing::debug!(error = %e, "rejected session token");
        AppError::Unauthenticated("Invalid or expired token".to_string())
    })?;

    Ok(AuthUser {
        user_id: claims.sub,
    })
}

/// Utilisateur authentifié ET administrateur. Le rôle est relu en BD
/// à chaque requête (un admin rétrogradé perd l'accès immédiatement).
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub user: users::Model,
}

impl FromRequest for AdminUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let auth = authenticate(req);
        let db = req.app_data::<web::Data<DatabaseConnection>>().cloned();

        Box::pin(async move {
            let auth = auth?;
            let db = db.ok_or_else(|| {
                AppError::internal(
                    "Something went wrong",
                    anyhow::anyhow!("DatabaseConnection not registered"),
                )
            })?;

            let user = AuthService::require_role(db.get_ref(), auth.user_id, Role::Admin).await?;
            Ok(AdminUser { user })
        })
    }
}
