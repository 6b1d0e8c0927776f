use anyhow::anyhow;
use chrono::Utc;
use sea_orm::*;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::dto::{ForgotPasswordRequest, LoginRequest, RegisterRequest, UpdateProfileRequest};
use crate::models::users::{self, Role};
use crate::utils::validation::{self, required};
use crate::utils::{jwt, password};

pub struct AuthService;

fn invalid(message: String) -> AppError {
    AppError::Validation(message)
}

impl AuthService {
    /// Inscription: tous les champs sont vérifiés ici, la validation côté
    /// client n'est qu'un confort.
    #[tracing::instrument(skip_all, fields(email = ?request.email))]
    pub async fn register(
        db: &DatabaseConnection,
        request: RegisterRequest,
    ) -> Result<users::Model, AppError> {
        let name = required(request.name.as_deref(), "Name is Required").map_err(invalid)?;
        let email = required(request.email.as_deref(), "Email is Required").map_err(invalid)?;
        let plain_password =
            required(request.password.as_deref(), "Password is Required").map_err(invalid)?;
        let phone = required(request.phone.as_deref(), "Phone no is Required").map_err(invalid)?;
        let address =
            required(request.address.as_deref(), "Address is Required").map_err(invalid)?;
        let answer = required(request.answer.as_deref(), "Answer is Required").map_err(invalid)?;

        let email = email.trim();
        if !validation::is_valid_email(email) {
            return Err(invalid("Invalid Email".to_string()));
        }
        let phone = phone.trim();
        if !validation::is_digits(phone) {
            return Err(invalid("Phone number must contain only digits".to_string()));
        }

        // 1. Email déjà utilisé ?
        let existing = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(AppError::Rejected("Already Register please login".to_string()));
        }

        // 2. Hash du mot de passe
        let password_hash = password::hash_password(plain_password)
            .map_err(|e| AppError::internal("Error in Registration", anyhow!(e)))?;

        // 3. Création (la contrainte UNIQUE couvre une inscription concurrente)
        let now = Utc::now();
        let new_user = users::ActiveModel {
            name: Set(name.trim().to_string()),
            email: Set(email.to_string()),
            password_hash: Set(password_hash),
            phone: Set(phone.to_string()),
            address: Set(address.trim().to_string()),
            answer: Set(answer.trim().to_string()),
            role: Set(Role::Customer),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        match new_user.insert(db).await {
            Ok(user) => {
                tracing::info!(user_id = user.id, "user registered");
                Ok(user)
            }
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(AppError::Rejected("Already Register please login".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Connexion. "Email is not registerd" et "Invalid Password" restent
    /// volontairement distincts (comportement historique de l'API).
    pub async fn login(
        db: &DatabaseConnection,
        config: &AppConfig,
        request: LoginRequest,
    ) -> Result<(users::Model, String), AppError> {
        let (email, plain_password) = match (request.email.as_deref(), request.password.as_deref()) {
            (Some(e), Some(p)) if !e.trim().is_empty() && !p.is_empty() => (e.trim(), p),
            _ => return Err(invalid("Invalid email or password".to_string())),
        };

        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Email is not registerd".to_string()))?;

        let is_valid = password::verify_password(plain_password, &user.password_hash)
            .map_err(|e| AppError::internal("Error in login", anyhow!(e)))?;
        if !is_valid {
            return Err(AppError::Rejected("Invalid Password".to_string()));
        }

        let token = jwt::generate_token(user.id, &config.jwt_secret, config.jwt_ttl_hours)
            .map_err(|e| AppError::internal("Error in login", anyhow!(e)))?;

        Ok((user, token))
    }

    /// Reset par secret partagé: email ET réponse doivent correspondre
    pub async fn forgot_password(
        db: &DatabaseConnection,
        request: ForgotPasswordRequest,
    ) -> Result<(), AppError> {
        let email = required(request.email.as_deref(), "Email is required").map_err(invalid)?;
        let answer = required(request.answer.as_deref(), "Answer is required").map_err(invalid)?;
        let new_password = required(request.new_password.as_deref(), "New Password is required")
            .map_err(invalid)?;

        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email.trim()))
            .filter(users::Column::Answer.eq(answer.trim()))
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Wrong Email Or Answer".to_string()))?;

        let password_hash = password::hash_password(new_password)
            .map_err(|e| AppError::internal("Something went wrong", anyhow!(e)))?;

        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(password_hash);
        active.updated_at = Set(Utc::now());
        let user = active.update(db).await?;

        tracing::info!(user_id = user.id, "password reset");
        Ok(())
    }

    /// Mise à jour du profil. Mot de passe vide ou absent = inchangé.
    /// L'email n'est jamais modifié par ce chemin.
    pub async fn update_profile(
        db: &DatabaseConnection,
        user_id: i32,
        request: UpdateProfileRequest,
    ) -> Result<users::Model, AppError> {
        if let Some(p) = request.password.as_deref().filter(|p| !p.is_empty()) {
            validation::validate_new_password(p).map_err(invalid)?;
        }

        let user = users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let mut active: users::ActiveModel = user.into();

        if let Some(name) = non_empty(&request.name) {
            active.name = Set(name.to_string());
        }
        if let Some(phone) = non_empty(&request.phone) {
            if !validation::is_digits(phone) {
                return Err(invalid("Phone number must contain only digits".to_string()));
            }
            active.phone = Set(phone.to_string());
        }
        if let Some(address) = non_empty(&request.address) {
            active.address = Set(address.to_string());
        }
        if let Some(p) = request.password.as_deref().filter(|p| !p.is_empty()) {
            let hash = password::hash_password(p)
                .map_err(|e| AppError::internal("Error while updating profile", anyhow!(e)))?;
            active.password_hash = Set(hash);
        }
        active.updated_at = Set(Utc::now());

        Ok(active.update(db).await?)
    }

    /// Contrôle de rôle centralisé: la session doit désigner un utilisateur
    /// existant (sinon 401) qui possède le rôle demandé (sinon 403).
    pub async fn require_role(
        db: &DatabaseConnection,
        user_id: i32,
        role: Role,
    ) -> Result<users::Model, AppError> {
        let user = users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::Unauthenticated("User not found".to_string()))?;

        if user.role != role {
            tracing::warn!(user_id, required = ?role, "role check failed");
            return Err(AppError::Forbidden("UnAuthorized Access".to_string()));
        }

        Ok(user)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
