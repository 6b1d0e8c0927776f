// ============================================================================
// CONFIGURATION
// ============================================================================
//
// Description:
//   Lecture de la configuration depuis les variables d'environnement
//   (chargées depuis .env par dotenv dans main.rs).
//
// Variables:
//   - DATABASE_URL (obligatoire)
//   - HOST / PORT (défaut 127.0.0.1:8080)
//   - JWT_SECRET (défaut INSECURE avec warning), JWT_TTL_HOURS (défaut 168)
//   - AUTO_MIGRATE (défaut false) : crée les tables manquantes au démarrage
//   - BRAINTREE_ENVIRONMENT / BRAINTREE_MERCHANT_ID / BRAINTREE_PUBLIC_KEY /
//     BRAINTREE_PRIVATE_KEY
//   - PRODUCT_DELETE_POLICY : "unconditional" (défaut) ou "reject-if-ordered"
//
// ============================================================================

use std::env;
use std::str::FromStr;

use thiserror::Error;

const DEFAULT_JWT_SECRET: &str = "default-insecure-key-change-this";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set in .env file")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Que faire quand on supprime un produit encore référencé par une commande
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductDeletePolicy {
    /// Suppression directe, les commandes gardent une référence orpheline
    #[default]
    Unconditional,
    /// Refus tant qu'une commande référence le produit
    RejectIfOrdered,
}

impl FromStr for ProductDeletePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unconditional" => Ok(Self::Unconditional),
            "reject-if-ordered" => Ok(Self::RejectIfOrdered),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BraintreeEnvironment {
    #[default]
    Sandbox,
    Production,
}

impl BraintreeEnvironment {
    pub fn graphql_url(&self) -> &'static str {
        match self {
            Self::Sandbox => "https://payments.sandbox.braintree-api.com/graphql",
            Self::Production => "https://payments.braintree-api.com/graphql",
        }
    }
}

impl FromStr for BraintreeEnvironment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Ok(Self::Sandbox),
            "production" => Ok(Self::Production),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BraintreeConfig {
    pub environment: BraintreeEnvironment,
    pub merchant_id: String,
    pub public_key: String,
    pub private_key: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub auto_migrate: bool,
    pub braintree: BraintreeConfig,
    pub product_delete_policy: ProductDeletePolicy,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not found in .env, using default (INSECURE)");
            DEFAULT_JWT_SECRET.to_string()
        });

        Ok(Self {
            database_url,
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT", 8080)?,
            jwt_secret,
            jwt_ttl_hours: parse_var("JWT_TTL_HOURS", 168)?,
            auto_migrate: parse_var("AUTO_MIGRATE", false)?,
            braintree: BraintreeConfig {
                environment: parse_var("BRAINTREE_ENVIRONMENT", BraintreeEnvironment::Sandbox)?,
                merchant_id: env::var("BRAINTREE_MERCHANT_ID").unwrap_or_default(),
                public_key: env::var("BRAINTREE_PUBLIC_KEY").unwrap_or_default(),
                private_key: env::var("BRAINTREE_PRIVATE_KEY").unwrap_or_default(),
            },
            product_delete_policy: parse_var(
                "PRODUCT_DELETE_POLICY",
                ProductDeletePolicy::Unconditional,
            )?,
        })
    }

    /// Configuration minimale pour les tests (pas de lecture d'env)
    pub fn for_tests(database_url: &str) -> Self {
        Self {
            database_url: database_url.to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            jwt_secret: "test-secret".to_string(),
            jwt_ttl_hours: 1,
            auto_migrate: true,
            braintree: BraintreeConfig::default(),
            product_delete_policy: ProductDeletePolicy::Unconditional,
        }
    }
}

fn parse_var<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(default),
    }
}
