//! Erreurs applicatives et leur traduction en réponse HTTP.
//!
//! Toutes les erreurs sortent au format `{"success": false, "message": ...}`.
//! Les erreurs amont (BD, passerelle de paiement) sont loguées avec leur
//! source et renvoyées avec un message générique.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;

use crate::services::payment::PaymentError;

#[derive(Debug, Error)]
pub enum AppError {
    /// Entrée manquante ou invalide
    #[error("{0}")]
    Validation(String),

    /// Refus "métier" renvoyé en 200 avec success:false (email déjà pris, etc.)
    #[error("{0}")]
    Rejected(String),

    #[error("{0}")]
    NotFound(String),

    /// Refus qui dépend de l'état (catégorie encore utilisée, etc.)
    #[error("{0}")]
    Conflict(String),

    /// Session absente ou invalide
    #[error("{0}")]
    Unauthenticated(String),

    /// Session valide mais rôle insuffisant
    #[error("{0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),

    #[error("{message}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    pub fn internal(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        AppError::Internal {
            message: message.into(),
            source: source.into(),
        }
    }
}

/// Attache un message générique (propre à l'endpoint) aux erreurs amont.
/// Les erreurs "métier" restent intactes.
pub trait WithMessage<T> {
    fn with_message(self, message: &str) -> Result<T, AppError>;
}

impl<T> WithMessage<T> for Result<T, AppError> {
    fn with_message(self, message: &str) -> Result<T, AppError> {
        self.map_err(|err| match err {
            AppError::Database(e) => AppError::internal(message, e),
            AppError::Payment(e) => AppError::internal(message, e),
            other => other,
        })
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    message: &'a str,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::Rejected(_) => StatusCode::OK,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Database(_) | AppError::Payment(_) | AppError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Database(e) => {
                tracing::error!(error = %e, "database error");
                "Something went wrong"
            }
            AppError::Payment(e) => {
                tracing::error!(error = %e, "payment gateway error");
                "Payment failed"
            }
            AppError::Internal { message, source } => {
                tracing::error!(error = %source, "{}", message);
                message.as_str()
            }
            AppError::Validation(m)
            | AppError::Rejected(m)
            | AppError::NotFound(m)
            | AppError::Conflict(m)
            | AppError::Unauthenticated(m)
            | AppError::Forbidden(m) => m.as_str(),
        };

        HttpResponse::build(self.status_code()).json(ErrorBody {
            success: false,
            message,
        })
    }
}
