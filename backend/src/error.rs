//! Error handling for the Landed Cost Dashboard API
//!
//! Provides consistent error responses in English and French, optionally
//! carrying the side-effect commands the client should run.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use shared::effects::Effect;
use shared::session::AccessDenied;
use shared::validation::FieldErrors;

use crate::records::RecordError;
use crate::store::StoreError;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Access denied: {0}")]
    AccessDenied(#[from] AccessDenied),

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Deletion refused because other records depend on the target
    #[error("Restricted: {0}")]
    Restricted(String),

    // Record store errors
    #[error("{message_fr}")]
    Store {
        message_fr: &'static str,
        #[source]
        source: StoreError,
    },

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<Effect>,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_fr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}

impl ErrorDetail {
    fn new(code: &str, message_en: impl Into<String>, message_fr: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message_en: message_en.into(),
            message_fr: message_fr.into(),
            field: None,
            fields: None,
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials | AppError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            AppError::AccessDenied(AccessDenied::SignedOut) => StatusCode::UNAUTHORIZED,
            AppError::AccessDenied(AccessDenied::WrongRole { .. }) => StatusCode::FORBIDDEN,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Restricted(_) => StatusCode::CONFLICT,
            AppError::Store { .. } => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Commands the client should run alongside the error
    pub fn effects(&self) -> Vec<Effect> {
        match self {
            AppError::AccessDenied(denied) => denied.effects(),
            AppError::Restricted(message) => vec![Effect::warning(message.clone())],
            AppError::Store { message_fr, .. } => vec![Effect::error(*message_fr)],
            AppError::InvalidToken(_) => AccessDenied::SignedOut.effects(),
            _ => Vec::new(),
        }
    }

    fn detail(&self) -> ErrorDetail {
        match self {
            AppError::InvalidCredentials => ErrorDetail::new(
                "INVALID_CREDENTIALS",
                "Invalid email or password",
                "Email ou mot de passe incorrect",
            ),
            AppError::InvalidToken(_) => ErrorDetail::new(
                "INVALID_TOKEN",
                "Invalid or expired token",
                "Session invalide ou expirée",
            ),
            AppError::AccessDenied(AccessDenied::SignedOut) => ErrorDetail::new(
                "UNAUTHORIZED",
                "Authentication required",
                "Vous devez être connecté",
            ),
            AppError::AccessDenied(AccessDenied::WrongRole { .. }) => ErrorDetail::new(
                "FORBIDDEN",
                "This section is reserved to administrators",
                "Cette section est réservée aux administrateurs",
            ),
            AppError::Validation(fields) => {
                let mut detail = ErrorDetail::new(
                    "VALIDATION_ERROR",
                    "Some fields are invalid",
                    "Certains champs sont invalides",
                );
                detail.field = fields.fields().next().map(|(field, _)| field.to_string());
                detail.fields = Some(fields.clone());
                detail
            }
            AppError::BadRequest(msg) => ErrorDetail::new(
                "BAD_REQUEST",
                msg.clone(),
                format!("Requête invalide : {}", msg),
            ),
            AppError::NotFound(resource) => ErrorDetail::new(
                "NOT_FOUND",
                format!("{} not found", resource),
                format!("{} introuvable", resource),
            ),
            AppError::Restricted(message) => ErrorDetail::new(
                "RESTRICTED",
                "The record is still referenced by other records",
                message.clone(),
            ),
            AppError::Store { message_fr, .. } => ErrorDetail::new(
                "STORE_ERROR",
                "The record store request failed",
                *message_fr,
            ),
            AppError::Internal(_) => ErrorDetail::new(
                "INTERNAL_ERROR",
                "An internal server error occurred",
                "Une erreur interne est survenue",
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        let body = ErrorResponse {
            error: self.detail(),
            effects: self.effects(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<RecordError> for AppError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::Store { message, source } => AppError::Store {
                message_fr: message,
                source,
            },
            RecordError::Invalid(fields) => AppError::Validation(fields),
            RecordError::Malformed(message) => AppError::BadRequest(message),
            RecordError::Restricted(message) => AppError::Restricted(message),
            RecordError::NotFound(key) => AppError::NotFound(key),
        }
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
