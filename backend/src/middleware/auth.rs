//! Authentication middleware
//!
//! Validates the bearer token and attaches the resulting [`Session`] to the
//! request. Role checks happen in the handlers against that session.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};

use shared::session::{AccessDenied, Session};

use crate::error::AppError;
use crate::services::AuthService;
use crate::AppState;

/// Authentication middleware that validates JWT tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let Some(token) = token else {
        return AppError::AccessDenied(AccessDenied::SignedOut).into_response();
    };

    let auth_service = AuthService::new(&state.config.auth);
    let user = match auth_service.validate_token(token) {
        Ok(user) => user,
        Err(err) => return err.into_response(),
    };

    request.extensions_mut().insert(Session::signed_in(user));
    next.run(request).await
}

/// Extractor for the session of the current request
///
/// Outside the authentication middleware the session is anonymous.
#[derive(Clone, Debug)]
pub struct CurrentSession(pub Session);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        Ok(CurrentSession(
            parts.extensions.get::<Session>().cloned().unwrap_or_default(),
        ))
    }
}
