//! Authentication handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use shared::effects::Effect;
use shared::models::SessionUser;
use shared::session::{DASHBOARD_PATH, LOGIN_PATH};
use shared::validation::check_form;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentSession;
use crate::services::AuthService;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Email invalide"))]
    pub email: String,
    #[validate(length(min = 1, message = "Mot de passe requis"))]
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: SessionUser,
    pub effects: Vec<Effect>,
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub effects: Vec<Effect>,
}

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    check_form(&body).map_err(AppError::Validation)?;

    let auth_service = AuthService::new(&state.config.auth);
    let (user, token) = auth_service.login(&body.email, &body.password)?;

    let effects = vec![
        Effect::success(format!("Bienvenue {}", user.name)),
        Effect::redirect(DASHBOARD_PATH),
    ];
    Ok(Json(LoginResponse {
        access_token: token.access_token,
        token_type: token.token_type,
        expires_in: token.expires_in,
        user,
        effects,
    }))
}

/// The signed-in user
pub async fn me(CurrentSession(session): CurrentSession) -> AppResult<Json<SessionUser>> {
    Ok(Json(session.require_user()?.clone()))
}

/// Tokens are stateless; signing out only tells the client where to go
pub async fn logout(CurrentSession(mut session): CurrentSession) -> Json<LogoutResponse> {
    if let Some(user) = session.user() {
        tracing::info!(user_id = %user.id, "User signed out");
    }
    session.clear();
    Json(LogoutResponse {
        effects: vec![Effect::redirect(LOGIN_PATH)],
    })
}
