//! Authentication service: sign-in against configured accounts and token management

use bcrypt::verify;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use shared::models::{Role, SessionUser};

use crate::config::{AccountConfig, AuthConfig};
use crate::error::{AppError, AppResult};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    accounts: Vec<AccountConfig>,
    jwt_secret: String,
    token_expiry: i64,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Account ID
    pub email: String,
    pub name: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

/// Issued access token
#[derive(Debug, Serialize)]
pub struct AuthToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            accounts: config.users.clone(),
            jwt_secret: config.jwt_secret.clone(),
            token_expiry: config.token_expiry,
        }
    }

    /// Authenticate with email and password
    pub fn login(&self, email: &str, password: &str) -> AppResult<(SessionUser, AuthToken)> {
        let email = email.trim();
        let account = self
            .accounts
            .iter()
            .find(|a| a.email.eq_ignore_ascii_case(email))
            .ok_or(AppError::InvalidCredentials)?;

        let valid = verify(password, &account.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;
        if !valid {
            tracing::info!(email = %account.email, "Rejected sign-in attempt");
            return Err(AppError::InvalidCredentials);
        }

        let user = SessionUser {
            id: account.id.clone(),
            email: account.email.clone(),
            name: account.name.clone(),
            role: account.role,
        };
        let token = self.generate_token(&user)?;
        tracing::info!(user_id = %user.id, role = %user.role, "User signed in");
        Ok((user, token))
    }

    /// Validate an access token and return the user it was issued to
    pub fn validate_token(&self, token: &str) -> AppResult<SessionUser> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| AppError::InvalidToken(e.to_string()))?;

        let claims = token_data.claims;
        Ok(SessionUser {
            id: claims.sub,
            email: claims.email,
            name: claims.name,
            role: claims.role,
        })
    }

    /// Generate an access token for a user
    pub fn generate_token(&self, user: &SessionUser) -> AppResult<AuthToken> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.token_expiry);

        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

        Ok(AuthToken {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.token_expiry,
        })
    }
}
