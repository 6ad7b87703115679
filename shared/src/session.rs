//! Explicit session context
//!
//! The signed-in user travels with each request instead of living in a
//! global store. Role checks return the navigation to perform on refusal.

use thiserror::Error;

use crate::effects::Effect;
use crate::models::{Role, SessionUser};

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Refusal to enter a role-restricted section
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessDenied {
    #[error("not signed in")]
    SignedOut,

    #[error("role {actual} may not access a section reserved to {required}")]
    WrongRole { required: Role, actual: Role },
}

impl AccessDenied {
    /// Commands the presentation layer runs when access is refused
    pub fn effects(&self) -> Vec<Effect> {
        match self {
            AccessDenied::SignedOut => vec![Effect::redirect(LOGIN_PATH)],
            AccessDenied::WrongRole { .. } => vec![
                Effect::error("Cette section est réservée aux administrateurs"),
                Effect::redirect(DASHBOARD_PATH),
            ],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<SessionUser>,
}

impl Session {
    pub fn signed_in(user: SessionUser) -> Self {
        Self { user: Some(user) }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn set_user(&mut self, user: SessionUser) {
        self.user = Some(user);
    }

    pub fn clear(&mut self) {
        self.user = None;
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }

    /// The current user, provided they hold `role`
    pub fn require_role(&self, role: Role) -> Result<&SessionUser, AccessDenied> {
        let user = self.user.as_ref().ok_or(AccessDenied::SignedOut)?;
        if user.role == role {
            Ok(user)
        } else {
            Err(AccessDenied::WrongRole {
                required: role,
                actual: user.role,
            })
        }
    }

    pub fn require_user(&self) -> Result<&SessionUser, AccessDenied> {
        self.user.as_ref().ok_or(AccessDenied::SignedOut)
    }
}
