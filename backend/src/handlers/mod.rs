//! HTTP request handlers

pub mod auth;
pub mod dashboard;
pub mod health;
pub mod records;

pub use auth::{login, logout, me};
pub use health::health_check;
