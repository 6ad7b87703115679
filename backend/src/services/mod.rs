//! Services of the Landed Cost Dashboard

pub mod auth;
pub mod dashboard;

pub use auth::AuthService;
pub use dashboard::DashboardService;
