//! Dashboard overview and navigation handlers

use axum::{extract::State, Json};
use chrono::Utc;

use shared::dashboard::{Alert, LotSummary, ShipmentSummary};
use shared::models::Product;
use shared::view::{navigation_for, NavItem};

use crate::error::AppResult;
use crate::middleware::CurrentSession;
use crate::services::dashboard::{DashboardService, Overview};
use crate::AppState;

pub async fn overview(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> AppResult<Json<Overview>> {
    session.require_user()?;
    let service = DashboardService::new(state.store.as_ref(), state.config.dashboard);
    Ok(Json(service.overview().await?))
}

pub async fn alerts(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> AppResult<Json<Vec<Alert>>> {
    session.require_user()?;
    let service = DashboardService::new(state.store.as_ref(), state.config.dashboard);
    Ok(Json(service.alerts_at(Utc::now().date_naive()).await?))
}

pub async fn top_cost_products(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> AppResult<Json<Vec<Product>>> {
    session.require_user()?;
    let service = DashboardService::new(state.store.as_ref(), state.config.dashboard);
    Ok(Json(service.top_cost_products().await?))
}

/// Quantity and value of the lots in stock
pub async fn lot_summary(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> AppResult<Json<LotSummary>> {
    session.require_user()?;
    let service = DashboardService::new(state.store.as_ref(), state.config.dashboard);
    Ok(Json(service.lot_summary().await?))
}

/// Shipment counts and summed costs
pub async fn shipment_summary(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> AppResult<Json<ShipmentSummary>> {
    session.require_user()?;
    let service = DashboardService::new(state.store.as_ref(), state.config.dashboard);
    Ok(Json(service.shipment_summary().await?))
}

/// Sidebar entries visible to the current user
pub async fn navigation(CurrentSession(session): CurrentSession) -> AppResult<Json<Vec<NavItem>>> {
    session.require_user()?;
    Ok(Json(navigation_for(&session)))
}
