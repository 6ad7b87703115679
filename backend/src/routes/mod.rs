//! Route definitions for the Landed Cost Dashboard API

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::handlers::{self, dashboard, records};
use crate::middleware::auth_middleware;
use crate::records::{CostTypes, Lots, Products, Resource, Shipments};
use crate::AppState;

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .nest("/products", record_routes::<Products>())
        .nest(
            "/shipments",
            Router::new()
                .route("/-/summary", get(dashboard::shipment_summary))
                .merge(record_routes::<Shipments>()),
        )
        .nest(
            "/lots",
            Router::new()
                .route("/-/summary", get(dashboard::lot_summary))
                .merge(record_routes::<Lots>()),
        )
        // Admin only; enforced by the record handlers
        .nest("/cost-types", record_routes::<CostTypes>())
        .nest("/dashboard", dashboard_routes())
        .route("/navigation", get(dashboard::navigation))
        .route("/auth/me", get(handlers::me))
        .route("/auth/logout", post(handlers::logout))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Sign-in (public)
        .route("/auth/login", post(handlers::login))
        .merge(protected)
}

/// List, form, mutation and deletion routes of one record kind
///
/// Keys are typed in by users, so helpers live under `/-/` where no single
/// key segment can shadow them.
fn record_routes<R: Resource>() -> Router<AppState> {
    Router::new()
        .route("/", get(records::list::<R>).post(records::create::<R>))
        .route("/-/form", get(records::create_form::<R>))
        .route("/-/preview", post(records::preview::<R>))
        .route(
            "/:key",
            put(records::update::<R>).delete(records::remove::<R>),
        )
        .route("/:key/form", get(records::edit_form::<R>))
        .route("/:key/delete", get(records::delete_prompt::<R>))
}

fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::overview))
        .route("/alerts", get(dashboard::alerts))
        .route("/top-cost-products", get(dashboard::top_cost_products))
}
