//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for invoices, payment entries, vouchers, and master data
//! - JWT authentication middleware for host-issued staff tokens
//! - Shared application state

pub mod middleware;
pub mod routes;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use stayra_db::InvoiceLocks;
use stayra_shared::JwtService;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service validating host-issued tokens.
    pub jwt_service: Arc<JwtService>,
    /// Per-invoice lock registry shared by every repository.
    pub locks: InvoiceLocks,
}

/// Creates the main application router.
///
/// The health check stays public; everything under `/api/v1` requires a
/// bearer token.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::routes())
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
