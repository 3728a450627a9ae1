//! API route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use crate::{AppState, middleware::auth::auth_middleware};
use stayra_core::reconcile::ReconcileError;

pub mod accounts;
pub mod customers;
pub mod folios;
pub mod health;
pub mod invoices;
pub mod journal_entries;
pub mod payment_entries;
pub mod payment_modes;

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(accounts::routes())
        .merge(customers::routes())
        .merge(folios::routes())
        .merge(invoices::routes())
        .merge(journal_entries::routes())
        .merge(payment_entries::routes())
        .merge(payment_modes::routes())
        .layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Maps a reconciliation error to an HTTP response.
///
/// Server side failures are logged and answered with a generic body;
/// everything else carries its error code and message to the caller.
pub(crate) fn reconcile_error_response(e: &ReconcileError) -> Response {
    let status =
        StatusCode::from_u16(e.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if status.is_server_error() {
        error!(error = %e, "Reconciliation operation failed");
        return (
            status,
            Json(json!({
                "error": "internal_error",
                "message": "An error occurred"
            })),
        )
            .into_response();
    }

    (
        status,
        Json(json!({
            "error": e.error_code(),
            "message": e.to_string(),
        })),
    )
        .into_response()
}
