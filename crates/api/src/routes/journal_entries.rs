//! Journal voucher routes.
//!
//! Vouchers are created only by payment capture and discount application;
//! the API exposes reads and cancellation. Cancelling a voucher reverses
//! the invoice row it backed and restores the invoice totals.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser, routes::reconcile_error_response};
use stayra_db::JournalRepository;

/// Creates the journal entry routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/journal-entries/{id}", get(get_journal_entry))
        .route("/journal-entries/{id}/cancel", post(cancel_journal_entry))
}

/// GET `/journal-entries/{id}` - Get a voucher with its lines.
async fn get_journal_entry(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = JournalRepository::new((*state.db).clone(), state.locks.clone());

    match repo.find_journal_entry(id).await {
        Ok(Some(found)) => (
            StatusCode::OK,
            Json(json!({
                "entry": found.entry,
                "lines": found.lines,
            })),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "Journal entry not found"
            })),
        )
            .into_response(),
        Err(e) => reconcile_error_response(&e),
    }
}

/// POST `/journal-entries/{id}/cancel` - Cancel a voucher and reverse its row.
async fn cancel_journal_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = JournalRepository::new((*state.db).clone(), state.locks.clone());

    match repo.cancel_voucher(id).await {
        Ok(cancellation) => {
            info!(
                journal_entry_id = %cancellation.entry.id,
                reversed_invoice = ?cancellation.reversed_invoice,
                staff_id = %auth.staff_id(),
                "Journal voucher cancelled"
            );
            (
                StatusCode::OK,
                Json(json!({
                    "entry": cancellation.entry,
                    "reversed_invoice": cancellation.reversed_invoice,
                })),
            )
                .into_response()
        }
        Err(e) => reconcile_error_response(&e),
    }
}
