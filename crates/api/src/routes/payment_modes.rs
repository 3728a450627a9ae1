//! Payment mode routes.
//!
//! Modes are seeded at install time; these routes only read them. The
//! `is_city_ledger` flag tells clients which modes can settle invoices.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Serialize;
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser};
use stayra_db::PaymentModeRepository;

/// Creates the payment mode routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/payment-modes", get(list_payment_modes))
        .route("/payment-modes/{id}", get(get_payment_mode))
}

/// Response for a payment mode.
#[derive(Debug, Serialize)]
pub struct PaymentModeResponse {
    /// Payment mode ID.
    pub id: Uuid,
    /// Mode name.
    pub name: String,
    /// The account debited when this mode settles an invoice.
    pub account_id: Uuid,
    /// Whether this mode books charges to the city ledger.
    pub is_city_ledger: bool,
    /// Whether the mode is active.
    pub is_active: bool,
}

/// GET `/payment-modes` - List active payment modes.
async fn list_payment_modes(State(state): State<AppState>, _auth: AuthUser) -> impl IntoResponse {
    let repo = PaymentModeRepository::new((*state.db).clone());

    match repo.list_payment_modes().await {
        Ok(modes) => {
            let response: Vec<PaymentModeResponse> = modes
                .into_iter()
                .map(|m| PaymentModeResponse {
                    id: m.id,
                    name: m.name,
                    account_id: m.account_id,
                    is_city_ledger: m.is_city_ledger,
                    is_active: m.is_active,
                })
                .collect();

            (StatusCode::OK, Json(json!({ "payment_modes": response }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list payment modes");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "An error occurred"
                })),
            )
                .into_response()
        }
    }
}

/// GET `/payment-modes/{id}` - Get one payment mode.
async fn get_payment_mode(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = PaymentModeRepository::new((*state.db).clone());

    match repo.find_payment_mode_by_id(id).await {
        Ok(Some(m)) => (
            StatusCode::OK,
            Json(json!({
                "id": m.id,
                "name": m.name,
                "account_id": m.account_id,
                "is_city_ledger": m.is_city_ledger,
                "is_active": m.is_active,
                "created_at": m.created_at
            })),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "Payment mode not found"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to get payment mode");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "An error occurred"
                })),
            )
                .into_response()
        }
    }
}
