//! Folio routes.
//!
//! Folios arrive from the front office already closed; these routes record
//! them against a customer and expose their settlement marks.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser};
use stayra_db::{
    FolioRepository,
    repositories::folio::{CreateFolioInput, FolioError, FolioFilter},
};
use stayra_shared::types::PageRequest;

/// Creates the folio routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/folios", get(list_folios))
        .route("/folios", post(create_folio))
        .route("/folios/{id}", get(get_folio))
}

/// Query parameters for listing folios.
#[derive(Debug, Deserialize)]
pub struct ListFoliosQuery {
    /// Filter by customer.
    pub customer_id: Option<Uuid>,
    /// Filter by settlement mark.
    pub settled: Option<bool>,
    /// Page number (1-indexed, default: 1).
    pub page: Option<u32>,
    /// Number of items per page (default: 20).
    pub per_page: Option<u32>,
}

/// Request body for creating a folio.
#[derive(Debug, Deserialize)]
pub struct CreateFolioRequest {
    /// The customer carrying the folio balance.
    pub customer_id: Uuid,
    /// The date the folio was opened.
    pub open_date: NaiveDate,
    /// The date the folio was closed, if closed.
    pub close_date: Option<NaiveDate>,
    /// Outstanding balance carried to the city ledger.
    pub balance: Decimal,
}

/// GET `/folios` - List folios with filters and pagination.
async fn list_folios(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListFoliosQuery>,
) -> impl IntoResponse {
    let repo = FolioRepository::new((*state.db).clone());
    let filter = FolioFilter {
        customer_id: query.customer_id,
        settled: query.settled,
    };
    let page = PageRequest {
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    };

    match repo.list_folios(filter, &page).await {
        Ok(folios) => (StatusCode::OK, Json(folios)).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to list folios");
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

/// POST `/folios` - Record a folio carried to the city ledger.
async fn create_folio(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateFolioRequest>,
) -> impl IntoResponse {
    let repo = FolioRepository::new((*state.db).clone());
    let input = CreateFolioInput {
        customer_id: payload.customer_id,
        open_date: payload.open_date,
        close_date: payload.close_date,
        balance: payload.balance,
    };

    match repo.create_folio(input).await {
        Ok(folio) => {
            info!(
                folio_id = %folio.id,
                customer_id = %folio.customer_id,
                staff_id = %auth.staff_id(),
                "Folio recorded"
            );
            (StatusCode::CREATED, Json(folio)).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create folio");
            match e {
                FolioError::CustomerNotFound(id) => (
                    StatusCode::NOT_FOUND,
                    Json(json!({
                        "error": "customer_not_found",
                        "message": format!("Customer not found: {}", id)
                    })),
                )
                    .into_response(),
                FolioError::NegativeBalance => (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "negative_balance",
                        "message": "Folio balance cannot be negative"
                    })),
                )
                    .into_response(),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "internal_error",
                        "message": "An error occurred"
                    })),
                )
                    .into_response(),
            }
        }
    }
}

/// GET `/folios/{id}` - Get one folio.
async fn get_folio(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = FolioRepository::new((*state.db).clone());

    match repo.find_folio_by_id(id).await {
        Ok(Some(folio)) => (StatusCode::OK, Json(folio)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "Folio not found"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to get folio");
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
