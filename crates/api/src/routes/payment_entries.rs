//! Payment entry routes.
//!
//! A payment entry records money received from a customer before it is
//! matched to invoices. Submission applies its allocations to the target
//! invoices in one transaction; cancellation reverses all of them exactly.

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
use tracing::info;
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser, routes::reconcile_error_response};
use stayra_core::reconcile::AllocationRequest;
use stayra_db::{
    PaymentEntryRepository, repositories::payment_entry::CreatePaymentEntryInput,
};
use stayra_shared::types::InvoiceId;

/// Creates the payment entry routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/payment-entries", post(create_payment_entry))
        .route("/payment-entries/{id}", get(get_payment_entry))
        .route("/payment-entries/{id}/remaining", get(get_remaining))
        .route("/payment-entries/{id}/submit", post(submit_payment_entry))
        .route("/payment-entries/{id}/cancel", post(cancel_payment_entry))
}

/// Request body for creating a payment entry.
#[derive(Debug, Deserialize)]
pub struct CreatePaymentEntryRequest {
    /// The customer the money was received from.
    pub customer_id: Uuid,
    /// The posting date.
    pub posting_date: NaiveDate,
    /// The amount received.
    pub paid_amount: Decimal,
    /// Optional external reference (cheque number, transfer id).
    pub reference_no: Option<String>,
}

/// Query parameters for the remaining amount.
#[derive(Debug, Deserialize)]
pub struct RemainingQuery {
    /// Invoice whose allocations should be ignored, if any.
    pub exclude_invoice: Option<Uuid>,
}

/// One allocation row in a submit request.
#[derive(Debug, Deserialize)]
pub struct AllocationRequestBody {
    /// The target invoice.
    pub invoice_id: Uuid,
    /// The amount to allocate to it.
    pub amount: Decimal,
}

/// Request body for submitting a payment entry.
#[derive(Debug, Deserialize)]
pub struct SubmitPaymentEntryRequest {
    /// Allocations to apply; may be empty to submit unallocated.
    #[serde(default)]
    pub allocations: Vec<AllocationRequestBody>,
}

/// POST `/payment-entries` - Create a payment entry draft.
async fn create_payment_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreatePaymentEntryRequest>,
) -> impl IntoResponse {
    let repo = PaymentEntryRepository::new((*state.db).clone(), state.locks.clone());
    let input = CreatePaymentEntryInput {
        customer_id: payload.customer_id,
        posting_date: payload.posting_date,
        paid_amount: payload.paid_amount,
        reference_no: payload.reference_no,
    };

    match repo.create_payment_entry(input).await {
        Ok(entry) => {
            info!(
                payment_entry_id = %entry.id,
                customer_id = %entry.customer_id,
                paid_amount = %entry.paid_amount,
                staff_id = %auth.staff_id(),
                "Payment entry drafted"
            );
            (StatusCode::CREATED, Json(entry)).into_response()
        }
        Err(e) => reconcile_error_response(&e),
    }
}

/// GET `/payment-entries/{id}` - Get one payment entry.
async fn get_payment_entry(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = PaymentEntryRepository::new((*state.db).clone(), state.locks.clone());

    match repo.find_payment_entry_by_id(id).await {
        Ok(Some(entry)) => (StatusCode::OK, Json(entry)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "Payment entry not found"
            })),
        )
            .into_response(),
        Err(e) => reconcile_error_response(&e),
    }
}

/// GET `/payment-entries/{id}/remaining` - Unallocated amount of an entry.
async fn get_remaining(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<RemainingQuery>,
) -> impl IntoResponse {
    let repo = PaymentEntryRepository::new((*state.db).clone(), state.locks.clone());

    match repo.get_remaining(id, query.exclude_invoice).await {
        Ok(remaining) => (
            StatusCode::OK,
            Json(json!({
                "paid_amount": remaining.paid_amount.to_string(),
                "allocated": remaining.allocated.to_string(),
                "remaining": remaining.remaining.to_string(),
            })),
        )
            .into_response(),
        Err(e) => reconcile_error_response(&e),
    }
}

/// POST `/payment-entries/{id}/submit` - Submit an entry and apply its allocations.
async fn submit_payment_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SubmitPaymentEntryRequest>,
) -> impl IntoResponse {
    let repo = PaymentEntryRepository::new((*state.db).clone(), state.locks.clone());
    let requests: Vec<AllocationRequest> = payload
        .allocations
        .into_iter()
        .map(|a| AllocationRequest {
            invoice_id: InvoiceId::from_uuid(a.invoice_id),
            amount: a.amount,
        })
        .collect();
    let allocation_count = requests.len();

    match repo.submit_payment_entry(id, requests).await {
        Ok(entry) => {
            info!(
                payment_entry_id = %entry.id,
                paid_amount = %entry.paid_amount,
                allocations = allocation_count,
                staff_id = %auth.staff_id(),
                "Payment entry submitted"
            );
            (StatusCode::OK, Json(json!({ "entry": entry }))).into_response()
        }
        Err(e) => reconcile_error_response(&e),
    }
}

/// POST `/payment-entries/{id}/cancel` - Cancel an entry and reverse its allocations.
async fn cancel_payment_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = PaymentEntryRepository::new((*state.db).clone(), state.locks.clone());

    match repo.cancel_payment_entry(id).await {
        Ok(cancellation) => {
            info!(
                payment_entry_id = %cancellation.entry.id,
                reversed_invoices = cancellation.reversed_invoices.len(),
                staff_id = %auth.staff_id(),
                "Payment entry cancelled"
            );
            (
                StatusCode::OK,
                Json(json!({
                    "entry": cancellation.entry,
                    "reversed_invoices": cancellation.reversed_invoices,
                })),
            )
                .into_response()
        }
        Err(e) => reconcile_error_response(&e),
    }
}
