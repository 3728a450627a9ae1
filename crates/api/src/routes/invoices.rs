//! City ledger invoice routes.
//!
//! Drafting, submission, direct payment rows, discount rows, batch
//! capture and cancellation. Every mutation goes through the invoice
//! repository, which serializes it under the per-invoice lock and
//! recomputes the stored totals inside the transaction.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser, routes::reconcile_error_response};
use stayra_core::reconcile::{InvoiceStatus, NewDiscountRow, NewPaymentRow};
use stayra_db::{
    InvoiceRepository,
    repositories::invoice::{CreateInvoiceInput, InvoiceFilter},
};
use stayra_shared::types::{PageRequest, PaymentModeId};

/// Creates the invoice routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/invoices", get(list_invoices))
        .route("/invoices", post(create_invoice))
        .route("/invoices/{id}", get(get_invoice))
        .route("/invoices/{id}", delete(delete_invoice))
        .route("/invoices/{id}/folios", put(set_folios))
        .route("/invoices/{id}/submit", post(submit_invoice))
        .route("/invoices/{id}/payments", post(add_payment))
        .route("/invoices/{id}/payments/{row_id}", delete(remove_payment))
        .route("/invoices/{id}/make-payment", post(make_payment))
        .route("/invoices/{id}/discounts", post(add_discount))
        .route("/invoices/{id}/apply-discounts", post(apply_discounts))
        .route("/invoices/{id}/cancel", post(cancel_invoice))
}

/// Query parameters for listing invoices.
#[derive(Debug, Deserialize)]
pub struct ListInvoicesQuery {
    /// Filter by customer.
    pub customer_id: Option<Uuid>,
    /// Filter by status: draft, unpaid, paid, cancelled.
    pub status: Option<String>,
    /// Page number (1-indexed, default: 1).
    pub page: Option<u32>,
    /// Number of items per page (default: 20).
    pub per_page: Option<u32>,
}

/// Request body for creating an invoice.
#[derive(Debug, Deserialize)]
pub struct CreateInvoiceRequest {
    /// The customer being billed.
    pub customer_id: Uuid,
    /// The date the invoice is issued.
    pub issued_date: NaiveDate,
    /// The date payment falls due.
    pub due_date: NaiveDate,
    /// Folios to attach, in billing order.
    #[serde(default)]
    pub folio_ids: Vec<Uuid>,
}

/// Request body for replacing the attached folio set.
#[derive(Debug, Deserialize)]
pub struct SetFoliosRequest {
    /// Folios to attach, in billing order.
    pub folio_ids: Vec<Uuid>,
}

/// Request body for adding a direct payment row.
#[derive(Debug, Deserialize)]
pub struct AddPaymentRequest {
    /// The date the payment was received.
    pub payment_date: NaiveDate,
    /// The mode of payment settling this row.
    pub payment_mode_id: Uuid,
    /// The amount received.
    pub amount: Decimal,
    /// Optional external reference (cheque number, transfer id).
    pub reference_no: Option<String>,
}

/// Request body for adding a discount row.
#[derive(Debug, Deserialize)]
pub struct AddDiscountRequest {
    /// Reason for the discount.
    pub description: String,
    /// The amount to write off.
    pub amount: Decimal,
}

/// GET `/invoices` - List invoices with filters and pagination.
async fn list_invoices(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListInvoicesQuery>,
) -> impl IntoResponse {
    let status = match query.status.as_deref() {
        Some(s) => match InvoiceStatus::parse(s) {
            Some(status) => Some(status),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_status",
                        "message": "Invalid status. Must be one of: draft, unpaid, paid, cancelled"
                    })),
                )
                    .into_response();
            }
        },
        None => None,
    };

    let repo = InvoiceRepository::new((*state.db).clone(), state.locks.clone());
    let filter = InvoiceFilter {
        customer_id: query.customer_id,
        status,
    };
    let page = PageRequest {
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    };

    match repo.list_invoices(filter, &page).await {
        Ok(invoices) => (StatusCode::OK, Json(invoices)).into_response(),
        Err(e) => reconcile_error_response(&e),
    }
}

/// POST `/invoices` - Create a draft invoice.
async fn create_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateInvoiceRequest>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone(), state.locks.clone());
    let input = CreateInvoiceInput {
        customer_id: payload.customer_id,
        issued_date: payload.issued_date,
        due_date: payload.due_date,
        folio_ids: payload.folio_ids,
    };

    match repo.create_invoice(input).await {
        Ok(created) => {
            info!(
                invoice_id = %created.invoice.id,
                customer_id = %created.invoice.customer_id,
                total_amount = %created.invoice.total_amount,
                staff_id = %auth.staff_id(),
                "Invoice drafted"
            );
            (StatusCode::CREATED, Json(created)).into_response()
        }
        Err(e) => reconcile_error_response(&e),
    }
}

/// GET `/invoices/{id}` - Get an invoice with all child rows.
async fn get_invoice(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone(), state.locks.clone());

    match repo.find_invoice_by_id(id).await {
        Ok(Some(loaded)) => (StatusCode::OK, Json(loaded)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "Invoice not found"
            })),
        )
            .into_response(),
        Err(e) => reconcile_error_response(&e),
    }
}

/// DELETE `/invoices/{id}` - Delete a draft invoice.
async fn delete_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone(), state.locks.clone());

    match repo.delete_draft(id).await {
        Ok(()) => {
            info!(invoice_id = %id, staff_id = %auth.staff_id(), "Draft invoice deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => reconcile_error_response(&e),
    }
}

/// PUT `/invoices/{id}/folios` - Replace the attached folio set.
async fn set_folios(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetFoliosRequest>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone(), state.locks.clone());

    match repo.set_folios(id, payload.folio_ids).await {
        Ok(updated) => {
            info!(
                invoice_id = %id,
                folios = updated.folios.len(),
                total_amount = %updated.invoice.total_amount,
                staff_id = %auth.staff_id(),
                "Invoice folios replaced"
            );
            (StatusCode::OK, Json(updated)).into_response()
        }
        Err(e) => reconcile_error_response(&e),
    }
}

/// POST `/invoices/{id}/submit` - Submit a draft invoice.
async fn submit_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone(), state.locks.clone());

    match repo.submit_invoice(id).await {
        Ok(invoice) => {
            info!(
                invoice_id = %invoice.id,
                total_amount = %invoice.total_amount,
                staff_id = %auth.staff_id(),
                "Invoice submitted"
            );
            (StatusCode::OK, Json(json!({ "invoice": invoice }))).into_response()
        }
        Err(e) => reconcile_error_response(&e),
    }
}

/// POST `/invoices/{id}/payments` - Add a pending payment row.
async fn add_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddPaymentRequest>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone(), state.locks.clone());
    let row = NewPaymentRow {
        payment_date: payload.payment_date,
        payment_mode_id: PaymentModeId::from_uuid(payload.payment_mode_id),
        amount: payload.amount,
        reference_no: payload.reference_no,
    };

    match repo.add_payment_row(id, row).await {
        Ok(row) => {
            info!(
                invoice_id = %id,
                row_id = %row.id,
                amount = %row.amount,
                staff_id = %auth.staff_id(),
                "Payment row added"
            );
            (StatusCode::CREATED, Json(row)).into_response()
        }
        Err(e) => reconcile_error_response(&e),
    }
}

/// DELETE `/invoices/{id}/payments/{row_id}` - Remove a pending payment row.
async fn remove_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, row_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone(), state.locks.clone());

    match repo.remove_payment_row(id, row_id).await {
        Ok(()) => {
            info!(
                invoice_id = %id,
                row_id = %row_id,
                staff_id = %auth.staff_id(),
                "Payment row removed"
            );
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => reconcile_error_response(&e),
    }
}

/// POST `/invoices/{id}/make-payment` - Capture all pending payment rows.
async fn make_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone(), state.locks.clone());

    match repo.make_payment(id).await {
        Ok(outcome) => {
            info!(
                invoice_id = %outcome.invoice.id,
                rows_posted = outcome.rows_posted,
                total_paid = %outcome.invoice.total_paid,
                outstanding = %outcome.invoice.outstanding,
                staff_id = %auth.staff_id(),
                "Payment batch captured"
            );
            (
                StatusCode::OK,
                Json(json!({
                    "rows_posted": outcome.rows_posted,
                    "invoice": outcome.invoice,
                })),
            )
                .into_response()
        }
        Err(e) => reconcile_error_response(&e),
    }
}

/// POST `/invoices/{id}/discounts` - Add a pending discount row.
async fn add_discount(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddDiscountRequest>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone(), state.locks.clone());
    let row = NewDiscountRow {
        description: payload.description,
        amount: payload.amount,
    };

    match repo.add_discount_row(id, row).await {
        Ok(row) => {
            info!(
                invoice_id = %id,
                row_id = %row.id,
                amount = %row.amount,
                staff_id = %auth.staff_id(),
                "Discount row added"
            );
            (StatusCode::CREATED, Json(row)).into_response()
        }
        Err(e) => reconcile_error_response(&e),
    }
}

/// POST `/invoices/{id}/apply-discounts` - Apply all pending discount rows.
async fn apply_discounts(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone(), state.locks.clone());

    match repo.apply_discounts(id).await {
        Ok(outcome) => {
            info!(
                invoice_id = %outcome.invoice.id,
                rows_posted = outcome.rows_posted,
                total_discount = %outcome.invoice.total_discount,
                outstanding = %outcome.invoice.outstanding,
                staff_id = %auth.staff_id(),
                "Discount batch applied"
            );
            (
                StatusCode::OK,
                Json(json!({
                    "rows_posted": outcome.rows_posted,
                    "invoice": outcome.invoice,
                })),
            )
                .into_response()
        }
        Err(e) => reconcile_error_response(&e),
    }
}

/// POST `/invoices/{id}/cancel` - Cancel a submitted invoice.
async fn cancel_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone(), state.locks.clone());

    match repo.cancel_invoice(id).await {
        Ok(invoice) => {
            info!(
                invoice_id = %invoice.id,
                staff_id = %auth.staff_id(),
                "Invoice cancelled"
            );
            (StatusCode::OK, Json(json!({ "invoice": invoice }))).into_response()
        }
        Err(e) => reconcile_error_response(&e),
    }
}
