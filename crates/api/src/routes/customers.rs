//! Customer routes for city ledger account holders.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser, routes::reconcile_error_response};
use stayra_db::{
    CustomerRepository, InvoiceRepository, repositories::customer::CreateCustomerInput,
};
use stayra_shared::types::PageRequest;

/// Creates the customer routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/customers", get(list_customers))
        .route("/customers", post(create_customer))
        .route("/customers/{id}", get(get_customer))
        .route("/customers/{id}/unpaid-invoices", get(unpaid_invoices))
}

/// Query parameters for listing customers.
#[derive(Debug, Deserialize)]
pub struct ListCustomersQuery {
    /// Page number (1-indexed, default: 1).
    pub page: Option<u32>,
    /// Number of items per page (default: 20).
    pub per_page: Option<u32>,
}

/// Request body for creating a customer.
#[derive(Debug, Deserialize)]
pub struct CreateCustomerRequest {
    /// Display name of the customer.
    pub name: String,
}

/// Response for an unpaid invoice in the allocation picker.
#[derive(Debug, Serialize)]
pub struct UnpaidInvoiceResponse {
    /// Invoice ID.
    pub id: Uuid,
    /// Invoice status.
    pub status: String,
    /// The date the invoice was issued.
    pub issued_date: String,
    /// The date payment falls due.
    pub due_date: String,
    /// The invoice total.
    pub total_amount: String,
    /// The remaining receivable.
    pub outstanding: String,
}

/// GET `/customers` - List customers with pagination.
async fn list_customers(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListCustomersQuery>,
) -> impl IntoResponse {
    let repo = CustomerRepository::new((*state.db).clone());
    let page = PageRequest {
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    };

    match repo.list_customers(&page).await {
        Ok(customers) => (StatusCode::OK, Json(customers)).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to list customers");
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

/// POST `/customers` - Create a customer.
async fn create_customer(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateCustomerRequest>,
) -> impl IntoResponse {
    let name = payload.name.trim();
    if name.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_name",
                "message": "Customer name cannot be empty"
            })),
        )
            .into_response();
    }

    let repo = CustomerRepository::new((*state.db).clone());
    let input = CreateCustomerInput {
        name: name.to_string(),
    };

    match repo.create_customer(input).await {
        Ok(customer) => {
            info!(
                customer_id = %customer.id,
                staff_id = %auth.staff_id(),
                "Customer created"
            );
            (StatusCode::CREATED, Json(customer)).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create customer");
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

/// GET `/customers/{id}` - Get one customer.
async fn get_customer(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = CustomerRepository::new((*state.db).clone());

    match repo.find_customer_by_id(id).await {
        Ok(Some(customer)) => (StatusCode::OK, Json(customer)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "Customer not found"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to get customer");
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

/// GET `/customers/{id}/unpaid-invoices` - Unpaid invoices for the allocation picker.
async fn unpaid_invoices(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone(), state.locks.clone());

    match repo.list_unpaid_for_customer(id).await {
        Ok(invoices) => {
            let response: Vec<UnpaidInvoiceResponse> = invoices
                .into_iter()
                .map(|i| UnpaidInvoiceResponse {
                    id: i.id,
                    status: stayra_core::reconcile::InvoiceStatus::from(i.status)
                        .as_str()
                        .to_string(),
                    issued_date: i.issued_date.to_string(),
                    due_date: i.due_date.to_string(),
                    total_amount: i.total_amount.to_string(),
                    outstanding: i.outstanding.to_string(),
                })
                .collect();

            (StatusCode::OK, Json(json!({ "invoices": response }))).into_response()
        }
        Err(e) => reconcile_error_response(&e),
    }
}
