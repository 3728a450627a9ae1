//! Chart of accounts routes.
//!
//! The chart is seeded at install time; these routes only read it.

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
use stayra_db::{AccountRepository, entities::sea_orm_active_enums::AccountKind};

/// Creates the account routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list_accounts))
        .route("/accounts/{id}", get(get_account))
}

/// Response for an account.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    /// Account ID.
    pub id: Uuid,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account classification.
    pub kind: String,
    /// Whether the account is active.
    pub is_active: bool,
}

fn account_kind_to_string(kind: &AccountKind) -> String {
    match kind {
        AccountKind::Asset => "asset",
        AccountKind::Liability => "liability",
        AccountKind::Income => "income",
        AccountKind::Expense => "expense",
        AccountKind::Receivable => "receivable",
    }
    .to_string()
}

/// GET `/accounts` - List the chart of accounts.
async fn list_accounts(State(state): State<AppState>, _auth: AuthUser) -> impl IntoResponse {
    let repo = AccountRepository::new((*state.db).clone());

    match repo.list_accounts().await {
        Ok(accounts) => {
            let response: Vec<AccountResponse> = accounts
                .into_iter()
                .map(|a| AccountResponse {
                    id: a.id,
                    code: a.code,
                    name: a.name,
                    kind: account_kind_to_string(&a.kind),
                    is_active: a.is_active,
                })
                .collect();

            (StatusCode::OK, Json(json!({ "accounts": response }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list accounts");
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

/// GET `/accounts/{id}` - Get one account.
async fn get_account(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = AccountRepository::new((*state.db).clone());

    match repo.find_account_by_id(id).await {
        Ok(Some(a)) => (
            StatusCode::OK,
            Json(json!({
                "id": a.id,
                "code": a.code,
                "name": a.name,
                "kind": account_kind_to_string(&a.kind),
                "is_active": a.is_active,
                "created_at": a.created_at
            })),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "Account not found"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to get account");
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_kind_to_string() {
        assert_eq!(account_kind_to_string(&AccountKind::Asset), "asset");
        assert_eq!(account_kind_to_string(&AccountKind::Expense), "expense");
        assert_eq!(
            account_kind_to_string(&AccountKind::Receivable),
            "receivable"
        );
    }
}
