//! Ledger settings repository.
//!
//! A single-row table naming the receivable account credited by every
//! settlement voucher and the expense account debited by discount
//! vouchers. Payment capture and discount application refuse to run until
//! both are configured.

use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, Set,
};
use tracing::info;
use uuid::Uuid;

use stayra_core::reconcile::ReconcileError;

use crate::entities::{accounts, ledger_settings};

use super::db_err;

/// The fixed primary key of the settings row.
const SETTINGS_ROW: i16 = 1;

/// Error types for settings operations.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Settings row has not been created yet.
    #[error("Ledger settings have not been configured")]
    NotConfigured,

    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Settings repository for the singleton configuration row.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    db: DatabaseConnection,
}

impl SettingsRepository {
    /// Creates a new settings repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Fetches the settings row.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::NotConfigured` if the row does not exist.
    pub async fn get_settings(&self) -> Result<ledger_settings::Model, SettingsError> {
        ledger_settings::Entity::find_by_id(SETTINGS_ROW)
            .one(&self.db)
            .await?
            .ok_or(SettingsError::NotConfigured)
    }

    /// Creates or replaces the settings row.
    ///
    /// # Errors
    ///
    /// Returns an error if either account does not exist.
    pub async fn save_settings(
        &self,
        receivable_account_id: Uuid,
        discount_account_id: Uuid,
    ) -> Result<ledger_settings::Model, SettingsError> {
        for account_id in [receivable_account_id, discount_account_id] {
            let account = accounts::Entity::find_by_id(account_id).one(&self.db).await?;
            if account.is_none() {
                return Err(SettingsError::AccountNotFound(account_id));
            }
        }

        let now = chrono::Utc::now().into();
        let existing = ledger_settings::Entity::find_by_id(SETTINGS_ROW)
            .one(&self.db)
            .await?;

        let settings = match existing {
            Some(row) => {
                let mut active: ledger_settings::ActiveModel = row.into();
                active.receivable_account_id = Set(receivable_account_id);
                active.discount_account_id = Set(discount_account_id);
                active.updated_at = Set(now);
                active.update(&self.db).await?
            }
            None => {
                let active = ledger_settings::ActiveModel {
                    id: Set(SETTINGS_ROW),
                    receivable_account_id: Set(receivable_account_id),
                    discount_account_id: Set(discount_account_id),
                    updated_at: Set(now),
                };
                active.insert(&self.db).await?
            }
        };

        info!(
            receivable_account_id = %settings.receivable_account_id,
            discount_account_id = %settings.discount_account_id,
            "saved ledger settings"
        );
        Ok(settings)
    }
}

/// Loads the settings row for a settlement operation.
///
/// # Errors
///
/// Returns `ReconcileError::Internal` when the row is missing.
pub(crate) async fn load_settings<C: ConnectionTrait>(
    conn: &C,
) -> Result<ledger_settings::Model, ReconcileError> {
    ledger_settings::Entity::find_by_id(SETTINGS_ROW)
        .one(conn)
        .await
        .map_err(db_err)?
        .ok_or_else(|| ReconcileError::Internal("ledger settings not configured".to_string()))
}
