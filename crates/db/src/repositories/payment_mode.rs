//! Payment mode repository.
//!
//! Modes marked `is_city_ledger` move charges into the ledger and can never
//! settle invoices; the settleable modes (cash, bank, card) each point at
//! the account their settlement vouchers debit.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::info;
use uuid::Uuid;

use crate::entities::{accounts, payment_modes};

/// Error types for payment mode operations.
#[derive(Debug, thiserror::Error)]
pub enum PaymentModeError {
    /// Payment mode name already exists.
    #[error("Payment mode '{0}' already exists")]
    DuplicateName(String),

    /// Debit account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Payment mode not found.
    #[error("Payment mode not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a payment mode.
#[derive(Debug, Clone)]
pub struct CreatePaymentModeInput {
    /// Mode name (must be unique).
    pub name: String,
    /// The account debited when this mode settles an invoice.
    pub account_id: Uuid,
    /// Whether this mode books charges to the city ledger.
    pub is_city_ledger: bool,
}

/// Payment mode repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct PaymentModeRepository {
    db: DatabaseConnection,
}

impl PaymentModeRepository {
    /// Creates a new payment mode repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new payment mode with validation.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The name already exists
    /// - The debit account does not exist
    pub async fn create_payment_mode(
        &self,
        input: CreatePaymentModeInput,
    ) -> Result<payment_modes::Model, PaymentModeError> {
        let existing = payment_modes::Entity::find()
            .filter(payment_modes::Column::Name.eq(&input.name))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(PaymentModeError::DuplicateName(input.name));
        }

        let account = accounts::Entity::find_by_id(input.account_id)
            .one(&self.db)
            .await?;
        if account.is_none() {
            return Err(PaymentModeError::AccountNotFound(input.account_id));
        }

        let mode = payment_modes::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(input.name),
            account_id: Set(input.account_id),
            is_city_ledger: Set(input.is_city_ledger),
            is_active: Set(true),
            created_at: Set(chrono::Utc::now().into()),
        };

        let mode = mode.insert(&self.db).await?;
        info!(payment_mode_id = %mode.id, name = %mode.name, city_ledger = mode.is_city_ledger, "created payment mode");
        Ok(mode)
    }

    /// Finds a payment mode by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_payment_mode_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<payment_modes::Model>, PaymentModeError> {
        let mode = payment_modes::Entity::find_by_id(id).one(&self.db).await?;
        Ok(mode)
    }

    /// Finds a payment mode by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_payment_mode_by_name(
        &self,
        name: &str,
    ) -> Result<Option<payment_modes::Model>, PaymentModeError> {
        let mode = payment_modes::Entity::find()
            .filter(payment_modes::Column::Name.eq(name))
            .one(&self.db)
            .await?;
        Ok(mode)
    }

    /// Lists active payment modes ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_payment_modes(&self) -> Result<Vec<payment_modes::Model>, PaymentModeError> {
        let modes = payment_modes::Entity::find()
            .filter(payment_modes::Column::IsActive.eq(true))
            .order_by_asc(payment_modes::Column::Name)
            .all(&self.db)
            .await?;
        Ok(modes)
    }
}
