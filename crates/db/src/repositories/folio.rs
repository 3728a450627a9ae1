//! Folio repository for guest folios carried to the city ledger.
//!
//! Folios arrive here already closed on the front office side; this
//! repository only records them and tracks their settlement marks. The
//! marks themselves are maintained by the invoice repository as invoices
//! move in and out of the paid status.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::info;
use uuid::Uuid;

use stayra_shared::types::{PageRequest, PageResponse};

use crate::entities::{customers, folios};

/// Error types for folio operations.
#[derive(Debug, thiserror::Error)]
pub enum FolioError {
    /// Folio not found.
    #[error("Folio not found: {0}")]
    NotFound(Uuid),

    /// Customer not found.
    #[error("Customer not found: {0}")]
    CustomerNotFound(Uuid),

    /// Folio balance cannot be negative.
    #[error("Folio balance cannot be negative")]
    NegativeBalance,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a folio.
#[derive(Debug, Clone)]
pub struct CreateFolioInput {
    /// The customer carrying the folio balance.
    pub customer_id: Uuid,
    /// The date the folio was opened.
    pub open_date: NaiveDate,
    /// The date the folio was closed, if closed.
    pub close_date: Option<NaiveDate>,
    /// Outstanding balance carried to the city ledger.
    pub balance: Decimal,
}

/// Filter options for listing folios.
#[derive(Debug, Clone, Default)]
pub struct FolioFilter {
    /// Filter by customer.
    pub customer_id: Option<Uuid>,
    /// Filter by settlement mark.
    pub settled: Option<bool>,
}

/// Folio repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct FolioRepository {
    db: DatabaseConnection,
}

impl FolioRepository {
    /// Creates a new folio repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new folio with validation.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The customer does not exist
    /// - The balance is negative
    pub async fn create_folio(&self, input: CreateFolioInput) -> Result<folios::Model, FolioError> {
        if input.balance < Decimal::ZERO {
            return Err(FolioError::NegativeBalance);
        }

        let customer = customers::Entity::find_by_id(input.customer_id)
            .one(&self.db)
            .await?;
        if customer.is_none() {
            return Err(FolioError::CustomerNotFound(input.customer_id));
        }

        let now = chrono::Utc::now().into();
        let folio = folios::ActiveModel {
            id: Set(Uuid::now_v7()),
            customer_id: Set(input.customer_id),
            open_date: Set(input.open_date),
            close_date: Set(input.close_date),
            balance: Set(input.balance),
            settled: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let folio = folio.insert(&self.db).await?;
        info!(folio_id = %folio.id, customer_id = %folio.customer_id, balance = %folio.balance, "created folio");
        Ok(folio)
    }

    /// Finds a folio by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_folio_by_id(&self, id: Uuid) -> Result<Option<folios::Model>, FolioError> {
        let folio = folios::Entity::find_by_id(id).one(&self.db).await?;
        Ok(folio)
    }

    /// Lists folios ordered by open date, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_folios(
        &self,
        filter: FolioFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<folios::Model>, FolioError> {
        let mut query = folios::Entity::find().order_by_desc(folios::Column::OpenDate);

        if let Some(customer_id) = filter.customer_id {
            query = query.filter(folios::Column::CustomerId.eq(customer_id));
        }
        if let Some(settled) = filter.settled {
            query = query.filter(folios::Column::Settled.eq(settled));
        }

        let total = query.clone().count(&self.db).await?;
        let data = query
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }
}
