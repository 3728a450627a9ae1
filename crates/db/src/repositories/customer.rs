//! Customer repository for city ledger account holders.

use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryOrder,
    QuerySelect, Set,
};
use tracing::info;
use uuid::Uuid;

use stayra_shared::types::{PageRequest, PageResponse};

use crate::entities::customers;

/// Error types for customer operations.
#[derive(Debug, thiserror::Error)]
pub enum CustomerError {
    /// Customer not found.
    #[error("Customer not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a customer.
#[derive(Debug, Clone)]
pub struct CreateCustomerInput {
    /// Display name of the customer.
    pub name: String,
}

/// Customer repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    db: DatabaseConnection,
}

impl CustomerRepository {
    /// Creates a new customer repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create_customer(
        &self,
        input: CreateCustomerInput,
    ) -> Result<customers::Model, CustomerError> {
        let now = chrono::Utc::now().into();
        let customer = customers::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(input.name),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let customer = customer.insert(&self.db).await?;
        info!(customer_id = %customer.id, name = %customer.name, "created customer");
        Ok(customer)
    }

    /// Finds a customer by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_customer_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<customers::Model>, CustomerError> {
        let customer = customers::Entity::find_by_id(id).one(&self.db).await?;
        Ok(customer)
    }

    /// Lists customers ordered by name with pagination.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_customers(
        &self,
        page: &PageRequest,
    ) -> Result<PageResponse<customers::Model>, CustomerError> {
        let query = customers::Entity::find().order_by_asc(customers::Column::Name);

        let total = query.clone().count(&self.db).await?;
        let data = query
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }
}
