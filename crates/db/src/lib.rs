//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repository abstractions for data access
//! - The per-invoice lock registry serializing reconciliation
//! - Database migrations

pub mod entities;
pub mod locks;
pub mod migration;
pub mod repositories;

pub use locks::InvoiceLocks;
pub use repositories::{
    AccountRepository, CustomerRepository, FolioRepository, InvoiceRepository, JournalRepository,
    PaymentEntryRepository, PaymentModeRepository, SettingsRepository,
};

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection pool to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(
    database_url: &str,
    max_connections: u32,
    min_connections: u32,
) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url);
    options
        .max_connections(max_connections)
        .min_connections(min_connections);
    Database::connect(options).await
}
