//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//!
//! The reconciliation repositories (`invoice`, `payment_entry`, `journal`)
//! share [`ReconcileError`] so validation failures and database failures
//! travel the same path to the API layer. Master data repositories carry
//! their own small error types.

pub mod account;
pub mod customer;
pub mod folio;
pub mod invoice;
pub mod journal;
pub mod payment_entry;
pub mod payment_mode;
pub mod settings;

pub use account::{AccountError, AccountRepository, CreateAccountInput};
pub use customer::{CreateCustomerInput, CustomerError, CustomerRepository};
pub use folio::{CreateFolioInput, FolioError, FolioFilter, FolioRepository};
pub use invoice::{
    BatchOutcome, CreateInvoiceInput, InvoiceFilter, InvoiceRepository, InvoiceWithRows,
};
pub use journal::{JournalEntryWithLines, JournalRepository, VoucherCancellation};
pub use payment_entry::{
    CreatePaymentEntryInput, EntryRemaining, PaymentEntryCancellation, PaymentEntryRepository,
};
pub use payment_mode::{CreatePaymentModeInput, PaymentModeError, PaymentModeRepository};
pub use settings::{SettingsError, SettingsRepository};

use sea_orm::DbErr;
use stayra_core::reconcile::ReconcileError;

/// Folds a database failure into the shared reconciliation error.
pub(crate) fn db_err(err: DbErr) -> ReconcileError {
    ReconcileError::Database(err.to_string())
}
