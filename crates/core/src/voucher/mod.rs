//! Settlement voucher construction.
//!
//! Pure builders for the journal vouchers that back payment captures and
//! discount applications.

pub mod builder;
pub mod types;

pub use builder::{SettlementAccounts, VoucherService};
pub use types::{JournalLineDraft, VoucherDraft};
