//! City ledger invoice reconciliation.
//!
//! This module implements the reconciliation engine:
//! - Invoice, folio, and child row domain types
//! - Totals recomputation and status derivation
//! - Folio attachment and submission rules
//! - Direct payment and discount row validation
//! - Payment entry allocation across invoices
//! - Exact voucher reversal
//! - Error types for reconciliation operations

pub mod allocation;
pub mod discount;
pub mod error;
pub mod folio;
pub mod payment;
pub mod reversal;
pub mod service;
pub mod totals;
pub mod types;
pub mod validation;

#[cfg(test)]
mod allocation_props;
#[cfg(test)]
mod totals_props;

pub use allocation::{
    AllocationPlan, AllocationRequest, InvoiceAllocationView, PaymentEntryInfo,
};
pub use discount::NewDiscountRow;
pub use error::ReconcileError;
pub use folio::FolioInfo;
pub use payment::{NewPaymentRow, PaymentModeInfo};
pub use reversal::VoucherRow;
pub use service::ReconcileService;
pub use totals::{compute_totals, derive_status};
pub use types::{
    AllocationRow, DiscountRow, FolioRef, InvoiceDoc, InvoiceStatus, InvoiceTotals,
    PaymentEntryStatus, PaymentRow, VoucherStatus,
};
