//! Error types for invoice reconciliation.
//!
//! This module defines all errors that can occur while attaching folios,
//! submitting invoices, processing payments and discounts, allocating
//! payment entries, and reversing vouchers.

use rust_decimal::Decimal;
use stayra_shared::types::{
    CustomerId, FolioId, InvoiceId, InvoicePaymentId, JournalEntryId, PaymentEntryId,
    PaymentModeId,
};
use thiserror::Error;

use super::types::InvoiceStatus;

/// Errors that can occur during reconciliation operations.
#[derive(Debug, Error)]
pub enum ReconcileError {
    // ========== Folio Attachment Errors ==========
    /// Invoice has no folios attached.
    #[error("Invoice has no folios to be collected")]
    NoFolios,

    /// The same folio appears more than once on the invoice.
    #[error("Folio {0} appears more than once")]
    DuplicateFolio(FolioId),

    /// Folio not found.
    #[error("Folio not found: {0}")]
    FolioNotFound(FolioId),

    /// Folio belongs to a different customer than the invoice.
    #[error("Folio {0} belongs to a different customer")]
    FolioCustomerMismatch(FolioId),

    /// Folio has already been settled and has no balance to collect.
    #[error("Folio {0} is already settled")]
    FolioSettled(FolioId),

    /// Folio is already collected by another non-cancelled invoice.
    #[error("Folio {folio} is already collected by invoice {invoice}")]
    FolioAlreadyInvoiced {
        /// The contested folio.
        folio: FolioId,
        /// The invoice already holding it.
        invoice: InvoiceId,
    },

    // ========== Invoice State Errors ==========
    /// Customer not found.
    #[error("Customer not found: {0}")]
    CustomerNotFound(CustomerId),

    /// Invoice not found.
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(InvoiceId),

    /// Only draft invoices can be modified.
    #[error("Only draft invoices can be modified")]
    NotDraft,

    /// Only draft invoices can be deleted.
    #[error("Only draft invoices can be deleted")]
    CanOnlyDeleteDraft,

    /// Operation requires a submitted invoice.
    #[error("Invoice has not been submitted")]
    NotSubmitted,

    /// Rows can no longer be added to this invoice.
    #[error("Rows can only be added while the invoice is draft or unpaid")]
    RowsFrozen,

    /// Invoice is already cancelled.
    #[error("Invoice is already cancelled")]
    AlreadyCancelled,

    /// Invoice has captured payments and cannot be cancelled.
    #[error("Cannot cancel an invoice with captured payments. Reverse the payments first")]
    CannotCancelPaid,

    /// Invoice has applied discounts and cannot be cancelled.
    #[error("Cannot cancel an invoice with applied discounts. Cancel the discount vouchers first")]
    AppliedDiscountsRemain,

    // ========== Amount Errors ==========
    /// Amount cannot be zero.
    #[error("Amount cannot be zero")]
    ZeroAmount,

    /// Amount cannot be negative.
    #[error("Amount cannot be negative")]
    NegativeAmount,

    /// Amount carries more precision than money columns hold.
    #[error("Amount cannot have more than two decimal places")]
    InvalidScale,

    /// Amount exceeds the invoice's outstanding balance.
    #[error("Amount {amount} exceeds the outstanding balance {outstanding}")]
    ExceedsOutstanding {
        /// The amount requested.
        amount: Decimal,
        /// The outstanding balance available.
        outstanding: Decimal,
    },

    /// Payment and discount rows together exceed the invoice total.
    #[error("Payment and discount rows ({committed}) exceed the invoice total ({total})")]
    RowsExceedTotal {
        /// Sum of all payment, allocation, and discount rows.
        committed: Decimal,
        /// The invoice total amount.
        total: Decimal,
    },

    // ========== Payment Processing Errors ==========
    /// No pending payment rows to capture.
    #[error("No unpaid payment rows to process")]
    NoUnpaidPayments,

    /// No pending discount rows to apply.
    #[error("No unapplied discount rows to process")]
    NoUnappliedDiscounts,

    /// Payment mode not found.
    #[error("Payment mode not found: {0}")]
    PaymentModeNotFound(PaymentModeId),

    /// Payment mode cannot be used to settle city ledger invoices.
    #[error("Payment mode {0} cannot settle city ledger invoices")]
    ModeNotSettleable(PaymentModeId),

    /// Payment row not found on the invoice.
    #[error("Payment row not found: {0}")]
    PaymentRowNotFound(InvoicePaymentId),

    /// Payment row has already been captured into a voucher.
    #[error("Payment row {0} is already captured. Cancel its voucher to reverse it")]
    RowAlreadyCaptured(InvoicePaymentId),

    // ========== Payment Entry Allocation Errors ==========
    /// Payment entry not found.
    #[error("Payment entry not found: {0}")]
    EntryNotFound(PaymentEntryId),

    /// Payment entry has already been submitted.
    #[error("Payment entry has already been submitted")]
    EntryNotDraft,

    /// Only submitted payment entries can be cancelled.
    #[error("Only submitted payment entries can be cancelled")]
    EntryNotSubmitted,

    /// Payment entry is already cancelled.
    #[error("Payment entry is already cancelled")]
    EntryAlreadyCancelled,

    /// Allocated rows must exactly consume the payment entry amount.
    #[error("Allocated total {allocated} must equal the payment entry amount {entry_amount}")]
    AllocationMismatch {
        /// Sum of the requested allocation rows.
        allocated: Decimal,
        /// The payment entry's paid amount.
        entry_amount: Decimal,
    },

    /// Payment entry already has live allocation rows.
    #[error("Payment entry already has allocations totalling {0}. Cancel it to reverse them")]
    ExistingAllocations(Decimal),

    /// Target invoice belongs to a different customer than the entry.
    #[error("Invoice {0} belongs to a different customer")]
    AllocationCustomerMismatch(InvoiceId),

    /// Target invoice is not in a state that accepts allocations.
    #[error("Invoice {invoice} cannot receive allocations while {status}")]
    InvoiceNotAllocatable {
        /// The target invoice.
        invoice: InvoiceId,
        /// Its current status.
        status: InvoiceStatus,
    },

    /// Allocation exceeds the target invoice's outstanding balance.
    #[error("Allocation of {amount} to invoice {invoice} exceeds its outstanding balance {outstanding}")]
    OverAllocation {
        /// The target invoice.
        invoice: InvoiceId,
        /// The combined amount allocated to it.
        amount: Decimal,
        /// Its outstanding balance.
        outstanding: Decimal,
    },

    /// Allocations to one invoice would exceed the payment entry amount.
    #[error("Allocations to invoice {0} would exceed the payment entry amount")]
    AllocationOverrun(InvoiceId),

    // ========== Voucher Errors ==========
    /// Journal voucher not found.
    #[error("Journal voucher not found: {0}")]
    VoucherNotFound(JournalEntryId),

    /// Journal voucher is already cancelled.
    #[error("Journal voucher is already cancelled")]
    VoucherAlreadyCancelled,

    // ========== Database Errors ==========
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ReconcileError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoFolios => "NO_FOLIOS",
            Self::DuplicateFolio(_) => "DUPLICATE_FOLIO",
            Self::FolioNotFound(_) => "FOLIO_NOT_FOUND",
            Self::FolioCustomerMismatch(_) => "FOLIO_CUSTOMER_MISMATCH",
            Self::FolioSettled(_) => "FOLIO_SETTLED",
            Self::FolioAlreadyInvoiced { .. } => "FOLIO_ALREADY_INVOICED",
            Self::CustomerNotFound(_) => "CUSTOMER_NOT_FOUND",
            Self::InvoiceNotFound(_) => "INVOICE_NOT_FOUND",
            Self::NotDraft => "NOT_DRAFT",
            Self::CanOnlyDeleteDraft => "CAN_ONLY_DELETE_DRAFT",
            Self::NotSubmitted => "NOT_SUBMITTED",
            Self::RowsFrozen => "ROWS_FROZEN",
            Self::AlreadyCancelled => "ALREADY_CANCELLED",
            Self::CannotCancelPaid => "CANNOT_CANCEL_PAID",
            Self::AppliedDiscountsRemain => "APPLIED_DISCOUNTS_REMAIN",
            Self::ZeroAmount => "ZERO_AMOUNT",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::InvalidScale => "INVALID_SCALE",
            Self::ExceedsOutstanding { .. } => "EXCEEDS_OUTSTANDING",
            Self::RowsExceedTotal { .. } => "ROWS_EXCEED_TOTAL",
            Self::NoUnpaidPayments => "NO_UNPAID_PAYMENTS",
            Self::NoUnappliedDiscounts => "NO_UNAPPLIED_DISCOUNTS",
            Self::PaymentModeNotFound(_) => "PAYMENT_MODE_NOT_FOUND",
            Self::ModeNotSettleable(_) => "MODE_NOT_SETTLEABLE",
            Self::PaymentRowNotFound(_) => "PAYMENT_ROW_NOT_FOUND",
            Self::RowAlreadyCaptured(_) => "ROW_ALREADY_CAPTURED",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::EntryNotDraft => "ENTRY_NOT_DRAFT",
            Self::EntryNotSubmitted => "ENTRY_NOT_SUBMITTED",
            Self::EntryAlreadyCancelled => "ENTRY_ALREADY_CANCELLED",
            Self::AllocationMismatch { .. } => "ALLOCATION_MISMATCH",
            Self::ExistingAllocations(_) => "EXISTING_ALLOCATIONS",
            Self::AllocationCustomerMismatch(_) => "ALLOCATION_CUSTOMER_MISMATCH",
            Self::InvoiceNotAllocatable { .. } => "INVOICE_NOT_ALLOCATABLE",
            Self::OverAllocation { .. } => "OVER_ALLOCATION",
            Self::AllocationOverrun(_) => "ALLOCATION_OVERRUN",
            Self::VoucherNotFound(_) => "VOUCHER_NOT_FOUND",
            Self::VoucherAlreadyCancelled => "VOUCHER_ALREADY_CANCELLED",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - malformed amounts
            Self::ZeroAmount | Self::NegativeAmount | Self::InvalidScale => 400,

            // 404 Not Found
            Self::CustomerNotFound(_)
            | Self::FolioNotFound(_)
            | Self::InvoiceNotFound(_)
            | Self::PaymentModeNotFound(_)
            | Self::PaymentRowNotFound(_)
            | Self::EntryNotFound(_)
            | Self::VoucherNotFound(_) => 404,

            // 409 Conflict - state already moved on
            Self::FolioAlreadyInvoiced { .. }
            | Self::AlreadyCancelled
            | Self::RowAlreadyCaptured(_)
            | Self::EntryNotDraft
            | Self::EntryAlreadyCancelled
            | Self::ExistingAllocations(_)
            | Self::VoucherAlreadyCancelled => 409,

            // 422 Unprocessable Entity - business rule violations
            Self::NoFolios
            | Self::DuplicateFolio(_)
            | Self::FolioCustomerMismatch(_)
            | Self::FolioSettled(_)
            | Self::NotDraft
            | Self::CanOnlyDeleteDraft
            | Self::NotSubmitted
            | Self::RowsFrozen
            | Self::CannotCancelPaid
            | Self::AppliedDiscountsRemain
            | Self::ExceedsOutstanding { .. }
            | Self::RowsExceedTotal { .. }
            | Self::NoUnpaidPayments
            | Self::NoUnappliedDiscounts
            | Self::ModeNotSettleable(_)
            | Self::EntryNotSubmitted
            | Self::AllocationMismatch { .. }
            | Self::AllocationCustomerMismatch(_)
            | Self::InvoiceNotAllocatable { .. }
            | Self::OverAllocation { .. }
            | Self::AllocationOverrun(_) => 422,

            // 500 Internal Server Error
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(ReconcileError::NoFolios.error_code(), "NO_FOLIOS");
        assert_eq!(
            ReconcileError::ExceedsOutstanding {
                amount: dec!(100),
                outstanding: dec!(50),
            }
            .error_code(),
            "EXCEEDS_OUTSTANDING"
        );
        assert_eq!(
            ReconcileError::AllocationMismatch {
                allocated: dec!(80),
                entry_amount: dec!(100),
            }
            .error_code(),
            "ALLOCATION_MISMATCH"
        );
        assert_eq!(
            ReconcileError::VoucherAlreadyCancelled.error_code(),
            "VOUCHER_ALREADY_CANCELLED"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(ReconcileError::ZeroAmount.http_status_code(), 400);
        assert_eq!(
            ReconcileError::InvoiceNotFound(InvoiceId::new()).http_status_code(),
            404
        );
        assert_eq!(
            ReconcileError::FolioAlreadyInvoiced {
                folio: FolioId::new(),
                invoice: InvoiceId::new(),
            }
            .http_status_code(),
            409
        );
        assert_eq!(ReconcileError::CannotCancelPaid.http_status_code(), 422);
        assert_eq!(
            ReconcileError::Database("connection reset".to_string()).http_status_code(),
            500
        );
    }

    #[test]
    fn test_error_display() {
        let err = ReconcileError::ExceedsOutstanding {
            amount: dec!(120.00),
            outstanding: dec!(80.00),
        };
        assert_eq!(
            err.to_string(),
            "Amount 120.00 exceeds the outstanding balance 80.00"
        );

        let err = ReconcileError::AllocationMismatch {
            allocated: dec!(90.00),
            entry_amount: dec!(100.00),
        };
        assert_eq!(
            err.to_string(),
            "Allocated total 90.00 must equal the payment entry amount 100.00"
        );

        let folio = FolioId::new();
        let invoice = InvoiceId::new();
        let err = ReconcileError::FolioAlreadyInvoiced { folio, invoice };
        assert_eq!(
            err.to_string(),
            format!("Folio {folio} is already collected by invoice {invoice}")
        );
    }
}
