//! Invoice lifecycle guards.
//!
//! Pure checks the storage layer runs before mutating an invoice. All of
//! them fail closed: an invoice in any doubtful state is rejected rather
//! than partially processed.

use rust_decimal::Decimal;

use super::error::ReconcileError;
use super::totals::compute_totals;
use super::types::{InvoiceDoc, InvoiceStatus};

/// Lifecycle validation for invoices.
pub struct ReconcileService;

impl ReconcileService {
    /// Validates that the invoice header and folio list can be modified.
    ///
    /// # Errors
    ///
    /// Returns `NotDraft` once the invoice has been submitted or cancelled.
    pub fn validate_can_edit(status: InvoiceStatus) -> Result<(), ReconcileError> {
        if status != InvoiceStatus::Draft {
            return Err(ReconcileError::NotDraft);
        }
        Ok(())
    }

    /// Validates that the invoice can be deleted.
    ///
    /// Deleting a draft releases its folios. Submitted invoices are
    /// cancelled instead, never deleted.
    ///
    /// # Errors
    ///
    /// Returns `CanOnlyDeleteDraft` unless the invoice is a draft.
    pub fn validate_can_delete(status: InvoiceStatus) -> Result<(), ReconcileError> {
        if status != InvoiceStatus::Draft {
            return Err(ReconcileError::CanOnlyDeleteDraft);
        }
        Ok(())
    }

    /// Validates that the invoice can be cancelled.
    ///
    /// Cancellation requires a submitted invoice with nothing posted
    /// against it: captured payments and allocations must be reversed and
    /// applied discounts cancelled first. Pending rows do not block
    /// cancellation; they never posted anything.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError` naming the first blocker found.
    pub fn validate_can_cancel(doc: &InvoiceDoc) -> Result<(), ReconcileError> {
        match doc.status {
            InvoiceStatus::Cancelled => return Err(ReconcileError::AlreadyCancelled),
            InvoiceStatus::Draft => return Err(ReconcileError::NotSubmitted),
            InvoiceStatus::Unpaid | InvoiceStatus::Paid => {}
        }

        let totals = compute_totals(doc);
        if totals.total_paid > Decimal::ZERO {
            return Err(ReconcileError::CannotCancelPaid);
        }
        if totals.total_discount > Decimal::ZERO {
            return Err(ReconcileError::AppliedDiscountsRemain);
        }
        Ok(())
    }

    /// Reports whether a status transition changes folio settlement.
    ///
    /// Returns `Some(true)` when the invoice becomes paid (attached folios
    /// should be marked settled), `Some(false)` when it stops being paid
    /// (the marks come off), and `None` when settlement is unaffected.
    #[must_use]
    pub fn folio_settlement_change(
        previous: InvoiceStatus,
        next: InvoiceStatus,
    ) -> Option<bool> {
        match (
            previous == InvoiceStatus::Paid,
            next == InvoiceStatus::Paid,
        ) {
            (false, true) => Some(true),
            (true, false) => Some(false),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::types::{AllocationRow, DiscountRow, FolioRef, PaymentRow};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use stayra_shared::types::{
        AllocationId, CustomerId, FolioId, InvoiceDiscountId, InvoiceId, InvoicePaymentId,
        JournalEntryId, PaymentEntryId, PaymentModeId,
    };

    fn make_invoice(status: InvoiceStatus) -> InvoiceDoc {
        InvoiceDoc {
            id: InvoiceId::new(),
            customer_id: CustomerId::new(),
            status,
            issued_date: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2026, 8, 31).unwrap(),
            folios: vec![FolioRef {
                folio_id: FolioId::new(),
                amount: dec!(400),
            }],
            payments: vec![],
            allocations: vec![],
            discounts: vec![],
        }
    }

    #[test]
    fn test_can_edit_draft_only() {
        assert!(ReconcileService::validate_can_edit(InvoiceStatus::Draft).is_ok());
        for status in [
            InvoiceStatus::Unpaid,
            InvoiceStatus::Paid,
            InvoiceStatus::Cancelled,
        ] {
            assert!(matches!(
                ReconcileService::validate_can_edit(status),
                Err(ReconcileError::NotDraft)
            ));
        }
    }

    #[test]
    fn test_can_delete_draft_only() {
        assert!(ReconcileService::validate_can_delete(InvoiceStatus::Draft).is_ok());
        assert!(matches!(
            ReconcileService::validate_can_delete(InvoiceStatus::Unpaid),
            Err(ReconcileError::CanOnlyDeleteDraft)
        ));
    }

    #[test]
    fn test_cancel_clean_unpaid_invoice() {
        let doc = make_invoice(InvoiceStatus::Unpaid);
        assert!(ReconcileService::validate_can_cancel(&doc).is_ok());
    }

    #[test]
    fn test_cancel_with_pending_rows_only() {
        let mut doc = make_invoice(InvoiceStatus::Unpaid);
        doc.payments.push(PaymentRow {
            id: InvoicePaymentId::new(),
            payment_date: NaiveDate::from_ymd_opt(2026, 8, 5).unwrap(),
            payment_mode_id: PaymentModeId::new(),
            amount: dec!(100),
            reference_no: None,
            paid: false,
            journal_entry_id: None,
        });
        doc.discounts.push(DiscountRow {
            id: InvoiceDiscountId::new(),
            description: "Pending".to_string(),
            amount: dec!(20),
            journal_entry_id: None,
        });
        // nothing posted yet, cancellation is allowed
        assert!(ReconcileService::validate_can_cancel(&doc).is_ok());
    }

    #[test]
    fn test_cancel_blocked_by_captured_payment() {
        let mut doc = make_invoice(InvoiceStatus::Unpaid);
        doc.payments.push(PaymentRow {
            id: InvoicePaymentId::new(),
            payment_date: NaiveDate::from_ymd_opt(2026, 8, 5).unwrap(),
            payment_mode_id: PaymentModeId::new(),
            amount: dec!(100),
            reference_no: None,
            paid: true,
            journal_entry_id: Some(JournalEntryId::new()),
        });
        assert!(matches!(
            ReconcileService::validate_can_cancel(&doc),
            Err(ReconcileError::CannotCancelPaid)
        ));
    }

    #[test]
    fn test_cancel_blocked_by_allocation() {
        let mut doc = make_invoice(InvoiceStatus::Unpaid);
        doc.allocations.push(AllocationRow {
            id: AllocationId::new(),
            payment_entry_id: PaymentEntryId::new(),
            amount: dec!(50),
        });
        assert!(matches!(
            ReconcileService::validate_can_cancel(&doc),
            Err(ReconcileError::CannotCancelPaid)
        ));
    }

    #[test]
    fn test_cancel_blocked_by_applied_discount() {
        let mut doc = make_invoice(InvoiceStatus::Unpaid);
        doc.discounts.push(DiscountRow {
            id: InvoiceDiscountId::new(),
            description: "Applied".to_string(),
            amount: dec!(20),
            journal_entry_id: Some(JournalEntryId::new()),
        });
        assert!(matches!(
            ReconcileService::validate_can_cancel(&doc),
            Err(ReconcileError::AppliedDiscountsRemain)
        ));
    }

    #[test]
    fn test_cancel_terminal_states() {
        let doc = make_invoice(InvoiceStatus::Cancelled);
        assert!(matches!(
            ReconcileService::validate_can_cancel(&doc),
            Err(ReconcileError::AlreadyCancelled)
        ));

        let doc = make_invoice(InvoiceStatus::Draft);
        assert!(matches!(
            ReconcileService::validate_can_cancel(&doc),
            Err(ReconcileError::NotSubmitted)
        ));
    }

    #[test]
    fn test_folio_settlement_change() {
        assert_eq!(
            ReconcileService::folio_settlement_change(
                InvoiceStatus::Unpaid,
                InvoiceStatus::Paid
            ),
            Some(true)
        );
        assert_eq!(
            ReconcileService::folio_settlement_change(
                InvoiceStatus::Paid,
                InvoiceStatus::Unpaid
            ),
            Some(false)
        );
        assert_eq!(
            ReconcileService::folio_settlement_change(
                InvoiceStatus::Unpaid,
                InvoiceStatus::Unpaid
            ),
            None
        );
        assert_eq!(
            ReconcileService::folio_settlement_change(
                InvoiceStatus::Paid,
                InvoiceStatus::Cancelled
            ),
            Some(false)
        );
    }
}
