//! Discount rows and the apply-discounts batch.
//!
//! Discounts mirror payment rows: entered against the invoice, then applied
//! in a batch that posts one write-off voucher per row and links it back.
//! Only voucher-linked rows reduce the outstanding balance.

use rust_decimal::Decimal;

use super::error::ReconcileError;
use super::types::{DiscountRow, InvoiceDoc, InvoiceStatus};
use super::validation::{check_against_outstanding, committed_total, validate_amount};

/// Input for a new discount row.
#[derive(Debug, Clone)]
pub struct NewDiscountRow {
    /// Reason for the discount.
    pub description: String,
    /// The amount to write off.
    pub amount: Decimal,
}

/// Validates a new discount row against the invoice.
///
/// Uses the same capacity rule as payment rows: the row must fit within the
/// invoice total net of every existing row, pending ones included.
///
/// # Errors
///
/// Returns `ReconcileError` if the invoice cannot take rows, the amount is
/// invalid, or the row does not fit.
pub fn validate_new_discount(doc: &InvoiceDoc, row: &NewDiscountRow) -> Result<(), ReconcileError> {
    if !doc.status.accepts_rows() {
        return Err(ReconcileError::RowsFrozen);
    }
    if doc.folios.is_empty() {
        return Err(ReconcileError::NoFolios);
    }
    validate_amount(row.amount)?;

    let total_amount: Decimal = doc.folios.iter().map(|f| f.amount).sum();
    let available = (total_amount - committed_total(doc)).max(Decimal::ZERO);
    check_against_outstanding(row.amount, available)
}

/// Returns the unapplied discount rows to post, in entry order.
///
/// # Errors
///
/// Returns `ReconcileError` if the invoice is not submitted, has no folios,
/// or has no unapplied rows.
pub fn plan_discount_batch(doc: &InvoiceDoc) -> Result<Vec<DiscountRow>, ReconcileError> {
    match doc.status {
        InvoiceStatus::Draft => return Err(ReconcileError::NotSubmitted),
        InvoiceStatus::Cancelled => return Err(ReconcileError::AlreadyCancelled),
        InvoiceStatus::Unpaid | InvoiceStatus::Paid => {}
    }
    if doc.folios.is_empty() {
        return Err(ReconcileError::NoFolios);
    }

    let pending: Vec<DiscountRow> = doc
        .discounts
        .iter()
        .filter(|d| !d.is_applied())
        .cloned()
        .collect();
    if pending.is_empty() {
        return Err(ReconcileError::NoUnappliedDiscounts);
    }

    Ok(pending)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::types::FolioRef;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use stayra_shared::types::{
        CustomerId, FolioId, InvoiceDiscountId, InvoiceId, JournalEntryId,
    };

    fn make_invoice(status: InvoiceStatus, folio_amount: Decimal) -> InvoiceDoc {
        InvoiceDoc {
            id: InvoiceId::new(),
            customer_id: CustomerId::new(),
            status,
            issued_date: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2026, 6, 30).unwrap(),
            folios: vec![FolioRef {
                folio_id: FolioId::new(),
                amount: folio_amount,
            }],
            payments: vec![],
            allocations: vec![],
            discounts: vec![],
        }
    }

    fn make_discount(amount: Decimal, applied: bool) -> DiscountRow {
        DiscountRow {
            id: InvoiceDiscountId::new(),
            description: "Corporate rate adjustment".to_string(),
            amount,
            journal_entry_id: applied.then(JournalEntryId::new),
        }
    }

    #[test]
    fn test_valid_discount_accepted() {
        let doc = make_invoice(InvoiceStatus::Unpaid, dec!(300));
        let row = NewDiscountRow {
            description: "Goodwill".to_string(),
            amount: dec!(30),
        };
        assert!(validate_new_discount(&doc, &row).is_ok());
    }

    #[test]
    fn test_discount_cannot_exceed_capacity() {
        let mut doc = make_invoice(InvoiceStatus::Unpaid, dec!(300));
        doc.discounts.push(make_discount(dec!(280), false));

        let row = NewDiscountRow {
            description: "Goodwill".to_string(),
            amount: dec!(30),
        };
        assert!(matches!(
            validate_new_discount(&doc, &row),
            Err(ReconcileError::ExceedsOutstanding { outstanding, .. })
                if outstanding == dec!(20)
        ));
    }

    #[test]
    fn test_discount_rows_frozen_when_cancelled() {
        let doc = make_invoice(InvoiceStatus::Cancelled, dec!(300));
        let row = NewDiscountRow {
            description: "Goodwill".to_string(),
            amount: dec!(30),
        };
        assert!(matches!(
            validate_new_discount(&doc, &row),
            Err(ReconcileError::RowsFrozen)
        ));
    }

    #[test]
    fn test_plan_batch_returns_unapplied_only() {
        let mut doc = make_invoice(InvoiceStatus::Unpaid, dec!(300));
        doc.discounts.push(make_discount(dec!(40), true));
        doc.discounts.push(make_discount(dec!(10), false));
        doc.discounts.push(make_discount(dec!(20), false));

        let batch = plan_discount_batch(&doc).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].amount, dec!(10));
        assert_eq!(batch[1].amount, dec!(20));
    }

    #[test]
    fn test_plan_batch_requires_unapplied_rows() {
        let mut doc = make_invoice(InvoiceStatus::Unpaid, dec!(300));
        doc.discounts.push(make_discount(dec!(40), true));
        assert!(matches!(
            plan_discount_batch(&doc),
            Err(ReconcileError::NoUnappliedDiscounts)
        ));
    }

    #[test]
    fn test_plan_batch_requires_submission() {
        let doc = make_invoice(InvoiceStatus::Draft, dec!(300));
        assert!(matches!(
            plan_discount_batch(&doc),
            Err(ReconcileError::NotSubmitted)
        ));
    }
}
