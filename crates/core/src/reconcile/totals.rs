//! Invoice totals recomputation.
//!
//! Totals are always derived in full from the invoice's child rows. No code
//! path adjusts a stored total incrementally: after any mutation the caller
//! recomputes from the rows and persists the result. This keeps the stored
//! totals consistent with the rows even after partial batch failures.

use rust_decimal::Decimal;

use super::types::{InvoiceDoc, InvoiceStatus, InvoiceTotals};

/// Computes invoice totals from the attached folios and child rows.
///
/// Only rows that have actually posted count:
/// - payment rows with the paid flag set,
/// - every allocation row (they exist only while their entry is submitted),
/// - discount rows linked to a journal voucher.
///
/// Pending payment rows and unapplied discounts contribute nothing.
#[must_use]
pub fn compute_totals(doc: &InvoiceDoc) -> InvoiceTotals {
    let total_amount: Decimal = doc.folios.iter().map(|f| f.amount).sum();

    let paid_rows: Decimal = doc
        .payments
        .iter()
        .filter(|p| p.paid)
        .map(|p| p.amount)
        .sum();
    let allocated: Decimal = doc.allocations.iter().map(|a| a.amount).sum();

    let total_discount: Decimal = doc
        .discounts
        .iter()
        .filter(|d| d.is_applied())
        .map(|d| d.amount)
        .sum();

    InvoiceTotals::new(total_amount, paid_rows + allocated, total_discount)
}

/// Derives the invoice status from freshly computed totals.
///
/// Draft and cancelled invoices keep their status regardless of totals.
/// Submitted invoices flip between `Unpaid` and `Paid` as the outstanding
/// balance crosses zero, in both directions.
#[must_use]
pub fn derive_status(current: InvoiceStatus, totals: &InvoiceTotals) -> InvoiceStatus {
    match current {
        InvoiceStatus::Draft | InvoiceStatus::Cancelled => current,
        InvoiceStatus::Unpaid | InvoiceStatus::Paid => {
            if totals.is_settled {
                InvoiceStatus::Paid
            } else {
                InvoiceStatus::Unpaid
            }
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

    fn make_doc(folio_amounts: &[Decimal]) -> InvoiceDoc {
        InvoiceDoc {
            id: InvoiceId::new(),
            customer_id: CustomerId::new(),
            status: InvoiceStatus::Unpaid,
            issued_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
            folios: folio_amounts
                .iter()
                .map(|amount| FolioRef {
                    folio_id: FolioId::new(),
                    amount: *amount,
                })
                .collect(),
            payments: vec![],
            allocations: vec![],
            discounts: vec![],
        }
    }

    fn make_payment(amount: Decimal, paid: bool) -> PaymentRow {
        PaymentRow {
            id: InvoicePaymentId::new(),
            payment_date: NaiveDate::from_ymd_opt(2026, 3, 5).unwrap(),
            payment_mode_id: PaymentModeId::new(),
            amount,
            reference_no: None,
            paid,
            journal_entry_id: paid.then(JournalEntryId::new),
        }
    }

    fn make_allocation(amount: Decimal) -> AllocationRow {
        AllocationRow {
            id: AllocationId::new(),
            payment_entry_id: PaymentEntryId::new(),
            amount,
        }
    }

    fn make_discount(amount: Decimal, applied: bool) -> DiscountRow {
        DiscountRow {
            id: InvoiceDiscountId::new(),
            description: "Goodwill".to_string(),
            amount,
            journal_entry_id: applied.then(JournalEntryId::new),
        }
    }

    #[test]
    fn test_empty_invoice_totals() {
        let doc = make_doc(&[]);
        let totals = compute_totals(&doc);
        assert_eq!(totals.total_amount, dec!(0));
        assert_eq!(totals.total_paid, dec!(0));
        assert_eq!(totals.outstanding, dec!(0));
        assert!(totals.is_settled);
    }

    #[test]
    fn test_total_amount_sums_folios() {
        let doc = make_doc(&[dec!(150.00), dec!(320.50)]);
        let totals = compute_totals(&doc);
        assert_eq!(totals.total_amount, dec!(470.50));
        assert_eq!(totals.outstanding, dec!(470.50));
    }

    #[test]
    fn test_pending_payment_rows_do_not_count() {
        let mut doc = make_doc(&[dec!(500)]);
        doc.payments.push(make_payment(dec!(200), false));
        doc.payments.push(make_payment(dec!(100), true));

        let totals = compute_totals(&doc);
        assert_eq!(totals.total_paid, dec!(100));
        assert_eq!(totals.outstanding, dec!(400));
    }

    #[test]
    fn test_allocations_always_count() {
        let mut doc = make_doc(&[dec!(500)]);
        doc.allocations.push(make_allocation(dec!(120)));
        doc.allocations.push(make_allocation(dec!(80)));

        let totals = compute_totals(&doc);
        assert_eq!(totals.total_paid, dec!(200));
        assert_eq!(totals.outstanding, dec!(300));
    }

    #[test]
    fn test_unapplied_discounts_do_not_count() {
        let mut doc = make_doc(&[dec!(500)]);
        doc.discounts.push(make_discount(dec!(50), false));
        doc.discounts.push(make_discount(dec!(25), true));

        let totals = compute_totals(&doc);
        assert_eq!(totals.total_discount, dec!(25));
        assert_eq!(totals.outstanding, dec!(475));
    }

    #[test]
    fn test_mixed_rows_settle_exactly() {
        let mut doc = make_doc(&[dec!(500)]);
        doc.payments.push(make_payment(dec!(300), true));
        doc.allocations.push(make_allocation(dec!(150)));
        doc.discounts.push(make_discount(dec!(50), true));

        let totals = compute_totals(&doc);
        assert_eq!(totals.total_paid, dec!(450));
        assert_eq!(totals.total_discount, dec!(50));
        assert_eq!(totals.outstanding, dec!(0));
        assert!(totals.is_settled);
    }

    #[test]
    fn test_one_cent_short_is_not_settled() {
        let mut doc = make_doc(&[dec!(100.00)]);
        doc.payments.push(make_payment(dec!(99.99), true));

        let totals = compute_totals(&doc);
        assert_eq!(totals.outstanding, dec!(0.01));
        assert!(!totals.is_settled);
        assert_eq!(
            derive_status(InvoiceStatus::Unpaid, &totals),
            InvoiceStatus::Unpaid
        );
    }

    #[test]
    fn test_derive_status_flips_to_paid() {
        let mut doc = make_doc(&[dec!(200)]);
        doc.payments.push(make_payment(dec!(200), true));

        let totals = compute_totals(&doc);
        assert_eq!(
            derive_status(InvoiceStatus::Unpaid, &totals),
            InvoiceStatus::Paid
        );
    }

    #[test]
    fn test_derive_status_flips_back_to_unpaid() {
        let doc = make_doc(&[dec!(200)]);
        let totals = compute_totals(&doc);
        assert_eq!(
            derive_status(InvoiceStatus::Paid, &totals),
            InvoiceStatus::Unpaid
        );
    }

    #[test]
    fn test_derive_status_keeps_draft_and_cancelled() {
        let doc = make_doc(&[]);
        let totals = compute_totals(&doc);
        assert!(totals.is_settled);
        assert_eq!(
            derive_status(InvoiceStatus::Draft, &totals),
            InvoiceStatus::Draft
        );
        assert_eq!(
            derive_status(InvoiceStatus::Cancelled, &totals),
            InvoiceStatus::Cancelled
        );
    }
}
