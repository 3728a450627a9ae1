//! Business rule validation for invoice reconciliation.

use std::collections::HashSet;

use rust_decimal::Decimal;
use stayra_shared::types::amount::has_valid_scale;
use stayra_shared::types::{FolioId, InvoiceId};

use super::error::ReconcileError;
use super::totals::compute_totals;
use super::types::{InvoiceDoc, InvoiceStatus, InvoiceTotals};

/// Validates a monetary amount for a new row or voucher.
///
/// Amounts must be strictly positive and fit in two decimal places.
///
/// # Errors
///
/// Returns `ZeroAmount`, `NegativeAmount`, or `InvalidScale`.
pub fn validate_amount(amount: Decimal) -> Result<(), ReconcileError> {
    if amount == Decimal::ZERO {
        return Err(ReconcileError::ZeroAmount);
    }
    if amount < Decimal::ZERO {
        return Err(ReconcileError::NegativeAmount);
    }
    if !has_valid_scale(amount) {
        return Err(ReconcileError::InvalidScale);
    }
    Ok(())
}

/// Checks that an amount fits within an outstanding balance.
///
/// The comparison is exact. There is no tolerance band: one cent over is
/// rejected.
///
/// # Errors
///
/// Returns `ExceedsOutstanding` if the amount is larger than the balance.
pub fn check_against_outstanding(
    amount: Decimal,
    outstanding: Decimal,
) -> Result<(), ReconcileError> {
    if amount > outstanding {
        return Err(ReconcileError::ExceedsOutstanding {
            amount,
            outstanding,
        });
    }
    Ok(())
}

/// Sums every payment, allocation, and discount row on the invoice,
/// regardless of posting state.
///
/// Pending rows are claims on the invoice total: a pending payment row will
/// consume outstanding when it is captured, so new rows must fit alongside
/// it, not just alongside what has already posted.
#[must_use]
pub fn committed_total(doc: &InvoiceDoc) -> Decimal {
    let payments: Decimal = doc.payments.iter().map(|p| p.amount).sum();
    let allocations: Decimal = doc.allocations.iter().map(|a| a.amount).sum();
    let discounts: Decimal = doc.discounts.iter().map(|d| d.amount).sum();
    payments + allocations + discounts
}

/// Validates an invoice for submission and returns its computed totals.
///
/// Submission requires a draft invoice with at least one folio, no folio
/// repeated, no folio held by another non-cancelled invoice, and child rows
/// that fit within the invoice total.
///
/// `holding_invoice` must report the non-cancelled invoice currently holding
/// a folio, excluding the invoice being submitted.
///
/// # Errors
///
/// Returns `ReconcileError` if any submission rule fails.
pub fn validate_submit<H>(
    doc: &InvoiceDoc,
    holding_invoice: H,
) -> Result<InvoiceTotals, ReconcileError>
where
    H: Fn(FolioId) -> Option<InvoiceId>,
{
    if doc.status != InvoiceStatus::Draft {
        return Err(ReconcileError::NotDraft);
    }
    if doc.folios.is_empty() {
        return Err(ReconcileError::NoFolios);
    }

    let mut seen = HashSet::with_capacity(doc.folios.len());
    for folio in &doc.folios {
        if !seen.insert(folio.folio_id) {
            return Err(ReconcileError::DuplicateFolio(folio.folio_id));
        }
        if let Some(invoice) = holding_invoice(folio.folio_id) {
            return Err(ReconcileError::FolioAlreadyInvoiced {
                folio: folio.folio_id,
                invoice,
            });
        }
    }

    let totals = compute_totals(doc);
    let committed = committed_total(doc);
    if committed > totals.total_amount {
        return Err(ReconcileError::RowsExceedTotal {
            committed,
            total: totals.total_amount,
        });
    }

    Ok(totals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::types::{DiscountRow, FolioRef, PaymentRow};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use stayra_shared::types::{
        CustomerId, InvoiceDiscountId, InvoicePaymentId, PaymentModeId,
    };

    fn make_draft(folio_amounts: &[Decimal]) -> InvoiceDoc {
        InvoiceDoc {
            id: InvoiceId::new(),
            customer_id: CustomerId::new(),
            status: InvoiceStatus::Draft,
            issued_date: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2026, 4, 30).unwrap(),
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

    fn no_holder(_folio: FolioId) -> Option<InvoiceId> {
        None
    }

    #[test]
    fn test_validate_amount_positive() {
        assert!(validate_amount(dec!(10.50)).is_ok());
        assert!(validate_amount(dec!(0.01)).is_ok());
    }

    #[test]
    fn test_validate_amount_zero() {
        assert!(matches!(
            validate_amount(dec!(0)),
            Err(ReconcileError::ZeroAmount)
        ));
    }

    #[test]
    fn test_validate_amount_negative() {
        assert!(matches!(
            validate_amount(dec!(-5)),
            Err(ReconcileError::NegativeAmount)
        ));
    }

    #[test]
    fn test_validate_amount_scale() {
        assert!(matches!(
            validate_amount(dec!(1.005)),
            Err(ReconcileError::InvalidScale)
        ));
        // trailing zeros normalize away
        assert!(validate_amount(dec!(1.100)).is_ok());
    }

    #[test]
    fn test_check_against_outstanding_exact_fit() {
        assert!(check_against_outstanding(dec!(80), dec!(80)).is_ok());
    }

    #[test]
    fn test_check_against_outstanding_one_cent_over() {
        assert!(matches!(
            check_against_outstanding(dec!(80.01), dec!(80)),
            Err(ReconcileError::ExceedsOutstanding { .. })
        ));
    }

    #[test]
    fn test_submit_requires_draft() {
        let mut doc = make_draft(&[dec!(100)]);
        doc.status = InvoiceStatus::Unpaid;
        assert!(matches!(
            validate_submit(&doc, no_holder),
            Err(ReconcileError::NotDraft)
        ));
    }

    #[test]
    fn test_submit_requires_folios() {
        let doc = make_draft(&[]);
        assert!(matches!(
            validate_submit(&doc, no_holder),
            Err(ReconcileError::NoFolios)
        ));
    }

    #[test]
    fn test_submit_rejects_duplicate_folio() {
        let mut doc = make_draft(&[dec!(100)]);
        let dup = doc.folios[0].clone();
        doc.folios.push(dup);
        assert!(matches!(
            validate_submit(&doc, no_holder),
            Err(ReconcileError::DuplicateFolio(_))
        ));
    }

    #[test]
    fn test_submit_rejects_held_folio() {
        let doc = make_draft(&[dec!(100), dec!(200)]);
        let contested = doc.folios[1].folio_id;
        let holder = InvoiceId::new();

        let result = validate_submit(&doc, |folio: FolioId| {
            (folio == contested).then_some(holder)
        });
        assert!(matches!(
            result,
            Err(ReconcileError::FolioAlreadyInvoiced { folio, invoice })
                if folio == contested && invoice == holder
        ));
    }

    #[test]
    fn test_submit_returns_totals() {
        let doc = make_draft(&[dec!(100), dec!(250.25)]);
        let totals = validate_submit(&doc, no_holder).unwrap();
        assert_eq!(totals.total_amount, dec!(350.25));
        assert_eq!(totals.outstanding, dec!(350.25));
    }

    #[test]
    fn test_submit_rejects_overcommitted_rows() {
        let mut doc = make_draft(&[dec!(100)]);
        doc.payments.push(PaymentRow {
            id: InvoicePaymentId::new(),
            payment_date: NaiveDate::from_ymd_opt(2026, 4, 2).unwrap(),
            payment_mode_id: PaymentModeId::new(),
            amount: dec!(80),
            reference_no: None,
            paid: false,
            journal_entry_id: None,
        });
        doc.discounts.push(DiscountRow {
            id: InvoiceDiscountId::new(),
            description: "Early settlement".to_string(),
            amount: dec!(30),
            journal_entry_id: None,
        });

        assert!(matches!(
            validate_submit(&doc, no_holder),
            Err(ReconcileError::RowsExceedTotal {
                committed,
                total,
            }) if committed == dec!(110) && total == dec!(100)
        ));
    }

    #[test]
    fn test_submit_allows_exactly_committed_rows() {
        let mut doc = make_draft(&[dec!(100)]);
        doc.payments.push(PaymentRow {
            id: InvoicePaymentId::new(),
            payment_date: NaiveDate::from_ymd_opt(2026, 4, 2).unwrap(),
            payment_mode_id: PaymentModeId::new(),
            amount: dec!(100),
            reference_no: None,
            paid: false,
            journal_entry_id: None,
        });

        let totals = validate_submit(&doc, no_holder).unwrap();
        // pending rows are claims, not postings
        assert_eq!(totals.total_paid, dec!(0));
        assert_eq!(totals.outstanding, dec!(100));
    }
}
