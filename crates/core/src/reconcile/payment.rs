//! Direct payment rows and the make-payment batch.
//!
//! Payment rows are entered against a submitted invoice and captured in a
//! later step: capture posts one journal voucher per row, links it back, and
//! sets the paid flag. Validation here is the pure part; posting lives in
//! the storage layer.

use rust_decimal::Decimal;

use chrono::NaiveDate;
use stayra_shared::types::{AccountId, PaymentModeId};

use super::error::ReconcileError;
use super::types::{InvoiceDoc, InvoiceStatus, PaymentRow};
use super::validation::{check_against_outstanding, committed_total, validate_amount};

/// Payment mode fields needed for payment validation and posting.
#[derive(Debug, Clone)]
pub struct PaymentModeInfo {
    /// The payment mode ID.
    pub id: PaymentModeId,
    /// The account debited when this mode settles a payment.
    pub account_id: AccountId,
    /// Whether this mode is the city ledger itself. The city ledger mode
    /// routes charges onto folios and can never settle its own invoices.
    pub is_city_ledger: bool,
}

/// Input for a new payment row.
#[derive(Debug, Clone)]
pub struct NewPaymentRow {
    /// The date the payment was received.
    pub payment_date: NaiveDate,
    /// The mode of payment settling this row.
    pub payment_mode_id: PaymentModeId,
    /// The amount received.
    pub amount: Decimal,
    /// Optional external reference (cheque number, transfer id).
    pub reference_no: Option<String>,
}

/// Validates a new payment row against the invoice and its payment mode.
///
/// The row must fit within the invoice total net of every existing row,
/// pending rows included. A pending row is a claim: it will consume
/// outstanding when captured, so a new row cannot promise the same money.
///
/// # Errors
///
/// Returns `ReconcileError` if the invoice cannot take rows, the amount is
/// invalid, the mode is unusable, or the row does not fit.
pub fn validate_new_payment<M>(
    doc: &InvoiceDoc,
    row: &NewPaymentRow,
    mode_lookup: M,
) -> Result<PaymentModeInfo, ReconcileError>
where
    M: Fn(PaymentModeId) -> Result<PaymentModeInfo, ReconcileError>,
{
    if !doc.status.accepts_rows() {
        return Err(ReconcileError::RowsFrozen);
    }
    if doc.folios.is_empty() {
        return Err(ReconcileError::NoFolios);
    }
    validate_amount(row.amount)?;

    let mode = mode_lookup(row.payment_mode_id)?;
    if mode.is_city_ledger {
        return Err(ReconcileError::ModeNotSettleable(row.payment_mode_id));
    }

    let total_amount: Decimal = doc.folios.iter().map(|f| f.amount).sum();
    let available = (total_amount - committed_total(doc)).max(Decimal::ZERO);
    check_against_outstanding(row.amount, available)?;

    Ok(mode)
}

/// Returns the pending payment rows to capture, in entry order.
///
/// # Errors
///
/// Returns `ReconcileError` if the invoice is not submitted, has no folios,
/// or has no pending rows.
pub fn plan_payment_batch(doc: &InvoiceDoc) -> Result<Vec<PaymentRow>, ReconcileError> {
    match doc.status {
        InvoiceStatus::Draft => return Err(ReconcileError::NotSubmitted),
        InvoiceStatus::Cancelled => return Err(ReconcileError::AlreadyCancelled),
        InvoiceStatus::Unpaid | InvoiceStatus::Paid => {}
    }
    if doc.folios.is_empty() {
        return Err(ReconcileError::NoFolios);
    }

    let pending: Vec<PaymentRow> = doc
        .payments
        .iter()
        .filter(|p| !p.paid)
        .cloned()
        .collect();
    if pending.is_empty() {
        return Err(ReconcileError::NoUnpaidPayments);
    }

    Ok(pending)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::types::FolioRef;
    use rust_decimal_macros::dec;
    use stayra_shared::types::{CustomerId, FolioId, InvoiceId, InvoicePaymentId};

    fn make_invoice(status: InvoiceStatus, folio_amount: Decimal) -> InvoiceDoc {
        InvoiceDoc {
            id: InvoiceId::new(),
            customer_id: CustomerId::new(),
            status,
            issued_date: NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2026, 5, 31).unwrap(),
            folios: vec![FolioRef {
                folio_id: FolioId::new(),
                amount: folio_amount,
            }],
            payments: vec![],
            allocations: vec![],
            discounts: vec![],
        }
    }

    fn make_row(amount: Decimal) -> NewPaymentRow {
        NewPaymentRow {
            payment_date: NaiveDate::from_ymd_opt(2026, 5, 10).unwrap(),
            payment_mode_id: PaymentModeId::new(),
            amount,
            reference_no: None,
        }
    }

    fn cash_mode(id: PaymentModeId) -> Result<PaymentModeInfo, ReconcileError> {
        Ok(PaymentModeInfo {
            id,
            account_id: AccountId::new(),
            is_city_ledger: false,
        })
    }

    #[test]
    fn test_valid_row_accepted() {
        let doc = make_invoice(InvoiceStatus::Unpaid, dec!(500));
        let result = validate_new_payment(&doc, &make_row(dec!(200)), cash_mode);
        assert!(result.is_ok());
    }

    #[test]
    fn test_rows_frozen_when_paid() {
        let doc = make_invoice(InvoiceStatus::Paid, dec!(500));
        assert!(matches!(
            validate_new_payment(&doc, &make_row(dec!(10)), cash_mode),
            Err(ReconcileError::RowsFrozen)
        ));
    }

    #[test]
    fn test_requires_folios() {
        let mut doc = make_invoice(InvoiceStatus::Draft, dec!(0));
        doc.folios.clear();
        assert!(matches!(
            validate_new_payment(&doc, &make_row(dec!(10)), cash_mode),
            Err(ReconcileError::NoFolios)
        ));
    }

    #[test]
    fn test_rejects_city_ledger_mode() {
        let doc = make_invoice(InvoiceStatus::Unpaid, dec!(500));
        let city_ledger = |id: PaymentModeId| {
            Ok(PaymentModeInfo {
                id,
                account_id: AccountId::new(),
                is_city_ledger: true,
            })
        };
        assert!(matches!(
            validate_new_payment(&doc, &make_row(dec!(10)), city_ledger),
            Err(ReconcileError::ModeNotSettleable(_))
        ));
    }

    #[test]
    fn test_pending_rows_claim_capacity() {
        let mut doc = make_invoice(InvoiceStatus::Unpaid, dec!(500));
        doc.payments.push(PaymentRow {
            id: InvoicePaymentId::new(),
            payment_date: NaiveDate::from_ymd_opt(2026, 5, 2).unwrap(),
            payment_mode_id: PaymentModeId::new(),
            amount: dec!(450),
            reference_no: None,
            paid: false,
            journal_entry_id: None,
        });

        // 450 is still pending, so only 50 of capacity remains
        assert!(matches!(
            validate_new_payment(&doc, &make_row(dec!(60)), cash_mode),
            Err(ReconcileError::ExceedsOutstanding {
                outstanding,
                ..
            }) if outstanding == dec!(50)
        ));
        assert!(validate_new_payment(&doc, &make_row(dec!(50)), cash_mode).is_ok());
    }

    #[test]
    fn test_plan_batch_requires_submission() {
        let doc = make_invoice(InvoiceStatus::Draft, dec!(500));
        assert!(matches!(
            plan_payment_batch(&doc),
            Err(ReconcileError::NotSubmitted)
        ));

        let doc = make_invoice(InvoiceStatus::Cancelled, dec!(500));
        assert!(matches!(
            plan_payment_batch(&doc),
            Err(ReconcileError::AlreadyCancelled)
        ));
    }

    #[test]
    fn test_plan_batch_returns_pending_in_order() {
        let mut doc = make_invoice(InvoiceStatus::Unpaid, dec!(500));
        let captured = PaymentRow {
            id: InvoicePaymentId::new(),
            payment_date: NaiveDate::from_ymd_opt(2026, 5, 2).unwrap(),
            payment_mode_id: PaymentModeId::new(),
            amount: dec!(100),
            reference_no: None,
            paid: true,
            journal_entry_id: None,
        };
        let first_pending = PaymentRow {
            amount: dec!(150),
            paid: false,
            ..captured.clone()
        };
        let second_pending = PaymentRow {
            amount: dec!(250),
            paid: false,
            ..captured.clone()
        };
        doc.payments = vec![
            captured,
            first_pending.clone(),
            second_pending.clone(),
        ];

        let batch = plan_payment_batch(&doc).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].amount, dec!(150));
        assert_eq!(batch[1].amount, dec!(250));
    }

    #[test]
    fn test_plan_batch_empty_when_all_captured() {
        let mut doc = make_invoice(InvoiceStatus::Unpaid, dec!(500));
        doc.payments.push(PaymentRow {
            id: InvoicePaymentId::new(),
            payment_date: NaiveDate::from_ymd_opt(2026, 5, 2).unwrap(),
            payment_mode_id: PaymentModeId::new(),
            amount: dec!(100),
            reference_no: None,
            paid: true,
            journal_entry_id: None,
        });
        assert!(matches!(
            plan_payment_batch(&doc),
            Err(ReconcileError::NoUnpaidPayments)
        ));
    }
}
