//! Voucher reversal.
//!
//! Every reversal undoes exactly what the forward operation did, nothing
//! more. Capturing a payment row set its paid flag and voucher link, so
//! cancelling that voucher clears them and the row returns to pending.
//! Submitting a payment entry created allocation rows, so cancelling the
//! entry removes them. The caller recomputes totals afterwards; reversal
//! never touches totals itself.

use stayra_shared::types::{InvoiceDiscountId, InvoicePaymentId, JournalEntryId, PaymentEntryId};

use super::error::ReconcileError;
use super::types::{AllocationRow, InvoiceDoc, VoucherStatus};

/// An invoice row backed by a journal voucher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoucherRow {
    /// A captured payment row.
    Payment(InvoicePaymentId),
    /// An applied discount row.
    Discount(InvoiceDiscountId),
}

/// Finds the invoice row backed by the given voucher, if any.
#[must_use]
pub fn find_voucher_row(doc: &InvoiceDoc, journal_entry_id: JournalEntryId) -> Option<VoucherRow> {
    if let Some(row) = doc
        .payments
        .iter()
        .find(|p| p.journal_entry_id == Some(journal_entry_id))
    {
        return Some(VoucherRow::Payment(row.id));
    }
    doc.discounts
        .iter()
        .find(|d| d.journal_entry_id == Some(journal_entry_id))
        .map(|d| VoucherRow::Discount(d.id))
}

/// Reverses the row backed by the given voucher.
///
/// A payment row loses its paid flag and voucher link; a discount row loses
/// its voucher link. Returns which row was reversed, or `None` if the
/// voucher backs no row on this invoice.
pub fn unlink_voucher_row(
    doc: &mut InvoiceDoc,
    journal_entry_id: JournalEntryId,
) -> Option<VoucherRow> {
    if let Some(row) = doc
        .payments
        .iter_mut()
        .find(|p| p.journal_entry_id == Some(journal_entry_id))
    {
        row.paid = false;
        row.journal_entry_id = None;
        return Some(VoucherRow::Payment(row.id));
    }

    if let Some(row) = doc
        .discounts
        .iter_mut()
        .find(|d| d.journal_entry_id == Some(journal_entry_id))
    {
        row.journal_entry_id = None;
        return Some(VoucherRow::Discount(row.id));
    }

    None
}

/// Removes every allocation row created by the given payment entry.
///
/// Returns the removed rows in their original order. Rows from other
/// entries keep their positions.
pub fn remove_entry_rows(doc: &mut InvoiceDoc, entry_id: PaymentEntryId) -> Vec<AllocationRow> {
    let mut removed = Vec::new();
    doc.allocations.retain(|row| {
        if row.payment_entry_id == entry_id {
            removed.push(row.clone());
            false
        } else {
            true
        }
    });
    removed
}

/// Validates that a journal voucher can be cancelled.
///
/// # Errors
///
/// Returns `VoucherAlreadyCancelled` if it already was.
pub fn validate_voucher_cancellable(status: VoucherStatus) -> Result<(), ReconcileError> {
    match status {
        VoucherStatus::Submitted => Ok(()),
        VoucherStatus::Cancelled => Err(ReconcileError::VoucherAlreadyCancelled),
    }
}
