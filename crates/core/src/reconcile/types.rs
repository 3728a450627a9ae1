//! Domain types for city ledger invoice reconciliation.
//!
//! An invoice collects the balances of one or more folios into a single
//! receivable. Payments, payment entry allocations, and discounts are child
//! rows on the invoice; totals are always recomputed from those rows.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stayra_shared::types::{
    AllocationId, CustomerId, FolioId, InvoiceDiscountId, InvoiceId, InvoicePaymentId,
    JournalEntryId, PaymentEntryId, PaymentModeId,
};

/// Invoice lifecycle status.
///
/// Drafts are editable. Submission freezes the folio list and moves the
/// invoice to `Unpaid`; settlement moves it to `Paid`. Cancellation is
/// terminal and releases the attached folios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    /// Invoice is being drafted and can be modified.
    Draft,
    /// Invoice has been submitted and carries an outstanding balance.
    Unpaid,
    /// Invoice is fully settled (outstanding is zero).
    Paid,
    /// Invoice has been cancelled (immutable).
    Cancelled,
}

impl InvoiceStatus {
    /// Returns true if the invoice header and folio list can be modified.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Returns true if the invoice has been submitted.
    #[must_use]
    pub fn is_submitted(&self) -> bool {
        matches!(self, Self::Unpaid | Self::Paid)
    }

    /// Returns true if payment or discount rows can still be added.
    #[must_use]
    pub fn accepts_rows(&self) -> bool {
        matches!(self, Self::Draft | Self::Unpaid)
    }

    /// Returns the canonical lowercase name used in storage and APIs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Unpaid => "unpaid",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from its canonical lowercase name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "unpaid" => Some(Self::Unpaid),
            "paid" => Some(Self::Paid),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment entry lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentEntryStatus {
    /// Entry is being drafted; allocations have not been applied.
    Draft,
    /// Entry has been submitted and its allocations applied.
    Submitted,
    /// Entry has been cancelled and its allocations reversed.
    Cancelled,
}

impl PaymentEntryStatus {
    /// Returns the canonical lowercase name used in storage and APIs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from its canonical lowercase name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "submitted" => Some(Self::Submitted),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentEntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Journal voucher lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoucherStatus {
    /// Voucher is posted and backs a payment or discount row.
    Submitted,
    /// Voucher has been cancelled and its row reversed.
    Cancelled,
}

impl VoucherStatus {
    /// Returns the canonical lowercase name used in storage and APIs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from its canonical lowercase name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "submitted" => Some(Self::Submitted),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for VoucherStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A folio attached to an invoice, with its balance snapshot.
///
/// The amount is captured from the folio's open balance when the folio is
/// attached and contributes to the invoice's `total_amount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolioRef {
    /// The attached folio.
    pub folio_id: FolioId,
    /// The folio balance being collected by this invoice.
    pub amount: Decimal,
}

/// A direct payment row on an invoice.
///
/// Rows start pending (`paid == false`, no voucher). Processing a row posts
/// a journal voucher, links it back, and sets the paid flag. Only paid rows
/// count toward `total_paid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRow {
    /// Unique identifier for this row.
    pub id: InvoicePaymentId,
    /// The date the payment was received.
    pub payment_date: NaiveDate,
    /// The mode of payment settling this row.
    pub payment_mode_id: PaymentModeId,
    /// The amount received.
    pub amount: Decimal,
    /// Optional external reference (cheque number, transfer id).
    pub reference_no: Option<String>,
    /// Whether the row has been captured into a journal voucher.
    pub paid: bool,
    /// The journal voucher backing this row, once captured.
    pub journal_entry_id: Option<JournalEntryId>,
}

/// A payment entry allocation row on an invoice.
///
/// Created only when a payment entry is submitted; removed when that entry
/// is cancelled. Every allocation row counts toward `total_paid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRow {
    /// Unique identifier for this row.
    pub id: AllocationId,
    /// The payment entry this allocation draws from.
    pub payment_entry_id: PaymentEntryId,
    /// The portion of the entry allocated to this invoice.
    pub amount: Decimal,
}

/// A discount row on an invoice.
///
/// Rows start unapplied. Applying a row posts a journal voucher and links it
/// back. Only voucher-linked rows count toward `total_discount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountRow {
    /// Unique identifier for this row.
    pub id: InvoiceDiscountId,
    /// Reason for the discount.
    pub description: String,
    /// The amount written off.
    pub amount: Decimal,
    /// The journal voucher backing this row, once applied.
    pub journal_entry_id: Option<JournalEntryId>,
}

impl DiscountRow {
    /// Returns true if the discount has been posted to a voucher.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        self.journal_entry_id.is_some()
    }
}

/// An invoice with all child rows loaded.
///
/// This is the unit the reconciliation engine works on. Totals are never
/// stored on this type; they are recomputed from the rows via
/// [`super::totals::compute_totals`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceDoc {
    /// Unique identifier for the invoice.
    pub id: InvoiceId,
    /// The customer being billed.
    pub customer_id: CustomerId,
    /// Current lifecycle status.
    pub status: InvoiceStatus,
    /// The date the invoice was issued.
    pub issued_date: NaiveDate,
    /// The date payment falls due.
    pub due_date: NaiveDate,
    /// Folios collected by this invoice, in attachment order.
    pub folios: Vec<FolioRef>,
    /// Direct payment rows, in entry order.
    pub payments: Vec<PaymentRow>,
    /// Payment entry allocation rows, in entry order.
    pub allocations: Vec<AllocationRow>,
    /// Discount rows, in entry order.
    pub discounts: Vec<DiscountRow>,
}

/// Derived invoice totals.
///
/// Computed in full from the child rows on every mutation; never adjusted
/// incrementally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceTotals {
    /// Sum of attached folio balances.
    pub total_amount: Decimal,
    /// Sum of paid payment rows plus all allocation rows.
    pub total_paid: Decimal,
    /// Sum of voucher-linked discount rows.
    pub total_discount: Decimal,
    /// Remaining receivable, clamped at zero.
    pub outstanding: Decimal,
    /// Whether the invoice is fully settled (outstanding is zero).
    pub is_settled: bool,
}

impl InvoiceTotals {
    /// Creates invoice totals from the three component sums.
    #[must_use]
    pub fn new(total_amount: Decimal, total_paid: Decimal, total_discount: Decimal) -> Self {
        let outstanding = (total_amount - total_paid - total_discount).max(Decimal::ZERO);
        Self {
            total_amount,
            total_paid,
            total_discount,
            outstanding,
            is_settled: outstanding == Decimal::ZERO,
        }
    }
}
