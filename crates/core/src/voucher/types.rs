//! Journal voucher domain types.
//!
//! A voucher draft is the pure description of a journal entry before it is
//! persisted: a posting date, a remark, and balanced debit/credit lines.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use stayra_shared::types::{AccountId, CustomerId};

/// One line of a journal voucher.
#[derive(Debug, Clone)]
pub struct JournalLineDraft {
    /// The account posted to.
    pub account_id: AccountId,
    /// Debit amount (zero on credit lines).
    pub debit: Decimal,
    /// Credit amount (zero on debit lines).
    pub credit: Decimal,
    /// The customer this line settles against, for receivable lines.
    pub party_customer_id: Option<CustomerId>,
}

/// A journal voucher ready to persist.
#[derive(Debug, Clone)]
pub struct VoucherDraft {
    /// The posting date.
    pub posting_date: NaiveDate,
    /// Human-readable remark naming the row this voucher settles.
    pub remark: String,
    /// The voucher lines.
    pub lines: Vec<JournalLineDraft>,
    /// Sum of debit amounts.
    pub total_debit: Decimal,
    /// Sum of credit amounts.
    pub total_credit: Decimal,
}

impl VoucherDraft {
    /// Returns true if debits equal credits.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.total_debit == self.total_credit
    }
}
