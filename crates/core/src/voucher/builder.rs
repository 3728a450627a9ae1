//! Settlement voucher construction.
//!
//! Every payment capture and discount application posts one two-line
//! voucher: debit the settling account, credit the receivable account
//! against the customer. The remark names the invoice row so the voucher
//! can be traced back without joins.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use stayra_shared::types::{AccountId, CustomerId, InvoiceDiscountId, InvoicePaymentId};

use super::types::{JournalLineDraft, VoucherDraft};

/// Accounts feeding the two sides of a settlement voucher.
#[derive(Debug, Clone, Copy)]
pub struct SettlementAccounts {
    /// The account debited (the payment mode's account, or the discount
    /// write-off account).
    pub debit_account: AccountId,
    /// The receivable account credited against the customer.
    pub receivable_account: AccountId,
}

/// Builds settlement vouchers for invoice rows.
pub struct VoucherService;

impl VoucherService {
    /// Builds the voucher capturing a payment row.
    #[must_use]
    pub fn payment_voucher(
        accounts: SettlementAccounts,
        customer_id: CustomerId,
        amount: Decimal,
        posting_date: NaiveDate,
        row_id: InvoicePaymentId,
    ) -> VoucherDraft {
        Self::settlement(
            accounts,
            customer_id,
            amount,
            posting_date,
            format!("City ledger invoice payment: {row_id}"),
        )
    }

    /// Builds the voucher applying a discount row.
    #[must_use]
    pub fn discount_voucher(
        accounts: SettlementAccounts,
        customer_id: CustomerId,
        amount: Decimal,
        posting_date: NaiveDate,
        row_id: InvoiceDiscountId,
    ) -> VoucherDraft {
        Self::settlement(
            accounts,
            customer_id,
            amount,
            posting_date,
            format!("City ledger invoice discount: {row_id}"),
        )
    }

    fn settlement(
        accounts: SettlementAccounts,
        customer_id: CustomerId,
        amount: Decimal,
        posting_date: NaiveDate,
        remark: String,
    ) -> VoucherDraft {
        let lines = vec![
            JournalLineDraft {
                account_id: accounts.debit_account,
                debit: amount,
                credit: Decimal::ZERO,
                party_customer_id: None,
            },
            JournalLineDraft {
                account_id: accounts.receivable_account,
                debit: Decimal::ZERO,
                credit: amount,
                party_customer_id: Some(customer_id),
            },
        ];

        VoucherDraft {
            posting_date,
            remark,
            lines,
            total_debit: amount,
            total_credit: amount,
        }
    }
}
