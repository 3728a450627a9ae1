//! PostgreSQL enum mappings.
//!
//! Each enum here mirrors a `CREATE TYPE ... AS ENUM` in the initial
//! migration. Conversions to and from the domain enums live alongside so
//! repositories can move between the two without string matching.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use stayra_core::reconcile;

/// Invoice lifecycle status as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "invoice_status")]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    /// Invoice is being drafted.
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Invoice is submitted with an outstanding balance.
    #[sea_orm(string_value = "unpaid")]
    Unpaid,
    /// Invoice is fully settled.
    #[sea_orm(string_value = "paid")]
    Paid,
    /// Invoice has been cancelled.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl From<InvoiceStatus> for reconcile::InvoiceStatus {
    fn from(status: InvoiceStatus) -> Self {
        match status {
            InvoiceStatus::Draft => Self::Draft,
            InvoiceStatus::Unpaid => Self::Unpaid,
            InvoiceStatus::Paid => Self::Paid,
            InvoiceStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<reconcile::InvoiceStatus> for InvoiceStatus {
    fn from(status: reconcile::InvoiceStatus) -> Self {
        match status {
            reconcile::InvoiceStatus::Draft => Self::Draft,
            reconcile::InvoiceStatus::Unpaid => Self::Unpaid,
            reconcile::InvoiceStatus::Paid => Self::Paid,
            reconcile::InvoiceStatus::Cancelled => Self::Cancelled,
        }
    }
}

/// Payment entry lifecycle status as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_entry_status")]
#[serde(rename_all = "lowercase")]
pub enum PaymentEntryStatus {
    /// Entry is being drafted.
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Entry is submitted and its allocations applied.
    #[sea_orm(string_value = "submitted")]
    Submitted,
    /// Entry has been cancelled.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl From<PaymentEntryStatus> for reconcile::PaymentEntryStatus {
    fn from(status: PaymentEntryStatus) -> Self {
        match status {
            PaymentEntryStatus::Draft => Self::Draft,
            PaymentEntryStatus::Submitted => Self::Submitted,
            PaymentEntryStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<reconcile::PaymentEntryStatus> for PaymentEntryStatus {
    fn from(status: reconcile::PaymentEntryStatus) -> Self {
        match status {
            reconcile::PaymentEntryStatus::Draft => Self::Draft,
            reconcile::PaymentEntryStatus::Submitted => Self::Submitted,
            reconcile::PaymentEntryStatus::Cancelled => Self::Cancelled,
        }
    }
}

/// Journal voucher lifecycle status as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "voucher_status")]
#[serde(rename_all = "lowercase")]
pub enum VoucherStatus {
    /// Voucher is posted.
    #[sea_orm(string_value = "submitted")]
    Submitted,
    /// Voucher has been cancelled.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl From<VoucherStatus> for reconcile::VoucherStatus {
    fn from(status: VoucherStatus) -> Self {
        match status {
            VoucherStatus::Submitted => Self::Submitted,
            VoucherStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<reconcile::VoucherStatus> for VoucherStatus {
    fn from(status: reconcile::VoucherStatus) -> Self {
        match status {
            reconcile::VoucherStatus::Submitted => Self::Submitted,
            reconcile::VoucherStatus::Cancelled => Self::Cancelled,
        }
    }
}

/// Chart of accounts classification.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_kind")]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    /// Asset account (cash, bank).
    #[sea_orm(string_value = "asset")]
    Asset,
    /// Liability account.
    #[sea_orm(string_value = "liability")]
    Liability,
    /// Income account.
    #[sea_orm(string_value = "income")]
    Income,
    /// Expense account (discount write-offs post here).
    #[sea_orm(string_value = "expense")]
    Expense,
    /// Receivable account (the city ledger itself).
    #[sea_orm(string_value = "receivable")]
    Receivable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoice_status_roundtrip() {
        for status in [
            reconcile::InvoiceStatus::Draft,
            reconcile::InvoiceStatus::Unpaid,
            reconcile::InvoiceStatus::Paid,
            reconcile::InvoiceStatus::Cancelled,
        ] {
            let stored = InvoiceStatus::from(status);
            assert_eq!(reconcile::InvoiceStatus::from(stored), status);
        }
    }

    #[test]
    fn test_payment_entry_status_roundtrip() {
        for status in [
            reconcile::PaymentEntryStatus::Draft,
            reconcile::PaymentEntryStatus::Submitted,
            reconcile::PaymentEntryStatus::Cancelled,
        ] {
            let stored = PaymentEntryStatus::from(status);
            assert_eq!(reconcile::PaymentEntryStatus::from(stored), status);
        }
    }

    #[test]
    fn test_voucher_status_roundtrip() {
        for status in [
            reconcile::VoucherStatus::Submitted,
            reconcile::VoucherStatus::Cancelled,
        ] {
            let stored = VoucherStatus::from(status);
            assert_eq!(reconcile::VoucherStatus::from(stored), status);
        }
    }
}
