//! City ledger invoice entity.
//!
//! The stored totals are a cache of the full recomputation over the child
//! rows; every mutation path rewrites them inside its transaction. Reads
//! outside a mutation may trust them.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::InvoiceStatus;

/// Invoice database model.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    /// Unique identifier.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// The customer being billed.
    pub customer_id: Uuid,
    /// Current lifecycle status.
    pub status: InvoiceStatus,
    /// The date the invoice was issued.
    pub issued_date: Date,
    /// The date payment falls due.
    pub due_date: Date,
    /// Sum of attached folio balances.
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub total_amount: Decimal,
    /// Sum of captured payment rows plus all allocation rows.
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub total_paid: Decimal,
    /// Sum of applied discount rows.
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub total_discount: Decimal,
    /// Remaining receivable, clamped at zero.
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub outstanding: Decimal,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
    /// Last update timestamp.
    pub updated_at: DateTimeWithTimeZone,
}

/// Invoice entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The billed customer.
    #[sea_orm(
        belongs_to = "super::customers::Entity",
        from = "Column::CustomerId",
        to = "super::customers::Column::Id"
    )]
    Customer,
    /// Attached folio rows.
    #[sea_orm(has_many = "super::invoice_folios::Entity")]
    InvoiceFolios,
    /// Direct payment rows.
    #[sea_orm(has_many = "super::invoice_payments::Entity")]
    InvoicePayments,
    /// Payment entry allocation rows.
    #[sea_orm(has_many = "super::invoice_payment_entries::Entity")]
    InvoicePaymentEntries,
    /// Discount rows.
    #[sea_orm(has_many = "super::invoice_discounts::Entity")]
    InvoiceDiscounts,
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::invoice_folios::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InvoiceFolios.def()
    }
}

impl Related<super::invoice_payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InvoicePayments.def()
    }
}

impl Related<super::invoice_payment_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InvoicePaymentEntries.def()
    }
}

impl Related<super::invoice_discounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InvoiceDiscounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
