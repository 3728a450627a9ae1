//! Payment entry entity.
//!
//! Records money received from a customer before it is matched to
//! invoices. The allocation split is not stored on the entry itself; it
//! lives as allocation rows on the target invoices, created at submission
//! and deleted at cancellation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::PaymentEntryStatus;

/// Payment entry database model.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_entries")]
pub struct Model {
    /// Unique identifier.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// The customer the money was received from.
    pub customer_id: Uuid,
    /// The date the money was received.
    pub posting_date: Date,
    /// The amount received.
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub paid_amount: Decimal,
    /// Optional external reference (remittance advice, transfer ID).
    pub reference_no: Option<String>,
    /// Current lifecycle status.
    pub status: PaymentEntryStatus,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
    /// Last update timestamp.
    pub updated_at: DateTimeWithTimeZone,
}

/// Payment entry relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The paying customer.
    #[sea_orm(
        belongs_to = "super::customers::Entity",
        from = "Column::CustomerId",
        to = "super::customers::Column::Id"
    )]
    Customer,
    /// Allocation rows created by this entry.
    #[sea_orm(has_many = "super::invoice_payment_entries::Entity")]
    InvoicePaymentEntries,
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::invoice_payment_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InvoicePaymentEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
