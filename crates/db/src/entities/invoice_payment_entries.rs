//! Payment entry allocation row entity.
//!
//! Created only when a payment entry is submitted and deleted when that
//! entry is cancelled. Unlike direct payment rows there is no pending
//! state: an allocation row always counts toward the invoice's paid total.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Allocation row database model.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "invoice_payment_entries")]
pub struct Model {
    /// Unique identifier.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// The owning invoice.
    pub invoice_id: Uuid,
    /// The payment entry this allocation draws from.
    pub payment_entry_id: Uuid,
    /// The portion of the entry allocated to this invoice.
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub amount: Decimal,
    /// Entry order within the invoice.
    pub position: i32,
}

/// Allocation row relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The owning invoice.
    #[sea_orm(
        belongs_to = "super::invoices::Entity",
        from = "Column::InvoiceId",
        to = "super::invoices::Column::Id"
    )]
    Invoice,
    /// The source payment entry.
    #[sea_orm(
        belongs_to = "super::payment_entries::Entity",
        from = "Column::PaymentEntryId",
        to = "super::payment_entries::Column::Id"
    )]
    PaymentEntry,
}

impl Related<super::invoices::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoice.def()
    }
}

impl Related<super::payment_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentEntry.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
