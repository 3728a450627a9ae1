//! Discount row entity.
//!
//! A row is unapplied until the apply-discounts batch posts a write-off
//! voucher and stores its ID here. Cancelling that voucher clears the
//! link and the row returns to unapplied.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Invoice discount row database model.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "invoice_discounts")]
pub struct Model {
    /// Unique identifier.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// The owning invoice.
    pub invoice_id: Uuid,
    /// Reason for the discount.
    pub description: String,
    /// The amount written off.
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub amount: Decimal,
    /// The journal voucher backing this row, once applied.
    pub journal_entry_id: Option<Uuid>,
    /// Entry order within the invoice.
    pub position: i32,
}

/// Invoice discount row relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The owning invoice.
    #[sea_orm(
        belongs_to = "super::invoices::Entity",
        from = "Column::InvoiceId",
        to = "super::invoices::Column::Id"
    )]
    Invoice,
    /// The backing journal voucher.
    #[sea_orm(
        belongs_to = "super::journal_entries::Entity",
        from = "Column::JournalEntryId",
        to = "super::journal_entries::Column::Id"
    )]
    JournalEntry,
}

impl Related<super::invoices::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoice.def()
    }
}

impl Related<super::journal_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalEntry.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
