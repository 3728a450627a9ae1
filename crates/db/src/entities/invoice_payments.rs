//! Direct payment row entity.
//!
//! A row is pending until the make-payment batch captures it: capture
//! posts a journal voucher, stores its ID here, and sets `paid`.
//! Cancelling that voucher clears both fields and the row returns to
//! pending.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Invoice payment row database model.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "invoice_payments")]
pub struct Model {
    /// Unique identifier.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// The owning invoice.
    pub invoice_id: Uuid,
    /// The date the payment was received.
    pub payment_date: Date,
    /// The mode of payment settling this row.
    pub payment_mode_id: Uuid,
    /// The amount received.
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub amount: Decimal,
    /// Optional external reference (cheque number, transfer ID).
    pub reference_no: Option<String>,
    /// Whether the row has been captured into a journal voucher.
    pub paid: bool,
    /// The journal voucher backing this row, once captured.
    pub journal_entry_id: Option<Uuid>,
    /// Entry order within the invoice.
    pub position: i32,
}

/// Invoice payment row relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The owning invoice.
    #[sea_orm(
        belongs_to = "super::invoices::Entity",
        from = "Column::InvoiceId",
        to = "super::invoices::Column::Id"
    )]
    Invoice,
    /// The settling payment mode.
    #[sea_orm(
        belongs_to = "super::payment_modes::Entity",
        from = "Column::PaymentModeId",
        to = "super::payment_modes::Column::Id"
    )]
    PaymentMode,
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

impl Related<super::payment_modes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentMode.def()
    }
}

impl Related<super::journal_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalEntry.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
