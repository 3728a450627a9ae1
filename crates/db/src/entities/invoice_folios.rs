//! Invoice folio row entity.
//!
//! Links an invoice to a folio it collects and snapshots the folio balance
//! at attachment time. A folio can appear on at most one non-cancelled
//! invoice; that rule is enforced by the repositories, not the schema.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Invoice folio row database model.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "invoice_folios")]
pub struct Model {
    /// Unique identifier.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// The owning invoice.
    pub invoice_id: Uuid,
    /// The collected folio.
    pub folio_id: Uuid,
    /// The folio balance snapshot being collected.
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub amount: Decimal,
    /// Attachment order within the invoice.
    pub position: i32,
}

/// Invoice folio row relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The owning invoice.
    #[sea_orm(
        belongs_to = "super::invoices::Entity",
        from = "Column::InvoiceId",
        to = "super::invoices::Column::Id"
    )]
    Invoice,
    /// The collected folio.
    #[sea_orm(
        belongs_to = "super::folios::Entity",
        from = "Column::FolioId",
        to = "super::folios::Column::Id"
    )]
    Folio,
}

impl Related<super::invoices::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoice.def()
    }
}

impl Related<super::folios::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Folio.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
