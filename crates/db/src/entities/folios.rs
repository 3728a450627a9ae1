//! Guest folio entity.
//!
//! A folio accumulates room and service charges for one stay. Once the
//! stay is routed to the city ledger, the folio's closing balance becomes
//! collectable through an invoice. The `settled` flag is maintained by the
//! invoice recomputation, never set directly.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Folio database model.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "folios")]
pub struct Model {
    /// Unique identifier.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// The customer the folio belongs to.
    pub customer_id: Uuid,
    /// The date the folio was opened.
    pub open_date: Date,
    /// The date the folio was closed, if it has been.
    pub close_date: Option<Date>,
    /// Open balance to collect.
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub balance: Decimal,
    /// Whether the collecting invoice has been fully paid.
    pub settled: bool,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
    /// Last update timestamp.
    pub updated_at: DateTimeWithTimeZone,
}

/// Folio entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The owning customer.
    #[sea_orm(
        belongs_to = "super::customers::Entity",
        from = "Column::CustomerId",
        to = "super::customers::Column::Id"
    )]
    Customer,
    /// Invoice rows collecting this folio.
    #[sea_orm(has_many = "super::invoice_folios::Entity")]
    InvoiceFolios,
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

impl ActiveModelBehavior for ActiveModel {}
