//! Corporate customer entity.
//!
//! Customers carry credit accounts with the hotel. Their folios are routed
//! to the city ledger and collected through invoices.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Customer database model.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    /// Unique identifier.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Customer name.
    pub name: String,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
    /// Last update timestamp.
    pub updated_at: DateTimeWithTimeZone,
}

/// Customer entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Folios opened for this customer.
    #[sea_orm(has_many = "super::folios::Entity")]
    Folios,
    /// Invoices billed to this customer.
    #[sea_orm(has_many = "super::invoices::Entity")]
    Invoices,
    /// Payment entries received from this customer.
    #[sea_orm(has_many = "super::payment_entries::Entity")]
    PaymentEntries,
}

impl Related<super::folios::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Folios.def()
    }
}

impl Related<super::invoices::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoices.def()
    }
}

impl Related<super::payment_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
