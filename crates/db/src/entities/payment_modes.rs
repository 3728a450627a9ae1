//! Payment mode entity.
//!
//! Each mode names the account debited when it settles a payment. The
//! city ledger mode is special: it routes folio balances into the ledger
//! and can never settle the ledger's own invoices.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment mode database model.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_modes")]
pub struct Model {
    /// Unique identifier.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Mode name, unique.
    pub name: String,
    /// The account debited when this mode settles a payment.
    pub account_id: Uuid,
    /// Whether this mode is the city ledger itself.
    pub is_city_ledger: bool,
    /// Whether the mode is offered for new payments.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
}

/// Payment mode relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The settlement account.
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id"
    )]
    Account,
    /// Payment rows settled by this mode.
    #[sea_orm(has_many = "super::invoice_payments::Entity")]
    InvoicePayments,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl Related<super::invoice_payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InvoicePayments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
