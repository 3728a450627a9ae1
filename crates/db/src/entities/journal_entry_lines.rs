//! Journal entry line entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Journal entry line database model.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "journal_entry_lines")]
pub struct Model {
    /// Unique identifier.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// The owning voucher.
    pub journal_entry_id: Uuid,
    /// The account posted to.
    pub account_id: Uuid,
    /// Debit amount (zero on credit lines).
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub debit: Decimal,
    /// Credit amount (zero on debit lines).
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub credit: Decimal,
    /// The customer this line settles against, for receivable lines.
    pub party_customer_id: Option<Uuid>,
    /// Line order within the voucher.
    pub position: i32,
}

/// Journal entry line relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The owning voucher.
    #[sea_orm(
        belongs_to = "super::journal_entries::Entity",
        from = "Column::JournalEntryId",
        to = "super::journal_entries::Column::Id"
    )]
    JournalEntry,
    /// The posted account.
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id"
    )]
    Account,
}

impl Related<super::journal_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalEntry.def()
    }
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
