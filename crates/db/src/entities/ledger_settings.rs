//! Ledger settings entity.
//!
//! Singleton row (id is always 1, enforced by a check constraint) naming
//! the accounts that settlement vouchers post to.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ledger settings database model.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_settings")]
pub struct Model {
    /// Singleton row ID, always 1.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i16,
    /// The receivable account credited by settlement vouchers.
    pub receivable_account_id: Uuid,
    /// The write-off account debited by discount vouchers.
    pub discount_account_id: Uuid,
    /// Last update timestamp.
    pub updated_at: DateTimeWithTimeZone,
}

/// Ledger settings relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
