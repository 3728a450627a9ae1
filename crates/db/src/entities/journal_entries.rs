//! Journal entry voucher entity.
//!
//! Every captured payment row and applied discount row is backed by
//! exactly one voucher. Vouchers are immutable once posted; the only
//! state change is cancellation, which also reverses the backed row.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::VoucherStatus;

/// Journal entry database model.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "journal_entries")]
pub struct Model {
    /// Unique identifier.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// The posting date.
    pub posting_date: Date,
    /// Human-readable remark naming the row this voucher settles.
    #[sea_orm(column_type = "Text")]
    pub remark: String,
    /// Current lifecycle status.
    pub status: VoucherStatus,
    /// Sum of debit amounts.
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub total_debit: Decimal,
    /// Sum of credit amounts.
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub total_credit: Decimal,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
}

/// Journal entry relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The voucher lines.
    #[sea_orm(has_many = "super::journal_entry_lines::Entity")]
    Lines,
}

impl Related<super::journal_entry_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
