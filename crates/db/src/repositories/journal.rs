//! Journal voucher repository.
//!
//! Settlement vouchers are written by the invoice repository inside its
//! row transactions; this repository reads them back and handles voucher
//! cancellation, which must reverse the invoice row the voucher captured.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use stayra_core::reconcile::reversal::{unlink_voucher_row, validate_voucher_cancellable};
use stayra_core::reconcile::{ReconcileError, VoucherRow};
use stayra_core::voucher::VoucherDraft;
use stayra_shared::types::{CustomerId, InvoiceId, JournalEntryId};

use crate::entities::{
    invoice_discounts, invoice_payments, journal_entries, journal_entry_lines,
    sea_orm_active_enums,
};
use crate::locks::InvoiceLocks;

use super::db_err;
use super::invoice;

/// A journal entry with its lines in posting order.
#[derive(Debug, Clone)]
pub struct JournalEntryWithLines {
    /// The voucher header.
    pub entry: journal_entries::Model,
    /// The debit and credit lines.
    pub lines: Vec<journal_entry_lines::Model>,
}

/// Result of cancelling a voucher.
#[derive(Debug, Clone)]
pub struct VoucherCancellation {
    /// The cancelled voucher.
    pub entry: journal_entries::Model,
    /// The invoice whose row was reversed, when the voucher backed one.
    pub reversed_invoice: Option<Uuid>,
}

/// Journal voucher repository.
#[derive(Debug, Clone)]
pub struct JournalRepository {
    db: DatabaseConnection,
    locks: InvoiceLocks,
}

impl JournalRepository {
    /// Creates a new journal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, locks: InvoiceLocks) -> Self {
        Self { db, locks }
    }

    /// Finds a journal entry with its lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_journal_entry(
        &self,
        id: Uuid,
    ) -> Result<Option<JournalEntryWithLines>, ReconcileError> {
        let Some(entry) = journal_entries::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };

        let lines = journal_entry_lines::Entity::find()
            .filter(journal_entry_lines::Column::JournalEntryId.eq(id))
            .order_by_asc(journal_entry_lines::Column::Position)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(Some(JournalEntryWithLines { entry, lines }))
    }

    /// Cancels a voucher and reverses the invoice row it captured.
    ///
    /// A payment voucher reverts its row to pending; a discount voucher
    /// reverts its row to unapplied. The invoice totals are recomputed in
    /// the same transaction, so a paid invoice reopens and its folios lose
    /// their settlement marks atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if the voucher does not exist, is already
    /// cancelled, or the reversal transaction fails.
    pub async fn cancel_voucher(&self, id: Uuid) -> Result<VoucherCancellation, ReconcileError> {
        let entry = journal_entries::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| ReconcileError::VoucherNotFound(JournalEntryId::from_uuid(id)))?;
        validate_voucher_cancellable(entry.status.clone().into())?;

        match linked_invoice_id(&self.db, id).await.map_err(db_err)? {
            Some(invoice_id) => self.cancel_linked(id, invoice_id).await,
            None => self.cancel_unlinked(id).await,
        }
    }

    /// Cancels a voucher that backs no invoice row.
    async fn cancel_unlinked(&self, id: Uuid) -> Result<VoucherCancellation, ReconcileError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let entry = mark_cancelled(&txn, id).await?;
        txn.commit().await.map_err(db_err)?;

        info!(journal_entry_id = %id, "cancelled journal voucher");
        Ok(VoucherCancellation {
            entry,
            reversed_invoice: None,
        })
    }

    /// Cancels a voucher and unwinds the row it captured, under the
    /// invoice lock.
    async fn cancel_linked(
        &self,
        id: Uuid,
        invoice_id: Uuid,
    ) -> Result<VoucherCancellation, ReconcileError> {
        let _guard = self.locks.acquire(invoice_id).await;
        let txn = self.db.begin().await.map_err(db_err)?;

        // Re-read under the lock; a concurrent cancel may have won.
        let loaded = invoice::load(&txn, invoice_id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| ReconcileError::InvoiceNotFound(InvoiceId::from_uuid(invoice_id)))?;
        let mut doc = loaded.doc();

        match unlink_voucher_row(&mut doc, JournalEntryId::from_uuid(id)) {
            Some(VoucherRow::Payment(row_id)) => {
                invoice_payments::Entity::update_many()
                    .col_expr(invoice_payments::Column::Paid, Expr::value(false))
                    .col_expr(
                        invoice_payments::Column::JournalEntryId,
                        Expr::value(Option::<Uuid>::None),
                    )
                    .filter(invoice_payments::Column::Id.eq(row_id.into_inner()))
                    .exec(&txn)
                    .await
                    .map_err(db_err)?;
            }
            Some(VoucherRow::Discount(row_id)) => {
                invoice_discounts::Entity::update_many()
                    .col_expr(
                        invoice_discounts::Column::JournalEntryId,
                        Expr::value(Option::<Uuid>::None),
                    )
                    .filter(invoice_discounts::Column::Id.eq(row_id.into_inner()))
                    .exec(&txn)
                    .await
                    .map_err(db_err)?;
            }
            None => {}
        }

        let entry = mark_cancelled(&txn, id).await?;
        let invoice = invoice::recompute_and_store(&txn, invoice_id).await?;
        txn.commit().await.map_err(db_err)?;

        info!(
            journal_entry_id = %id,
            invoice_id = %invoice.id,
            outstanding = %invoice.outstanding,
            "cancelled journal voucher and reversed its invoice row"
        );
        Ok(VoucherCancellation {
            entry,
            reversed_invoice: Some(invoice_id),
        })
    }
}

/// Inserts a voucher draft with its lines, returning the new entry ID.
pub(crate) async fn insert_voucher(
    txn: &DatabaseTransaction,
    draft: &VoucherDraft,
) -> Result<Uuid, DbErr> {
    let entry_id = Uuid::now_v7();
    journal_entries::ActiveModel {
        id: Set(entry_id),
        posting_date: Set(draft.posting_date),
        remark: Set(draft.remark.clone()),
        status: Set(sea_orm_active_enums::VoucherStatus::Submitted),
        total_debit: Set(draft.total_debit),
        total_credit: Set(draft.total_credit),
        created_at: Set(chrono::Utc::now().into()),
    }
    .insert(txn)
    .await?;

    for (position, line) in draft.lines.iter().enumerate() {
        journal_entry_lines::ActiveModel {
            id: Set(Uuid::now_v7()),
            journal_entry_id: Set(entry_id),
            account_id: Set(line.account_id.into_inner()),
            debit: Set(line.debit),
            credit: Set(line.credit),
            party_customer_id: Set(line.party_customer_id.map(CustomerId::into_inner)),
            position: Set(i32::try_from(position).unwrap_or(i32::MAX)),
        }
        .insert(txn)
        .await?;
    }

    Ok(entry_id)
}

/// Re-validates and cancels a voucher inside a transaction.
async fn mark_cancelled(
    txn: &DatabaseTransaction,
    id: Uuid,
) -> Result<journal_entries::Model, ReconcileError> {
    let entry = journal_entries::Entity::find_by_id(id)
        .one(txn)
        .await
        .map_err(db_err)?
        .ok_or_else(|| ReconcileError::VoucherNotFound(JournalEntryId::from_uuid(id)))?;
    validate_voucher_cancellable(entry.status.clone().into())?;

    let mut active: journal_entries::ActiveModel = entry.into();
    active.status = Set(sea_orm_active_enums::VoucherStatus::Cancelled);
    active.update(txn).await.map_err(db_err)
}

/// Finds the invoice whose payment or discount row this voucher backs.
async fn linked_invoice_id<C: ConnectionTrait>(
    conn: &C,
    journal_entry_id: Uuid,
) -> Result<Option<Uuid>, DbErr> {
    if let Some(row) = invoice_payments::Entity::find()
        .filter(invoice_payments::Column::JournalEntryId.eq(journal_entry_id))
        .one(conn)
        .await?
    {
        return Ok(Some(row.invoice_id));
    }

    Ok(invoice_discounts::Entity::find()
        .filter(invoice_discounts::Column::JournalEntryId.eq(journal_entry_id))
        .one(conn)
        .await?
        .map(|row| row.invoice_id))
}
