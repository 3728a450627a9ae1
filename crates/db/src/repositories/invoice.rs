//! Invoice repository for city ledger reconciliation.
//!
//! Every mutation runs under the per-invoice lock and ends by recomputing
//! the stored totals from the child rows inside the same transaction. The
//! stored header is therefore always consistent with the rows it
//! summarizes, and folio settlement marks follow status changes
//! atomically.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use stayra_core::reconcile::discount::{plan_discount_batch, validate_new_discount};
use stayra_core::reconcile::folio::resolve_folio_refs;
use stayra_core::reconcile::payment::{plan_payment_batch, validate_new_payment};
use stayra_core::reconcile::types::{
    AllocationRow, DiscountRow, FolioRef, InvoiceDoc, PaymentRow,
};
use stayra_core::reconcile::validation::{check_against_outstanding, validate_submit};
use stayra_core::reconcile::{
    self, compute_totals, derive_status, FolioInfo, NewDiscountRow, NewPaymentRow,
    PaymentModeInfo, ReconcileError, ReconcileService,
};
use stayra_core::voucher::{SettlementAccounts, VoucherService};
use stayra_shared::types::{
    AccountId, AllocationId, CustomerId, FolioId, InvoiceDiscountId, InvoiceId, InvoicePaymentId,
    JournalEntryId, PageRequest, PageResponse, PaymentEntryId, PaymentModeId,
};

use crate::entities::{
    customers, folios, invoice_discounts, invoice_folios, invoice_payment_entries,
    invoice_payments, invoices, payment_modes, sea_orm_active_enums,
};
use crate::locks::InvoiceLocks;

use super::journal::insert_voucher;
use super::settings::load_settings;
use super::db_err;

/// Input for creating an invoice draft.
#[derive(Debug, Clone)]
pub struct CreateInvoiceInput {
    /// The customer being billed.
    pub customer_id: Uuid,
    /// The date the invoice is issued.
    pub issued_date: chrono::NaiveDate,
    /// The date payment falls due.
    pub due_date: chrono::NaiveDate,
    /// Folios to attach, in billing order.
    pub folio_ids: Vec<Uuid>,
}

/// Filter options for listing invoices.
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    /// Filter by customer.
    pub customer_id: Option<Uuid>,
    /// Filter by status.
    pub status: Option<reconcile::InvoiceStatus>,
}

/// An invoice with all of its child rows.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceWithRows {
    /// The invoice header.
    pub invoice: invoices::Model,
    /// Attached folio rows in position order.
    pub folios: Vec<invoice_folios::Model>,
    /// Direct payment rows in position order.
    pub payments: Vec<invoice_payments::Model>,
    /// Payment entry allocation rows in position order.
    pub allocations: Vec<invoice_payment_entries::Model>,
    /// Discount rows in position order.
    pub discounts: Vec<invoice_discounts::Model>,
}

impl InvoiceWithRows {
    /// Builds the domain document the reconciliation rules operate on.
    #[must_use]
    pub fn doc(&self) -> InvoiceDoc {
        InvoiceDoc {
            id: InvoiceId::from_uuid(self.invoice.id),
            customer_id: CustomerId::from_uuid(self.invoice.customer_id),
            status: self.invoice.status.clone().into(),
            issued_date: self.invoice.issued_date,
            due_date: self.invoice.due_date,
            folios: self
                .folios
                .iter()
                .map(|f| FolioRef {
                    folio_id: FolioId::from_uuid(f.folio_id),
                    amount: f.amount,
                })
                .collect(),
            payments: self
                .payments
                .iter()
                .map(|p| PaymentRow {
                    id: InvoicePaymentId::from_uuid(p.id),
                    payment_date: p.payment_date,
                    payment_mode_id: PaymentModeId::from_uuid(p.payment_mode_id),
                    amount: p.amount,
                    reference_no: p.reference_no.clone(),
                    paid: p.paid,
                    journal_entry_id: p.journal_entry_id.map(JournalEntryId::from_uuid),
                })
                .collect(),
            allocations: self
                .allocations
                .iter()
                .map(|a| AllocationRow {
                    id: AllocationId::from_uuid(a.id),
                    payment_entry_id: PaymentEntryId::from_uuid(a.payment_entry_id),
                    amount: a.amount,
                })
                .collect(),
            discounts: self
                .discounts
                .iter()
                .map(|d| DiscountRow {
                    id: InvoiceDiscountId::from_uuid(d.id),
                    description: d.description.clone(),
                    amount: d.amount,
                    journal_entry_id: d.journal_entry_id.map(JournalEntryId::from_uuid),
                })
                .collect(),
        }
    }
}

/// Result of a payment capture or discount application batch.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// The invoice header after the batch.
    pub invoice: invoices::Model,
    /// How many rows were captured or applied.
    pub rows_posted: usize,
}

/// Invoice repository for reconciliation operations.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    db: DatabaseConnection,
    locks: InvoiceLocks,
}

impl InvoiceRepository {
    /// Creates a new invoice repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, locks: InvoiceLocks) -> Self {
        Self { db, locks }
    }

    /// Creates an invoice draft with folios attached.
    ///
    /// Folio attachment rules apply from the start: each folio must belong
    /// to the customer, be unsettled, and not already sit on another
    /// non-cancelled invoice. A draft may start with no folios.
    ///
    /// # Errors
    ///
    /// Returns an error if the customer does not exist or any folio fails
    /// an attachment rule.
    pub async fn create_invoice(
        &self,
        input: CreateInvoiceInput,
    ) -> Result<InvoiceWithRows, ReconcileError> {
        let customer = customers::Entity::find_by_id(input.customer_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| {
                ReconcileError::CustomerNotFound(CustomerId::from_uuid(input.customer_id))
            })?;

        let refs = self
            .resolve_folios(customer.id, &input.folio_ids, None)
            .await?;

        let id = Uuid::now_v7();
        let now = chrono::Utc::now().into();
        let txn = self.db.begin().await.map_err(db_err)?;
        invoices::ActiveModel {
            id: Set(id),
            customer_id: Set(customer.id),
            status: Set(sea_orm_active_enums::InvoiceStatus::Draft),
            issued_date: Set(input.issued_date),
            due_date: Set(input.due_date),
            total_amount: Set(Decimal::ZERO),
            total_paid: Set(Decimal::ZERO),
            total_discount: Set(Decimal::ZERO),
            outstanding: Set(Decimal::ZERO),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;
        insert_folio_rows(&txn, id, &refs).await.map_err(db_err)?;
        recompute_and_store(&txn, id).await?;
        txn.commit().await.map_err(db_err)?;

        info!(invoice_id = %id, customer_id = %customer.id, folios = refs.len(), "created invoice draft");
        self.require(id).await
    }

    /// Finds an invoice with its child rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_invoice_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<InvoiceWithRows>, ReconcileError> {
        load(&self.db, id).await.map_err(db_err)
    }

    /// Lists invoices, most recently touched first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_invoices(
        &self,
        filter: InvoiceFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<invoices::Model>, ReconcileError> {
        let mut query = invoices::Entity::find().order_by_desc(invoices::Column::UpdatedAt);

        if let Some(customer_id) = filter.customer_id {
            query = query.filter(invoices::Column::CustomerId.eq(customer_id));
        }
        if let Some(status) = filter.status {
            let status = sea_orm_active_enums::InvoiceStatus::from(status);
            query = query.filter(invoices::Column::Status.eq(status));
        }

        let total = query.clone().count(&self.db).await.map_err(db_err)?;
        let data = query
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    /// Lists a customer's unpaid invoices, most recently touched first.
    ///
    /// This is the working set for payment entry allocation.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_unpaid_for_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<invoices::Model>, ReconcileError> {
        invoices::Entity::find()
            .filter(invoices::Column::CustomerId.eq(customer_id))
            .filter(invoices::Column::Status.eq(sea_orm_active_enums::InvoiceStatus::Unpaid))
            .order_by_desc(invoices::Column::UpdatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Replaces the attached folios of a draft invoice.
    ///
    /// # Errors
    ///
    /// Returns an error if the invoice is not a draft or any folio fails
    /// an attachment rule.
    pub async fn set_folios(
        &self,
        id: Uuid,
        folio_ids: Vec<Uuid>,
    ) -> Result<InvoiceWithRows, ReconcileError> {
        let _guard = self.locks.acquire(id).await;
        let loaded = self.require(id).await?;
        ReconcileService::validate_can_edit(loaded.invoice.status.clone().into())?;
        let refs = self
            .resolve_folios(loaded.invoice.customer_id, &folio_ids, Some(id))
            .await?;

        let txn = self.db.begin().await.map_err(db_err)?;
        invoice_folios::Entity::delete_many()
            .filter(invoice_folios::Column::InvoiceId.eq(id))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        insert_folio_rows(&txn, id, &refs).await.map_err(db_err)?;
        recompute_and_store(&txn, id).await?;
        txn.commit().await.map_err(db_err)?;

        info!(invoice_id = %id, folios = refs.len(), "replaced invoice folios");
        self.require(id).await
    }

    /// Submits a draft invoice, freezing its folio set.
    ///
    /// Folio exclusivity is re-checked at submit time, so two drafts
    /// racing over the same folio cannot both commit.
    ///
    /// # Errors
    ///
    /// Returns an error if any submission rule fails.
    pub async fn submit_invoice(&self, id: Uuid) -> Result<invoices::Model, ReconcileError> {
        let _guard = self.locks.acquire(id).await;
        let loaded = self.require(id).await?;
        let doc = loaded.doc();

        let folio_ids: Vec<Uuid> = loaded.folios.iter().map(|f| f.folio_id).collect();
        let holders = holding_invoices(&self.db, &folio_ids, Some(id))
            .await
            .map_err(db_err)?;
        validate_submit(&doc, |folio| {
            holders.get(&folio.into_inner()).copied().map(InvoiceId::from_uuid)
        })?;

        let txn = self.db.begin().await.map_err(db_err)?;
        let mut active: invoices::ActiveModel = loaded.invoice.into();
        active.status = Set(sea_orm_active_enums::InvoiceStatus::Unpaid);
        active.updated_at = Set(chrono::Utc::now().into());
        active.update(&txn).await.map_err(db_err)?;
        let invoice = recompute_and_store(&txn, id).await?;
        txn.commit().await.map_err(db_err)?;

        info!(invoice_id = %id, total_amount = %invoice.total_amount, "submitted invoice");
        Ok(invoice)
    }

    /// Deletes a draft invoice and its child rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the invoice is not a draft.
    pub async fn delete_draft(&self, id: Uuid) -> Result<(), ReconcileError> {
        let _guard = self.locks.acquire(id).await;
        let loaded = self.require(id).await?;
        ReconcileService::validate_can_delete(loaded.invoice.status.clone().into())?;

        invoices::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        info!(invoice_id = %id, "deleted invoice draft");
        Ok(())
    }

    /// Adds a pending payment row to a submitted invoice.
    ///
    /// The row is a claim on the invoice total, not yet a settlement; no
    /// voucher is posted and the totals do not move until the row is
    /// captured by [`make_payment`](Self::make_payment).
    ///
    /// # Errors
    ///
    /// Returns an error if the invoice cannot take rows, the mode is
    /// unusable, or the amount exceeds the uncommitted remainder.
    pub async fn add_payment_row(
        &self,
        id: Uuid,
        row: NewPaymentRow,
    ) -> Result<invoice_payments::Model, ReconcileError> {
        let _guard = self.locks.acquire(id).await;
        let loaded = self.require(id).await?;
        let doc = loaded.doc();

        let mode = payment_mode_info(&self.db, row.payment_mode_id.into_inner()).await?;
        validate_new_payment(&doc, &row, |mode_id| {
            if mode_id == mode.id {
                Ok(mode.clone())
            } else {
                Err(ReconcileError::PaymentModeNotFound(mode_id))
            }
        })?;

        let position = next_position(loaded.payments.iter().map(|p| p.position));
        let model = invoice_payments::ActiveModel {
            id: Set(Uuid::now_v7()),
            invoice_id: Set(id),
            payment_date: Set(row.payment_date),
            payment_mode_id: Set(row.payment_mode_id.into_inner()),
            amount: Set(row.amount),
            reference_no: Set(row.reference_no),
            paid: Set(false),
            journal_entry_id: Set(None),
            position: Set(position),
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;

        info!(invoice_id = %id, row_id = %model.id, amount = %model.amount, "added payment row");
        Ok(model)
    }

    /// Removes a pending payment row.
    ///
    /// # Errors
    ///
    /// Returns an error if the row does not exist or has already been
    /// captured; captured rows are reversed through voucher cancellation.
    pub async fn remove_payment_row(&self, id: Uuid, row_id: Uuid) -> Result<(), ReconcileError> {
        let _guard = self.locks.acquire(id).await;
        let loaded = self.require(id).await?;

        let status: reconcile::InvoiceStatus = loaded.invoice.status.clone().into();
        if !status.accepts_rows() {
            return Err(ReconcileError::RowsFrozen);
        }
        let row = loaded
            .payments
            .iter()
            .find(|p| p.id == row_id)
            .ok_or_else(|| {
                ReconcileError::PaymentRowNotFound(InvoicePaymentId::from_uuid(row_id))
            })?;
        if row.paid {
            return Err(ReconcileError::RowAlreadyCaptured(InvoicePaymentId::from_uuid(
                row_id,
            )));
        }

        invoice_payments::Entity::delete_by_id(row_id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        info!(invoice_id = %id, row_id = %row_id, "removed pending payment row");
        Ok(())
    }

    /// Adds a pending discount row to a submitted invoice.
    ///
    /// # Errors
    ///
    /// Returns an error if the invoice cannot take rows or the amount
    /// exceeds the uncommitted remainder.
    pub async fn add_discount_row(
        &self,
        id: Uuid,
        row: NewDiscountRow,
    ) -> Result<invoice_discounts::Model, ReconcileError> {
        let _guard = self.locks.acquire(id).await;
        let loaded = self.require(id).await?;
        let doc = loaded.doc();
        validate_new_discount(&doc, &row)?;

        let position = next_position(loaded.discounts.iter().map(|d| d.position));
        let model = invoice_discounts::ActiveModel {
            id: Set(Uuid::now_v7()),
            invoice_id: Set(id),
            description: Set(row.description),
            amount: Set(row.amount),
            journal_entry_id: Set(None),
            position: Set(position),
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;

        info!(invoice_id = %id, row_id = %model.id, amount = %model.amount, "added discount row");
        Ok(model)
    }

    /// Captures every pending payment row, one voucher per row.
    ///
    /// Each row gets its own transaction: voucher insert, row update, and
    /// totals recomputation commit together. The batch stops at the first
    /// failing row; rows captured before it stay captured.
    ///
    /// # Errors
    ///
    /// Returns the first row's error, or a planning error if the invoice
    /// has no pending rows.
    pub async fn make_payment(&self, id: Uuid) -> Result<BatchOutcome, ReconcileError> {
        let _guard = self.locks.acquire(id).await;
        let loaded = self.require(id).await?;
        let doc = loaded.doc();
        let batch = plan_payment_batch(&doc)?;

        let settings = load_settings(&self.db).await?;
        let receivable = AccountId::from_uuid(settings.receivable_account_id);

        let mut rows_posted = 0_usize;
        for row in &batch {
            if let Err(e) = self.capture_payment_row(id, &doc, row, receivable).await {
                error!(invoice_id = %id, row_id = %row.id, error = %e, "payment row capture failed, stopping batch");
                return Err(e);
            }
            rows_posted += 1;
        }

        let invoice = self.require(id).await?.invoice;
        info!(invoice_id = %id, rows = rows_posted, outstanding = %invoice.outstanding, "captured payment batch");
        Ok(BatchOutcome { invoice, rows_posted })
    }

    /// Applies every pending discount row, one voucher per row.
    ///
    /// Runs the same per-row transaction scheme as
    /// [`make_payment`](Self::make_payment).
    ///
    /// # Errors
    ///
    /// Returns the first row's error, or a planning error if the invoice
    /// has no unapplied rows.
    pub async fn apply_discounts(&self, id: Uuid) -> Result<BatchOutcome, ReconcileError> {
        let _guard = self.locks.acquire(id).await;
        let loaded = self.require(id).await?;
        let doc = loaded.doc();
        let batch = plan_discount_batch(&doc)?;

        let settings = load_settings(&self.db).await?;
        let accounts = SettlementAccounts {
            debit_account: AccountId::from_uuid(settings.discount_account_id),
            receivable_account: AccountId::from_uuid(settings.receivable_account_id),
        };

        let mut rows_posted = 0_usize;
        for row in &batch {
            if let Err(e) = self.apply_discount_row(id, &doc, row, accounts).await {
                error!(invoice_id = %id, row_id = %row.id, error = %e, "discount application failed, stopping batch");
                return Err(e);
            }
            rows_posted += 1;
        }

        let invoice = self.require(id).await?.invoice;
        info!(invoice_id = %id, rows = rows_posted, outstanding = %invoice.outstanding, "applied discount batch");
        Ok(BatchOutcome { invoice, rows_posted })
    }

    /// Cancels an invoice.
    ///
    /// Only invoices with nothing settled against them can be cancelled;
    /// payments and discounts must be reversed first. The stored totals
    /// keep their last recomputed values.
    ///
    /// # Errors
    ///
    /// Returns an error if the invoice still carries paid amounts or
    /// applied discounts, is a draft, or is already cancelled.
    pub async fn cancel_invoice(&self, id: Uuid) -> Result<invoices::Model, ReconcileError> {
        let _guard = self.locks.acquire(id).await;
        let loaded = self.require(id).await?;
        ReconcileService::validate_can_cancel(&loaded.doc())?;

        let mut active: invoices::ActiveModel = loaded.invoice.into();
        active.status = Set(sea_orm_active_enums::InvoiceStatus::Cancelled);
        active.updated_at = Set(chrono::Utc::now().into());
        let invoice = active.update(&self.db).await.map_err(db_err)?;

        info!(invoice_id = %id, "cancelled invoice");
        Ok(invoice)
    }

    /// Captures one payment row in its own transaction.
    async fn capture_payment_row(
        &self,
        invoice_id: Uuid,
        doc: &InvoiceDoc,
        row: &PaymentRow,
        receivable: AccountId,
    ) -> Result<(), ReconcileError> {
        let mode = payment_mode_info(&self.db, row.payment_mode_id.into_inner()).await?;
        if mode.is_city_ledger {
            return Err(ReconcileError::ModeNotSettleable(row.payment_mode_id));
        }

        let txn = self.db.begin().await.map_err(db_err)?;
        let current = load(&txn, invoice_id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| ReconcileError::InvoiceNotFound(InvoiceId::from_uuid(invoice_id)))?;
        let totals = compute_totals(&current.doc());
        check_against_outstanding(row.amount, totals.outstanding)?;

        let accounts = SettlementAccounts {
            debit_account: mode.account_id,
            receivable_account: receivable,
        };
        let voucher = VoucherService::payment_voucher(
            accounts,
            doc.customer_id,
            row.amount,
            row.payment_date,
            row.id,
        );
        let journal_entry_id = insert_voucher(&txn, &voucher).await.map_err(db_err)?;

        invoice_payments::Entity::update_many()
            .col_expr(invoice_payments::Column::Paid, Expr::value(true))
            .col_expr(
                invoice_payments::Column::JournalEntryId,
                Expr::value(Some(journal_entry_id)),
            )
            .filter(invoice_payments::Column::Id.eq(row.id.into_inner()))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        recompute_and_store(&txn, invoice_id).await?;
        txn.commit().await.map_err(db_err)?;

        info!(
            invoice_id = %invoice_id,
            row_id = %row.id,
            journal_entry_id = %journal_entry_id,
            amount = %row.amount,
            "captured payment row"
        );
        Ok(())
    }

    /// Applies one discount row in its own transaction.
    async fn apply_discount_row(
        &self,
        invoice_id: Uuid,
        doc: &InvoiceDoc,
        row: &DiscountRow,
        accounts: SettlementAccounts,
    ) -> Result<(), ReconcileError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let current = load(&txn, invoice_id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| ReconcileError::InvoiceNotFound(InvoiceId::from_uuid(invoice_id)))?;
        let totals = compute_totals(&current.doc());
        check_against_outstanding(row.amount, totals.outstanding)?;

        let voucher = VoucherService::discount_voucher(
            accounts,
            doc.customer_id,
            row.amount,
            chrono::Utc::now().date_naive(),
            row.id,
        );
        let journal_entry_id = insert_voucher(&txn, &voucher).await.map_err(db_err)?;

        invoice_discounts::Entity::update_many()
            .col_expr(
                invoice_discounts::Column::JournalEntryId,
                Expr::value(Some(journal_entry_id)),
            )
            .filter(invoice_discounts::Column::Id.eq(row.id.into_inner()))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        recompute_and_store(&txn, invoice_id).await?;
        txn.commit().await.map_err(db_err)?;

        info!(
            invoice_id = %invoice_id,
            row_id = %row.id,
            journal_entry_id = %journal_entry_id,
            amount = %row.amount,
            "applied discount row"
        );
        Ok(())
    }

    /// Fetches an invoice or fails with not-found.
    async fn require(&self, id: Uuid) -> Result<InvoiceWithRows, ReconcileError> {
        load(&self.db, id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| ReconcileError::InvoiceNotFound(InvoiceId::from_uuid(id)))
    }

    /// Resolves requested folio IDs into validated folio references.
    async fn resolve_folios(
        &self,
        customer_id: Uuid,
        folio_ids: &[Uuid],
        exclude_invoice: Option<Uuid>,
    ) -> Result<Vec<FolioRef>, ReconcileError> {
        let infos = folio_infos(&self.db, folio_ids).await.map_err(db_err)?;
        let holders = holding_invoices(&self.db, folio_ids, exclude_invoice)
            .await
            .map_err(db_err)?;

        let typed: Vec<FolioId> = folio_ids.iter().copied().map(FolioId::from_uuid).collect();
        resolve_folio_refs(
            CustomerId::from_uuid(customer_id),
            &typed,
            |folio| {
                infos
                    .get(&folio.into_inner())
                    .cloned()
                    .ok_or(ReconcileError::FolioNotFound(folio))
            },
            |folio| holders.get(&folio.into_inner()).copied().map(InvoiceId::from_uuid),
        )
    }
}

/// Loads an invoice with all child rows in position order.
pub(crate) async fn load<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<Option<InvoiceWithRows>, DbErr> {
    let Some(invoice) = invoices::Entity::find_by_id(id).one(conn).await? else {
        return Ok(None);
    };

    let folio_rows = invoice_folios::Entity::find()
        .filter(invoice_folios::Column::InvoiceId.eq(id))
        .order_by_asc(invoice_folios::Column::Position)
        .all(conn)
        .await?;
    let payments = invoice_payments::Entity::find()
        .filter(invoice_payments::Column::InvoiceId.eq(id))
        .order_by_asc(invoice_payments::Column::Position)
        .all(conn)
        .await?;
    let allocations = invoice_payment_entries::Entity::find()
        .filter(invoice_payment_entries::Column::InvoiceId.eq(id))
        .order_by_asc(invoice_payment_entries::Column::Position)
        .all(conn)
        .await?;
    let discounts = invoice_discounts::Entity::find()
        .filter(invoice_discounts::Column::InvoiceId.eq(id))
        .order_by_asc(invoice_discounts::Column::Position)
        .all(conn)
        .await?;

    Ok(Some(InvoiceWithRows {
        invoice,
        folios: folio_rows,
        payments,
        allocations,
        discounts,
    }))
}

/// Recomputes the stored totals and status from the child rows.
///
/// This is the single write path for the invoice header: it reloads the
/// document inside the caller's transaction, recomputes every total from
/// scratch, derives the status, and moves folio settlement marks when the
/// invoice crosses into or out of paid.
pub(crate) async fn recompute_and_store(
    txn: &DatabaseTransaction,
    invoice_id: Uuid,
) -> Result<invoices::Model, ReconcileError> {
    let loaded = load(txn, invoice_id)
        .await
        .map_err(db_err)?
        .ok_or_else(|| ReconcileError::InvoiceNotFound(InvoiceId::from_uuid(invoice_id)))?;
    let doc = loaded.doc();

    let totals = compute_totals(&doc);
    let previous = doc.status;
    let next = derive_status(previous, &totals);

    let mut active: invoices::ActiveModel = loaded.invoice.into();
    active.status = Set(next.into());
    active.total_amount = Set(totals.total_amount);
    active.total_paid = Set(totals.total_paid);
    active.total_discount = Set(totals.total_discount);
    active.outstanding = Set(totals.outstanding);
    active.updated_at = Set(chrono::Utc::now().into());
    let invoice = active.update(txn).await.map_err(db_err)?;

    if let Some(settled) = ReconcileService::folio_settlement_change(previous, next) {
        let folio_ids: Vec<Uuid> = loaded.folios.iter().map(|f| f.folio_id).collect();
        if !folio_ids.is_empty() {
            folios::Entity::update_many()
                .col_expr(folios::Column::Settled, Expr::value(settled))
                .col_expr(folios::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
                .filter(folios::Column::Id.is_in(folio_ids))
                .exec(txn)
                .await
                .map_err(db_err)?;
        }
    }

    Ok(invoice)
}

/// Maps each folio to the non-cancelled invoice currently holding it.
///
/// Drafts count as holders: a folio claimed by any live invoice is
/// unavailable to every other invoice.
pub(crate) async fn holding_invoices<C: ConnectionTrait>(
    conn: &C,
    folio_ids: &[Uuid],
    exclude_invoice: Option<Uuid>,
) -> Result<HashMap<Uuid, Uuid>, DbErr> {
    if folio_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut query = invoice_folios::Entity::find()
        .filter(invoice_folios::Column::FolioId.is_in(folio_ids.to_vec()));
    if let Some(exclude) = exclude_invoice {
        query = query.filter(invoice_folios::Column::InvoiceId.ne(exclude));
    }
    let rows = query.all(conn).await?;
    if rows.is_empty() {
        return Ok(HashMap::new());
    }

    let invoice_ids: Vec<Uuid> = rows.iter().map(|r| r.invoice_id).collect();
    let live: HashSet<Uuid> = invoices::Entity::find()
        .filter(invoices::Column::Id.is_in(invoice_ids))
        .filter(invoices::Column::Status.ne(sea_orm_active_enums::InvoiceStatus::Cancelled))
        .all(conn)
        .await?
        .into_iter()
        .map(|i| i.id)
        .collect();

    Ok(rows
        .into_iter()
        .filter(|r| live.contains(&r.invoice_id))
        .map(|r| (r.folio_id, r.invoice_id))
        .collect())
}

/// Loads folio lookup data for attachment validation.
async fn folio_infos<C: ConnectionTrait>(
    conn: &C,
    folio_ids: &[Uuid],
) -> Result<HashMap<Uuid, FolioInfo>, DbErr> {
    if folio_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = folios::Entity::find()
        .filter(folios::Column::Id.is_in(folio_ids.to_vec()))
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .map(|f| {
            (
                f.id,
                FolioInfo {
                    id: FolioId::from_uuid(f.id),
                    customer_id: CustomerId::from_uuid(f.customer_id),
                    balance: f.balance,
                    settled: f.settled,
                },
            )
        })
        .collect())
}

/// Loads a payment mode as the domain lookup type.
async fn payment_mode_info<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<PaymentModeInfo, ReconcileError> {
    let mode = payment_modes::Entity::find_by_id(id)
        .one(conn)
        .await
        .map_err(db_err)?
        .ok_or_else(|| ReconcileError::PaymentModeNotFound(PaymentModeId::from_uuid(id)))?;

    Ok(PaymentModeInfo {
        id: PaymentModeId::from_uuid(mode.id),
        account_id: AccountId::from_uuid(mode.account_id),
        is_city_ledger: mode.is_city_ledger,
    })
}

/// Inserts folio rows in request order.
async fn insert_folio_rows(
    txn: &DatabaseTransaction,
    invoice_id: Uuid,
    refs: &[FolioRef],
) -> Result<(), DbErr> {
    for (position, folio) in refs.iter().enumerate() {
        invoice_folios::ActiveModel {
            id: Set(Uuid::now_v7()),
            invoice_id: Set(invoice_id),
            folio_id: Set(folio.folio_id.into_inner()),
            amount: Set(folio.amount),
            position: Set(i32::try_from(position).unwrap_or(i32::MAX)),
        }
        .insert(txn)
        .await?;
    }
    Ok(())
}

/// Returns the position for a newly appended child row.
fn next_position<I: Iterator<Item = i32>>(existing: I) -> i32 {
    existing.max().map_or(0, |max| max + 1)
}
