//! Payment entry repository.
//!
//! A payment entry records money received from a customer. Submission
//! allocates it across that customer's unpaid invoices in one transaction,
//! holding every target invoice lock in ascending ID order. Cancellation
//! reverses the allocations invoice by invoice, each in its own
//! transaction.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QuerySelect, Set, TransactionTrait,
};
use tracing::{error, info};
use uuid::Uuid;

use stayra_core::reconcile::allocation::{entry_remaining, validate_allocations, validate_entry_cancellable};
use stayra_core::reconcile::validation::validate_amount;
use stayra_core::reconcile::{
    AllocationRequest, InvoiceAllocationView, PaymentEntryInfo, ReconcileError,
};
use stayra_shared::types::{CustomerId, InvoiceId, PaymentEntryId};

use crate::entities::{
    customers, invoice_payment_entries, invoices, payment_entries, sea_orm_active_enums,
};
use crate::locks::InvoiceLocks;

use super::db_err;
use super::invoice::recompute_and_store;

/// Input for creating a payment entry draft.
#[derive(Debug, Clone)]
pub struct CreatePaymentEntryInput {
    /// The customer the money was received from.
    pub customer_id: Uuid,
    /// The posting date.
    pub posting_date: NaiveDate,
    /// The amount received.
    pub paid_amount: Decimal,
    /// Optional external reference (cheque number, transfer id).
    pub reference_no: Option<String>,
}

/// How much of an entry is still available to allocate.
#[derive(Debug, Clone)]
pub struct EntryRemaining {
    /// The amount the entry received.
    pub paid_amount: Decimal,
    /// The amount already allocated to live invoices.
    pub allocated: Decimal,
    /// What is left, clamped at zero.
    pub remaining: Decimal,
}

/// Result of cancelling a payment entry.
#[derive(Debug, Clone)]
pub struct PaymentEntryCancellation {
    /// The cancelled entry.
    pub entry: payment_entries::Model,
    /// Invoices whose allocation rows were reversed.
    pub reversed_invoices: Vec<Uuid>,
}

/// Payment entry repository.
#[derive(Debug, Clone)]
pub struct PaymentEntryRepository {
    db: DatabaseConnection,
    locks: InvoiceLocks,
}

impl PaymentEntryRepository {
    /// Creates a new payment entry repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, locks: InvoiceLocks) -> Self {
        Self { db, locks }
    }

    /// Creates a payment entry draft.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is invalid or the customer does not
    /// exist.
    pub async fn create_payment_entry(
        &self,
        input: CreatePaymentEntryInput,
    ) -> Result<payment_entries::Model, ReconcileError> {
        validate_amount(input.paid_amount)?;
        let customer = customers::Entity::find_by_id(input.customer_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| {
                ReconcileError::CustomerNotFound(CustomerId::from_uuid(input.customer_id))
            })?;

        let now = chrono::Utc::now().into();
        let entry = payment_entries::ActiveModel {
            id: Set(Uuid::now_v7()),
            customer_id: Set(customer.id),
            posting_date: Set(input.posting_date),
            paid_amount: Set(input.paid_amount),
            reference_no: Set(input.reference_no),
            status: Set(sea_orm_active_enums::PaymentEntryStatus::Draft),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;

        info!(entry_id = %entry.id, customer_id = %customer.id, paid_amount = %entry.paid_amount, "created payment entry draft");
        Ok(entry)
    }

    /// Finds a payment entry by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_payment_entry_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<payment_entries::Model>, ReconcileError> {
        payment_entries::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)
    }

    /// Reports how much of an entry is still available to allocate.
    ///
    /// Rows on cancelled invoices do not count as allocated; their money
    /// has returned to the entry. `exclude_invoice` additionally ignores
    /// rows on one invoice, for re-allocation flows.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry does not exist.
    pub async fn get_remaining(
        &self,
        id: Uuid,
        exclude_invoice: Option<Uuid>,
    ) -> Result<EntryRemaining, ReconcileError> {
        let entry = self.require(id).await?;
        let allocated = allocated_total(&self.db, id, exclude_invoice)
            .await
            .map_err(db_err)?;

        Ok(EntryRemaining {
            paid_amount: entry.paid_amount,
            allocated,
            remaining: entry_remaining(entry.paid_amount, allocated),
        })
    }

    /// Submits a draft entry, allocating it across unpaid invoices.
    ///
    /// The requested split must sum to exactly the entry amount, or be
    /// empty to submit the money unallocated. Every target invoice lock is
    /// taken in ascending ID order, the entry row itself is locked with
    /// `FOR UPDATE`, and the allocation rows, totals recomputations, and
    /// status flip commit as one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if any allocation rule fails; nothing is applied.
    pub async fn submit_payment_entry(
        &self,
        id: Uuid,
        requests: Vec<AllocationRequest>,
    ) -> Result<payment_entries::Model, ReconcileError> {
        let mut target_ids: Vec<Uuid> =
            requests.iter().map(|r| r.invoice_id.into_inner()).collect();
        target_ids.sort_unstable();
        target_ids.dedup();

        let _guards = self.locks.acquire_many(&target_ids).await;

        let txn = self.db.begin().await.map_err(db_err)?;
        let entry = payment_entries::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| ReconcileError::EntryNotFound(PaymentEntryId::from_uuid(id)))?;

        let entry_info = PaymentEntryInfo {
            id: PaymentEntryId::from_uuid(entry.id),
            customer_id: CustomerId::from_uuid(entry.customer_id),
            paid_amount: entry.paid_amount,
            status: entry.status.clone().into(),
        };
        let linked_elsewhere = allocated_total(&txn, id, None).await.map_err(db_err)?;
        let (views, mut next_positions) =
            allocation_context(&txn, &target_ids, id).await.map_err(db_err)?;

        let plan = validate_allocations(&entry_info, &requests, linked_elsewhere, |invoice_id| {
            views
                .get(&invoice_id.into_inner())
                .cloned()
                .ok_or(ReconcileError::InvoiceNotFound(invoice_id))
        })?;

        for request in &plan.rows {
            let invoice_uuid = request.invoice_id.into_inner();
            let position = next_positions.entry(invoice_uuid).or_insert(0);
            invoice_payment_entries::ActiveModel {
                id: Set(Uuid::now_v7()),
                invoice_id: Set(invoice_uuid),
                payment_entry_id: Set(id),
                amount: Set(request.amount),
                position: Set(*position),
            }
            .insert(&txn)
            .await
            .map_err(db_err)?;
            *position += 1;
        }

        for (invoice_id, _) in &plan.per_invoice {
            recompute_and_store(&txn, invoice_id.into_inner()).await?;
        }

        let mut active: payment_entries::ActiveModel = entry.into();
        active.status = Set(sea_orm_active_enums::PaymentEntryStatus::Submitted);
        active.updated_at = Set(chrono::Utc::now().into());
        let entry = active.update(&txn).await.map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;

        info!(
            entry_id = %id,
            invoices = plan.per_invoice.len(),
            paid_amount = %entry.paid_amount,
            "submitted payment entry"
        );
        Ok(entry)
    }

    /// Cancels a submitted entry, reversing its allocations.
    ///
    /// Each affected invoice is reversed under its own lock in its own
    /// transaction, ascending by invoice ID. If any reversal fails the
    /// entry stays submitted and the first error is returned; reversals
    /// already committed stand, and a retry completes the rest.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be cancelled or any reversal
    /// transaction fails.
    pub async fn cancel_payment_entry(
        &self,
        id: Uuid,
    ) -> Result<PaymentEntryCancellation, ReconcileError> {
        let entry = self.require(id).await?;
        validate_entry_cancellable(entry.status.clone().into())?;

        let rows = invoice_payment_entries::Entity::find()
            .filter(invoice_payment_entries::Column::PaymentEntryId.eq(id))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        let mut invoice_ids: Vec<Uuid> = rows.iter().map(|r| r.invoice_id).collect();
        invoice_ids.sort_unstable();
        invoice_ids.dedup();

        let mut reversed = Vec::with_capacity(invoice_ids.len());
        let mut first_failure: Option<ReconcileError> = None;
        for invoice_id in invoice_ids {
            let _guard = self.locks.acquire(invoice_id).await;
            match self.reverse_invoice(invoice_id, id).await {
                Ok(()) => reversed.push(invoice_id),
                Err(e) => {
                    error!(
                        entry_id = %id,
                        invoice_id = %invoice_id,
                        error = %e,
                        "allocation reversal failed, continuing with remaining invoices"
                    );
                    if first_failure.is_none() {
                        first_failure = Some(e);
                    }
                }
            }
        }

        if let Some(e) = first_failure {
            // The entry stays submitted so cancellation can be retried.
            return Err(e);
        }

        let mut active: payment_entries::ActiveModel = entry.into();
        active.status = Set(sea_orm_active_enums::PaymentEntryStatus::Cancelled);
        active.updated_at = Set(chrono::Utc::now().into());
        let entry = active.update(&self.db).await.map_err(db_err)?;

        info!(entry_id = %id, invoices = reversed.len(), "cancelled payment entry");
        Ok(PaymentEntryCancellation {
            entry,
            reversed_invoices: reversed,
        })
    }

    /// Deletes this entry's allocation rows on one invoice and recomputes
    /// it, in one transaction.
    async fn reverse_invoice(&self, invoice_id: Uuid, entry_id: Uuid) -> Result<(), ReconcileError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        invoice_payment_entries::Entity::delete_many()
            .filter(invoice_payment_entries::Column::InvoiceId.eq(invoice_id))
            .filter(invoice_payment_entries::Column::PaymentEntryId.eq(entry_id))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        recompute_and_store(&txn, invoice_id).await?;
        txn.commit().await.map_err(db_err)?;
        Ok(())
    }

    /// Fetches an entry or fails with not-found.
    async fn require(&self, id: Uuid) -> Result<payment_entries::Model, ReconcileError> {
        payment_entries::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| ReconcileError::EntryNotFound(PaymentEntryId::from_uuid(id)))
    }
}

/// Sums an entry's allocation rows on live invoices.
async fn allocated_total<C: ConnectionTrait>(
    conn: &C,
    entry_id: Uuid,
    exclude_invoice: Option<Uuid>,
) -> Result<Decimal, DbErr> {
    let mut query = invoice_payment_entries::Entity::find()
        .filter(invoice_payment_entries::Column::PaymentEntryId.eq(entry_id));
    if let Some(exclude) = exclude_invoice {
        query = query.filter(invoice_payment_entries::Column::InvoiceId.ne(exclude));
    }
    let rows = query.all(conn).await?;
    if rows.is_empty() {
        return Ok(Decimal::ZERO);
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
        .iter()
        .filter(|r| live.contains(&r.invoice_id))
        .map(|r| r.amount)
        .sum())
}

/// Loads allocation views and next row positions for the target invoices.
async fn allocation_context<C: ConnectionTrait>(
    conn: &C,
    invoice_ids: &[Uuid],
    entry_id: Uuid,
) -> Result<(HashMap<Uuid, InvoiceAllocationView>, HashMap<Uuid, i32>), DbErr> {
    if invoice_ids.is_empty() {
        return Ok((HashMap::new(), HashMap::new()));
    }

    let invoice_models = invoices::Entity::find()
        .filter(invoices::Column::Id.is_in(invoice_ids.to_vec()))
        .all(conn)
        .await?;
    let rows = invoice_payment_entries::Entity::find()
        .filter(invoice_payment_entries::Column::InvoiceId.is_in(invoice_ids.to_vec()))
        .all(conn)
        .await?;

    let mut views = HashMap::with_capacity(invoice_models.len());
    let mut next_positions = HashMap::with_capacity(invoice_models.len());
    for model in invoice_models {
        let allocated_to_entry: Decimal = rows
            .iter()
            .filter(|r| r.invoice_id == model.id && r.payment_entry_id == entry_id)
            .map(|r| r.amount)
            .sum();
        let next = rows
            .iter()
            .filter(|r| r.invoice_id == model.id)
            .map(|r| r.position)
            .max()
            .map_or(0, |max| max + 1);

        next_positions.insert(model.id, next);
        views.insert(
            model.id,
            InvoiceAllocationView {
                id: InvoiceId::from_uuid(model.id),
                customer_id: CustomerId::from_uuid(model.customer_id),
                status: model.status.clone().into(),
                outstanding: model.outstanding,
                allocated_to_entry,
            },
        );
    }

    Ok((views, next_positions))
}
