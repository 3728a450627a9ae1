//! Payment entry allocation across invoices.
//!
//! A payment entry holds money received from a customer. Submitting the
//! entry splits that money across the customer's unpaid invoices as
//! allocation rows. The split must consume the entry exactly and fit within
//! each invoice's outstanding balance. Cancelling the entry removes every
//! row it created.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use stayra_shared::types::{CustomerId, InvoiceId, PaymentEntryId};

use super::error::ReconcileError;
use super::types::{InvoiceStatus, PaymentEntryStatus};
use super::validation::validate_amount;

/// Payment entry fields needed for allocation decisions.
#[derive(Debug, Clone)]
pub struct PaymentEntryInfo {
    /// The payment entry ID.
    pub id: PaymentEntryId,
    /// The customer the money was received from.
    pub customer_id: CustomerId,
    /// The amount received.
    pub paid_amount: Decimal,
    /// Current lifecycle status.
    pub status: PaymentEntryStatus,
}

/// One requested allocation of entry money to an invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationRequest {
    /// The target invoice.
    pub invoice_id: InvoiceId,
    /// The amount to allocate to it.
    pub amount: Decimal,
}

/// Invoice fields needed to judge an allocation, as seen inside the
/// submitting transaction.
#[derive(Debug, Clone)]
pub struct InvoiceAllocationView {
    /// The invoice ID.
    pub id: InvoiceId,
    /// The customer the invoice bills.
    pub customer_id: CustomerId,
    /// Current lifecycle status.
    pub status: InvoiceStatus,
    /// Current outstanding balance.
    pub outstanding: Decimal,
    /// Amount already allocated to this invoice from this entry.
    pub allocated_to_entry: Decimal,
}

/// A validated allocation split, ready to apply.
#[derive(Debug, Clone)]
pub struct AllocationPlan {
    /// The requested rows, in request order.
    pub rows: Vec<AllocationRequest>,
    /// Per-invoice combined amounts, ascending by invoice ID. Callers that
    /// lock invoices must take them in this order.
    pub per_invoice: Vec<(InvoiceId, Decimal)>,
}

impl AllocationPlan {
    /// Returns true if the plan allocates nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Validates an allocation split for a draft payment entry.
///
/// Rules, in order:
/// - the entry must be draft, with a valid positive amount;
/// - an empty split is valid and produces an empty plan;
/// - row amounts must be valid and sum to exactly the entry amount;
/// - the entry must not already have live allocation rows anywhere
///   (`linked_elsewhere` is the sum of such rows);
/// - per target invoice: same customer, status unpaid, combined amount
///   within its outstanding balance, and combined plus already-allocated
///   within the entry amount.
///
/// Requests naming the same invoice twice are combined for the per-invoice
/// checks but kept as separate rows in the plan.
///
/// # Errors
///
/// Returns `ReconcileError` if any rule fails.
pub fn validate_allocations<L>(
    entry: &PaymentEntryInfo,
    requests: &[AllocationRequest],
    linked_elsewhere: Decimal,
    invoice_view: L,
) -> Result<AllocationPlan, ReconcileError>
where
    L: Fn(InvoiceId) -> Result<InvoiceAllocationView, ReconcileError>,
{
    if entry.status != PaymentEntryStatus::Draft {
        return Err(ReconcileError::EntryNotDraft);
    }
    validate_amount(entry.paid_amount)?;

    if requests.is_empty() {
        return Ok(AllocationPlan {
            rows: vec![],
            per_invoice: vec![],
        });
    }

    for request in requests {
        validate_amount(request.amount)?;
    }

    let allocated: Decimal = requests.iter().map(|r| r.amount).sum();
    if allocated != entry.paid_amount {
        return Err(ReconcileError::AllocationMismatch {
            allocated,
            entry_amount: entry.paid_amount,
        });
    }

    if linked_elsewhere != Decimal::ZERO {
        return Err(ReconcileError::ExistingAllocations(linked_elsewhere));
    }

    let mut combined: BTreeMap<InvoiceId, Decimal> = BTreeMap::new();
    for request in requests {
        *combined.entry(request.invoice_id).or_insert(Decimal::ZERO) += request.amount;
    }

    for (&invoice_id, &amount) in &combined {
        let view = invoice_view(invoice_id)?;
        if view.customer_id != entry.customer_id {
            return Err(ReconcileError::AllocationCustomerMismatch(invoice_id));
        }
        if view.status != InvoiceStatus::Unpaid {
            return Err(ReconcileError::InvoiceNotAllocatable {
                invoice: invoice_id,
                status: view.status,
            });
        }
        if amount > view.outstanding {
            return Err(ReconcileError::OverAllocation {
                invoice: invoice_id,
                amount,
                outstanding: view.outstanding,
            });
        }
        if view.allocated_to_entry + amount > entry.paid_amount {
            return Err(ReconcileError::AllocationOverrun(invoice_id));
        }
    }

    Ok(AllocationPlan {
        rows: requests.to_vec(),
        per_invoice: combined.into_iter().collect(),
    })
}

/// Returns the entry money not yet allocated.
#[must_use]
pub fn entry_remaining(paid_amount: Decimal, allocated: Decimal) -> Decimal {
    paid_amount - allocated
}

/// Validates that a payment entry can be cancelled.
///
/// # Errors
///
/// Returns `EntryNotSubmitted` for drafts and `EntryAlreadyCancelled` for
/// entries already reversed.
pub fn validate_entry_cancellable(status: PaymentEntryStatus) -> Result<(), ReconcileError> {
    match status {
        PaymentEntryStatus::Submitted => Ok(()),
        PaymentEntryStatus::Draft => Err(ReconcileError::EntryNotSubmitted),
        PaymentEntryStatus::Cancelled => Err(ReconcileError::EntryAlreadyCancelled),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn make_entry(paid_amount: Decimal) -> PaymentEntryInfo {
        PaymentEntryInfo {
            id: PaymentEntryId::new(),
            customer_id: CustomerId::new(),
            paid_amount,
            status: PaymentEntryStatus::Draft,
        }
    }

    fn unpaid_view(entry: &PaymentEntryInfo, outstanding: Decimal) -> InvoiceAllocationView {
        InvoiceAllocationView {
            id: InvoiceId::new(),
            customer_id: entry.customer_id,
            status: InvoiceStatus::Unpaid,
            outstanding,
            allocated_to_entry: dec!(0),
        }
    }

    #[test]
    fn test_exact_split_across_invoices() {
        let entry = make_entry(dec!(300));
        let first = unpaid_view(&entry, dec!(180));
        let second = unpaid_view(&entry, dec!(200));
        let views = [first.clone(), second.clone()];

        let requests = vec![
            AllocationRequest {
                invoice_id: first.id,
                amount: dec!(180),
            },
            AllocationRequest {
                invoice_id: second.id,
                amount: dec!(120),
            },
        ];

        let plan = validate_allocations(&entry, &requests, dec!(0), |id| {
            views
                .iter()
                .find(|v| v.id == id)
                .cloned()
                .ok_or(ReconcileError::InvoiceNotFound(id))
        })
        .unwrap();

        assert_eq!(plan.rows.len(), 2);
        assert_eq!(plan.per_invoice.len(), 2);
        let total: Decimal = plan.per_invoice.iter().map(|(_, amount)| *amount).sum();
        assert_eq!(total, dec!(300));
    }

    #[test]
    fn test_empty_split_is_valid() {
        let entry = make_entry(dec!(300));
        let plan = validate_allocations(&entry, &[], dec!(0), |id| {
            Err(ReconcileError::InvoiceNotFound(id))
        })
        .unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_submitted_entry_rejected() {
        let mut entry = make_entry(dec!(300));
        entry.status = PaymentEntryStatus::Submitted;
        let result = validate_allocations(&entry, &[], dec!(0), |id| {
            Err(ReconcileError::InvoiceNotFound(id))
        });
        assert!(matches!(result, Err(ReconcileError::EntryNotDraft)));
    }

    #[test]
    fn test_mismatched_split_rejected() {
        let entry = make_entry(dec!(300));
        let view = unpaid_view(&entry, dec!(500));
        let requests = vec![AllocationRequest {
            invoice_id: view.id,
            amount: dec!(299.99),
        }];

        let result =
            validate_allocations(&entry, &requests, dec!(0), |_id| Ok(view.clone()));
        assert!(matches!(
            result,
            Err(ReconcileError::AllocationMismatch {
                allocated,
                entry_amount,
            }) if allocated == dec!(299.99) && entry_amount == dec!(300)
        ));
    }

    #[test]
    fn test_existing_allocations_rejected() {
        let entry = make_entry(dec!(300));
        let view = unpaid_view(&entry, dec!(500));
        let requests = vec![AllocationRequest {
            invoice_id: view.id,
            amount: dec!(300),
        }];

        let result =
            validate_allocations(&entry, &requests, dec!(120), |_id| Ok(view.clone()));
        assert!(matches!(
            result,
            Err(ReconcileError::ExistingAllocations(amount)) if amount == dec!(120)
        ));
    }

    #[test]
    fn test_wrong_customer_rejected() {
        let entry = make_entry(dec!(300));
        let mut view = unpaid_view(&entry, dec!(500));
        view.customer_id = CustomerId::new();
        let requests = vec![AllocationRequest {
            invoice_id: view.id,
            amount: dec!(300),
        }];

        let result =
            validate_allocations(&entry, &requests, dec!(0), |_id| Ok(view.clone()));
        assert!(matches!(
            result,
            Err(ReconcileError::AllocationCustomerMismatch(_))
        ));
    }

    #[test]
    fn test_draft_invoice_rejected() {
        let entry = make_entry(dec!(300));
        let mut view = unpaid_view(&entry, dec!(500));
        view.status = InvoiceStatus::Draft;
        let requests = vec![AllocationRequest {
            invoice_id: view.id,
            amount: dec!(300),
        }];

        let result =
            validate_allocations(&entry, &requests, dec!(0), |_id| Ok(view.clone()));
        assert!(matches!(
            result,
            Err(ReconcileError::InvoiceNotAllocatable {
                status: InvoiceStatus::Draft,
                ..
            })
        ));
    }

    #[test]
    fn test_over_allocation_rejected() {
        let entry = make_entry(dec!(300));
        let view = unpaid_view(&entry, dec!(250));
        let requests = vec![AllocationRequest {
            invoice_id: view.id,
            amount: dec!(300),
        }];

        let result =
            validate_allocations(&entry, &requests, dec!(0), |_id| Ok(view.clone()));
        assert!(matches!(
            result,
            Err(ReconcileError::OverAllocation {
                amount,
                outstanding,
                ..
            }) if amount == dec!(300) && outstanding == dec!(250)
        ));
    }

    #[test]
    fn test_duplicate_invoice_requests_combine() {
        let entry = make_entry(dec!(300));
        // outstanding covers each half but not the combined amount
        let view = unpaid_view(&entry, dec!(200));
        let requests = vec![
            AllocationRequest {
                invoice_id: view.id,
                amount: dec!(150),
            },
            AllocationRequest {
                invoice_id: view.id,
                amount: dec!(150),
            },
        ];

        let result =
            validate_allocations(&entry, &requests, dec!(0), |_id| Ok(view.clone()));
        assert!(matches!(
            result,
            Err(ReconcileError::OverAllocation { amount, .. }) if amount == dec!(300)
        ));
    }

    #[test]
    fn test_overrun_against_entry_amount() {
        let entry = make_entry(dec!(300));
        let mut view = unpaid_view(&entry, dec!(1000));
        view.allocated_to_entry = dec!(50);
        let requests = vec![AllocationRequest {
            invoice_id: view.id,
            amount: dec!(300),
        }];

        let result =
            validate_allocations(&entry, &requests, dec!(0), |_id| Ok(view.clone()));
        assert!(matches!(result, Err(ReconcileError::AllocationOverrun(_))));
    }

    #[test]
    fn test_per_invoice_sorted_ascending() {
        let entry = make_entry(dec!(300));
        let mut views: Vec<InvoiceAllocationView> =
            (0..3).map(|_| unpaid_view(&entry, dec!(100))).collect();
        views.sort_by_key(|v| v.id);
        // request in reverse order; the plan must come back sorted
        let requests: Vec<AllocationRequest> = views
            .iter()
            .rev()
            .map(|v| AllocationRequest {
                invoice_id: v.id,
                amount: dec!(100),
            })
            .collect();

        let plan = validate_allocations(&entry, &requests, dec!(0), |id| {
            views
                .iter()
                .find(|v| v.id == id)
                .cloned()
                .ok_or(ReconcileError::InvoiceNotFound(id))
        })
        .unwrap();

        let ids: Vec<InvoiceId> = plan.per_invoice.iter().map(|(id, _)| *id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
        // rows keep request order
        assert_eq!(plan.rows[0].invoice_id, requests[0].invoice_id);
    }

    #[test]
    fn test_entry_remaining() {
        assert_eq!(entry_remaining(dec!(300), dec!(120)), dec!(180));
        assert_eq!(entry_remaining(dec!(300), dec!(300)), dec!(0));
    }

    #[test]
    fn test_entry_cancellable() {
        assert!(validate_entry_cancellable(PaymentEntryStatus::Submitted).is_ok());
        assert!(matches!(
            validate_entry_cancellable(PaymentEntryStatus::Draft),
            Err(ReconcileError::EntryNotSubmitted)
        ));
        assert!(matches!(
            validate_entry_cancellable(PaymentEntryStatus::Cancelled),
            Err(ReconcileError::EntryAlreadyCancelled)
        ));
    }
}
