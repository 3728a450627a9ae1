//! Property-based tests for payment entry allocation.
//!
//! Checked properties:
//! - any split that exactly consumes the entry and fits each invoice's
//!   outstanding balance validates, whatever the request order
//! - any split that over- or under-consumes the entry is rejected
//! - a combined allocation beyond an invoice's outstanding is rejected
//! - duplicate requests to one invoice are judged by their combined sum
//! - the plan's per-invoice list always comes back in ascending ID order

use proptest::prelude::*;
use rust_decimal::Decimal;

use stayra_shared::types::{CustomerId, InvoiceId, PaymentEntryId};

use super::allocation::{
    validate_allocations, AllocationRequest, InvoiceAllocationView, PaymentEntryInfo,
};
use super::error::ReconcileError;
use super::types::{InvoiceStatus, PaymentEntryStatus};

/// Strategy to generate (allocation, slack) cent pairs per invoice.
///
/// Each invoice's outstanding balance is the allocation plus the slack, so
/// the allocation always fits.
fn fitting_splits() -> impl Strategy<Value = Vec<(i64, i64)>> {
    prop::collection::vec((1i64..50_000_000i64, 0i64..10_000_000i64), 1..4)
}

fn make_entry(paid_amount: Decimal) -> PaymentEntryInfo {
    PaymentEntryInfo {
        id: PaymentEntryId::new(),
        customer_id: CustomerId::new(),
        paid_amount,
        status: PaymentEntryStatus::Draft,
    }
}

fn make_view(
    customer_id: CustomerId,
    outstanding: Decimal,
) -> InvoiceAllocationView {
    InvoiceAllocationView {
        id: InvoiceId::new(),
        customer_id,
        status: InvoiceStatus::Unpaid,
        outstanding,
        allocated_to_entry: Decimal::ZERO,
    }
}

/// Builds a lookup closure over a fixed set of views.
fn lookup_in(
    views: &[InvoiceAllocationView],
) -> impl Fn(InvoiceId) -> Result<InvoiceAllocationView, ReconcileError> + '_ {
    move |id| {
        views
            .iter()
            .find(|v| v.id == id)
            .cloned()
            .ok_or(ReconcileError::InvoiceNotFound(id))
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_exact_fitting_split_validates(splits in fitting_splits()) {
        let customer = CustomerId::new();
        let views: Vec<InvoiceAllocationView> = splits
            .iter()
            .map(|&(alloc, slack)| make_view(customer, Decimal::new(alloc + slack, 2)))
            .collect();
        let requests: Vec<AllocationRequest> = views
            .iter()
            .zip(&splits)
            .rev()
            .map(|(view, &(alloc, _))| AllocationRequest {
                invoice_id: view.id,
                amount: Decimal::new(alloc, 2),
            })
            .collect();
        let paid: Decimal = requests.iter().map(|r| r.amount).sum();

        let mut entry = make_entry(paid);
        entry.customer_id = customer;

        let plan = validate_allocations(&entry, &requests, Decimal::ZERO, lookup_in(&views));
        prop_assert!(plan.is_ok(), "fitting split rejected: {:?}", plan.err());
        let plan = plan.unwrap();

        let combined: Decimal = plan.per_invoice.iter().map(|(_, amount)| *amount).sum();
        prop_assert_eq!(combined, paid, "plan must consume the entry exactly");

        let ids: Vec<InvoiceId> = plan.per_invoice.iter().map(|(id, _)| *id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        prop_assert_eq!(ids, sorted, "per-invoice list must be ascending");

        prop_assert_eq!(plan.rows.len(), requests.len());
        prop_assert_eq!(plan.rows[0].invoice_id, requests[0].invoice_id);
    }

    #[test]
    fn prop_surplus_entry_amount_rejected(
        splits in fitting_splits(),
        extra_cents in 1i64..1_000_000i64,
    ) {
        let customer = CustomerId::new();
        let views: Vec<InvoiceAllocationView> = splits
            .iter()
            .map(|&(alloc, slack)| make_view(customer, Decimal::new(alloc + slack, 2)))
            .collect();
        let requests: Vec<AllocationRequest> = views
            .iter()
            .zip(&splits)
            .map(|(view, &(alloc, _))| AllocationRequest {
                invoice_id: view.id,
                amount: Decimal::new(alloc, 2),
            })
            .collect();
        let total: Decimal = requests.iter().map(|r| r.amount).sum();

        let mut entry = make_entry(total + Decimal::new(extra_cents, 2));
        entry.customer_id = customer;

        let result = validate_allocations(&entry, &requests, Decimal::ZERO, lookup_in(&views));
        prop_assert!(
            matches!(result, Err(ReconcileError::AllocationMismatch { .. })),
            "undersized split must be rejected, got {:?}",
            result.as_ref().map(|p| p.rows.len())
        );
    }

    #[test]
    fn prop_deficit_entry_amount_rejected(
        splits in fitting_splits(),
        deficit_cents in 1i64..1_000_000i64,
    ) {
        let customer = CustomerId::new();
        let views: Vec<InvoiceAllocationView> = splits
            .iter()
            .map(|&(alloc, slack)| make_view(customer, Decimal::new(alloc + slack, 2)))
            .collect();
        let requests: Vec<AllocationRequest> = views
            .iter()
            .zip(&splits)
            .map(|(view, &(alloc, _))| AllocationRequest {
                invoice_id: view.id,
                amount: Decimal::new(alloc, 2),
            })
            .collect();
        let total: Decimal = requests.iter().map(|r| r.amount).sum();
        let paid = total - Decimal::new(deficit_cents, 2);
        prop_assume!(paid > Decimal::ZERO);

        let mut entry = make_entry(paid);
        entry.customer_id = customer;

        let result = validate_allocations(&entry, &requests, Decimal::ZERO, lookup_in(&views));
        prop_assert!(
            matches!(result, Err(ReconcileError::AllocationMismatch { .. })),
            "oversized split must be rejected"
        );
    }

    #[test]
    fn prop_combined_beyond_outstanding_rejected(
        alloc_cents in 2i64..50_000_000i64,
        shortfall_seed in 1i64..50_000_000i64,
    ) {
        let customer = CustomerId::new();
        let shortfall_cents = 1 + shortfall_seed % (alloc_cents - 1);
        let outstanding = Decimal::new(alloc_cents - shortfall_cents, 2);
        let views = vec![make_view(customer, outstanding)];
        let requests = vec![AllocationRequest {
            invoice_id: views[0].id,
            amount: Decimal::new(alloc_cents, 2),
        }];

        let mut entry = make_entry(Decimal::new(alloc_cents, 2));
        entry.customer_id = customer;

        let result = validate_allocations(&entry, &requests, Decimal::ZERO, lookup_in(&views));
        prop_assert!(
            matches!(result, Err(ReconcileError::OverAllocation { .. })),
            "allocation beyond outstanding must be rejected"
        );
    }

    #[test]
    fn prop_duplicate_requests_judged_combined(
        part_cents in prop::collection::vec(1i64..1_000_000i64, 2..5),
    ) {
        let customer = CustomerId::new();
        let total_cents: i64 = part_cents.iter().sum();
        let views = vec![make_view(customer, Decimal::new(total_cents, 2))];
        let requests: Vec<AllocationRequest> = part_cents
            .iter()
            .map(|&cents| AllocationRequest {
                invoice_id: views[0].id,
                amount: Decimal::new(cents, 2),
            })
            .collect();

        let mut entry = make_entry(Decimal::new(total_cents, 2));
        entry.customer_id = customer;

        let plan = validate_allocations(&entry, &requests, Decimal::ZERO, lookup_in(&views))
            .expect("combined split exactly fills the outstanding balance");
        prop_assert_eq!(plan.rows.len(), requests.len());
        prop_assert_eq!(plan.per_invoice.len(), 1, "one invoice, one combined amount");
        prop_assert_eq!(plan.per_invoice[0].1, Decimal::new(total_cents, 2));
    }
}
