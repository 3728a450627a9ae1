//! Property-based tests for totals recomputation.
//!
//! Checked properties:
//! - outstanding is never negative, and exact whenever the clamp is idle
//! - settlement happens exactly when posted rows cover the total
//! - pending rows never leak into totals
//! - capture and voucher reversal are exact inverses
//! - removing an entry's allocation rows restores the prior totals

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use stayra_shared::types::{
    AllocationId, CustomerId, FolioId, InvoiceDiscountId, InvoiceId, InvoicePaymentId,
    JournalEntryId, PaymentEntryId, PaymentModeId,
};

use super::reversal::{remove_entry_rows, unlink_voucher_row};
use super::totals::{compute_totals, derive_status};
use super::types::{
    AllocationRow, DiscountRow, FolioRef, InvoiceDoc, InvoiceStatus, PaymentRow,
};

/// Strategy to generate positive decimal amounts (0.01 to 1,000,000.00).
fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate folio balance lists.
fn folio_amounts() -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec(amount(), 1..4)
}

/// Strategy to generate payment rows as (amount, paid) pairs.
fn payment_specs() -> impl Strategy<Value = Vec<(Decimal, bool)>> {
    prop::collection::vec((amount(), any::<bool>()), 0..5)
}

/// Strategy to generate discount rows as (amount, applied) pairs.
fn discount_specs() -> impl Strategy<Value = Vec<(Decimal, bool)>> {
    prop::collection::vec((amount(), any::<bool>()), 0..3)
}

/// Strategy to generate allocation row amounts.
fn allocation_amounts() -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec(amount(), 0..4)
}

/// Helper to assemble an unpaid invoice from generated rows.
fn make_doc(
    folios: &[Decimal],
    payments: &[(Decimal, bool)],
    allocations: &[Decimal],
    discounts: &[(Decimal, bool)],
) -> InvoiceDoc {
    InvoiceDoc {
        id: InvoiceId::new(),
        customer_id: CustomerId::new(),
        status: InvoiceStatus::Unpaid,
        issued_date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
        due_date: NaiveDate::from_ymd_opt(2026, 2, 28).unwrap(),
        folios: folios
            .iter()
            .map(|&amount| FolioRef {
                folio_id: FolioId::new(),
                amount,
            })
            .collect(),
        payments: payments
            .iter()
            .map(|&(amount, paid)| PaymentRow {
                id: InvoicePaymentId::new(),
                payment_date: NaiveDate::from_ymd_opt(2026, 2, 10).unwrap(),
                payment_mode_id: PaymentModeId::new(),
                amount,
                reference_no: None,
                paid,
                journal_entry_id: paid.then(JournalEntryId::new),
            })
            .collect(),
        allocations: allocations
            .iter()
            .map(|&amount| AllocationRow {
                id: AllocationId::new(),
                payment_entry_id: PaymentEntryId::new(),
                amount,
            })
            .collect(),
        discounts: discounts
            .iter()
            .map(|&(amount, applied)| DiscountRow {
                id: InvoiceDiscountId::new(),
                description: "Generated".to_string(),
                amount,
                journal_entry_id: applied.then(JournalEntryId::new),
            })
            .collect(),
    }
}

/// Sum of rows that should count toward total_paid.
fn posted_paid(doc: &InvoiceDoc) -> Decimal {
    let captured: Decimal = doc
        .payments
        .iter()
        .filter(|p| p.paid)
        .map(|p| p.amount)
        .sum();
    let allocated: Decimal = doc.allocations.iter().map(|a| a.amount).sum();
    captured + allocated
}

/// Sum of rows that should count toward total_discount.
fn posted_discount(doc: &InvoiceDoc) -> Decimal {
    doc.discounts
        .iter()
        .filter(|d| d.is_applied())
        .map(|d| d.amount)
        .sum()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_outstanding_never_negative(
        folios in folio_amounts(),
        payments in payment_specs(),
        allocations in allocation_amounts(),
        discounts in discount_specs(),
    ) {
        let doc = make_doc(&folios, &payments, &allocations, &discounts);
        let totals = compute_totals(&doc);

        prop_assert!(
            totals.outstanding >= Decimal::ZERO,
            "outstanding went negative: {}",
            totals.outstanding
        );
    }

    #[test]
    fn prop_outstanding_exact_when_unclamped(
        folios in folio_amounts(),
        payments in payment_specs(),
        allocations in allocation_amounts(),
        discounts in discount_specs(),
    ) {
        let doc = make_doc(&folios, &payments, &allocations, &discounts);
        let totals = compute_totals(&doc);

        let covered = posted_paid(&doc) + posted_discount(&doc);
        if covered <= totals.total_amount {
            prop_assert_eq!(
                totals.outstanding,
                totals.total_amount - covered,
                "outstanding must be the uncovered remainder"
            );
        } else {
            prop_assert_eq!(totals.outstanding, Decimal::ZERO);
        }
    }

    #[test]
    fn prop_settled_iff_posted_rows_cover_total(
        folios in folio_amounts(),
        payments in payment_specs(),
        allocations in allocation_amounts(),
        discounts in discount_specs(),
    ) {
        let doc = make_doc(&folios, &payments, &allocations, &discounts);
        let totals = compute_totals(&doc);

        let covered = posted_paid(&doc) + posted_discount(&doc);
        prop_assert_eq!(
            totals.is_settled,
            covered >= totals.total_amount,
            "settlement must track coverage exactly"
        );

        let derived = derive_status(InvoiceStatus::Unpaid, &totals);
        if totals.is_settled {
            prop_assert_eq!(derived, InvoiceStatus::Paid);
        } else {
            prop_assert_eq!(derived, InvoiceStatus::Unpaid);
        }
    }

    #[test]
    fn prop_pending_rows_never_count(
        folios in folio_amounts(),
        pending_payments in prop::collection::vec(amount(), 0..5),
        allocations in allocation_amounts(),
        pending_discounts in prop::collection::vec(amount(), 0..3),
    ) {
        let payments: Vec<(Decimal, bool)> =
            pending_payments.iter().map(|&a| (a, false)).collect();
        let discounts: Vec<(Decimal, bool)> =
            pending_discounts.iter().map(|&a| (a, false)).collect();
        let doc = make_doc(&folios, &payments, &allocations, &discounts);
        let totals = compute_totals(&doc);

        let allocated: Decimal = allocations.iter().copied().sum();
        prop_assert_eq!(
            totals.total_paid,
            allocated,
            "only allocation rows may count while all payments are pending"
        );
        prop_assert_eq!(totals.total_discount, Decimal::ZERO);
    }

    #[test]
    fn prop_capture_then_reverse_is_identity(
        folios in folio_amounts(),
        payments in payment_specs(),
        row_amount in amount(),
    ) {
        let mut doc = make_doc(&folios, &payments, &[], &[]);
        let baseline = compute_totals(&doc);

        // capture a fresh pending row into a voucher
        let voucher = JournalEntryId::new();
        let row_id = InvoicePaymentId::new();
        doc.payments.push(PaymentRow {
            id: row_id,
            payment_date: NaiveDate::from_ymd_opt(2026, 2, 15).unwrap(),
            payment_mode_id: PaymentModeId::new(),
            amount: row_amount,
            reference_no: None,
            paid: true,
            journal_entry_id: Some(voucher),
        });
        let captured = compute_totals(&doc);
        prop_assert_eq!(
            captured.total_paid,
            baseline.total_paid + row_amount,
            "capture must raise total_paid by exactly the row amount"
        );

        // cancelling the voucher reverses the capture exactly
        let reversed = unlink_voucher_row(&mut doc, voucher);
        prop_assert!(reversed.is_some(), "the captured row must be found");
        prop_assert_eq!(compute_totals(&doc), baseline);
    }

    #[test]
    fn prop_entry_reversal_restores_totals(
        folios in folio_amounts(),
        other_allocations in allocation_amounts(),
        entry_allocations in prop::collection::vec(amount(), 1..4),
    ) {
        let mut doc = make_doc(&folios, &[], &other_allocations, &[]);
        let baseline = compute_totals(&doc);

        let entry_id = PaymentEntryId::new();
        for &amount in &entry_allocations {
            doc.allocations.push(AllocationRow {
                id: AllocationId::new(),
                payment_entry_id: entry_id,
                amount,
            });
        }
        let submitted = compute_totals(&doc);
        let entry_total: Decimal = entry_allocations.iter().copied().sum();
        prop_assert_eq!(submitted.total_paid, baseline.total_paid + entry_total);

        let removed = remove_entry_rows(&mut doc, entry_id);
        prop_assert_eq!(removed.len(), entry_allocations.len());
        prop_assert_eq!(compute_totals(&doc), baseline);
        prop_assert_eq!(doc.allocations.len(), other_allocations.len());
    }

    #[test]
    fn prop_recompute_is_deterministic(
        folios in folio_amounts(),
        payments in payment_specs(),
        allocations in allocation_amounts(),
        discounts in discount_specs(),
    ) {
        let doc = make_doc(&folios, &payments, &allocations, &discounts);
        prop_assert_eq!(compute_totals(&doc), compute_totals(&doc));
    }
}
