//! Folio attachment rules.
//!
//! A folio can back at most one non-cancelled invoice. Attachment snapshots
//! the folio's open balance into the invoice row; the snapshot is what the
//! invoice collects even if the folio moves afterwards.

use std::collections::HashSet;

use rust_decimal::Decimal;

use super::error::ReconcileError;
use super::types::FolioRef;
use stayra_shared::types::{CustomerId, FolioId, InvoiceId};

/// Folio fields needed for attachment decisions.
#[derive(Debug, Clone)]
pub struct FolioInfo {
    /// The folio ID.
    pub id: FolioId,
    /// The customer the folio belongs to.
    pub customer_id: CustomerId,
    /// The folio's open balance.
    pub balance: Decimal,
    /// Whether the folio has already been settled.
    pub settled: bool,
}

/// Resolves a list of folio IDs into invoice folio rows.
///
/// Checks, per folio: it exists, belongs to the invoice's customer, is not
/// settled, and is not held by another non-cancelled invoice. Duplicates
/// within the request are rejected. The returned rows snapshot each folio's
/// balance in request order.
///
/// `holding_invoice` must report the non-cancelled invoice currently holding
/// a folio, excluding the invoice being edited.
///
/// # Errors
///
/// Returns `ReconcileError` if any folio fails an attachment rule.
pub fn resolve_folio_refs<L, H>(
    customer_id: CustomerId,
    folio_ids: &[FolioId],
    folio_lookup: L,
    holding_invoice: H,
) -> Result<Vec<FolioRef>, ReconcileError>
where
    L: Fn(FolioId) -> Result<FolioInfo, ReconcileError>,
    H: Fn(FolioId) -> Option<InvoiceId>,
{
    let mut seen = HashSet::with_capacity(folio_ids.len());
    let mut refs = Vec::with_capacity(folio_ids.len());

    for &folio_id in folio_ids {
        if !seen.insert(folio_id) {
            return Err(ReconcileError::DuplicateFolio(folio_id));
        }

        let info = folio_lookup(folio_id)?;
        if info.customer_id != customer_id {
            return Err(ReconcileError::FolioCustomerMismatch(folio_id));
        }
        if info.settled {
            return Err(ReconcileError::FolioSettled(folio_id));
        }
        if let Some(invoice) = holding_invoice(folio_id) {
            return Err(ReconcileError::FolioAlreadyInvoiced {
                folio: folio_id,
                invoice,
            });
        }

        refs.push(FolioRef {
            folio_id,
            amount: info.balance,
        });
    }

    Ok(refs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn make_info(id: FolioId, customer_id: CustomerId) -> FolioInfo {
        FolioInfo {
            id,
            customer_id,
            balance: dec!(250.00),
            settled: false,
        }
    }

    fn no_holder(_folio: FolioId) -> Option<InvoiceId> {
        None
    }

    #[test]
    fn test_resolves_in_request_order() {
        let customer = CustomerId::new();
        let first = FolioId::new();
        let second = FolioId::new();

        let lookup = |id: FolioId| -> Result<FolioInfo, ReconcileError> {
            let mut info = make_info(id, customer);
            if id == second {
                info.balance = dec!(75.50);
            }
            Ok(info)
        };

        let refs = resolve_folio_refs(customer, &[first, second], lookup, no_holder).unwrap();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].folio_id, first);
        assert_eq!(refs[0].amount, dec!(250.00));
        assert_eq!(refs[1].folio_id, second);
        assert_eq!(refs[1].amount, dec!(75.50));
    }

    #[test]
    fn test_empty_request_resolves_empty() {
        let customer = CustomerId::new();
        let lookup = |id: FolioId| Ok(make_info(id, customer));
        let refs = resolve_folio_refs(customer, &[], lookup, no_holder).unwrap();
        assert!(refs.is_empty());
    }

    #[test]
    fn test_duplicate_folio_rejected() {
        let customer = CustomerId::new();
        let folio = FolioId::new();
        let lookup = |id: FolioId| Ok(make_info(id, customer));

        let result = resolve_folio_refs(customer, &[folio, folio], lookup, no_holder);
        assert!(matches!(result, Err(ReconcileError::DuplicateFolio(f)) if f == folio));
    }

    #[test]
    fn test_missing_folio_rejected() {
        let customer = CustomerId::new();
        let folio = FolioId::new();
        let lookup = |id: FolioId| Err(ReconcileError::FolioNotFound(id));

        let result = resolve_folio_refs(customer, &[folio], lookup, no_holder);
        assert!(matches!(result, Err(ReconcileError::FolioNotFound(_))));
    }

    #[test]
    fn test_wrong_customer_rejected() {
        let customer = CustomerId::new();
        let folio = FolioId::new();
        let lookup = |id: FolioId| Ok(make_info(id, CustomerId::new()));

        let result = resolve_folio_refs(customer, &[folio], lookup, no_holder);
        assert!(matches!(
            result,
            Err(ReconcileError::FolioCustomerMismatch(_))
        ));
    }

    #[test]
    fn test_settled_folio_rejected() {
        let customer = CustomerId::new();
        let folio = FolioId::new();
        let lookup = |id: FolioId| {
            let mut info = make_info(id, customer);
            info.settled = true;
            Ok(info)
        };

        let result = resolve_folio_refs(customer, &[folio], lookup, no_holder);
        assert!(matches!(result, Err(ReconcileError::FolioSettled(_))));
    }

    #[test]
    fn test_held_folio_rejected() {
        let customer = CustomerId::new();
        let folio = FolioId::new();
        let holder = InvoiceId::new();
        let lookup = |id: FolioId| Ok(make_info(id, customer));

        let result =
            resolve_folio_refs(customer, &[folio], lookup, |_id: FolioId| Some(holder));
        assert!(matches!(
            result,
            Err(ReconcileError::FolioAlreadyInvoiced { invoice, .. }) if invoice == holder
        ));
    }
}
