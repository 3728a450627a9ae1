//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `FolioId` where an
//! `InvoiceId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(CustomerId, "Unique identifier for a corporate customer.");
typed_id!(FolioId, "Unique identifier for a guest folio.");
typed_id!(InvoiceId, "Unique identifier for a city ledger invoice.");
typed_id!(
    InvoicePaymentId,
    "Unique identifier for a direct payment row on an invoice."
);
typed_id!(
    AllocationId,
    "Unique identifier for a payment entry allocation row."
);
typed_id!(
    InvoiceDiscountId,
    "Unique identifier for a discount row on an invoice."
);
typed_id!(PaymentEntryId, "Unique identifier for a payment entry voucher.");
typed_id!(JournalEntryId, "Unique identifier for a journal entry voucher.");
typed_id!(JournalLineId, "Unique identifier for a journal entry line.");
typed_id!(
    AccountId,
    "Unique identifier for a chart of accounts entry."
);
typed_id!(PaymentModeId, "Unique identifier for a mode of payment.");
