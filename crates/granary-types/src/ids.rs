//! Type-safe identifier wrappers around `u64`.
//!
//! Contracts and events are numbered sequentially by the ledger and the log
//! that own them. Wrapping the counter keeps a contract number from being
//! passed where an event number is expected.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Generates a newtype wrapper around `u64` with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[serde(transparent)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub u64);

        impl $name {
            /// The first identifier handed out by a fresh counter.
            pub const FIRST: Self = Self(1);

            /// Return the raw counter value.
            pub const fn into_inner(self) -> u64 {
                self.0
            }

            /// Return the identifier that follows this one.
            pub const fn next(self) -> Self {
                Self(self.0.saturating_add(1))
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique, monotonically assigned identifier for a contract.
    ContractId
}

define_id! {
    /// Unique, monotonically assigned identifier for a narrative event.
    EventId
}
