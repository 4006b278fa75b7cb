//! Double-entry journal of every balance movement in the Tycoon economy.
//!
//! Money, gold and goods are never created or destroyed silently. Mining
//! yields and harvests are credited from [`Account::World`]; expired goods
//! and scrapped value are debited back to it. Every other movement is an
//! internal transfer between two accounts (player wallet, escrow, company
//! cash, warehouse, pickup point).
//!
//! # Modules
//!
//! - [`ledger`] -- The [`Ledger`] struct: append-only journal with recording helpers.
//! - [`transaction`] -- The [`TransactionBuilder`] for validated entry construction.
//! - [`conservation`] -- Reconciliation of journal flows against observed balances.
//!
//! # Entry kinds and account pairs
//!
//! | Kind | From (debit) | To (credit) |
//! |------|-------------|-------------|
//! | Yield | World | any |
//! | Decay | any | World |
//! | `EscrowLock` | Player(p) or a warehouse | Escrow(p) |
//! | `EscrowRelease` | Escrow(p) | Player(p) or a warehouse |
//! | everything else | any | any other account |
//!
//! [`Account::World`]: tycoon_types::Account::World

pub mod conservation;
pub mod ledger;
pub mod transaction;

pub use conservation::{ConservationResult, reconcile};
pub use ledger::{Ledger, TransferParams};
pub use transaction::TransactionBuilder;

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use tycoon_types::{Account, Asset, EntryKind};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when recording journal entries.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Quantity must be strictly positive.
    #[error("journal entry quantity must be non-zero")]
    ZeroQuantity,

    /// Quantity must not be negative.
    #[error("journal entry quantity must be positive, got {quantity}")]
    NegativeQuantity {
        /// The invalid quantity.
        quantity: Decimal,
    },

    /// A required field was not set on the builder.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Debit and credit accounts are the same.
    #[error("journal entry moves {asset:?} from {account:?} to itself")]
    SelfTransfer {
        /// The account on both sides.
        account: Account,
        /// The asset being moved.
        asset: Asset,
    },

    /// The accounts do not fit the entry kind.
    #[error("invalid accounts for {kind:?}: {from:?} -> {to:?}")]
    InvalidAccounts {
        /// The entry kind being validated.
        kind: EntryKind,
        /// Debited account.
        from: Account,
        /// Credited account.
        to: Account,
    },

    /// Summing journal flows overflowed.
    #[error("journal arithmetic overflow while summing {0:?}")]
    Overflow(Asset),

    /// An internal error that should not occur in normal operation.
    #[error("internal ledger error: {0}")]
    InternalError(&'static str),
}

// ---------------------------------------------------------------------------
// Anomaly type
// ---------------------------------------------------------------------------

/// A mismatch between journaled flows and observed balance changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerAnomaly {
    /// Per account and asset: (journaled net flow, observed delta).
    pub mismatches: BTreeMap<(Account, Asset), (Decimal, Decimal)>,
    /// Human-readable description of the anomaly.
    pub message: String,
}

impl core::fmt::Display for LedgerAnomaly {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.message)
    }
}
