//! Error types for game actions.
//!
//! [`ActionError`] follows the three failure classes a player can see:
//! a business-rule rejection, a conflict with an existing exclusive timer,
//! and an unexpected failure. Handlers never leave partial state behind;
//! the caller discards the scratch world on any error.

use tycoon_ledger::LedgerError;

/// Errors produced by action handlers and market operations.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    /// A precondition was not met (funds, energy, level, target).
    #[error("{reason}")]
    Rejected {
        /// Message shown to the player.
        reason: String,
    },

    /// The action would create a second exclusive record.
    #[error("conflict: {reason}")]
    Conflict {
        /// Message shown to the player.
        reason: String,
    },

    /// A referenced entity does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity kind, e.g. `"player"`.
        entity: &'static str,
        /// The missing identifier.
        id: String,
    },

    /// Decimal or integer arithmetic overflowed.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// The operation that overflowed.
        context: &'static str,
    },

    /// A journal entry was rejected.
    #[error("journal error: {0}")]
    Journal(#[from] LedgerError),

    /// World state violated an internal invariant.
    #[error("internal error: {message}")]
    Internal {
        /// What went wrong.
        message: String,
    },
}

impl ActionError {
    /// Build a [`ActionError::Rejected`] from any message.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }

    /// Build a [`ActionError::Conflict`] from any message.
    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict {
            reason: reason.into(),
        }
    }

    /// Build a [`ActionError::NotFound`] for an entity id.
    pub fn not_found(entity: &'static str, id: impl core::fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Build a [`ActionError::Internal`] from any message.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this is a business-rule rejection the player caused.
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    /// Whether this is an exclusivity conflict.
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
