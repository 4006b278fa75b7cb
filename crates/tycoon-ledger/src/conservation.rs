//! Reconciliation of journaled flows against observed balance changes.
//!
//! Every handler and tick phase journals what it moves. Reconciliation
//! takes a before/after diff of real balances and checks that each
//! account changed by exactly its journaled net flow, so no value was
//! created or destroyed outside the journal.
//!
//! Accounts that appear only on one side are compared against zero.
//! [`Account::World`] is excluded: it has no observable balance.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;

use tycoon_types::{Account, Asset, LedgerEntry};

use crate::LedgerAnomaly;
use crate::ledger::net_flows;

/// Result of a reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConservationResult {
    /// Every observed delta matches the journal.
    Balanced,
    /// One or more accounts moved without a matching journal flow.
    Anomaly(LedgerAnomaly),
}

impl ConservationResult {
    /// Whether the reconciliation passed.
    pub const fn is_balanced(&self) -> bool {
        matches!(self, Self::Balanced)
    }
}

/// Compare journal flows in `entries` with `observed` balance deltas.
pub fn reconcile(
    entries: &[LedgerEntry],
    observed: &BTreeMap<(Account, Asset), Decimal>,
) -> ConservationResult {
    let journaled = match net_flows(entries) {
        Ok(flows) => flows,
        Err(e) => {
            return ConservationResult::Anomaly(LedgerAnomaly {
                mismatches: BTreeMap::new(),
                message: format!("LEDGER_ANOMALY: {e}"),
            });
        }
    };

    let keys: BTreeSet<(Account, Asset)> = journaled
        .keys()
        .chain(observed.keys())
        .filter(|(account, _)| *account != Account::World)
        .copied()
        .collect();

    let mut mismatches = BTreeMap::new();
    for key in keys {
        let expected = journaled.get(&key).copied().unwrap_or(Decimal::ZERO);
        let actual = observed.get(&key).copied().unwrap_or(Decimal::ZERO);
        if expected != actual {
            mismatches.insert(key, (expected, actual));
        }
    }

    if mismatches.is_empty() {
        ConservationResult::Balanced
    } else {
        let count = mismatches.len();
        tracing::warn!(count, "journal reconciliation found unexplained balance changes");
        ConservationResult::Anomaly(LedgerAnomaly {
            mismatches,
            message: format!("LEDGER_ANOMALY: {count} account balance(s) changed off-journal"),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use tycoon_types::{EntryKind, PlayerId};

    use super::*;
    use crate::{Ledger, TransferParams};

    #[test]
    fn matching_deltas_balance() {
        let mut ledger = Ledger::new();
        let player = Account::Player(PlayerId::new());
        assert!(
            ledger
                .record(TransferParams {
                    at: Utc::now(),
                    kind: EntryKind::Fare,
                    asset: Asset::Money,
                    quantity: dec!(120.50),
                    from: player,
                    to: Account::World,
                    reason: "TRAVEL",
                })
                .is_ok()
        );

        let mut observed = BTreeMap::new();
        observed.insert((player, Asset::Money), dec!(-120.50));
        assert!(reconcile(ledger.entries(), &observed).is_balanced());
    }

    #[test]
    fn off_journal_change_is_an_anomaly() {
        let ledger = Ledger::new();
        let player = Account::Player(PlayerId::new());
        let mut observed = BTreeMap::new();
        observed.insert((player, Asset::Gold), dec!(3));

        let result = reconcile(ledger.entries(), &observed);
        assert!(!result.is_balanced());
        if let ConservationResult::Anomaly(anomaly) = result {
            assert_eq!(
                anomaly.mismatches.get(&(player, Asset::Gold)),
                Some(&(Decimal::ZERO, dec!(3)))
            );
        }
    }
}
