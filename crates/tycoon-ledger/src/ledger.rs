//! The journal: an append-only log of balance movements.
//!
//! The [`Ledger`] lives inside the game world and collects entries as
//! actions and tick phases run. The persistence layer drains it after
//! each successful commit, so at any time it only holds entries that
//! have not been written to storage yet.
//!
//! # Design
//!
//! - **Append-only**: entries are never modified.
//! - **Double-entry**: every movement has a debit and a credit account.
//! - **Precision**: all quantities use [`Decimal`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use tycoon_types::{Account, Asset, EntryKind, LedgerEntry};

use crate::{LedgerError, TransactionBuilder};

// ---------------------------------------------------------------------------
// Transfer parameters
// ---------------------------------------------------------------------------

/// Parameters for recording a general journal transfer.
pub struct TransferParams {
    /// When the movement happened.
    pub at: DateTime<Utc>,
    /// Category of the movement.
    pub kind: EntryKind,
    /// What moved.
    pub asset: Asset,
    /// Quantity moved.
    pub quantity: Decimal,
    /// Debited account.
    pub from: Account,
    /// Credited account.
    pub to: Account,
    /// Short reason code.
    pub reason: &'static str,
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Append-only journal of balance movements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    /// Entries in insertion order.
    entries: Vec<LedgerEntry>,
}

impl Ledger {
    /// Create an empty journal.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Number of entries not yet drained.
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the journal holds no entries.
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All pending entries in insertion order.
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Remove and return all pending entries.
    pub fn drain(&mut self) -> Vec<LedgerEntry> {
        std::mem::take(&mut self.entries)
    }

    /// Record a movement between two accounts.
    ///
    /// A zero quantity is silently skipped: many formulas legitimately
    /// produce nothing (a zero tax rate, a fully discounted fee) and those
    /// are not movements.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the entry fails validation.
    pub fn record(&mut self, params: TransferParams) -> Result<(), LedgerError> {
        if params.quantity.is_zero() {
            return Ok(());
        }
        let entry = TransactionBuilder::new(params.kind, params.asset, params.at)
            .from(params.from)
            .to(params.to)
            .quantity(params.quantity)
            .reason(params.reason)
            .build()?;
        self.entries.push(entry);
        Ok(())
    }

    /// Record value created from the world into `to`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the entry fails validation.
    pub fn record_yield(
        &mut self,
        at: DateTime<Utc>,
        asset: Asset,
        quantity: Decimal,
        to: Account,
        reason: &'static str,
    ) -> Result<(), LedgerError> {
        self.record(TransferParams {
            at,
            kind: EntryKind::Yield,
            asset,
            quantity,
            from: Account::World,
            to,
            reason,
        })
    }

    /// Record value destroyed from `from` back into the world.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the entry fails validation.
    pub fn record_decay(
        &mut self,
        at: DateTime<Utc>,
        asset: Asset,
        quantity: Decimal,
        from: Account,
        reason: &'static str,
    ) -> Result<(), LedgerError> {
        self.record(TransferParams {
            at,
            kind: EntryKind::Decay,
            asset,
            quantity,
            from,
            to: Account::World,
            reason,
        })
    }

    /// Net flow into `account` for `asset`: credits minus debits.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Overflow`] if the sum overflows.
    pub fn net_flow(&self, account: Account, asset: Asset) -> Result<Decimal, LedgerError> {
        self.entries
            .iter()
            .filter(|e| e.asset == asset)
            .try_fold(Decimal::ZERO, |acc, e| {
                let next = if e.to == account {
                    acc.checked_add(e.quantity)
                } else if e.from == account {
                    acc.checked_sub(e.quantity)
                } else {
                    Some(acc)
                };
                next.ok_or(LedgerError::Overflow(asset))
            })
    }

    /// Net flow for every (account, asset) pair touched by the journal.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Overflow`] if any sum overflows.
    pub fn net_flows(&self) -> Result<BTreeMap<(Account, Asset), Decimal>, LedgerError> {
        net_flows(&self.entries)
    }

    /// Total quantity recorded with the given kind and asset.
    pub fn total_of(&self, kind: EntryKind, asset: Asset) -> Decimal {
        self.entries
            .iter()
            .filter(|e| e.kind == kind && e.asset == asset)
            .fold(Decimal::ZERO, |acc, e| acc.saturating_add(e.quantity))
    }
}

/// Net flow for every (account, asset) pair in `entries`.
///
/// # Errors
///
/// Returns [`LedgerError::Overflow`] if any sum overflows.
pub fn net_flows(
    entries: &[LedgerEntry],
) -> Result<BTreeMap<(Account, Asset), Decimal>, LedgerError> {
    let mut flows: BTreeMap<(Account, Asset), Decimal> = BTreeMap::new();
    for entry in entries {
        let credit = flows.entry((entry.to, entry.asset)).or_insert(Decimal::ZERO);
        *credit = credit
            .checked_add(entry.quantity)
            .ok_or(LedgerError::Overflow(entry.asset))?;
        let debit = flows
            .entry((entry.from, entry.asset))
            .or_insert(Decimal::ZERO);
        *debit = debit
            .checked_sub(entry.quantity)
            .ok_or(LedgerError::Overflow(entry.asset))?;
    }
    Ok(flows)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use tycoon_types::{CompanyId, PlayerId, Resource};

    use super::*;

    #[test]
    fn zero_quantity_is_skipped() {
        let mut ledger = Ledger::new();
        let result = ledger.record_yield(
            Utc::now(),
            Asset::Money,
            Decimal::ZERO,
            Account::Player(PlayerId::new()),
            "MINING",
        );
        assert!(result.is_ok());
        assert!(ledger.is_empty());
    }

    #[test]
    fn net_flow_tracks_both_sides() {
        let mut ledger = Ledger::new();
        let player = Account::Player(PlayerId::new());
        let company = Account::Company(CompanyId::new());
        let now = Utc::now();

        assert!(ledger.record_yield(now, Asset::Money, dec!(1000), player, "MINING").is_ok());
        assert!(
            ledger
                .record(TransferParams {
                    at: now,
                    kind: EntryKind::Tax,
                    asset: Asset::Money,
                    quantity: dec!(50),
                    from: player,
                    to: company,
                    reason: "TAX",
                })
                .is_ok()
        );

        assert_eq!(ledger.net_flow(player, Asset::Money).ok(), Some(dec!(950)));
        assert_eq!(ledger.net_flow(company, Asset::Money).ok(), Some(dec!(50)));
        assert_eq!(ledger.net_flow(Account::World, Asset::Money).ok(), Some(dec!(-1000)));
        assert_eq!(ledger.net_flow(player, Asset::Gold).ok(), Some(Decimal::ZERO));
        assert_eq!(ledger.total_of(EntryKind::Tax, Asset::Money), dec!(50));
    }

    #[test]
    fn drain_empties_the_journal() {
        let mut ledger = Ledger::new();
        let pickup = Account::Pickup(PlayerId::new());
        let goods = Asset::Goods(Resource::Iron);
        assert!(ledger.record_yield(Utc::now(), goods, dec!(15), pickup, "MINING").is_ok());
        assert!(ledger.record_decay(Utc::now(), goods, dec!(15), pickup, "EXPIRED").is_ok());

        let drained = ledger.drain();
        assert_eq!(drained.len(), 2);
        assert!(ledger.is_empty());
        let flows = net_flows(&drained).unwrap_or_default();
        assert_eq!(flows.get(&(pickup, goods)).copied(), Some(Decimal::ZERO));
    }
}
