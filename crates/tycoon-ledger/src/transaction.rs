//! Transaction builder and validation for journal entries.
//!
//! A [`TransactionBuilder`] enforces the double-entry invariant: every
//! movement names a debited and a credited account, a strictly positive
//! quantity, and account kinds that make sense for its [`EntryKind`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use tycoon_types::{Account, Asset, EntryKind, LedgerEntry, LedgerEntryId};

use crate::LedgerError;

/// Builder for constructing validated [`LedgerEntry`] values.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use rust_decimal::Decimal;
/// use tycoon_ledger::TransactionBuilder;
/// use tycoon_types::{Account, Asset, EntryKind, PlayerId};
///
/// let entry = TransactionBuilder::new(EntryKind::Yield, Asset::Money, Utc::now())
///     .from(Account::World)
///     .to(Account::Player(PlayerId::new()))
///     .quantity(Decimal::new(250, 0))
///     .reason("MINING")
///     .build();
///
/// assert!(entry.is_ok());
/// ```
#[derive(Debug)]
pub struct TransactionBuilder {
    kind: EntryKind,
    asset: Asset,
    at: DateTime<Utc>,
    from: Option<Account>,
    to: Option<Account>,
    quantity: Option<Decimal>,
    reason: Option<String>,
}

impl TransactionBuilder {
    /// Start building an entry of the given kind and asset.
    pub const fn new(kind: EntryKind, asset: Asset, at: DateTime<Utc>) -> Self {
        Self {
            kind,
            asset,
            at,
            from: None,
            to: None,
            quantity: None,
            reason: None,
        }
    }

    /// Set the debited account.
    #[must_use]
    pub const fn from(mut self, account: Account) -> Self {
        self.from = Some(account);
        self
    }

    /// Set the credited account.
    #[must_use]
    pub const fn to(mut self, account: Account) -> Self {
        self.to = Some(account);
        self
    }

    /// Set the quantity moved.
    #[must_use]
    pub const fn quantity(mut self, qty: Decimal) -> Self {
        self.quantity = Some(qty);
        self
    }

    /// Set the short reason code.
    #[must_use]
    pub fn reason(mut self, reason: &str) -> Self {
        self.reason = Some(reason.to_owned());
        self
    }

    /// Validate inputs and produce a [`LedgerEntry`].
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ZeroQuantity`] or [`LedgerError::NegativeQuantity`]
    /// for a non-positive quantity, [`LedgerError::MissingField`] when an
    /// account or quantity is missing, [`LedgerError::SelfTransfer`] when both
    /// sides are the same account, and [`LedgerError::InvalidAccounts`] when
    /// the accounts do not fit the entry kind.
    pub fn build(self) -> Result<LedgerEntry, LedgerError> {
        let quantity = self.quantity.ok_or(LedgerError::MissingField("quantity"))?;
        if quantity.is_zero() {
            return Err(LedgerError::ZeroQuantity);
        }
        if quantity.is_sign_negative() {
            return Err(LedgerError::NegativeQuantity { quantity });
        }

        let from = self.from.ok_or(LedgerError::MissingField("from"))?;
        let to = self.to.ok_or(LedgerError::MissingField("to"))?;

        if from == to {
            return Err(LedgerError::SelfTransfer {
                account: from,
                asset: self.asset,
            });
        }

        if !accounts_fit(self.kind, from, to) {
            return Err(LedgerError::InvalidAccounts {
                kind: self.kind,
                from,
                to,
            });
        }

        Ok(LedgerEntry {
            id: LedgerEntryId::new(),
            kind: self.kind,
            asset: self.asset,
            quantity,
            from,
            to,
            reason: self.reason.unwrap_or_default(),
            at: self.at,
        })
    }
}

/// Check that the accounts on each side are legal for the entry kind.
fn accounts_fit(kind: EntryKind, from: Account, to: Account) -> bool {
    match kind {
        EntryKind::Yield => from == Account::World,
        EntryKind::Decay => to == Account::World,
        EntryKind::EscrowLock => match (from, to) {
            (Account::Player(a), Account::Escrow(b)) => a == b,
            (Account::Warehouse(_), Account::Escrow(_)) => true,
            _ => false,
        },
        EntryKind::EscrowRelease => match (from, to) {
            (Account::Escrow(a), Account::Player(b)) => a == b,
            (Account::Escrow(_), Account::Warehouse(_)) => true,
            _ => false,
        },
        EntryKind::Tax
        | EntryKind::Profit
        | EntryKind::Purchase
        | EntryKind::Fare
        | EntryKind::Freight
        | EntryKind::Settlement
        | EntryKind::Delivery => true,
    }
}

#[cfg(test)]
mod tests {
    use tycoon_types::{CompanyId, PlayerId};

    use super::*;

    fn builder(kind: EntryKind) -> TransactionBuilder {
        TransactionBuilder::new(kind, Asset::Money, Utc::now()).quantity(Decimal::TEN)
    }

    #[test]
    fn yield_must_come_from_world() {
        let player = Account::Player(PlayerId::new());
        let ok = builder(EntryKind::Yield).from(Account::World).to(player).build();
        assert!(ok.is_ok());

        let company = Account::Company(CompanyId::new());
        let bad = builder(EntryKind::Yield).from(company).to(player).build();
        assert!(matches!(bad, Err(LedgerError::InvalidAccounts { .. })));
    }

    #[test]
    fn escrow_lock_requires_same_player() {
        let p = PlayerId::new();
        let ok = builder(EntryKind::EscrowLock)
            .from(Account::Player(p))
            .to(Account::Escrow(p))
            .build();
        assert!(ok.is_ok());

        let bad = builder(EntryKind::EscrowLock)
            .from(Account::Player(p))
            .to(Account::Escrow(PlayerId::new()))
            .build();
        assert!(matches!(bad, Err(LedgerError::InvalidAccounts { .. })));
    }

    #[test]
    fn rejects_zero_negative_and_self_transfer() {
        let p = Account::Player(PlayerId::new());
        let zero = TransactionBuilder::new(EntryKind::Fare, Asset::Money, Utc::now())
            .from(p)
            .to(Account::World)
            .quantity(Decimal::ZERO)
            .build();
        assert!(matches!(zero, Err(LedgerError::ZeroQuantity)));

        let negative = TransactionBuilder::new(EntryKind::Fare, Asset::Money, Utc::now())
            .from(p)
            .to(Account::World)
            .quantity(Decimal::NEGATIVE_ONE)
            .build();
        assert!(matches!(negative, Err(LedgerError::NegativeQuantity { .. })));

        let looped = builder(EntryKind::Settlement).from(p).to(p).build();
        assert!(matches!(looped, Err(LedgerError::SelfTransfer { .. })));
    }

    #[test]
    fn missing_accounts_are_reported() {
        let result = builder(EntryKind::Fare).build();
        assert!(matches!(result, Err(LedgerError::MissingField("from"))));
    }
}
