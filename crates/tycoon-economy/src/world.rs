//! The in-memory game world.
//!
//! [`World`] holds every entity, the [`TimerRegistry`], and two pending
//! logs: action history and the money journal. Both logs accumulate
//! until the persistence layer drains them after a successful save.
//!
//! All mutation goes through [`World::atomically`]: the closure runs on a
//! scratch copy and the copy replaces the live world only if the closure
//! returns `Ok`. A failed action or tick therefore leaves no trace.
//!
//! Money is split into spendable and escrowed parts. `reserved_money` is
//! a subset of `money`; the journal treats `money - reserved_money` as
//! the [`Account::Player`] balance and `reserved_money` as the
//! [`Account::Escrow`] balance. Warehouse stock works the same way. The
//! [`Account::Pickup`] balance covers goods waiting at a mine or field and
//! goods on a truck.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use tycoon_ledger::{Ledger, TransferParams};
use tycoon_types::{
    Account, Asset, Company, CompanyId, EntryKind, Field, FieldId, HistoryAction, HistoryEntry,
    HistoryEntryId, MarketOrder, OrderId, Player, PlayerId, Region, RegionId, Resource,
    StockEntry, Vehicle, VehicleId, Warehouse, WarehouseId,
};

use crate::arith::{add, sub};
use crate::error::ActionError;
use crate::timers::TimerRegistry;

/// Balance of every journaled account, keyed the way the journal keys it.
pub type Balances = BTreeMap<(Account, Asset), Decimal>;

/// The complete game state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct World {
    /// Players by id.
    pub players: BTreeMap<PlayerId, Player>,
    /// Regions by id.
    pub regions: BTreeMap<RegionId, Region>,
    /// Companies by id.
    pub companies: BTreeMap<CompanyId, Company>,
    /// Warehouses by id, one per player.
    pub warehouses: BTreeMap<WarehouseId, Warehouse>,
    /// Vehicles by id.
    pub vehicles: BTreeMap<VehicleId, Vehicle>,
    /// Farm fields by id.
    pub fields: BTreeMap<FieldId, Field>,
    /// Market orders by id, including terminal ones.
    pub orders: BTreeMap<OrderId, MarketOrder>,
    /// Active timers.
    pub timers: TimerRegistry,
    /// History entries not yet persisted.
    pub history: Vec<HistoryEntry>,
    /// Journal entries not yet persisted.
    pub journal: Ledger,
}

impl World {
    /// Create an empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` against a scratch copy and keep the copy only on success.
    pub fn atomically<T, E>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, E>,
    ) -> Result<T, E> {
        let mut scratch = self.clone();
        let value = f(&mut scratch)?;
        *self = scratch;
        Ok(value)
    }

    /// Take the pending history and journal entries for persistence.
    pub fn drain_pending(&mut self) -> (Vec<HistoryEntry>, Vec<tycoon_types::LedgerEntry>) {
        (std::mem::take(&mut self.history), self.journal.drain())
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    /// A player by id.
    pub fn player(&self, id: PlayerId) -> Result<&Player, ActionError> {
        self.players
            .get(&id)
            .ok_or_else(|| ActionError::not_found("player", id))
    }

    /// Mutable player by id.
    pub fn player_mut(&mut self, id: PlayerId) -> Result<&mut Player, ActionError> {
        self.players
            .get_mut(&id)
            .ok_or_else(|| ActionError::not_found("player", id))
    }

    /// A region by id.
    pub fn region(&self, id: RegionId) -> Result<&Region, ActionError> {
        self.regions
            .get(&id)
            .ok_or_else(|| ActionError::not_found("region", id))
    }

    /// Mutable region by id.
    pub fn region_mut(&mut self, id: RegionId) -> Result<&mut Region, ActionError> {
        self.regions
            .get_mut(&id)
            .ok_or_else(|| ActionError::not_found("region", id))
    }

    /// A company by id.
    pub fn company(&self, id: CompanyId) -> Result<&Company, ActionError> {
        self.companies
            .get(&id)
            .ok_or_else(|| ActionError::not_found("company", id))
    }

    /// Mutable company by id.
    pub fn company_mut(&mut self, id: CompanyId) -> Result<&mut Company, ActionError> {
        self.companies
            .get_mut(&id)
            .ok_or_else(|| ActionError::not_found("company", id))
    }

    /// A field by id.
    pub fn field(&self, id: FieldId) -> Result<&Field, ActionError> {
        self.fields
            .get(&id)
            .ok_or_else(|| ActionError::not_found("field", id))
    }

    /// Mutable field by id.
    pub fn field_mut(&mut self, id: FieldId) -> Result<&mut Field, ActionError> {
        self.fields
            .get_mut(&id)
            .ok_or_else(|| ActionError::not_found("field", id))
    }

    /// A market order by id.
    pub fn order(&self, id: OrderId) -> Result<&MarketOrder, ActionError> {
        self.orders
            .get(&id)
            .ok_or_else(|| ActionError::not_found("order", id))
    }

    /// Mutable market order by id.
    pub fn order_mut(&mut self, id: OrderId) -> Result<&mut MarketOrder, ActionError> {
        self.orders
            .get_mut(&id)
            .ok_or_else(|| ActionError::not_found("order", id))
    }

    /// The player's warehouse.
    pub fn warehouse_of(&self, player: PlayerId) -> Result<&Warehouse, ActionError> {
        self.warehouses
            .values()
            .find(|w| w.player_id == player)
            .ok_or_else(|| ActionError::not_found("warehouse of player", player))
    }

    /// The player's warehouse, mutably.
    pub fn warehouse_of_mut(&mut self, player: PlayerId) -> Result<&mut Warehouse, ActionError> {
        self.warehouses
            .values_mut()
            .find(|w| w.player_id == player)
            .ok_or_else(|| ActionError::not_found("warehouse of player", player))
    }

    /// Vehicles parked at a warehouse.
    pub fn vehicles_of(&self, warehouse: WarehouseId) -> impl Iterator<Item = &Vehicle> {
        self.vehicles
            .values()
            .filter(move |v| v.warehouse_id == warehouse)
    }

    /// A vehicle by id.
    pub fn vehicle(&self, id: VehicleId) -> Result<&Vehicle, ActionError> {
        self.vehicles
            .get(&id)
            .ok_or_else(|| ActionError::not_found("vehicle", id))
    }

    /// The state-owned company producing `product` in `region`.
    pub fn state_company(&self, region: RegionId, product: Resource) -> Option<CompanyId> {
        self.companies
            .values()
            .find(|c| c.region_id == region && c.product == product && c.ownership.is_state_owned())
            .map(|c| c.id)
    }

    /// Number of private companies owned by `player`.
    pub fn companies_owned_by(&self, player: PlayerId) -> usize {
        self.companies
            .values()
            .filter(|c| c.ownership.owner() == Some(player))
            .count()
    }

    /// Find a player by username.
    pub fn player_by_username(&self, username: &str) -> Option<&Player> {
        self.players.values().find(|p| p.username == username)
    }

    /// Players whose residence is `region`.
    pub fn residents_of(&self, region: RegionId) -> impl Iterator<Item = &Player> {
        self.players
            .values()
            .filter(move |p| p.residence_region == region)
    }

    // -----------------------------------------------------------------------
    // History
    // -----------------------------------------------------------------------

    /// Append an immutable history entry.
    pub fn log(
        &mut self,
        player_id: PlayerId,
        action: HistoryAction,
        description: String,
        money_delta: Decimal,
        gold_delta: Decimal,
        at: DateTime<Utc>,
    ) {
        self.history.push(HistoryEntry {
            id: HistoryEntryId::new(),
            player_id,
            action,
            description,
            money_delta,
            gold_delta,
            at,
        });
    }

    // -----------------------------------------------------------------------
    // Money and gold
    // -----------------------------------------------------------------------

    /// Spendable money: balance minus escrow.
    pub fn available_money(&self, player: PlayerId) -> Result<Decimal, ActionError> {
        let p = self.player(player)?;
        sub(p.money, p.reserved_money)
    }

    /// Move money between two player, company or world accounts and
    /// journal the movement. A debit larger than the spendable balance is
    /// rejected.
    pub fn move_money(
        &mut self,
        at: DateTime<Utc>,
        kind: EntryKind,
        (from, to): (Account, Account),
        amount: Decimal,
        reason: &'static str,
    ) -> Result<(), ActionError> {
        if amount.is_zero() {
            return Ok(());
        }
        self.adjust_money(from, amount, false)?;
        self.adjust_money(to, amount, true)?;
        self.journal.record(TransferParams {
            at,
            kind,
            asset: Asset::Money,
            quantity: amount,
            from,
            to,
            reason,
        })?;
        Ok(())
    }

    fn adjust_money(
        &mut self,
        account: Account,
        amount: Decimal,
        credit: bool,
    ) -> Result<(), ActionError> {
        match account {
            Account::World => Ok(()),
            Account::Player(id) => {
                let player = self.player_mut(id)?;
                if credit {
                    player.money = add(player.money, amount)?;
                } else {
                    if sub(player.money, player.reserved_money)? < amount {
                        return Err(ActionError::rejected("insufficient money"));
                    }
                    player.money = sub(player.money, amount)?;
                }
                Ok(())
            }
            Account::Company(id) => {
                let company = self.company_mut(id)?;
                if credit {
                    company.cash = add(company.cash, amount)?;
                } else {
                    if company.cash < amount {
                        return Err(ActionError::rejected("insufficient company cash"));
                    }
                    company.cash = sub(company.cash, amount)?;
                }
                Ok(())
            }
            Account::Escrow(_) | Account::Warehouse(_) | Account::Pickup(_) => Err(
                ActionError::internal(format!("money cannot move through {account:?}")),
            ),
        }
    }

    /// Move gold between a player and the world, journaled.
    pub fn move_gold(
        &mut self,
        at: DateTime<Utc>,
        kind: EntryKind,
        (from, to): (Account, Account),
        amount: Decimal,
        reason: &'static str,
    ) -> Result<(), ActionError> {
        if amount.is_zero() {
            return Ok(());
        }
        for (account, credit) in [(from, false), (to, true)] {
            match account {
                Account::World => {}
                Account::Player(id) => {
                    let player = self.player_mut(id)?;
                    if credit {
                        player.gold = add(player.gold, amount)?;
                    } else {
                        if player.gold < amount {
                            return Err(ActionError::rejected("insufficient gold"));
                        }
                        player.gold = sub(player.gold, amount)?;
                    }
                }
                other => {
                    return Err(ActionError::internal(format!(
                        "gold cannot move through {other:?}"
                    )));
                }
            }
        }
        self.journal.record(TransferParams {
            at,
            kind,
            asset: Asset::Gold,
            quantity: amount,
            from,
            to,
            reason,
        })?;
        Ok(())
    }

    /// Lock spendable money into the player's escrow.
    pub fn lock_money(
        &mut self,
        at: DateTime<Utc>,
        player: PlayerId,
        amount: Decimal,
        reason: &'static str,
    ) -> Result<(), ActionError> {
        if self.available_money(player)? < amount {
            return Err(ActionError::rejected("insufficient available money"));
        }
        let p = self.player_mut(player)?;
        p.reserved_money = add(p.reserved_money, amount)?;
        self.journal.record(TransferParams {
            at,
            kind: EntryKind::EscrowLock,
            asset: Asset::Money,
            quantity: amount,
            from: Account::Player(player),
            to: Account::Escrow(player),
            reason,
        })?;
        Ok(())
    }

    /// Release up to `amount` of escrowed money back to spendable money.
    ///
    /// Returns the amount actually released.
    pub fn release_money(
        &mut self,
        at: DateTime<Utc>,
        player: PlayerId,
        amount: Decimal,
        reason: &'static str,
    ) -> Result<Decimal, ActionError> {
        let p = self.player_mut(player)?;
        let released = amount.min(p.reserved_money).max(Decimal::ZERO);
        p.reserved_money = sub(p.reserved_money, released)?;
        self.journal.record(TransferParams {
            at,
            kind: EntryKind::EscrowRelease,
            asset: Asset::Money,
            quantity: released,
            from: Account::Escrow(player),
            to: Account::Player(player),
            reason,
        })?;
        Ok(released)
    }

    // -----------------------------------------------------------------------
    // Warehouse stock
    // -----------------------------------------------------------------------

    /// On-hand minus reserved stock of `resource` in the player's warehouse.
    pub fn available_stock(
        &self,
        player: PlayerId,
        resource: Resource,
    ) -> Result<Decimal, ActionError> {
        let entry = self
            .warehouse_of(player)?
            .stock
            .get(&resource)
            .copied()
            .unwrap_or_default();
        sub(entry.quantity, entry.reserved)
    }

    /// Mutable stock row for `resource`, created empty if absent.
    pub fn stock_mut(
        &mut self,
        warehouse: WarehouseId,
        resource: Resource,
    ) -> Result<&mut StockEntry, ActionError> {
        let wh = self
            .warehouses
            .get_mut(&warehouse)
            .ok_or_else(|| ActionError::not_found("warehouse", warehouse))?;
        Ok(wh.stock.entry(resource).or_default())
    }

    // -----------------------------------------------------------------------
    // Balances
    // -----------------------------------------------------------------------

    /// Snapshot of every account balance the journal tracks.
    pub fn balances(&self) -> Result<Balances, ActionError> {
        let mut out = Balances::new();
        for p in self.players.values() {
            out.insert(
                (Account::Player(p.id), Asset::Money),
                sub(p.money, p.reserved_money)?,
            );
            out.insert((Account::Escrow(p.id), Asset::Money), p.reserved_money);
            out.insert((Account::Player(p.id), Asset::Gold), p.gold);
        }
        for c in self.companies.values() {
            out.insert((Account::Company(c.id), Asset::Money), c.cash);
        }
        for w in self.warehouses.values() {
            for (resource, entry) in &w.stock {
                let asset = Asset::Goods(*resource);
                out.insert(
                    (Account::Warehouse(w.id), asset),
                    sub(entry.quantity, entry.reserved)?,
                );
                let escrow = out
                    .entry((Account::Escrow(w.player_id), asset))
                    .or_insert(Decimal::ZERO);
                *escrow = add(*escrow, entry.reserved)?;
            }
        }
        for pickup in self.timers.pickups() {
            let slot = out
                .entry((
                    Account::Pickup(pickup.player_id),
                    Asset::Goods(pickup.resource),
                ))
                .or_insert(Decimal::ZERO);
            *slot = add(*slot, pickup.quantity)?;
        }
        // Cargo on the road still belongs to the pickup account until the
        // tick delivers it.
        for transport in self.timers.transports() {
            let slot = out
                .entry((
                    Account::Pickup(transport.player_id),
                    Asset::Goods(transport.resource),
                ))
                .or_insert(Decimal::ZERO);
            *slot = add(*slot, transport.quantity)?;
        }
        Ok(out)
    }
}

/// Per-account change between two balance snapshots.
pub fn balance_deltas(before: &Balances, after: &Balances) -> Result<Balances, ActionError> {
    let mut out = Balances::new();
    for key in before.keys().chain(after.keys()) {
        let old = before.get(key).copied().unwrap_or(Decimal::ZERO);
        let new = after.get(key).copied().unwrap_or(Decimal::ZERO);
        let delta = sub(new, old)?;
        if !delta.is_zero() {
            out.insert(*key, delta);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use crate::testing::{add_player, add_region};

    use super::*;

    #[test]
    fn atomically_discards_failed_changes() {
        let mut world = World::new();
        let region = add_region(&mut world, "Belo Horizonte");
        let player = add_player(&mut world, "ana", region);

        let result: Result<(), ActionError> = world.atomically(|w| {
            w.player_mut(player)?.money = dec!(0);
            Err(ActionError::rejected("boom"))
        });
        assert!(result.is_err());
        assert_eq!(world.player(player).map(|p| p.money).ok(), Some(dec!(1000)));
    }

    #[test]
    fn escrowed_money_is_not_spendable() {
        let mut world = World::new();
        let region = add_region(&mut world, "Belo Horizonte");
        let player = add_player(&mut world, "ana", region);
        let now = Utc::now();

        assert!(world.lock_money(now, player, dec!(800), "test").is_ok());
        let spend = world.move_money(
            now,
            EntryKind::Purchase,
            (Account::Player(player), Account::World),
            dec!(300),
            "test",
        );
        assert!(matches!(spend, Err(ActionError::Rejected { .. })));
        assert_eq!(world.available_money(player).ok(), Some(dec!(200)));
    }

    #[test]
    fn release_clamps_at_reserved() {
        let mut world = World::new();
        let region = add_region(&mut world, "Belo Horizonte");
        let player = add_player(&mut world, "ana", region);
        let now = Utc::now();

        assert!(world.lock_money(now, player, dec!(100), "test").is_ok());
        let released = world.release_money(now, player, dec!(150), "test");
        assert_eq!(released.ok(), Some(dec!(100)));
        assert_eq!(world.player(player).map(|p| p.reserved_money).ok(), Some(dec!(0)));
    }

    #[test]
    fn balance_deltas_skip_unchanged_accounts() {
        let mut before = Balances::new();
        let p = PlayerId::new();
        before.insert((Account::Player(p), Asset::Money), dec!(10));
        before.insert((Account::Player(p), Asset::Gold), dec!(1));
        let mut after = before.clone();
        after.insert((Account::Player(p), Asset::Money), dec!(4));

        let deltas = balance_deltas(&before, &after).unwrap_or_default();
        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas.get(&(Account::Player(p), Asset::Money)), Some(&dec!(-6)));
    }
}
