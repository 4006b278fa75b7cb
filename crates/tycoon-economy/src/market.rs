//! Escrow-backed player market.
//!
//! A SELL order reserves warehouse stock. A BUY order reserves the full
//! price plus the creator's tax. Tax is always the creator's: the order
//! region's rate discounted by the creator's philanthropy. Market tax
//! leaves the economy.
//!
//! Filled goods never go straight to a warehouse. They wait as a pickup
//! that the receiver must haul home:
//!
//! | Order | Receiver | Pickup region |
//! |-------|----------|---------------|
//! | SELL  | taker    | order region  |
//! | BUY   | creator  | taker's current region |
//!
//! On a BUY fill the creator pays only the tax out of pocket. The principal
//! is released from escrow and the taker is paid from outside the economy.
//! The journal records that as a `Settlement` from [`Account::World`].
//!
//! The creator's effective tax rate is fixed on the order when it is
//! placed. Regional tax moves with every index recompute, so escrow is
//! always locked, released and charged at the stored rate; releasing at
//! today's rate would eat into the escrow of the creator's other orders.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use tycoon_ledger::TransferParams;
use tycoon_types::{
    Account, Asset, EntryKind, HistoryAction, MarketOrder, OrderId, OrderSide, OrderStatus,
    PickupKey, PlayerId, RegionId, Resource,
};

use crate::actions::ActionOutcome;
use crate::arith::{add, after_hours, after_minutes, mul, negate, sub};
use crate::config::EconomyConfig;
use crate::error::ActionError;
use crate::progression::effective_tax_rate;
use crate::world::World;

/// Order book query. `None` fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFilter {
    /// Only this resource.
    pub resource: Option<Resource>,
    /// Only this side.
    pub side: Option<OrderSide>,
    /// Only this status.
    pub status: Option<OrderStatus>,
}

/// Orders matching `filter`, cheapest first.
pub fn order_book<'w>(world: &'w World, filter: OrderFilter) -> Vec<&'w MarketOrder> {
    let mut orders: Vec<&MarketOrder> = world
        .orders
        .values()
        .filter(|o| filter.resource.is_none_or(|r| o.resource == r))
        .filter(|o| filter.side.is_none_or(|s| o.side == s))
        .filter(|o| filter.status.is_none_or(|s| o.status == s))
        .collect();
    orders.sort_by(|a, b| a.price.cmp(&b.price).then(a.created_at.cmp(&b.created_at)));
    orders
}

/// Tax rate `creator` pays on orders placed in `region` right now.
pub fn creator_tax_rate(
    world: &World,
    creator: PlayerId,
    region: RegionId,
    config: &EconomyConfig,
) -> Result<Decimal, ActionError> {
    effective_tax_rate(
        world.player(creator)?,
        world.region(region)?.tax_rate,
        &config.skills,
    )
}

/// Tax owed on `quantity` units of `order`, at the order's stored rate.
pub fn order_tax(order: &MarketOrder, quantity: Decimal) -> Result<Decimal, ActionError> {
    mul(mul(quantity, order.price)?, order.tax_rate)
}

/// Money escrowed for `quantity` units of a BUY order: price plus tax.
pub fn buy_escrow(order: &MarketOrder, quantity: Decimal) -> Result<Decimal, ActionError> {
    add(mul(quantity, order.price)?, order_tax(order, quantity)?)
}

/// Money a player's active BUY orders still hold in escrow.
pub fn escrowed_money(world: &World, player: PlayerId) -> Result<Decimal, ActionError> {
    world
        .orders
        .values()
        .filter(|o| o.creator == player && o.side == OrderSide::Buy)
        .filter(|o| o.status == OrderStatus::Active)
        .try_fold(Decimal::ZERO, |sum, o| add(sum, buy_escrow(o, o.remaining)?))
}

fn check_terms(quantity: Decimal, price: Decimal) -> Result<(), ActionError> {
    if quantity <= Decimal::ZERO || price <= Decimal::ZERO {
        return Err(ActionError::rejected(
            "quantity and price must be positive",
        ));
    }
    Ok(())
}

fn open_order(
    world: &mut World,
    creator: PlayerId,
    side: OrderSide,
    resource: Resource,
    (quantity, price, tax_rate): (Decimal, Decimal, Decimal),
    now: DateTime<Utc>,
    config: &EconomyConfig,
) -> Result<OrderId, ActionError> {
    let region_id = world.player(creator)?.current_region;
    let id = OrderId::new();
    world.orders.insert(
        id,
        MarketOrder {
            id,
            creator,
            region_id,
            side,
            resource,
            quantity,
            remaining: quantity,
            price,
            tax_rate,
            status: OrderStatus::Active,
            created_at: now,
            expires_at: after_hours(now, config.market.order_duration_hours)?,
        },
    );
    Ok(id)
}

/// Offer warehouse stock for sale. The quantity is reserved until the
/// order fills, is cancelled or expires.
pub fn create_sell_order(
    world: &mut World,
    player_id: PlayerId,
    resource: Resource,
    (quantity, price): (Decimal, Decimal),
    now: DateTime<Utc>,
    config: &EconomyConfig,
) -> Result<ActionOutcome, ActionError> {
    check_terms(quantity, price)?;
    let available = world.available_stock(player_id, resource)?;
    if available < quantity {
        return Err(ActionError::rejected(format!(
            "only {available} t of {resource} available"
        )));
    }
    let region = world.player(player_id)?.current_region;
    let tax_rate = creator_tax_rate(world, player_id, region, config)?;
    let warehouse = world.warehouse_of(player_id)?.id;
    let row = world.stock_mut(warehouse, resource)?;
    row.reserved = add(row.reserved, quantity)?;
    world.journal.record(TransferParams {
        at: now,
        kind: EntryKind::EscrowLock,
        asset: Asset::Goods(resource),
        quantity,
        from: Account::Warehouse(warehouse),
        to: Account::Escrow(player_id),
        reason: "sell_order",
    })?;

    let id = open_order(
        world,
        player_id,
        OrderSide::Sell,
        resource,
        (quantity, price, tax_rate),
        now,
        config,
    )?;
    world.log(
        player_id,
        HistoryAction::MarketOrderCreated,
        format!("Listed {quantity} t of {resource} at {price} each"),
        Decimal::ZERO,
        Decimal::ZERO,
        now,
    );
    Ok(ActionOutcome::created(
        format!("Sell order for {quantity} t of {resource} created."),
        id,
    ))
}

/// Bid for goods. The price and the creator's tax are escrowed.
pub fn create_buy_order(
    world: &mut World,
    player_id: PlayerId,
    resource: Resource,
    (quantity, price): (Decimal, Decimal),
    now: DateTime<Utc>,
    config: &EconomyConfig,
) -> Result<ActionOutcome, ActionError> {
    check_terms(quantity, price)?;
    let region = world.player(player_id)?.current_region;
    let tax_rate = creator_tax_rate(world, player_id, region, config)?;
    let value = mul(quantity, price)?;
    let tax = mul(value, tax_rate)?;
    let total = add(value, tax)?;
    let available = world.available_money(player_id)?;
    if available < total {
        return Err(ActionError::rejected(format!(
            "not enough money: {total} needed ({value} plus {tax} tax), {available} available"
        )));
    }
    world.lock_money(now, player_id, total, "buy_order")?;

    let id = open_order(
        world,
        player_id,
        OrderSide::Buy,
        resource,
        (quantity, price, tax_rate),
        now,
        config,
    )?;
    world.log(
        player_id,
        HistoryAction::MarketOrderCreated,
        format!("Bid for {quantity} t of {resource} at {price} each, {total} reserved"),
        Decimal::ZERO,
        Decimal::ZERO,
        now,
    );
    Ok(ActionOutcome::created(
        format!("Buy order for {quantity} t of {resource} created."),
        id,
    ))
}

/// Release the escrow still held for `quantity` units of `order`.
fn release_escrow(
    world: &mut World,
    order: &MarketOrder,
    quantity: Decimal,
    now: DateTime<Utc>,
) -> Result<(), ActionError> {
    if quantity <= Decimal::ZERO {
        return Ok(());
    }
    match order.side {
        OrderSide::Sell => {
            let warehouse = world.warehouse_of(order.creator)?.id;
            let row = world.stock_mut(warehouse, order.resource)?;
            let released = quantity.min(row.reserved).max(Decimal::ZERO);
            row.reserved = sub(row.reserved, released)?;
            world.journal.record(TransferParams {
                at: now,
                kind: EntryKind::EscrowRelease,
                asset: Asset::Goods(order.resource),
                quantity: released,
                from: Account::Escrow(order.creator),
                to: Account::Warehouse(warehouse),
                reason: "order_closed",
            })?;
        }
        OrderSide::Buy => {
            let escrow = buy_escrow(order, quantity)?;
            world.release_money(now, order.creator, escrow, "order_closed")?;
        }
    }
    Ok(())
}

/// Take `quantity` of another player's active order. The quantity is
/// clamped to what remains.
#[allow(clippy::too_many_lines)]
pub fn fill_order(
    world: &mut World,
    taker: PlayerId,
    order_id: OrderId,
    quantity: Decimal,
    now: DateTime<Utc>,
    config: &EconomyConfig,
) -> Result<ActionOutcome, ActionError> {
    world.player(taker)?;
    let order = world.order(order_id)?.clone();
    if order.status != OrderStatus::Active || order.expires_at <= now {
        return Err(ActionError::rejected("this order is no longer active"));
    }
    if order.creator == taker {
        return Err(ActionError::rejected("you cannot trade with yourself"));
    }
    if quantity <= Decimal::ZERO {
        return Err(ActionError::rejected("quantity must be positive"));
    }
    let quantity = quantity.min(order.remaining);
    let value = mul(quantity, order.price)?;
    let tax = order_tax(&order, quantity)?;
    let goods = Asset::Goods(order.resource);
    let pickup_expiry = after_minutes(now, config.mining.pickup_expiry_minutes)?;

    let message = match order.side {
        OrderSide::Sell => {
            if world.available_money(taker)? < value {
                return Err(ActionError::rejected(format!(
                    "not enough money: this purchase costs {value}"
                )));
            }
            world.move_money(
                now,
                EntryKind::Settlement,
                (Account::Player(taker), Account::Player(order.creator)),
                value,
                "market_sale",
            )?;
            world.move_money(
                now,
                EntryKind::Tax,
                (Account::Player(order.creator), Account::World),
                tax,
                "market_tax",
            )?;

            let warehouse = world.warehouse_of(order.creator)?.id;
            let row = world.stock_mut(warehouse, order.resource)?;
            if row.reserved < quantity || row.quantity < quantity {
                return Err(ActionError::internal(format!(
                    "seller escrow for order {order_id} is short"
                )));
            }
            row.reserved = sub(row.reserved, quantity)?;
            row.quantity = sub(row.quantity, quantity)?;

            let key = PickupKey {
                player_id: taker,
                region_id: order.region_id,
                resource: order.resource,
            };
            world.timers.deposit(key, quantity, pickup_expiry)?;
            world.journal.record(TransferParams {
                at: now,
                kind: EntryKind::Settlement,
                asset: goods,
                quantity,
                from: Account::Escrow(order.creator),
                to: Account::Pickup(taker),
                reason: "market_sale",
            })?;

            let region_name = world.region(order.region_id)?.name.clone();
            let net = sub(value, tax)?;
            world.log(
                order.creator,
                HistoryAction::MarketSale,
                format!(
                    "Sold {quantity} t of {} for {value} (net {net})",
                    order.resource
                ),
                net,
                Decimal::ZERO,
                now,
            );
            world.log(
                taker,
                HistoryAction::MarketPurchase,
                format!(
                    "Bought {quantity} t of {} for {value}; waiting in {region_name}",
                    order.resource
                ),
                negate(value),
                Decimal::ZERO,
                now,
            );
            format!(
                "Bought {quantity} t of {}. It waits in {region_name} for transport.",
                order.resource
            )
        }
        OrderSide::Buy => {
            let available = world.available_stock(taker, order.resource)?;
            if available < quantity {
                return Err(ActionError::rejected(format!(
                    "you do not have {quantity} t of {} available",
                    order.resource
                )));
            }
            let escrow = buy_escrow(&order, quantity)?;
            world.release_money(now, order.creator, escrow, "market_purchase")?;
            world.move_money(
                now,
                EntryKind::Tax,
                (Account::Player(order.creator), Account::World),
                tax,
                "market_tax",
            )?;
            world.move_money(
                now,
                EntryKind::Settlement,
                (Account::World, Account::Player(taker)),
                value,
                "market_purchase",
            )?;

            let taker_region = world.player(taker)?.current_region;
            let warehouse = world.warehouse_of(taker)?.id;
            let row = world.stock_mut(warehouse, order.resource)?;
            row.quantity = sub(row.quantity, quantity)?;

            let key = PickupKey {
                player_id: order.creator,
                region_id: taker_region,
                resource: order.resource,
            };
            world.timers.deposit(key, quantity, pickup_expiry)?;
            world.journal.record(TransferParams {
                at: now,
                kind: EntryKind::Settlement,
                asset: goods,
                quantity,
                from: Account::Warehouse(warehouse),
                to: Account::Pickup(order.creator),
                reason: "market_purchase",
            })?;

            let region_name = world.region(taker_region)?.name.clone();
            world.log(
                order.creator,
                HistoryAction::MarketPurchase,
                format!(
                    "Bought {quantity} t of {} for {value} (tax {tax}); waiting in {region_name}",
                    order.resource
                ),
                negate(tax),
                Decimal::ZERO,
                now,
            );
            world.log(
                taker,
                HistoryAction::MarketSale,
                format!("Sold {quantity} t of {} to a buy order for {value}", order.resource),
                value,
                Decimal::ZERO,
                now,
            );
            format!("Sold {quantity} t of {} for {value}.", order.resource)
        }
    };

    let remaining = sub(order.remaining, quantity)?.max(Decimal::ZERO);
    let completed = remaining <= config.market.completion_tolerance;
    if completed {
        // Dust below the tolerance would otherwise stay escrowed forever.
        release_escrow(world, &order, remaining, now)?;
    }
    let stored = world.order_mut(order_id)?;
    if completed {
        stored.remaining = Decimal::ZERO;
        stored.status = OrderStatus::Completed;
    } else {
        stored.remaining = remaining;
    }
    debug!(
        order_id = %order_id,
        taker = %taker,
        %quantity,
        %value,
        %tax,
        completed,
        "order filled"
    );
    Ok(ActionOutcome::message(message))
}

/// Cancel an own active order, returning its escrow.
pub fn cancel_order(
    world: &mut World,
    player_id: PlayerId,
    order_id: OrderId,
    now: DateTime<Utc>,
) -> Result<ActionOutcome, ActionError> {
    let order = world.order(order_id)?.clone();
    if order.creator != player_id {
        return Err(ActionError::rejected("you do not own this order"));
    }
    if order.status != OrderStatus::Active {
        return Err(ActionError::rejected("this order is no longer active"));
    }
    close_order(world, &order, OrderStatus::Cancelled, now)?;
    Ok(ActionOutcome::message("Order cancelled and escrow returned."))
}

/// Expire one active order, refunding exactly as a cancel would.
pub fn expire_order(
    world: &mut World,
    order_id: OrderId,
    now: DateTime<Utc>,
) -> Result<(), ActionError> {
    let order = world.order(order_id)?.clone();
    if order.status != OrderStatus::Active {
        return Ok(());
    }
    close_order(world, &order, OrderStatus::Expired, now)
}

/// Expire every active order whose deadline has passed. Returns how many
/// orders expired.
pub fn expire_due_orders(world: &mut World, now: DateTime<Utc>) -> Result<usize, ActionError> {
    let due: Vec<OrderId> = world
        .orders
        .values()
        .filter(|o| o.status == OrderStatus::Active && o.expires_at <= now)
        .map(|o| o.id)
        .collect();
    for id in &due {
        expire_order(world, *id, now)?;
    }
    if !due.is_empty() {
        info!(count = due.len(), "market orders expired");
    }
    Ok(due.len())
}

fn close_order(
    world: &mut World,
    order: &MarketOrder,
    status: OrderStatus,
    now: DateTime<Utc>,
) -> Result<(), ActionError> {
    release_escrow(world, order, order.remaining, now)?;
    world.order_mut(order.id)?.status = status;
    let (action, verb) = match status {
        OrderStatus::Expired => (HistoryAction::MarketOrderExpired, "expired"),
        _ => (HistoryAction::MarketOrderCancelled, "cancelled"),
    };
    let side = match order.side {
        OrderSide::Sell => "sell",
        OrderSide::Buy => "buy",
    };
    world.log(
        order.creator,
        action,
        format!(
            "The {side} order for {} t of {} {verb}; escrow returned",
            order.remaining, order.resource
        ),
        Decimal::ZERO,
        Decimal::ZERO,
        now,
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use chrono::Duration;
    use rust_decimal_macros::dec;

    use tycoon_ledger::reconcile;

    use crate::testing::{add_player, add_region, now, stock};
    use crate::world::balance_deltas;

    use super::*;

    struct Market {
        world: World,
        config: EconomyConfig,
        home: RegionId,
        seller: PlayerId,
        buyer: PlayerId,
    }

    fn market() -> Market {
        let mut world = World::new();
        let home = add_region(&mut world, "Belo Horizonte");
        let away = add_region(&mut world, "Montes Claros");
        let seller = add_player(&mut world, "ana", home);
        let buyer = add_player(&mut world, "bia", away);
        world.player_mut(buyer).unwrap().money = dec!(10000);
        Market {
            world,
            config: EconomyConfig::default(),
            home,
            seller,
            buyer,
        }
    }

    fn order_id(outcome: &ActionOutcome) -> OrderId {
        OrderId::from(outcome.reference.unwrap())
    }

    #[test]
    fn sell_beyond_available_stock_changes_nothing() {
        let mut m = market();
        stock(&mut m.world, m.seller, Resource::Iron, dec!(60));
        let first = create_sell_order(
            &mut m.world,
            m.seller,
            Resource::Iron,
            (dec!(20), dec!(5)),
            now(),
            &m.config,
        );
        assert!(first.is_ok());
        let before = m.world.clone();

        let result = m.world.atomically(|w| {
            create_sell_order(w, m.seller, Resource::Iron, (dec!(50), dec!(5)), now(), &m.config)
        });
        assert!(matches!(result, Err(ActionError::Rejected { .. })));
        assert_eq!(m.world, before);
    }

    #[test]
    fn full_buy_fill_completes_order() {
        let mut m = market();
        stock(&mut m.world, m.seller, Resource::Iron, dec!(30));
        let outcome = create_buy_order(
            &mut m.world,
            m.buyer,
            Resource::Iron,
            (dec!(20), dec!(10)),
            now(),
            &m.config,
        )
        .unwrap();
        let id = order_id(&outcome);
        assert_eq!(m.world.player(m.buyer).unwrap().reserved_money, dec!(210));

        // Asking for more than remains is clamped.
        assert!(fill_order(&mut m.world, m.seller, id, dec!(25), now(), &m.config).is_ok());
        let order = m.world.order(id).unwrap();
        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(order.remaining, Decimal::ZERO);

        let buyer = m.world.player(m.buyer).unwrap();
        assert_eq!((buyer.money, buyer.reserved_money), (dec!(9990), dec!(0)));
        assert_eq!(m.world.player(m.seller).unwrap().money, dec!(1200));
        assert_eq!(
            m.world.available_stock(m.seller, Resource::Iron).unwrap(),
            dec!(10)
        );
        // The goods wait where the seller stands.
        let key = PickupKey {
            player_id: m.buyer,
            region_id: m.home,
            resource: Resource::Iron,
        };
        assert_eq!(m.world.timers.pickup(&key).unwrap().quantity, dec!(20));
    }

    #[test]
    fn partial_sell_fill_delivers_to_order_region() {
        let mut m = market();
        stock(&mut m.world, m.seller, Resource::Gold, dec!(10));
        let outcome = create_sell_order(
            &mut m.world,
            m.seller,
            Resource::Gold,
            (dec!(10), dec!(100)),
            now(),
            &m.config,
        )
        .unwrap();
        let id = order_id(&outcome);

        assert!(fill_order(&mut m.world, m.buyer, id, dec!(4), now(), &m.config).is_ok());
        let order = m.world.order(id).unwrap();
        assert_eq!((order.status, order.remaining), (OrderStatus::Active, dec!(6)));

        assert_eq!(m.world.player(m.buyer).unwrap().money, dec!(9600));
        // 400 minus 5% tax.
        assert_eq!(m.world.player(m.seller).unwrap().money, dec!(1380));
        let row = m.world.warehouse_of(m.seller).unwrap().stock.get(&Resource::Gold).copied().unwrap();
        assert_eq!((row.quantity, row.reserved), (dec!(6), dec!(6)));

        let key = PickupKey {
            player_id: m.buyer,
            region_id: m.home,
            resource: Resource::Gold,
        };
        assert_eq!(m.world.timers.pickup(&key).unwrap().quantity, dec!(4));
    }

    #[test]
    fn cancelling_buy_order_refunds_price_and_tax() {
        let mut m = market();
        let outcome = create_buy_order(
            &mut m.world,
            m.buyer,
            Resource::Corn,
            (dec!(30), dec!(100)),
            now(),
            &m.config,
        )
        .unwrap();
        let id = order_id(&outcome);
        assert_eq!(m.world.player(m.buyer).unwrap().reserved_money, dec!(3150));

        assert!(cancel_order(&mut m.world, m.buyer, id, now()).is_ok());
        let buyer = m.world.player(m.buyer).unwrap();
        assert_eq!((buyer.money, buyer.reserved_money), (dec!(10000), dec!(0)));
        assert_eq!(m.world.order(id).unwrap().status, OrderStatus::Cancelled);

        let again = cancel_order(&mut m.world, m.buyer, id, now());
        assert!(matches!(again, Err(ActionError::Rejected { .. })));
    }

    #[test]
    fn self_trade_and_foreign_cancel_are_rejected() {
        let mut m = market();
        stock(&mut m.world, m.seller, Resource::Iron, dec!(5));
        let outcome = create_sell_order(
            &mut m.world,
            m.seller,
            Resource::Iron,
            (dec!(5), dec!(1)),
            now(),
            &m.config,
        )
        .unwrap();
        let id = order_id(&outcome);
        assert!(fill_order(&mut m.world, m.seller, id, dec!(1), now(), &m.config).is_err());
        assert!(cancel_order(&mut m.world, m.buyer, id, now()).is_err());
    }

    #[test]
    fn expiry_refunds_like_cancel() {
        let mut m = market();
        stock(&mut m.world, m.seller, Resource::Iron, dec!(8));
        create_sell_order(
            &mut m.world,
            m.seller,
            Resource::Iron,
            (dec!(8), dec!(3)),
            now(),
            &m.config,
        )
        .unwrap();

        let early = now() + Duration::hours(71);
        assert_eq!(expire_due_orders(&mut m.world, early).unwrap(), 0);
        let late = now() + Duration::hours(72);
        assert_eq!(expire_due_orders(&mut m.world, late).unwrap(), 1);
        assert_eq!(
            m.world.available_stock(m.seller, Resource::Iron).unwrap(),
            dec!(8)
        );
    }

    #[test]
    fn escrow_flows_are_journaled() {
        let mut m = market();
        stock(&mut m.world, m.seller, Resource::Iron, dec!(40));
        m.world.player_mut(m.seller).unwrap().money = dec!(5000);
        let before = m.world.balances().unwrap();

        let sell = create_sell_order(
            &mut m.world,
            m.seller,
            Resource::Iron,
            (dec!(15), dec!(7)),
            now(),
            &m.config,
        )
        .unwrap();
        let buy = create_buy_order(
            &mut m.world,
            m.seller,
            Resource::Corn,
            (dec!(12), dec!(9)),
            now(),
            &m.config,
        )
        .unwrap();
        assert!(fill_order(&mut m.world, m.buyer, order_id(&sell), dec!(6), now(), &m.config).is_ok());
        assert!(cancel_order(&mut m.world, m.seller, order_id(&sell), now()).is_ok());
        assert!(cancel_order(&mut m.world, m.seller, order_id(&buy), now()).is_ok());

        let seller = m.world.player(m.seller).unwrap();
        assert_eq!(seller.reserved_money, Decimal::ZERO);
        let row = m.world.warehouse_of(m.seller).unwrap().stock.get(&Resource::Iron).copied().unwrap();
        assert_eq!((row.quantity, row.reserved), (dec!(34), dec!(0)));

        let observed = balance_deltas(&before, &m.world.balances().unwrap()).unwrap();
        let result = reconcile(m.world.journal.entries(), &observed);
        assert!(result.is_balanced(), "{result:?}");
    }

    #[test]
    fn order_book_filters_and_sorts_by_price() {
        let mut m = market();
        stock(&mut m.world, m.seller, Resource::Iron, dec!(10));
        for price in [dec!(9), dec!(4)] {
            create_sell_order(
                &mut m.world,
                m.seller,
                Resource::Iron,
                (dec!(5), price),
                now(),
                &m.config,
            )
            .unwrap();
        }
        create_buy_order(
            &mut m.world,
            m.buyer,
            Resource::Iron,
            (dec!(1), dec!(1)),
            now(),
            &m.config,
        )
        .unwrap();

        let sells = order_book(
            &m.world,
            OrderFilter {
                side: Some(OrderSide::Sell),
                ..OrderFilter::default()
            },
        );
        let prices: Vec<_> = sells.iter().map(|o| o.price).collect();
        assert_eq!(prices, vec![dec!(4), dec!(9)]);
        assert_eq!(order_book(&m.world, OrderFilter::default()).len(), 3);
    }

    fn buy(m: &mut Market, quantity: Decimal, price: Decimal) -> OrderId {
        let outcome = create_buy_order(
            &mut m.world,
            m.buyer,
            Resource::Corn,
            (quantity, price),
            now(),
            &m.config,
        )
        .unwrap();
        order_id(&outcome)
    }

    fn set_buyer_tax(m: &mut Market, rate: Decimal) {
        let region = m.world.player(m.buyer).unwrap().current_region;
        m.world.region_mut(region).unwrap().tax_rate = rate;
    }

    #[test]
    fn tax_rise_does_not_release_other_orders_escrow() {
        let mut m = market();
        let first = buy(&mut m, dec!(10), dec!(100));
        let second = buy(&mut m, dec!(10), dec!(100));
        assert_eq!(m.world.player(m.buyer).unwrap().reserved_money, dec!(2100));

        set_buyer_tax(&mut m, dec!(0.20));
        assert!(cancel_order(&mut m.world, m.buyer, first, now()).is_ok());

        let reserved = m.world.player(m.buyer).unwrap().reserved_money;
        assert_eq!(reserved, dec!(1050));
        assert_eq!(escrowed_money(&m.world, m.buyer).unwrap(), reserved);

        assert!(cancel_order(&mut m.world, m.buyer, second, now()).is_ok());
        let buyer = m.world.player(m.buyer).unwrap();
        assert_eq!((buyer.money, buyer.reserved_money), (dec!(10000), dec!(0)));
    }

    #[test]
    fn tax_cut_leaves_no_stranded_escrow() {
        let mut m = market();
        let id = buy(&mut m, dec!(8), dec!(100));
        assert_eq!(m.world.player(m.buyer).unwrap().reserved_money, dec!(840));

        set_buyer_tax(&mut m, dec!(0.01));
        assert!(cancel_order(&mut m.world, m.buyer, id, now()).is_ok());

        let buyer = m.world.player(m.buyer).unwrap();
        assert_eq!((buyer.money, buyer.reserved_money), (dec!(10000), dec!(0)));
        assert_eq!(escrowed_money(&m.world, m.buyer).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn fills_after_a_tax_change_use_the_rate_at_placement() {
        let mut m = market();
        stock(&mut m.world, m.seller, Resource::Corn, dec!(30));
        let id = buy(&mut m, dec!(20), dec!(10));
        assert_eq!(m.world.order(id).unwrap().tax_rate, dec!(0.05));

        set_buyer_tax(&mut m, dec!(0.20));
        assert!(fill_order(&mut m.world, m.seller, id, dec!(10), now(), &m.config).is_ok());
        let buyer = m.world.player(m.buyer).unwrap();
        // Only the 5% tax on 100 leaves the wallet; half the escrow remains.
        assert_eq!((buyer.money, buyer.reserved_money), (dec!(9995), dec!(105)));
        assert_eq!(escrowed_money(&m.world, m.buyer).unwrap(), dec!(105));

        set_buyer_tax(&mut m, dec!(0.01));
        assert!(fill_order(&mut m.world, m.seller, id, dec!(10), now(), &m.config).is_ok());
        let buyer = m.world.player(m.buyer).unwrap();
        assert_eq!((buyer.money, buyer.reserved_money), (dec!(9990), dec!(0)));
        assert_eq!(m.world.order(id).unwrap().status, OrderStatus::Completed);
    }

    #[test]
    fn sell_tax_uses_the_rate_at_placement() {
        let mut m = market();
        stock(&mut m.world, m.seller, Resource::Gold, dec!(10));
        let outcome = create_sell_order(
            &mut m.world,
            m.seller,
            Resource::Gold,
            (dec!(10), dec!(100)),
            now(),
            &m.config,
        )
        .unwrap();
        m.world.region_mut(m.home).unwrap().tax_rate = dec!(0.20);

        let id = order_id(&outcome);
        assert!(fill_order(&mut m.world, m.buyer, id, dec!(10), now(), &m.config).is_ok());
        // 1000 minus the 5% in force when the order was listed.
        assert_eq!(m.world.player(m.seller).unwrap().money, dec!(1950));
    }
}
