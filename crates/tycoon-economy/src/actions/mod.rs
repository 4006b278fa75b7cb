//! Economic action handlers.
//!
//! Each handler validates its preconditions in a fixed order, computes
//! yields and costs from [`EconomyConfig`], mutates the [`World`] and
//! registers timers. Handlers assume they run inside
//! [`World::atomically`]; [`perform`] provides that boundary and the
//! outcome logging, so a rejected action never leaves partial state.
//!
//! # Submodules
//!
//! - [`registration`] -- New players with a starter warehouse and truck.
//! - [`mining`] -- Gold and iron mining.
//! - [`travel`] -- Journeys between regions.
//! - [`residency`] -- Residency requests and cancellation.
//! - [`company`] -- Founding private companies and adjusting profit rates.
//! - [`transport`] -- Freight dispatch of pickups to the warehouse.
//! - [`training`] -- Skill training.
//! - [`warehouse`] -- Warehouse upgrades and vehicle purchases.
//! - [`farming`] -- Fields and crop planting.

pub mod company;
pub mod farming;
pub mod mining;
pub mod registration;
pub mod residency;
pub mod training;
pub mod transport;
pub mod travel;
pub mod warehouse;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use tycoon_types::{
    CompanyId, FieldId, OrderId, PlayerId, RegionId, Resource, Skill, VehicleType,
    WarehouseTrack,
};

use crate::config::EconomyConfig;
use crate::error::ActionError;
use crate::market;
use crate::world::World;

pub use registration::NewPlayer;
pub use transport::TripRequest;

/// Result of a successful action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    /// Message shown to the player.
    pub message: String,
    /// Id of the record the action created, if any.
    pub reference: Option<Uuid>,
}

impl ActionOutcome {
    /// An outcome with only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            reference: None,
        }
    }

    /// An outcome pointing at a created record.
    pub fn created(message: impl Into<String>, reference: impl Into<Uuid>) -> Self {
        Self {
            message: message.into(),
            reference: Some(reference.into()),
        }
    }
}

/// Every action a registered player can take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Mine gold at a company in the current region.
    MineGold {
        /// Target gold company.
        company_id: CompanyId,
        /// Energy to spend; a positive multiple of 10.
        energy: u32,
    },
    /// Mine iron at a company in the current region.
    MineIron {
        /// Target iron company.
        company_id: CompanyId,
        /// Energy to spend; a positive multiple of 10.
        energy: u32,
    },
    /// Start a journey.
    Travel {
        /// Destination region.
        destination: RegionId,
    },
    /// Ask to move residence.
    RequestResidency {
        /// Requested residence.
        destination: RegionId,
    },
    /// Withdraw the pending residency request.
    CancelResidency,
    /// Found a private company in the residence region.
    OpenCompany {
        /// Company name.
        name: String,
        /// What it produces.
        product: Resource,
        /// Initial profit share.
        profit_rate: Decimal,
    },
    /// Change an owned company's profit share.
    AdjustCompanyRate {
        /// Owned company.
        company_id: CompanyId,
        /// New rate.
        rate: Decimal,
    },
    /// Haul a pickup to the warehouse.
    StartTransport {
        /// Region where the goods lie.
        region_id: RegionId,
        /// Resource to haul.
        resource: Resource,
        /// Trips per vehicle.
        trips: Vec<TripRequest>,
    },
    /// Train a skill one level.
    TrainSkill {
        /// Skill to train.
        skill: Skill,
    },
    /// Upgrade a warehouse track one level.
    StartUpgrade {
        /// Track to upgrade.
        track: WarehouseTrack,
    },
    /// Buy a vehicle for the warehouse.
    BuyVehicle {
        /// Catalog model.
        vehicle_type: VehicleType,
    },
    /// Open a farm field in the current region.
    CreateField {
        /// Field name.
        name: String,
        /// Owner's cut of other players' harvests.
        profit_rate: Decimal,
    },
    /// Plant corn on a field.
    PlantCrop {
        /// Target field.
        field_id: FieldId,
        /// Energy to spend.
        energy: u32,
    },
    /// Offer warehouse goods for sale.
    CreateSellOrder {
        /// Resource offered.
        resource: Resource,
        /// Quantity offered.
        quantity: Decimal,
        /// Price per unit.
        price: Decimal,
    },
    /// Bid for goods with escrowed money.
    CreateBuyOrder {
        /// Resource wanted.
        resource: Resource,
        /// Quantity wanted.
        quantity: Decimal,
        /// Price per unit.
        price: Decimal,
    },
    /// Take some or all of another player's order.
    FillOrder {
        /// Order to take.
        order_id: OrderId,
        /// Quantity to take; clamped to what remains.
        quantity: Decimal,
    },
    /// Cancel an own active order.
    CancelOrder {
        /// Order to cancel.
        order_id: OrderId,
    },
}

impl Action {
    /// Stable name used in logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::MineGold { .. } => "mine_gold",
            Self::MineIron { .. } => "mine_iron",
            Self::Travel { .. } => "travel",
            Self::RequestResidency { .. } => "request_residency",
            Self::CancelResidency => "cancel_residency",
            Self::OpenCompany { .. } => "open_company",
            Self::AdjustCompanyRate { .. } => "adjust_company_rate",
            Self::StartTransport { .. } => "start_transport",
            Self::TrainSkill { .. } => "train_skill",
            Self::StartUpgrade { .. } => "start_upgrade",
            Self::BuyVehicle { .. } => "buy_vehicle",
            Self::CreateField { .. } => "create_field",
            Self::PlantCrop { .. } => "plant_crop",
            Self::CreateSellOrder { .. } => "create_sell_order",
            Self::CreateBuyOrder { .. } => "create_buy_order",
            Self::FillOrder { .. } => "fill_order",
            Self::CancelOrder { .. } => "cancel_order",
        }
    }
}

/// Run one action for `player` as a single all-or-nothing unit.
pub fn perform(
    world: &mut World,
    player: PlayerId,
    action: &Action,
    now: DateTime<Utc>,
    config: &EconomyConfig,
) -> Result<ActionOutcome, ActionError> {
    let result = world.atomically(|w| dispatch(w, player, action, now, config));
    match &result {
        Ok(outcome) => info!(
            player_id = %player,
            action = action.name(),
            message = %outcome.message,
            "action succeeded"
        ),
        Err(e) if e.is_rejection() || e.is_conflict() => info!(
            player_id = %player,
            action = action.name(),
            reason = %e,
            "action rejected"
        ),
        Err(e) => warn!(
            player_id = %player,
            action = action.name(),
            error = %e,
            "action failed"
        ),
    }
    result
}

/// Register a new player as a single all-or-nothing unit.
pub fn register(
    world: &mut World,
    request: &NewPlayer,
    now: DateTime<Utc>,
    config: &EconomyConfig,
) -> Result<PlayerId, ActionError> {
    let result = world.atomically(|w| registration::register_player(w, request, now, config));
    match &result {
        Ok(id) => info!(player_id = %id, username = %request.username, "player registered"),
        Err(e) => info!(username = %request.username, reason = %e, "registration rejected"),
    }
    result
}

fn dispatch(
    world: &mut World,
    player: PlayerId,
    action: &Action,
    now: DateTime<Utc>,
    config: &EconomyConfig,
) -> Result<ActionOutcome, ActionError> {
    match action {
        Action::MineGold { company_id, energy } => {
            mining::mine_gold(world, player, *company_id, *energy, now, config)
        }
        Action::MineIron { company_id, energy } => {
            mining::mine_iron(world, player, *company_id, *energy, now, config)
        }
        Action::Travel { destination } => {
            travel::travel(world, player, *destination, now, config)
        }
        Action::RequestResidency { destination } => {
            residency::request_residency(world, player, *destination, now, config)
        }
        Action::CancelResidency => residency::cancel_residency(world, player, now),
        Action::OpenCompany {
            name,
            product,
            profit_rate,
        } => company::open_company(
            world,
            player,
            &company::NewCompany {
                name,
                product: *product,
                profit_rate: *profit_rate,
            },
            now,
            config,
        ),
        Action::AdjustCompanyRate { company_id, rate } => {
            company::adjust_company_rate(world, player, *company_id, *rate, now, config)
        }
        Action::StartTransport {
            region_id,
            resource,
            trips,
        } => transport::start_transport(world, player, (*region_id, *resource), trips, now, config),
        Action::TrainSkill { skill } => training::train_skill(world, player, *skill, now, config),
        Action::StartUpgrade { track } => {
            warehouse::start_upgrade(world, player, *track, now, config)
        }
        Action::BuyVehicle { vehicle_type } => {
            warehouse::buy_vehicle(world, player, *vehicle_type, now, config)
        }
        Action::CreateField { name, profit_rate } => {
            farming::create_field(world, player, name, *profit_rate, now, config)
        }
        Action::PlantCrop { field_id, energy } => {
            farming::plant_crop(world, player, *field_id, *energy, now, config)
        }
        Action::CreateSellOrder {
            resource,
            quantity,
            price,
        } => market::create_sell_order(world, player, *resource, (*quantity, *price), now, config),
        Action::CreateBuyOrder {
            resource,
            quantity,
            price,
        } => market::create_buy_order(world, player, *resource, (*quantity, *price), now, config),
        Action::FillOrder { order_id, quantity } => {
            market::fill_order(world, player, *order_id, *quantity, now, config)
        }
        Action::CancelOrder { order_id } => market::cancel_order(world, player, *order_id, now),
    }
}

/// Reject an energy spend that is not a positive multiple of the step or
/// exceeds what the player has.
pub(crate) fn validate_energy(
    available: u32,
    requested: u32,
    config: &EconomyConfig,
) -> Result<(), ActionError> {
    let step = config.mining.energy_step.max(1);
    if requested < config.mining.min_energy || requested.checked_rem(step) != Some(0) {
        return Err(ActionError::rejected(format!(
            "energy must be a multiple of {step} and at least {}",
            config.mining.min_energy
        )));
    }
    if requested > available {
        return Err(ActionError::rejected(format!(
            "not enough energy: {available} available, {requested} requested"
        )));
    }
    Ok(())
}
