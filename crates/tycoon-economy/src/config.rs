//! Game balance constants.
//!
//! [`EconomyConfig`] is the `economy:` section of `tycoon-config.yaml`.
//! Every field has a named default function so a partial section (or no
//! section at all) yields the stock balance. The config is passed by
//! reference into every action handler and tick phase.

use rust_decimal::Decimal;
use serde::Deserialize;
use tycoon_types::VehicleType;

/// All tunable game-balance constants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EconomyConfig {
    /// New-player wallet and energy cap.
    #[serde(default)]
    pub player: PlayerConfig,

    /// Skill bonus curves.
    #[serde(default)]
    pub skills: SkillConfig,

    /// Level thresholds.
    #[serde(default)]
    pub progression: ProgressionConfig,

    /// Region reserves and the tax step table.
    #[serde(default)]
    pub region: RegionConfig,

    /// Gold and iron mining yields.
    #[serde(default)]
    pub mining: MiningConfig,

    /// Private company costs and rate limits.
    #[serde(default)]
    pub company: CompanyConfig,

    /// Travel speed and fares.
    #[serde(default)]
    pub travel: TravelConfig,

    /// Residency wait and population caps.
    #[serde(default)]
    pub residency: ResidencyConfig,

    /// Freight fares and trip durations.
    #[serde(default)]
    pub transport: TransportConfig,

    /// Skill training cost and duration.
    #[serde(default)]
    pub training: TrainingConfig,

    /// Warehouse upgrade tracks and the vehicle catalog.
    #[serde(default)]
    pub warehouse: WarehouseConfig,

    /// Crop planting and field rest.
    #[serde(default)]
    pub farming: FarmingConfig,

    /// Order book parameters.
    #[serde(default)]
    pub market: MarketConfig,

    /// Regions created on an empty world.
    #[serde(default)]
    pub seed: SeedConfig,
}

// ---------------------------------------------------------------------------
// Players and skills
// ---------------------------------------------------------------------------

/// New-player defaults and energy regeneration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlayerConfig {
    /// Money granted at registration.
    #[serde(default = "default_starting_money")]
    pub starting_money: Decimal,

    /// Gold granted at registration.
    #[serde(default = "default_starting_gold")]
    pub starting_gold: Decimal,

    /// Energy cap; new players start full.
    #[serde(default = "default_max_energy")]
    pub max_energy: u32,

    /// Energy regenerated per whole minute before the health bonus.
    #[serde(default = "default_energy_per_minute")]
    pub energy_per_minute: Decimal,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            starting_money: default_starting_money(),
            starting_gold: default_starting_gold(),
            max_energy: default_max_energy(),
            energy_per_minute: default_energy_per_minute(),
        }
    }
}

/// Diminishing-return skill bonuses. Each bonus is `level * per_level`,
/// capped.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SkillConfig {
    /// Energy discount per health level.
    #[serde(default = "default_skill_per_level")]
    pub health_per_level: Decimal,

    /// Cap on the health energy discount.
    #[serde(default = "default_max_energy_discount")]
    pub max_energy_discount: Decimal,

    /// General-XP bonus per education level.
    #[serde(default = "default_skill_per_level")]
    pub education_per_level: Decimal,

    /// Cap on the education XP bonus.
    #[serde(default = "default_max_xp_bonus")]
    pub max_xp_bonus: Decimal,

    /// Tax discount per philanthropy level.
    #[serde(default = "default_skill_per_level")]
    pub philanthropy_per_level: Decimal,

    /// Cap on the philanthropy tax discount.
    #[serde(default = "default_max_tax_discount")]
    pub max_tax_discount: Decimal,
}

impl Default for SkillConfig {
    fn default() -> Self {
        Self {
            health_per_level: default_skill_per_level(),
            max_energy_discount: default_max_energy_discount(),
            education_per_level: default_skill_per_level(),
            max_xp_bonus: default_max_xp_bonus(),
            philanthropy_per_level: default_skill_per_level(),
            max_tax_discount: default_max_tax_discount(),
        }
    }
}

/// Level threshold curve: `base_xp * multiplier^level`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProgressionConfig {
    /// XP needed to leave level 0.
    #[serde(default = "default_level_base_xp")]
    pub base_xp: Decimal,

    /// Geometric growth per level.
    #[serde(default = "default_level_multiplier")]
    pub multiplier: Decimal,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            base_xp: default_level_base_xp(),
            multiplier: default_level_multiplier(),
        }
    }
}

// ---------------------------------------------------------------------------
// Regions
// ---------------------------------------------------------------------------

/// One row of the development-to-tax step table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TaxStep {
    /// Minimum rounded development index for this rate.
    pub min_development: u32,
    /// Tax rate applied at or above `min_development`.
    pub rate: Decimal,
}

/// Region defaults and the tax step function.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegionConfig {
    /// Starting and maximum gold reserve.
    #[serde(default = "default_reserve")]
    pub gold_reserve_max: Decimal,

    /// Starting and maximum iron reserve.
    #[serde(default = "default_reserve")]
    pub iron_reserve_max: Decimal,

    /// Tax rate before the first recompute.
    #[serde(default = "default_region_tax")]
    pub initial_tax_rate: Decimal,

    /// Steps checked highest first.
    #[serde(default = "default_tax_steps")]
    pub tax_steps: Vec<TaxStep>,

    /// Rate when no step matches.
    #[serde(default = "default_base_tax_rate")]
    pub base_tax_rate: Decimal,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            gold_reserve_max: default_reserve(),
            iron_reserve_max: default_reserve(),
            initial_tax_rate: default_region_tax(),
            tax_steps: default_tax_steps(),
            base_tax_rate: default_base_tax_rate(),
        }
    }
}

// ---------------------------------------------------------------------------
// Mining
// ---------------------------------------------------------------------------

/// Gold and iron mining constants.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MiningConfig {
    /// Smallest energy spend accepted.
    #[serde(default = "default_energy_step")]
    pub min_energy: u32,

    /// Energy must be a multiple of this.
    #[serde(default = "default_energy_step")]
    pub energy_step: u32,

    /// Work XP per requested energy point.
    #[serde(default = "default_point_one")]
    pub work_xp_per_energy: Decimal,

    /// General XP per requested energy point, before the education bonus.
    #[serde(default = "default_general_xp_per_energy")]
    pub general_xp_per_energy: Decimal,

    /// Reserve removed per requested energy point.
    #[serde(default = "default_point_one")]
    pub reserve_depletion_per_energy: Decimal,

    /// Gold produced per requested energy point.
    #[serde(default = "default_point_one")]
    pub gold_per_energy: Decimal,

    /// Iron produced per requested energy point, before the development bonus.
    #[serde(default = "default_iron_per_energy")]
    pub iron_per_energy: Decimal,

    /// Global scale applied to gross money.
    #[serde(default = "default_point_one")]
    pub money_reduction_factor: Decimal,

    /// Work XP at which the production curve tops out.
    #[serde(default = "default_xp_max_level")]
    pub xp_max_level: Decimal,

    /// Production per 10 energy at zero work XP.
    #[serde(default = "default_base_production")]
    pub base_production: Decimal,

    /// Production multiplier slope.
    #[serde(default = "default_production_curve")]
    pub production_curve: Decimal,

    /// Lifetime of a mined-iron pickup record.
    #[serde(default = "default_pickup_expiry_minutes")]
    pub pickup_expiry_minutes: i64,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            min_energy: default_energy_step(),
            energy_step: default_energy_step(),
            work_xp_per_energy: default_point_one(),
            general_xp_per_energy: default_general_xp_per_energy(),
            reserve_depletion_per_energy: default_point_one(),
            gold_per_energy: default_point_one(),
            iron_per_energy: default_iron_per_energy(),
            money_reduction_factor: default_point_one(),
            xp_max_level: default_xp_max_level(),
            base_production: default_base_production(),
            production_curve: default_production_curve(),
            pickup_expiry_minutes: default_pickup_expiry_minutes(),
        }
    }
}

// ---------------------------------------------------------------------------
// Companies
// ---------------------------------------------------------------------------

/// Private company founding and rate adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CompanyConfig {
    /// Levels per company slot; level below this owns none.
    #[serde(default = "default_levels_per_company")]
    pub levels_per_company: u32,

    /// Gold cost of the first company.
    #[serde(default = "default_company_gold_cost")]
    pub base_gold_cost: Decimal,

    /// Money cost of the first company.
    #[serde(default = "default_company_money_cost")]
    pub base_money_cost: Decimal,

    /// Cost growth per company already owned.
    #[serde(default = "default_company_cost_growth")]
    pub cost_growth: Decimal,

    /// Lowest allowed profit rate.
    #[serde(default = "default_min_rate")]
    pub min_rate: Decimal,

    /// Highest allowed profit rate.
    #[serde(default = "default_max_rate")]
    pub max_rate: Decimal,

    /// Profit rate of newly founded and seeded companies.
    #[serde(default = "default_point_one")]
    pub initial_rate: Decimal,

    /// Minimum time between two rate changes.
    #[serde(default = "default_rate_cooldown_hours")]
    pub rate_cooldown_hours: i64,
}

impl Default for CompanyConfig {
    fn default() -> Self {
        Self {
            levels_per_company: default_levels_per_company(),
            base_gold_cost: default_company_gold_cost(),
            base_money_cost: default_company_money_cost(),
            cost_growth: default_company_cost_growth(),
            min_rate: default_min_rate(),
            max_rate: default_max_rate(),
            initial_rate: default_point_one(),
            rate_cooldown_hours: default_rate_cooldown_hours(),
        }
    }
}

// ---------------------------------------------------------------------------
// Travel and residency
// ---------------------------------------------------------------------------

/// Journey constants.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TravelConfig {
    /// Minimum player level to travel.
    #[serde(default = "default_travel_min_level")]
    pub min_level: u32,

    /// Travel speed.
    #[serde(default = "default_km_per_hour")]
    pub km_per_hour: Decimal,

    /// Fare per effective kilometre.
    #[serde(default = "default_cost_per_km")]
    pub cost_per_km: Decimal,
}

impl Default for TravelConfig {
    fn default() -> Self {
        Self {
            min_level: default_travel_min_level(),
            km_per_hour: default_km_per_hour(),
            cost_per_km: default_cost_per_km(),
        }
    }
}

/// Residency change constants.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResidencyConfig {
    /// Wait before approval, before the philanthropy discount.
    #[serde(default = "default_residency_wait_minutes")]
    pub base_wait_minutes: i64,

    /// Cap on the destination philanthropy discount.
    #[serde(default = "default_half")]
    pub max_wait_discount: Decimal,

    /// Largest share of all players that may reside in one region.
    #[serde(default = "default_half")]
    pub max_resident_share: Decimal,
}

impl Default for ResidencyConfig {
    fn default() -> Self {
        Self {
            base_wait_minutes: default_residency_wait_minutes(),
            max_wait_discount: default_half(),
            max_resident_share: default_half(),
        }
    }
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Freight constants.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransportConfig {
    /// Reference speed of a vehicle with speed factor 1.
    #[serde(default = "default_km_per_hour")]
    pub base_speed_kmh: Decimal,

    /// Shortest possible trip.
    #[serde(default = "default_local_trip_minutes")]
    pub local_trip_minutes: u32,

    /// Flat fare for trips under `local_distance_km`.
    #[serde(default = "default_local_freight_fee")]
    pub local_freight_fee: Decimal,

    /// Distance below which a trip counts as local.
    #[serde(default = "default_local_distance_km")]
    pub local_distance_km: Decimal,

    /// New lifetime of a partially collected pickup.
    #[serde(default = "default_remainder_expiry_hours")]
    pub remainder_expiry_hours: i64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_speed_kmh: default_km_per_hour(),
            local_trip_minutes: default_local_trip_minutes(),
            local_freight_fee: default_local_freight_fee(),
            local_distance_km: default_local_distance_km(),
            remainder_expiry_hours: default_remainder_expiry_hours(),
        }
    }
}

// ---------------------------------------------------------------------------
// Training and warehouse
// ---------------------------------------------------------------------------

/// Skill training constants.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TrainingConfig {
    /// Money cost at skill level 0.
    #[serde(default = "default_training_base_cost")]
    pub base_cost: Decimal,

    /// Duration at skill level 0.
    #[serde(default = "default_training_base_minutes")]
    pub base_minutes: Decimal,

    /// Cost and duration growth per level.
    #[serde(default = "default_growth")]
    pub growth: Decimal,

    /// General XP granted when any training or upgrade completes.
    #[serde(default = "default_completion_xp")]
    pub completion_xp: Decimal,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            base_cost: default_training_base_cost(),
            base_minutes: default_training_base_minutes(),
            growth: default_growth(),
            completion_xp: default_completion_xp(),
        }
    }
}

/// Catalog entry for one vehicle type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VehicleSpec {
    /// The vehicle model.
    pub vehicle_type: VehicleType,
    /// Tons per trip.
    pub capacity: Decimal,
    /// Speed factor; trip time is divided by this.
    pub speed: Decimal,
    /// Freight cost per ton-kilometre.
    pub cost_per_ton_km: Decimal,
    /// Days until the vehicle is scrapped.
    pub validity_days: u32,
    /// Specialization level needed to buy.
    pub required_specialization: u32,
    /// Iron taken from the warehouse stock.
    pub iron_cost: Decimal,
    /// Money price.
    pub money_cost: Decimal,
    /// Gold price.
    pub gold_cost: Decimal,
}

/// Warehouse upgrade curve and vehicle catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WarehouseConfig {
    /// Money cost of upgrading from level 1.
    #[serde(default = "default_upgrade_money")]
    pub upgrade_base_money: Decimal,

    /// Gold cost of upgrading from level 1.
    #[serde(default = "default_upgrade_gold")]
    pub upgrade_base_gold: Decimal,

    /// Duration of upgrading from level 1.
    #[serde(default = "default_upgrade_minutes")]
    pub upgrade_base_minutes: Decimal,

    /// Cost and duration growth per level.
    #[serde(default = "default_growth")]
    pub upgrade_growth: Decimal,

    /// Storage at capacity level 1.
    #[serde(default = "default_base_capacity_tons")]
    pub base_capacity_tons: Decimal,

    /// Storage growth per capacity level.
    #[serde(default = "default_capacity_growth")]
    pub capacity_growth: Decimal,

    /// Purchasable vehicles.
    #[serde(default = "default_vehicle_catalog")]
    pub vehicles: Vec<VehicleSpec>,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            upgrade_base_money: default_upgrade_money(),
            upgrade_base_gold: default_upgrade_gold(),
            upgrade_base_minutes: default_upgrade_minutes(),
            upgrade_growth: default_growth(),
            base_capacity_tons: default_base_capacity_tons(),
            capacity_growth: default_capacity_growth(),
            vehicles: default_vehicle_catalog(),
        }
    }
}

impl WarehouseConfig {
    /// Catalog entry for a vehicle type, if it is sold.
    pub fn vehicle(&self, vehicle_type: VehicleType) -> Option<&VehicleSpec> {
        self.vehicles.iter().find(|v| v.vehicle_type == vehicle_type)
    }

    /// The catalog entry with the lowest money price.
    pub fn starter_vehicle(&self) -> Option<&VehicleSpec> {
        self.vehicles.iter().min_by_key(|v| v.money_cost)
    }
}

// ---------------------------------------------------------------------------
// Farming and market
// ---------------------------------------------------------------------------

/// Crop farming constants.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FarmingConfig {
    /// Money per 10 energy planted.
    #[serde(default = "default_farming_cost")]
    pub cost_per_10_energy: Decimal,

    /// Corn per 10 energy planted, before the education bonus.
    #[serde(default = "default_corn_per_10_energy")]
    pub corn_per_10_energy: Decimal,

    /// Growth time.
    #[serde(default = "default_grow_minutes")]
    pub grow_minutes: i64,

    /// Work XP per `corn_per_10_energy` harvested.
    #[serde(default = "default_farming_xp")]
    pub xp_per_10_energy: Decimal,

    /// Concurrent plantings per field.
    #[serde(default = "default_max_slots")]
    pub max_slots: usize,

    /// Plantings before a field rests.
    #[serde(default = "default_max_uses")]
    pub max_uses: u32,

    /// Rest duration.
    #[serde(default = "default_rest_hours")]
    pub rest_hours: i64,

    /// Money cost of opening a field.
    #[serde(default = "default_field_cost")]
    pub field_cost_money: Decimal,
}

impl Default for FarmingConfig {
    fn default() -> Self {
        Self {
            cost_per_10_energy: default_farming_cost(),
            corn_per_10_energy: default_corn_per_10_energy(),
            grow_minutes: default_grow_minutes(),
            xp_per_10_energy: default_farming_xp(),
            max_slots: default_max_slots(),
            max_uses: default_max_uses(),
            rest_hours: default_rest_hours(),
            field_cost_money: default_field_cost(),
        }
    }
}

/// Order book constants.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MarketConfig {
    /// Lifetime of a new order.
    #[serde(default = "default_order_duration_hours")]
    pub order_duration_hours: i64,

    /// Remaining quantity at or below which an order is complete.
    #[serde(default = "default_completion_tolerance")]
    pub completion_tolerance: Decimal,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            order_duration_hours: default_order_duration_hours(),
            completion_tolerance: default_completion_tolerance(),
        }
    }
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

/// A region created by world seeding.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeedRegion {
    /// Display name.
    pub name: String,
    /// Latitude in degrees.
    pub latitude: Decimal,
    /// Longitude in degrees.
    pub longitude: Decimal,
}

/// Initial map.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeedConfig {
    /// Regions to create; each gets a state gold and a state iron company.
    #[serde(default = "default_seed_regions")]
    pub regions: Vec<SeedRegion>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            regions: default_seed_regions(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_starting_money() -> Decimal {
    Decimal::from_parts(1000, 0, 0, false, 0)
}

const fn default_starting_gold() -> Decimal {
    Decimal::from_parts(5, 0, 0, false, 0)
}

const fn default_max_energy() -> u32 {
    200
}

const fn default_energy_per_minute() -> Decimal {
    Decimal::ONE
}

const fn default_skill_per_level() -> Decimal {
    Decimal::from_parts(1, 0, 0, false, 2)
}

const fn default_max_energy_discount() -> Decimal {
    Decimal::from_parts(80, 0, 0, false, 2)
}

const fn default_max_xp_bonus() -> Decimal {
    Decimal::from_parts(80, 0, 0, false, 2)
}

const fn default_max_tax_discount() -> Decimal {
    Decimal::from_parts(50, 0, 0, false, 2)
}

const fn default_level_base_xp() -> Decimal {
    Decimal::from_parts(6000, 0, 0, false, 0)
}

const fn default_level_multiplier() -> Decimal {
    Decimal::from_parts(225, 0, 0, false, 2)
}

const fn default_reserve() -> Decimal {
    Decimal::from_parts(10_000, 0, 0, false, 0)
}

const fn default_region_tax() -> Decimal {
    Decimal::from_parts(5, 0, 0, false, 2)
}

fn default_tax_steps() -> Vec<TaxStep> {
    vec![
        TaxStep {
            min_development: 10,
            rate: Decimal::from_parts(1, 0, 0, false, 2),
        },
        TaxStep {
            min_development: 7,
            rate: Decimal::from_parts(5, 0, 0, false, 2),
        },
        TaxStep {
            min_development: 4,
            rate: Decimal::from_parts(10, 0, 0, false, 2),
        },
        TaxStep {
            min_development: 2,
            rate: Decimal::from_parts(15, 0, 0, false, 2),
        },
    ]
}

const fn default_base_tax_rate() -> Decimal {
    Decimal::from_parts(20, 0, 0, false, 2)
}

const fn default_energy_step() -> u32 {
    10
}

const fn default_point_one() -> Decimal {
    Decimal::from_parts(1, 0, 0, false, 1)
}

const fn default_general_xp_per_energy() -> Decimal {
    Decimal::TEN
}

const fn default_iron_per_energy() -> Decimal {
    Decimal::from_parts(15, 0, 0, false, 1)
}

const fn default_xp_max_level() -> Decimal {
    Decimal::from_parts(115_000, 0, 0, false, 0)
}

const fn default_base_production() -> Decimal {
    Decimal::from_parts(5000, 0, 0, false, 0)
}

const fn default_production_curve() -> Decimal {
    Decimal::from_parts(592, 0, 0, false, 1)
}

const fn default_pickup_expiry_minutes() -> i64 {
    15
}

const fn default_levels_per_company() -> u32 {
    5
}

const fn default_company_gold_cost() -> Decimal {
    Decimal::ONE_HUNDRED
}

const fn default_company_money_cost() -> Decimal {
    Decimal::from_parts(2_000_000, 0, 0, false, 0)
}

const fn default_company_cost_growth() -> Decimal {
    Decimal::from_parts(125, 0, 0, false, 2)
}

const fn default_min_rate() -> Decimal {
    Decimal::from_parts(1, 0, 0, false, 2)
}

const fn default_max_rate() -> Decimal {
    Decimal::from_parts(99, 0, 0, false, 2)
}

const fn default_rate_cooldown_hours() -> i64 {
    6
}

const fn default_travel_min_level() -> u32 {
    1
}

const fn default_km_per_hour() -> Decimal {
    Decimal::ONE_HUNDRED
}

const fn default_cost_per_km() -> Decimal {
    Decimal::from_parts(5, 0, 0, false, 0)
}

const fn default_residency_wait_minutes() -> i64 {
    360
}

const fn default_half() -> Decimal {
    Decimal::from_parts(5, 0, 0, false, 1)
}

const fn default_local_trip_minutes() -> u32 {
    5
}

const fn default_local_freight_fee() -> Decimal {
    Decimal::from_parts(500, 0, 0, false, 0)
}

const fn default_local_distance_km() -> Decimal {
    Decimal::ONE
}

const fn default_remainder_expiry_hours() -> i64 {
    6
}

const fn default_training_base_cost() -> Decimal {
    Decimal::ONE_THOUSAND
}

const fn default_training_base_minutes() -> Decimal {
    Decimal::TEN
}

const fn default_growth() -> Decimal {
    Decimal::from_parts(12, 0, 0, false, 1)
}

const fn default_completion_xp() -> Decimal {
    Decimal::from_parts(500, 0, 0, false, 0)
}

const fn default_upgrade_money() -> Decimal {
    Decimal::from_parts(10_000, 0, 0, false, 0)
}

const fn default_upgrade_gold() -> Decimal {
    Decimal::from_parts(20, 0, 0, false, 0)
}

const fn default_upgrade_minutes() -> Decimal {
    Decimal::from_parts(30, 0, 0, false, 0)
}

const fn default_base_capacity_tons() -> Decimal {
    Decimal::ONE_THOUSAND
}

const fn default_capacity_growth() -> Decimal {
    Decimal::from_parts(5, 0, 0, false, 2)
}

/// Build a catalog row; prices are whole numbers, speed has one decimal.
const fn vehicle_spec(
    vehicle_type: VehicleType,
    capacity: u32,
    speed_tenths: u32,
    cost_per_ton_km: u32,
    validity_days: u32,
    required_specialization: u32,
    prices: [u32; 3],
) -> VehicleSpec {
    let [iron, money, gold] = prices;
    VehicleSpec {
        vehicle_type,
        capacity: Decimal::from_parts(capacity, 0, 0, false, 0),
        speed: Decimal::from_parts(speed_tenths, 0, 0, false, 1),
        cost_per_ton_km: Decimal::from_parts(cost_per_ton_km, 0, 0, false, 0),
        validity_days,
        required_specialization,
        iron_cost: Decimal::from_parts(iron, 0, 0, false, 0),
        money_cost: Decimal::from_parts(money, 0, 0, false, 0),
        gold_cost: Decimal::from_parts(gold, 0, 0, false, 0),
    }
}

fn default_vehicle_catalog() -> Vec<VehicleSpec> {
    vec![
        vehicle_spec(VehicleType::LightTruck, 3, 10, 808, 4, 1, [25, 50_000, 5]),
        vehicle_spec(VehicleType::Toco, 6, 9, 551, 5, 5, [120, 150_000, 15]),
        vehicle_spec(VehicleType::Truck, 16, 8, 313, 6, 10, [240, 400_000, 40]),
        vehicle_spec(VehicleType::Carreta, 35, 6, 173, 7, 15, [500, 750_000, 75]),
        vehicle_spec(VehicleType::Bitrem, 45, 5, 157, 7, 20, [800, 1_000_000, 100]),
        vehicle_spec(VehicleType::Rodotrem, 55, 5, 144, 8, 25, [1000, 1_500_000, 150]),
    ]
}

const fn default_farming_cost() -> Decimal {
    Decimal::ONE_HUNDRED
}

const fn default_corn_per_10_energy() -> Decimal {
    Decimal::TWO
}

const fn default_grow_minutes() -> i64 {
    60
}

const fn default_farming_xp() -> Decimal {
    Decimal::from_parts(5, 0, 0, false, 0)
}

const fn default_max_slots() -> usize {
    2
}

const fn default_max_uses() -> u32 {
    10
}

const fn default_rest_hours() -> i64 {
    12
}

const fn default_field_cost() -> Decimal {
    Decimal::from_parts(50_000, 0, 0, false, 0)
}

const fn default_order_duration_hours() -> i64 {
    72
}

const fn default_completion_tolerance() -> Decimal {
    Decimal::from_parts(1, 0, 0, false, 3)
}

/// Coordinates are stored in hundredths of a degree.
fn seed_region(name: &str, lat_hundredths: u32, lon_hundredths: u32) -> SeedRegion {
    SeedRegion {
        name: name.to_owned(),
        latitude: Decimal::from_parts(lat_hundredths, 0, 0, true, 2),
        longitude: Decimal::from_parts(lon_hundredths, 0, 0, true, 2),
    }
}

fn default_seed_regions() -> Vec<SeedRegion> {
    vec![
        seed_region("Belo Horizonte", 1992, 4394),
        seed_region("Triângulo Mineiro", 1891, 4827),
        seed_region("Centro-Oeste de Minas", 2014, 4488),
        seed_region("Vale do Rio Doce", 1885, 4195),
    ]
}
