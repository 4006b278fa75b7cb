//! Initial world contents.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::info;

use tycoon_types::{Company, CompanyId, Ownership, Region, RegionId, Resource};

use crate::config::EconomyConfig;
use crate::world::World;

/// Create the configured regions, each with a state gold mine and a state
/// iron mine. Does nothing when the world already has regions.
///
/// Returns the number of regions created.
pub fn seed_world(world: &mut World, config: &EconomyConfig, now: DateTime<Utc>) -> usize {
    if !world.regions.is_empty() {
        return 0;
    }
    for seed in &config.seed.regions {
        let region_id = RegionId::new();
        world.regions.insert(
            region_id,
            Region {
                id: region_id,
                name: seed.name.clone(),
                latitude: seed.latitude,
                longitude: seed.longitude,
                gold_reserve: config.region.gold_reserve_max,
                gold_reserve_max: config.region.gold_reserve_max,
                iron_reserve: config.region.iron_reserve_max,
                iron_reserve_max: config.region.iron_reserve_max,
                education_index: Decimal::ZERO,
                health_index: Decimal::ZERO,
                philanthropy_index: Decimal::ZERO,
                development_index: Decimal::ONE,
                tax_rate: config.region.initial_tax_rate,
            },
        );
        for (product, label) in [(Resource::Gold, "Gold"), (Resource::Iron, "Iron")] {
            let id = CompanyId::new();
            world.companies.insert(
                id,
                Company {
                    id,
                    name: format!("{} State {label} Mine", seed.name),
                    region_id,
                    ownership: Ownership::StateOwned,
                    product,
                    profit_rate: config.company.initial_rate,
                    cash: Decimal::ZERO,
                    rate_changed_at: None,
                    created_at: now,
                },
            );
        }
    }
    let created = config.seed.regions.len();
    info!(regions = created, "world seeded");
    created
}
