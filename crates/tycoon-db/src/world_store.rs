//! Whole-world persistence.
//!
//! The world is small enough to write in full after every action and job.
//! Entities are upserted, the timer tables are replaced, and the pending
//! history and journal entries are appended, all inside one transaction.
//! Either the whole world reaches the database or none of it does.
//!
//! Inserts use multi-row `UNNEST` so each table costs one round-trip.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use tycoon_economy::World;
use tycoon_types::{
    ActiveJourney, ActivePlanting, ActiveTraining, ActiveTransport, Company, Field, HistoryEntry,
    LedgerEntry, MarketOrder, Pickup, Player, Region, ResidencyRequest, Vehicle, Warehouse,
};

use crate::codec::{to_int, to_json, to_text};
use crate::error::DbError;
use crate::rows::{
    CompanyRow, FieldRow, JourneyRow, OrderRow, PickupRow, PlantingRow, PlayerRow, RegionRow,
    ResidencyRow, StockRow, TrainingRow, TransportRow, VehicleRow, WarehouseRow,
};

/// Load and save the complete world.
pub struct WorldStore<'a> {
    pool: &'a PgPool,
}

impl<'a> WorldStore<'a> {
    /// Create a world store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Load every entity and timer.
    ///
    /// History and journal entries are not loaded; the returned world has
    /// nothing pending.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if a query fails and
    /// [`DbError::Corrupt`] if a row cannot be turned into a domain value.
    pub async fn load(&self) -> Result<World, DbError> {
        let mut world = World::new();
        self.load_entities(&mut world).await?;
        self.load_timers(&mut world).await?;
        tracing::info!(
            regions = world.regions.len(),
            players = world.players.len(),
            timers = world.timers.len(),
            "world loaded"
        );
        Ok(world)
    }

    async fn load_entities(&self, world: &mut World) -> Result<(), DbError> {
        for row in sqlx::query_as::<_, RegionRow>("SELECT * FROM regions")
            .fetch_all(self.pool)
            .await?
        {
            let region = Region::from(row);
            world.regions.insert(region.id, region);
        }

        for row in sqlx::query_as::<_, PlayerRow>("SELECT * FROM players")
            .fetch_all(self.pool)
            .await?
        {
            let player = Player::try_from(row)?;
            world.players.insert(player.id, player);
        }

        for row in sqlx::query_as::<_, CompanyRow>("SELECT * FROM companies")
            .fetch_all(self.pool)
            .await?
        {
            let company = Company::try_from(row)?;
            world.companies.insert(company.id, company);
        }

        for row in sqlx::query_as::<_, WarehouseRow>("SELECT * FROM warehouses")
            .fetch_all(self.pool)
            .await?
        {
            let warehouse = Warehouse::try_from(row)?;
            world.warehouses.insert(warehouse.id, warehouse);
        }

        for row in sqlx::query_as::<_, StockRow>("SELECT * FROM warehouse_stock")
            .fetch_all(self.pool)
            .await?
        {
            let (warehouse_id, resource, entry) = row.into_parts()?;
            let warehouse = world.warehouses.get_mut(&warehouse_id).ok_or_else(|| {
                DbError::corrupt("warehouse_stock", format!("unknown warehouse {warehouse_id}"))
            })?;
            warehouse.stock.insert(resource, entry);
        }

        for row in sqlx::query_as::<_, VehicleRow>("SELECT * FROM vehicles")
            .fetch_all(self.pool)
            .await?
        {
            let vehicle = Vehicle::try_from(row)?;
            world.vehicles.insert(vehicle.id, vehicle);
        }

        for row in sqlx::query_as::<_, FieldRow>("SELECT * FROM fields")
            .fetch_all(self.pool)
            .await?
        {
            let field = Field::try_from(row)?;
            world.fields.insert(field.id, field);
        }

        for row in sqlx::query_as::<_, OrderRow>("SELECT * FROM market_orders")
            .fetch_all(self.pool)
            .await?
        {
            let order = MarketOrder::try_from(row)?;
            world.orders.insert(order.id, order);
        }

        Ok(())
    }

    async fn load_timers(&self, world: &mut World) -> Result<(), DbError> {
        let timers = &mut world.timers;

        for row in sqlx::query_as::<_, JourneyRow>("SELECT * FROM active_journeys")
            .fetch_all(self.pool)
            .await?
        {
            timers
                .start_journey(ActiveJourney::from(row))
                .map_err(|e| DbError::corrupt("active_journeys", e.to_string()))?;
        }

        for row in sqlx::query_as::<_, TrainingRow>("SELECT * FROM active_trainings")
            .fetch_all(self.pool)
            .await?
        {
            timers
                .start_training(ActiveTraining::try_from(row)?)
                .map_err(|e| DbError::corrupt("active_trainings", e.to_string()))?;
        }

        for row in sqlx::query_as::<_, ResidencyRow>("SELECT * FROM residency_requests")
            .fetch_all(self.pool)
            .await?
        {
            timers
                .request_residency(ResidencyRequest::from(row))
                .map_err(|e| DbError::corrupt("residency_requests", e.to_string()))?;
        }

        for row in sqlx::query_as::<_, PlantingRow>("SELECT * FROM active_plantings")
            .fetch_all(self.pool)
            .await?
        {
            timers.plant(ActivePlanting::from(row));
        }

        for row in sqlx::query_as::<_, TransportRow>("SELECT * FROM active_transports")
            .fetch_all(self.pool)
            .await?
        {
            timers.dispatch(ActiveTransport::try_from(row)?);
        }

        for row in sqlx::query_as::<_, PickupRow>("SELECT * FROM pickups")
            .fetch_all(self.pool)
            .await?
        {
            timers
                .restore_pickup(Pickup::try_from(row)?)
                .map_err(|e| DbError::corrupt("pickups", e.to_string()))?;
        }

        Ok(())
    }

    /// Write the whole world, including pending history and journal
    /// entries, in one transaction.
    ///
    /// The caller drains the pending logs only after this returns `Ok`.
    /// Re-saving the same pending entries is harmless: log inserts skip
    /// ids that already exist.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if any statement fails; nothing is committed.
    pub async fn save(&self, world: &World) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        save_regions(&mut tx, world.regions.values()).await?;
        save_players(&mut tx, world.players.values()).await?;
        save_companies(&mut tx, world.companies.values()).await?;
        save_warehouses(&mut tx, world.warehouses.values()).await?;
        save_vehicles(&mut tx, world.vehicles.values()).await?;
        save_fields(&mut tx, world.fields.values()).await?;
        save_orders(&mut tx, world.orders.values()).await?;
        replace_timers(&mut tx, world).await?;
        append_history(&mut tx, &world.history).await?;
        append_ledger(&mut tx, world.journal.entries()).await?;

        tx.commit().await?;
        tracing::debug!(
            history = world.history.len(),
            journal = world.journal.len(),
            "world saved"
        );
        Ok(())
    }
}

// =========================================================================
// Entities
// =========================================================================

async fn save_regions<'r>(
    conn: &mut PgConnection,
    regions: impl ExactSizeIterator<Item = &'r Region>,
) -> Result<(), DbError> {
    let len = regions.len();
    let mut ids = Vec::with_capacity(len);
    let mut names = Vec::with_capacity(len);
    let mut latitudes = Vec::with_capacity(len);
    let mut longitudes = Vec::with_capacity(len);
    let mut gold = Vec::with_capacity(len);
    let mut gold_max = Vec::with_capacity(len);
    let mut iron = Vec::with_capacity(len);
    let mut iron_max = Vec::with_capacity(len);
    let mut education = Vec::with_capacity(len);
    let mut health = Vec::with_capacity(len);
    let mut philanthropy = Vec::with_capacity(len);
    let mut development = Vec::with_capacity(len);
    let mut tax = Vec::with_capacity(len);

    for region in regions {
        ids.push(region.id.into_inner());
        names.push(region.name.clone());
        latitudes.push(region.latitude);
        longitudes.push(region.longitude);
        gold.push(region.gold_reserve);
        gold_max.push(region.gold_reserve_max);
        iron.push(region.iron_reserve);
        iron_max.push(region.iron_reserve_max);
        education.push(region.education_index);
        health.push(region.health_index);
        philanthropy.push(region.philanthropy_index);
        development.push(region.development_index);
        tax.push(region.tax_rate);
    }

    sqlx::query(
        r"INSERT INTO regions (id, name, latitude, longitude, gold_reserve, gold_reserve_max, iron_reserve, iron_reserve_max, education_index, health_index, philanthropy_index, development_index, tax_rate)
          SELECT * FROM UNNEST($1::UUID[], $2::TEXT[], $3::NUMERIC[], $4::NUMERIC[], $5::NUMERIC[], $6::NUMERIC[], $7::NUMERIC[], $8::NUMERIC[], $9::NUMERIC[], $10::NUMERIC[], $11::NUMERIC[], $12::NUMERIC[], $13::NUMERIC[])
          ON CONFLICT (id) DO UPDATE SET
            name = EXCLUDED.name,
            latitude = EXCLUDED.latitude,
            longitude = EXCLUDED.longitude,
            gold_reserve = EXCLUDED.gold_reserve,
            gold_reserve_max = EXCLUDED.gold_reserve_max,
            iron_reserve = EXCLUDED.iron_reserve,
            iron_reserve_max = EXCLUDED.iron_reserve_max,
            education_index = EXCLUDED.education_index,
            health_index = EXCLUDED.health_index,
            philanthropy_index = EXCLUDED.philanthropy_index,
            development_index = EXCLUDED.development_index,
            tax_rate = EXCLUDED.tax_rate",
    )
    .bind(&ids)
    .bind(&names)
    .bind(&latitudes)
    .bind(&longitudes)
    .bind(&gold)
    .bind(&gold_max)
    .bind(&iron)
    .bind(&iron_max)
    .bind(&education)
    .bind(&health)
    .bind(&philanthropy)
    .bind(&development)
    .bind(&tax)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn save_players<'p>(
    conn: &mut PgConnection,
    players: impl ExactSizeIterator<Item = &'p Player>,
) -> Result<(), DbError> {
    const TABLE: &str = "players";
    let len = players.len();
    let mut ids = Vec::with_capacity(len);
    let mut usernames = Vec::with_capacity(len);
    let mut money = Vec::with_capacity(len);
    let mut reserved = Vec::with_capacity(len);
    let mut gold = Vec::with_capacity(len);
    let mut energy = Vec::with_capacity(len);
    let mut level = Vec::with_capacity(len);
    let mut xp = Vec::with_capacity(len);
    let mut work_xp = Vec::with_capacity(len);
    let mut education = Vec::with_capacity(len);
    let mut health = Vec::with_capacity(len);
    let mut philanthropy = Vec::with_capacity(len);
    let mut current = Vec::with_capacity(len);
    let mut residence = Vec::with_capacity(len);
    let mut last_update = Vec::with_capacity(len);
    let mut created = Vec::with_capacity(len);

    for player in players {
        ids.push(player.id.into_inner());
        usernames.push(player.username.clone());
        money.push(player.money);
        reserved.push(player.reserved_money);
        gold.push(player.gold);
        energy.push(to_int(TABLE, player.energy)?);
        level.push(to_int(TABLE, player.level)?);
        xp.push(player.xp);
        work_xp.push(player.work_xp);
        education.push(to_int(TABLE, player.education)?);
        health.push(to_int(TABLE, player.health)?);
        philanthropy.push(to_int(TABLE, player.philanthropy)?);
        current.push(player.current_region.into_inner());
        residence.push(player.residence_region.into_inner());
        last_update.push(player.last_status_update);
        created.push(player.created_at);
    }

    sqlx::query(
        r"INSERT INTO players (id, username, money, reserved_money, gold, energy, level, xp, work_xp, education, health, philanthropy, current_region, residence_region, last_status_update, created_at)
          SELECT * FROM UNNEST($1::UUID[], $2::TEXT[], $3::NUMERIC[], $4::NUMERIC[], $5::NUMERIC[], $6::INTEGER[], $7::INTEGER[], $8::NUMERIC[], $9::NUMERIC[], $10::INTEGER[], $11::INTEGER[], $12::INTEGER[], $13::UUID[], $14::UUID[], $15::TIMESTAMPTZ[], $16::TIMESTAMPTZ[])
          ON CONFLICT (id) DO UPDATE SET
            money = EXCLUDED.money,
            reserved_money = EXCLUDED.reserved_money,
            gold = EXCLUDED.gold,
            energy = EXCLUDED.energy,
            level = EXCLUDED.level,
            xp = EXCLUDED.xp,
            work_xp = EXCLUDED.work_xp,
            education = EXCLUDED.education,
            health = EXCLUDED.health,
            philanthropy = EXCLUDED.philanthropy,
            current_region = EXCLUDED.current_region,
            residence_region = EXCLUDED.residence_region,
            last_status_update = EXCLUDED.last_status_update",
    )
    .bind(&ids)
    .bind(&usernames)
    .bind(&money)
    .bind(&reserved)
    .bind(&gold)
    .bind(&energy)
    .bind(&level)
    .bind(&xp)
    .bind(&work_xp)
    .bind(&education)
    .bind(&health)
    .bind(&philanthropy)
    .bind(&current)
    .bind(&residence)
    .bind(&last_update)
    .bind(&created)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn save_companies<'c>(
    conn: &mut PgConnection,
    companies: impl ExactSizeIterator<Item = &'c Company>,
) -> Result<(), DbError> {
    let len = companies.len();
    let mut ids = Vec::with_capacity(len);
    let mut names = Vec::with_capacity(len);
    let mut regions = Vec::with_capacity(len);
    let mut owners: Vec<Option<Uuid>> = Vec::with_capacity(len);
    let mut products = Vec::with_capacity(len);
    let mut rates = Vec::with_capacity(len);
    let mut cash = Vec::with_capacity(len);
    let mut rate_changed = Vec::with_capacity(len);
    let mut created = Vec::with_capacity(len);

    for company in companies {
        ids.push(company.id.into_inner());
        names.push(company.name.clone());
        regions.push(company.region_id.into_inner());
        owners.push(company.ownership.owner().map(tycoon_types::PlayerId::into_inner));
        products.push(to_text(&company.product)?);
        rates.push(company.profit_rate);
        cash.push(company.cash);
        rate_changed.push(company.rate_changed_at);
        created.push(company.created_at);
    }

    sqlx::query(
        r"INSERT INTO companies (id, name, region_id, owner_id, product, profit_rate, cash, rate_changed_at, created_at)
          SELECT * FROM UNNEST($1::UUID[], $2::TEXT[], $3::UUID[], $4::UUID[], $5::TEXT[], $6::NUMERIC[], $7::NUMERIC[], $8::TIMESTAMPTZ[], $9::TIMESTAMPTZ[])
          ON CONFLICT (id) DO UPDATE SET
            name = EXCLUDED.name,
            owner_id = EXCLUDED.owner_id,
            profit_rate = EXCLUDED.profit_rate,
            cash = EXCLUDED.cash,
            rate_changed_at = EXCLUDED.rate_changed_at",
    )
    .bind(&ids)
    .bind(&names)
    .bind(&regions)
    .bind(&owners)
    .bind(&products)
    .bind(&rates)
    .bind(&cash)
    .bind(&rate_changed)
    .bind(&created)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn save_warehouses<'w>(
    conn: &mut PgConnection,
    warehouses: impl ExactSizeIterator<Item = &'w Warehouse>,
) -> Result<(), DbError> {
    const TABLE: &str = "warehouses";
    let len = warehouses.len();
    let mut ids = Vec::with_capacity(len);
    let mut players = Vec::with_capacity(len);
    let mut regions = Vec::with_capacity(len);
    let mut capacity = Vec::with_capacity(len);
    let mut fleet = Vec::with_capacity(len);
    let mut specialization = Vec::with_capacity(len);

    let mut stock_warehouses = Vec::new();
    let mut stock_resources = Vec::new();
    let mut stock_quantities = Vec::new();
    let mut stock_reserved = Vec::new();

    for warehouse in warehouses {
        ids.push(warehouse.id.into_inner());
        players.push(warehouse.player_id.into_inner());
        regions.push(warehouse.region_id.into_inner());
        capacity.push(to_int(TABLE, warehouse.capacity_level)?);
        fleet.push(to_int(TABLE, warehouse.fleet_level)?);
        specialization.push(to_int(TABLE, warehouse.specialization_level)?);

        for (resource, entry) in &warehouse.stock {
            stock_warehouses.push(warehouse.id.into_inner());
            stock_resources.push(to_text(resource)?);
            stock_quantities.push(entry.quantity);
            stock_reserved.push(entry.reserved);
        }
    }

    sqlx::query(
        r"INSERT INTO warehouses (id, player_id, region_id, capacity_level, fleet_level, specialization_level)
          SELECT * FROM UNNEST($1::UUID[], $2::UUID[], $3::UUID[], $4::INTEGER[], $5::INTEGER[], $6::INTEGER[])
          ON CONFLICT (id) DO UPDATE SET
            region_id = EXCLUDED.region_id,
            capacity_level = EXCLUDED.capacity_level,
            fleet_level = EXCLUDED.fleet_level,
            specialization_level = EXCLUDED.specialization_level",
    )
    .bind(&ids)
    .bind(&players)
    .bind(&regions)
    .bind(&capacity)
    .bind(&fleet)
    .bind(&specialization)
    .execute(&mut *conn)
    .await?;

    sqlx::query("DELETE FROM warehouse_stock")
        .execute(&mut *conn)
        .await?;
    sqlx::query(
        r"INSERT INTO warehouse_stock (warehouse_id, resource, quantity, reserved)
          SELECT * FROM UNNEST($1::UUID[], $2::TEXT[], $3::NUMERIC[], $4::NUMERIC[])",
    )
    .bind(&stock_warehouses)
    .bind(&stock_resources)
    .bind(&stock_quantities)
    .bind(&stock_reserved)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn save_vehicles<'v>(
    conn: &mut PgConnection,
    vehicles: impl ExactSizeIterator<Item = &'v Vehicle>,
) -> Result<(), DbError> {
    let len = vehicles.len();
    let mut ids = Vec::with_capacity(len);
    let mut warehouses = Vec::with_capacity(len);
    let mut types = Vec::with_capacity(len);
    let mut capacity = Vec::with_capacity(len);
    let mut speed = Vec::with_capacity(len);
    let mut cost = Vec::with_capacity(len);
    let mut validity = Vec::with_capacity(len);
    let mut purchased = Vec::with_capacity(len);

    for vehicle in vehicles {
        ids.push(vehicle.id.into_inner());
        warehouses.push(vehicle.warehouse_id.into_inner());
        types.push(to_text(&vehicle.vehicle_type)?);
        capacity.push(vehicle.capacity);
        speed.push(vehicle.speed);
        cost.push(vehicle.cost_per_ton_km);
        validity.push(to_int("vehicles", vehicle.validity_days)?);
        purchased.push(vehicle.purchased_at);
    }

    // Expired vehicles are gone from the world; drop them here too.
    sqlx::query("DELETE FROM vehicles WHERE id <> ALL($1::UUID[])")
        .bind(&ids)
        .execute(&mut *conn)
        .await?;
    sqlx::query(
        r"INSERT INTO vehicles (id, warehouse_id, vehicle_type, capacity, speed, cost_per_ton_km, validity_days, purchased_at)
          SELECT * FROM UNNEST($1::UUID[], $2::UUID[], $3::TEXT[], $4::NUMERIC[], $5::NUMERIC[], $6::NUMERIC[], $7::INTEGER[], $8::TIMESTAMPTZ[])
          ON CONFLICT (id) DO NOTHING",
    )
    .bind(&ids)
    .bind(&warehouses)
    .bind(&types)
    .bind(&capacity)
    .bind(&speed)
    .bind(&cost)
    .bind(&validity)
    .bind(&purchased)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn save_fields<'f>(
    conn: &mut PgConnection,
    fields: impl ExactSizeIterator<Item = &'f Field>,
) -> Result<(), DbError> {
    let len = fields.len();
    let mut ids = Vec::with_capacity(len);
    let mut names = Vec::with_capacity(len);
    let mut owners = Vec::with_capacity(len);
    let mut regions = Vec::with_capacity(len);
    let mut rates = Vec::with_capacity(len);
    let mut uses = Vec::with_capacity(len);
    let mut rest = Vec::with_capacity(len);

    for field in fields {
        ids.push(field.id.into_inner());
        names.push(field.name.clone());
        owners.push(field.owner.into_inner());
        regions.push(field.region_id.into_inner());
        rates.push(field.profit_rate);
        uses.push(to_int("fields", field.uses_remaining)?);
        rest.push(field.rest_until);
    }

    sqlx::query(
        r"INSERT INTO fields (id, name, owner_id, region_id, profit_rate, uses_remaining, rest_until)
          SELECT * FROM UNNEST($1::UUID[], $2::TEXT[], $3::UUID[], $4::UUID[], $5::NUMERIC[], $6::INTEGER[], $7::TIMESTAMPTZ[])
          ON CONFLICT (id) DO UPDATE SET
            profit_rate = EXCLUDED.profit_rate,
            uses_remaining = EXCLUDED.uses_remaining,
            rest_until = EXCLUDED.rest_until",
    )
    .bind(&ids)
    .bind(&names)
    .bind(&owners)
    .bind(&regions)
    .bind(&rates)
    .bind(&uses)
    .bind(&rest)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn save_orders<'o>(
    conn: &mut PgConnection,
    orders: impl ExactSizeIterator<Item = &'o MarketOrder>,
) -> Result<(), DbError> {
    let len = orders.len();
    let mut ids = Vec::with_capacity(len);
    let mut creators = Vec::with_capacity(len);
    let mut regions = Vec::with_capacity(len);
    let mut sides = Vec::with_capacity(len);
    let mut resources = Vec::with_capacity(len);
    let mut quantities = Vec::with_capacity(len);
    let mut remaining = Vec::with_capacity(len);
    let mut prices = Vec::with_capacity(len);
    let mut tax_rates = Vec::with_capacity(len);
    let mut statuses = Vec::with_capacity(len);
    let mut created = Vec::with_capacity(len);
    let mut expires = Vec::with_capacity(len);

    for order in orders {
        ids.push(order.id.into_inner());
        creators.push(order.creator.into_inner());
        regions.push(order.region_id.into_inner());
        sides.push(to_text(&order.side)?);
        resources.push(to_text(&order.resource)?);
        quantities.push(order.quantity);
        remaining.push(order.remaining);
        prices.push(order.price);
        tax_rates.push(order.tax_rate);
        statuses.push(to_text(&order.status)?);
        created.push(order.created_at);
        expires.push(order.expires_at);
    }

    sqlx::query(
        r"INSERT INTO market_orders (id, creator_id, region_id, side, resource, quantity, remaining, price, tax_rate, status, created_at, expires_at)
          SELECT * FROM UNNEST($1::UUID[], $2::UUID[], $3::UUID[], $4::TEXT[], $5::TEXT[], $6::NUMERIC[], $7::NUMERIC[], $8::NUMERIC[], $9::NUMERIC[], $10::TEXT[], $11::TIMESTAMPTZ[], $12::TIMESTAMPTZ[])
          ON CONFLICT (id) DO UPDATE SET
            remaining = EXCLUDED.remaining,
            status = EXCLUDED.status",
    )
    .bind(&ids)
    .bind(&creators)
    .bind(&regions)
    .bind(&sides)
    .bind(&resources)
    .bind(&quantities)
    .bind(&remaining)
    .bind(&prices)
    .bind(&tax_rates)
    .bind(&statuses)
    .bind(&created)
    .bind(&expires)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

// =========================================================================
// Timers
// =========================================================================

async fn replace_timers(conn: &mut PgConnection, world: &World) -> Result<(), DbError> {
    sqlx::query(
        "TRUNCATE active_journeys, active_trainings, residency_requests, active_plantings, active_transports, pickups",
    )
    .execute(&mut *conn)
    .await?;

    insert_journeys(conn, world.timers.journeys()).await?;
    insert_trainings(conn, world.timers.trainings()).await?;
    insert_residency(conn, world.timers.residency_requests()).await?;
    insert_plantings(conn, world.timers.plantings()).await?;
    insert_transports(conn, world.timers.transports()).await?;
    insert_pickups(conn, world.timers.pickups()).await?;
    Ok(())
}

async fn insert_journeys<'j>(
    conn: &mut PgConnection,
    journeys: impl Iterator<Item = &'j ActiveJourney>,
) -> Result<(), DbError> {
    let mut players = Vec::new();
    let mut origins = Vec::new();
    let mut destinations = Vec::new();
    let mut costs = Vec::new();
    let mut started = Vec::new();
    let mut ends = Vec::new();
    for journey in journeys {
        players.push(journey.player_id.into_inner());
        origins.push(journey.origin.into_inner());
        destinations.push(journey.destination.into_inner());
        costs.push(journey.cost);
        started.push(journey.started_at);
        ends.push(journey.ends_at);
    }

    sqlx::query(
        r"INSERT INTO active_journeys (player_id, origin, destination, cost, started_at, ends_at)
          SELECT * FROM UNNEST($1::UUID[], $2::UUID[], $3::UUID[], $4::NUMERIC[], $5::TIMESTAMPTZ[], $6::TIMESTAMPTZ[])",
    )
    .bind(&players)
    .bind(&origins)
    .bind(&destinations)
    .bind(&costs)
    .bind(&started)
    .bind(&ends)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn insert_trainings<'t>(
    conn: &mut PgConnection,
    trainings: impl Iterator<Item = &'t ActiveTraining>,
) -> Result<(), DbError> {
    let mut players = Vec::new();
    let mut targets = Vec::new();
    let mut levels = Vec::new();
    let mut started = Vec::new();
    let mut ends = Vec::new();
    for training in trainings {
        players.push(training.player_id.into_inner());
        targets.push(to_json(&training.target)?.to_string());
        levels.push(to_int("active_trainings", training.target_level)?);
        started.push(training.started_at);
        ends.push(training.ends_at);
    }

    sqlx::query(
        r"INSERT INTO active_trainings (player_id, target, target_level, started_at, ends_at)
          SELECT player_id, target::JSONB, target_level, started_at, ends_at
          FROM UNNEST($1::UUID[], $2::TEXT[], $3::INTEGER[], $4::TIMESTAMPTZ[], $5::TIMESTAMPTZ[])
            AS t(player_id, target, target_level, started_at, ends_at)",
    )
    .bind(&players)
    .bind(&targets)
    .bind(&levels)
    .bind(&started)
    .bind(&ends)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn insert_residency<'r>(
    conn: &mut PgConnection,
    requests: impl Iterator<Item = &'r ResidencyRequest>,
) -> Result<(), DbError> {
    let mut players = Vec::new();
    let mut destinations = Vec::new();
    let mut requested = Vec::new();
    let mut approves = Vec::new();
    for request in requests {
        players.push(request.player_id.into_inner());
        destinations.push(request.destination.into_inner());
        requested.push(request.requested_at);
        approves.push(request.approves_at);
    }

    sqlx::query(
        r"INSERT INTO residency_requests (player_id, destination, requested_at, approves_at)
          SELECT * FROM UNNEST($1::UUID[], $2::UUID[], $3::TIMESTAMPTZ[], $4::TIMESTAMPTZ[])",
    )
    .bind(&players)
    .bind(&destinations)
    .bind(&requested)
    .bind(&approves)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn insert_plantings<'p>(
    conn: &mut PgConnection,
    plantings: impl Iterator<Item = &'p ActivePlanting>,
) -> Result<(), DbError> {
    let mut ids = Vec::new();
    let mut players = Vec::new();
    let mut fields = Vec::new();
    let mut quantities = Vec::new();
    let mut ends = Vec::new();
    for planting in plantings {
        ids.push(planting.id.into_inner());
        players.push(planting.player_id.into_inner());
        fields.push(planting.field_id.into_inner());
        quantities.push(planting.quantity);
        ends.push(planting.ends_at);
    }

    sqlx::query(
        r"INSERT INTO active_plantings (id, player_id, field_id, quantity, ends_at)
          SELECT * FROM UNNEST($1::UUID[], $2::UUID[], $3::UUID[], $4::NUMERIC[], $5::TIMESTAMPTZ[])",
    )
    .bind(&ids)
    .bind(&players)
    .bind(&fields)
    .bind(&quantities)
    .bind(&ends)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn insert_transports<'t>(
    conn: &mut PgConnection,
    transports: impl Iterator<Item = &'t ActiveTransport>,
) -> Result<(), DbError> {
    let mut ids = Vec::new();
    let mut players = Vec::new();
    let mut vehicles = Vec::new();
    let mut warehouses = Vec::new();
    let mut origins = Vec::new();
    let mut resources = Vec::new();
    let mut quantities = Vec::new();
    let mut fares = Vec::new();
    let mut departs = Vec::new();
    let mut arrives = Vec::new();
    for transport in transports {
        ids.push(transport.id.into_inner());
        players.push(transport.player_id.into_inner());
        vehicles.push(transport.vehicle_id.into_inner());
        warehouses.push(transport.warehouse_id.into_inner());
        origins.push(transport.origin.into_inner());
        resources.push(to_text(&transport.resource)?);
        quantities.push(transport.quantity);
        fares.push(transport.fare);
        departs.push(transport.departs_at);
        arrives.push(transport.arrives_at);
    }

    sqlx::query(
        r"INSERT INTO active_transports (id, player_id, vehicle_id, warehouse_id, origin, resource, quantity, fare, departs_at, arrives_at)
          SELECT * FROM UNNEST($1::UUID[], $2::UUID[], $3::UUID[], $4::UUID[], $5::UUID[], $6::TEXT[], $7::NUMERIC[], $8::NUMERIC[], $9::TIMESTAMPTZ[], $10::TIMESTAMPTZ[])",
    )
    .bind(&ids)
    .bind(&players)
    .bind(&vehicles)
    .bind(&warehouses)
    .bind(&origins)
    .bind(&resources)
    .bind(&quantities)
    .bind(&fares)
    .bind(&departs)
    .bind(&arrives)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn insert_pickups<'p>(
    conn: &mut PgConnection,
    pickups: impl Iterator<Item = &'p Pickup>,
) -> Result<(), DbError> {
    let mut players = Vec::new();
    let mut regions = Vec::new();
    let mut resources = Vec::new();
    let mut quantities = Vec::new();
    let mut expires = Vec::new();
    for pickup in pickups {
        players.push(pickup.player_id.into_inner());
        regions.push(pickup.region_id.into_inner());
        resources.push(to_text(&pickup.resource)?);
        quantities.push(pickup.quantity);
        expires.push(pickup.expires_at);
    }

    sqlx::query(
        r"INSERT INTO pickups (player_id, region_id, resource, quantity, expires_at)
          SELECT * FROM UNNEST($1::UUID[], $2::UUID[], $3::TEXT[], $4::NUMERIC[], $5::TIMESTAMPTZ[])",
    )
    .bind(&players)
    .bind(&regions)
    .bind(&resources)
    .bind(&quantities)
    .bind(&expires)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

// =========================================================================
// Logs
// =========================================================================

async fn append_history(conn: &mut PgConnection, entries: &[HistoryEntry]) -> Result<(), DbError> {
    if entries.is_empty() {
        return Ok(());
    }
    let len = entries.len();
    let mut ids = Vec::with_capacity(len);
    let mut players = Vec::with_capacity(len);
    let mut actions = Vec::with_capacity(len);
    let mut descriptions = Vec::with_capacity(len);
    let mut money = Vec::with_capacity(len);
    let mut gold = Vec::with_capacity(len);
    let mut at = Vec::with_capacity(len);
    for entry in entries {
        ids.push(entry.id.into_inner());
        players.push(entry.player_id.into_inner());
        actions.push(to_text(&entry.action)?);
        descriptions.push(entry.description.clone());
        money.push(entry.money_delta);
        gold.push(entry.gold_delta);
        at.push(entry.at);
    }

    sqlx::query(
        r"INSERT INTO history (id, player_id, action, description, money_delta, gold_delta, at)
          SELECT * FROM UNNEST($1::UUID[], $2::UUID[], $3::TEXT[], $4::TEXT[], $5::NUMERIC[], $6::NUMERIC[], $7::TIMESTAMPTZ[])
          ON CONFLICT (id) DO NOTHING",
    )
    .bind(&ids)
    .bind(&players)
    .bind(&actions)
    .bind(&descriptions)
    .bind(&money)
    .bind(&gold)
    .bind(&at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn append_ledger(conn: &mut PgConnection, entries: &[LedgerEntry]) -> Result<(), DbError> {
    if entries.is_empty() {
        return Ok(());
    }
    let len = entries.len();
    let mut ids = Vec::with_capacity(len);
    let mut kinds = Vec::with_capacity(len);
    let mut assets = Vec::with_capacity(len);
    let mut quantities = Vec::with_capacity(len);
    let mut from = Vec::with_capacity(len);
    let mut to = Vec::with_capacity(len);
    let mut reasons = Vec::with_capacity(len);
    let mut at = Vec::with_capacity(len);
    for entry in entries {
        ids.push(entry.id.into_inner());
        kinds.push(to_text(&entry.kind)?);
        assets.push(to_json(&entry.asset)?.to_string());
        quantities.push(entry.quantity);
        from.push(to_json(&entry.from)?.to_string());
        to.push(to_json(&entry.to)?.to_string());
        reasons.push(entry.reason.clone());
        at.push(entry.at);
    }

    sqlx::query(
        r"INSERT INTO ledger (id, kind, asset, quantity, from_account, to_account, reason, at)
          SELECT id, kind, asset::JSONB, quantity, from_account::JSONB, to_account::JSONB, reason, at
          FROM UNNEST($1::UUID[], $2::TEXT[], $3::TEXT[], $4::NUMERIC[], $5::TEXT[], $6::TEXT[], $7::TEXT[], $8::TIMESTAMPTZ[])
            AS t(id, kind, asset, quantity, from_account, to_account, reason, at)
          ON CONFLICT (id) DO NOTHING",
    )
    .bind(&ids)
    .bind(&kinds)
    .bind(&assets)
    .bind(&quantities)
    .bind(&from)
    .bind(&to)
    .bind(&reasons)
    .bind(&at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}
