//! Game server binary for the Tycoon simulation.
//!
//! This is the main entry point that wires together persistence, the
//! recurring jobs and the action API. It loads configuration, restores
//! or seeds the world, and serves until interrupted.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `tycoon-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Connect to `PostgreSQL` and apply migrations
//! 4. Load the world, seeding it when the database is empty
//! 5. Warm the in-memory history archive
//! 6. Start the persister, the action API and the job scheduler
//! 7. On Ctrl-C, stop every task and save one last time

mod callback;
mod error;
mod persister;

use std::path::Path;
use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tycoon_api::AppState;
use tycoon_api::state::HISTORY_CAPACITY;
use tycoon_core::config::LoggingConfig;
use tycoon_core::{Clock, GameConfig, Scheduler, SystemClock};
use tycoon_db::{HistoryStore, PostgresConfig, PostgresPool, WorldStore};
use tycoon_economy::seed::seed_world;

use crate::callback::ApiCallback;
use crate::error::EngineError;
use crate::persister::Persister;

/// Path of the configuration file, relative to the working directory.
const CONFIG_PATH: &str = "tycoon-config.yaml";

/// Application entry point for the game server.
///
/// # Errors
///
/// Returns an error if any initialization step fails or a background
/// task dies.
#[tokio::main]
#[allow(clippy::too_many_lines)]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration. Logging is not up yet, so remember whether
    //    the file was found and report it afterwards.
    let (config, from_file) = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!(
        from_file,
        bind = config.server.bind_address(),
        core_status_update_secs = config.scheduler.core_status_update_secs,
        resource_replenishment_secs = config.scheduler.resource_replenishment_secs,
        vehicle_validity_check_secs = config.scheduler.vehicle_validity_check_secs,
        "tycoon-engine starting"
    );

    // 3. Connect and migrate.
    let pool = PostgresPool::connect(
        &PostgresConfig::new(&config.database.url)
            .with_max_connections(config.database.max_connections),
    )
    .await?;
    pool.run_migrations().await?;

    // 4. Load or seed.
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = WorldStore::new(pool.pool());
    let mut world = store.load().await?;
    let seeded = seed_world(&mut world, &config.economy, clock.now());
    if seeded > 0 {
        store.save(&world).await?;
        world.drain_pending();
        info!(regions = seeded, "empty database seeded");
    }
    info!(
        players = world.players.len(),
        regions = world.regions.len(),
        timers = world.timers.len(),
        "world ready"
    );

    // 5. Build shared state and warm the history archive.
    let economy = Arc::new(config.economy.clone());
    let state = Arc::new(AppState::new(
        Arc::new(Mutex::new(world)),
        Arc::clone(&economy),
        Arc::clone(&clock),
    ));
    let archive_limit = u32::try_from(HISTORY_CAPACITY).unwrap_or(u32::MAX);
    let mut recent = HistoryStore::new(pool.pool()).recent(archive_limit).await?;
    recent.reverse();
    let warmed = recent.len();
    state.history.write().await.record(recent);
    info!(entries = warmed, "history archive warmed");

    // 6. Start background tasks.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let persister = Persister::new(pool.clone(), Arc::clone(&state));
    let persister_handle = tokio::spawn(persister.run(shutdown_rx.clone()));

    let server_config = config.server.clone();
    let server_state = Arc::clone(&state);
    let server_shutdown = shutdown_rx.clone();
    let server_handle = tokio::spawn(async move {
        tycoon_api::start_server(&server_config, server_state, server_shutdown).await
    });

    let scheduler = Arc::new(Scheduler::new(
        Arc::clone(&state.world),
        economy,
        clock,
        Arc::new(ApiCallback::new(Arc::clone(&state))),
    ));
    let job_handles = scheduler.spawn(&config.scheduler, &shutdown_rx);

    // 7. Serve until interrupted.
    tokio::signal::ctrl_c().await?;
    info!("shutdown requested");
    // Every receiver is held by a task that is still running.
    let _ = shutdown_tx.send(true);

    for handle in job_handles {
        handle.await?;
    }
    server_handle.await??;
    persister_handle.await?;
    pool.close().await;

    info!("tycoon-engine shutdown complete");
    Ok(())
}

/// Load [`GameConfig`] from [`CONFIG_PATH`], falling back to defaults
/// with environment overrides when the file is absent.
fn load_config() -> Result<(GameConfig, bool), EngineError> {
    let path = Path::new(CONFIG_PATH);
    if path.exists() {
        Ok((GameConfig::from_file(path)?, true))
    } else {
        let mut config = GameConfig::default();
        config.apply_env_overrides();
        Ok((config, false))
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
