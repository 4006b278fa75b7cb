//! `PostgreSQL` persistence for the Tycoon simulation.
//!
//! The game runs on an in-memory [`World`](tycoon_economy::World); this
//! crate loads it at startup and saves it after every action and job.
//!
//! ```text
//! startup:   PostgresPool::connect -> run_migrations -> WorldStore::load
//! runtime:   WorldStore::save (one transaction)
//!              |-- upsert regions, players, companies, warehouses, stock,
//!              |   vehicles, fields, market orders
//!              |-- replace timer tables
//!              +-- append history and journal entries
//! ```
//!
//! # Modules
//!
//! - [`postgres`] -- `PostgreSQL` connection pool and configuration
//! - [`world_store`] -- Whole-world load and save
//! - [`history_store`] -- Reads of persisted history
//! - [`rows`] -- Row structs and their conversion to domain types
//! - [`codec`] -- Enum and integer column encodings
//! - [`error`] -- Shared error types

pub mod codec;
pub mod error;
pub mod history_store;
pub mod postgres;
pub mod rows;
pub mod world_store;

pub use error::DbError;
pub use history_store::HistoryStore;
pub use postgres::{MIGRATOR, PostgresConfig, PostgresPool, SchemaStatus};
pub use world_store::WorldStore;
