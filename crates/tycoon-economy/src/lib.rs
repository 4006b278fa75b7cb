//! Game rules for the Tycoon economic simulation.
//!
//! Everything that changes game state lives here: the in-memory
//! [`World`], the timers players wait on, every action a player can take
//! and the market. Nothing in this crate does I/O or reads the clock;
//! callers pass `now` and an [`EconomyConfig`] into every operation.
//!
//! # Modules
//!
//! - [`actions`] -- Player actions and the all-or-nothing [`perform`] entry point
//! - [`arith`] -- Checked decimal and timestamp arithmetic
//! - [`config`] -- Balance constants, all overridable from YAML
//! - [`error`] -- The [`ActionError`] taxonomy
//! - [`geo`] -- Great-circle distances between regions
//! - [`market`] -- Escrowed SELL and BUY orders, fills, cancels, expiry
//! - [`progression`] -- Skill bonuses and level thresholds
//! - [`regions`] -- Regional indices, tax steps and reserve refills
//! - [`seed`] -- The initial map
//! - [`timers`] -- The [`TimerRegistry`] of journeys, trainings, plantings,
//!   transports, residency requests and pickups
//! - [`world`] -- The [`World`] and its money, gold and stock primitives

pub mod actions;
pub mod arith;
pub mod config;
pub mod error;
pub mod geo;
pub mod market;
pub mod progression;
pub mod regions;
pub mod seed;
pub mod timers;
pub mod world;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod testing;

pub use actions::{Action, ActionOutcome, NewPlayer, TripRequest, perform, register};
pub use config::EconomyConfig;
pub use error::ActionError;
pub use market::OrderFilter;
pub use timers::TimerRegistry;
pub use world::{Balances, World};
