//! Orchestration for the Tycoon simulation.
//!
//! This crate turns the game rules in `tycoon-economy` into a running
//! game: it loads configuration, abstracts the wall clock, resolves
//! timers on a schedule and drives the three recurring jobs.
//!
//! # Modules
//!
//! - [`config`] -- `tycoon-config.yaml` loading with environment overrides
//! - [`clock`] -- System and manual clocks
//! - [`tick`] -- The tick processor: `core_status_update`,
//!   `resource_replenishment` and `vehicle_validity_check`
//! - [`runner`] -- Non-overlapping job scheduler with a completion callback

pub mod clock;
pub mod config;
pub mod runner;
pub mod tick;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::GameConfig;
pub use runner::{JobCallback, JobKind, JobReport, Scheduler, SharedWorld};
pub use tick::TickError;
