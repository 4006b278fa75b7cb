//! HTTP action API for the Tycoon simulation.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **Action endpoints** (`POST /api/players/{id}/...`), one per game
//!   action, each answering `{"success", "message", "reference"}`
//! - **Read endpoints** for the player profile, action history, regions
//!   and the market order book
//! - **`WebSocket` endpoint** (`/ws/jobs`) streaming a [`JobBroadcast`]
//!   after every scheduled job via [`tokio::sync::broadcast`]
//!
//! # Architecture
//!
//! Handlers lock the shared [`World`](tycoon_economy::World) for the
//! duration of one action, so actions and scheduled jobs never
//! interleave. After a successful action the handler signals the
//! persister through [`AppState::request_persist`]; the HTTP response
//! does not wait for the database.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use state::{AppState, JobBroadcast, RecentHistory};
