//! Newsletter Core - Domain entities, services, and traits.
//!
//! This crate contains the scheduling logic for newsletter deliveries.
//! It is database-agnostic and defines traits that are implemented
//! by the `storage-sqlite` and `event-api` crates.

pub mod auth;
pub mod constants;
pub mod delivery;
pub mod errors;
pub mod events;
pub mod preferences;
pub mod schedule;
pub mod utils;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
