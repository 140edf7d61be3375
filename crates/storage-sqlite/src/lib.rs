//! SQLite storage implementation for newsletter preferences.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `newsletter-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - The preference repository
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies exist.
//! The core crate is database-agnostic and works with traits.
//!
//! ```text
//!        core (domain)
//!              │
//!              ▼
//!   storage-sqlite (this crate)
//!              │
//!              ▼
//!          SQLite DB
//! ```

// Links the bundled libsqlite3 used by Diesel's sqlite backend.
extern crate rusqlite as _;

pub mod db;
pub mod errors;
pub mod schema;

// Repository implementations
pub mod preferences;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

pub use preferences::PreferenceRepository;

// Re-export from newsletter-core for convenience
pub use newsletter_core::errors::{DatabaseError, Error, Result};
