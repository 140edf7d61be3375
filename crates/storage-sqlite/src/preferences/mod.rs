//! SQLite storage implementation for newsletter preferences.

mod model;
mod repository;

pub use model::{NewUserPreferenceDB, UserPreferenceDB};
pub use repository::PreferenceRepository;
