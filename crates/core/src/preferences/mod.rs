//! Preferences module - domain models, services, and traits.

pub mod catalog;
mod preferences_model;
mod preferences_service;
mod preferences_traits;


pub use preferences_model::*;
pub use preferences_service::PreferenceService;
pub use preferences_traits::{PreferenceRepositoryTrait, PreferenceServiceTrait};
