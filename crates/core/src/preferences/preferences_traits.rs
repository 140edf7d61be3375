use async_trait::async_trait;

use crate::auth::AuthSession;
use crate::errors::Result;
use crate::preferences::{
    NewUserPreference, PreferencePatch, PreferenceSubmission, PreferenceUpdateOutcome,
    SavedPreference, UserPreference,
};

/// Repository trait for the per-user preference store.
#[async_trait]
pub trait PreferenceRepositoryTrait: Send + Sync {
    /// Reads the preference of a user. `Ok(None)` when no row exists.
    fn get_by_user(&self, user_id: &str) -> Result<Option<UserPreference>>;

    /// Inserts or overwrites the row keyed by `user_id`, marking it active.
    async fn upsert(&self, preference: NewUserPreference) -> Result<UserPreference>;

    /// Applies a partial update. Fails with `DatabaseError::NotFound` when
    /// the user has no row.
    async fn update(&self, user_id: &str, patch: PreferencePatch) -> Result<UserPreference>;
}

/// Trait for preference service operations.
#[async_trait]
pub trait PreferenceServiceTrait: Send + Sync {
    fn get_preference(&self, session: &dyn AuthSession) -> Result<Option<UserPreference>>;

    async fn save_preference(
        &self,
        session: &dyn AuthSession,
        submission: PreferenceSubmission,
    ) -> Result<SavedPreference>;

    async fn update_preference(
        &self,
        session: &dyn AuthSession,
        patch: PreferencePatch,
    ) -> Result<PreferenceUpdateOutcome>;
}
