use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use std::sync::Arc;

use newsletter_core::errors::{DatabaseError, Result};
use newsletter_core::preferences::{
    NewUserPreference, PreferencePatch, PreferenceRepositoryTrait, UserPreference,
};

use super::model::{NewUserPreferenceDB, UserPreferenceDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::user_preferences;
use crate::schema::user_preferences::dsl::*;

pub struct PreferenceRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl PreferenceRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        PreferenceRepository { pool, writer }
    }

    fn find(conn: &mut SqliteConnection, uid: &str) -> Result<Option<UserPreference>> {
        let row = user_preferences
            .find(uid)
            .select(UserPreferenceDB::as_select())
            .first::<UserPreferenceDB>(conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(UserPreference::try_from).transpose()?)
    }
}

#[async_trait]
impl PreferenceRepositoryTrait for PreferenceRepository {
    fn get_by_user(&self, uid: &str) -> Result<Option<UserPreference>> {
        let mut conn = get_connection(&self.pool)?;
        Self::find(&mut conn, uid)
    }

    async fn upsert(&self, preference: NewUserPreference) -> Result<UserPreference> {
        let uid = preference.user_id.clone();
        let row = NewUserPreferenceDB::from_domain(preference, Utc::now().naive_utc())
            .map_err(StorageError::from)?;

        let stored = self
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Option<UserPreference>> {
                diesel::insert_into(user_preferences::table)
                    .values(&row)
                    .on_conflict(user_id)
                    .do_update()
                    .set(&row.changes())
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Self::find(conn, &uid)
            })
            .await?;

        stored.ok_or_else(|| {
            DatabaseError::Internal("Upserted preference could not be read back".to_string())
                .into()
        })
    }

    async fn update(&self, uid: &str, patch: PreferencePatch) -> Result<UserPreference> {
        let uid = uid.to_string();
        let missing = format!("No preference found for user {uid}");
        let now = Utc::now().naive_utc();

        // Missing rows come back as `None` so that NotFound survives the
        // writer's transaction wrapper.
        let updated = self
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Option<UserPreference>> {
                let target = user_preferences.find(&uid);
                let affected = match patch.active {
                    Some(active) => diesel::update(target)
                        .set((is_active.eq(active), updated_at.eq(now)))
                        .execute(conn),
                    None => diesel::update(target).set(updated_at.eq(now)).execute(conn),
                }
                .map_err(StorageError::from)?;

                if affected == 0 {
                    return Ok(None);
                }
                Self::find(conn, &uid)
            })
            .await?;

        updated.ok_or_else(|| DatabaseError::NotFound(missing).into())
    }
}
