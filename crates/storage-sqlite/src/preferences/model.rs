//! Database models for newsletter preferences.

use chrono::{NaiveDateTime, TimeZone, Utc};
use diesel::prelude::*;
use log::warn;

use crate::errors::StorageError;
use newsletter_core::preferences::{Frequency, NewUserPreference, UserPreference};

/// Database model for a stored preference. Categories are a JSON array.
#[derive(Queryable, Identifiable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::user_preferences)]
#[diesel(primary_key(user_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserPreferenceDB {
    pub user_id: String,
    pub categories: String,
    pub frequency: String,
    pub email: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Database model for inserting or overwriting a preference.
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::user_preferences)]
pub struct NewUserPreferenceDB {
    pub user_id: String,
    pub categories: String,
    pub frequency: String,
    pub email: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Columns overwritten when an existing row is upserted. `created_at` is kept.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::user_preferences)]
pub struct UserPreferenceChangesDB {
    pub categories: String,
    pub frequency: String,
    pub email: String,
    pub is_active: bool,
    pub updated_at: NaiveDateTime,
}

impl NewUserPreferenceDB {
    pub fn from_domain(
        domain: NewUserPreference,
        now: NaiveDateTime,
    ) -> Result<Self, StorageError> {
        Ok(Self {
            user_id: domain.user_id,
            categories: serde_json::to_string(&domain.categories)?,
            frequency: domain.frequency.as_str().to_string(),
            email: domain.email,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn changes(&self) -> UserPreferenceChangesDB {
        UserPreferenceChangesDB {
            categories: self.categories.clone(),
            frequency: self.frequency.clone(),
            email: self.email.clone(),
            is_active: self.is_active,
            updated_at: self.updated_at,
        }
    }
}

impl TryFrom<UserPreferenceDB> for UserPreference {
    type Error = StorageError;

    fn try_from(db: UserPreferenceDB) -> Result<Self, Self::Error> {
        let categories: Vec<String> = serde_json::from_str(&db.categories)?;
        let frequency = db.frequency.parse::<Frequency>().unwrap_or_else(|_| {
            warn!(
                "Stored frequency '{}' for user {} is not recognized, treating it as weekly",
                db.frequency, db.user_id
            );
            Frequency::Weekly
        });

        Ok(UserPreference {
            user_id: db.user_id,
            categories,
            frequency,
            email: db.email,
            is_active: db.is_active,
            created_at: Utc.from_utc_datetime(&db.created_at),
            updated_at: Utc.from_utc_datetime(&db.updated_at),
        })
    }
}
