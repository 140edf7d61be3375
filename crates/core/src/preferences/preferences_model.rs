//! Preference domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::auth::UserIdentity;
use crate::errors::ValidationError;
use crate::events::ScheduledDeliveryEvent;

/// How often a user wants the newsletter delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    /// Twice a week.
    Biweekly,
}

impl Frequency {
    pub const ALL: [Frequency; 3] = [Frequency::Daily, Frequency::Weekly, Frequency::Biweekly];

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Biweekly => "biweekly",
        }
    }

    /// Parses a frequency, falling back to `Weekly` for anything unrecognized.
    pub fn parse_lenient(raw: &str) -> Frequency {
        raw.parse().unwrap_or(Frequency::Weekly)
    }
}

impl FromStr for Frequency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "biweekly" => Ok(Frequency::Biweekly),
            other => Err(ValidationError::UnsupportedFrequency(other.to_string())),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored newsletter preference, one per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreference {
    pub user_id: String,
    pub categories: Vec<String>,
    pub frequency: Frequency,
    pub email: String,
    #[serde(rename = "active")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw preference submission as received from a client.
///
/// Fields are optional so that missing values surface as validation
/// failures instead of deserialization errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceSubmission {
    pub categories: Option<Vec<String>>,
    pub frequency: Option<String>,
    pub email: Option<String>,
}

impl PreferenceSubmission {
    /// Validates the submission for the given identity and produces the
    /// record to upsert.
    ///
    /// Categories are trimmed and de-duplicated (first occurrence wins). The
    /// email falls back to the identity's email when the submission has none.
    pub fn validate(self, identity: &UserIdentity) -> Result<NewUserPreference, ValidationError> {
        let raw_categories = self.categories.unwrap_or_default();
        if raw_categories.is_empty() {
            return Err(ValidationError::EmptyCategories);
        }

        let mut categories: Vec<String> = Vec::with_capacity(raw_categories.len());
        for raw in raw_categories {
            let category = raw.trim();
            if category.is_empty() {
                return Err(ValidationError::BlankCategory);
            }
            if !categories.iter().any(|c| c == category) {
                categories.push(category.to_string());
            }
        }

        let frequency: Frequency = self
            .frequency
            .ok_or_else(|| ValidationError::MissingField("frequency".to_string()))?
            .parse()?;

        let email = self
            .email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .or_else(|| identity.email.clone())
            .ok_or_else(|| ValidationError::MissingField("email".to_string()))?;

        Ok(NewUserPreference {
            user_id: identity.user_id.clone(),
            categories,
            frequency,
            email,
        })
    }
}

/// Validated preference ready to be upserted. Upserts always mark the
/// preference active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserPreference {
    pub user_id: String,
    pub categories: Vec<String>,
    pub frequency: Frequency,
    pub email: String,
}

/// Partial update of a stored preference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencePatch {
    pub active: Option<bool>,
}

/// Result of a successful preference submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPreference {
    pub preference: UserPreference,
    pub event_id: String,
    pub fire_at: DateTime<Utc>,
}

/// What happened to the delivery schedule as a side effect of an
/// `active` flag change. Failures here never fail the update itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SchedulingOutcome {
    /// A fresh delivery event was submitted (resume).
    #[serde(rename_all = "camelCase")]
    Scheduled {
        event_id: String,
        fire_at: DateTime<Utc>,
    },
    /// Outstanding events were enumerated but left in place (pause).
    Inspected {
        outstanding: Vec<ScheduledDeliveryEvent>,
    },
    /// The bookkeeping step failed and was logged.
    SoftFailure { reason: String },
}

impl SchedulingOutcome {
    pub fn is_soft_failure(&self) -> bool {
        matches!(self, SchedulingOutcome::SoftFailure { .. })
    }
}

/// Result of a partial preference update.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceUpdateOutcome {
    pub preference: UserPreference,
    pub scheduling: SchedulingOutcome,
}
