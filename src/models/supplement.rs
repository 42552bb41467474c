use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::schedule::ScheduleTime;

// ── Database rows ────────────────────────────────────────────────────────────

#[derive(Debug, sqlx::FromRow)]
pub struct Supplement {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub brand: Option<String>,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub schedule_times: Vec<String>,
    pub notes: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
#[error("supplement {id} has an invalid schedule time {value:?}")]
pub struct SupplementDecodeError {
    pub id: Uuid,
    pub value: String,
}

// ── API types ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupplementResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dosage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    pub schedule_times: Vec<ScheduleTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<Supplement> for SupplementResponse {
    type Error = SupplementDecodeError;

    /// Decodes the raw row into the typed response; schedule times that do
    /// not parse are a decode error, not silently dropped.
    fn try_from(row: Supplement) -> Result<Self, Self::Error> {
        let mut schedule_times = Vec::with_capacity(row.schedule_times.len());
        for value in &row.schedule_times {
            let time = value
                .parse::<ScheduleTime>()
                .map_err(|_| SupplementDecodeError {
                    id: row.id,
                    value: value.clone(),
                })?;
            schedule_times.push(time);
        }

        Ok(Self {
            id: row.id,
            name: row.name,
            brand: row.brand,
            dosage: row.dosage,
            frequency: row.frequency,
            schedule_times,
            notes: row.notes,
            start_date: row.start_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Create/update payload. `scheduleTimes` must be a subset of the named
/// time-of-day slots; "anytime" is derived, never stored.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupplementInput {
    pub name: String,
    pub brand: Option<String>,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    #[serde(default)]
    pub schedule_times: Vec<String>,
    pub notes: Option<String>,
    pub start_date: Option<NaiveDate>,
}

impl SupplementInput {
    /// Validates the payload, returning the trimmed name and the parsed
    /// schedule times as their stored string form. Repeated times collapse to
    /// one; a stored duplicate would mint duplicate schedule entry ids.
    pub fn validate(&self) -> Result<(String, Vec<String>), &'static str> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Name is required");
        }

        let mut times: Vec<String> = Vec::with_capacity(self.schedule_times.len());
        for value in &self.schedule_times {
            let time = value
                .parse::<ScheduleTime>()
                .map_err(|_| "Invalid schedule time")?;
            if time == ScheduleTime::Anytime {
                return Err("Invalid schedule time");
            }
            let stored = time.as_str().to_string();
            if !times.contains(&stored) {
                times.push(stored);
            }
        }

        Ok((name.to_string(), times))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, times: &[&str]) -> SupplementInput {
        SupplementInput {
            name: name.to_string(),
            brand: None,
            dosage: None,
            frequency: None,
            schedule_times: times.iter().map(|t| t.to_string()).collect(),
            notes: None,
            start_date: None,
        }
    }

    #[test]
    fn validate_requires_a_name() {
        assert!(input("  ", &[]).validate().is_err());
        assert_eq!(input(" Zinc ", &[]).validate().unwrap().0, "Zinc");
    }

    #[test]
    fn validate_rejects_unknown_schedule_times() {
        assert!(input("Zinc", &["morning", "noonish"]).validate().is_err());
        assert!(input("Zinc", &["anytime"]).validate().is_err());
        let (_, times) = input("Zinc", &["morning", "bedtime"]).validate().unwrap();
        assert_eq!(times, vec!["morning", "bedtime"]);
    }

    #[test]
    fn validate_collapses_duplicate_schedule_times() {
        let (_, times) = input("Zinc", &["morning", "morning", "bedtime", "morning"])
            .validate()
            .unwrap();
        assert_eq!(times, vec!["morning", "bedtime"]);
    }
}
