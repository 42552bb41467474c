//! Expands supplement schedules into the daily dose checklist.
//!
//! Pure functions: the grouper never touches the database. Dose log entries
//! are identified by `{supplementId}:{slot}` and recomputed from the current
//! supplement records every time a schedule is built.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::supplement::Supplement;

/// Time-of-day slot. `Anytime` is the bucket for supplements with no
/// configured times; it is never stored on a supplement itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleTime {
    Morning,
    Midday,
    Evening,
    Bedtime,
    Anytime,
}

impl ScheduleTime {
    /// Display order of the buckets. Order is significant.
    pub const ORDERED: [ScheduleTime; 5] = [
        ScheduleTime::Morning,
        ScheduleTime::Midday,
        ScheduleTime::Evening,
        ScheduleTime::Bedtime,
        ScheduleTime::Anytime,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ScheduleTime::Morning => "morning",
            ScheduleTime::Midday => "midday",
            ScheduleTime::Evening => "evening",
            ScheduleTime::Bedtime => "bedtime",
            ScheduleTime::Anytime => "anytime",
        }
    }
}

impl fmt::Display for ScheduleTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct ParseScheduleTimeError;

impl FromStr for ScheduleTime {
    type Err = ParseScheduleTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScheduleTime::ORDERED
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or(ParseScheduleTimeError)
    }
}

/// One supplement in one slot of the checklist.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DoseEntry {
    pub supplement_id: Uuid,
    /// `{supplementId}:{slot}`
    pub entry_id: String,
    pub time: ScheduleTime,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dosage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
}

/// The day's checklist, bucketed by slot in fixed display order.
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct DailySchedule {
    pub morning: Vec<DoseEntry>,
    pub midday: Vec<DoseEntry>,
    pub evening: Vec<DoseEntry>,
    pub bedtime: Vec<DoseEntry>,
    pub anytime: Vec<DoseEntry>,
}

impl DailySchedule {
    fn bucket_mut(&mut self, time: ScheduleTime) -> &mut Vec<DoseEntry> {
        match time {
            ScheduleTime::Morning => &mut self.morning,
            ScheduleTime::Midday => &mut self.midday,
            ScheduleTime::Evening => &mut self.evening,
            ScheduleTime::Bedtime => &mut self.bedtime,
            ScheduleTime::Anytime => &mut self.anytime,
        }
    }

    pub fn bucket(&self, time: ScheduleTime) -> &[DoseEntry] {
        match time {
            ScheduleTime::Morning => &self.morning,
            ScheduleTime::Midday => &self.midday,
            ScheduleTime::Evening => &self.evening,
            ScheduleTime::Bedtime => &self.bedtime,
            ScheduleTime::Anytime => &self.anytime,
        }
    }

    /// Buckets in fixed display order.
    pub fn iter(&self) -> impl Iterator<Item = (ScheduleTime, &[DoseEntry])> + '_ {
        ScheduleTime::ORDERED.into_iter().map(|t| (t, self.bucket(t)))
    }

    pub fn entry_count(&self) -> usize {
        self.iter().map(|(_, entries)| entries.len()).sum()
    }
}

/// Groups each supplement into its configured slots, or a single `Anytime`
/// entry when it has none. Malformed fields are coerced to safe defaults:
/// blank names become "Untitled", unrecognized stored times land in
/// `Anytime` rather than failing the whole checklist.
pub fn build_schedule(supplements: &[Supplement]) -> DailySchedule {
    let mut schedule = DailySchedule::default();

    for supplement in supplements {
        let times: Vec<ScheduleTime> = if supplement.schedule_times.is_empty() {
            vec![ScheduleTime::Anytime]
        } else {
            supplement
                .schedule_times
                .iter()
                .map(|t| t.parse().unwrap_or(ScheduleTime::Anytime))
                .collect()
        };

        let name = supplement.name.trim();
        let name = if name.is_empty() { "Untitled" } else { name };

        for time in times {
            let entry_id = format!("{}:{}", supplement.id, time);
            schedule.bucket_mut(time).push(DoseEntry {
                supplement_id: supplement.id,
                entry_id,
                time,
                name: name.to_string(),
                dosage: supplement.dosage.clone(),
                frequency: supplement.frequency.clone(),
            });
        }
    }

    schedule
}

/// ISO date id (`YYYY-MM-DD`) for the UTC day containing `now`. Dose logs
/// are keyed by this id.
pub fn utc_date_id(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d").to_string()
}
