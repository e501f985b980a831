//! Import of the older record shape, where each habit carried its own list of
//! completion date strings instead of sharing a completion history.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::calendar::{parse_date, WeekdaySet};
use crate::error::{Result, ValidationError};
use crate::habit::{Cadence, CadenceKind, Habit};
use crate::storage::HabitRepository;
use crate::store::HabitStore;
use crate::streak::CompletionLogEngine;

/// One habit as stored by the older format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyHabit {
    pub id: String,
    pub title: String,
    #[serde(alias = "type")]
    pub tracking_type: CadenceKind,
    #[serde(default)]
    pub completions: Vec<String>,
    #[serde(default)]
    pub scheduled_days: Option<WeekdaySet>,
    #[serde(default)]
    pub weekly_goal: Option<i64>,
    #[serde(default)]
    pub longest_streak: u32,
}

impl LegacyHabit {
    pub fn cadence(&self) -> Cadence {
        match self.tracking_type {
            CadenceKind::Daily => Cadence::daily_on(self.scheduled_days.unwrap_or_default()),
            CadenceKind::Weekly => Cadence::weekly(self.weekly_goal.unwrap_or(1)),
        }
    }

    /// Parsed completion dates, duplicates removed.
    pub fn completion_dates(&self) -> Result<BTreeSet<NaiveDate>, ValidationError> {
        self.completions.iter().map(|c| parse_date(c)).collect()
    }

    /// Streak computed directly from the stored completion list.
    pub fn streak_at(
        &self,
        reference: NaiveDate,
        engine: &CompletionLogEngine,
    ) -> Result<u32, ValidationError> {
        engine.compute(&self.cadence(), self.completions.as_slice(), reference)
    }

    /// Split into a habit (keeping its recorded longest streak) and its dates.
    pub fn into_parts(self) -> Result<(Habit, BTreeSet<NaiveDate>), ValidationError> {
        let dates = self.completion_dates()?;
        let mut habit = Habit::with_id(self.id.clone(), &self.title, self.cadence())?;
        habit.longest_streak = self.longest_streak;
        Ok((habit, dates))
    }
}

/// A record that could not be imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedRecord {
    /// Record id, or its position in the file when it has no readable id.
    pub id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped_existing: usize,
    pub rejected: Vec<RejectedRecord>,
    /// Streak of each imported habit, computed from the record's own
    /// completion list as of the store's reference date.
    #[serde(default)]
    pub streaks: BTreeMap<String, u32>,
}

/// Parse a JSON array of legacy records.
///
/// Records are decoded one at a time so that a malformed record is reported
/// in the second list instead of failing the whole file.
pub fn parse_records(json: &str) -> Result<(Vec<LegacyHabit>, Vec<RejectedRecord>)> {
    let values: Vec<serde_json::Value> = serde_json::from_str(json)?;
    let mut records = Vec::new();
    let mut rejected = Vec::new();

    for (index, value) in values.into_iter().enumerate() {
        let id = value
            .get("id")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("#{index}"));
        match serde_json::from_value::<LegacyHabit>(value) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(record = %id, "rejected legacy record: {e}");
                rejected.push(RejectedRecord {
                    id,
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok((records, rejected))
}

/// Import legacy records into a store.
///
/// Each record is converted independently; one with a malformed date is
/// rejected without affecting the others. The streak of every new record is
/// computed from its completion list and checked against the store's own
/// computation after import.
pub fn import_legacy<R: HabitRepository>(
    store: &mut HabitStore<R>,
    records: Vec<LegacyHabit>,
) -> Result<ImportSummary> {
    let mut summary = ImportSummary::default();
    let mut parts = Vec::new();
    let log_engine = CompletionLogEngine::with_config(*store.engine().config());
    let reference = store.reference_date();

    for record in records {
        let id = record.id.clone();
        let converted = record
            .streak_at(reference, &log_engine)
            .and_then(|streak| Ok((streak, record.into_parts()?)));
        match converted {
            Ok((streak, part)) => {
                if store.habit(&id).is_none() {
                    summary.streaks.insert(id, streak);
                }
                parts.push(part);
            }
            Err(e) => {
                tracing::warn!(record = %id, "rejected legacy record: {e}");
                summary.rejected.push(RejectedRecord {
                    id,
                    reason: e.to_string(),
                });
            }
        }
    }

    let offered = parts.len();
    summary.imported = store.import(parts)?;
    summary.skipped_existing = offered - summary.imported;

    for (id, &streak) in &summary.streaks {
        if let Some(habit) = store.habit(id) {
            if habit.streak != streak {
                tracing::warn!(
                    habit_id = %id,
                    record_streak = streak,
                    store_streak = habit.streak,
                    "imported streak differs from completion list"
                );
            }
        }
    }
    tracing::info!(
        imported = summary.imported,
        rejected = summary.rejected.len(),
        "legacy import finished"
    );
    Ok(summary)
}
