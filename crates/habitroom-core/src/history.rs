//! Completion history: which calendar days each habit was marked complete.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::calendar::parse_date;
use crate::error::ValidationError;

/// Habit id -> ordered set of completion dates.
///
/// Serialized as a map of id to a list of `YYYY-MM-DD` strings. A date appears
/// at most once per habit, so marking the same day twice is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionHistory {
    entries: HashMap<String, BTreeSet<NaiveDate>>,
}

impl CompletionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completion. Returns `false` if the date was already recorded.
    pub fn mark_complete(&mut self, habit_id: &str, date: NaiveDate) -> bool {
        self.entries
            .entry(habit_id.to_string())
            .or_default()
            .insert(date)
    }

    /// Record a completion given as a `YYYY-MM-DD` string.
    pub fn mark_complete_str(
        &mut self,
        habit_id: &str,
        date: &str,
    ) -> Result<bool, ValidationError> {
        let date = parse_date(date)?;
        Ok(self.mark_complete(habit_id, date))
    }

    /// Merge a set of dates for one habit. Returns how many were new.
    pub fn extend(&mut self, habit_id: &str, dates: impl IntoIterator<Item = NaiveDate>) -> usize {
        let set = self.entries.entry(habit_id.to_string()).or_default();
        dates.into_iter().filter(|d| set.insert(*d)).count()
    }

    /// Completion dates for a habit; `None` when the habit has never been completed.
    pub fn dates_for(&self, habit_id: &str) -> Option<&BTreeSet<NaiveDate>> {
        self.entries.get(habit_id)
    }

    pub fn is_complete(&self, habit_id: &str, date: NaiveDate) -> bool {
        self.entries
            .get(habit_id)
            .is_some_and(|dates| dates.contains(&date))
    }

    pub fn completion_count(&self, habit_id: &str) -> usize {
        self.entries.get(habit_id).map_or(0, BTreeSet::len)
    }

    /// Habit ids with at least one entry.
    pub fn habit_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// All (habit id, date) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, NaiveDate)> {
        self.entries
            .iter()
            .flat_map(|(id, dates)| dates.iter().map(move |d| (id.as_str(), *d)))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(BTreeSet::is_empty)
    }
}
