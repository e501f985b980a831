//! Streak engine over a completion-history set.
//!
//! Daily habits are scanned backward one calendar day at a time from the
//! reference date; weekly habits are scanned backward one Sunday-start week at
//! a time. The scan stops at the first gap, so work is bounded by the length of
//! the current streak rather than by the size of the history.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::calendar::{parse_date, previous_day, week_start, WeekdaySet};
use crate::error::ValidationError;
use crate::habit::{Cadence, Habit, WeeklyGoal};
use crate::history::CompletionHistory;

/// Streak computation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakConfig {
    /// When true, a daily walk stops at any day missing from history, even an
    /// unscheduled one. When false, unscheduled days are skipped whether or
    /// not they were completed and only a missing scheduled day ends the walk.
    #[serde(default = "default_strict_gap_policy")]
    pub strict_gap_policy: bool,
}

fn default_strict_gap_policy() -> bool {
    true
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self {
            strict_gap_policy: default_strict_gap_policy(),
        }
    }
}

/// Computes the current streak for one habit.
#[derive(Debug, Clone, Default)]
pub struct StreakEngine {
    config: StreakConfig,
}

impl StreakEngine {
    /// Create an engine with the default (strict) gap policy.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: StreakConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StreakConfig {
        &self.config
    }

    /// Current streak as of `reference`.
    ///
    /// `dates` is the history of this habit only; `None` is treated as an
    /// empty history.
    pub fn compute_streak(
        &self,
        cadence: &Cadence,
        dates: Option<&BTreeSet<NaiveDate>>,
        reference: NaiveDate,
    ) -> u32 {
        let Some(dates) = dates.filter(|d| !d.is_empty()) else {
            return 0;
        };

        match cadence {
            Cadence::Daily { scheduled_days } => {
                self.daily_streak(*scheduled_days, dates, reference)
            }
            Cadence::Weekly { goal } => weekly_streak(*goal, dates, reference),
        }
    }

    /// Current streak for `habit`, looked up in the shared history by id.
    pub fn compute_for(
        &self,
        habit: &Habit,
        history: &CompletionHistory,
        reference: NaiveDate,
    ) -> u32 {
        self.compute_streak(&habit.cadence, history.dates_for(&habit.id), reference)
    }

    /// Current streak from string dates.
    ///
    /// # Errors
    /// Returns `InvalidDate` for the first completion or reference date that is
    /// not a `YYYY-MM-DD` calendar date.
    pub fn compute_streak_str(
        &self,
        cadence: &Cadence,
        dates: &[&str],
        reference: &str,
    ) -> Result<u32, ValidationError> {
        let reference = parse_date(reference)?;
        let dates = dates
            .iter()
            .map(|d| parse_date(d))
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(self.compute_streak(cadence, Some(&dates), reference))
    }

    fn daily_streak(
        &self,
        scheduled_days: WeekdaySet,
        dates: &BTreeSet<NaiveDate>,
        reference: NaiveDate,
    ) -> u32 {
        let mut streak = 0;
        let mut cursor = Some(reference);

        while let Some(day) = cursor {
            let scheduled = scheduled_days.is_scheduled(day);
            if dates.contains(&day) {
                if scheduled {
                    streak += 1;
                }
            } else if scheduled || self.config.strict_gap_policy {
                break;
            }
            cursor = previous_day(day);
        }

        streak
    }
}

fn weekly_streak(goal: WeeklyGoal, dates: &BTreeSet<NaiveDate>, reference: NaiveDate) -> u32 {
    let goal = usize::from(goal.get());
    let mut streak = 0;
    let mut start = week_start(reference);

    loop {
        let end = start
            .checked_add_days(Days::new(6))
            .unwrap_or(NaiveDate::MAX);
        if dates.range(start..=end).count() < goal {
            break;
        }
        streak += 1;
        match start.checked_sub_days(Days::new(7)) {
            Some(previous) => start = previous,
            None => break,
        }
    }

    streak
}
