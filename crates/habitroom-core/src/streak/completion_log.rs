//! Streak computation for habits that carry their completions as a list of
//! date strings.
//!
//! Instead of probing a date set day by day, this walks the sorted completion
//! list and checks the day distance between neighbours (daily) or buckets the
//! list into Sunday-start week windows (weekly). For the same dates, cadence
//! and gap policy it returns the same streak as [`StreakEngine`].
//!
//! [`StreakEngine`]: super::StreakEngine

use chrono::{Days, NaiveDate};
use std::collections::HashMap;

use super::engine::StreakConfig;
use crate::calendar::{parse_date, previous_day, week_start, WeekdaySet};
use crate::error::ValidationError;
use crate::habit::{Cadence, WeeklyGoal};

#[derive(Debug, Clone, Default)]
pub struct CompletionLogEngine {
    config: StreakConfig,
}

impl CompletionLogEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: StreakConfig) -> Self {
        Self { config }
    }

    /// Current streak as of `reference` from raw completion strings.
    ///
    /// Duplicate entries are ignored.
    ///
    /// # Errors
    /// Returns `InvalidDate` if any completion is not a `YYYY-MM-DD` date.
    pub fn compute<S: AsRef<str>>(
        &self,
        cadence: &Cadence,
        completions: &[S],
        reference: NaiveDate,
    ) -> Result<u32, ValidationError> {
        let mut dates = completions
            .iter()
            .map(|c| parse_date(c.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        dates.sort_unstable_by(|a, b| b.cmp(a));
        dates.dedup();

        Ok(match cadence {
            Cadence::Daily { scheduled_days } => {
                self.daily_streak(*scheduled_days, &dates, reference)
            }
            Cadence::Weekly { goal } => weekly_streak(*goal, &dates, reference),
        })
    }

    /// `newest_first` must be sorted descending without duplicates.
    fn daily_streak(
        &self,
        scheduled_days: WeekdaySet,
        newest_first: &[NaiveDate],
        reference: NaiveDate,
    ) -> u32 {
        let mut streak = 0;
        // Latest day not yet accounted for.
        let mut expected = reference;

        for &completion in newest_first.iter().filter(|d| **d <= reference) {
            if !self.gap_allowed(scheduled_days, completion, expected) {
                break;
            }
            if scheduled_days.is_scheduled(completion) {
                streak += 1;
            }
            match previous_day(completion) {
                Some(day) => expected = day,
                None => break,
            }
        }

        streak
    }

    /// Whether the days strictly after `completion` up to and including
    /// `expected` may be absent.
    fn gap_allowed(&self, scheduled_days: WeekdaySet, completion: NaiveDate, expected: NaiveDate) -> bool {
        let distance = (expected - completion).num_days();
        if distance == 0 {
            return true;
        }
        // Any seven consecutive days contain a scheduled day.
        if self.config.strict_gap_policy || distance >= 7 {
            return false;
        }
        (1..=distance as u64).all(|offset| {
            completion
                .checked_add_days(Days::new(offset))
                .is_some_and(|day| !scheduled_days.is_scheduled(day))
        })
    }
}

fn weekly_streak(goal: WeeklyGoal, dates: &[NaiveDate], reference: NaiveDate) -> u32 {
    let mut per_week: HashMap<NaiveDate, usize> = HashMap::new();
    for date in dates {
        *per_week.entry(week_start(*date)).or_default() += 1;
    }

    let goal = usize::from(goal.get());
    let mut streak = 0;
    let mut window = week_start(reference);
    while per_week.get(&window).copied().unwrap_or(0) >= goal {
        streak += 1;
        match window.checked_sub_days(Days::new(7)) {
            Some(previous) => window = previous,
            None => break,
        }
    }
    streak
}
