mod completion_log;
mod engine;

pub use completion_log::CompletionLogEngine;
pub use engine::{StreakConfig, StreakEngine};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::habit::Habit;
use crate::history::CompletionHistory;

/// Result of recomputing one habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakReport {
    pub habit_id: String,
    pub title: String,
    pub streak: u32,
    pub longest_streak: u32,
}

impl StreakReport {
    pub fn for_habit(habit: &Habit) -> Self {
        Self {
            habit_id: habit.id.clone(),
            title: habit.title.clone(),
            streak: habit.streak,
            longest_streak: habit.longest_streak,
        }
    }
}

/// Recompute every habit's streak as of `reference`.
///
/// Each habit is computed independently from its own history entry and its
/// longest streak is raised when the new streak exceeds it.
pub fn recompute_all(
    habits: &mut [Habit],
    history: &CompletionHistory,
    reference: NaiveDate,
    engine: &StreakEngine,
) -> Vec<StreakReport> {
    habits
        .iter_mut()
        .map(|habit| {
            let streak = engine.compute_for(habit, history, reference);
            habit.record_streak(streak);
            tracing::debug!(
                habit_id = %habit.id,
                streak,
                longest_streak = habit.longest_streak,
                "recomputed streak"
            );
            StreakReport::for_habit(habit)
        })
        .collect()
}
