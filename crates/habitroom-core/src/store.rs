//! Habit store: the habit list, the completion history and the reference date.
//!
//! The store owns an injected [`HabitRepository`]. Every mutation recomputes
//! all streaks with [`recompute_all`] and then saves a full snapshot, so the
//! derived `streak`/`longest_streak` fields on disk always match the history.

use chrono::NaiveDate;
use std::collections::BTreeSet;

use crate::calendar::parse_date;
use crate::error::{CoreError, Result};
use crate::habit::{Cadence, Habit, HabitSettings, WeeklyGoal};
use crate::history::CompletionHistory;
use crate::storage::{HabitRepository, StoreSnapshot};
use crate::streak::{recompute_all, StreakEngine, StreakReport};

pub struct HabitStore<R: HabitRepository> {
    repo: R,
    engine: StreakEngine,
    habits: Vec<Habit>,
    history: CompletionHistory,
    reference: NaiveDate,
    default_weekly_goal: WeeklyGoal,
}

impl<R: HabitRepository> HabitStore<R> {
    /// Load the saved snapshot and compute every streak as of `reference`.
    ///
    /// The snapshot is saved back only when the recomputation changed a
    /// stored `streak` or `longest_streak`, so the running maximum survives
    /// the next open at another date.
    ///
    /// # Errors
    /// Returns an error if the repository cannot be read or written.
    pub fn open(repo: R, engine: StreakEngine, reference: NaiveDate) -> Result<Self> {
        let StoreSnapshot { habits, history } = repo.load()?;
        let stored: Vec<(u32, u32)> = habits.iter().map(|h| (h.streak, h.longest_streak)).collect();
        let mut store = Self {
            repo,
            engine,
            habits,
            history,
            reference,
            default_weekly_goal: WeeklyGoal::default(),
        };
        store.recompute();

        let changed = store
            .habits
            .iter()
            .zip(&stored)
            .any(|(h, &(streak, longest))| h.streak != streak || h.longest_streak != longest);
        if changed {
            tracing::debug!(%reference, "streaks changed on open, saving");
            store.commit()?;
        }
        Ok(store)
    }

    /// Goal used when a habit is switched to weekly without an explicit goal.
    pub fn with_default_weekly_goal(mut self, goal: WeeklyGoal) -> Self {
        self.default_weekly_goal = goal;
        self
    }

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn habit(&self, id: &str) -> Option<&Habit> {
        self.habits.iter().find(|h| h.id == id)
    }

    pub fn history(&self) -> &CompletionHistory {
        &self.history
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference
    }

    pub fn engine(&self) -> &StreakEngine {
        &self.engine
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn into_repository(self) -> R {
        self.repo
    }

    /// Current streak reports, in habit order.
    pub fn reports(&self) -> Vec<StreakReport> {
        self.habits.iter().map(StreakReport::for_habit).collect()
    }

    /// Add a new habit.
    ///
    /// # Errors
    /// Returns an error if the title is blank or the snapshot cannot be saved.
    pub fn add_habit(&mut self, title: &str, cadence: Cadence) -> Result<&Habit> {
        let habit = Habit::new(title, cadence)?;
        let id = habit.id.clone();
        tracing::info!(habit_id = %id, title = %habit.title, "added habit");
        self.habits.push(habit);
        self.commit()?;
        self.habits.last().ok_or(CoreError::HabitNotFound(id))
    }

    /// Apply a settings update to one habit.
    ///
    /// # Errors
    /// Returns `HabitNotFound` for an unknown id, a validation error when the
    /// update does not fit the habit's cadence, or a save error.
    pub fn update_settings(&mut self, id: &str, settings: &HabitSettings) -> Result<&Habit> {
        let default_goal = self.default_weekly_goal;
        let index = self.index_of(id)?;
        self.habits[index].apply_settings(settings, default_goal)?;
        tracing::info!(habit_id = %id, "updated habit settings");
        self.commit()?;
        Ok(&self.habits[index])
    }

    /// Remove a habit. Its completion history is left in place.
    pub fn delete_habit(&mut self, id: &str) -> Result<Habit> {
        let index = self.index_of(id)?;
        let removed = self.habits.remove(index);
        tracing::info!(habit_id = %id, "deleted habit");
        self.commit()?;
        Ok(removed)
    }

    /// Mark a habit complete on the reference date.
    ///
    /// Returns `false` if it was already complete on that date.
    pub fn complete(&mut self, id: &str) -> Result<bool> {
        let date = self.reference;
        self.complete_on(id, date)
    }

    /// Mark a habit complete on a past (or any other) date given as `YYYY-MM-DD`.
    ///
    /// # Errors
    /// Returns `InvalidDate` for a malformed date and `HabitNotFound` for an
    /// unknown id.
    pub fn backtrack(&mut self, id: &str, date: &str) -> Result<bool> {
        let date = parse_date(date)?;
        self.complete_on(id, date)
    }

    pub fn complete_on(&mut self, id: &str, date: NaiveDate) -> Result<bool> {
        self.index_of(id)?;
        if !self.history.mark_complete(id, date) {
            tracing::debug!(habit_id = %id, %date, "completion already recorded");
            return Ok(false);
        }
        tracing::info!(habit_id = %id, %date, "recorded completion");
        self.commit()?;
        Ok(true)
    }

    /// Move the reference date and recompute every streak.
    pub fn set_reference_date(&mut self, date: NaiveDate) -> Result<Vec<StreakReport>> {
        self.reference = date;
        self.commit()?;
        Ok(self.reports())
    }

    /// Recompute every streak without saving.
    pub fn recompute(&mut self) -> Vec<StreakReport> {
        recompute_all(&mut self.habits, &self.history, self.reference, &self.engine)
    }

    /// Add habits that already have ids, together with their completion dates.
    ///
    /// Habits whose id already exists are skipped; returns how many were added.
    pub fn import(&mut self, records: Vec<(Habit, BTreeSet<NaiveDate>)>) -> Result<usize> {
        let mut added = 0;
        for (habit, dates) in records {
            if self.habit(&habit.id).is_some() {
                tracing::warn!(habit_id = %habit.id, "skipping import of existing habit");
                continue;
            }
            self.history.extend(&habit.id, dates);
            self.habits.push(habit);
            added += 1;
        }
        if added > 0 {
            self.commit()?;
        }
        Ok(added)
    }

    fn index_of(&self, id: &str) -> Result<usize> {
        self.habits
            .iter()
            .position(|h| h.id == id)
            .ok_or_else(|| CoreError::HabitNotFound(id.to_string()))
    }

    fn commit(&mut self) -> Result<()> {
        self.recompute();
        let snapshot = StoreSnapshot {
            habits: self.habits.clone(),
            history: self.history.clone(),
        };
        self.repo.save(&snapshot)
    }
}
