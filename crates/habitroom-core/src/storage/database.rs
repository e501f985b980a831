//! SQLite-backed habit repository.
//!
//! Stores habits (with their derived streak fields) and completion dates.
//! Completions are only ever inserted; a save never deletes history rows.
//!
//! Rows that cannot be decoded are skipped on load with a warning so that the
//! remaining habits still load. Unreadable habit rows are left in the table
//! by later saves.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::path::Path;

use super::data_dir;
use super::migrations;
use super::repository::{HabitRepository, StoreSnapshot};
use crate::calendar::{format_date, parse_date};
use crate::error::{DatabaseError, Result};
use crate::habit::{Cadence, Habit};
use crate::history::CompletionHistory;

const DB_FILE: &str = "habitroom.db";

/// SQLite database for habits and completion history.
pub struct HabitDb {
    conn: Connection,
    unreadable: RefCell<BTreeSet<String>>,
}

impl HabitDb {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data_dir>/habitroom.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join(DB_FILE);
        Self::open_at(&path)
    }

    /// Open (or create) a database file at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self {
            conn,
            unreadable: RefCell::new(BTreeSet::new()),
        })
    }

    /// Ids of habit rows skipped by the last load because they could not be decoded.
    pub fn unreadable_habits(&self) -> Vec<String> {
        self.unreadable.borrow().iter().cloned().collect()
    }

    fn load_habits(&self) -> Result<Vec<Habit>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, cadence, streak, longest_streak, created_at
             FROM habits
             ORDER BY position, created_at",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, u32>(3)?,
                row.get::<_, u32>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut habits = Vec::new();
        let mut unreadable = BTreeSet::new();
        for row in rows {
            let (id, title, cadence, streak, longest_streak, created_at) = row?;
            let cadence = match serde_json::from_str::<Cadence>(&cadence) {
                Ok(cadence) => cadence,
                Err(e) => {
                    tracing::warn!(habit_id = %id, "skipping habit with unreadable cadence: {e}");
                    unreadable.insert(id);
                    continue;
                }
            };
            let created_at = match DateTime::parse_from_rfc3339(&created_at) {
                Ok(ts) => ts.with_timezone(&Utc),
                Err(e) => {
                    tracing::warn!(habit_id = %id, "skipping habit with unreadable created_at: {e}");
                    unreadable.insert(id);
                    continue;
                }
            };
            habits.push(Habit {
                id,
                title,
                cadence,
                streak,
                longest_streak,
                created_at,
            });
        }
        *self.unreadable.borrow_mut() = unreadable;
        Ok(habits)
    }

    fn load_history(&self) -> Result<CompletionHistory> {
        let mut stmt = self
            .conn
            .prepare("SELECT habit_id, date FROM completions ORDER BY habit_id, date")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut history = CompletionHistory::new();
        for row in rows {
            let (habit_id, date) = row?;
            match parse_date(&date) {
                Ok(date) => {
                    history.mark_complete(&habit_id, date);
                }
                Err(e) => tracing::warn!(%habit_id, "skipping completion row: {e}"),
            }
        }
        Ok(history)
    }

    /// Number of stored completion rows for a habit.
    pub fn completion_rows(&self, habit_id: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM completions WHERE habit_id = ?1",
            params![habit_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

impl HabitRepository for HabitDb {
    fn load(&self) -> Result<StoreSnapshot> {
        Ok(StoreSnapshot {
            habits: self.load_habits()?,
            history: self.load_history()?,
        })
    }

    fn save(&mut self, snapshot: &StoreSnapshot) -> Result<()> {
        let unreadable = self.unreadable.borrow();
        let tx = self.conn.transaction()?;
        {
            let stored: Vec<String> = tx
                .prepare("SELECT id FROM habits")?
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<rusqlite::Result<_>>()?;
            for id in stored.iter().filter(|id| !unreadable.contains(*id)) {
                tx.execute("DELETE FROM habits WHERE id = ?1", params![id])?;
            }

            let mut insert_habit = tx.prepare(
                "INSERT OR REPLACE INTO habits (id, title, cadence, streak, longest_streak, created_at, position)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for (position, habit) in snapshot.habits.iter().enumerate() {
                insert_habit.execute(params![
                    habit.id,
                    habit.title,
                    serde_json::to_string(&habit.cadence)?,
                    habit.streak,
                    habit.longest_streak,
                    habit.created_at.to_rfc3339(),
                    position as i64,
                ])?;
            }

            let mut insert_completion = tx.prepare(
                "INSERT OR IGNORE INTO completions (habit_id, date) VALUES (?1, ?2)",
            )?;
            for (habit_id, date) in snapshot.history.iter() {
                insert_completion.execute(params![habit_id, format_date(date)])?;
            }
        }

        tx.commit()?;
        tracing::debug!(habits = snapshot.habits.len(), "saved habit snapshot");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::WeekdaySet;

    fn sample_snapshot() -> StoreSnapshot {
        let mut daily = Habit::with_id(
            "daily",
            "Stretch",
            Cadence::daily_on(WeekdaySet::parse_list("mon,wed").unwrap()),
        )
        .unwrap();
        daily.record_streak(2);
        let weekly = Habit::with_id("weekly", "Gym", Cadence::weekly(3)).unwrap();

        let mut history = CompletionHistory::new();
        history.mark_complete_str("daily", "2024-06-03").unwrap();
        history.mark_complete_str("daily", "2024-06-05").unwrap();
        history.mark_complete_str("weekly", "2024-06-04").unwrap();

        StoreSnapshot {
            habits: vec![daily, weekly],
            history,
        }
    }

    #[test]
    fn test_empty_database_loads_empty_snapshot() {
        let db = HabitDb::open_memory().unwrap();
        assert_eq!(db.load().unwrap(), StoreSnapshot::default());
    }

    #[test]
    fn test_save_and_load_preserves_order_and_fields() {
        let mut db = HabitDb::open_memory().unwrap();
        let snapshot = sample_snapshot();
        db.save(&snapshot).unwrap();

        let loaded = db.load().unwrap();
        assert_eq!(loaded.habits.len(), 2);
        assert_eq!(loaded.habits[0].id, "daily");
        assert_eq!(loaded.habits[0].cadence, snapshot.habits[0].cadence);
        assert_eq!(loaded.habits[0].longest_streak, 2);
        assert_eq!(loaded.habits[1].cadence, Cadence::weekly(3));
        assert_eq!(loaded.history, snapshot.history);
    }

    #[test]
    fn test_save_removes_deleted_habits_but_keeps_history() {
        let mut db = HabitDb::open_memory().unwrap();
        let mut snapshot = sample_snapshot();
        db.save(&snapshot).unwrap();

        snapshot.habits.retain(|h| h.id != "weekly");
        db.save(&snapshot).unwrap();

        let loaded = db.load().unwrap();
        assert_eq!(loaded.habits.len(), 1);
        assert_eq!(db.completion_rows("weekly").unwrap(), 1);
    }

    #[test]
    fn test_corrupt_date_row_is_skipped() {
        let mut db = HabitDb::open_memory().unwrap();
        db.save(&sample_snapshot()).unwrap();
        db.conn()
            .execute(
                "INSERT INTO completions (habit_id, date) VALUES ('daily', 'not-a-date')",
                [],
            )
            .unwrap();

        let loaded = db.load().unwrap();
        assert_eq!(loaded.habits.len(), 2);
        assert_eq!(loaded.history.completion_count("daily"), 2);
        assert_eq!(loaded.history.completion_count("weekly"), 1);
    }

    #[test]
    fn test_unreadable_habit_is_skipped_and_kept_on_save() {
        let mut db = HabitDb::open_memory().unwrap();
        db.save(&sample_snapshot()).unwrap();
        db.conn()
            .execute("UPDATE habits SET cadence = 'garbage' WHERE id = 'daily'", [])
            .unwrap();

        let loaded = db.load().unwrap();
        assert_eq!(loaded.habits.len(), 1);
        assert_eq!(loaded.habits[0].id, "weekly");
        assert_eq!(db.unreadable_habits(), vec!["daily".to_string()]);

        db.save(&loaded).unwrap();
        let rows: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM habits", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 2);
    }
}
