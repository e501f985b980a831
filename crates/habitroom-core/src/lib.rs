//! # Habitroom Core Library
//!
//! Core logic for tracking recurring habits and the streaks they build.
//! The CLI binary is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Streak engine**: pure functions that turn a habit's cadence and its
//!   completion dates into a current streak (daily day-by-day scan, weekly
//!   Sunday-start week scan)
//! - **Habit store**: the habit list plus completion history, recomputed
//!   eagerly after every mutation and persisted through an injected repository
//! - **Storage**: SQLite-backed repository and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`StreakEngine`]: streak computation over a completion-history set
//! - [`CompletionLogEngine`]: the same computation over a list of date strings
//! - [`HabitStore`]: habit lifecycle and recomputation
//! - [`HabitDb`]: SQLite persistence
//! - [`Config`]: application configuration management

pub mod calendar;
pub mod error;
pub mod habit;
pub mod history;
pub mod legacy;
pub mod storage;
pub mod store;
pub mod streak;

pub use calendar::{format_date, parse_date, WeekdaySet};
pub use error::{ConfigError, CoreError, DatabaseError, Result, ValidationError};
pub use habit::{Cadence, CadenceKind, Habit, HabitSettings, WeeklyGoal};
pub use history::CompletionHistory;
pub use legacy::{import_legacy, ImportSummary, LegacyHabit};
pub use storage::{Config, HabitDb, HabitRepository, MemoryRepository, StoreSnapshot};
pub use store::HabitStore;
pub use streak::{recompute_all, CompletionLogEngine, StreakConfig, StreakEngine, StreakReport};
