//! Habit management commands for CLI.

use clap::Subcommand;
use habitroom_core::{Cadence, CadenceKind, HabitSettings, WeekdaySet};
use serde_json::json;

use super::open_store;

#[derive(Subcommand)]
pub enum HabitAction {
    /// Add a new habit (daily by default)
    Add {
        /// Habit title
        title: String,
        /// Track per week instead of per day
        #[arg(long)]
        weekly: bool,
        /// Completions needed per week (1-7)
        #[arg(long, requires = "weekly", allow_negative_numbers = true)]
        goal: Option<i64>,
        /// Scheduled weekdays for a daily habit, e.g. "mon,wed,fri"
        #[arg(long, conflicts_with = "weekly")]
        days: Option<String>,
    },
    /// List habits with their streaks
    List {
        /// Reference date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Get habit details
    Get {
        /// Habit ID
        id: String,
        /// Reference date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Update habit settings
    Settings {
        /// Habit ID
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// Switch cadence: daily or weekly
        #[arg(long)]
        cadence: Option<String>,
        /// Scheduled weekdays for a daily habit, e.g. "mon,wed,fri"
        #[arg(long, conflicts_with = "every_day")]
        days: Option<String>,
        /// Schedule a daily habit on every day
        #[arg(long)]
        every_day: bool,
        /// Completions needed per week for a weekly habit (1-7)
        #[arg(long, allow_negative_numbers = true)]
        goal: Option<i64>,
    },
    /// Delete a habit
    Delete {
        /// Habit ID
        id: String,
    },
    /// Mark a habit complete on the reference date
    Complete {
        /// Habit ID
        id: String,
        /// Reference date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Mark a habit complete on a past date
    Backtrack {
        /// Habit ID
        id: String,
        /// Completion date (YYYY-MM-DD)
        date: String,
    },
}

pub fn run(action: HabitAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        HabitAction::Add {
            title,
            weekly,
            goal,
            days,
        } => {
            let (mut store, config) = open_store(None)?;
            let cadence = if weekly {
                match goal {
                    Some(g) => Cadence::weekly(g),
                    None => Cadence::Weekly {
                        goal: config.habits.default_weekly_goal,
                    },
                }
            } else {
                let scheduled = match days {
                    Some(d) => WeekdaySet::parse_list(&d)?,
                    None => WeekdaySet::EMPTY,
                };
                Cadence::daily_on(scheduled)
            };
            let habit = store.add_habit(&title, cadence)?;
            println!("{}", serde_json::to_string_pretty(habit)?);
        }
        HabitAction::List { date } => {
            let (store, _) = open_store(date.as_deref())?;
            println!("{}", serde_json::to_string_pretty(store.habits())?);
        }
        HabitAction::Get { id, date } => {
            let (store, _) = open_store(date.as_deref())?;
            let habit = store.habit(&id).ok_or(format!("Habit not found: {id}"))?;
            let dates: Vec<String> = store
                .history()
                .dates_for(&id)
                .map(|set| set.iter().map(|d| habitroom_core::format_date(*d)).collect())
                .unwrap_or_default();
            let out = json!({
                "habit": habit,
                "completions": dates,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        HabitAction::Settings {
            id,
            title,
            cadence,
            days,
            every_day,
            goal,
        } => {
            let scheduled_days = if every_day {
                Some(WeekdaySet::EMPTY)
            } else {
                days.as_deref().map(WeekdaySet::parse_list).transpose()?
            };
            let settings = HabitSettings {
                title,
                cadence: cadence.as_deref().map(str::parse::<CadenceKind>).transpose()?,
                scheduled_days,
                weekly_goal: goal,
            };
            if settings.is_empty() {
                return Err("no settings given".into());
            }

            let (mut store, _) = open_store(None)?;
            let habit = store.update_settings(&id, &settings)?;
            println!("{}", serde_json::to_string_pretty(habit)?);
        }
        HabitAction::Delete { id } => {
            let (mut store, _) = open_store(None)?;
            store.delete_habit(&id)?;
            println!("Habit deleted: {id}");
        }
        HabitAction::Complete { id, date } => {
            let (mut store, _) = open_store(date.as_deref())?;
            let changed = store.complete(&id)?;
            print_completion(&store, &id, changed)?;
        }
        HabitAction::Backtrack { id, date } => {
            let (mut store, _) = open_store(None)?;
            let changed = store.backtrack(&id, &date)?;
            print_completion(&store, &id, changed)?;
        }
    }
    Ok(())
}

fn print_completion<R: habitroom_core::HabitRepository>(
    store: &habitroom_core::HabitStore<R>,
    id: &str,
    changed: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let habit = store.habit(id).ok_or(format!("Habit not found: {id}"))?;
    let out = json!({
        "id": habit.id,
        "recorded": changed,
        "streak": habit.streak,
        "longest_streak": habit.longest_streak,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
