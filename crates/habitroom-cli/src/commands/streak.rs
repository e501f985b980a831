use clap::Subcommand;
use habitroom_core::StreakReport;

use super::open_store;

#[derive(Subcommand)]
pub enum StreakAction {
    /// Streak of one habit
    Show {
        /// Habit ID
        id: String,
        /// Reference date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Streaks of all habits
    All {
        /// Reference date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
    },
}

pub fn run(action: StreakAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        StreakAction::Show { id, date } => {
            let (store, _) = open_store(date.as_deref())?;
            let habit = store.habit(&id).ok_or(format!("Habit not found: {id}"))?;
            let report = StreakReport::for_habit(habit);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        StreakAction::All { date } => {
            let (store, _) = open_store(date.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&store.reports())?);
        }
    }
    Ok(())
}
