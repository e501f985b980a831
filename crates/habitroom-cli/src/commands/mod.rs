pub mod config;
pub mod habit;
pub mod import;
pub mod streak;

use chrono::{Local, NaiveDate};
use habitroom_core::{parse_date, Config, HabitDb, HabitStore, StreakEngine};

/// Reference date from `--date`, or today's local date.
pub fn reference_date(date: Option<&str>) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    match date {
        Some(d) => Ok(parse_date(d)?),
        None => Ok(Local::now().date_naive()),
    }
}

/// Open the habit store over the on-disk database, configured from `config.toml`.
pub fn open_store(date: Option<&str>) -> Result<(HabitStore<HabitDb>, Config), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let reference = reference_date(date)?;
    let engine = StreakEngine::with_config(config.streak);
    let store = HabitStore::open(HabitDb::open()?, engine, reference)?
        .with_default_weekly_goal(config.habits.default_weekly_goal);
    tracing::debug!(
        %reference,
        habits = store.habits().len(),
        strict_gap_policy = config.streak.strict_gap_policy,
        "opened habit store"
    );
    Ok((store, config))
}
