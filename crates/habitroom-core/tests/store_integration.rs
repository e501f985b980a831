//! Habit store over the SQLite repository, including legacy import.

use chrono::NaiveDate;
use habitroom_core::legacy::parse_records;
use habitroom_core::{
    import_legacy, parse_date, Cadence, CadenceKind, HabitDb, HabitSettings, HabitStore,
    StreakConfig, StreakEngine, WeekdaySet,
};

fn date(s: &str) -> NaiveDate {
    parse_date(s).unwrap()
}

#[test]
fn test_full_habit_lifecycle_persists_to_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("habitroom.db");

    let (daily_id, weekly_id) = {
        let db = HabitDb::open_at(&path).unwrap();
        let mut store = HabitStore::open(db, StreakEngine::new(), date("2024-06-07")).unwrap();

        let daily_id = store.add_habit("Read", Cadence::daily()).unwrap().id.clone();
        let weekly_id = store.add_habit("Gym", Cadence::weekly(2)).unwrap().id.clone();

        for d in ["2024-06-05", "2024-06-06"] {
            store.backtrack(&daily_id, d).unwrap();
        }
        store.complete(&daily_id).unwrap();
        store.backtrack(&weekly_id, "2024-06-03").unwrap();
        store.complete(&weekly_id).unwrap();

        assert_eq!(store.habit(&daily_id).unwrap().streak, 3);
        assert_eq!(store.habit(&weekly_id).unwrap().streak, 1);
        (daily_id, weekly_id)
    };

    let db = HabitDb::open_at(&path).unwrap();
    let mut store = HabitStore::open(db, StreakEngine::new(), date("2024-06-07")).unwrap();
    assert_eq!(store.habits().len(), 2);
    assert_eq!(store.habits()[0].id, daily_id);
    assert_eq!(store.habit(&daily_id).unwrap().longest_streak, 3);

    // A week later nothing is current, but the longest streak survives.
    store.set_reference_date(date("2024-06-14")).unwrap();
    let reports = store.reports();
    assert!(reports.iter().all(|r| r.streak == 0));
    assert_eq!(reports[0].longest_streak, 3);

    store.delete_habit(&weekly_id).unwrap();
    let db = store.into_repository();
    assert_eq!(db.completion_rows(&weekly_id).unwrap(), 2);
}

#[test]
fn test_scheduled_days_with_lenient_policy() {
    let db = HabitDb::open_memory().unwrap();
    let engine = StreakEngine::with_config(StreakConfig {
        strict_gap_policy: false,
    });
    let mut store = HabitStore::open(db, engine, date("2024-06-07")).unwrap();
    let id = store
        .add_habit(
            "Stretch",
            Cadence::daily_on(WeekdaySet::parse_list("mon,wed,fri").unwrap()),
        )
        .unwrap()
        .id
        .clone();
    for d in ["2024-06-03", "2024-06-05", "2024-06-07"] {
        store.backtrack(&id, d).unwrap();
    }
    assert_eq!(store.habit(&id).unwrap().streak, 3);

    let settings = HabitSettings {
        scheduled_days: Some(WeekdaySet::EMPTY),
        ..Default::default()
    };
    assert_eq!(store.update_settings(&id, &settings).unwrap().streak, 1);
    assert_eq!(store.habit(&id).unwrap().longest_streak, 3);

    let to_weekly = HabitSettings {
        cadence: Some(CadenceKind::Weekly),
        ..Default::default()
    };
    let habit = store.update_settings(&id, &to_weekly).unwrap();
    assert_eq!(habit.cadence, Cadence::weekly(1));
    assert_eq!(habit.streak, 1);
}

#[test]
fn test_legacy_import_into_store() {
    let json = r#"[
        {"id": "legacy-1", "title": "Read", "trackingType": "daily",
         "completions": ["2024-01-01", "2024-01-02", "2024-01-03"], "longestStreak": 10},
        {"id": "legacy-2", "title": "Gym", "trackingType": "weekly", "weeklyGoal": 2,
         "completions": ["2024-01-01", "oops"]},
        {"id": "legacy-3", "title": "Walk", "type": "daily", "scheduledDays": ["Mon"],
         "completions": ["2024-01-01"]}
    ]"#;
    let (records, rejected) = parse_records(json).unwrap();
    assert!(rejected.is_empty());

    let db = HabitDb::open_memory().unwrap();
    let mut store = HabitStore::open(db, StreakEngine::new(), date("2024-01-03")).unwrap();
    let summary = import_legacy(&mut store, records.clone()).unwrap();

    assert_eq!(summary.imported, 2);
    assert_eq!(summary.rejected.len(), 1);
    assert_eq!(summary.rejected[0].id, "legacy-2");

    let read = store.habit("legacy-1").unwrap();
    assert_eq!(read.streak, 3);
    assert_eq!(read.longest_streak, 10);

    let again = import_legacy(&mut store, records).unwrap();
    assert_eq!(again.imported, 0);
    assert_eq!(again.skipped_existing, 2);
}

#[test]
fn test_corrupt_completion_row_does_not_block_other_habits() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("habitroom.db");

    let (read_id, walk_id) = {
        let db = HabitDb::open_at(&path).unwrap();
        let mut store = HabitStore::open(db, StreakEngine::new(), date("2024-01-02")).unwrap();
        let read_id = store.add_habit("Read", Cadence::daily()).unwrap().id.clone();
        let walk_id = store.add_habit("Walk", Cadence::daily()).unwrap().id.clone();
        store.backtrack(&walk_id, "2024-01-01").unwrap();
        store.complete(&walk_id).unwrap();
        store.complete(&read_id).unwrap();
        (read_id, walk_id)
    };

    let db = HabitDb::open_at(&path).unwrap();
    db.conn()
        .execute(
            "INSERT INTO completions (habit_id, date) VALUES (?1, 'bad-date')",
            [&read_id],
        )
        .unwrap();

    let store = HabitStore::open(db, StreakEngine::new(), date("2024-01-02")).unwrap();
    assert_eq!(store.habits().len(), 2);
    assert_eq!(store.habit(&walk_id).unwrap().streak, 2);
    assert_eq!(store.habit(&read_id).unwrap().streak, 1);
}
