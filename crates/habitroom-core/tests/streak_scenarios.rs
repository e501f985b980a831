//! Streak scenarios and properties for the history-set engine.

use chrono::NaiveDate;
use habitroom_core::{
    parse_date, Cadence, CompletionHistory, Habit, StreakConfig, StreakEngine, WeekdaySet,
};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn date(s: &str) -> NaiveDate {
    parse_date(s).unwrap()
}

fn history_for(id: &str, dates: &[&str]) -> CompletionHistory {
    let mut history = CompletionHistory::new();
    for d in dates {
        history.mark_complete_str(id, d).unwrap();
    }
    history
}

#[test]
fn test_daily_every_day_three_in_a_row() {
    let habit = Habit::with_id("h", "Read", Cadence::daily()).unwrap();
    let history = history_for("h", &["2024-01-01", "2024-01-02", "2024-01-03"]);
    let streak = StreakEngine::new().compute_for(&habit, &history, date("2024-01-03"));
    assert_eq!(streak, 3);
}

#[test]
fn test_daily_mon_wed_fri_lenient_counts_each_scheduled_day() {
    let cadence = Cadence::daily_on(WeekdaySet::parse_list("Mon,Wed,Fri").unwrap());
    let habit = Habit::with_id("h", "Stretch", cadence).unwrap();
    let history = history_for("h", &["2024-06-03", "2024-06-05", "2024-06-07"]);

    let lenient = StreakEngine::with_config(StreakConfig {
        strict_gap_policy: false,
    });
    assert_eq!(lenient.compute_for(&habit, &history, date("2024-06-07")), 3);

    // The strict walk stops at Thursday, which is absent from history.
    assert_eq!(StreakEngine::new().compute_for(&habit, &history, date("2024-06-07")), 1);
}

#[test]
fn test_daily_strict_walks_through_completed_unscheduled_days() {
    let cadence = Cadence::daily_on(WeekdaySet::parse_list("Mon,Wed,Fri").unwrap());
    let habit = Habit::with_id("h", "Stretch", cadence).unwrap();
    let history = history_for(
        "h",
        &["2024-06-03", "2024-06-04", "2024-06-05", "2024-06-06", "2024-06-07"],
    );
    assert_eq!(StreakEngine::new().compute_for(&habit, &history, date("2024-06-07")), 3);
}

#[test]
fn test_weekly_goal_three_with_short_prior_week() {
    let habit = Habit::with_id("h", "Gym", Cadence::weekly(3)).unwrap();
    let history = history_for(
        "h",
        &["2024-06-02", "2024-06-05", "2024-06-08", "2024-05-28", "2024-05-30"],
    );
    assert_eq!(StreakEngine::new().compute_for(&habit, &history, date("2024-06-08")), 1);
}

#[test]
fn test_empty_history_leaves_longest_unchanged() {
    for cadence in [Cadence::daily(), Cadence::weekly(2)] {
        let mut habit = Habit::with_id("h", "Idle", cadence).unwrap();
        habit.longest_streak = 4;
        let streak = StreakEngine::new().compute_for(&habit, &CompletionHistory::new(), date("2024-06-08"));
        habit.record_streak(streak);
        assert_eq!(habit.streak, 0);
        assert_eq!(habit.longest_streak, 4);
    }
}

#[test]
fn test_weekly_goal_zero_treated_as_one() {
    let zero = Habit::with_id("h", "Gym", Cadence::weekly(0)).unwrap();
    let history = history_for("h", &["2024-06-04", "2024-05-29"]);
    let engine = StreakEngine::new();
    assert_eq!(engine.compute_for(&zero, &history, date("2024-06-05")), 2);
    assert_eq!(zero.cadence, Cadence::weekly(1));
}

fn base() -> NaiveDate {
    date("2024-01-01")
}

fn offsets_to_dates(offsets: &BTreeSet<u64>) -> BTreeSet<NaiveDate> {
    offsets
        .iter()
        .map(|o| base().checked_add_days(chrono::Days::new(*o)).unwrap())
        .collect()
}

fn cadence_strategy() -> impl Strategy<Value = Cadence> {
    prop_oneof![
        (0u8..128).prop_map(|mask| {
            let indices = (0..7u8).filter(|i| mask & (1 << i) != 0);
            Cadence::daily_on(WeekdaySet::from_indices(indices).unwrap())
        }),
        (-3i64..10).prop_map(Cadence::weekly),
    ]
}

proptest! {
    #[test]
    fn prop_streak_is_idempotent(
        cadence in cadence_strategy(),
        offsets in prop::collection::btree_set(0u64..90, 0..60),
        reference in 0u64..100,
        strict in any::<bool>(),
    ) {
        let engine = StreakEngine::with_config(StreakConfig { strict_gap_policy: strict });
        let dates = offsets_to_dates(&offsets);
        let reference = base().checked_add_days(chrono::Days::new(reference)).unwrap();
        let first = engine.compute_streak(&cadence, Some(&dates), reference);
        let second = engine.compute_streak(&cadence, Some(&dates), reference);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_every_day_habit_absent_reference_is_zero(
        offsets in prop::collection::btree_set(0u64..90, 0..60),
        reference in 0u64..100,
        strict in any::<bool>(),
    ) {
        let engine = StreakEngine::with_config(StreakConfig { strict_gap_policy: strict });
        let dates = offsets_to_dates(&offsets);
        let reference = base().checked_add_days(chrono::Days::new(reference)).unwrap();
        prop_assume!(!dates.contains(&reference));
        prop_assert_eq!(engine.compute_streak(&Cadence::daily(), Some(&dates), reference), 0);
    }

    #[test]
    fn prop_daily_streak_bounded_by_completions(
        cadence in cadence_strategy(),
        offsets in prop::collection::btree_set(0u64..90, 0..60),
        reference in 0u64..100,
    ) {
        let dates = offsets_to_dates(&offsets);
        let reference = base().checked_add_days(chrono::Days::new(reference)).unwrap();
        let streak = StreakEngine::new().compute_streak(&cadence, Some(&dates), reference);
        if let Cadence::Daily { .. } = cadence {
            let on_or_before = dates.iter().filter(|d| **d <= reference).count();
            prop_assert!(streak as usize <= on_or_before);
        }
    }

    #[test]
    fn prop_lenient_never_below_strict(
        mask in 0u8..128,
        offsets in prop::collection::btree_set(0u64..90, 0..60),
        reference in 0u64..100,
    ) {
        let cadence = Cadence::daily_on(
            WeekdaySet::from_indices((0..7u8).filter(|i| mask & (1 << i) != 0)).unwrap(),
        );
        let dates = offsets_to_dates(&offsets);
        let reference = base().checked_add_days(chrono::Days::new(reference)).unwrap();
        let strict = StreakEngine::new().compute_streak(&cadence, Some(&dates), reference);
        let lenient = StreakEngine::with_config(StreakConfig { strict_gap_policy: false })
            .compute_streak(&cadence, Some(&dates), reference);
        prop_assert!(lenient >= strict);
    }

    #[test]
    fn prop_longest_streak_never_decreases(
        offsets in prop::collection::btree_set(0u64..60, 0..50),
        references in prop::collection::vec(0u64..70, 1..10),
    ) {
        let mut habit = Habit::with_id("h", "Read", Cadence::daily()).unwrap();
        let mut history = CompletionHistory::new();
        history.extend("h", offsets_to_dates(&offsets));
        let engine = StreakEngine::new();

        let mut previous_longest = 0;
        for r in references {
            let reference = base().checked_add_days(chrono::Days::new(r)).unwrap();
            let streak = engine.compute_for(&habit, &history, reference);
            habit.record_streak(streak);
            prop_assert!(habit.longest_streak >= previous_longest);
            prop_assert!(habit.longest_streak >= habit.streak);
            previous_longest = habit.longest_streak;
        }
    }
}
