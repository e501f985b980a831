//! Habit definitions.
//!
//! A habit carries its cadence as a tagged variant so that daily-only and
//! weekly-only settings cannot be mixed. The `streak` and `longest_streak`
//! fields are derived; only [`Habit::record_streak`] writes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::calendar::WeekdaySet;
use crate::error::ValidationError;

/// Minimum completions per Sunday-start week for a weekly habit.
///
/// Always within `1..=7`; out-of-range inputs are clamped rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub struct WeeklyGoal(u8);

impl WeeklyGoal {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 7;

    pub fn new(goal: i64) -> Self {
        Self(goal.clamp(i64::from(Self::MIN), i64::from(Self::MAX)) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for WeeklyGoal {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl From<i64> for WeeklyGoal {
    fn from(goal: i64) -> Self {
        Self::new(goal)
    }
}

impl From<WeeklyGoal> for u8 {
    fn from(goal: WeeklyGoal) -> Self {
        goal.0
    }
}

/// How a habit is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Cadence {
    /// Tracked per calendar day, optionally only on some weekdays.
    Daily {
        #[serde(default)]
        scheduled_days: WeekdaySet,
    },
    /// Tracked per Sunday-start week against a completion goal.
    Weekly {
        #[serde(default)]
        goal: WeeklyGoal,
    },
}

impl Cadence {
    /// Daily, every day.
    pub fn daily() -> Self {
        Cadence::Daily {
            scheduled_days: WeekdaySet::EMPTY,
        }
    }

    pub fn daily_on(scheduled_days: WeekdaySet) -> Self {
        Cadence::Daily { scheduled_days }
    }

    pub fn weekly(goal: i64) -> Self {
        Cadence::Weekly {
            goal: WeeklyGoal::new(goal),
        }
    }

    pub fn kind(&self) -> CadenceKind {
        match self {
            Cadence::Daily { .. } => CadenceKind::Daily,
            Cadence::Weekly { .. } => CadenceKind::Weekly,
        }
    }
}

impl Default for Cadence {
    fn default() -> Self {
        Self::daily()
    }
}

/// Cadence without its settings, used for switching and parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CadenceKind {
    Daily,
    Weekly,
}

impl CadenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CadenceKind::Daily => "daily",
            CadenceKind::Weekly => "weekly",
        }
    }
}

impl fmt::Display for CadenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CadenceKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(CadenceKind::Daily),
            "weekly" => Ok(CadenceKind::Weekly),
            other => Err(ValidationError::InvalidValue {
                field: "cadence".into(),
                message: format!("expected 'daily' or 'weekly', got '{other}'"),
            }),
        }
    }
}

/// A user-defined recurring habit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub title: String,
    pub cadence: Cadence,
    /// Current streak as of the store's reference date.
    #[serde(default)]
    pub streak: u32,
    /// Highest streak ever recorded; never decreases.
    #[serde(default)]
    pub longest_streak: u32,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

impl Habit {
    /// Create a habit with a fresh id.
    ///
    /// # Errors
    /// Returns an error if the title is blank.
    pub fn new(title: &str, cadence: Cadence) -> Result<Self, ValidationError> {
        Self::with_id(Uuid::new_v4().to_string(), title, cadence)
    }

    /// Create a habit with a caller-supplied id.
    pub fn with_id(
        id: impl Into<String>,
        title: &str,
        cadence: Cadence,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id: id.into(),
            title: validate_title(title)?,
            cadence,
            streak: 0,
            longest_streak: 0,
            created_at: Utc::now(),
        })
    }

    /// Store a freshly computed streak and raise the longest streak if needed.
    pub fn record_streak(&mut self, streak: u32) {
        self.streak = streak;
        self.longest_streak = self.longest_streak.max(streak);
    }

    /// Apply a settings update.
    ///
    /// A cadence switch happens first and resets the cadence-specific field
    /// (`default_weekly_goal` seeds a new weekly habit). Scheduled days then
    /// require a daily habit and a weekly goal a weekly one. Nothing is
    /// changed if any part of the update is invalid.
    pub fn apply_settings(
        &mut self,
        settings: &HabitSettings,
        default_weekly_goal: WeeklyGoal,
    ) -> Result<(), ValidationError> {
        let title = match settings.title.as_deref() {
            Some(t) => Some(validate_title(t)?),
            None => None,
        };

        let mut cadence = self.cadence;
        if let Some(kind) = settings.cadence {
            if kind != cadence.kind() {
                cadence = match kind {
                    CadenceKind::Daily => Cadence::daily(),
                    CadenceKind::Weekly => Cadence::Weekly {
                        goal: default_weekly_goal,
                    },
                };
            }
        }

        if let Some(days) = settings.scheduled_days {
            match &mut cadence {
                Cadence::Daily { scheduled_days } => *scheduled_days = days,
                Cadence::Weekly { .. } => {
                    return Err(mismatch("scheduled_days", CadenceKind::Weekly));
                }
            }
        }

        if let Some(value) = settings.weekly_goal {
            match &mut cadence {
                Cadence::Weekly { goal } => *goal = WeeklyGoal::new(value),
                Cadence::Daily { .. } => {
                    return Err(mismatch("weekly_goal", CadenceKind::Daily));
                }
            }
        }

        if let Some(t) = title {
            self.title = t;
        }
        self.cadence = cadence;
        Ok(())
    }
}

/// A partial settings update for one habit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HabitSettings {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub cadence: Option<CadenceKind>,
    #[serde(default)]
    pub scheduled_days: Option<WeekdaySet>,
    #[serde(default)]
    pub weekly_goal: Option<i64>,
}

impl HabitSettings {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.cadence.is_none()
            && self.scheduled_days.is_none()
            && self.weekly_goal.is_none()
    }
}

fn validate_title(title: &str) -> Result<String, ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "title".into(),
            message: "must not be empty".into(),
        });
    }
    Ok(trimmed.to_string())
}

fn mismatch(field: &str, cadence: CadenceKind) -> ValidationError {
    ValidationError::CadenceMismatch {
        field: field.into(),
        cadence: cadence.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    #[test]
    fn test_weekly_goal_clamps() {
        assert_eq!(WeeklyGoal::new(0).get(), 1);
        assert_eq!(WeeklyGoal::new(-4).get(), 1);
        assert_eq!(WeeklyGoal::new(3).get(), 3);
        assert_eq!(WeeklyGoal::new(12).get(), 7);
        assert_eq!(WeeklyGoal::default().get(), 1);
    }

    #[test]
    fn test_weekly_goal_clamps_on_load() {
        let cadence: Cadence = serde_json::from_str(r#"{"type":"weekly","goal":0}"#).unwrap();
        assert_eq!(cadence, Cadence::weekly(1));
        let cadence: Cadence = serde_json::from_str(r#"{"type":"weekly"}"#).unwrap();
        assert_eq!(cadence, Cadence::weekly(1));
    }

    #[test]
    fn test_cadence_serde_tagged() {
        let cadence = Cadence::daily_on([Weekday::Mon, Weekday::Fri].into_iter().collect());
        let json = serde_json::to_string(&cadence).unwrap();
        assert_eq!(json, r#"{"type":"daily","scheduled_days":[1,5]}"#);
    }

    #[test]
    fn test_new_habit_rejects_blank_title() {
        assert!(Habit::new("   ", Cadence::daily()).is_err());
        let habit = Habit::new("  Read  ", Cadence::daily()).unwrap();
        assert_eq!(habit.title, "Read");
        assert_eq!(habit.streak, 0);
        assert!(!habit.id.is_empty());
    }

    #[test]
    fn test_record_streak_keeps_maximum() {
        let mut habit = Habit::new("Run", Cadence::daily()).unwrap();
        habit.record_streak(4);
        habit.record_streak(2);
        assert_eq!(habit.streak, 2);
        assert_eq!(habit.longest_streak, 4);
        habit.record_streak(6);
        assert_eq!(habit.longest_streak, 6);
    }

    #[test]
    fn test_settings_cadence_mismatch_is_rejected() {
        let mut habit = Habit::new("Gym", Cadence::daily()).unwrap();
        let settings = HabitSettings {
            weekly_goal: Some(3),
            ..Default::default()
        };
        let err = habit
            .apply_settings(&settings, WeeklyGoal::default())
            .unwrap_err();
        assert!(matches!(err, ValidationError::CadenceMismatch { .. }));
        assert_eq!(habit.cadence, Cadence::daily());
    }

    #[test]
    fn test_settings_switch_then_goal() {
        let mut habit = Habit::new("Gym", Cadence::daily()).unwrap();
        let settings = HabitSettings {
            title: Some("Gym sessions".into()),
            cadence: Some(CadenceKind::Weekly),
            weekly_goal: Some(9),
            ..Default::default()
        };
        habit
            .apply_settings(&settings, WeeklyGoal::new(2))
            .unwrap();
        assert_eq!(habit.cadence, Cadence::weekly(7));
        assert_eq!(habit.title, "Gym sessions");
    }

    #[test]
    fn test_settings_switch_uses_default_goal() {
        let mut habit = Habit::new("Swim", Cadence::daily()).unwrap();
        let settings = HabitSettings {
            cadence: Some(CadenceKind::Weekly),
            ..Default::default()
        };
        habit.apply_settings(&settings, WeeklyGoal::new(2)).unwrap();
        assert_eq!(habit.cadence, Cadence::weekly(2));
    }

    #[test]
    fn test_cadence_kind_parse() {
        assert_eq!("Weekly".parse::<CadenceKind>().unwrap(), CadenceKind::Weekly);
        assert!("monthly".parse::<CadenceKind>().is_err());
    }
}
