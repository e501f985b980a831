//! Calendar-day helpers.
//!
//! Everything here works on `NaiveDate`: a habit is completed on a calendar
//! day, never at an instant. Weeks run Sunday through Saturday and weekday
//! indices follow the same order (0 = Sunday .. 6 = Saturday).

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// Wire format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Weekdays in index order, Sunday first.
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// Parse a strict `YYYY-MM-DD` date.
///
/// Surrounding whitespace is ignored; anything else that is not a real
/// calendar date (wrong shape, month 13, February 30th) is rejected.
pub fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = value.trim();
    let invalid = || ValidationError::InvalidDate {
        value: value.to_string(),
    };

    let bytes = trimmed.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !well_formed {
        return Err(invalid());
    }

    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| invalid())
}

/// Format a date as `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Index of a weekday, 0 = Sunday.
pub fn weekday_index(day: Weekday) -> u8 {
    day.num_days_from_sunday() as u8
}

/// Weekday for an index, 0 = Sunday.
pub fn weekday_from_index(index: u8) -> Option<Weekday> {
    WEEKDAYS.get(index as usize).copied()
}

/// Parse a weekday from an index (`"3"`) or an English name (`"wed"`, `"Wednesday"`).
pub fn parse_weekday(value: &str) -> Result<Weekday, ValidationError> {
    let trimmed = value.trim();
    if let Ok(index) = trimmed.parse::<u8>() {
        return weekday_from_index(index)
            .ok_or_else(|| ValidationError::InvalidWeekday(value.to_string()));
    }
    trimmed
        .parse::<Weekday>()
        .map_err(|_| ValidationError::InvalidWeekday(value.to_string()))
}

/// Sunday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_sunday());
    date.checked_sub_days(Days::new(offset))
        .unwrap_or(NaiveDate::MIN)
}

/// The day before `date`, or `None` at the start of the calendar.
pub fn previous_day(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_sub_days(Days::new(1))
}

/// Seven days starting at `start`.
pub fn week_days(start: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take(7)
}

/// Set of weekdays a daily habit is scheduled on.
///
/// An empty set means "every day". Stored as a bitmask indexed from Sunday and
/// serialized as a sorted list of indices. Deserialization also accepts day
/// names, which older records used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<DayRef>", into = "Vec<u8>")]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    pub const EMPTY: WeekdaySet = WeekdaySet(0);

    pub fn new() -> Self {
        Self::EMPTY
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << weekday_index(day)) != 0
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << weekday_index(day);
    }

    pub fn remove(&mut self, day: Weekday) {
        self.0 &= !(1 << weekday_index(day));
    }

    /// Whether a habit with this schedule is due on `date`.
    pub fn is_scheduled(&self, date: NaiveDate) -> bool {
        self.is_empty() || self.contains(date.weekday())
    }

    /// Scheduled days in index order, Sunday first.
    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        WEEKDAYS.iter().copied().filter(|d| self.contains(*d))
    }

    /// Build from indices (0 = Sunday); out-of-range indices are rejected.
    pub fn from_indices<I>(indices: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = u8>,
    {
        let mut set = Self::new();
        for index in indices {
            let day = weekday_from_index(index)
                .ok_or_else(|| ValidationError::InvalidWeekday(index.to_string()))?;
            set.insert(day);
        }
        Ok(set)
    }

    /// Parse a comma-separated list such as `"mon,wed,fri"` or `"1,3,5"`.
    pub fn parse_list(value: &str) -> Result<Self, ValidationError> {
        let mut set = Self::new();
        for part in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            set.insert(parse_weekday(part)?);
        }
        Ok(set)
    }
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<T: IntoIterator<Item = Weekday>>(iter: T) -> Self {
        let mut set = Self::new();
        for day in iter {
            set.insert(day);
        }
        set
    }
}

impl fmt::Display for WeekdaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("every day");
        }
        let names: Vec<String> = self.iter().map(|d| d.to_string()).collect();
        f.write_str(&names.join(","))
    }
}

/// A scheduled day as found in stored records: an index or a name.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DayRef {
    Index(u8),
    Name(String),
}

impl DayRef {
    pub fn to_weekday(&self) -> Result<Weekday, ValidationError> {
        match self {
            DayRef::Index(index) => weekday_from_index(*index)
                .ok_or_else(|| ValidationError::InvalidWeekday(index.to_string())),
            DayRef::Name(name) => parse_weekday(name),
        }
    }
}

impl TryFrom<Vec<DayRef>> for WeekdaySet {
    type Error = ValidationError;

    fn try_from(days: Vec<DayRef>) -> Result<Self, Self::Error> {
        days.iter().map(DayRef::to_weekday).collect()
    }
}

impl From<WeekdaySet> for Vec<u8> {
    fn from(set: WeekdaySet) -> Self {
        set.iter().map(weekday_index).collect()
    }
}
