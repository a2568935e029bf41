//! Schedule - time-of-day, weekday set, and IANA timezone for a channel
//!
//! Weekday indices follow the platform convention: 0 = Sunday .. 6 = Saturday.

use chrono::{DateTime, Datelike, Days, Duration, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use std::fmt;

/// Weekday labels indexed by weekday number (0 = Sunday)
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Errors raised while building a schedule
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    #[error("Invalid time format: {0} (expected HH:MM)")]
    InvalidTime(String),

    #[error("Invalid weekday index: {0} (expected 0-6)")]
    InvalidWeekday(u8),

    #[error("At least one weekday must be selected")]
    NoWeekdays,

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
}

/// Wall-clock time of day, minute precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    /// Create a time of day, rejecting out-of-range values
    pub fn new(hour: u8, minute: u8) -> Result<Self, ScheduleError> {
        if hour > 23 || minute > 59 {
            return Err(ScheduleError::InvalidTime(format!("{hour}:{minute}")));
        }
        Ok(Self { hour, minute })
    }

    /// Parse `H:MM` or `HH:MM` (24-hour)
    pub fn parse(s: &str) -> Result<Self, ScheduleError> {
        let invalid = || ScheduleError::InvalidTime(s.to_string());
        let (h, m) = s.trim().split_once(':').ok_or_else(invalid)?;

        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return Err(invalid());
        }
        if !h.bytes().chain(m.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let hour: u8 = h.parse().map_err(|_| invalid())?;
        let minute: u8 = m.parse().map_err(|_| invalid())?;
        Self::new(hour, minute).map_err(|_| invalid())
    }

    #[inline]
    pub fn hour(self) -> u8 {
        self.hour
    }

    #[inline]
    pub fn minute(self) -> u8 {
        self.minute
    }
}

impl Default for TimeOfDay {
    fn default() -> Self {
        Self { hour: 9, minute: 0 }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl std::str::FromStr for TimeOfDay {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Parse an IANA timezone name
pub fn parse_timezone(name: &str) -> Result<Tz, ScheduleError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| ScheduleError::UnknownTimezone(name.to_string()))
}

/// When a channel's standup runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub time: TimeOfDay,
    weekdays: Vec<u8>,
    pub timezone: Tz,
}

impl Schedule {
    /// Build a schedule; weekdays are sorted and deduplicated
    pub fn new(time: TimeOfDay, weekdays: Vec<u8>, timezone: Tz) -> Result<Self, ScheduleError> {
        if let Some(&bad) = weekdays.iter().find(|&&d| d > 6) {
            return Err(ScheduleError::InvalidWeekday(bad));
        }
        let mut weekdays = weekdays;
        weekdays.sort_unstable();
        weekdays.dedup();
        if weekdays.is_empty() {
            return Err(ScheduleError::NoWeekdays);
        }
        Ok(Self {
            time,
            weekdays,
            timezone,
        })
    }

    /// Selected weekdays, ascending
    pub fn weekdays(&self) -> &[u8] {
        &self.weekdays
    }

    /// Check whether the schedule includes a weekday
    pub fn runs_on(&self, weekday: u8) -> bool {
        self.weekdays.contains(&weekday)
    }

    /// Check whether `now`, seen in the schedule's timezone, is the start minute
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        let local = now.with_timezone(&self.timezone);
        self.runs_on(local.weekday().num_days_from_sunday() as u8)
            && local.hour() == u32::from(self.time.hour())
            && local.minute() == u32::from(self.time.minute())
    }

    /// Start of the local calendar day containing `now`, as a UTC instant
    pub fn local_day_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let local = now.with_timezone(&self.timezone);
        local
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .and_then(|midnight| self.timezone.from_local_datetime(&midnight).earliest())
            .map_or_else(
                || now - Duration::seconds(i64::from(local.num_seconds_from_midnight())),
                |start| start.with_timezone(&Utc),
            )
    }

    /// Next scheduled start strictly after `now`, in the schedule's timezone
    pub fn next_run_after(&self, now: DateTime<Utc>) -> Option<DateTime<Tz>> {
        let today = now.with_timezone(&self.timezone).date_naive();

        (0..=7).find_map(|offset| {
            let date = today.checked_add_days(Days::new(offset))?;
            if !self.runs_on(date.weekday().num_days_from_sunday() as u8) {
                return None;
            }
            let naive = date.and_hms_opt(
                u32::from(self.time.hour()),
                u32::from(self.time.minute()),
                0,
            )?;
            let candidate = self.timezone.from_local_datetime(&naive).earliest()?;
            (candidate.with_timezone(&Utc) > now).then_some(candidate)
        })
    }

    /// UTC weekday of `now` and its neighbours; every timezone's local
    /// weekday falls within this window
    pub fn utc_weekday_window(now: DateTime<Utc>) -> [u8; 3] {
        let today = now.weekday().num_days_from_sunday() as u8;
        [(today + 6) % 7, today, (today + 1) % 7]
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            time: TimeOfDay::default(),
            weekdays: vec![1, 2, 3, 4, 5],
            timezone: Tz::UTC,
        }
    }
}
