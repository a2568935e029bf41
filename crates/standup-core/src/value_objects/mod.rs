//! Value objects - immutable types that represent domain concepts

mod ids;
mod schedule;

pub use ids::{IdParseError, ResponseId, StandupId};
pub use schedule::{parse_timezone, Schedule, ScheduleError, TimeOfDay, WEEKDAY_NAMES};
