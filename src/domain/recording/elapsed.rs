//! Elapsed recording time value object

use std::fmt;
use std::str::FromStr;
use std::time::{Duration as StdDuration, Instant};

use crate::domain::error::MaxHoursParseError;

/// Default maximum recording time before an automatic stop (1 hour)
pub const DEFAULT_MAX_RECORDING_HOURS: u32 = 1;

const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_HOUR: u64 = 60 * SECS_PER_MINUTE;
const HOURS_PER_DAY: u64 = 24;

/// Whole seconds elapsed since a recording began.
///
/// Renders as `mm:ss` below one hour and `hh:mm:ss` from then on. Days are
/// folded into the hour field, so 25 hours render as `25:00:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ElapsedTime {
    seconds: u64,
}

impl ElapsedTime {
    /// Zero elapsed time, shown when a recording starts
    pub const fn zero() -> Self {
        Self { seconds: 0 }
    }

    pub const fn from_secs(seconds: u64) -> Self {
        Self { seconds }
    }

    /// Elapsed time between two instants, ignoring incomplete seconds.
    /// Saturates to zero if `now` is before `start`.
    pub fn between(start: Instant, now: Instant) -> Self {
        Self::from(now.saturating_duration_since(start))
    }

    pub const fn as_secs(&self) -> u64 {
        self.seconds
    }

    pub const fn seconds_part(&self) -> u64 {
        self.seconds % SECS_PER_MINUTE
    }

    pub const fn minutes_part(&self) -> u64 {
        (self.seconds / SECS_PER_MINUTE) % 60
    }

    /// Hour field, including whole days
    pub const fn hours_part(&self) -> u64 {
        let total_hours = self.seconds / SECS_PER_HOUR;
        let days = total_hours / HOURS_PER_DAY;
        total_hours % HOURS_PER_DAY + days * HOURS_PER_DAY
    }

    /// Whether the hour field has reached `max_hours`.
    ///
    /// A zero maximum disables the limit.
    pub const fn reached_hours(&self, max_hours: u32) -> bool {
        max_hours > 0 && self.hours_part() >= max_hours as u64
    }
}

impl From<StdDuration> for ElapsedTime {
    fn from(duration: StdDuration) -> Self {
        Self::from_secs(duration.as_secs())
    }
}

impl fmt::Display for ElapsedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.hours_part();
        if hours == 0 {
            write!(f, "{:02}:{:02}", self.minutes_part(), self.seconds_part())
        } else {
            write!(
                f,
                "{:02}:{:02}:{:02}",
                hours,
                self.minutes_part(),
                self.seconds_part()
            )
        }
    }
}

/// Maximum recording length in hours, as configured by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxRecordingHours(u32);

impl MaxRecordingHours {
    pub const fn new(hours: u32) -> Self {
        Self(hours)
    }

    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl Default for MaxRecordingHours {
    fn default() -> Self {
        Self(DEFAULT_MAX_RECORDING_HOURS)
    }
}

impl FromStr for MaxRecordingHours {
    type Err = MaxHoursParseError;

    /// Accepts a positive whole number of hours, e.g. "1" or "2h"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().to_lowercase();
        let digits = trimmed.strip_suffix('h').unwrap_or(&trimmed);
        match digits.parse::<u32>() {
            Ok(hours) if hours > 0 => Ok(Self(hours)),
            _ => Err(MaxHoursParseError {
                input: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for MaxRecordingHours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h", self.0)
    }
}
