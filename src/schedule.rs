//! Posting schedule: a weekly wall-clock slot.
//!
//! The core never sleeps or polls; [`PostSchedule::due`] is a pure
//! comparison against a caller-supplied clock reading. The orchestration
//! loop owns the polling cadence and is responsible for sleeping past the
//! scheduled minute after a due cycle so a slot fires at most once.

use chrono::{DateTime, Datelike, TimeZone, Timelike, Weekday};
use serde::{Deserialize, Serialize};

/// Weekly posting slot, minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PostSchedule {
    /// Day of week, 0 = Monday through 6 = Sunday.
    pub weekday: u8,
    /// Hour of day, 0-23.
    pub hour: u8,
    /// Minute, 0-59.
    pub minute: u8,
}

impl Default for PostSchedule {
    /// Thursday 10:00.
    fn default() -> Self {
        Self {
            weekday: 3,
            hour: 10,
            minute: 0,
        }
    }
}

impl PostSchedule {
    /// Whether `now` falls inside the scheduled minute.
    pub fn due<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
        now.weekday().num_days_from_monday() == self.weekday as u32
            && now.hour() == self.hour as u32
            && now.minute() == self.minute as u32
    }

    /// Display name of the scheduled weekday.
    pub fn weekday_name(&self) -> &'static str {
        match self.weekday {
            0 => "Monday",
            1 => "Tuesday",
            2 => "Wednesday",
            3 => "Thursday",
            4 => "Friday",
            5 => "Saturday",
            6 => "Sunday",
            _ => "invalid weekday",
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.weekday > 6 {
            return Err("schedule.weekday must be 0-6 (0 = Monday)".into());
        }
        if self.hour > 23 {
            return Err("schedule.hour must be 0-23".into());
        }
        if self.minute > 59 {
            return Err("schedule.minute must be 0-59".into());
        }
        Ok(())
    }
}

/// Weekday as the 0 = Monday index used by [`PostSchedule`].
pub fn weekday_index(weekday: Weekday) -> u8 {
    weekday.num_days_from_monday() as u8
}
