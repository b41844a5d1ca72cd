//! Bucketing and calendar helpers for derived fields.
//!
//! Every bucket is half-open with an inclusive lower bound.

use chrono::{Month, Weekday};

use crate::models::{AgeGroup, TimePeriod};

/// Classify a purchase hour into a part of the day.
///
/// `[6,12)` Morning, `[12,18)` Afternoon, `[18,24)` Night, everything
/// else (the `[0,6)` wrap) Late Night.
pub fn classify_hour(hour: u8) -> TimePeriod {
    match hour {
        6..=11 => TimePeriod::Morning,
        12..=17 => TimePeriod::Afternoon,
        18..=23 => TimePeriod::Night,
        _ => TimePeriod::LateNight,
    }
}

/// Classify a customer age into its bracket; upper bounds are exclusive.
pub fn age_group(age: u32) -> AgeGroup {
    if age < 25 {
        AgeGroup::Under25
    } else if age < 35 {
        AgeGroup::From25To34
    } else if age < 45 {
        AgeGroup::From35To44
    } else if age < 55 {
        AgeGroup::From45To54
    } else {
        AgeGroup::From55
    }
}

/// English month name for a 1-based month number.
pub fn month_name(month: u32) -> &'static str {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name())
        .unwrap_or("Unknown")
}

/// Full English weekday name.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
