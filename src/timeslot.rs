//! Scheduled-time parsing.
//!
//! Campaign sheets carry free-text dial times such as `"9:30 AM"` or
//! `"No Specific time"`. Only strings with an AM/PM marker and an `H:` or
//! `HH:` prefix yield an hour; everything else is dropped without error.

use serde::Serialize;
use std::fmt;

const PLACEHOLDER_NONE: &str = "None";
const PLACEHOLDER_ANY_TIME: &str = "No Specific time";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeSlot {
    hour: u8,
}

impl TimeSlot {
    pub fn from_hour(hour: u8) -> Option<Self> {
        (hour < 24).then_some(Self { hour })
    }

    pub fn hour(self) -> u8 {
        self.hour
    }

    pub fn day_part(self) -> DayPart {
        DayPart::from_hour(self.hour)
    }

    /// Key used in `hourly_distribution`, e.g. `"09:00"`.
    pub fn bucket_label(self) -> String {
        format!("{:02}:00", self.hour)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DayPart {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl DayPart {
    pub fn from_hour(hour: u8) -> Self {
        match hour {
            6..=11 => DayPart::Morning,
            12..=17 => DayPart::Afternoon,
            18..=23 => DayPart::Evening,
            _ => DayPart::Night,
        }
    }
}

impl fmt::Display for DayPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DayPart::Morning => "morning",
            DayPart::Afternoon => "afternoon",
            DayPart::Evening => "evening",
            DayPart::Night => "night",
        };
        f.write_str(label)
    }
}

/// True for cells that hold a real schedule entry rather than a placeholder.
pub fn is_scheduled(text: &str) -> bool {
    let text = text.trim();
    !(text.is_empty() || text == PLACEHOLDER_NONE || text.contains(PLACEHOLDER_ANY_TIME))
}

pub fn parse_time(text: &str) -> Option<TimeSlot> {
    let text = text.trim();
    if !is_scheduled(text) {
        return None;
    }
    let is_pm = text.contains("PM");
    let is_am = text.contains("AM");
    if !is_pm && !is_am {
        return None;
    }

    let hour = leading_hour(text)?;
    // A 12-hour clock never shows more than 12; larger values are junk.
    if hour > 12 {
        return None;
    }
    let hour = if is_pm && hour != 12 {
        hour + 12
    } else if !is_pm && hour == 12 {
        0
    } else {
        hour
    };
    u8::try_from(hour).ok().and_then(TimeSlot::from_hour)
}

/// Digits immediately before the first `:` that has any.
///
/// `"Slot 10:15 AM"` yields 10; `"ETA: 9:00 PM"` skips the bare colon and
/// yields 9.
fn leading_hour(text: &str) -> Option<u32> {
    let bytes = text.as_bytes();
    for (idx, _) in text.match_indices(':') {
        let start = bytes[..idx]
            .iter()
            .rposition(|b| !b.is_ascii_digit())
            .map_or(0, |p| p + 1);
        if start < idx {
            return text[start..idx].parse::<u32>().ok();
        }
    }
    None
}
