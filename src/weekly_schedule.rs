use chrono::{Datelike, Duration, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;
use thiserror::Error;

pub const DAYS_OF_WEEK: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Minute marks inside each hour (30-minute increments)
pub const SLOT_MINUTES: [u32; 2] = [0, 30];

static SLOT_PATTERN: OnceLock<Regex> = OnceLock::new();

fn slot_pattern() -> &'static Regex {
    SLOT_PATTERN.get_or_init(|| {
        Regex::new(r"^(Sunday|Monday|Tuesday|Wednesday|Thursday|Friday|Saturday)-([01]\d|2[0-3]):(00|30)$")
            .unwrap()
    })
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Invalid slot '{0}': expected <Day>-HH:MM in 30-minute steps, e.g. Monday-09:30")]
    InvalidSlot(String),
    #[error("Cannot move {0} weeks from the current week: date out of range")]
    WeekOutOfRange(i64),
}

/// Slot id such as "Monday-09:00"
pub fn slot_id(day: &str, hour: u32, minute: u32) -> String {
    format!("{}-{:02}:{:02}", day, hour, minute)
}

/// Split a slot id into (day, hour, minute), rejecting anything off the grid
pub fn parse_slot(slot: &str) -> Result<(&str, u32, u32), ScheduleError> {
    let invalid = || ScheduleError::InvalidSlot(slot.to_string());
    let caps = slot_pattern().captures(slot).ok_or_else(invalid)?;
    let day = caps.get(1).ok_or_else(invalid)?.as_str();
    let hour = caps[2].parse().map_err(|_| invalid())?;
    let minute = caps[3].parse().map_err(|_| invalid())?;
    Ok((day, hour, minute))
}

/// Every slot of the week in day-then-time order
pub fn all_slots() -> impl Iterator<Item = String> {
    DAYS_OF_WEEK.iter().flat_map(|day| {
        (0..24).flat_map(move |hour| SLOT_MINUTES.iter().map(move |&minute| slot_id(day, hour, minute)))
    })
}

/// 12-hour label for a slot start, e.g. "9:30 AM"
pub fn format_time(hour: u32, minute: u32) -> String {
    let period = if hour >= 12 { "PM" } else { "AM" };
    let hour12 = match hour {
        0 => 12,
        h if h > 12 => h - 12,
        h => h,
    };
    format!("{}:{:02} {}", hour12, minute, period)
}

/// Row label for an hour, e.g. "12 AM", "3 PM"
pub fn hour_label(hour: u32) -> String {
    match hour {
        0 => "12 AM".to_string(),
        h if h < 12 => format!("{} AM", h),
        12 => "12 PM".to_string(),
        h => format!("{} PM", h - 12),
    }
}

/// Sunday on or before `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

/// "Oct 18 - Oct 24, 2026"
pub fn week_range_label(start: NaiveDate) -> String {
    let end = start + Duration::days(6);
    format!("{} - {}", start.format("%b %-d"), end.format("%b %-d, %Y"))
}

/// Saved availability document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityData {
    pub total_slots: usize,
    /// Slot ids in ascending string order
    pub slots: Vec<String>,
    /// Day name -> start times ("HH:MM")
    pub organized_by_day: BTreeMap<String, Vec<String>>,
}

impl AvailabilityData {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// A week view plus the set of slots marked available
#[derive(Debug, Clone)]
pub struct WeeklySchedule {
    current_week: NaiveDate,
    today: NaiveDate,
    slots: BTreeSet<String>,
}

impl WeeklySchedule {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            current_week: week_start(today),
            today,
            slots: BTreeSet::new(),
        }
    }

    /// Start from an existing set of slot ids; every id must be valid
    pub fn with_slots<I, S>(today: NaiveDate, slots: I) -> Result<Self, ScheduleError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut schedule = Self::new(today);
        for slot in slots {
            let slot = slot.as_ref().trim();
            parse_slot(slot)?;
            schedule.slots.insert(slot.to_string());
        }
        Ok(schedule)
    }

    /// Flip a slot; returns whether it is now available
    pub fn toggle(&mut self, slot: &str) -> Result<bool, ScheduleError> {
        parse_slot(slot)?;
        if self.slots.remove(slot) {
            Ok(false)
        } else {
            self.slots.insert(slot.to_string());
            Ok(true)
        }
    }

    pub fn is_available(&self, day: &str, hour: u32, minute: u32) -> bool {
        self.slots.contains(&slot_id(day, hour, minute))
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn previous_week(&mut self) -> Result<(), ScheduleError> {
        self.shift_weeks(-1)
    }

    pub fn next_week(&mut self) -> Result<(), ScheduleError> {
        self.shift_weeks(1)
    }

    pub fn go_to_today(&mut self) {
        self.current_week = week_start(self.today);
    }

    /// Move by a signed number of weeks. The displayed week is left
    /// unchanged unless all seven days of the target week are representable.
    pub fn shift_weeks(&mut self, weeks: i64) -> Result<(), ScheduleError> {
        let target = weeks
            .checked_mul(7)
            .and_then(Duration::try_days)
            .and_then(|delta| self.current_week.checked_add_signed(delta))
            .filter(|start| start.checked_add_signed(Duration::days(6)).is_some())
            .ok_or(ScheduleError::WeekOutOfRange(weeks))?;
        self.current_week = target;
        Ok(())
    }

    pub fn week_start(&self) -> NaiveDate {
        self.current_week
    }

    pub fn range_label(&self) -> String {
        week_range_label(self.current_week)
    }

    /// Day names paired with their dates in the displayed week
    pub fn week_days(&self) -> Vec<(&'static str, NaiveDate)> {
        DAYS_OF_WEEK
            .iter()
            .enumerate()
            .map(|(i, day)| (*day, self.current_week + Duration::days(i as i64)))
            .collect()
    }

    pub fn availability(&self) -> AvailabilityData {
        let slots: Vec<String> = self.slots.iter().cloned().collect();
        let mut organized_by_day: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for slot in &slots {
            if let Some((day, time)) = slot.split_once('-') {
                organized_by_day
                    .entry(day.to_string())
                    .or_default()
                    .push(time.to_string());
            }
        }
        AvailabilityData {
            total_slots: slots.len(),
            slots,
            organized_by_day,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_slot_ids() {
        assert_eq!(slot_id("Monday", 9, 0), "Monday-09:00");
        assert_eq!(parse_slot("Friday-23:30").unwrap(), ("Friday", 23, 30));
        assert!(parse_slot("Funday-09:00").is_err());
        assert!(parse_slot("Monday-09:15").is_err());
        assert!(parse_slot("Monday-24:00").is_err());
        assert_eq!(all_slots().count(), 7 * 48);
    }

    #[test]
    fn test_time_labels() {
        assert_eq!(format_time(0, 0), "12:00 AM");
        assert_eq!(format_time(9, 30), "9:30 AM");
        assert_eq!(format_time(12, 0), "12:00 PM");
        assert_eq!(format_time(23, 30), "11:30 PM");
        assert_eq!(hour_label(0), "12 AM");
        assert_eq!(hour_label(12), "12 PM");
        assert_eq!(hour_label(15), "3 PM");
    }

    #[test]
    fn test_week_navigation() {
        // 2026-10-19 is a Monday
        let mut schedule = WeeklySchedule::new(date(2026, 10, 19));
        assert_eq!(schedule.week_start(), date(2026, 10, 18));
        assert_eq!(schedule.range_label(), "Oct 18 - Oct 24, 2026");
        schedule.next_week().unwrap();
        assert_eq!(schedule.week_start(), date(2026, 10, 25));
        schedule.shift_weeks(-3).unwrap();
        assert_eq!(schedule.range_label(), "Oct 4 - Oct 10, 2026");
        schedule.go_to_today();
        assert_eq!(schedule.week_days()[0], ("Sunday", date(2026, 10, 18)));
    }

    #[test]
    fn test_toggle_and_availability_document() {
        let mut schedule = WeeklySchedule::new(date(2026, 10, 19));
        assert!(schedule.toggle("Monday-09:30").unwrap());
        assert!(schedule.toggle("Monday-09:00").unwrap());
        assert!(schedule.toggle("Friday-14:00").unwrap());
        assert!(schedule.toggle("Friday-14:00").is_ok_and(|now| !now));
        assert!(schedule.is_available("Monday", 9, 30));

        let data = schedule.availability();
        assert_eq!(data.total_slots, 2);
        assert_eq!(data.slots, vec!["Monday-09:00", "Monday-09:30"]);
        assert_eq!(data.organized_by_day["Monday"], vec!["09:00", "09:30"]);
        assert!(data.to_json().unwrap().contains("\"totalSlots\":2"));
    }

    #[test]
    fn test_shift_weeks_out_of_range() {
        let mut schedule = WeeklySchedule::new(date(2026, 10, 19));
        let start = schedule.week_start();

        assert_eq!(schedule.shift_weeks(i64::MAX), Err(ScheduleError::WeekOutOfRange(i64::MAX)));
        assert_eq!(schedule.shift_weeks(i64::MIN), Err(ScheduleError::WeekOutOfRange(i64::MIN)));
        assert_eq!(schedule.shift_weeks(20_000_000), Err(ScheduleError::WeekOutOfRange(20_000_000)));
        assert_eq!(schedule.week_start(), start);
        assert_eq!(schedule.range_label(), "Oct 18 - Oct 24, 2026");

        schedule.shift_weeks(-52).unwrap();
        assert_eq!(schedule.week_start(), date(2025, 10, 19));
    }

    #[test]
    fn test_with_slots_rejects_invalid() {
        let err = WeeklySchedule::with_slots(date(2026, 10, 19), ["Monday-09:00", "bad"]).unwrap_err();
        assert_eq!(err, ScheduleError::InvalidSlot("bad".to_string()));
    }
}
