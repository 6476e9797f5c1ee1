pub mod availability;
pub mod horizon;
pub mod periods;

use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, Month, NaiveDate, Weekday};

use crate::types::Holiday;

/// Per-invocation view of the planning horizon.
///
/// Holds the holiday membership set and the expanded day list so the rest of
/// the engine can answer "is this day free?" without re-scanning the holiday
/// list. Build one per planning call; it is never shared between requests.
#[derive(Debug, Clone)]
pub struct CalendarContext {
    anchors: Vec<NaiveDate>,
    days: Vec<NaiveDate>,
    day_set: HashSet<NaiveDate>,
    holidays: HashSet<NaiveDate>,
    holiday_names: BTreeMap<NaiveDate, String>,
    today: NaiveDate,
    allow_past_days: bool,
}

impl CalendarContext {
    pub fn new(
        month_anchors: &[NaiveDate],
        holidays: &[Holiday],
        today: NaiveDate,
        allow_past_days: bool,
    ) -> Self {
        let mut anchors: Vec<NaiveDate> = month_anchors
            .iter()
            .filter_map(|anchor| anchor.with_day(1))
            .collect();
        anchors.sort();
        anchors.dedup();

        let mut days = Vec::new();
        for anchor in &anchors {
            let mut cursor = Some(*anchor);
            while let Some(day) = cursor {
                if day.month() != anchor.month() {
                    break;
                }
                days.push(day);
                cursor = day.succ_opt();
            }
        }
        let day_set = days.iter().copied().collect();

        let mut holiday_names = BTreeMap::new();
        for holiday in holidays {
            holiday_names
                .entry(holiday.date)
                .or_insert_with(|| holiday.name.clone());
        }
        let holidays = holiday_names.keys().copied().collect();

        Self {
            anchors,
            days,
            day_set,
            holidays,
            holiday_names,
            today,
            allow_past_days,
        }
    }

    pub fn month_anchors(&self) -> &[NaiveDate] {
        &self.anchors
    }

    /// Every calendar day of the horizon, in order.
    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        self.days.first().copied()
    }

    pub fn last_day(&self) -> Option<NaiveDate> {
        self.days.last().copied()
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn allow_past_days(&self) -> bool {
        self.allow_past_days
    }

    pub fn in_horizon(&self, day: NaiveDate) -> bool {
        self.day_set.contains(&day)
    }

    pub fn is_holiday(&self, day: NaiveDate) -> bool {
        self.holidays.contains(&day)
    }

    pub fn holiday_name(&self, day: NaiveDate) -> Option<&str> {
        self.holiday_names.get(&day).map(String::as_str)
    }

    /// Weekend or holiday.
    pub fn is_free(&self, day: NaiveDate) -> bool {
        is_weekend(day) || self.is_holiday(day)
    }

    pub fn is_workday(&self, day: NaiveDate) -> bool {
        !self.is_free(day)
    }

    /// True when the day is before today and past days are not plannable.
    pub fn is_past(&self, day: NaiveDate) -> bool {
        !self.allow_past_days && day < self.today
    }

    pub fn holidays_between(&self, start: NaiveDate, end: NaiveDate) -> u32 {
        self.holiday_names.range(start..=end).count() as u32
    }
}

pub fn is_weekend(day: NaiveDate) -> bool {
    matches!(day.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Inclusive day count of `start..=end`.
pub fn span_len(start: NaiveDate, end: NaiveDate) -> u32 {
    u32::try_from((end - start).num_days() + 1).unwrap_or(0)
}

/// Order-independent identity of a day set: sorted ISO dates joined by commas.
pub fn canonical_key(days: &[NaiveDate]) -> String {
    let mut sorted = days.to_vec();
    sorted.sort();
    sorted.dedup();
    sorted
        .iter()
        .map(|day| day.format("%Y-%m-%d").to_string())
        .collect::<Vec<_>>()
        .join(",")
}

pub fn month_label(day: NaiveDate) -> &'static str {
    u8::try_from(day.month())
        .ok()
        .and_then(|month| Month::try_from(month).ok())
        .map(|month| month.name())
        .unwrap_or("")
}
