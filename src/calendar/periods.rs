use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::{span_len, CalendarContext};

/// Contiguous run of weekend/holiday days inside the horizon.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FreePeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl FreePeriod {
    pub fn len(&self) -> u32 {
        span_len(self.start, self.end)
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

pub fn free_periods(ctx: &CalendarContext) -> Vec<FreePeriod> {
    let mut periods: Vec<FreePeriod> = Vec::new();
    for day in ctx.days() {
        if !ctx.is_free(*day) {
            continue;
        }
        match periods.last_mut() {
            Some(current) if current.end.succ_opt() == Some(*day) => current.end = *day,
            _ => periods.push(FreePeriod {
                start: *day,
                end: *day,
            }),
        }
    }
    periods
}
