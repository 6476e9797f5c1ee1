use chrono::NaiveDate;

use crate::calendar::CalendarContext;
use crate::types::Holiday;

/// Workdays of the horizon that can still be booked: no weekends, no
/// holidays, and nothing before today unless past days are allowed.
pub fn available_workdays(ctx: &CalendarContext) -> Vec<NaiveDate> {
    ctx.days()
        .iter()
        .copied()
        .filter(|day| ctx.is_workday(*day) && !ctx.is_past(*day))
        .collect()
}

pub fn build_available_workdays(
    month_anchors: &[NaiveDate],
    holidays: &[Holiday],
    today: NaiveDate,
    allow_past_days: bool,
) -> Vec<NaiveDate> {
    let ctx = CalendarContext::new(month_anchors, holidays, today, allow_past_days);
    available_workdays(&ctx)
}
