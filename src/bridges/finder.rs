use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::debug;

use crate::bridges::{
    dedupe_bridges, expand_over_free_days, rank_bridges, MAX_GAP_PTO_DAYS, MAX_GAP_WORKDAYS,
};
use crate::calendar::periods::{free_periods, FreePeriod};
use crate::calendar::CalendarContext;
use crate::types::Bridge;

/// Discovers, filters, deduplicates and ranks every bridge candidate.
pub fn find_bridges(ctx: &CalendarContext, available: &[NaiveDate]) -> Vec<Bridge> {
    let available_set: HashSet<NaiveDate> = available.iter().copied().collect();
    let periods = free_periods(ctx);

    let mut candidates = gap_bridges(ctx, &periods, &available_set);
    let gap_count = candidates.len();
    candidates.extend(single_day_bridges(ctx, available));
    let single_count = candidates.len() - gap_count;

    let mut bridges = dedupe_bridges(candidates);
    rank_bridges(&mut bridges);
    debug!(
        periods = periods.len(),
        gap_count,
        single_count,
        kept = bridges.len(),
        "bridge pool built"
    );
    bridges
}

/// Bridges that join two consecutive free periods across a short run of workdays.
pub fn gap_bridges(
    ctx: &CalendarContext,
    periods: &[FreePeriod],
    available: &HashSet<NaiveDate>,
) -> Vec<Bridge> {
    let mut out = Vec::new();
    for pair in periods.windows(2) {
        let (before, after) = (pair[0], pair[1]);
        let Some(gap) = gap_workdays(before.end, after.start) else {
            continue;
        };
        if gap.is_empty() || gap.len() > MAX_GAP_PTO_DAYS {
            continue;
        }
        if !gap.iter().all(|day| available.contains(day)) {
            continue;
        }
        let connections = ctx.holidays_between(before.start, after.end);
        if let Some(bridge) = Bridge::try_new(before.start, after.end, gap, connections) {
            out.push(bridge);
        }
    }
    out
}

/// Days strictly between two periods, or `None` once the gap exceeds the scan ceiling.
fn gap_workdays(previous_end: NaiveDate, next_start: NaiveDate) -> Option<Vec<NaiveDate>> {
    let mut gap = Vec::new();
    let mut cursor = previous_end.succ_opt()?;
    while cursor < next_start {
        if gap.len() == MAX_GAP_WORKDAYS {
            return None;
        }
        gap.push(cursor);
        cursor = cursor.succ_opt()?;
    }
    Some(gap)
}

/// One-day bridges: a single workday that touches free days on either side.
pub fn single_day_bridges(ctx: &CalendarContext, available: &[NaiveDate]) -> Vec<Bridge> {
    available
        .iter()
        .filter_map(|day| {
            let (start, end) = expand_over_free_days(ctx, *day, *day);
            let connections = ctx.holidays_between(start, end);
            Bridge::try_new(start, end, vec![*day], connections)
        })
        .collect()
}
