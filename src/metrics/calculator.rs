use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, Weekday};

use crate::calendar::{is_weekend, month_label, CalendarContext};
use crate::metrics::{FirstLastBreak, Metrics};
use crate::types::Bridge;

const LONG_BLOCK_MIN_DAYS: usize = 3;
const REST_BLOCK_GAP_DAYS: i64 = 7;

/// Metrics for an untouched suggestion.
pub fn calculate_metrics(
    ctx: &CalendarContext,
    active_days: &[NaiveDate],
    bridges: &[Bridge],
) -> Metrics {
    calculate(ctx, active_days, bridges, None)
}

/// Metrics once manual edits exist; `budget` lets unused days carry forward
/// into the bonus figure.
pub fn calculate_edited_metrics(
    ctx: &CalendarContext,
    active_days: &[NaiveDate],
    bridges: &[Bridge],
    budget: u32,
) -> Metrics {
    calculate(ctx, active_days, bridges, Some(budget))
}

fn calculate(
    ctx: &CalendarContext,
    active_days: &[NaiveDate],
    bridges: &[Bridge],
    edited_budget: Option<u32>,
) -> Metrics {
    let mut days = active_days.to_vec();
    days.sort();
    days.dedup();
    if days.is_empty() {
        return Metrics::default();
    }
    let active: HashSet<NaiveDate> = days.iter().copied().collect();
    let active_count = days.len() as u32;

    let mut monthly_dist = [0u32; 12];
    let mut quarter_dist = [0u32; 4];
    for day in &days {
        monthly_dist[day.month0() as usize] += 1;
        quarter_dist[quarter_of(*day)] += 1;
    }

    let total_effective_days = total_effective_days(&days, &active, bridges);
    let bridges_used = bridges
        .iter()
        .filter(|bridge| bridge.pto_days.iter().all(|d| active.contains(d)))
        .count() as u32;

    let bonus_days = match edited_budget {
        None => total_effective_days.saturating_sub(active_count),
        Some(budget) => {
            let unused = budget.saturating_sub(active_count);
            total_effective_days.saturating_sub(budget - unused)
        }
    };

    let first_last_break = match (days.first(), days.last()) {
        (Some(first), Some(last)) => Some(FirstLastBreak {
            first: month_label(*first).to_string(),
            last: month_label(*last).to_string(),
        }),
        _ => None,
    };

    Metrics {
        long_weekends: days
            .iter()
            .filter(|d| matches!(d.weekday(), Weekday::Mon | Weekday::Fri))
            .count() as u32,
        rest_blocks: rest_blocks(&days),
        max_working_period: max_working_period(ctx, &active),
        first_last_break,
        average_efficiency: f64::from(total_effective_days) / f64::from(active_count),
        bonus_days,
        quarter_dist,
        monthly_dist,
        bridges_used,
        working_days_per_month: working_days_per_month(ctx, &active),
        total_effective_days,
        long_blocks_per_quarter: long_blocks_per_quarter(&days),
    }
}

fn quarter_of(day: NaiveDate) -> usize {
    (day.month0() / 3) as usize
}

/// Effective days of every bridge that survives intact, plus one for each
/// active day no surviving bridge covers.
fn total_effective_days(days: &[NaiveDate], active: &HashSet<NaiveDate>, bridges: &[Bridge]) -> u32 {
    let mut covered: HashSet<NaiveDate> = HashSet::new();
    let mut total = 0u32;
    for bridge in bridges {
        if bridge.pto_days.iter().all(|d| active.contains(d)) {
            total += bridge.effective_days;
            covered.extend(bridge.pto_days.iter().copied());
        }
    }
    let standalone = days.iter().filter(|d| !covered.contains(d)).count() as u32;
    total + standalone
}

fn rest_blocks(days: &[NaiveDate]) -> u32 {
    let mut blocks = 0;
    let mut previous: Option<NaiveDate> = None;
    for day in days {
        match previous {
            Some(prev) if (*day - prev).num_days() <= REST_BLOCK_GAP_DAYS => {}
            _ => blocks += 1,
        }
        previous = Some(*day);
    }
    blocks
}

fn long_blocks_per_quarter(days: &[NaiveDate]) -> [u32; 4] {
    let mut out = [0u32; 4];
    let mut run_start = 0usize;
    for i in 1..=days.len() {
        let continues = i < days.len() && (days[i] - days[i - 1]).num_days() == 1;
        if continues {
            continue;
        }
        if i - run_start >= LONG_BLOCK_MIN_DAYS {
            out[quarter_of(days[run_start])] += 1;
        }
        run_start = i;
    }
    out
}

fn max_working_period(ctx: &CalendarContext, active: &HashSet<NaiveDate>) -> u32 {
    let mut longest = 0u32;
    let mut current = 0u32;
    for day in ctx.days() {
        if ctx.is_past(*day) || is_weekend(*day) {
            continue;
        }
        if ctx.is_holiday(*day) || active.contains(day) {
            current = 0;
            continue;
        }
        current += 1;
        longest = longest.max(current);
    }
    longest
}

fn working_days_per_month(ctx: &CalendarContext, active: &HashSet<NaiveDate>) -> f64 {
    let months = ctx.month_anchors().len();
    if months == 0 {
        return 0.0;
    }
    let working = ctx
        .days()
        .iter()
        .filter(|d| ctx.is_workday(**d) && !active.contains(*d))
        .count();
    working as f64 / months as f64
}
