pub mod derive;
pub mod finder;

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::calendar::CalendarContext;
use crate::types::Bridge;

/// Gaps longer than this many workdays are not scanned at all.
pub const MAX_GAP_WORKDAYS: usize = 5;
/// Largest gap that is turned into a bridge.
pub const MAX_GAP_PTO_DAYS: usize = 3;
/// Per-direction step cap when walking outward over free days.
pub const EXPANSION_LIMIT: u32 = 30;

/// Walks outward from `start..=end` over free days inside the horizon.
pub fn expand_over_free_days(
    ctx: &CalendarContext,
    start: NaiveDate,
    end: NaiveDate,
) -> (NaiveDate, NaiveDate) {
    let mut left = start;
    for _ in 0..EXPANSION_LIMIT {
        match left.pred_opt() {
            Some(prev) if ctx.in_horizon(prev) && ctx.is_free(prev) => left = prev,
            _ => break,
        }
    }

    let mut right = end;
    for _ in 0..EXPANSION_LIMIT {
        match right.succ_opt() {
            Some(next) if ctx.in_horizon(next) && ctx.is_free(next) => right = next,
            _ => break,
        }
    }

    (left, right)
}

/// Collapses bridges with the same PTO days, keeping the most efficient one.
pub fn dedupe_bridges(candidates: Vec<Bridge>) -> Vec<Bridge> {
    let mut by_key: BTreeMap<String, Bridge> = BTreeMap::new();
    for bridge in candidates {
        let key = bridge.key();
        match by_key.get(&key) {
            Some(existing) if !outranks(&bridge, existing) => {}
            _ => {
                by_key.insert(key, bridge);
            }
        }
    }
    by_key.into_values().collect()
}

fn outranks(candidate: &Bridge, existing: &Bridge) -> bool {
    match candidate.efficiency.total_cmp(&existing.efficiency) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => candidate.effective_days > existing.effective_days,
    }
}

/// Efficiency, then effective days, then holiday connections, all descending.
/// Start date and key settle whatever is left so the order is total.
pub fn rank_bridges(bridges: &mut [Bridge]) {
    bridges.sort_by(|a, b| {
        b.efficiency
            .total_cmp(&a.efficiency)
            .then_with(|| b.effective_days.cmp(&a.effective_days))
            .then_with(|| b.holiday_connections.cmp(&a.holiday_connections))
            .then_with(|| a.start_date.cmp(&b.start_date))
            .then_with(|| a.pto_days.cmp(&b.pto_days))
    });
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{dedupe_bridges, expand_over_free_days, rank_bridges};
    use crate::calendar::CalendarContext;
    use crate::types::{Bridge, Holiday};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn expansion_stops_at_workdays_and_horizon_edges() {
        let ctx = CalendarContext::new(
            &[date(2026, 10, 1)],
            &[Holiday::national(date(2026, 10, 15), "Founders Day")],
            date(2026, 1, 1),
            false,
        );
        let (start, end) = expand_over_free_days(&ctx, date(2026, 10, 16), date(2026, 10, 16));
        assert_eq!(start, date(2026, 10, 15));
        assert_eq!(end, date(2026, 10, 18));

        // Oct 31 is a Saturday; Nov 1 is outside the horizon.
        let (_, end) = expand_over_free_days(&ctx, date(2026, 10, 30), date(2026, 10, 30));
        assert_eq!(end, date(2026, 10, 31));
    }

    #[test]
    fn expansion_terminates_on_all_holiday_horizon() {
        let holidays: Vec<Holiday> = (1..=31)
            .map(|d| Holiday::custom(date(2026, 1, d), "Shutdown"))
            .chain((1..=28).map(|d| Holiday::custom(date(2026, 2, d), "Shutdown")))
            .collect();
        let ctx = CalendarContext::new(
            &[date(2026, 1, 1), date(2026, 2, 1)],
            &holidays,
            date(2026, 1, 1),
            false,
        );
        let (start, end) = expand_over_free_days(&ctx, date(2026, 1, 31), date(2026, 1, 31));
        assert_eq!(start, date(2026, 1, 1));
        assert_eq!(end, date(2026, 2, 28));
    }

    #[test]
    fn dedupe_keeps_more_efficient_copy_and_ranking_is_stable() {
        let fri = date(2026, 10, 16);
        let short = Bridge::try_new(date(2026, 10, 16), date(2026, 10, 18), vec![fri], 0)
            .expect("short bridge");
        let long = Bridge::try_new(date(2026, 10, 15), date(2026, 10, 18), vec![fri], 1)
            .expect("long bridge");
        let monday = Bridge::try_new(
            date(2026, 10, 17),
            date(2026, 10, 19),
            vec![date(2026, 10, 19)],
            0,
        )
        .expect("monday bridge");

        let mut bridges = dedupe_bridges(vec![short, monday.clone(), long.clone()]);
        assert_eq!(bridges.len(), 2);
        rank_bridges(&mut bridges);
        assert_eq!(bridges[0], long);
        assert_eq!(bridges[1], monday);
    }
}
