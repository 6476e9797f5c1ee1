use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::bridges::{expand_over_free_days, EXPANSION_LIMIT};
use crate::calendar::CalendarContext;
use crate::types::Bridge;

/// Regroups an arbitrary day selection into bridges.
///
/// Selected days are joined through free days into off-blocks. A block becomes
/// a bridge only when it clears the creation floor; days in weaker blocks are
/// left for the caller to treat as standalone.
pub fn derive_bridges(ctx: &CalendarContext, days: &[NaiveDate]) -> Vec<Bridge> {
    let selected: BTreeSet<NaiveDate> = days.iter().copied().collect();
    let mut consumed: BTreeSet<NaiveDate> = BTreeSet::new();
    let mut bridges = Vec::new();

    for day in &selected {
        if consumed.contains(day) {
            continue;
        }
        let (start, _) = expand_over_free_days(ctx, *day, *day);

        let mut end = *day;
        let mut block_days = vec![*day];
        let mut free_streak = 0;
        while free_streak < EXPANSION_LIMIT {
            let Some(next) = end.succ_opt() else {
                break;
            };
            if !ctx.in_horizon(next) {
                break;
            }
            if selected.contains(&next) {
                block_days.push(next);
                free_streak = 0;
            } else if ctx.is_free(next) {
                free_streak += 1;
            } else {
                break;
            }
            end = next;
        }

        consumed.extend(block_days.iter().copied());
        let connections = ctx.holidays_between(start, end);
        if let Some(bridge) = Bridge::try_new(start, end, block_days, connections) {
            bridges.push(bridge);
        }
    }

    bridges
}
