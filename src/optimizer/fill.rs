use std::cmp::Reverse;
use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::calendar::CalendarContext;

/// Spends what is left of `budget` on single workdays, one at a time.
///
/// Each pick favours days whose neighbours are already off (free or selected),
/// then the earliest date. Returns the days that were added; `days` is kept
/// sorted.
pub fn fill_remaining_budget(
    ctx: &CalendarContext,
    available: &[NaiveDate],
    days: &mut Vec<NaiveDate>,
    budget: u32,
) -> Vec<NaiveDate> {
    let mut selected: BTreeSet<NaiveDate> = days.iter().copied().collect();
    let mut candidates: Vec<NaiveDate> = available
        .iter()
        .copied()
        .filter(|day| !selected.contains(day))
        .collect();
    let mut added = Vec::new();

    while (selected.len() as u64) < u64::from(budget) && !candidates.is_empty() {
        let Some((index, _)) = candidates
            .iter()
            .enumerate()
            .max_by_key(|(_, day)| (neighbour_score(ctx, &selected, **day), Reverse(**day)))
        else {
            break;
        };
        let day = candidates.remove(index);
        selected.insert(day);
        added.push(day);
    }

    *days = selected.into_iter().collect();
    added.sort();
    added
}

fn neighbour_score(ctx: &CalendarContext, selected: &BTreeSet<NaiveDate>, day: NaiveDate) -> u8 {
    [day.pred_opt(), day.succ_opt()]
        .into_iter()
        .flatten()
        .filter(|n| selected.contains(n) || (ctx.in_horizon(*n) && ctx.is_free(*n)))
        .count() as u8
}
