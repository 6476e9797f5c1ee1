use std::cmp::Ordering;

use tracing::debug;

use crate::optimizer::{Selection, SelectionState};
use crate::types::{Bridge, Strategy};

pub const MULTI_DAY_BONUS: f64 = 1.5;
pub const HIGH_VALUE_MIN_PTO_DAYS: u32 = 3;
pub const HIGH_VALUE_MIN_EFFECTIVE_DAYS: u32 = 9;
/// Efficiency a bridge needs to count as high value; also the medium floor
/// used when mixing medium and single-day bridges.
pub const ACCEPTABLE_EFFICIENCY: f64 = 2.5;
/// Efficiencies closer than this are treated as equal by the optimized ordering.
pub const EFFICIENCY_TOLERANCE: f64 = 0.1;

/// Picks a conflict-free set of bridges from the ranked pool within `budget`.
pub fn select_bridges(pool: &[Bridge], budget: u32, strategy: Strategy) -> Selection {
    let mut state = SelectionState::new(budget);
    match strategy {
        Strategy::Balanced => select_balanced(pool, &mut state),
        Strategy::Grouped => {
            for bridge in order_grouped(pool) {
                state.try_take(bridge);
            }
        }
        Strategy::Optimized => {
            for bridge in order_optimized(pool) {
                state.try_take(bridge);
            }
        }
    }
    let selection = state.into_selection();
    debug!(
        %strategy,
        budget,
        pool = pool.len(),
        chosen = selection.bridges.len(),
        days = selection.days.len(),
        "bridges selected"
    );
    selection
}

pub fn balanced_score(bridge: &Bridge) -> f64 {
    let base = bridge.efficiency * 0.6 + (f64::from(bridge.effective_days) / 10.0) * 0.4;
    if is_multi_day_block(bridge) {
        base * MULTI_DAY_BONUS
    } else {
        base
    }
}

fn is_multi_day_block(bridge: &Bridge) -> bool {
    bridge.pto_days_needed >= HIGH_VALUE_MIN_PTO_DAYS
        && bridge.effective_days >= HIGH_VALUE_MIN_EFFECTIVE_DAYS
}

pub fn is_high_value(bridge: &Bridge) -> bool {
    is_multi_day_block(bridge) && bridge.efficiency >= ACCEPTABLE_EFFICIENCY
}

fn select_balanced(pool: &[Bridge], state: &mut SelectionState) {
    let mut scored: Vec<(f64, &Bridge)> = pool.iter().map(|b| (balanced_score(b), b)).collect();
    // Stable sort keeps pool rank for equal scores.
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    for (_, bridge) in scored.iter().filter(|(_, b)| is_high_value(b)) {
        state.try_take(bridge);
    }
    for (_, bridge) in &scored {
        state.try_take(bridge);
    }
    for (_, bridge) in scored.iter().filter(|(_, b)| b.is_single_day()) {
        if state.remaining() == 0 {
            break;
        }
        state.try_take(bridge);
    }
}

/// Most PTO days first, then efficiency.
pub fn order_grouped(pool: &[Bridge]) -> Vec<&Bridge> {
    let mut ordered: Vec<&Bridge> = pool.iter().collect();
    ordered.sort_by(|a, b| {
        b.pto_days_needed
            .cmp(&a.pto_days_needed)
            .then_with(|| b.efficiency.total_cmp(&a.efficiency))
    });
    ordered
}

/// Efficiency first; efficiencies within [`EFFICIENCY_TOLERANCE`] tie and
/// fall back to effective days.
///
/// The tolerance makes the comparison non-transitive, so this uses a plain
/// insertion sort instead of `sort_by`: the outcome depends only on the input
/// order, which is the already ranked pool.
pub fn order_optimized(pool: &[Bridge]) -> Vec<&Bridge> {
    let mut ordered: Vec<&Bridge> = pool.iter().collect();
    for i in 1..ordered.len() {
        let mut j = i;
        while j > 0 && compare_optimized(ordered[j - 1], ordered[j]) == Ordering::Greater {
            ordered.swap(j - 1, j);
            j -= 1;
        }
    }
    ordered
}

fn compare_optimized(a: &Bridge, b: &Bridge) -> Ordering {
    if (a.efficiency - b.efficiency).abs() < EFFICIENCY_TOLERANCE {
        b.effective_days.cmp(&a.effective_days)
    } else {
        b.efficiency.total_cmp(&a.efficiency)
    }
}
