pub mod alternatives;
pub mod fill;
pub mod manual;
pub mod strategy;

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::CalendarContext;
use crate::metrics::calculator::calculate_metrics;
use crate::optimizer::fill::fill_remaining_budget;
use crate::optimizer::strategy::select_bridges;
use crate::types::{Bridge, Strategy, Suggestion};

/// Outcome of a strategy pass over the bridge pool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Selection {
    pub bridges: Vec<Bridge>,
    /// Chronological, flattened PTO days of the chosen bridges.
    pub days: Vec<NaiveDate>,
    pub effective_days: u32,
}

/// Greedy bookkeeping shared by every selection pass: the days already used
/// and what is left of the budget.
#[derive(Debug, Clone)]
pub(crate) struct SelectionState {
    chosen: Vec<Bridge>,
    chosen_keys: HashSet<String>,
    used: HashSet<NaiveDate>,
    remaining: u32,
}

impl SelectionState {
    pub(crate) fn new(budget: u32) -> Self {
        Self {
            chosen: Vec::new(),
            chosen_keys: HashSet::new(),
            used: HashSet::new(),
            remaining: budget,
        }
    }

    pub(crate) fn remaining(&self) -> u32 {
        self.remaining
    }

    pub(crate) fn day_count(&self) -> usize {
        self.used.len()
    }

    pub(crate) fn conflicts(&self, bridge: &Bridge) -> bool {
        bridge.pto_days.iter().any(|day| self.used.contains(day))
    }

    /// Takes the bridge when it fits the budget and shares no day with earlier picks.
    pub(crate) fn try_take(&mut self, bridge: &Bridge) -> bool {
        if bridge.pto_days_needed > self.remaining
            || self.chosen_keys.contains(&bridge.key())
            || self.conflicts(bridge)
        {
            return false;
        }
        self.remaining -= bridge.pto_days_needed;
        self.chosen_keys.insert(bridge.key());
        self.used.extend(bridge.pto_days.iter().copied());
        self.chosen.push(bridge.clone());
        true
    }

    pub(crate) fn into_bridges(self) -> Vec<Bridge> {
        self.chosen
    }

    pub(crate) fn into_selection(self) -> Selection {
        let mut days: Vec<NaiveDate> = self.used.into_iter().collect();
        days.sort();
        let effective_days = self.chosen.iter().map(|b| b.effective_days).sum();
        let mut bridges = self.chosen;
        bridges.sort_by(|a, b| a.start_date.cmp(&b.start_date));
        Selection {
            bridges,
            days,
            effective_days,
        }
    }
}

/// Wraps a day set and the bridges behind it into a suggestion with metrics.
pub fn assemble_suggestion(
    ctx: &CalendarContext,
    days: Vec<NaiveDate>,
    mut bridges: Vec<Bridge>,
    strategy: Strategy,
) -> Suggestion {
    let mut days = days;
    days.sort();
    days.dedup();
    bridges.sort_by(|a, b| {
        a.start_date
            .cmp(&b.start_date)
            .then_with(|| a.pto_days.cmp(&b.pto_days))
    });
    let metrics = calculate_metrics(ctx, &days, &bridges);
    Suggestion {
        days,
        bridges,
        strategy,
        metrics,
    }
}

/// Strategy selection followed by the leftover fill.
pub fn build_suggestion(
    ctx: &CalendarContext,
    available: &[NaiveDate],
    pool: &[Bridge],
    budget: u32,
    strategy: Strategy,
) -> Suggestion {
    let budget = budget.min(u32::try_from(available.len()).unwrap_or(u32::MAX));
    if budget == 0 {
        return Suggestion::empty(strategy);
    }
    let selection = select_bridges(pool, budget, strategy);
    let mut days = selection.days;
    fill_remaining_budget(ctx, available, &mut days, budget);
    assemble_suggestion(ctx, days, selection.bridges, strategy)
}
