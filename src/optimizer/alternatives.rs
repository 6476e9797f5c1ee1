use std::collections::HashSet;

use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::bridges::derive::derive_bridges;
use crate::calendar::CalendarContext;
use crate::optimizer::strategy::ACCEPTABLE_EFFICIENCY;
use crate::optimizer::{assemble_suggestion, build_suggestion, SelectionState};
use crate::types::{Bridge, Strategy, Suggestion};

pub const DEFAULT_MAX_ALTERNATIVES: usize = 4;

const WEEK_OFFSETS: [i64; 6] = [7, -7, 14, -14, 21, -21];
const MAX_ROTATION_ATTEMPTS: i64 = 14;
const MAX_SUBSTITUTION_CANDIDATES: usize = 30;
const MAX_SKIP_DEPTH: usize = 5;
const MAX_MEDIUM_VARIANTS: usize = 3;
const MEDIUM_PTO_RANGE: std::ops::RangeInclusive<u32> = 2..=3;

pub struct AlternativeRequest<'a> {
    pub ctx: &'a CalendarContext,
    pub available: &'a [NaiveDate],
    /// Ranked bridge pool the primary was selected from.
    pub pool: &'a [Bridge],
    pub primary: &'a Suggestion,
    pub budget: u32,
    pub max_alternatives: usize,
}

/// Builds up to `max_alternatives` selections that differ from the primary
/// and from each other.
///
/// No alternative may total more effective days than the primary: the primary
/// stays the recommended option even when a tactic stumbles on a better mix.
pub fn generate_alternatives(request: &AlternativeRequest<'_>) -> Vec<Suggestion> {
    if request.max_alternatives == 0 || request.primary.is_empty() {
        return Vec::new();
    }

    let mut collector = Collector::new(request);
    block_shift(request, &mut collector);
    block_rotation(request, &mut collector);
    similar_substitution(request, &mut collector);
    match request.primary.strategy {
        Strategy::Optimized => skip_and_reselect(request, &mut collector),
        Strategy::Balanced => medium_single_fill(request, &mut collector),
        Strategy::Grouped => {}
    }

    let mut accepted = collector.accepted;
    accepted.sort_by(|a, b| {
        b.efficiency()
            .total_cmp(&a.efficiency())
            .then_with(|| b.total_effective_days().cmp(&a.total_effective_days()))
            .then_with(|| a.days.cmp(&b.days))
    });
    accepted.truncate(request.max_alternatives);
    debug!(
        strategy = %request.primary.strategy,
        alternatives = accepted.len(),
        rejected = collector.rejected,
        "alternatives generated"
    );
    accepted
}

struct Collector<'a> {
    ctx: &'a CalendarContext,
    strategy: Strategy,
    budget: usize,
    max: usize,
    primary_effective: u32,
    floor: f64,
    used_keys: HashSet<String>,
    accepted: Vec<Suggestion>,
    rejected: usize,
}

impl<'a> Collector<'a> {
    fn new(request: &AlternativeRequest<'a>) -> Self {
        let primary = request.primary;
        let mut used_keys = HashSet::new();
        used_keys.insert(primary.key());
        Self {
            ctx: request.ctx,
            strategy: primary.strategy,
            budget: request.budget as usize,
            max: request.max_alternatives,
            primary_effective: primary.total_effective_days(),
            floor: primary.strategy.min_alternative_efficiency(),
            used_keys,
            accepted: Vec::new(),
            rejected: 0,
        }
    }

    fn is_full(&self) -> bool {
        self.accepted.len() >= self.max
    }

    /// Offers a bare day set; bridges are re-derived from the calendar.
    fn offer_days(&mut self, days: Vec<NaiveDate>) -> bool {
        if self.is_full() {
            return false;
        }
        let bridges = derive_bridges(self.ctx, &days);
        let candidate = assemble_suggestion(self.ctx, days, bridges, self.strategy);
        self.offer(candidate)
    }

    fn offer_bridges(&mut self, bridges: Vec<Bridge>, standalone: &[NaiveDate]) -> bool {
        if self.is_full() {
            return false;
        }
        let mut days: Vec<NaiveDate> = bridges
            .iter()
            .flat_map(|b| b.pto_days.iter().copied())
            .collect();
        days.extend_from_slice(standalone);
        let candidate = assemble_suggestion(self.ctx, days, bridges, self.strategy);
        self.offer(candidate)
    }

    fn offer(&mut self, candidate: Suggestion) -> bool {
        if self.is_full() {
            return false;
        }
        let key = candidate.key();
        let acceptable = !candidate.is_empty()
            && candidate.days.len() <= self.budget
            && !self.used_keys.contains(&key)
            && candidate.total_effective_days() <= self.primary_effective
            && candidate.efficiency() >= self.floor;
        if !acceptable {
            self.rejected += 1;
            return false;
        }
        self.used_keys.insert(key);
        self.accepted.push(candidate);
        true
    }
}

/// Moves the whole selection by whole weeks.
fn block_shift(request: &AlternativeRequest<'_>, collector: &mut Collector<'_>) {
    let available: HashSet<NaiveDate> = request.available.iter().copied().collect();
    for offset in WEEK_OFFSETS {
        if collector.is_full() {
            return;
        }
        let shifted: Option<Vec<NaiveDate>> = request
            .primary
            .days
            .iter()
            .map(|day| day.checked_add_signed(Duration::days(offset)))
            .map(|day| day.filter(|d| available.contains(d)))
            .collect();
        if let Some(days) = shifted {
            collector.offer_days(days);
        }
    }
}

/// Slides past the end of the selection one day at a time and takes the same
/// number of workdays from there.
fn block_rotation(request: &AlternativeRequest<'_>, collector: &mut Collector<'_>) {
    let count = request.primary.days.len();
    let Some(last) = request.primary.days.last().copied() else {
        return;
    };
    for attempt in 1..=MAX_ROTATION_ATTEMPTS {
        if collector.is_full() {
            return;
        }
        let start = last + Duration::days(attempt);
        let days: Vec<NaiveDate> = request
            .available
            .iter()
            .copied()
            .filter(|day| *day >= start)
            .take(count)
            .collect();
        if days.len() < count {
            return;
        }
        collector.offer_days(days);
    }
}

fn is_similar(target: &Bridge, candidate: &Bridge) -> bool {
    target.effective_days.abs_diff(candidate.effective_days) <= 1
        && target.pto_days_needed.abs_diff(candidate.pto_days_needed) <= 1
}

/// Swaps one chosen bridge for an unused bridge of about the same size.
fn similar_substitution(request: &AlternativeRequest<'_>, collector: &mut Collector<'_>) {
    let primary = request.primary;
    let chosen_keys: HashSet<String> = primary.bridges.iter().map(Bridge::key).collect();
    let standalone = primary.standalone_days();

    for (index, target) in primary.bridges.iter().enumerate() {
        if collector.is_full() {
            return;
        }
        let kept: Vec<Bridge> = primary
            .bridges
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, b)| b.clone())
            .collect();
        let taken: HashSet<NaiveDate> = kept
            .iter()
            .flat_map(|b| b.pto_days.iter().copied())
            .chain(standalone.iter().copied())
            .collect();

        let replacements = request
            .pool
            .iter()
            .filter(|b| !chosen_keys.contains(&b.key()) && is_similar(target, b))
            .take(MAX_SUBSTITUTION_CANDIDATES);
        for replacement in replacements {
            if replacement.pto_days.iter().any(|d| taken.contains(d)) {
                continue;
            }
            let mut bridges = kept.clone();
            bridges.push(replacement.clone());
            collector.offer_bridges(bridges, &standalone);
            if collector.is_full() {
                return;
            }
        }
    }
}

/// Re-runs selection with the top-ranked bridges removed from the pool.
fn skip_and_reselect(request: &AlternativeRequest<'_>, collector: &mut Collector<'_>) {
    let depth = MAX_SKIP_DEPTH.min(request.pool.len());
    for skip in 1..=depth {
        if collector.is_full() {
            return;
        }
        let candidate = build_suggestion(
            request.ctx,
            request.available,
            &request.pool[skip..],
            request.budget,
            request.primary.strategy,
        );
        collector.offer(candidate);
    }
}

/// Mixes medium (2 or 3 day) bridges with the best single-day bridges until the
/// primary's day count is matched exactly.
fn medium_single_fill(request: &AlternativeRequest<'_>, collector: &mut Collector<'_>) {
    let target = request.primary.days.len();
    let target_budget = u32::try_from(target).unwrap_or(u32::MAX);
    let mediums: Vec<&Bridge> = request
        .pool
        .iter()
        .filter(|b| {
            MEDIUM_PTO_RANGE.contains(&b.pto_days_needed) && b.efficiency >= ACCEPTABLE_EFFICIENCY
        })
        .take(MAX_SUBSTITUTION_CANDIDATES)
        .collect();
    let singles: Vec<&Bridge> = request
        .pool
        .iter()
        .filter(|b| b.is_single_day())
        .take(MAX_SUBSTITUTION_CANDIDATES)
        .collect();
    if mediums.is_empty() {
        return;
    }

    for variant in 0..MAX_MEDIUM_VARIANTS.min(mediums.len()) {
        if collector.is_full() {
            return;
        }
        let mut state = SelectionState::new(target_budget);
        for medium in mediums.iter().skip(variant) {
            state.try_take(medium);
        }
        for single in &singles {
            if state.remaining() == 0 {
                break;
            }
            state.try_take(single);
        }
        if state.day_count() == target {
            collector.offer_bridges(state.into_bridges(), &[]);
        }
    }
}
