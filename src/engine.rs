//! Top-level planning entry point.
//!
//! Every call builds its own [`CalendarContext`], so concurrent plans for
//! different users or horizons never share lookup state.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bridges::finder::find_bridges;
use crate::calendar::availability::available_workdays;
use crate::calendar::CalendarContext;
use crate::optimizer::alternatives::{
    generate_alternatives, AlternativeRequest, DEFAULT_MAX_ALTERNATIVES,
};
use crate::optimizer::build_suggestion;
use crate::types::{Bridge, Holiday, Strategy, Suggestion};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRequest {
    /// Month anchors, in order.
    pub horizon: Vec<NaiveDate>,
    pub holidays: Vec<Holiday>,
    pub budget: u32,
    #[serde(default)]
    pub strategy: Strategy,
    #[serde(default)]
    pub allow_past_days: bool,
    pub today: NaiveDate,
    #[serde(default = "default_max_alternatives")]
    pub max_alternatives: usize,
}

impl PlanRequest {
    pub fn context(&self) -> CalendarContext {
        CalendarContext::new(&self.horizon, &self.holidays, self.today, self.allow_past_days)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanOutcome {
    pub primary: Suggestion,
    pub alternatives: Vec<Suggestion>,
    /// Ranked bridge pool the suggestions were drawn from.
    pub bridges: Vec<Bridge>,
    pub available_workdays: usize,
}

impl PlanOutcome {
    fn empty(strategy: Strategy, available_workdays: usize) -> Self {
        Self {
            primary: Suggestion::empty(strategy),
            alternatives: Vec::new(),
            bridges: Vec::new(),
            available_workdays,
        }
    }
}

pub fn plan(request: &PlanRequest) -> PlanOutcome {
    let ctx = request.context();
    plan_in(&ctx, request)
}

/// Same as [`plan`] with a caller-built context, for callers that reuse it
/// afterwards (e.g. to compute edited metrics).
pub fn plan_in(ctx: &CalendarContext, request: &PlanRequest) -> PlanOutcome {
    let available = available_workdays(ctx);
    if request.budget == 0 || available.is_empty() {
        debug!(
            budget = request.budget,
            available = available.len(),
            "nothing to plan"
        );
        return PlanOutcome::empty(request.strategy, available.len());
    }

    let bridges = find_bridges(ctx, &available);
    let primary = build_suggestion(ctx, &available, &bridges, request.budget, request.strategy);
    let alternatives = generate_alternatives(&AlternativeRequest {
        ctx,
        available: &available,
        pool: &bridges,
        primary: &primary,
        budget: request.budget,
        max_alternatives: request.max_alternatives,
    });
    debug!(
        strategy = %request.strategy,
        budget = request.budget,
        days = primary.days.len(),
        effective = primary.total_effective_days(),
        alternatives = alternatives.len(),
        "plan computed"
    );

    PlanOutcome {
        primary,
        alternatives,
        bridges,
        available_workdays: available.len(),
    }
}

fn default_max_alternatives() -> usize {
    DEFAULT_MAX_ALTERNATIVES
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::NaiveDate;

    use super::{plan, PlanRequest};
    use crate::calendar::availability::available_workdays;
    use crate::calendar::horizon::build_horizon;
    use crate::types::{Holiday, Strategy, MIN_BRIDGE_EFFICIENCY};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn year_holidays() -> Vec<Holiday> {
        vec![
            Holiday::national(date(2026, 1, 1), "New Year's Day"),
            Holiday::national(date(2026, 1, 6), "Epiphany"),
            Holiday::national(date(2026, 4, 3), "Good Friday"),
            Holiday::national(date(2026, 4, 6), "Easter Monday"),
            Holiday::national(date(2026, 5, 1), "Labour Day"),
            Holiday::national(date(2026, 8, 15), "Assumption"),
            Holiday::national(date(2026, 10, 12), "National Day"),
            Holiday::national(date(2026, 11, 26), "Thanksgiving"),
            Holiday::national(date(2026, 12, 8), "Immaculate Conception"),
            Holiday::national(date(2026, 12, 24), "Christmas Eve"),
            Holiday::national(date(2026, 12, 25), "Christmas Day"),
            Holiday::custom(date(2026, 12, 31), "Office closed"),
        ]
    }

    fn request(budget: u32, strategy: Strategy) -> PlanRequest {
        PlanRequest {
            horizon: build_horizon(2026, 0),
            holidays: year_holidays(),
            budget,
            strategy,
            allow_past_days: false,
            today: date(2026, 1, 1),
            max_alternatives: 4,
        }
    }

    #[test]
    fn thursday_holiday_scenario() {
        let request = PlanRequest {
            horizon: vec![date(2026, 10, 1)],
            holidays: vec![Holiday::national(date(2026, 10, 15), "Founders Day")],
            budget: 1,
            strategy: Strategy::Grouped,
            allow_past_days: false,
            today: date(2026, 1, 1),
            max_alternatives: 4,
        };
        let outcome = plan(&request);
        assert_eq!(outcome.primary.days, vec![date(2026, 10, 16)]);
        assert_eq!(outcome.primary.bridges.len(), 1);
        assert_eq!(outcome.primary.bridges[0].effective_days, 4);
        assert_eq!(outcome.primary.bridges[0].efficiency, 4.0);
        assert_eq!(outcome.primary.total_effective_days(), 4);
    }

    #[test]
    fn zero_budget_is_empty() {
        let outcome = plan(&request(0, Strategy::Balanced));
        assert!(outcome.primary.days.is_empty());
        assert!(outcome.primary.metrics.is_empty());
        assert!(outcome.alternatives.is_empty());
    }

    #[test]
    fn budget_beyond_availability_selects_everything_once() {
        let request = PlanRequest {
            horizon: vec![date(2026, 10, 1)],
            holidays: vec![Holiday::national(date(2026, 10, 15), "Founders Day")],
            budget: 400,
            strategy: Strategy::Optimized,
            allow_past_days: false,
            today: date(2026, 1, 1),
            max_alternatives: 4,
        };
        let outcome = plan(&request);
        let available = available_workdays(&request.context());
        assert_eq!(outcome.primary.days, available);
        assert_eq!(outcome.available_workdays, 21);
    }

    #[test]
    fn core_properties_hold_across_budgets_and_strategies() {
        for strategy in Strategy::ALL {
            for budget in [1, 4, 10, 22, 35] {
                let request = request(budget, strategy);
                let available: HashSet<NaiveDate> =
                    available_workdays(&request.context()).into_iter().collect();
                let outcome = plan(&request);

                assert!(outcome.primary.days.len() as u32 <= budget);
                assert!(outcome.primary.days.len() <= available.len());
                assert!(outcome.primary.days.iter().all(|d| available.contains(d)));
                assert!(outcome.primary.days.windows(2).all(|w| w[0] < w[1]));

                for bridge in outcome.bridges.iter().chain(outcome.primary.bridges.iter()) {
                    assert!(bridge.pto_days.iter().all(|d| available.contains(d)));
                    assert!(bridge.efficiency >= MIN_BRIDGE_EFFICIENCY);
                    assert_eq!(
                        bridge.efficiency,
                        f64::from(bridge.effective_days) / f64::from(bridge.pto_days_needed)
                    );
                }

                let mut keys = HashSet::new();
                keys.insert(outcome.primary.key());
                for alternative in &outcome.alternatives {
                    assert!(keys.insert(alternative.key()));
                    assert!(
                        alternative.total_effective_days()
                            <= outcome.primary.total_effective_days()
                    );
                }
            }
        }
    }

    #[test]
    fn planning_is_deterministic() {
        for strategy in Strategy::ALL {
            let first = plan(&request(12, strategy));
            let second = plan(&request(12, strategy));
            assert_eq!(first, second);
        }
    }

    #[test]
    fn all_holiday_year_degrades_to_empty() {
        let mut holidays = Vec::new();
        let mut day = date(2026, 1, 1);
        while day <= date(2026, 12, 31) {
            holidays.push(Holiday::custom(day, "Sabbatical"));
            day = day.succ_opt().expect("next day");
        }
        let mut request = request(10, Strategy::Balanced);
        request.holidays = holidays;
        let outcome = plan(&request);
        assert!(outcome.primary.days.is_empty());
        assert_eq!(outcome.available_workdays, 0);
    }
}
