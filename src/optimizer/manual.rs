use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::CalendarContext;
use crate::metrics::calculator::calculate_edited_metrics;
use crate::metrics::Metrics;
use crate::types::Suggestion;

/// User toggles layered over a generated suggestion.
///
/// Invariants: the two sets never share a day, and every removed day belongs
/// to the suggestion the state is applied to.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManualEditState {
    #[serde(default)]
    pub manually_selected_days: BTreeSet<NaiveDate>,
    #[serde(default)]
    pub removed_suggested_days: BTreeSet<NaiveDate>,
}

impl ManualEditState {
    pub fn has_edits(&self) -> bool {
        !self.manually_selected_days.is_empty() || !self.removed_suggested_days.is_empty()
    }

    pub fn clear(&mut self) {
        self.manually_selected_days.clear();
        self.removed_suggested_days.clear();
    }

    /// Drops entries that contradict `suggestion`, e.g. state received from a client.
    pub fn reconcile_with(&mut self, suggestion: &Suggestion) {
        self.removed_suggested_days
            .retain(|day| suggestion.contains(*day));
        self.manually_selected_days
            .retain(|day| !suggestion.contains(*day));
    }

    /// Applies a click on `date`. Returns `false`, leaving the state untouched,
    /// only when a brand-new day is clicked with no budget left.
    pub fn toggle_day_selection(
        &mut self,
        suggestion: &Suggestion,
        date: NaiveDate,
        budget: u32,
    ) -> bool {
        if self.manually_selected_days.remove(&date) {
            return true;
        }
        if suggestion.contains(date) {
            if !self.removed_suggested_days.remove(&date) {
                self.removed_suggested_days.insert(date);
            }
            return true;
        }
        if self.remaining_signed(suggestion, budget) <= 0 {
            return false;
        }
        self.manually_selected_days.insert(date);
        true
    }

    pub fn remaining_days(&self, suggestion: &Suggestion, budget: u32) -> u32 {
        u32::try_from(self.remaining_signed(suggestion, budget).max(0)).unwrap_or(0)
    }

    fn remaining_signed(&self, suggestion: &Suggestion, budget: u32) -> i64 {
        let removed = self
            .removed_suggested_days
            .iter()
            .filter(|day| suggestion.contains(**day))
            .count() as i64;
        let active_suggested = suggestion.days.len() as i64 - removed;
        i64::from(budget) - active_suggested - self.manually_selected_days.len() as i64
    }

    /// Suggested days that were not removed, plus manual picks, in order.
    pub fn active_days(&self, suggestion: &Suggestion) -> Vec<NaiveDate> {
        let mut days: BTreeSet<NaiveDate> = suggestion
            .days
            .iter()
            .copied()
            .filter(|day| !self.removed_suggested_days.contains(day))
            .collect();
        days.extend(self.manually_selected_days.iter().copied());
        days.into_iter().collect()
    }

    pub fn metrics(&self, ctx: &CalendarContext, suggestion: &Suggestion, budget: u32) -> Metrics {
        if !self.has_edits() {
            return suggestion.metrics.clone();
        }
        calculate_edited_metrics(ctx, &self.active_days(suggestion), &suggestion.bridges, budget)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "kind", content = "index")]
pub enum ActiveSelection {
    Primary,
    Alternative(usize),
}

/// One user's interactive view: the generated suggestions, which one is
/// showing, and the edits made on top of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningSession {
    primary: Suggestion,
    alternatives: Vec<Suggestion>,
    active: ActiveSelection,
    edits: ManualEditState,
}

impl PlanningSession {
    pub fn new(primary: Suggestion, alternatives: Vec<Suggestion>) -> Self {
        Self {
            primary,
            alternatives,
            active: ActiveSelection::Primary,
            edits: ManualEditState::default(),
        }
    }

    pub fn primary(&self) -> &Suggestion {
        &self.primary
    }

    pub fn alternatives(&self) -> &[Suggestion] {
        &self.alternatives
    }

    pub fn active(&self) -> ActiveSelection {
        self.active
    }

    pub fn edits(&self) -> &ManualEditState {
        &self.edits
    }

    pub fn active_suggestion(&self) -> &Suggestion {
        match self.active {
            ActiveSelection::Primary => &self.primary,
            ActiveSelection::Alternative(index) => {
                self.alternatives.get(index).unwrap_or(&self.primary)
            }
        }
    }

    /// Switches to an alternative and drops any edits. Unknown indices are ignored.
    pub fn select_alternative(&mut self, index: usize) -> bool {
        if index >= self.alternatives.len() {
            return false;
        }
        self.active = ActiveSelection::Alternative(index);
        self.edits.clear();
        true
    }

    pub fn select_primary(&mut self) {
        self.active = ActiveSelection::Primary;
        self.edits.clear();
    }

    /// Installs edits received from elsewhere, dropping any that contradict
    /// the active suggestion.
    pub fn restore_edits(&mut self, mut edits: ManualEditState) {
        edits.reconcile_with(self.active_suggestion());
        self.edits = edits;
    }

    pub fn reset(&mut self) {
        self.edits.clear();
    }

    pub fn toggle_day_selection(&mut self, date: NaiveDate, budget: u32) -> bool {
        let suggestion = match self.active {
            ActiveSelection::Primary => &self.primary,
            ActiveSelection::Alternative(index) => {
                self.alternatives.get(index).unwrap_or(&self.primary)
            }
        };
        self.edits.toggle_day_selection(suggestion, date, budget)
    }

    pub fn remaining_days(&self, budget: u32) -> u32 {
        self.edits.remaining_days(self.active_suggestion(), budget)
    }

    pub fn active_days(&self) -> Vec<NaiveDate> {
        self.edits.active_days(self.active_suggestion())
    }

    pub fn metrics(&self, ctx: &CalendarContext, budget: u32) -> Metrics {
        self.edits.metrics(ctx, self.active_suggestion(), budget)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{ActiveSelection, ManualEditState, PlanningSession};
    use crate::calendar::CalendarContext;
    use crate::optimizer::assemble_suggestion;
    use crate::types::{Bridge, Holiday, Strategy, Suggestion};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn october() -> CalendarContext {
        CalendarContext::new(
            &[date(2026, 10, 1)],
            &[Holiday::national(date(2026, 10, 15), "Founders Day")],
            date(2026, 1, 1),
            false,
        )
    }

    fn suggestion(ctx: &CalendarContext) -> Suggestion {
        let bridge = Bridge::try_new(
            date(2026, 10, 15),
            date(2026, 10, 18),
            vec![date(2026, 10, 16)],
            1,
        )
        .expect("friday bridge");
        assemble_suggestion(
            ctx,
            vec![date(2026, 10, 16), date(2026, 10, 2)],
            vec![bridge],
            Strategy::Grouped,
        )
    }

    #[test]
    fn toggles_follow_state_machine() {
        let ctx = october();
        let suggestion = suggestion(&ctx);
        let mut state = ManualEditState::default();

        // Remove a suggested day, then restore it.
        assert!(state.toggle_day_selection(&suggestion, date(2026, 10, 16), 3));
        assert!(state.removed_suggested_days.contains(&date(2026, 10, 16)));
        assert_eq!(state.remaining_days(&suggestion, 3), 2);
        assert!(state.toggle_day_selection(&suggestion, date(2026, 10, 16), 3));
        assert!(!state.has_edits());

        // Add a brand-new day, then remove it again.
        assert!(state.toggle_day_selection(&suggestion, date(2026, 10, 20), 3));
        assert_eq!(state.remaining_days(&suggestion, 3), 0);
        assert!(state.toggle_day_selection(&suggestion, date(2026, 10, 20), 3));
        assert!(state.manually_selected_days.is_empty());
    }

    #[test]
    fn new_day_without_budget_is_refused() {
        let ctx = october();
        let suggestion = suggestion(&ctx);
        let mut state = ManualEditState::default();
        assert!(state.toggle_day_selection(&suggestion, date(2026, 10, 20), 3));
        let before = state.clone();
        assert!(!state.toggle_day_selection(&suggestion, date(2026, 10, 21), 3));
        assert_eq!(state, before);

        // Removing a suggested day frees room for the new one.
        assert!(state.toggle_day_selection(&suggestion, date(2026, 10, 2), 3));
        assert!(state.toggle_day_selection(&suggestion, date(2026, 10, 21), 3));
        assert!(state
            .manually_selected_days
            .is_disjoint(&state.removed_suggested_days));
    }

    #[test]
    fn remaining_days_shrinks_and_clamps() {
        let ctx = october();
        let suggestion = suggestion(&ctx);
        let mut state = ManualEditState::default();
        let mut previous = state.remaining_days(&suggestion, 5);
        for day in [20, 21, 22, 23, 26] {
            state.manually_selected_days.insert(date(2026, 10, day));
            let remaining = state.remaining_days(&suggestion, 5);
            assert!(remaining <= previous);
            previous = remaining;
        }
        assert_eq!(previous, 0);
        assert_eq!(state.remaining_days(&suggestion, 0), 0);
    }

    #[test]
    fn active_days_and_metrics_reflect_edits() {
        let ctx = october();
        let suggestion = suggestion(&ctx);
        let mut state = ManualEditState::default();
        assert_eq!(state.metrics(&ctx, &suggestion, 3), suggestion.metrics);

        state.toggle_day_selection(&suggestion, date(2026, 10, 16), 3);
        state.toggle_day_selection(&suggestion, date(2026, 10, 19), 3);
        assert_eq!(
            state.active_days(&suggestion),
            vec![date(2026, 10, 2), date(2026, 10, 19)]
        );
        let metrics = state.metrics(&ctx, &suggestion, 3);
        assert_eq!(metrics.bridges_used, 0);
        assert_eq!(metrics.total_effective_days, 2);
    }

    #[test]
    fn reconcile_drops_contradictions() {
        let ctx = october();
        let suggestion = suggestion(&ctx);
        let mut state = ManualEditState::default();
        state.removed_suggested_days.insert(date(2026, 10, 7));
        state.manually_selected_days.insert(date(2026, 10, 2));
        state.manually_selected_days.insert(date(2026, 10, 8));
        state.reconcile_with(&suggestion);
        assert!(state.removed_suggested_days.is_empty());
        assert_eq!(
            state.manually_selected_days.iter().copied().collect::<Vec<_>>(),
            vec![date(2026, 10, 8)]
        );
    }

    #[test]
    fn switching_suggestions_clears_edits() {
        let ctx = october();
        let primary = suggestion(&ctx);
        let alternative = assemble_suggestion(&ctx, vec![date(2026, 10, 5)], vec![], Strategy::Grouped);
        let mut session = PlanningSession::new(primary, vec![alternative]);

        assert!(session.toggle_day_selection(date(2026, 10, 16), 3));
        assert!(session.edits().has_edits());
        assert!(session.select_alternative(0));
        assert_eq!(session.active(), ActiveSelection::Alternative(0));
        assert!(!session.edits().has_edits());
        assert_eq!(session.active_days(), vec![date(2026, 10, 5)]);
        assert_eq!(session.remaining_days(3), 2);
        assert!(!session.select_alternative(4));

        session.toggle_day_selection(date(2026, 10, 6), 3);
        session.reset();
        assert!(!session.edits().has_edits());
        session.select_primary();
        assert_eq!(session.active_suggestion().days.len(), 2);

        let mut carried = ManualEditState::default();
        carried.manually_selected_days.insert(date(2026, 10, 2));
        carried.manually_selected_days.insert(date(2026, 10, 21));
        session.restore_edits(carried);
        assert_eq!(
            session.edits().manually_selected_days.iter().copied().collect::<Vec<_>>(),
            vec![date(2026, 10, 21)]
        );
        session.reset();
        assert_eq!(session.metrics(&ctx, 3), session.primary().metrics);
    }
}
