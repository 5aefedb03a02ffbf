use crate::build_state::{BuildField, BuildState, Currency, StepId};
use crate::invalidation::{InvalidationRule, RuleContext};

use super::listed;

/// `level→wealth`: any total level change resets held currency so it can be
/// recalculated for the new level. Equipment is kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct WealthRule;

impl InvalidationRule for WealthRule {
    fn id(&self) -> &str {
        "level-wealth"
    }

    fn triggers(&self) -> &[BuildField] {
        &[BuildField::TotalLevel]
    }

    fn step(&self) -> StepId {
        StepId::Equipment
    }

    fn label(&self) -> &str {
        "Wealth (recalculated)"
    }

    fn detect(&self, _ctx: &RuleContext<'_>, prev: &BuildState, next: &BuildState) -> Vec<String> {
        if prev.total_level == next.total_level {
            return Vec::new();
        }
        next.wealth
            .held()
            .into_iter()
            .map(|currency| currency.name().to_string())
            .collect()
    }

    fn resolve(&self, _ctx: &RuleContext<'_>, mut state: BuildState, items: &[String]) -> BuildState {
        for currency in Currency::all() {
            if listed(items, currency.name()) {
                state.wealth.set(currency, 0);
            }
        }
        state
    }
}
