use crate::build_state::{BuildField, BuildState, StepId};
use crate::derive::is_race_allowed;
use crate::invalidation::{InvalidationRule, RuleContext};

use super::listed;

/// `edition→race`: the race must be on the new edition/setting allow-list.
#[derive(Debug, Clone, Copy, Default)]
pub struct EditionRaceRule;

impl InvalidationRule for EditionRaceRule {
    fn id(&self) -> &str {
        "edition-race"
    }

    fn triggers(&self) -> &[BuildField] {
        &[BuildField::Edition, BuildField::Setting]
    }

    fn step(&self) -> StepId {
        StepId::Race
    }

    fn label(&self) -> &str {
        "Race"
    }

    fn detect(&self, ctx: &RuleContext<'_>, _prev: &BuildState, next: &BuildState) -> Vec<String> {
        let (Some(edition), Some(race)) = (next.edition.as_ref(), next.race.as_ref()) else {
            return Vec::new();
        };
        if is_race_allowed(ctx.catalog, edition, next.setting.as_ref(), race) {
            Vec::new()
        } else {
            vec![ctx.catalog.race_name(race)]
        }
    }

    fn resolve(&self, ctx: &RuleContext<'_>, mut state: BuildState, items: &[String]) -> BuildState {
        if state
            .race
            .as_ref()
            .is_some_and(|race| listed(items, &ctx.catalog.race_name(race)))
        {
            state.race = None;
        }
        state
    }
}
