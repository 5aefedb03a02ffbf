use crate::build_state::{BuildField, BuildState, StepId};
use crate::invalidation::surviving::surviving_classes;
use crate::invalidation::{InvalidationRule, RuleContext};

use super::listed;

/// Chosen skill proficiencies must come from the primary class's offer, up
/// to its choice count. Earlier choices win.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProficiencyRule;

fn kept_skills(ctx: &RuleContext<'_>, state: &BuildState) -> Vec<String> {
    let Some(edition) = state.edition.as_ref() else {
        return state.skill_proficiencies.clone();
    };
    let survivors = surviving_classes(ctx, state);
    let Some(grant) = survivors
        .first()
        .and_then(|entry| entry.class_id.as_ref())
        .and_then(|class| ctx.catalog.class_edition_data(class, edition))
        .map(|data| &data.proficiencies.skills)
    else {
        return Vec::new();
    };
    state
        .skill_proficiencies
        .iter()
        .filter(|skill| grant.offers(skill))
        .take(usize::from(grant.choose))
        .cloned()
        .collect()
}

impl InvalidationRule for ProficiencyRule {
    fn id(&self) -> &str {
        "class-proficiencies"
    }

    fn triggers(&self) -> &[BuildField] {
        &[
            BuildField::Classes,
            BuildField::Race,
            BuildField::Alignment,
            BuildField::Edition,
            BuildField::Setting,
        ]
    }

    fn step(&self) -> StepId {
        StepId::Proficiencies
    }

    fn label(&self) -> &str {
        "Proficiencies"
    }

    fn detect(&self, ctx: &RuleContext<'_>, _prev: &BuildState, next: &BuildState) -> Vec<String> {
        let kept = kept_skills(ctx, next);
        next.skill_proficiencies
            .iter()
            .filter(|skill| !kept.contains(skill))
            .cloned()
            .collect()
    }

    fn resolve(&self, _ctx: &RuleContext<'_>, mut state: BuildState, items: &[String]) -> BuildState {
        state
            .skill_proficiencies
            .retain(|skill| !listed(items, skill));
        state
    }
}
