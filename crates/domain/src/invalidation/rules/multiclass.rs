use crate::build_state::{BuildField, BuildState, StepId};
use crate::invalidation::surviving::{clamp_levels, eligible_classes};
use crate::invalidation::{InvalidationRule, RuleContext};

use super::class::entry_name;
use super::listed;

/// `level→multiclass`: a lower total level consumes secondary classes.
///
/// Levels are handed out in slot order; a secondary class left with none is
/// reported and dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct MulticlassRule;

impl InvalidationRule for MulticlassRule {
    fn id(&self) -> &str {
        "level-multiclass"
    }

    fn triggers(&self) -> &[BuildField] {
        &[BuildField::TotalLevel]
    }

    fn step(&self) -> StepId {
        StepId::Class
    }

    fn label(&self) -> &str {
        "Class"
    }

    fn detect(&self, ctx: &RuleContext<'_>, prev: &BuildState, next: &BuildState) -> Vec<String> {
        if next.total_level >= prev.total_level {
            return Vec::new();
        }
        let mut classes = eligible_classes(ctx, next);
        clamp_levels(&mut classes, next.total_level);
        classes
            .iter()
            .skip(1)
            .filter(|entry| entry.level == 0)
            .map(|entry| entry_name(ctx, entry))
            .collect()
    }

    fn resolve(&self, ctx: &RuleContext<'_>, mut state: BuildState, items: &[String]) -> BuildState {
        clamp_levels(&mut state.classes, state.total_level);
        let mut index = 0;
        state.classes.retain(|entry| {
            let keep = index == 0 || entry.level > 0 || !listed(items, &entry_name(ctx, entry));
            index += 1;
            keep
        });
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_state::ClassEntry;
    use crate::catalog::fixtures::sample_catalog;
    use crate::catalog::SameEditionBucket;
    use crate::ids::{EditionId, RaceId};

    fn fighter_wizard() -> BuildState {
        BuildState {
            edition: Some(EditionId::from("5e")),
            race: Some(RaceId::from("human")),
            classes: vec![ClassEntry::new("fighter", 7), ClassEntry::new("wizard", 3)],
            total_level: 10,
            ..BuildState::default()
        }
    }

    #[test]
    fn level_drop_consumes_the_secondary_class() {
        let catalog = sample_catalog();
        let ctx = RuleContext::new(&catalog, &SameEditionBucket);
        let prev = fighter_wizard();
        let mut next = prev.clone();
        next.total_level = 5;

        let items = MulticlassRule.detect(&ctx, &prev, &next);
        assert_eq!(items, vec!["Wizard"]);

        let resolved = MulticlassRule.resolve(&ctx, next, &items);
        assert_eq!(resolved.classes, vec![ClassEntry::new("fighter", 5)]);
        assert_eq!(resolved.allocated_levels(), resolved.total_level);
        assert!(MulticlassRule.detect(&ctx, &prev, &resolved).is_empty());
    }

    #[test]
    fn partial_drop_keeps_both_classes() {
        let catalog = sample_catalog();
        let ctx = RuleContext::new(&catalog, &SameEditionBucket);
        let prev = fighter_wizard();
        let mut next = prev.clone();
        next.total_level = 8;

        assert!(MulticlassRule.detect(&ctx, &prev, &next).is_empty());
        let resolved = MulticlassRule.resolve(&ctx, next, &[]);
        assert_eq!(
            resolved.classes,
            vec![ClassEntry::new("fighter", 7), ClassEntry::new("wizard", 1)]
        );
        assert_eq!(resolved.allocated_levels(), 8);
    }

    #[test]
    fn level_increase_never_fires() {
        let catalog = sample_catalog();
        let ctx = RuleContext::new(&catalog, &SameEditionBucket);
        let prev = fighter_wizard();
        let mut next = prev.clone();
        next.total_level = 12;
        assert!(MulticlassRule.detect(&ctx, &prev, &next).is_empty());
    }

    #[test]
    fn under_allocated_builds_stay_within_budget() {
        let catalog = sample_catalog();
        let ctx = RuleContext::new(&catalog, &SameEditionBucket);
        let mut prev = fighter_wizard();
        prev.classes = vec![ClassEntry::new("fighter", 2), ClassEntry::new("wizard", 1)];
        let mut next = prev.clone();
        next.total_level = 2;

        let items = MulticlassRule.detect(&ctx, &prev, &next);
        assert_eq!(items, vec!["Wizard"]);
        let resolved = MulticlassRule.resolve(&ctx, next, &items);
        assert!(resolved.allocated_levels() <= resolved.total_level);
        assert_eq!(resolved.classes[0].level, 2);
    }
}
