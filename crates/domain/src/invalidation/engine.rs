use crate::build_state::BuildState;

use super::{InvalidationResult, RuleContext, RuleSet, StepInvalidation};

/// Run every rule whose trigger fields differ between `prev` and `next`.
///
/// Rules with unchanged triggers are never asked to detect.
pub fn detect_invalidations(
    rules: &RuleSet,
    ctx: &RuleContext<'_>,
    prev: &BuildState,
    next: &BuildState,
) -> InvalidationResult {
    let mut affected = Vec::new();
    for rule in rules.iter() {
        let triggered = rule.triggers().iter().any(|field| field.differs(prev, next));
        if !triggered {
            continue;
        }
        let items = rule.detect(ctx, prev, next);
        if items.is_empty() {
            continue;
        }
        tracing::debug!(rule = rule.id(), items = items.len(), "Invalidation detected");
        affected.push(StepInvalidation {
            rule_id: rule.id().to_string(),
            step_id: rule.step(),
            label: rule.label().to_string(),
            items,
        });
    }
    InvalidationResult::from_affected(affected)
}

/// Fold each reported rule's `resolve` over `state`, in report order.
pub fn resolve_invalidations(
    rules: &RuleSet,
    ctx: &RuleContext<'_>,
    state: BuildState,
    result: &InvalidationResult,
) -> BuildState {
    result.affected.iter().fold(state, |state, entry| {
        match rules.get(&entry.rule_id) {
            Some(rule) => rule.resolve(ctx, state, &entry.items),
            None => {
                tracing::warn!(rule = %entry.rule_id, "Resolution skipped for unknown rule");
                state
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::build_state::{BuildField, ClassEntry, StepId};
    use crate::catalog::fixtures::sample_catalog;
    use crate::catalog::{BucketMap, SameEditionBucket};
    use crate::ids::{EditionId, EquipmentId, RaceId, SpellId};
    use crate::invalidation::InvalidationRule;

    struct CountingRule {
        calls: Arc<AtomicUsize>,
    }

    impl InvalidationRule for CountingRule {
        fn id(&self) -> &str {
            "counting"
        }
        fn triggers(&self) -> &[BuildField] {
            &[BuildField::Edition, BuildField::Race]
        }
        fn step(&self) -> StepId {
            StepId::Race
        }
        fn label(&self) -> &str {
            "Counting"
        }
        fn detect(&self, _: &RuleContext<'_>, _: &BuildState, _: &BuildState) -> Vec<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            vec!["item".to_string()]
        }
        fn resolve(&self, _: &RuleContext<'_>, state: BuildState, _: &[String]) -> BuildState {
            state
        }
    }

    fn five_e_sorcerer() -> BuildState {
        BuildState {
            edition: Some(EditionId::from("5e")),
            race: Some(RaceId::from("dragonborn")),
            classes: vec![ClassEntry::new("sorcerer", 5)],
            total_level: 5,
            ..BuildState::default()
        }
    }

    #[test]
    fn unchanged_triggers_never_run_detect() {
        let catalog = sample_catalog();
        let ctx = RuleContext::new(&catalog, &SameEditionBucket);
        let calls = Arc::new(AtomicUsize::new(0));
        let rules = RuleSet::new(vec![Box::new(CountingRule {
            calls: Arc::clone(&calls),
        })]);

        let state = five_e_sorcerer();
        let result = detect_invalidations(&rules, &ctx, &state, &state);
        assert_eq!(result, InvalidationResult::empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let mut next = state.clone();
        next.xp = 300;
        let result = detect_invalidations(&rules, &ctx, &state, &next);
        assert!(!result.has_invalidations);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        next.race = Some(RaceId::from("elf"));
        let result = detect_invalidations(&rules, &ctx, &state, &next);
        assert!(result.has_invalidations);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn identical_states_report_nothing_with_standard_rules() {
        let catalog = sample_catalog();
        let ctx = RuleContext::new(&catalog, &SameEditionBucket);
        let state = five_e_sorcerer();
        let result = detect_invalidations(&RuleSet::standard(), &ctx, &state, &state);
        assert!(!result.has_invalidations);
        assert!(result.affected.is_empty());
    }

    #[test]
    fn edition_change_drops_race_and_class() {
        let catalog = sample_catalog();
        let ctx = RuleContext::new(&catalog, &SameEditionBucket);
        let rules = RuleSet::standard();
        let prev = five_e_sorcerer();
        let mut next = prev.clone();
        next.edition = Some(EditionId::from("2e"));

        let result = detect_invalidations(&rules, &ctx, &prev, &next);
        let ids: Vec<_> = result.affected.iter().map(|a| a.rule_id.as_str()).collect();
        assert!(ids.contains(&"edition-race"));
        assert!(ids.contains(&"edition-class"));

        let resolved = resolve_invalidations(&rules, &ctx, next, &result);
        assert_eq!(resolved.race, None);
        assert_eq!(resolved.classes, vec![ClassEntry::placeholder()]);
        assert!(!detect_invalidations(&rules, &ctx, &prev, &resolved).has_invalidations);
    }

    #[test]
    fn resolution_only_strips_reported_items() {
        let catalog = sample_catalog();
        let buckets = BucketMap::new().with("odnd", "basic");
        let ctx = RuleContext::new(&catalog, &buckets);
        let rules = RuleSet::standard();

        let mut prev = BuildState {
            edition: Some(EditionId::from("5e")),
            race: Some(RaceId::from("human")),
            classes: vec![ClassEntry::new("wizard", 3)],
            total_level: 3,
            spells: vec![
                SpellId::from("fire-bolt"),
                SpellId::from("magic-missile"),
                SpellId::from("sleep"),
            ],
            ..BuildState::default()
        };
        prev.equipment.weapons = vec![EquipmentId::from("dagger"), EquipmentId::from("rapier")];
        prev.equipment.armor = vec![EquipmentId::from("leather-armor")];

        let mut next = prev.clone();
        next.edition = Some(EditionId::from("odnd"));

        let result = detect_invalidations(&rules, &ctx, &prev, &next);
        let resolved = resolve_invalidations(&rules, &ctx, next, &result);

        let reported: Vec<&String> = result.affected.iter().flat_map(|a| &a.items).collect();
        let removed_spells = prev.spells.iter().filter(|s| !resolved.spells.contains(s));
        for spell in removed_spells {
            assert!(reported.contains(&&catalog.spell_name(spell)));
        }
        assert_eq!(resolved.equipment.weapons, vec![EquipmentId::from("dagger")]);
        assert_eq!(
            resolved.equipment.armor,
            vec![EquipmentId::from("leather-armor")]
        );
        assert_eq!(
            resolved.spells,
            vec![SpellId::from("magic-missile"), SpellId::from("sleep")]
        );
        assert!(!detect_invalidations(&rules, &ctx, &prev, &resolved).has_invalidations);
    }
}
