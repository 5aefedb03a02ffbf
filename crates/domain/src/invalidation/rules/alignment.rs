use crate::build_state::{BuildField, BuildState, StepId};
use crate::catalog::RulesCatalog;
use crate::ids::AlignmentId;
use crate::invalidation::{InvalidationRule, RuleContext};

use super::listed;

/// `edition→alignment`: the alignment must exist in the new edition's set.
#[derive(Debug, Clone, Copy, Default)]
pub struct EditionAlignmentRule;

/// Alignment ids are shared across editions; names come from whichever
/// edition defines the id first.
fn alignment_name(catalog: &RulesCatalog, id: &AlignmentId) -> String {
    catalog
        .editions()
        .iter()
        .find_map(|edition| edition.alignment(id))
        .map_or_else(|| id.to_string(), |alignment| alignment.name.clone())
}

impl InvalidationRule for EditionAlignmentRule {
    fn id(&self) -> &str {
        "edition-alignment"
    }

    fn triggers(&self) -> &[BuildField] {
        &[BuildField::Edition]
    }

    fn step(&self) -> StepId {
        StepId::Alignment
    }

    fn label(&self) -> &str {
        "Alignment"
    }

    fn detect(&self, ctx: &RuleContext<'_>, _prev: &BuildState, next: &BuildState) -> Vec<String> {
        let (Some(edition), Some(alignment)) = (next.edition.as_ref(), next.alignment.as_ref())
        else {
            return Vec::new();
        };
        let known = ctx
            .catalog
            .edition(edition)
            .is_some_and(|edition| edition.has_alignment(alignment));
        if known {
            Vec::new()
        } else {
            vec![alignment_name(ctx.catalog, alignment)]
        }
    }

    fn resolve(&self, ctx: &RuleContext<'_>, mut state: BuildState, items: &[String]) -> BuildState {
        if state
            .alignment
            .as_ref()
            .is_some_and(|alignment| listed(items, &alignment_name(ctx.catalog, alignment)))
        {
            state.alignment = None;
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::sample_catalog;
    use crate::catalog::SameEditionBucket;
    use crate::ids::EditionId;

    fn state(edition: &str, alignment: &str) -> BuildState {
        BuildState {
            edition: Some(EditionId::from(edition)),
            alignment: Some(AlignmentId::from(alignment)),
            ..BuildState::default()
        }
    }

    #[test]
    fn nine_point_alignment_dropped_in_odnd() {
        let catalog = sample_catalog();
        let ctx = RuleContext::new(&catalog, &SameEditionBucket);
        let prev = state("5e", "chaotic-good");
        let next = state("odnd", "chaotic-good");
        let items = EditionAlignmentRule.detect(&ctx, &prev, &next);
        assert_eq!(items, vec!["Chaotic Good"]);
        let resolved = EditionAlignmentRule.resolve(&ctx, next, &items);
        assert_eq!(resolved.alignment, None);
    }

    #[test]
    fn shared_alignment_id_survives() {
        let catalog = sample_catalog();
        let ctx = RuleContext::new(&catalog, &SameEditionBucket);
        let prev = state("5e", "neutral");
        let next = state("odnd", "neutral");
        assert!(EditionAlignmentRule.detect(&ctx, &prev, &next).is_empty());
    }
}
