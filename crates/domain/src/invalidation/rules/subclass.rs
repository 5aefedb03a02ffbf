use crate::build_state::{BuildField, BuildState, ClassEntry, StepId};
use crate::catalog::RulesCatalog;
use crate::ids::{ClassDefinitionId, ClassId, EditionId};
use crate::invalidation::surviving::surviving_classes;
use crate::invalidation::{InvalidationRule, RuleContext};

use super::listed;

/// Clears a class definition (subclass, kit) the class entry no longer
/// qualifies for: missing from the edition, or above the entry's level.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubclassRule;

fn definition_name(
    catalog: &RulesCatalog,
    class: &ClassId,
    edition: Option<&EditionId>,
    definition: &ClassDefinitionId,
) -> String {
    let current = edition
        .and_then(|edition| catalog.class_edition_data(class, edition))
        .and_then(|data| data.definition(definition));
    current
        .or_else(|| {
            catalog.class(class).and_then(|entry| {
                entry
                    .editions
                    .values()
                    .find_map(|data| data.definition(definition))
            })
        })
        .map_or_else(|| definition.to_string(), |found| found.name.clone())
}

fn entry_definition_name(
    catalog: &RulesCatalog,
    edition: Option<&EditionId>,
    entry: &ClassEntry,
) -> Option<String> {
    let class = entry.class_id.as_ref()?;
    let definition = entry.definition.as_ref()?;
    Some(definition_name(catalog, class, edition, definition))
}

fn qualifies(catalog: &RulesCatalog, edition: &EditionId, entry: &ClassEntry) -> bool {
    let (Some(class), Some(definition)) = (entry.class_id.as_ref(), entry.definition.as_ref())
    else {
        return true;
    };
    catalog
        .class_edition_data(class, edition)
        .and_then(|data| data.definition(definition))
        .is_some_and(|found| found.min_level <= entry.level)
}

impl InvalidationRule for SubclassRule {
    fn id(&self) -> &str {
        "subclass"
    }

    fn triggers(&self) -> &[BuildField] {
        &[
            BuildField::Classes,
            BuildField::TotalLevel,
            BuildField::Edition,
            BuildField::Setting,
            BuildField::Race,
            BuildField::Alignment,
        ]
    }

    fn step(&self) -> StepId {
        StepId::Class
    }

    fn label(&self) -> &str {
        "Class Definition"
    }

    fn detect(&self, ctx: &RuleContext<'_>, _prev: &BuildState, next: &BuildState) -> Vec<String> {
        let Some(edition) = next.edition.as_ref() else {
            return Vec::new();
        };
        surviving_classes(ctx, next)
            .iter()
            .filter(|entry| !qualifies(ctx.catalog, edition, entry))
            .filter_map(|entry| entry_definition_name(ctx.catalog, Some(edition), entry))
            .collect()
    }

    fn resolve(&self, ctx: &RuleContext<'_>, mut state: BuildState, items: &[String]) -> BuildState {
        let Some(edition) = state.edition.clone() else {
            return state;
        };
        for entry in &mut state.classes {
            let reported = !qualifies(ctx.catalog, &edition, entry)
                && entry_definition_name(ctx.catalog, Some(&edition), entry)
                    .is_some_and(|name| listed(items, &name));
            if reported {
                entry.definition = None;
            }
        }
        state
    }
}
