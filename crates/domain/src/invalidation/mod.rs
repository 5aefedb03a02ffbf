//! Invalidation rules and the engine that runs them.
//!
//! Every dependency between build choices is one [`InvalidationRule`]: the
//! fields it watches, the step it affects, a `detect` that names now-invalid
//! items, and a `resolve` that strips exactly those items. The engine diffs two
//! states, runs the rules whose triggers changed, and folds the resolutions.

mod engine;
pub mod rules;
pub(crate) mod surviving;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::build_state::{BuildField, BuildState, StepId};
use crate::catalog::{EquipmentEditionResolver, RulesCatalog};

pub use engine::{detect_invalidations, resolve_invalidations};
pub use surviving::surviving_classes;

/// Read-only collaborators every rule may consult.
#[derive(Clone, Copy)]
pub struct RuleContext<'a> {
    pub catalog: &'a RulesCatalog,
    pub equipment_editions: &'a dyn EquipmentEditionResolver,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        catalog: &'a RulesCatalog,
        equipment_editions: &'a dyn EquipmentEditionResolver,
    ) -> Self {
        Self {
            catalog,
            equipment_editions,
        }
    }
}

impl fmt::Debug for RuleContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleContext")
            .field("editions", &self.catalog.editions().len())
            .finish_non_exhaustive()
    }
}

/// A single declarative dependency between build choices.
///
/// Rules are stateless. `detect` returns display names of items that are no
/// longer valid in `next`; `resolve` removes those items and nothing else.
pub trait InvalidationRule: Send + Sync {
    fn id(&self) -> &str;

    /// Fields whose change makes this rule worth running.
    fn triggers(&self) -> &[BuildField];

    fn step(&self) -> StepId;

    fn label(&self) -> &str;

    fn detect(&self, ctx: &RuleContext<'_>, prev: &BuildState, next: &BuildState) -> Vec<String>;

    fn resolve(&self, ctx: &RuleContext<'_>, state: BuildState, items: &[String]) -> BuildState;
}

/// What one rule found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepInvalidation {
    pub rule_id: String,
    pub step_id: StepId,
    pub label: String,
    pub items: Vec<String>,
}

/// Items sharing a label, deduplicated for a confirmation dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidationGroup {
    pub step_id: StepId,
    pub label: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct InvalidationResult {
    pub has_invalidations: bool,
    pub affected: Vec<StepInvalidation>,
}

impl InvalidationResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_affected(affected: Vec<StepInvalidation>) -> Self {
        Self {
            has_invalidations: !affected.is_empty(),
            affected,
        }
    }

    /// Affected entries grouped by label in first-seen order, items deduplicated.
    pub fn grouped(&self) -> Vec<InvalidationGroup> {
        let mut groups: Vec<InvalidationGroup> = Vec::new();
        for entry in &self.affected {
            let index = match groups.iter().position(|g| g.label == entry.label) {
                Some(index) => index,
                None => {
                    groups.push(InvalidationGroup {
                        step_id: entry.step_id,
                        label: entry.label.clone(),
                        items: Vec::new(),
                    });
                    groups.len() - 1
                }
            };
            let group = &mut groups[index];
            for item in &entry.items {
                if !group.items.contains(item) {
                    group.items.push(item.clone());
                }
            }
        }
        groups
    }

    /// Steps touched by this result, in report order without repeats.
    pub fn steps(&self) -> Vec<StepId> {
        let mut steps = Vec::new();
        for entry in &self.affected {
            if !steps.contains(&entry.step_id) {
                steps.push(entry.step_id);
            }
        }
        steps
    }

    pub fn for_step(&self, step: StepId) -> impl Iterator<Item = &StepInvalidation> {
        self.affected.iter().filter(move |entry| entry.step_id == step)
    }
}

/// An ordered registry of rules.
pub struct RuleSet {
    rules: Vec<Box<dyn InvalidationRule>>,
}

impl RuleSet {
    pub fn new(rules: Vec<Box<dyn InvalidationRule>>) -> Self {
        Self { rules }
    }

    /// Every built-in rule, in the order their reports are listed.
    pub fn standard() -> Self {
        Self::new(rules::standard_rules())
    }

    pub fn get(&self, id: &str) -> Option<&dyn InvalidationRule> {
        self.rules
            .iter()
            .find(|rule| rule.id() == id)
            .map(|rule| rule.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn InvalidationRule> {
        self.rules.iter().map(|rule| rule.as_ref())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|rule| rule.id()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(rule: &str, step: StepId, label: &str, items: &[&str]) -> StepInvalidation {
        StepInvalidation {
            rule_id: rule.to_string(),
            step_id: step,
            label: label.to_string(),
            items: items.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn grouped_view_deduplicates_by_label() {
        let result = InvalidationResult::from_affected(vec![
            entry("edition-spells", StepId::Spells, "Spells", &["Sleep", "Fire Bolt"]),
            entry("race-class", StepId::Class, "Class", &["Wizard"]),
            entry("level-spells", StepId::Spells, "Spells", &["Sleep"]),
        ]);
        let groups = result.grouped();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label, "Spells");
        assert_eq!(groups[0].items, vec!["Sleep", "Fire Bolt"]);
        assert_eq!(groups[1].items, vec!["Wizard"]);
        assert_eq!(result.steps(), vec![StepId::Spells, StepId::Class]);
        assert_eq!(result.for_step(StepId::Spells).count(), 2);
    }

    #[test]
    fn empty_result_has_no_invalidations() {
        let result = InvalidationResult::from_affected(Vec::new());
        assert!(!result.has_invalidations);
        assert_eq!(result, InvalidationResult::empty());
    }

    #[test]
    fn standard_rule_ids_are_unique() {
        let rules = RuleSet::standard();
        let mut ids: Vec<_> = rules.iter().map(|rule| rule.id().to_string()).collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
        assert!(rules.get("level-multiclass").is_some());
    }
}
