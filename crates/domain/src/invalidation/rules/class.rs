use crate::build_state::{BuildField, BuildState, ClassEntry, StepId};
use crate::invalidation::surviving::{ensure_primary, ineligibility, over_class_limit, Ineligibility};
use crate::invalidation::{InvalidationRule, RuleContext};

use super::listed;

/// The upstream choice a class eligibility rule watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassGate {
    /// Edition or setting allow-list, plus the multiclass limit
    Edition,
    Race,
    Alignment,
}

/// Drops class entries the new edition, race or alignment no longer permits.
///
/// A new edition re-reads every requirement, so the edition gate reports
/// race and alignment failures too.
#[derive(Debug, Clone, Copy)]
pub struct ClassEligibilityRule {
    gate: ClassGate,
}

impl ClassEligibilityRule {
    pub fn new(gate: ClassGate) -> Self {
        Self { gate }
    }

    fn reports(&self, reason: Ineligibility) -> bool {
        match self.gate {
            ClassGate::Edition => true,
            ClassGate::Race => reason == Ineligibility::Race,
            ClassGate::Alignment => reason == Ineligibility::Alignment,
        }
    }
}

/// Display name for a class slot.
pub(crate) fn entry_name(ctx: &RuleContext<'_>, entry: &ClassEntry) -> String {
    entry
        .class_id
        .as_ref()
        .map_or_else(|| "Unassigned".to_string(), |class| ctx.catalog.class_name(class))
}

impl InvalidationRule for ClassEligibilityRule {
    fn id(&self) -> &str {
        match self.gate {
            ClassGate::Edition => "edition-class",
            ClassGate::Race => "race-class",
            ClassGate::Alignment => "alignment-class",
        }
    }

    fn triggers(&self) -> &[BuildField] {
        match self.gate {
            ClassGate::Edition => &[BuildField::Edition, BuildField::Setting],
            ClassGate::Race => &[BuildField::Race],
            ClassGate::Alignment => &[BuildField::Alignment],
        }
    }

    fn step(&self) -> StepId {
        StepId::Class
    }

    fn label(&self) -> &str {
        "Class"
    }

    fn detect(&self, ctx: &RuleContext<'_>, _prev: &BuildState, next: &BuildState) -> Vec<String> {
        let Some(edition) = next.edition.as_ref() else {
            return Vec::new();
        };
        let mut items: Vec<String> = Vec::new();
        for entry in &next.classes {
            let Some(class) = entry.class_id.as_ref() else {
                continue;
            };
            if ineligibility(ctx, next, edition, class).is_some_and(|reason| self.reports(reason)) {
                items.push(ctx.catalog.class_name(class));
            }
        }
        if self.gate == ClassGate::Edition {
            for index in over_class_limit(ctx, next) {
                items.push(entry_name(ctx, &next.classes[index]));
            }
        }
        items.dedup();
        items
    }

    fn resolve(&self, ctx: &RuleContext<'_>, mut state: BuildState, items: &[String]) -> BuildState {
        let mut index = 0;
        state.classes.retain(|entry| {
            // The primary placeholder is the never-empty fallback, not a choice
            let keep = (index == 0 && entry.class_id.is_none())
                || !listed(items, &entry_name(ctx, entry));
            index += 1;
            keep
        });
        ensure_primary(&mut state.classes);
        state
    }
}
