//! Built-in invalidation rules.

mod alignment;
mod class;
mod equipment;
mod multiclass;
mod proficiency;
mod race;
mod spells;
mod subclass;
mod wealth;

pub use alignment::EditionAlignmentRule;
pub use class::{ClassEligibilityRule, ClassGate};
pub use equipment::EquipmentRule;
pub use multiclass::MulticlassRule;
pub use proficiency::ProficiencyRule;
pub use race::EditionRaceRule;
pub use spells::SpellRule;
pub use subclass::SubclassRule;
pub use wealth::WealthRule;

pub(crate) use spells::dropped_spells;

use crate::build_state::EquipmentSlot;

use super::InvalidationRule;

/// The standard rule table, in report order.
pub fn standard_rules() -> Vec<Box<dyn InvalidationRule>> {
    let mut rules: Vec<Box<dyn InvalidationRule>> = vec![
        Box::new(EditionRaceRule),
        Box::new(ClassEligibilityRule::new(ClassGate::Edition)),
        Box::new(ClassEligibilityRule::new(ClassGate::Race)),
        Box::new(ClassEligibilityRule::new(ClassGate::Alignment)),
        Box::new(EditionAlignmentRule),
        Box::new(MulticlassRule),
        Box::new(SubclassRule),
        Box::new(ProficiencyRule),
        Box::new(SpellRule),
    ];
    rules.extend(
        EquipmentSlot::all()
            .into_iter()
            .map(|slot| Box::new(EquipmentRule::new(slot)) as Box<dyn InvalidationRule>),
    );
    rules.push(Box::new(WealthRule));
    rules
}

/// Whether `name` is one of the reported items.
pub(crate) fn listed(items: &[String], name: &str) -> bool {
    items.iter().any(|item| item == name)
}
