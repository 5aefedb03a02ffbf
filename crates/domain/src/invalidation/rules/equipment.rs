use crate::build_state::{BuildField, BuildState, EquipmentSlot, StepId};
use crate::ids::EquipmentId;
use crate::invalidation::{InvalidationRule, RuleContext};

use super::listed;

/// `edition→{weapons, armor, gear, magic items}`: owned items need data in
/// the equipment bucket the new edition resolves to.
#[derive(Debug, Clone, Copy)]
pub struct EquipmentRule {
    slot: EquipmentSlot,
}

impl EquipmentRule {
    pub fn new(slot: EquipmentSlot) -> Self {
        Self { slot }
    }

    fn missing<'s>(&self, ctx: &RuleContext<'_>, state: &'s BuildState) -> Vec<&'s EquipmentId> {
        let Some(edition) = state.edition.as_ref() else {
            return Vec::new();
        };
        let bucket = ctx.equipment_editions.bucket_for(edition);
        state
            .equipment
            .slot(self.slot)
            .iter()
            .filter(|id| {
                ctx.catalog
                    .equipment(id)
                    .and_then(|item| item.bucket_data(&bucket))
                    .is_none()
            })
            .collect()
    }
}

impl InvalidationRule for EquipmentRule {
    fn id(&self) -> &str {
        match self.slot {
            EquipmentSlot::Weapons => "edition-weapons",
            EquipmentSlot::Armor => "edition-armor",
            EquipmentSlot::Gear => "edition-gear",
            EquipmentSlot::MagicItems => "edition-magic-items",
        }
    }

    fn triggers(&self) -> &[BuildField] {
        &[BuildField::Edition]
    }

    fn step(&self) -> StepId {
        StepId::Equipment
    }

    fn label(&self) -> &str {
        self.slot.label()
    }

    fn detect(&self, ctx: &RuleContext<'_>, _prev: &BuildState, next: &BuildState) -> Vec<String> {
        self.missing(ctx, next)
            .into_iter()
            .map(|id| ctx.catalog.equipment_name(id))
            .collect()
    }

    fn resolve(&self, ctx: &RuleContext<'_>, mut state: BuildState, items: &[String]) -> BuildState {
        state
            .equipment
            .slot_mut(self.slot)
            .retain(|id| !listed(items, &ctx.catalog.equipment_name(id)));
        state
    }
}
