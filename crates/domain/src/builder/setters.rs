//! Field setters. Each validates its input, builds the naive `next` state and
//! hands it to the change protocol.

use crate::build_state::{BuildField, BuildState, CharacterType, ClassEntry, EquipmentSlot, Wealth};
use crate::catalog::EquipmentKind;
use crate::derive::{class_eligible, is_race_allowed, level_for_xp};
use crate::error::DomainError;
use crate::ids::{AlignmentId, ClassDefinitionId, ClassId, EditionId, EquipmentId, RaceId, SettingId, SpellId};
use crate::invalidation::rules::dropped_spells;
use crate::invalidation::surviving::clamp_levels;

use super::{ChangeOutcome, CharacterBuilder};

/// Move the build to a new total level.
///
/// Gains go to the primary class; losses are taken from the end of the class
/// list, leaving zero-level entries for the multiclass rule to report.
fn retarget_levels(state: &mut BuildState, total_level: u8) {
    let previous = state.total_level;
    state.total_level = total_level;
    if total_level > previous {
        if let Some(primary) = state.classes.first_mut() {
            primary.level = primary.level.saturating_add(total_level - previous);
        }
    } else {
        clamp_levels(&mut state.classes, total_level);
    }
}

fn slot_for(kind: EquipmentKind) -> EquipmentSlot {
    match kind {
        EquipmentKind::Weapon => EquipmentSlot::Weapons,
        EquipmentKind::Armor => EquipmentSlot::Armor,
        EquipmentKind::Gear => EquipmentSlot::Gear,
        EquipmentKind::MagicItem => EquipmentSlot::MagicItems,
    }
}

impl CharacterBuilder {
    // =========================================================================
    // Identity
    // =========================================================================

    pub fn set_character_type(
        &mut self,
        character_type: CharacterType,
    ) -> Result<ChangeOutcome, DomainError> {
        let mut next = self.state.clone();
        next.character_type = character_type;
        self.propose(BuildField::CharacterType, next)
    }

    /// The name is validated when the build is finished.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<ChangeOutcome, DomainError> {
        let mut next = self.state.clone();
        next.name = Some(name.into());
        self.propose(BuildField::Name, next)
    }

    // =========================================================================
    // Edition and setting
    // =========================================================================

    /// Switch editions.
    ///
    /// A setting the new edition does not define is cleared, and the total
    /// level is capped at the edition's maximum.
    pub fn set_edition(&mut self, edition: EditionId) -> Result<ChangeOutcome, DomainError> {
        let edition_data = self
            .catalog
            .edition(&edition)
            .ok_or_else(|| DomainError::not_found("Edition", edition.as_str()))?;

        let mut next = self.state.clone();
        if next
            .setting
            .as_ref()
            .is_some_and(|setting| edition_data.setting(setting).is_none())
        {
            next.setting = None;
        }
        if next.total_level > edition_data.max_level {
            retarget_levels(&mut next, edition_data.max_level);
        }
        next.edition = Some(edition);
        self.propose(BuildField::Edition, next)
    }

    pub fn set_setting(&mut self, setting: Option<SettingId>) -> Result<ChangeOutcome, DomainError> {
        if let Some(id) = setting.as_ref() {
            let edition = self.current_edition().ok_or_else(|| {
                DomainError::invalid_state_transition("Choose an edition before a setting")
            })?;
            edition
                .setting(id)
                .ok_or_else(|| DomainError::not_found("Setting", id.as_str()))?;
        }
        let mut next = self.state.clone();
        next.setting = setting;
        self.propose(BuildField::Setting, next)
    }

    // =========================================================================
    // Race and alignment
    // =========================================================================

    pub fn set_race(&mut self, race: Option<RaceId>) -> Result<ChangeOutcome, DomainError> {
        if let Some(id) = race.as_ref() {
            self.catalog
                .race(id)
                .ok_or_else(|| DomainError::not_found("Race", id.as_str()))?;
            if let Some(edition) = self.state.edition.as_ref() {
                if !is_race_allowed(&self.catalog, edition, self.state.setting.as_ref(), id) {
                    return Err(DomainError::constraint(format!(
                        "{} is not available in this edition",
                        self.catalog.race_name(id)
                    )));
                }
            }
        }
        let mut next = self.state.clone();
        next.race = race;
        self.propose(BuildField::Race, next)
    }

    pub fn set_alignment(
        &mut self,
        alignment: Option<AlignmentId>,
    ) -> Result<ChangeOutcome, DomainError> {
        if let Some(id) = alignment.as_ref() {
            let known = match self.current_edition() {
                Some(edition) => edition.has_alignment(id),
                None => self
                    .catalog
                    .editions()
                    .iter()
                    .any(|edition| edition.has_alignment(id)),
            };
            if !known {
                return Err(DomainError::not_found("Alignment", id.as_str()));
            }
        }
        let mut next = self.state.clone();
        next.alignment = alignment;
        self.propose(BuildField::Alignment, next)
    }

    // =========================================================================
    // Classes and levels
    // =========================================================================

    /// Canonical id for `class`, checked against the rest of the build.
    fn checked_class(&self, class: &ClassId) -> Result<ClassId, DomainError> {
        let canonical = self
            .catalog
            .resolve_class_alias(class.as_str())
            .ok_or_else(|| DomainError::not_found("Class", class.as_str()))?;
        if let Some(edition) = self.state.edition.as_ref() {
            let eligible = class_eligible(
                &self.catalog,
                &canonical,
                edition,
                self.state.setting.as_ref(),
                self.state.race.as_ref(),
                self.state.alignment.as_ref(),
            );
            if !eligible {
                return Err(DomainError::constraint(format!(
                    "{} is not available for this build",
                    self.catalog.class_name(&canonical)
                )));
            }
        }
        Ok(canonical)
    }

    fn ensure_slot(&self, index: usize) -> Result<(), DomainError> {
        if index >= self.state.classes.len() {
            return Err(DomainError::validation(format!(
                "No class slot at index {}",
                index
            )));
        }
        Ok(())
    }

    fn ensure_not_chosen(&self, class: &ClassId, except: Option<usize>) -> Result<(), DomainError> {
        let taken = self
            .state
            .classes
            .iter()
            .enumerate()
            .any(|(index, entry)| Some(index) != except && entry.class_id.as_ref() == Some(class));
        if taken {
            return Err(DomainError::constraint(format!(
                "{} is already chosen",
                self.catalog.class_name(class)
            )));
        }
        Ok(())
    }

    /// Put `class` in slot `index`. A single-class build gets every level.
    pub fn set_class_id(&mut self, index: usize, class: ClassId) -> Result<ChangeOutcome, DomainError> {
        self.ensure_slot(index)?;
        let class = self.checked_class(&class)?;
        self.ensure_not_chosen(&class, Some(index))?;

        let mut next = self.state.clone();
        let total_level = next.total_level;
        let single = next.classes.len() == 1;
        let entry = &mut next.classes[index];
        if entry.class_id.as_ref() != Some(&class) {
            entry.definition = None;
        }
        entry.class_id = Some(class);
        if single {
            entry.level = total_level;
        }
        self.propose(BuildField::Classes, next)
    }

    /// Add a class at level 1, taking a level from the primary class when
    /// none is unallocated. An empty primary slot is filled instead.
    pub fn add_class(&mut self, class: ClassId) -> Result<ChangeOutcome, DomainError> {
        let class = self.checked_class(&class)?;
        self.ensure_not_chosen(&class, None)?;

        let mut next = self.state.clone();
        let total_level = next.total_level;
        if let [only] = next.classes.as_mut_slice() {
            if only.class_id.is_none() {
                only.class_id = Some(class);
                only.level = total_level;
                return self.propose(BuildField::Classes, next);
            }
        }

        let limit = self
            .current_edition()
            .map_or(1, |edition| edition.multiclassing.max_classes());
        if next.classes.len() >= limit {
            return Err(DomainError::constraint(format!(
                "This edition allows at most {} class(es)",
                limit
            )));
        }
        if next.remaining_levels() == 0 {
            match next.classes.first_mut() {
                Some(primary) if primary.level >= 2 => primary.level -= 1,
                _ => {
                    return Err(DomainError::constraint(
                        "No level is available for another class",
                    ))
                }
            }
        }
        next.classes.push(ClassEntry::new(class, 1));
        self.propose(BuildField::Classes, next)
    }

    /// Remove the class in slot `index`; its levels go to the (new) primary.
    pub fn remove_class(&mut self, index: usize) -> Result<ChangeOutcome, DomainError> {
        self.ensure_slot(index)?;
        let mut next = self.state.clone();
        if next.classes.len() == 1 {
            next.classes = vec![ClassEntry {
                level: next.total_level,
                ..ClassEntry::placeholder()
            }];
            return self.propose(BuildField::Classes, next);
        }
        let removed = next.classes.remove(index);
        if let Some(primary) = next.classes.first_mut() {
            primary.level = primary.level.saturating_add(removed.level);
        }
        self.propose(BuildField::Classes, next)
    }

    pub fn set_class_level(&mut self, index: usize, level: u8) -> Result<ChangeOutcome, DomainError> {
        self.ensure_slot(index)?;
        if level == 0 {
            return Err(DomainError::validation("Class level must be at least 1"));
        }
        let others: u8 = self
            .state
            .classes
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .fold(0u8, |sum, (_, entry)| sum.saturating_add(entry.level));
        if others.saturating_add(level) > self.state.total_level {
            return Err(DomainError::constraint(format!(
                "Class levels would exceed the total level of {}",
                self.state.total_level
            )));
        }
        let mut next = self.state.clone();
        next.classes[index].level = level;
        self.propose(BuildField::Classes, next)
    }

    /// Choose or clear the subclass of the class in slot `index`.
    pub fn set_class_definition(
        &mut self,
        index: usize,
        definition: Option<ClassDefinitionId>,
    ) -> Result<ChangeOutcome, DomainError> {
        self.ensure_slot(index)?;
        if let Some(id) = definition.as_ref() {
            let entry = &self.state.classes[index];
            let class = entry
                .class_id
                .as_ref()
                .ok_or_else(|| DomainError::constraint("Choose a class before its definition"))?;
            let edition = self.state.edition.as_ref().ok_or_else(|| {
                DomainError::invalid_state_transition("Choose an edition before a definition")
            })?;
            let found = self
                .catalog
                .class_edition_data(class, edition)
                .and_then(|data| data.definition(id))
                .ok_or_else(|| DomainError::not_found("ClassDefinition", id.as_str()))?;
            if found.min_level > entry.level {
                return Err(DomainError::constraint(format!(
                    "{} requires class level {}",
                    found.name, found.min_level
                )));
            }
        }
        let mut next = self.state.clone();
        next.classes[index].definition = definition;
        self.propose(BuildField::Classes, next)
    }

    /// Set the total character level (1 to the edition maximum).
    pub fn set_total_level(&mut self, total_level: u8) -> Result<ChangeOutcome, DomainError> {
        let max = self.max_level();
        if total_level == 0 || total_level > max {
            return Err(DomainError::validation(format!(
                "Total level must be between 1 and {}",
                max
            )));
        }
        let mut next = self.state.clone();
        retarget_levels(&mut next, total_level);
        self.propose(BuildField::TotalLevel, next)
    }

    /// Set experience; the total level follows the edition's XP table.
    pub fn set_xp(&mut self, xp: u32) -> Result<ChangeOutcome, DomainError> {
        let mut next = self.state.clone();
        next.xp = xp;
        let reached = next.edition.as_ref().and_then(|edition| {
            level_for_xp(&self.catalog, edition, next.primary_class(), xp)
        });
        if let Some(level) = reached {
            if level != next.total_level {
                retarget_levels(&mut next, level);
            }
        }
        self.propose(BuildField::Xp, next)
    }

    // =========================================================================
    // Spells, proficiencies, equipment, wealth
    // =========================================================================

    /// Add the spell, or remove it when already selected.
    ///
    /// An added spell must fit the current spell limits.
    pub fn toggle_spell(&mut self, spell: SpellId) -> Result<ChangeOutcome, DomainError> {
        let name = self
            .catalog
            .spell(&spell)
            .map(|entry| entry.name.clone())
            .ok_or_else(|| DomainError::not_found("Spell", spell.as_str()))?;

        let mut next = self.state.clone();
        if let Some(position) = next.spells.iter().position(|selected| selected == &spell) {
            next.spells.remove(position);
            return self.propose(BuildField::Spells, next);
        }
        if next.edition.is_none() {
            return Err(DomainError::invalid_state_transition(
                "Choose an edition before spells",
            ));
        }
        next.spells.push(spell);
        let added = next.spells.len() - 1;
        if dropped_spells(&self.context(), &next).contains(&added) {
            return Err(DomainError::constraint(format!(
                "{} does not fit the current spell limits",
                name
            )));
        }
        self.propose(BuildField::Spells, next)
    }

    /// Replace the chosen skill proficiencies.
    ///
    /// Each skill must be offered by the primary class, within its choice count.
    pub fn set_skill_proficiencies(
        &mut self,
        skills: Vec<String>,
    ) -> Result<ChangeOutcome, DomainError> {
        if !skills.is_empty() {
            let (Some(edition), Some(class)) =
                (self.state.edition.as_ref(), self.state.primary_class())
            else {
                return Err(DomainError::invalid_state_transition(
                    "Choose an edition and class before proficiencies",
                ));
            };
            let grant = self
                .catalog
                .class_edition_data(class, edition)
                .map(|data| data.proficiencies.skills.clone())
                .unwrap_or_default();
            if let Some(skill) = skills.iter().find(|skill| !grant.offers(skill)) {
                return Err(DomainError::constraint(format!(
                    "{} is not offered by {}",
                    skill,
                    self.catalog.class_name(class)
                )));
            }
            if skills.len() > usize::from(grant.choose) {
                return Err(DomainError::validation(format!(
                    "Choose at most {} skills",
                    grant.choose
                )));
            }
            let mut unique = skills.clone();
            unique.sort();
            unique.dedup();
            if unique.len() != skills.len() {
                return Err(DomainError::validation("Skills may only be chosen once"));
            }
        }
        let mut next = self.state.clone();
        next.skill_proficiencies = skills;
        self.propose(BuildField::SkillProficiencies, next)
    }

    /// Add an item to its slot. It needs data in the edition's equipment bucket.
    pub fn add_equipment(
        &mut self,
        slot: EquipmentSlot,
        item: EquipmentId,
    ) -> Result<ChangeOutcome, DomainError> {
        let entry = self
            .catalog
            .equipment(&item)
            .ok_or_else(|| DomainError::not_found("Equipment", item.as_str()))?;
        if slot_for(entry.kind) != slot {
            return Err(DomainError::constraint(format!(
                "{} does not belong in {}",
                entry.name,
                slot.label()
            )));
        }
        if let Some(edition) = self.state.edition.as_ref() {
            let bucket = self.equipment_editions.bucket_for(edition);
            if entry.bucket_data(&bucket).is_none() {
                return Err(DomainError::constraint(format!(
                    "{} is not available in this edition",
                    entry.name
                )));
            }
        }
        let mut next = self.state.clone();
        let owned = next.equipment.slot_mut(slot);
        if !owned.contains(&item) {
            owned.push(item);
        }
        self.propose(slot.field(), next)
    }

    pub fn remove_equipment(
        &mut self,
        slot: EquipmentSlot,
        item: &EquipmentId,
    ) -> Result<ChangeOutcome, DomainError> {
        let mut next = self.state.clone();
        next.equipment.slot_mut(slot).retain(|owned| owned != item);
        self.propose(slot.field(), next)
    }

    pub fn set_wealth(&mut self, wealth: Wealth) -> Result<ChangeOutcome, DomainError> {
        let mut next = self.state.clone();
        next.wealth = wealth;
        self.propose(BuildField::Wealth, next)
    }
}
