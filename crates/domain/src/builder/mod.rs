//! Character builder - the wizard state machine over [`BuildState`]
//!
//! # Change protocol
//!
//! Every setter builds the naively updated `next` state and hands it to the
//! validation engine. A change nothing depends on is committed at once; a
//! change that invalidates downstream selections is parked as a
//! [`PendingChange`] and the state is left untouched until the caller
//! confirms or cancels it.
//!
//! Malformed input (ids missing from the catalog, ids the edition does not
//! offer) is rejected by the setter with a [`DomainError`] and never reaches
//! the engine.

mod setters;
mod steps;

pub use steps::{edition_has_spellcasting, step_list};

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::build_state::{
    BuildField, BuildState, CharacterType, ClassEntry, EditMode, EquipmentSelection,
    LockedSelections, StepId, Wealth,
};
use crate::catalog::{Edition, EquipmentEditionResolver, RulesCatalog};
use crate::derive::{
    allowed_classes, allowed_races, alignment_options, class_eligible, combined_spell_limits,
    SpellLimits,
};
use crate::error::DomainError;
use crate::ids::{AlignmentId, CharacterId, ClassId, EditionId, RaceId, SettingId, SpellId};
use crate::invalidation::{
    detect_invalidations, resolve_invalidations, InvalidationGroup, InvalidationResult,
    RuleContext, RuleSet,
};
use crate::value_objects::CharacterName;

/// Level ceiling before an edition is chosen.
const DEFAULT_MAX_LEVEL: u8 = 20;

/// How the builder was opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BuilderMode {
    /// A new character
    #[default]
    Create,
    /// One step of a persisted character
    #[serde(rename_all = "camelCase")]
    Edit {
        character_id: CharacterId,
        step: StepId,
        #[serde(default)]
        locked: LockedSelections,
    },
}

/// Fields the caller fills in before the wizard starts.
///
/// In create mode every filled field counts as locked for step skipping; in
/// edit mode these are the persisted character's current values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BuilderOverrides {
    pub character_type: Option<CharacterType>,
    pub edition: Option<EditionId>,
    pub setting: Option<SettingId>,
    pub race: Option<RaceId>,
    pub alignment: Option<AlignmentId>,
    pub name: Option<String>,
    pub classes: Option<Vec<ClassEntry>>,
    pub total_level: Option<u8>,
    pub xp: Option<u32>,
    pub spells: Option<Vec<SpellId>>,
    pub equipment: Option<EquipmentSelection>,
    pub wealth: Option<Wealth>,
    pub skill_proficiencies: Option<Vec<String>>,
}

impl BuilderOverrides {
    /// Fields these overrides fill.
    pub fn prefilled(&self) -> Vec<BuildField> {
        let mut fields = Vec::new();
        let mut mark = |present: bool, field: &[BuildField]| {
            if present {
                fields.extend_from_slice(field);
            }
        };
        mark(self.character_type.is_some(), &[BuildField::CharacterType]);
        mark(self.edition.is_some(), &[BuildField::Edition]);
        mark(self.setting.is_some(), &[BuildField::Setting]);
        mark(self.race.is_some(), &[BuildField::Race]);
        mark(self.alignment.is_some(), &[BuildField::Alignment]);
        mark(self.name.is_some(), &[BuildField::Name]);
        mark(self.classes.is_some(), &[BuildField::Classes]);
        mark(self.total_level.is_some(), &[BuildField::TotalLevel]);
        mark(self.xp.is_some(), &[BuildField::Xp]);
        mark(self.spells.is_some(), &[BuildField::Spells]);
        mark(
            self.equipment.is_some(),
            &[
                BuildField::Weapons,
                BuildField::Armor,
                BuildField::Gear,
                BuildField::MagicItems,
            ],
        );
        mark(self.wealth.is_some(), &[BuildField::Wealth]);
        mark(
            self.skill_proficiencies.is_some(),
            &[BuildField::SkillProficiencies],
        );
        fields
    }

    fn apply(self, state: &mut BuildState) {
        if let Some(character_type) = self.character_type {
            state.character_type = character_type;
        }
        state.edition = self.edition.or(state.edition.take());
        state.setting = self.setting.or(state.setting.take());
        state.race = self.race.or(state.race.take());
        state.alignment = self.alignment.or(state.alignment.take());
        state.name = self.name.or(state.name.take());
        if let Some(classes) = self.classes {
            state.total_level = classes
                .iter()
                .fold(0u8, |sum, entry| sum.saturating_add(entry.level))
                .max(1);
            state.classes = classes;
        }
        if let Some(total_level) = self.total_level {
            state.total_level = total_level;
        }
        if let Some(xp) = self.xp {
            state.xp = xp;
        }
        if let Some(spells) = self.spells {
            state.spells = spells;
        }
        if let Some(equipment) = self.equipment {
            state.equipment = equipment;
        }
        if let Some(wealth) = self.wealth {
            state.wealth = wealth;
        }
        if let Some(skills) = self.skill_proficiencies {
            state.skill_proficiencies = skills;
        }
    }
}

/// Result of a setter that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// Nothing downstream was affected; the state is updated
    Applied,
    /// Downstream selections would be removed; awaiting confirm or cancel
    NeedsConfirmation(InvalidationResult),
}

impl ChangeOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ChangeOutcome::Applied)
    }
}

/// A parked change: the state before, the naive proposal, and what it breaks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChange {
    pub prev: BuildState,
    pub next: BuildState,
    pub result: InvalidationResult,
}

/// A finished build, ready for the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedCharacter {
    pub id: CharacterId,
    pub name: CharacterName,
    pub character_type: CharacterType,
    pub edition: EditionId,
    pub setting: Option<SettingId>,
    pub race: RaceId,
    pub alignment: Option<AlignmentId>,
    pub classes: Vec<ClassEntry>,
    pub total_level: u8,
    pub xp: u32,
    pub spells: Vec<SpellId>,
    pub equipment: EquipmentSelection,
    pub wealth: Wealth,
    pub skill_proficiencies: Vec<String>,
}

impl CompletedCharacter {
    pub fn primary_class(&self) -> Option<&ClassId> {
        self.classes.first().and_then(|entry| entry.class_id.as_ref())
    }
}

/// The wizard over one build, owned by a single session.
pub struct CharacterBuilder {
    catalog: Arc<RulesCatalog>,
    rules: Arc<RuleSet>,
    equipment_editions: Arc<dyn EquipmentEditionResolver>,
    state: BuildState,
    prefilled: Vec<BuildField>,
    pending: Option<PendingChange>,
    notices: BTreeMap<StepId, Vec<InvalidationGroup>>,
}

impl fmt::Debug for CharacterBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CharacterBuilder")
            .field("state", &self.state)
            .field("prefilled", &self.prefilled)
            .field("pending", &self.pending.is_some())
            .finish_non_exhaustive()
    }
}

impl CharacterBuilder {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Open a builder.
    ///
    /// # Errors
    ///
    /// - `NotFound` when an override names an id the catalog does not have
    /// - `Validation` when a spell or class is listed twice, or the class
    ///   levels do not fit the total level
    pub fn open(
        catalog: Arc<RulesCatalog>,
        rules: Arc<RuleSet>,
        equipment_editions: Arc<dyn EquipmentEditionResolver>,
        mode: BuilderMode,
        overrides: BuilderOverrides,
    ) -> Result<Self, DomainError> {
        let prefilled = overrides.prefilled();
        let mut state = BuildState::default();
        overrides.apply(&mut state);
        validate_references(&catalog, &state)?;

        if let BuilderMode::Edit {
            character_id,
            step,
            locked,
        } = mode
        {
            state.step = step;
            state.edit_mode = Some(EditMode {
                character_id,
                step,
                locked,
            });
        }

        let mut builder = Self {
            catalog,
            rules,
            equipment_editions,
            state,
            prefilled,
            pending: None,
            notices: BTreeMap::new(),
        };
        if builder.state.edit_mode.is_none() {
            builder.state.step = builder
                .steps()
                .first()
                .copied()
                .unwrap_or(StepId::Confirmation);
        }
        tracing::debug!(
            step = ?builder.state.step,
            edit = builder.state.edit_mode.is_some(),
            prefilled = builder.prefilled.len(),
            "Character builder opened"
        );
        Ok(builder)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn state(&self) -> &BuildState {
        &self.state
    }

    pub fn catalog(&self) -> &RulesCatalog {
        &self.catalog
    }

    pub fn pending(&self) -> Option<&PendingChange> {
        self.pending.as_ref()
    }

    pub fn pending_invalidations(&self) -> Option<&InvalidationResult> {
        self.pending.as_ref().map(|pending| &pending.result)
    }

    /// Groups removed by confirmed changes, kept until dismissed.
    pub fn notices(&self, step: StepId) -> &[InvalidationGroup] {
        self.notices
            .get(&step)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn context(&self) -> RuleContext<'_> {
        RuleContext::new(&self.catalog, self.equipment_editions.as_ref())
    }

    fn current_edition(&self) -> Option<&Edition> {
        self.state
            .edition
            .as_ref()
            .and_then(|id| self.catalog.edition(id))
    }

    fn max_level(&self) -> u8 {
        self.current_edition()
            .map_or(DEFAULT_MAX_LEVEL, |edition| edition.max_level)
    }

    // =========================================================================
    // Change protocol
    // =========================================================================

    fn ensure_idle(&self) -> Result<(), DomainError> {
        if self.pending.is_some() {
            return Err(DomainError::invalid_state_transition(
                "A change is awaiting confirmation",
            ));
        }
        Ok(())
    }

    fn ensure_locked_kept(&self, candidate: &BuildState) -> Result<(), DomainError> {
        let Some(locked) = self.state.locked() else {
            return Ok(());
        };
        match locked.first_missing(candidate) {
            Some(field) => {
                tracing::warn!(field = %field, "Change rejected: locked selection would be removed");
                Err(DomainError::locked(field))
            }
            None => Ok(()),
        }
    }

    /// In edit mode only the edited step's fields may change.
    fn ensure_editable(&self, field: BuildField) -> Result<(), DomainError> {
        let Some(edit) = self.state.edit_mode.as_ref() else {
            return Ok(());
        };
        if edit.step.fields().contains(&field) {
            return Ok(());
        }
        tracing::warn!(
            field = field.name(),
            step = ?edit.step,
            "Change rejected: field is outside the edited step"
        );
        Err(DomainError::locked(field.name()))
    }

    /// Commit `next`, or park it when the engine reports invalidations.
    ///
    /// `field` is the field the setter edits; derived fields may change too.
    fn propose(&mut self, field: BuildField, next: BuildState) -> Result<ChangeOutcome, DomainError> {
        self.ensure_idle()?;
        self.ensure_editable(field)?;
        self.ensure_locked_kept(&next)?;

        let ctx = self.context();
        let result = detect_invalidations(&self.rules, &ctx, &self.state, &next);
        if !result.has_invalidations {
            tracing::debug!(step = ?self.state.step, "Build change committed");
            self.state = next;
            return Ok(ChangeOutcome::Applied);
        }

        let preview = resolve_invalidations(&self.rules, &ctx, next.clone(), &result);
        self.ensure_locked_kept(&preview)?;
        tracing::debug!(
            affected = result.affected.len(),
            steps = ?result.steps(),
            "Build change awaiting confirmation"
        );
        self.pending = Some(PendingChange {
            prev: self.state.clone(),
            next,
            result: result.clone(),
        });
        Ok(ChangeOutcome::NeedsConfirmation(result))
    }

    /// Apply the parked change with its resolutions.
    pub fn confirm_change(&mut self) -> Result<&BuildState, DomainError> {
        let pending = self.pending.take().ok_or_else(|| {
            DomainError::invalid_state_transition("No change is awaiting confirmation")
        })?;
        let resolved = resolve_invalidations(
            &self.rules,
            &self.context(),
            pending.next,
            &pending.result,
        );
        for group in pending.result.grouped() {
            self.notices.entry(group.step_id).or_default().push(group);
        }
        tracing::debug!(
            affected = pending.result.affected.len(),
            "Build change confirmed"
        );
        self.state = resolved;
        Ok(&self.state)
    }

    /// Drop the parked change; the state is left as it was.
    pub fn cancel_change(&mut self) -> Option<PendingChange> {
        let pending = self.pending.take();
        if pending.is_some() {
            tracing::debug!("Build change cancelled");
        }
        pending
    }

    /// Clear the notices for a step. Returns whether there were any.
    pub fn dismiss_notice(&mut self, step: StepId) -> bool {
        self.notices.remove(&step).is_some()
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn steps(&self) -> Vec<StepId> {
        step_list(&self.catalog, &self.state, &self.prefilled)
    }

    pub fn current_step(&self) -> StepId {
        self.state.step
    }

    pub fn next_step(&mut self) -> Result<StepId, DomainError> {
        self.ensure_idle()?;
        let current = self.state.step;
        let next = self
            .steps()
            .into_iter()
            .find(|step| *step > current)
            .ok_or_else(|| DomainError::invalid_state_transition("Already at the last step"))?;
        self.state.step = next;
        Ok(next)
    }

    pub fn prev_step(&mut self) -> Result<StepId, DomainError> {
        self.ensure_idle()?;
        let current = self.state.step;
        let prev = self
            .steps()
            .into_iter()
            .rev()
            .find(|step| *step < current)
            .ok_or_else(|| DomainError::invalid_state_transition("Already at the first step"))?;
        self.state.step = prev;
        Ok(prev)
    }

    pub fn go_to_step(&mut self, step: StepId) -> Result<StepId, DomainError> {
        self.ensure_idle()?;
        if !self.steps().contains(&step) {
            return Err(DomainError::invalid_state_transition(format!(
                "Step '{}' is not part of this build",
                step.label()
            )));
        }
        self.state.step = step;
        Ok(step)
    }

    // =========================================================================
    // Derived views
    // =========================================================================

    pub fn allocated_levels(&self) -> u8 {
        self.state.allocated_levels()
    }

    pub fn remaining_levels(&self) -> u8 {
        self.state.remaining_levels()
    }

    pub fn race_options(&self) -> Vec<RaceId> {
        self.state.edition.as_ref().map_or_else(Vec::new, |edition| {
            allowed_races(&self.catalog, edition, self.state.setting.as_ref())
        })
    }

    /// Classes the edition/setting offers that the race and alignment admit.
    pub fn class_options(&self) -> Vec<ClassId> {
        let Some(edition) = self.state.edition.as_ref() else {
            return Vec::new();
        };
        allowed_classes(&self.catalog, edition, self.state.setting.as_ref())
            .into_iter()
            .filter(|class| {
                class_eligible(
                    &self.catalog,
                    class,
                    edition,
                    self.state.setting.as_ref(),
                    self.state.race.as_ref(),
                    self.state.alignment.as_ref(),
                )
            })
            .collect()
    }

    pub fn alignment_options(&self) -> Vec<AlignmentId> {
        let Some(edition) = self.state.edition.as_ref() else {
            return Vec::new();
        };
        let classes: Vec<ClassId> = self.state.class_ids().into_iter().cloned().collect();
        alignment_options(&self.catalog, edition, &classes)
            .into_iter()
            .map(|alignment| alignment.id.clone())
            .collect()
    }

    /// Spell limits of the current class levels combined.
    pub fn spell_limits(&self) -> SpellLimits {
        let Some(edition) = self.state.edition.as_ref() else {
            return SpellLimits::none();
        };
        combined_spell_limits(
            &self.catalog,
            edition,
            self.state
                .classes
                .iter()
                .filter_map(|entry| entry.class_id.as_ref().map(|class| (class, entry.level))),
        )
    }

    /// Spells on a current class's list that the limits allow at all.
    pub fn spell_options(&self) -> Vec<SpellId> {
        let Some(edition) = self.state.edition.as_ref() else {
            return Vec::new();
        };
        let limits = self.spell_limits();
        let classes = self.state.class_ids();
        self.catalog
            .spells()
            .iter()
            .filter(|spell| {
                spell.edition_data(edition).is_some_and(|data| {
                    classes.iter().any(|class| data.available_to(class))
                        && limits.cap_at(data.level) > 0
                        && (data.level == 0 || data.level <= limits.max_spell_level)
                })
            })
            .map(|spell| spell.id.clone())
            .collect()
    }

    // =========================================================================
    // Completion
    // =========================================================================

    /// Validate the build for hand-off to persistence.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` away from the confirmation step or while a
    ///   change is pending
    /// - `Validation` when edition, race, primary class or name is missing
    pub fn finish(&self) -> Result<CompletedCharacter, DomainError> {
        self.ensure_idle()?;
        let at_confirmation = self.state.step == StepId::Confirmation
            || self.state.edit_mode.is_some();
        if !at_confirmation {
            return Err(DomainError::invalid_state_transition(
                "Characters are generated from the confirmation step",
            ));
        }
        let state = &self.state;
        let edition = state
            .edition
            .clone()
            .ok_or_else(|| DomainError::validation("An edition is required"))?;
        let race = state
            .race
            .clone()
            .ok_or_else(|| DomainError::validation("A race is required"))?;
        if state.primary_class().is_none() {
            return Err(DomainError::validation("A primary class is required"));
        }
        let name = CharacterName::new(state.name.clone().unwrap_or_default())?;
        let id = state
            .edit_mode
            .as_ref()
            .map_or_else(CharacterId::new, |edit| edit.character_id);

        Ok(CompletedCharacter {
            id,
            name,
            character_type: state.character_type,
            edition,
            setting: state.setting.clone(),
            race,
            alignment: state.alignment.clone(),
            classes: state.classes.clone(),
            total_level: state.total_level,
            xp: state.xp,
            spells: state.spells.clone(),
            equipment: state.equipment.clone(),
            wealth: state.wealth,
            skill_proficiencies: state.skill_proficiencies.clone(),
        })
    }
}

/// Every id in `state` must exist somewhere in the catalog, and the class
/// levels must fit the total level.
fn validate_references(catalog: &RulesCatalog, state: &BuildState) -> Result<(), DomainError> {
    let max_level = state
        .edition
        .as_ref()
        .and_then(|edition| catalog.edition(edition))
        .map_or(DEFAULT_MAX_LEVEL, |edition| edition.max_level);
    if !(1..=max_level).contains(&state.total_level) {
        return Err(DomainError::validation(format!(
            "Total level must be between 1 and {}",
            max_level
        )));
    }
    if state.allocated_levels() > state.total_level {
        return Err(DomainError::validation(format!(
            "Class levels add up to {}, above the total level {}",
            state.allocated_levels(),
            state.total_level
        )));
    }
    if let Some(edition_id) = state.edition.as_ref() {
        let edition = catalog
            .edition(edition_id)
            .ok_or_else(|| DomainError::not_found("Edition", edition_id.as_str()))?;
        if let Some(setting) = state.setting.as_ref() {
            edition
                .setting(setting)
                .ok_or_else(|| DomainError::not_found("Setting", setting.as_str()))?;
        }
        if let Some(alignment) = state.alignment.as_ref() {
            if !edition.has_alignment(alignment) {
                return Err(DomainError::not_found("Alignment", alignment.as_str()));
            }
        }
    }
    if let Some(race) = state.race.as_ref() {
        catalog
            .race(race)
            .ok_or_else(|| DomainError::not_found("Race", race.as_str()))?;
    }
    let classes = state.class_ids();
    for (index, class) in classes.iter().enumerate() {
        catalog
            .class(class)
            .ok_or_else(|| DomainError::not_found("Class", class.as_str()))?;
        if classes[..index].contains(class) {
            return Err(DomainError::validation(format!(
                "Class '{}' is listed more than once",
                class
            )));
        }
    }
    for (index, spell) in state.spells.iter().enumerate() {
        catalog
            .spell(spell)
            .ok_or_else(|| DomainError::not_found("Spell", spell.as_str()))?;
        if state.spells[..index].contains(spell) {
            return Err(DomainError::validation(format!(
                "Spell '{}' is selected more than once",
                spell
            )));
        }
    }
    for item in state.equipment.iter() {
        catalog
            .equipment(item)
            .ok_or_else(|| DomainError::not_found("Equipment", item.as_str()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::sample_catalog;
    use crate::catalog::SameEditionBucket;

    pub(super) fn builder_with(mode: BuilderMode, overrides: BuilderOverrides) -> CharacterBuilder {
        CharacterBuilder::open(
            Arc::new(sample_catalog()),
            Arc::new(RuleSet::standard()),
            Arc::new(SameEditionBucket),
            mode,
            overrides,
        )
        .expect("builder opens")
    }

    pub(super) fn fresh() -> CharacterBuilder {
        builder_with(BuilderMode::Create, BuilderOverrides::default())
    }

    pub(super) fn dragonborn_sorcerer() -> CharacterBuilder {
        builder_with(
            BuilderMode::Create,
            BuilderOverrides {
                edition: Some(EditionId::from("5e")),
                race: Some(RaceId::from("dragonborn")),
                classes: Some(vec![ClassEntry::new("sorcerer", 5)]),
                ..BuilderOverrides::default()
            },
        )
    }

    #[test]
    fn fresh_builder_starts_at_edition() {
        let builder = fresh();
        assert_eq!(builder.current_step(), StepId::Edition);
        assert_eq!(builder.state().classes, vec![ClassEntry::placeholder()]);
        assert!(builder.pending_invalidations().is_none());
    }

    #[test]
    fn overrides_fill_and_skip_steps() {
        let builder = dragonborn_sorcerer();
        assert_eq!(builder.state().total_level, 5);
        assert_eq!(builder.current_step(), StepId::Setting);
        let steps = builder.steps();
        assert!(!steps.contains(&StepId::Edition));
        assert!(!steps.contains(&StepId::Race));
        assert!(!steps.contains(&StepId::Class));
    }

    #[test]
    fn unknown_override_ids_are_rejected() {
        let result = CharacterBuilder::open(
            Arc::new(sample_catalog()),
            Arc::new(RuleSet::standard()),
            Arc::new(SameEditionBucket),
            BuilderMode::Create,
            BuilderOverrides {
                race: Some(RaceId::from("tortle")),
                ..BuilderOverrides::default()
            },
        );
        assert!(matches!(result, Err(DomainError::NotFound { entity_type: "Race", .. })));
    }

    #[test]
    fn invalidating_change_waits_for_confirmation() {
        let mut builder = dragonborn_sorcerer();
        let before = builder.state().clone();

        let outcome = builder.set_edition(EditionId::from("2e")).expect("valid edition");
        let ChangeOutcome::NeedsConfirmation(result) = outcome else {
            panic!("expected confirmation");
        };
        assert_eq!(builder.state(), &before);
        let labels: Vec<_> = result.grouped().into_iter().map(|g| g.label).collect();
        assert_eq!(labels, vec!["Race", "Class"]);

        let state = builder.confirm_change().expect("pending change").clone();
        assert_eq!(state.edition, Some(EditionId::from("2e")));
        assert_eq!(state.race, None);
        assert_eq!(state.classes, vec![ClassEntry::placeholder()]);
        assert_eq!(builder.notices(StepId::Race).len(), 1);
        assert!(builder.dismiss_notice(StepId::Race));
        assert!(builder.notices(StepId::Race).is_empty());
    }

    #[test]
    fn cancel_leaves_state_untouched() {
        let mut builder = dragonborn_sorcerer();
        let before = builder.state().clone();
        builder.set_edition(EditionId::from("2e")).expect("valid edition");

        let cancelled = builder.cancel_change().expect("pending change");
        assert_eq!(cancelled.prev, before);
        assert_eq!(builder.state(), &before);
        assert!(builder.cancel_change().is_none());
        assert!(builder.confirm_change().is_err());
    }

    #[test]
    fn pending_change_blocks_further_edits() {
        let mut builder = dragonborn_sorcerer();
        builder.set_edition(EditionId::from("2e")).expect("valid edition");
        let err = builder.set_name("Kriv").expect_err("blocked");
        assert!(matches!(err, DomainError::InvalidStateTransition(_)));
        assert!(builder.next_step().is_err());
    }

    #[test]
    fn multiclass_level_drop_reports_wizard() {
        let mut builder = builder_with(
            BuilderMode::Create,
            BuilderOverrides {
                edition: Some(EditionId::from("5e")),
                race: Some(RaceId::from("human")),
                classes: Some(vec![ClassEntry::new("fighter", 7), ClassEntry::new("wizard", 3)]),
                ..BuilderOverrides::default()
            },
        );
        assert_eq!(builder.state().total_level, 10);

        let outcome = builder.set_total_level(5).expect("valid level");
        let ChangeOutcome::NeedsConfirmation(result) = outcome else {
            panic!("expected confirmation");
        };
        let class_items: Vec<_> = result
            .for_step(StepId::Class)
            .flat_map(|entry| entry.items.clone())
            .collect();
        assert_eq!(class_items, vec!["Wizard"]);

        let state = builder.confirm_change().expect("pending change");
        assert_eq!(state.classes, vec![ClassEntry::new("fighter", 5)]);
        assert_eq!(state.allocated_levels(), 5);
    }

    #[test]
    fn navigation_walks_the_step_list() {
        let mut builder = fresh();
        builder.set_edition(EditionId::from("4e")).expect("valid edition");
        assert_eq!(builder.next_step().expect("next"), StepId::Race);
        assert_eq!(builder.next_step().expect("next"), StepId::Class);
        assert_eq!(builder.prev_step().expect("prev"), StepId::Race);
        assert!(builder.go_to_step(StepId::Spells).is_err());
        assert_eq!(builder.go_to_step(StepId::Confirmation).expect("go"), StepId::Confirmation);
        assert!(builder.next_step().is_err());
    }

    #[test]
    fn views_follow_the_build() {
        let mut builder = fresh();
        assert!(builder.race_options().is_empty());
        builder.set_edition(EditionId::from("odnd")).expect("valid edition");
        assert_eq!(builder.race_options().len(), 4);
        builder.set_race(Some(RaceId::from("dwarf"))).expect("valid race");
        // OD&D dwarves may only be fighters
        assert_eq!(builder.class_options(), vec![ClassId::from("fighter")]);
        assert_eq!(builder.allocated_levels(), 1);
        assert_eq!(builder.remaining_levels(), 0);
    }

    #[test]
    fn finish_requires_a_complete_build() {
        let mut builder = dragonborn_sorcerer();
        assert!(matches!(
            builder.finish(),
            Err(DomainError::InvalidStateTransition(_))
        ));
        builder.go_to_step(StepId::Confirmation).expect("go");
        assert!(matches!(builder.finish(), Err(DomainError::Validation(_))));

        builder.set_name("  Kriv  ").expect("name");
        let character = builder.finish().expect("complete");
        assert_eq!(character.name.as_str(), "Kriv");
        assert_eq!(character.primary_class(), Some(&ClassId::from("sorcerer")));
        assert_eq!(character.total_level, 5);
    }

    #[test]
    fn edit_mode_only_changes_the_edited_step() {
        let mut builder = builder_with(
            BuilderMode::Edit {
                character_id: CharacterId::new(),
                step: StepId::Level,
                locked: LockedSelections::default(),
            },
            BuilderOverrides {
                edition: Some(EditionId::from("5e")),
                race: Some(RaceId::from("human")),
                name: Some("Durnan".to_string()),
                classes: Some(vec![ClassEntry::new("fighter", 3)]),
                ..BuilderOverrides::default()
            },
        );
        let before = builder.state().clone();

        let err = builder.set_race(Some(RaceId::from("elf"))).expect_err("race is not editable");
        assert_eq!(err, DomainError::locked("race"));
        let err = builder.set_edition(EditionId::from("4e")).expect_err("edition is not editable");
        assert_eq!(err, DomainError::locked("edition"));
        assert!(matches!(builder.set_name("Durnan the Wanderer"), Err(DomainError::Locked { .. })));
        assert_eq!(builder.state(), &before);

        assert!(builder.set_total_level(4).expect("level is editable").is_applied());
        assert_eq!(builder.state().classes, vec![ClassEntry::new("fighter", 4)]);
    }

    #[test]
    fn repeated_override_ids_are_rejected() {
        let result = CharacterBuilder::open(
            Arc::new(sample_catalog()),
            Arc::new(RuleSet::standard()),
            Arc::new(SameEditionBucket),
            BuilderMode::Create,
            BuilderOverrides {
                edition: Some(EditionId::from("5e")),
                classes: Some(vec![ClassEntry::new("wizard", 2)]),
                spells: Some(vec![
                    SpellId::from("sleep"),
                    SpellId::from("magic-missile"),
                    SpellId::from("sleep"),
                ]),
                ..BuilderOverrides::default()
            },
        );
        assert!(matches!(result, Err(DomainError::Validation(_))));

        let result = CharacterBuilder::open(
            Arc::new(sample_catalog()),
            Arc::new(RuleSet::standard()),
            Arc::new(SameEditionBucket),
            BuilderMode::Create,
            BuilderOverrides {
                edition: Some(EditionId::from("5e")),
                classes: Some(vec![ClassEntry::new("fighter", 2), ClassEntry::new("fighter", 1)]),
                ..BuilderOverrides::default()
            },
        );
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn total_level_override_must_cover_class_levels() {
        let open = |total_level: u8| {
            CharacterBuilder::open(
                Arc::new(sample_catalog()),
                Arc::new(RuleSet::standard()),
                Arc::new(SameEditionBucket),
                BuilderMode::Create,
                BuilderOverrides {
                    edition: Some(EditionId::from("5e")),
                    classes: Some(vec![ClassEntry::new("fighter", 3), ClassEntry::new("wizard", 2)]),
                    total_level: Some(total_level),
                    ..BuilderOverrides::default()
                },
            )
        };
        assert!(matches!(open(4), Err(DomainError::Validation(_))));
        assert!(matches!(open(0), Err(DomainError::Validation(_))));
        assert!(matches!(open(21), Err(DomainError::Validation(_))));
        let builder = open(6).expect("unallocated levels are allowed");
        assert_eq!(builder.remaining_levels(), 1);
    }

    #[test]
    fn edit_mode_keeps_locked_spells() {
        let character_id = CharacterId::new();
        let mut builder = builder_with(
            BuilderMode::Edit {
                character_id,
                step: StepId::Level,
                locked: LockedSelections {
                    spells: vec![SpellId::from("fireball")],
                    ..LockedSelections::default()
                },
            },
            BuilderOverrides {
                edition: Some(EditionId::from("5e")),
                race: Some(RaceId::from("human")),
                name: Some("Mirt".to_string()),
                classes: Some(vec![ClassEntry::new("wizard", 5)]),
                spells: Some(vec![SpellId::from("magic-missile"), SpellId::from("fireball")]),
                ..BuilderOverrides::default()
            },
        );
        assert_eq!(builder.steps(), vec![StepId::Level]);

        let err = builder.set_total_level(3).expect_err("locked");
        assert_eq!(err, DomainError::locked("spells.fireball"));
        assert!(builder.pending().is_none());
        assert_eq!(builder.state().total_level, 5);

        builder.set_total_level(6).expect("level up");
        let character = builder.finish().expect("complete");
        assert_eq!(character.id, character_id);
        assert_eq!(character.total_level, 6);
    }
}
