//! The work-in-progress character the builder owns.
//!
//! `BuildState` is plain data: every transition produces a new value and the
//! validation engine diffs two of them field by field via [`BuildField`].

use serde::{Deserialize, Serialize};

use crate::ids::{
    AlignmentId, CharacterId, ClassDefinitionId, ClassId, EditionId, EquipmentId, RaceId,
    SettingId, SpellId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum CharacterType {
    #[default]
    Player,
    NonPlayer,
}

/// Wizard steps in their canonical order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "camelCase")]
pub enum StepId {
    #[default]
    Edition,
    Setting,
    Race,
    Class,
    Level,
    Alignment,
    Proficiencies,
    Spells,
    Equipment,
    Confirmation,
}

impl StepId {
    pub fn all() -> [StepId; 10] {
        [
            StepId::Edition,
            StepId::Setting,
            StepId::Race,
            StepId::Class,
            StepId::Level,
            StepId::Alignment,
            StepId::Proficiencies,
            StepId::Spells,
            StepId::Equipment,
            StepId::Confirmation,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            StepId::Edition => "Edition",
            StepId::Setting => "Setting",
            StepId::Race => "Race",
            StepId::Class => "Class",
            StepId::Level => "Level",
            StepId::Alignment => "Alignment",
            StepId::Proficiencies => "Proficiencies",
            StepId::Spells => "Spells",
            StepId::Equipment => "Equipment",
            StepId::Confirmation => "Confirmation",
        }
    }

    /// Fields the step edits.
    pub fn fields(&self) -> &'static [BuildField] {
        match self {
            StepId::Edition => &[BuildField::Edition],
            StepId::Setting => &[BuildField::Setting],
            StepId::Race => &[BuildField::Race],
            StepId::Class => &[BuildField::Classes],
            StepId::Level => &[BuildField::TotalLevel, BuildField::Xp],
            StepId::Alignment => &[BuildField::Alignment],
            StepId::Proficiencies => &[BuildField::SkillProficiencies],
            StepId::Spells => &[BuildField::Spells],
            StepId::Equipment => &[
                BuildField::Weapons,
                BuildField::Armor,
                BuildField::Gear,
                BuildField::MagicItems,
                BuildField::Wealth,
            ],
            StepId::Confirmation => &[BuildField::Name, BuildField::CharacterType],
        }
    }
}

/// Top-level fields of [`BuildState`] that rules can trigger on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BuildField {
    CharacterType,
    Edition,
    Setting,
    Race,
    Alignment,
    Name,
    Classes,
    TotalLevel,
    Xp,
    Spells,
    Weapons,
    Armor,
    Gear,
    MagicItems,
    Wealth,
    SkillProficiencies,
}

impl BuildField {
    pub fn name(&self) -> &'static str {
        match self {
            BuildField::CharacterType => "characterType",
            BuildField::Edition => "edition",
            BuildField::Setting => "setting",
            BuildField::Race => "race",
            BuildField::Alignment => "alignment",
            BuildField::Name => "name",
            BuildField::Classes => "classes",
            BuildField::TotalLevel => "totalLevel",
            BuildField::Xp => "xp",
            BuildField::Spells => "spells",
            BuildField::Weapons => "weapons",
            BuildField::Armor => "armor",
            BuildField::Gear => "gear",
            BuildField::MagicItems => "magicItems",
            BuildField::Wealth => "wealth",
            BuildField::SkillProficiencies => "skillProficiencies",
        }
    }

    /// Shallow inequality of this field between two states.
    pub fn differs(&self, prev: &BuildState, next: &BuildState) -> bool {
        match self {
            BuildField::CharacterType => prev.character_type != next.character_type,
            BuildField::Edition => prev.edition != next.edition,
            BuildField::Setting => prev.setting != next.setting,
            BuildField::Race => prev.race != next.race,
            BuildField::Alignment => prev.alignment != next.alignment,
            BuildField::Name => prev.name != next.name,
            BuildField::Classes => prev.classes != next.classes,
            BuildField::TotalLevel => prev.total_level != next.total_level,
            BuildField::Xp => prev.xp != next.xp,
            BuildField::Spells => prev.spells != next.spells,
            BuildField::Weapons => prev.equipment.weapons != next.equipment.weapons,
            BuildField::Armor => prev.equipment.armor != next.equipment.armor,
            BuildField::Gear => prev.equipment.gear != next.equipment.gear,
            BuildField::MagicItems => prev.equipment.magic_items != next.equipment.magic_items,
            BuildField::Wealth => prev.wealth != next.wealth,
            BuildField::SkillProficiencies => {
                prev.skill_proficiencies != next.skill_proficiencies
            }
        }
    }
}

/// One slot in the ordered class list; index 0 is the primary class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassEntry {
    #[serde(default)]
    pub class_id: Option<ClassId>,
    #[serde(default)]
    pub definition: Option<ClassDefinitionId>,
    pub level: u8,
}

impl ClassEntry {
    pub fn new(class_id: impl Into<ClassId>, level: u8) -> Self {
        Self {
            class_id: Some(class_id.into()),
            definition: None,
            level,
        }
    }

    /// The empty primary slot a build always keeps.
    pub fn placeholder() -> Self {
        Self {
            class_id: None,
            definition: None,
            level: 1,
        }
    }

    pub fn with_definition(mut self, definition: impl Into<ClassDefinitionId>) -> Self {
        self.definition = Some(definition.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EquipmentSlot {
    Weapons,
    Armor,
    Gear,
    MagicItems,
}

impl EquipmentSlot {
    pub fn all() -> [EquipmentSlot; 4] {
        [
            EquipmentSlot::Weapons,
            EquipmentSlot::Armor,
            EquipmentSlot::Gear,
            EquipmentSlot::MagicItems,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            EquipmentSlot::Weapons => "Weapons",
            EquipmentSlot::Armor => "Armor",
            EquipmentSlot::Gear => "Gear",
            EquipmentSlot::MagicItems => "Magic Items",
        }
    }

    pub fn field(&self) -> BuildField {
        match self {
            EquipmentSlot::Weapons => BuildField::Weapons,
            EquipmentSlot::Armor => BuildField::Armor,
            EquipmentSlot::Gear => BuildField::Gear,
            EquipmentSlot::MagicItems => BuildField::MagicItems,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentSelection {
    #[serde(default)]
    pub weapons: Vec<EquipmentId>,
    #[serde(default)]
    pub armor: Vec<EquipmentId>,
    #[serde(default)]
    pub gear: Vec<EquipmentId>,
    #[serde(default)]
    pub magic_items: Vec<EquipmentId>,
}

impl EquipmentSelection {
    pub fn slot(&self, slot: EquipmentSlot) -> &Vec<EquipmentId> {
        match slot {
            EquipmentSlot::Weapons => &self.weapons,
            EquipmentSlot::Armor => &self.armor,
            EquipmentSlot::Gear => &self.gear,
            EquipmentSlot::MagicItems => &self.magic_items,
        }
    }

    pub fn slot_mut(&mut self, slot: EquipmentSlot) -> &mut Vec<EquipmentId> {
        match slot {
            EquipmentSlot::Weapons => &mut self.weapons,
            EquipmentSlot::Armor => &mut self.armor,
            EquipmentSlot::Gear => &mut self.gear,
            EquipmentSlot::MagicItems => &mut self.magic_items,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &EquipmentId> {
        self.weapons
            .iter()
            .chain(&self.armor)
            .chain(&self.gear)
            .chain(&self.magic_items)
    }

    pub fn contains(&self, id: &EquipmentId) -> bool {
        self.iter().any(|owned| owned == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Currency {
    Platinum,
    Gold,
    Electrum,
    Silver,
    Copper,
}

impl Currency {
    pub fn all() -> [Currency; 5] {
        [
            Currency::Platinum,
            Currency::Gold,
            Currency::Electrum,
            Currency::Silver,
            Currency::Copper,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Currency::Platinum => "Platinum",
            Currency::Gold => "Gold",
            Currency::Electrum => "Electrum",
            Currency::Silver => "Silver",
            Currency::Copper => "Copper",
        }
    }

    pub fn from_name(name: &str) -> Option<Currency> {
        Currency::all().into_iter().find(|c| c.name() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Wealth {
    pub platinum: u32,
    pub gold: u32,
    pub electrum: u32,
    pub silver: u32,
    pub copper: u32,
}

impl Wealth {
    pub fn gold(amount: u32) -> Self {
        Self {
            gold: amount,
            ..Self::default()
        }
    }

    pub fn get(&self, currency: Currency) -> u32 {
        match currency {
            Currency::Platinum => self.platinum,
            Currency::Gold => self.gold,
            Currency::Electrum => self.electrum,
            Currency::Silver => self.silver,
            Currency::Copper => self.copper,
        }
    }

    pub fn set(&mut self, currency: Currency, amount: u32) {
        match currency {
            Currency::Platinum => self.platinum = amount,
            Currency::Gold => self.gold = amount,
            Currency::Electrum => self.electrum = amount,
            Currency::Silver => self.silver = amount,
            Currency::Copper => self.copper = amount,
        }
    }

    pub fn is_zero(&self) -> bool {
        Currency::all().iter().all(|&c| self.get(c) == 0)
    }

    /// Currencies holding a nonzero amount.
    pub fn held(&self) -> Vec<Currency> {
        Currency::all()
            .into_iter()
            .filter(|&c| self.get(c) > 0)
            .collect()
    }
}

/// Selections an edit session must not lose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LockedSelections {
    #[serde(default)]
    pub classes: Vec<ClassId>,
    #[serde(default)]
    pub spells: Vec<SpellId>,
    #[serde(default)]
    pub equipment: Vec<EquipmentId>,
}

impl LockedSelections {
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.spells.is_empty() && self.equipment.is_empty()
    }

    /// The first locked selection absent from `state`, as a field label.
    pub fn first_missing(&self, state: &BuildState) -> Option<String> {
        if let Some(class) = self
            .classes
            .iter()
            .find(|class| !state.class_ids().contains(class))
        {
            return Some(format!("classes.{}", class));
        }
        if let Some(spell) = self.spells.iter().find(|spell| !state.spells.contains(spell)) {
            return Some(format!("spells.{}", spell));
        }
        self.equipment
            .iter()
            .find(|item| !state.equipment.contains(item))
            .map(|item| format!("equipment.{}", item))
    }
}

/// Editing one step of a persisted character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditMode {
    pub character_id: CharacterId,
    pub step: StepId,
    #[serde(default)]
    pub locked: LockedSelections,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildState {
    #[serde(default)]
    pub character_type: CharacterType,
    #[serde(default)]
    pub edition: Option<EditionId>,
    #[serde(default)]
    pub setting: Option<SettingId>,
    #[serde(default)]
    pub race: Option<RaceId>,
    #[serde(default)]
    pub alignment: Option<AlignmentId>,
    #[serde(default)]
    pub name: Option<String>,
    pub classes: Vec<ClassEntry>,
    pub total_level: u8,
    #[serde(default)]
    pub xp: u32,
    #[serde(default)]
    pub spells: Vec<SpellId>,
    #[serde(default)]
    pub equipment: EquipmentSelection,
    #[serde(default)]
    pub wealth: Wealth,
    #[serde(default)]
    pub skill_proficiencies: Vec<String>,
    #[serde(default)]
    pub step: StepId,
    #[serde(default)]
    pub edit_mode: Option<EditMode>,
}

impl Default for BuildState {
    fn default() -> Self {
        Self {
            character_type: CharacterType::default(),
            edition: None,
            setting: None,
            race: None,
            alignment: None,
            name: None,
            classes: vec![ClassEntry::placeholder()],
            total_level: 1,
            xp: 0,
            spells: Vec::new(),
            equipment: EquipmentSelection::default(),
            wealth: Wealth::default(),
            skill_proficiencies: Vec::new(),
            step: StepId::default(),
            edit_mode: None,
        }
    }
}

impl BuildState {
    /// Sum of per-class levels.
    pub fn allocated_levels(&self) -> u8 {
        self.classes
            .iter()
            .fold(0u8, |sum, entry| sum.saturating_add(entry.level))
    }

    pub fn remaining_levels(&self) -> u8 {
        self.total_level.saturating_sub(self.allocated_levels())
    }

    pub fn primary_class(&self) -> Option<&ClassId> {
        self.classes.first().and_then(|entry| entry.class_id.as_ref())
    }

    /// Chosen class ids in slot order, skipping empty slots.
    pub fn class_ids(&self) -> Vec<&ClassId> {
        self.classes
            .iter()
            .filter_map(|entry| entry.class_id.as_ref())
            .collect()
    }

    pub fn class_entry(&self, class: &ClassId) -> Option<&ClassEntry> {
        self.classes
            .iter()
            .find(|entry| entry.class_id.as_ref() == Some(class))
    }

    pub fn locked(&self) -> Option<&LockedSelections> {
        self.edit_mode.as_ref().map(|mode| &mode.locked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn multiclass() -> BuildState {
        BuildState {
            classes: vec![ClassEntry::new("fighter", 7), ClassEntry::new("wizard", 3)],
            total_level: 10,
            ..BuildState::default()
        }
    }

    #[test]
    fn default_build_keeps_a_primary_slot() {
        let state = BuildState::default();
        assert_eq!(state.classes, vec![ClassEntry::placeholder()]);
        assert_eq!(state.total_level, 1);
        assert_eq!(state.allocated_levels(), 1);
        assert_eq!(state.primary_class(), None);
    }

    #[test]
    fn allocated_and_remaining_levels() {
        let mut state = multiclass();
        assert_eq!(state.allocated_levels(), 10);
        assert_eq!(state.remaining_levels(), 0);
        state.total_level = 12;
        assert_eq!(state.remaining_levels(), 2);
    }

    #[test]
    fn fields_differ_shallowly() {
        let prev = multiclass();
        let mut next = prev.clone();
        next.equipment.armor.push(EquipmentId::from("shield"));
        assert!(BuildField::Armor.differs(&prev, &next));
        assert!(!BuildField::Weapons.differs(&prev, &next));
        assert!(!BuildField::Classes.differs(&prev, &next));
    }

    #[test]
    fn wealth_reports_held_currencies() {
        let wealth = Wealth {
            gold: 15,
            copper: 3,
            ..Wealth::default()
        };
        assert_eq!(wealth.held(), vec![Currency::Gold, Currency::Copper]);
        assert!(!wealth.is_zero());
        assert_eq!(Currency::from_name("Gold"), Some(Currency::Gold));
    }

    #[test]
    fn locked_selections_report_missing_items() {
        let mut state = multiclass();
        state.spells.push(SpellId::from("sleep"));
        let locked = LockedSelections {
            classes: vec![ClassId::from("wizard")],
            spells: vec![SpellId::from("sleep")],
            equipment: vec![],
        };
        assert_eq!(locked.first_missing(&state), None);
        state.spells.clear();
        assert_eq!(locked.first_missing(&state), Some("spells.sleep".to_string()));
    }

    #[test]
    fn steps_are_ordered() {
        let steps = StepId::all();
        assert!(steps.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(StepId::default(), StepId::Edition);
    }

    #[test]
    fn build_state_serializes_camel_case() {
        let json = serde_json::to_value(multiclass()).expect("serialize");
        assert_eq!(json["totalLevel"], 10);
        assert_eq!(json["classes"][1]["classId"], "wizard");
    }
}
