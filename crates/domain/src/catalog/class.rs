//! Character class reference data.
//!
//! Progression shapes differ wildly between editions (5e spell slots, 2e
//! THAC0, 4e healing surges), so the per-edition pieces are tagged unions
//! rather than one record with mostly-empty fields.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::ids::{AlignmentId, ClassDefinitionId, ClassId, EditionId, EquipmentId, RaceId};

/// A character class and everything it means in each edition it exists in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterClass {
    pub id: ClassId,
    pub name: String,
    /// Class whose edition data is inherited when this one has none (2e Bard → Rogue)
    #[serde(default)]
    pub parent: Option<ClassId>,
    /// Alternative ids used by older books ("mage", "magic-user")
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub editions: HashMap<EditionId, ClassEditionData>,
}

impl CharacterClass {
    pub fn edition_data(&self, edition: &EditionId) -> Option<&ClassEditionData> {
        self.editions.get(edition)
    }
}

/// Everything a class means under one edition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClassEditionData {
    #[serde(default)]
    pub requirements: ClassRequirement,
    #[serde(default)]
    pub proficiencies: ClassProficiencies,
    /// `None` for placeholder classes that exist in the edition without tables
    #[serde(default)]
    pub progression: Option<ClassProgression>,
    /// Subclasses, archetypes, kits
    #[serde(default)]
    pub definitions: Vec<ClassDefinition>,
}

impl ClassEditionData {
    pub fn definition(&self, id: &ClassDefinitionId) -> Option<&ClassDefinition> {
        self.definitions.iter().find(|d| &d.id == id)
    }
}

/// Gates a class places on the rest of the build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClassRequirement {
    /// `None` means every race the edition allows
    #[serde(default)]
    pub allowed_races: Option<Vec<RaceId>>,
    /// `None` means every alignment the edition allows
    #[serde(default)]
    pub allowed_alignments: Option<Vec<AlignmentId>>,
    #[serde(default)]
    pub equipment_proficiencies: Vec<String>,
    #[serde(default)]
    pub restricted_equipment: Vec<EquipmentId>,
    /// Minimum ability scores needed to multiclass into this class ("str" → 13)
    #[serde(default)]
    pub multiclass_minimums: BTreeMap<String, u8>,
    /// Dice formula for starting gold ("5d4x10")
    #[serde(default)]
    pub starting_wealth: Option<String>,
}

impl ClassRequirement {
    pub fn allows_race(&self, race: &RaceId) -> bool {
        self.allowed_races
            .as_ref()
            .map_or(true, |races| races.contains(race))
    }

    pub fn allows_alignment(&self, alignment: &AlignmentId) -> bool {
        self.allowed_alignments
            .as_ref()
            .map_or(true, |alignments| alignments.contains(alignment))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClassProficiencies {
    #[serde(default)]
    pub skills: ProficiencyGrant,
    #[serde(default)]
    pub tools: ProficiencyGrant,
    #[serde(default)]
    pub weapons: Vec<String>,
    #[serde(default)]
    pub armor: Vec<String>,
}

/// Some proficiencies are granted outright, some are picked from a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProficiencyGrant {
    #[serde(default)]
    pub fixed: Vec<String>,
    #[serde(default)]
    pub choose: u8,
    #[serde(default)]
    pub from: Vec<String>,
}

impl ProficiencyGrant {
    pub fn offers(&self, choice: &str) -> bool {
        self.from.iter().any(|c| c == choice)
    }
}

/// Per-level mechanical growth of a class in one edition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassProgression {
    pub hit_points: HitPointProgression,
    pub combat: CombatProgression,
    #[serde(default)]
    pub saving_throws: Vec<String>,
    #[serde(default)]
    pub spellcasting: Option<SpellProgression>,
    /// Feature names keyed by the class level that grants them
    #[serde(default)]
    pub features: BTreeMap<u8, Vec<String>>,
    #[serde(default)]
    pub ability_score_improvements: Vec<u8>,
    /// XP thresholds indexed by `level - 1` when the edition uses per-class tables
    #[serde(default)]
    pub experience: Vec<u32>,
}

impl ClassProgression {
    /// Features unlocked at or below `level`, in level order.
    pub fn features_up_to(&self, level: u8) -> Vec<&str> {
        self.features
            .range(..=level)
            .flat_map(|(_, names)| names.iter().map(String::as_str))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HitPointProgression {
    /// Roll (or average) a die per level
    HitDie { die: u8 },
    /// Fixed hit points per level
    #[serde(rename_all = "camelCase")]
    Flat { first_level: u8, per_level: u8 },
    /// 4e-style flat hit points plus healing surges
    #[serde(rename_all = "camelCase")]
    Surges {
        first_level: u8,
        per_level: u8,
        surges_per_day: u8,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CombatProgression {
    /// Attack bonus comes from the edition's proficiency bonus table
    ProficiencyBonus,
    /// 3e base attack bonus tiers
    BaseAttack { tier: AttackTier },
    /// To-hit armor class 0, indexed by `level - 1`
    Thac0 { table: Vec<i32> },
    /// Half the character level
    HalfLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttackTier {
    Good,
    Average,
    Poor,
}

impl AttackTier {
    pub fn base_attack(&self, level: u8) -> i32 {
        let level = i32::from(level);
        match self {
            AttackTier::Good => level,
            AttackTier::Average => level * 3 / 4,
            AttackTier::Poor => level / 2,
        }
    }
}

/// Spellcasting tables for one class in one edition.
///
/// Slot rows are indexed `[class_level - 1][spell_level - 1]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellProgression {
    #[serde(flatten)]
    pub kind: SpellcastingKind,
    #[serde(default)]
    pub ability: Option<String>,
    #[serde(default)]
    pub cantrips_known: Vec<u32>,
    #[serde(default)]
    pub slots: Vec<Vec<u32>>,
    pub max_spell_level: u8,
    /// Single spells of a fixed level granted at specific class levels
    #[serde(default)]
    pub mystic_arcanum: Vec<ArcanumGrant>,
}

impl SpellProgression {
    pub fn is_known(&self) -> bool {
        matches!(self.kind, SpellcastingKind::Known { .. })
    }

    pub fn is_prepared(&self) -> bool {
        matches!(self.kind, SpellcastingKind::Prepared { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SpellcastingKind {
    /// Fixed repertoire
    #[serde(rename_all = "camelCase")]
    Known { spells_known: SpellsKnownTable },
    /// Daily preparation from the full list, count given by a formula ("int+level")
    #[serde(rename_all = "camelCase")]
    Prepared {
        #[serde(default)]
        formula: Option<String>,
    },
}

/// Spells known per class level: a flat count, or a count per spell level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpellsKnownTable {
    Flat(Vec<u32>),
    ByLevel(Vec<Vec<u32>>),
}

impl SpellsKnownTable {
    pub fn rows(&self) -> usize {
        match self {
            SpellsKnownTable::Flat(rows) => rows.len(),
            SpellsKnownTable::ByLevel(rows) => rows.len(),
        }
    }

    /// Total known at a row index, 0 when the table is empty.
    pub fn total_at(&self, row: usize) -> u32 {
        match self {
            SpellsKnownTable::Flat(rows) => rows.get(row).copied().unwrap_or(0),
            SpellsKnownTable::ByLevel(rows) => rows.get(row).map_or(0, |r| r.iter().sum()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArcanumGrant {
    pub class_level: u8,
    pub spell_level: u8,
}

/// A subclass / archetype / kit choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDefinition {
    pub id: ClassDefinitionId,
    pub name: String,
    #[serde(default = "default_min_level")]
    pub min_level: u8,
}

fn default_min_level() -> u8 {
    1
}
