//! Edition reference data.
//!
//! An edition is one ruleset version ("5e", "2e", "odnd") with its own
//! allow-lists, alignment set, and level-scaling tables.

use serde::{Deserialize, Serialize};

use crate::ids::{AlignmentId, ClassId, EditionId, RaceId, SettingId};

/// A ruleset version and the tables that scope every other catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edition {
    pub id: EditionId,
    pub name: String,
    /// Campaign settings that may narrow the race/class allow-lists
    #[serde(default)]
    pub settings: Vec<Setting>,
    #[serde(default)]
    pub races: Vec<RaceId>,
    #[serde(default)]
    pub classes: Vec<ClassId>,
    #[serde(default)]
    pub alignments: Vec<Alignment>,
    #[serde(default = "default_max_level")]
    pub max_level: u8,
    #[serde(default)]
    pub experience: ExperienceTable,
    /// Skills a class may offer as proficiency choices
    #[serde(default)]
    pub skills: Vec<String>,
    /// Proficiency bonus indexed by `level - 1`; empty for editions without one
    #[serde(default)]
    pub proficiency_bonus: Vec<i32>,
    #[serde(default)]
    pub multiclassing: MulticlassPolicy,
    #[serde(default)]
    pub magic_item_tiers: Vec<LevelTier>,
    /// Starting gold by level band
    #[serde(default)]
    pub wealth_tiers: Vec<LevelTier>,
    /// Absent when the combat derivation does not model this edition's AC
    #[serde(default)]
    pub armor_class: Option<ArmorClassRules>,
}

fn default_max_level() -> u8 {
    20
}

impl Edition {
    pub fn setting(&self, id: &SettingId) -> Option<&Setting> {
        self.settings.iter().find(|s| &s.id == id)
    }

    pub fn alignment(&self, id: &AlignmentId) -> Option<&Alignment> {
        self.alignments.iter().find(|a| &a.id == id)
    }

    pub fn has_alignment(&self, id: &AlignmentId) -> bool {
        self.alignment(id).is_some()
    }

    pub fn allows_multiclassing(&self) -> bool {
        !matches!(self.multiclassing, MulticlassPolicy::Disallowed)
    }
}

/// A campaign setting within an edition.
///
/// `None` lists mean "no restriction beyond the edition".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    pub id: SettingId,
    pub name: String,
    #[serde(default)]
    pub races: Option<Vec<RaceId>>,
    #[serde(default)]
    pub classes: Option<Vec<ClassId>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alignment {
    pub id: AlignmentId,
    pub name: String,
}

/// Where XP thresholds come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ExperienceTable {
    /// One table for every class, indexed by `level - 1`
    Shared { thresholds: Vec<u32> },
    /// Each class progression carries its own table
    PerClass,
    #[default]
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MulticlassPolicy {
    #[default]
    Disallowed,
    #[serde(rename_all = "camelCase")]
    Allowed {
        #[serde(default = "default_max_classes")]
        max_classes: u8,
    },
}

fn default_max_classes() -> u8 {
    3
}

impl MulticlassPolicy {
    pub fn max_classes(&self) -> usize {
        match self {
            MulticlassPolicy::Disallowed => 1,
            MulticlassPolicy::Allowed { max_classes } => usize::from((*max_classes).max(1)),
        }
    }
}

/// A level band carrying a gold amount (wealth or magic item budget).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelTier {
    pub min_level: u8,
    pub max_level: u8,
    pub gold: u32,
}

impl LevelTier {
    pub fn contains(&self, level: u8) -> bool {
        (self.min_level..=self.max_level).contains(&level)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArmorClassRules {
    /// AC before armor and Dexterity
    pub unarmored_base: i32,
}

impl Default for ArmorClassRules {
    fn default() -> Self {
        Self { unarmored_base: 10 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiclass_policy_defaults_to_disallowed() {
        let json = r#"{"id":"2e","name":"AD&D 2nd Edition"}"#;
        let edition: Edition = serde_json::from_str(json).expect("edition");
        assert!(!edition.allows_multiclassing());
        assert_eq!(edition.max_level, 20);
        assert_eq!(edition.multiclassing.max_classes(), 1);
    }

    #[test]
    fn tagged_multiclass_policy_parses() {
        let policy: MulticlassPolicy =
            serde_json::from_str(r#"{"type":"allowed","maxClasses":2}"#).expect("policy");
        assert_eq!(policy.max_classes(), 2);
    }

    #[test]
    fn level_tier_bounds_are_inclusive() {
        let tier = LevelTier {
            min_level: 1,
            max_level: 4,
            gold: 100,
        };
        assert!(tier.contains(1));
        assert!(tier.contains(4));
        assert!(!tier.contains(5));
    }
}
