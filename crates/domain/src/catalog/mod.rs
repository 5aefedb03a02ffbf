//! Rules catalog: immutable, edition-keyed reference data.
//!
//! The catalog is built once per process from a [`CatalogData`] document.
//! Construction validates cross references and resolves class aliases
//! ("mage" → "wizard") so that nothing downstream compares alias strings.
//! After that it is a set of indexed lookup tables with no further logic.

mod class;
mod edition;
mod equipment;
mod race;
mod spell;

#[cfg(any(test, feature = "testing"))]
pub mod fixtures;

pub use class::{
    ArcanumGrant, AttackTier, CharacterClass, ClassDefinition, ClassEditionData,
    ClassProficiencies, ClassProgression, ClassRequirement, CombatProgression,
    HitPointProgression, ProficiencyGrant, SpellProgression, SpellcastingKind, SpellsKnownTable,
};
pub use edition::{
    Alignment, ArmorClassRules, Edition, ExperienceTable, LevelTier, MulticlassPolicy, Setting,
};
pub use equipment::{
    ArmorCategory, ArmorStats, BucketMap, Equipment, EquipmentEditionData,
    EquipmentEditionResolver, EquipmentKind, SameEditionBucket, WeaponStats,
};
pub use race::Race;
pub use spell::{Spell, SpellEditionData};

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::{ClassId, EditionId, EquipmentId, RaceId, SpellId};

/// Error raised while building a catalog from reference data.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Duplicate {entity_type} id: {id}")]
    DuplicateId { entity_type: &'static str, id: String },

    #[error("{referenced_by} references unknown {entity_type} '{id}'")]
    UnknownReference {
        entity_type: &'static str,
        id: String,
        referenced_by: String,
    },

    #[error("Invalid spell table for {class} in {edition}: {reason}")]
    InvalidSpellTable {
        class: String,
        edition: String,
        reason: String,
    },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serialized form of the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CatalogData {
    #[serde(default)]
    pub editions: Vec<Edition>,
    #[serde(default)]
    pub classes: Vec<CharacterClass>,
    #[serde(default)]
    pub races: Vec<Race>,
    #[serde(default)]
    pub spells: Vec<Spell>,
    #[serde(default)]
    pub equipment: Vec<Equipment>,
}

/// Indexed, read-only reference data. Safe to share across threads.
#[derive(Debug, Clone)]
pub struct RulesCatalog {
    data: CatalogData,
    editions: HashMap<EditionId, usize>,
    classes: HashMap<ClassId, usize>,
    races: HashMap<RaceId, usize>,
    spells: HashMap<SpellId, usize>,
    equipment: HashMap<EquipmentId, usize>,
    aliases: HashMap<String, ClassId>,
}

impl RulesCatalog {
    /// Build a catalog, resolving aliases and validating every reference.
    pub fn from_data(mut data: CatalogData) -> Result<Self, CatalogError> {
        let aliases = collect_aliases(&data.classes)?;
        canonicalize_class_refs(&mut data, &aliases);

        let editions = index_by(&data.editions, "Edition", |e| e.id.clone())?;
        let classes = index_by(&data.classes, "CharacterClass", |c| c.id.clone())?;
        let races = index_by(&data.races, "Race", |r| r.id.clone())?;
        let spells = index_by(&data.spells, "Spell", |s| s.id.clone())?;
        let equipment = index_by(&data.equipment, "Equipment", |e| e.id.clone())?;

        let catalog = Self {
            data,
            editions,
            classes,
            races,
            spells,
            equipment,
            aliases,
        };
        catalog.validate_references()?;
        Ok(catalog)
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let data: CatalogData = serde_json::from_str(json)?;
        Self::from_data(data)
    }

    /// The canonicalized document this catalog was built from.
    pub fn data(&self) -> &CatalogData {
        &self.data
    }

    pub fn editions(&self) -> &[Edition] {
        &self.data.editions
    }

    pub fn classes(&self) -> &[CharacterClass] {
        &self.data.classes
    }

    pub fn races(&self) -> &[Race] {
        &self.data.races
    }

    pub fn spells(&self) -> &[Spell] {
        &self.data.spells
    }

    pub fn equipment_items(&self) -> &[Equipment] {
        &self.data.equipment
    }

    pub fn edition(&self, id: &EditionId) -> Option<&Edition> {
        self.editions.get(id).map(|&i| &self.data.editions[i])
    }

    pub fn class(&self, id: &ClassId) -> Option<&CharacterClass> {
        self.classes.get(id).map(|&i| &self.data.classes[i])
    }

    pub fn race(&self, id: &RaceId) -> Option<&Race> {
        self.races.get(id).map(|&i| &self.data.races[i])
    }

    pub fn spell(&self, id: &SpellId) -> Option<&Spell> {
        self.spells.get(id).map(|&i| &self.data.spells[i])
    }

    pub fn equipment(&self, id: &EquipmentId) -> Option<&Equipment> {
        self.equipment.get(id).map(|&i| &self.data.equipment[i])
    }

    /// Map a class id or one of its aliases to the canonical class id.
    pub fn resolve_class_alias(&self, id: &str) -> Option<ClassId> {
        let key = id.to_ascii_lowercase();
        if let Some(canonical) = self.aliases.get(&key) {
            return Some(canonical.clone());
        }
        self.classes.contains_key(id).then(|| ClassId::new(id))
    }

    /// Class data for an edition, inheriting from the parent class when the
    /// class itself has none.
    pub fn class_edition_data(
        &self,
        class: &ClassId,
        edition: &EditionId,
    ) -> Option<&ClassEditionData> {
        let entry = self.class(class)?;
        entry.edition_data(edition).or_else(|| {
            entry
                .parent
                .as_ref()
                .and_then(|parent| self.class(parent))
                .and_then(|parent| parent.edition_data(edition))
        })
    }

    /// Display name for a class id, falling back to the id itself.
    pub fn class_name(&self, id: &ClassId) -> String {
        self.class(id)
            .map_or_else(|| id.to_string(), |c| c.name.clone())
    }

    pub fn spell_name(&self, id: &SpellId) -> String {
        self.spell(id)
            .map_or_else(|| id.to_string(), |s| s.name.clone())
    }

    pub fn equipment_name(&self, id: &EquipmentId) -> String {
        self.equipment(id)
            .map_or_else(|| id.to_string(), |e| e.name.clone())
    }

    pub fn race_name(&self, id: &RaceId) -> String {
        self.race(id).map_or_else(|| id.to_string(), |r| r.name.clone())
    }

    /// Spells on a class's list in an edition, in catalog order.
    pub fn spells_for_class(&self, class: &ClassId, edition: &EditionId) -> Vec<&Spell> {
        self.data
            .spells
            .iter()
            .filter(|spell| {
                spell
                    .edition_data(edition)
                    .is_some_and(|data| data.available_to(class))
            })
            .collect()
    }

    fn validate_references(&self) -> Result<(), CatalogError> {
        for edition in &self.data.editions {
            let owner = format!("Edition '{}'", edition.id);
            for race in &edition.races {
                self.require_race(race, &owner)?;
            }
            for class in &edition.classes {
                self.require_class(class, &owner)?;
            }
            for setting in &edition.settings {
                let owner = format!("Setting '{}'", setting.id);
                for race in setting.races.iter().flatten() {
                    self.require_race(race, &owner)?;
                }
                for class in setting.classes.iter().flatten() {
                    self.require_class(class, &owner)?;
                }
            }
        }

        for class in &self.data.classes {
            let owner = format!("Class '{}'", class.id);
            if let Some(parent) = &class.parent {
                self.require_class(parent, &owner)?;
            }
            for (edition, data) in &class.editions {
                self.require_edition(edition, &owner)?;
                if let Some(spellcasting) = data.progression.as_ref().and_then(|p| p.spellcasting.as_ref()) {
                    validate_spell_table(&class.id, edition, spellcasting)?;
                }
            }
        }

        for spell in &self.data.spells {
            let owner = format!("Spell '{}'", spell.id);
            for (edition, data) in &spell.editions {
                self.require_edition(edition, &owner)?;
                for class in &data.classes {
                    self.require_class(class, &owner)?;
                }
            }
        }

        Ok(())
    }

    fn require_edition(&self, id: &EditionId, owner: &str) -> Result<(), CatalogError> {
        if self.editions.contains_key(id) {
            Ok(())
        } else {
            Err(unknown("Edition", id.as_str(), owner))
        }
    }

    fn require_class(&self, id: &ClassId, owner: &str) -> Result<(), CatalogError> {
        if self.classes.contains_key(id) {
            Ok(())
        } else {
            Err(unknown("CharacterClass", id.as_str(), owner))
        }
    }

    fn require_race(&self, id: &RaceId, owner: &str) -> Result<(), CatalogError> {
        if self.races.contains_key(id) {
            Ok(())
        } else {
            Err(unknown("Race", id.as_str(), owner))
        }
    }
}

fn unknown(entity_type: &'static str, id: &str, owner: &str) -> CatalogError {
    CatalogError::UnknownReference {
        entity_type,
        id: id.to_string(),
        referenced_by: owner.to_string(),
    }
}

fn index_by<T, K, F>(
    items: &[T],
    entity_type: &'static str,
    key: F,
) -> Result<HashMap<K, usize>, CatalogError>
where
    K: std::hash::Hash + Eq + std::fmt::Display,
    F: Fn(&T) -> K,
{
    let mut index = HashMap::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let id = key(item);
        if index.contains_key(&id) {
            return Err(CatalogError::DuplicateId {
                entity_type,
                id: id.to_string(),
            });
        }
        index.insert(id, i);
    }
    Ok(index)
}

fn collect_aliases(classes: &[CharacterClass]) -> Result<HashMap<String, ClassId>, CatalogError> {
    let mut aliases = HashMap::new();
    for class in classes {
        for alias in &class.aliases {
            let key = alias.to_ascii_lowercase();
            if let Some(existing) = aliases.insert(key, class.id.clone()) {
                if existing != class.id {
                    return Err(CatalogError::DuplicateId {
                        entity_type: "class alias",
                        id: alias.clone(),
                    });
                }
            }
        }
    }
    Ok(aliases)
}

/// Rewrite every class reference to its canonical id, once, at load time.
fn canonicalize_class_refs(data: &mut CatalogData, aliases: &HashMap<String, ClassId>) {
    let canonical = |id: &ClassId| -> ClassId {
        aliases
            .get(&id.as_str().to_ascii_lowercase())
            .cloned()
            .unwrap_or_else(|| id.clone())
    };
    let canonical_list = |ids: &[ClassId]| -> Vec<ClassId> {
        let mut seen = HashSet::new();
        ids.iter()
            .map(&canonical)
            .filter(|id| seen.insert(id.clone()))
            .collect()
    };

    for edition in &mut data.editions {
        edition.classes = canonical_list(&edition.classes);
        for setting in &mut edition.settings {
            if let Some(classes) = setting.classes.as_mut() {
                *classes = canonical_list(classes);
            }
        }
    }
    for class in &mut data.classes {
        if let Some(parent) = class.parent.as_mut() {
            *parent = canonical(parent);
        }
    }
    for spell in &mut data.spells {
        for edition_data in spell.editions.values_mut() {
            edition_data.classes = canonical_list(&edition_data.classes);
        }
    }
}

fn validate_spell_table(
    class: &ClassId,
    edition: &EditionId,
    progression: &SpellProgression,
) -> Result<(), CatalogError> {
    let max = usize::from(progression.max_spell_level);
    for (row, slots) in progression.slots.iter().enumerate() {
        if slots.len() > max {
            return Err(CatalogError::InvalidSpellTable {
                class: class.to_string(),
                edition: edition.to_string(),
                reason: format!(
                    "level {} row has {} spell levels but max spell level is {}",
                    row + 1,
                    slots.len(),
                    max
                ),
            });
        }
    }
    for grant in &progression.mystic_arcanum {
        if grant.spell_level == 0 || grant.class_level == 0 {
            return Err(CatalogError::InvalidSpellTable {
                class: class.to_string(),
                edition: edition.to_string(),
                reason: format!(
                    "arcanum grant at class level {} for spell level {} must be non-zero",
                    grant.class_level, grant.spell_level
                ),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::fixtures::sample_catalog;
    use super::*;

    #[test]
    fn aliases_resolve_to_canonical_class() {
        let catalog = sample_catalog();
        assert_eq!(
            catalog.resolve_class_alias("mage"),
            Some(ClassId::from("wizard"))
        );
        assert_eq!(
            catalog.resolve_class_alias("Magic-User"),
            Some(ClassId::from("wizard"))
        );
        assert_eq!(
            catalog.resolve_class_alias("wizard"),
            Some(ClassId::from("wizard"))
        );
        assert_eq!(catalog.resolve_class_alias("artificer"), None);
    }

    #[test]
    fn edition_lists_are_canonicalized_at_load() {
        let catalog = sample_catalog();
        let second = catalog.edition(&EditionId::from("2e")).expect("2e");
        assert!(second.classes.contains(&ClassId::from("wizard")));
        assert!(!second.classes.iter().any(|c| c.as_str() == "mage"));
    }

    #[test]
    fn class_data_falls_back_to_parent() {
        let catalog = sample_catalog();
        let bard_2e = catalog
            .class_edition_data(&ClassId::from("bard"), &EditionId::from("2e"))
            .expect("bard inherits rogue data in 2e");
        let rogue_2e = catalog
            .class_edition_data(&ClassId::from("rogue"), &EditionId::from("2e"))
            .expect("rogue data");
        assert_eq!(bard_2e, rogue_2e);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut data = sample_catalog().data().clone();
        let dup = data.races[0].clone();
        data.races.push(dup);
        let err = RulesCatalog::from_data(data).expect_err("duplicate race");
        assert!(matches!(err, CatalogError::DuplicateId { entity_type: "Race", .. }));
    }

    #[test]
    fn unknown_references_are_rejected() {
        let mut data = sample_catalog().data().clone();
        data.editions[0].races.push(RaceId::from("tortle"));
        let err = RulesCatalog::from_data(data).expect_err("unknown race");
        assert!(err.to_string().contains("tortle"));
    }

    #[test]
    fn slot_rows_beyond_max_spell_level_are_rejected() {
        let mut data = sample_catalog().data().clone();
        let wizard = data
            .classes
            .iter_mut()
            .find(|c| c.id.as_str() == "wizard")
            .expect("wizard");
        let progression = wizard
            .editions
            .get_mut(&EditionId::from("5e"))
            .and_then(|d| d.progression.as_mut())
            .and_then(|p| p.spellcasting.as_mut())
            .expect("wizard spellcasting");
        progression.max_spell_level = 2;
        let err = RulesCatalog::from_data(data).expect_err("invalid table");
        assert!(matches!(err, CatalogError::InvalidSpellTable { .. }));
    }

    #[test]
    fn catalog_round_trips_through_json() {
        let catalog = sample_catalog();
        let json = serde_json::to_string(catalog.data()).expect("serialize");
        let reloaded = RulesCatalog::from_json_str(&json).expect("reload");
        assert_eq!(reloaded.editions().len(), catalog.editions().len());
        assert_eq!(reloaded.spells().len(), catalog.spells().len());
    }

    #[test]
    fn spells_for_class_filters_by_edition() {
        let catalog = sample_catalog();
        let names: Vec<_> = catalog
            .spells_for_class(&ClassId::from("wizard"), &EditionId::from("2e"))
            .into_iter()
            .map(|s| s.name.as_str())
            .collect();
        assert!(names.contains(&"Magic Missile"));
        assert!(!names.contains(&"Fire Bolt"));
    }
}
