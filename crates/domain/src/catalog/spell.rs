//! Spell reference data.
//!
//! A spell's level and class lists are edition-specific; the same spell can be
//! 1st level for wizards in one edition and absent in another.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ids::{ClassId, EditionId, SpellId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spell {
    pub id: SpellId,
    pub name: String,
    /// School of magic (e.g., "Evocation", "Necromancy")
    #[serde(default)]
    pub school: Option<String>,
    #[serde(default)]
    pub editions: HashMap<EditionId, SpellEditionData>,
}

impl Spell {
    pub fn edition_data(&self, edition: &EditionId) -> Option<&SpellEditionData> {
        self.editions.get(edition)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellEditionData {
    /// Spell level (cantrip = 0)
    pub level: u8,
    /// Classes whose spell list includes this spell
    #[serde(default)]
    pub classes: Vec<ClassId>,
}

impl SpellEditionData {
    pub fn is_cantrip(&self) -> bool {
        self.level == 0
    }

    pub fn available_to(&self, class: &ClassId) -> bool {
        self.classes.contains(class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cantrip_is_level_zero() {
        let data = SpellEditionData {
            level: 0,
            classes: vec![ClassId::from("wizard")],
        };
        assert!(data.is_cantrip());
        assert!(data.available_to(&ClassId::from("wizard")));
        assert!(!data.available_to(&ClassId::from("cleric")));
    }
}
