//! Equipment reference data and the edition → equipment-table resolver seam.
//!
//! Equipment data is keyed by *bucket*, not edition: several rule sets share
//! one equipment table (OD&D and Basic, for instance). Which bucket an edition
//! reads is decided by an injected [`EquipmentEditionResolver`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ids::{EditionId, EquipmentId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    pub id: EquipmentId,
    pub name: String,
    pub kind: EquipmentKind,
    /// Edition-specific data keyed by equipment bucket
    #[serde(default)]
    pub editions: HashMap<String, EquipmentEditionData>,
}

impl Equipment {
    pub fn bucket_data(&self, bucket: &str) -> Option<&EquipmentEditionData> {
        self.editions.get(bucket)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EquipmentKind {
    Weapon,
    Armor,
    Gear,
    MagicItem,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentEditionData {
    #[serde(default)]
    pub cost: Option<String>,
    #[serde(default)]
    pub weight: Option<u32>,
    #[serde(default)]
    pub armor: Option<ArmorStats>,
    #[serde(default)]
    pub weapon: Option<WeaponStats>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArmorStats {
    pub category: ArmorCategory,
    /// Base AC for body armor, bonus for shields
    pub armor_class: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ArmorCategory {
    Light,
    Medium,
    Heavy,
    Shield,
}

impl ArmorCategory {
    /// Largest Dexterity modifier this armor lets through; `None` is uncapped.
    pub fn dex_cap(&self) -> Option<i32> {
        match self {
            ArmorCategory::Light | ArmorCategory::Shield => None,
            ArmorCategory::Medium => Some(2),
            ArmorCategory::Heavy => Some(0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponStats {
    pub damage: String,
    #[serde(default)]
    pub properties: Vec<String>,
}

/// Maps an edition to the equipment table it reads from.
pub trait EquipmentEditionResolver: Send + Sync {
    fn bucket_for(&self, edition: &EditionId) -> String;
}

impl<F> EquipmentEditionResolver for F
where
    F: Fn(&EditionId) -> String + Send + Sync,
{
    fn bucket_for(&self, edition: &EditionId) -> String {
        self(edition)
    }
}

/// Every edition reads its own table.
#[derive(Debug, Clone, Copy, Default)]
pub struct SameEditionBucket;

impl EquipmentEditionResolver for SameEditionBucket {
    fn bucket_for(&self, edition: &EditionId) -> String {
        edition.as_str().to_string()
    }
}

/// Explicit edition → bucket overrides; unmapped editions read their own table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketMap {
    buckets: HashMap<EditionId, String>,
}

impl BucketMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, edition: impl Into<EditionId>, bucket: impl Into<String>) -> Self {
        self.buckets.insert(edition.into(), bucket.into());
        self
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

impl EquipmentEditionResolver for BucketMap {
    fn bucket_for(&self, edition: &EditionId) -> String {
        self.buckets
            .get(edition)
            .cloned()
            .unwrap_or_else(|| edition.as_str().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dex_caps_follow_armor_weight() {
        assert_eq!(ArmorCategory::Light.dex_cap(), None);
        assert_eq!(ArmorCategory::Medium.dex_cap(), Some(2));
        assert_eq!(ArmorCategory::Heavy.dex_cap(), Some(0));
    }

    #[test]
    fn bucket_map_falls_back_to_edition_id() {
        let map = BucketMap::new().with("odnd", "basic");
        assert_eq!(map.bucket_for(&EditionId::from("odnd")), "basic");
        assert_eq!(map.bucket_for(&EditionId::from("5e")), "5e");
    }

    #[test]
    fn closures_resolve_buckets() {
        let resolver = |edition: &EditionId| format!("{}-table", edition);
        assert_eq!(resolver.bucket_for(&EditionId::from("2e")), "2e-table");
    }
}
