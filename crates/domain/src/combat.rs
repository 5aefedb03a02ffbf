//! Combat derivation: armor class and attack bonus.
//!
//! Recomputed from current equipment and classes on every call. Nothing here
//! touches the builder or the invalidation rules.

use serde::Serialize;

use crate::build_state::ClassEntry;
use crate::catalog::{
    ArmorCategory, ArmorStats, CombatProgression, EquipmentEditionResolver, RulesCatalog,
};
use crate::derive::{class_progression, proficiency_bonus};
use crate::ids::{EditionId, EquipmentId};

// =============================================================================
// Armor class
// =============================================================================

/// One way to wear owned armor: body armor (or none) plus a shield (or none).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArmorConfiguration {
    /// Stable across recomputation: `"unarmored"`, `"chain-mail+shield"`, ...
    pub id: String,
    pub armor: Option<EquipmentId>,
    pub shield: Option<EquipmentId>,
    pub armor_class: i32,
    pub breakdown: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArmorClass {
    pub value: i32,
    pub breakdown: String,
}

/// What [`calculate_armor_class`] needs to know about a character.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArmorClassInput<'a> {
    pub edition: Option<&'a EditionId>,
    /// Owned armor ids; shields included
    pub armor: &'a [EquipmentId],
    pub dex_modifier: i32,
    /// Configuration id the player last chose
    pub preferred: Option<&'a str>,
    /// Stored AC used when the edition has no armor class rules
    pub base_armor_class: Option<i32>,
}

struct OwnedArmor<'c> {
    id: &'c EquipmentId,
    name: &'c str,
    stats: ArmorStats,
}

fn dex_contribution(category: Option<ArmorCategory>, dex_modifier: i32) -> i32 {
    match category.and_then(|c| c.dex_cap()) {
        Some(0) => 0,
        Some(cap) => dex_modifier.min(cap),
        None => dex_modifier,
    }
}

fn configuration(
    unarmored_base: i32,
    armor: Option<&OwnedArmor<'_>>,
    shield: Option<&OwnedArmor<'_>>,
    dex_modifier: i32,
) -> ArmorConfiguration {
    let (base, mut parts) = match armor {
        Some(worn) => (
            worn.stats.armor_class,
            vec![format!("{} {}", worn.name, worn.stats.armor_class)],
        ),
        None => (unarmored_base, vec![format!("Unarmored {}", unarmored_base)]),
    };
    let category = armor.map(|worn| worn.stats.category);
    let dex = dex_contribution(category, dex_modifier);
    if category != Some(ArmorCategory::Heavy) {
        parts.push(format!("Dex {:+}", dex));
    }
    let shield_bonus = shield.map_or(0, |held| held.stats.armor_class);
    if let Some(held) = shield {
        parts.push(format!("{} {:+}", held.name, shield_bonus));
    }

    let id = match (armor, shield) {
        (None, None) => "unarmored".to_string(),
        (None, Some(held)) => format!("unarmored+{}", held.id),
        (Some(worn), None) => worn.id.to_string(),
        (Some(worn), Some(held)) => format!("{}+{}", worn.id, held.id),
    };
    ArmorConfiguration {
        id,
        armor: armor.map(|worn| worn.id.clone()),
        shield: shield.map(|held| held.id.clone()),
        armor_class: base + dex + shield_bonus,
        breakdown: parts.join(" + "),
    }
}

/// Every legal armor and shield pairing for the owned items, best first.
///
/// Always includes going unarmored. Items without armor stats in the edition's
/// equipment table are ignored. Ties keep enumeration order.
pub fn get_armor_configurations(
    catalog: &RulesCatalog,
    resolver: &dyn EquipmentEditionResolver,
    edition: &EditionId,
    owned: &[EquipmentId],
    dex_modifier: i32,
) -> Vec<ArmorConfiguration> {
    let unarmored_base = catalog
        .edition(edition)
        .and_then(|e| e.armor_class.as_ref())
        .map_or(10, |rules| rules.unarmored_base);
    let bucket = resolver.bucket_for(edition);

    let (shields, body): (Vec<OwnedArmor<'_>>, Vec<OwnedArmor<'_>>) = owned
        .iter()
        .filter_map(|id| {
            let item = catalog.equipment(id)?;
            let stats = item.bucket_data(&bucket)?.armor?;
            Some(OwnedArmor {
                id: &item.id,
                name: &item.name,
                stats,
            })
        })
        .partition(|owned| owned.stats.category == ArmorCategory::Shield);

    let mut configurations = Vec::with_capacity((body.len() + 1) * (shields.len() + 1));
    for armor in std::iter::once(None).chain(body.iter().map(Some)) {
        configurations.push(configuration(unarmored_base, armor, None, dex_modifier));
        for shield in &shields {
            configurations.push(configuration(unarmored_base, armor, Some(shield), dex_modifier));
        }
    }
    configurations.sort_by(|a, b| b.armor_class.cmp(&a.armor_class));
    configurations
}

/// The preferred configuration if it is still available, else the best one.
pub fn get_active_armor_config<'a>(
    configurations: &'a [ArmorConfiguration],
    preferred: Option<&str>,
) -> Option<&'a ArmorConfiguration> {
    preferred
        .and_then(|id| configurations.iter().find(|config| config.id == id))
        .or_else(|| configurations.first())
}

pub fn calculate_armor_class(
    catalog: &RulesCatalog,
    resolver: &dyn EquipmentEditionResolver,
    input: ArmorClassInput<'_>,
) -> ArmorClass {
    let supported = input
        .edition
        .filter(|id| catalog.edition(id).is_some_and(|e| e.armor_class.is_some()));
    let Some(edition) = supported else {
        let value = input.base_armor_class.unwrap_or(10);
        return ArmorClass {
            value,
            breakdown: format!("Base {}", value),
        };
    };

    let configurations =
        get_armor_configurations(catalog, resolver, edition, input.armor, input.dex_modifier);
    match get_active_armor_config(&configurations, input.preferred) {
        Some(active) => ArmorClass {
            value: active.armor_class,
            breakdown: active.breakdown.clone(),
        },
        None => ArmorClass {
            value: 10,
            breakdown: "Base 10".to_string(),
        },
    }
}

// =============================================================================
// Attack bonus
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackBonus {
    pub value: i32,
    pub breakdown: String,
}

/// Attack bonus of the primary class with the given ability modifier.
///
/// Proficiency and half-level progressions read the character level; base
/// attack and THAC0 read the class level. `None` without a primary class or
/// when it has no progression in the edition.
pub fn calculate_attack_bonus(
    catalog: &RulesCatalog,
    edition: &EditionId,
    classes: &[ClassEntry],
    ability_modifier: i32,
) -> Option<AttackBonus> {
    let primary = classes.first()?;
    let class = primary.class_id.as_ref()?;
    let progression = class_progression(catalog, class, edition)?;
    let character_level = classes
        .iter()
        .fold(0u8, |sum, entry| sum.saturating_add(entry.level));

    let (label, base) = match &progression.combat {
        CombatProgression::ProficiencyBonus => {
            let edition_data = catalog.edition(edition)?;
            ("Proficiency", proficiency_bonus(edition_data, character_level))
        }
        CombatProgression::BaseAttack { tier } => ("Base attack", tier.base_attack(primary.level)),
        CombatProgression::Thac0 { table } => {
            let last = table.len().checked_sub(1)?;
            let index = usize::from(primary.level.max(1) - 1).min(last);
            ("THAC0", 20 - table[index])
        }
        CombatProgression::HalfLevel => ("Half level", i32::from(character_level / 2)),
    };
    tracing::debug!(class = %class, base, ability_modifier, "Attack bonus derived");

    Some(AttackBonus {
        value: base + ability_modifier,
        breakdown: format!("{} {:+} + Ability {:+}", label, base, ability_modifier),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::sample_catalog;
    use crate::catalog::SameEditionBucket;

    fn ids(items: &[&str]) -> Vec<EquipmentId> {
        items.iter().map(|id| EquipmentId::from(*id)).collect()
    }

    fn five_e() -> EditionId {
        EditionId::from("5e")
    }

    #[test]
    fn unarmored_is_always_offered() {
        let catalog = sample_catalog();
        let configs = get_armor_configurations(&catalog, &SameEditionBucket, &five_e(), &[], 3);
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].id, "unarmored");
        assert_eq!(configs[0].armor_class, 13);
        assert_eq!(configs[0].breakdown, "Unarmored 10 + Dex +3");
    }

    #[test]
    fn pairs_every_body_armor_with_every_shield() {
        let catalog = sample_catalog();
        let owned = ids(&["leather-armor", "chain-mail", "shield", "longsword"]);
        let configs = get_armor_configurations(&catalog, &SameEditionBucket, &five_e(), &owned, 3);

        let mut found: Vec<&str> = configs.iter().map(|c| c.id.as_str()).collect();
        found.sort_unstable();
        assert_eq!(
            found,
            vec![
                "chain-mail",
                "chain-mail+shield",
                "leather-armor",
                "leather-armor+shield",
                "unarmored",
                "unarmored+shield",
            ]
        );
        assert_eq!(configs[0].id, "chain-mail+shield");
        assert_eq!(configs[0].armor_class, 18);
        assert_eq!(configs[0].breakdown, "Chain Mail 16 + Shield +2");
    }

    #[test]
    fn dex_caps_follow_armor_category() {
        let catalog = sample_catalog();
        let owned = ids(&["studded-leather", "half-plate", "plate-armor"]);
        let configs = get_armor_configurations(&catalog, &SameEditionBucket, &five_e(), &owned, 4);
        let ac = |id: &str| {
            configs
                .iter()
                .find(|c| c.id == id)
                .map(|c| c.armor_class)
                .expect("configuration present")
        };
        assert_eq!(ac("studded-leather"), 16);
        assert_eq!(ac("half-plate"), 17);
        assert_eq!(ac("plate-armor"), 18);
    }

    #[test]
    fn heavy_armor_ignores_a_dex_penalty() {
        let catalog = sample_catalog();
        let owned = ids(&["plate-armor"]);
        let configs = get_armor_configurations(&catalog, &SameEditionBucket, &five_e(), &owned, -1);
        assert_eq!(configs[0].armor_class, 18);
        assert_eq!(configs[1].armor_class, 9);
    }

    #[test]
    fn sort_is_descending_and_stable() {
        let catalog = sample_catalog();
        // Studded leather and unarmored with a shield tie at 15
        let owned = ids(&["studded-leather", "shield"]);
        let configs = get_armor_configurations(&catalog, &SameEditionBucket, &five_e(), &owned, 3);
        let totals: Vec<i32> = configs.iter().map(|c| c.armor_class).collect();
        assert_eq!(totals, vec![17, 15, 15, 13]);
        let order: Vec<&str> = configs.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(
            order,
            vec!["studded-leather+shield", "unarmored+shield", "studded-leather", "unarmored"]
        );
    }

    #[test]
    fn active_config_prefers_the_stored_choice() {
        let catalog = sample_catalog();
        let owned = ids(&["chain-mail", "shield"]);
        let configs = get_armor_configurations(&catalog, &SameEditionBucket, &five_e(), &owned, 1);

        let active = get_active_armor_config(&configs, Some("chain-mail")).expect("present");
        assert_eq!(active.armor_class, 16);

        let fallback = get_active_armor_config(&configs, Some("plate-armor")).expect("first");
        assert_eq!(fallback.id, "chain-mail+shield");
    }

    #[test]
    fn unsupported_edition_uses_stored_armor_class() {
        let catalog = sample_catalog();
        let owned = ids(&["chain-mail"]);
        let edition = EditionId::from("2e");
        let ac = calculate_armor_class(
            &catalog,
            &SameEditionBucket,
            ArmorClassInput {
                edition: Some(&edition),
                armor: &owned,
                base_armor_class: Some(4),
                ..ArmorClassInput::default()
            },
        );
        assert_eq!(ac.value, 4);

        let none = calculate_armor_class(&catalog, &SameEditionBucket, ArmorClassInput::default());
        assert_eq!(none.value, 10);
    }

    #[test]
    fn armor_class_follows_the_active_configuration() {
        let catalog = sample_catalog();
        let owned = ids(&["scale-mail", "shield"]);
        let edition = five_e();
        let ac = calculate_armor_class(
            &catalog,
            &SameEditionBucket,
            ArmorClassInput {
                edition: Some(&edition),
                armor: &owned,
                dex_modifier: 3,
                preferred: Some("scale-mail"),
                base_armor_class: None,
            },
        );
        assert_eq!(ac.value, 16);
        assert_eq!(ac.breakdown, "Scale Mail 14 + Dex +2");
    }

    #[test]
    fn shared_bucket_reads_the_other_table() {
        let catalog = sample_catalog();
        let owned = ids(&["scale-mail"]);
        let fourth_uses_fifth = |_: &EditionId| "5e".to_string();
        let configs =
            get_armor_configurations(&catalog, &fourth_uses_fifth, &EditionId::from("4e"), &owned, 3);
        assert_eq!(configs[0].armor_class, 16);
    }

    #[test]
    fn attack_bonus_by_progression() {
        let catalog = sample_catalog();

        let fifth = calculate_attack_bonus(&catalog, &five_e(), &[ClassEntry::new("fighter", 5)], 3)
            .expect("5e fighter");
        assert_eq!(fifth.value, 6);
        assert_eq!(fifth.breakdown, "Proficiency +3 + Ability +3");

        let second = calculate_attack_bonus(
            &catalog,
            &EditionId::from("2e"),
            &[ClassEntry::new("fighter", 3)],
            1,
        )
        .expect("2e fighter");
        assert_eq!(second.value, 3);

        let fourth = calculate_attack_bonus(
            &catalog,
            &EditionId::from("4e"),
            &[ClassEntry::new("wizard", 7)],
            0,
        )
        .expect("4e wizard");
        assert_eq!(fourth.value, 3);
    }

    #[test]
    fn no_primary_class_no_attack_bonus() {
        let catalog = sample_catalog();
        assert!(calculate_attack_bonus(&catalog, &five_e(), &[ClassEntry::placeholder()], 2).is_none());
        assert!(calculate_attack_bonus(&catalog, &five_e(), &[], 2).is_none());
    }
}
