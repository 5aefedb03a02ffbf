use crate::catalog::{Alignment, ClassProgression, ClassRequirement, RulesCatalog};
use crate::ids::{AlignmentId, ClassId, EditionId, RaceId, SettingId};

/// Races allowed for an edition, narrowed by the setting when it restricts races.
///
/// A setting id that the edition does not define adds no restriction.
pub fn allowed_races(
    catalog: &RulesCatalog,
    edition: &EditionId,
    setting: Option<&SettingId>,
) -> Vec<RaceId> {
    let Some(edition) = catalog.edition(edition) else {
        return Vec::new();
    };
    let restriction = setting
        .and_then(|id| edition.setting(id))
        .and_then(|s| s.races.as_ref());
    edition
        .races
        .iter()
        .filter(|race| restriction.map_or(true, |allowed| allowed.contains(race)))
        .cloned()
        .collect()
}

/// Classes allowed for an edition, narrowed by the setting when it restricts classes.
pub fn allowed_classes(
    catalog: &RulesCatalog,
    edition: &EditionId,
    setting: Option<&SettingId>,
) -> Vec<ClassId> {
    let Some(edition) = catalog.edition(edition) else {
        return Vec::new();
    };
    let restriction = setting
        .and_then(|id| edition.setting(id))
        .and_then(|s| s.classes.as_ref());
    edition
        .classes
        .iter()
        .filter(|class| restriction.map_or(true, |allowed| allowed.contains(class)))
        .cloned()
        .collect()
}

pub fn is_race_allowed(
    catalog: &RulesCatalog,
    edition: &EditionId,
    setting: Option<&SettingId>,
    race: &RaceId,
) -> bool {
    allowed_races(catalog, edition, setting).contains(race)
}

pub fn is_class_allowed(
    catalog: &RulesCatalog,
    edition: &EditionId,
    setting: Option<&SettingId>,
    class: &ClassId,
) -> bool {
    allowed_classes(catalog, edition, setting).contains(class)
}

/// `None` when the class has no data for the edition (placeholder classes).
pub fn class_requirement<'a>(
    catalog: &'a RulesCatalog,
    class: &ClassId,
    edition: &EditionId,
) -> Option<&'a ClassRequirement> {
    catalog
        .class_edition_data(class, edition)
        .map(|data| &data.requirements)
}

pub fn class_progression<'a>(
    catalog: &'a RulesCatalog,
    class: &ClassId,
    edition: &EditionId,
) -> Option<&'a ClassProgression> {
    catalog
        .class_edition_data(class, edition)
        .and_then(|data| data.progression.as_ref())
}

/// Whether a class may be taken given the rest of the build.
///
/// The class must be on the edition/setting allow-list and its requirements
/// must admit the race and alignment when those are chosen.
pub fn class_eligible(
    catalog: &RulesCatalog,
    class: &ClassId,
    edition: &EditionId,
    setting: Option<&SettingId>,
    race: Option<&RaceId>,
    alignment: Option<&AlignmentId>,
) -> bool {
    if !is_class_allowed(catalog, edition, setting, class) {
        return false;
    }
    match class_requirement(catalog, class, edition) {
        Some(requirement) => {
            race.map_or(true, |r| requirement.allows_race(r))
                && alignment.map_or(true, |a| requirement.allows_alignment(a))
        }
        None => true,
    }
}

/// Edition alignments that every chosen class admits.
pub fn alignment_options<'a>(
    catalog: &'a RulesCatalog,
    edition: &EditionId,
    classes: &[ClassId],
) -> Vec<&'a Alignment> {
    let Some(edition_data) = catalog.edition(edition) else {
        return Vec::new();
    };
    let requirements: Vec<&ClassRequirement> = classes
        .iter()
        .filter_map(|class| class_requirement(catalog, class, edition))
        .collect();
    edition_data
        .alignments
        .iter()
        .filter(|alignment| requirements.iter().all(|r| r.allows_alignment(&alignment.id)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::sample_catalog;

    #[test]
    fn setting_narrows_edition_races() {
        let catalog = sample_catalog();
        let edition = EditionId::from("5e");
        let all = allowed_races(&catalog, &edition, None);
        assert!(all.contains(&RaceId::from("dragonborn")));

        let dark_sun = SettingId::from("dark-sun");
        let narrowed = allowed_races(&catalog, &edition, Some(&dark_sun));
        let ids: Vec<_> = narrowed.iter().map(RaceId::as_str).collect();
        assert_eq!(ids, vec!["human", "elf", "dwarf", "halfling"]);
    }

    #[test]
    fn unrestricted_setting_keeps_edition_list() {
        let catalog = sample_catalog();
        let edition = EditionId::from("5e");
        let realms = SettingId::from("forgotten-realms");
        assert_eq!(
            allowed_classes(&catalog, &edition, Some(&realms)),
            allowed_classes(&catalog, &edition, None)
        );
    }

    #[test]
    fn unknown_edition_allows_nothing() {
        let catalog = sample_catalog();
        assert!(allowed_races(&catalog, &EditionId::from("3e"), None).is_empty());
        assert!(allowed_classes(&catalog, &EditionId::from("3e"), None).is_empty());
    }

    #[test]
    fn race_requirements_gate_eligibility() {
        let catalog = sample_catalog();
        let second = EditionId::from("2e");
        let wizard = ClassId::from("wizard");
        assert!(class_eligible(&catalog, &wizard, &second, None, Some(&RaceId::from("elf")), None));
        assert!(!class_eligible(
            &catalog,
            &wizard,
            &second,
            None,
            Some(&RaceId::from("dwarf")),
            None
        ));
    }

    #[test]
    fn paladin_narrows_alignment_options() {
        let catalog = sample_catalog();
        let second = EditionId::from("2e");
        let options = alignment_options(&catalog, &second, &[ClassId::from("paladin")]);
        let ids: Vec<_> = options.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["lawful-good"]);

        let fighter = alignment_options(&catalog, &second, &[ClassId::from("fighter")]);
        assert_eq!(fighter.len(), 9);
    }

    #[test]
    fn placeholder_class_has_no_progression() {
        let catalog = sample_catalog();
        assert!(class_progression(&catalog, &ClassId::from("sorcerer"), &EditionId::from("2e")).is_none());
    }
}
