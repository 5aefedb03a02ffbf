//! The wizard's step list for a given edition, character type and set of
//! caller-filled fields.

use crate::build_state::{BuildField, BuildState, CharacterType, StepId};
use crate::catalog::RulesCatalog;
use crate::derive::class_progression;

/// Whether any class of the edition casts spells.
pub fn edition_has_spellcasting(catalog: &RulesCatalog, state: &BuildState) -> bool {
    let Some(edition_id) = state.edition.as_ref() else {
        return true;
    };
    let Some(edition) = catalog.edition(edition_id) else {
        return false;
    };
    edition.classes.iter().any(|class| {
        class_progression(catalog, class, edition_id)
            .is_some_and(|progression| progression.spellcasting.is_some())
    })
}

fn edition_has_settings(catalog: &RulesCatalog, state: &BuildState) -> bool {
    state
        .edition
        .as_ref()
        .and_then(|id| catalog.edition(id))
        .map_or(true, |edition| !edition.settings.is_empty())
}

/// Steps the wizard walks, in order.
///
/// An edit session sees only the step being edited. Otherwise steps are
/// dropped when they do not apply (settings, spells, player-only steps) or
/// when the caller filled every field they edit. Confirmation always stays.
pub fn step_list(
    catalog: &RulesCatalog,
    state: &BuildState,
    prefilled: &[BuildField],
) -> Vec<StepId> {
    if let Some(edit) = state.edit_mode.as_ref() {
        return vec![edit.step];
    }
    StepId::all()
        .into_iter()
        .filter(|step| match step {
            StepId::Confirmation => true,
            StepId::Setting if !edition_has_settings(catalog, state) => false,
            StepId::Spells if !edition_has_spellcasting(catalog, state) => false,
            StepId::Proficiencies | StepId::Equipment
                if state.character_type == CharacterType::NonPlayer =>
            {
                false
            }
            _ => !step.fields().iter().all(|field| prefilled.contains(field)),
        })
        .collect()
}
