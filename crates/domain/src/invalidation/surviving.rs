//! The class list a state will have once every class rule has resolved.
//!
//! Spell, subclass and proficiency rules evaluate against this list rather
//! than the raw `classes`, so a report produced while several rules fire
//! together still matches what survives the fold.

use crate::build_state::{BuildState, ClassEntry};
use crate::derive::{class_requirement, is_class_allowed, is_race_allowed};
use crate::ids::{AlignmentId, ClassId, EditionId, RaceId};

use super::RuleContext;

/// Race that survives the edition/setting race rule.
pub(crate) fn effective_race<'s>(ctx: &RuleContext<'_>, state: &'s BuildState) -> Option<&'s RaceId> {
    let edition = state.edition.as_ref()?;
    state
        .race
        .as_ref()
        .filter(|race| is_race_allowed(ctx.catalog, edition, state.setting.as_ref(), race))
}

/// Alignment that survives the edition alignment rule.
pub(crate) fn effective_alignment<'s>(
    ctx: &RuleContext<'_>,
    state: &'s BuildState,
) -> Option<&'s AlignmentId> {
    let edition = ctx.catalog.edition(state.edition.as_ref()?)?;
    state
        .alignment
        .as_ref()
        .filter(|alignment| edition.has_alignment(alignment))
}

/// Which class eligibility check a class fails first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Ineligibility {
    /// Not on the edition/setting allow-list
    Edition,
    Race,
    Alignment,
}

pub(crate) fn ineligibility(
    ctx: &RuleContext<'_>,
    state: &BuildState,
    edition: &EditionId,
    class: &ClassId,
) -> Option<Ineligibility> {
    if !is_class_allowed(ctx.catalog, edition, state.setting.as_ref(), class) {
        return Some(Ineligibility::Edition);
    }
    let requirement = class_requirement(ctx.catalog, class, edition)?;
    if let Some(race) = effective_race(ctx, state) {
        if !requirement.allows_race(race) {
            return Some(Ineligibility::Race);
        }
    }
    if let Some(alignment) = effective_alignment(ctx, state) {
        if !requirement.allows_alignment(alignment) {
            return Some(Ineligibility::Alignment);
        }
    }
    None
}

/// Indexes of eligible class entries beyond the edition's multiclass limit.
pub(crate) fn over_class_limit(ctx: &RuleContext<'_>, state: &BuildState) -> Vec<usize> {
    let Some(edition_id) = state.edition.as_ref() else {
        return Vec::new();
    };
    let Some(edition) = ctx.catalog.edition(edition_id) else {
        return Vec::new();
    };
    let limit = edition.multiclassing.max_classes();
    state
        .classes
        .iter()
        .enumerate()
        .filter(|(_, entry)| match &entry.class_id {
            Some(class) => ineligibility(ctx, state, edition_id, class).is_none(),
            None => true,
        })
        .skip(limit)
        .map(|(index, _)| index)
        .collect()
}

/// Clamp class levels to a level budget, walking slots in order.
///
/// The primary slot keeps at least one level; other slots may reach zero.
pub(crate) fn clamp_levels(classes: &mut [ClassEntry], total_level: u8) {
    let mut remaining = total_level;
    for (index, entry) in classes.iter_mut().enumerate() {
        let min_for_slot = if index == 0 { 1 } else { 0 };
        entry.level = entry.level.min(remaining).max(min_for_slot);
        remaining = remaining.saturating_sub(entry.level);
    }
}

/// Keep the never-empty invariant: at least one entry, primary level >= 1.
pub(crate) fn ensure_primary(classes: &mut Vec<ClassEntry>) {
    if classes.is_empty() {
        classes.push(ClassEntry::placeholder());
    }
    if let Some(primary) = classes.first_mut() {
        primary.level = primary.level.max(1);
    }
}

/// Entries the class rules keep, before any level clamping.
pub(crate) fn eligible_classes(ctx: &RuleContext<'_>, state: &BuildState) -> Vec<ClassEntry> {
    let Some(edition) = state.edition.as_ref() else {
        return state.classes.clone();
    };
    let over_limit = over_class_limit(ctx, state);
    let mut classes: Vec<ClassEntry> = state
        .classes
        .iter()
        .enumerate()
        .filter(|(index, entry)| {
            !over_limit.contains(index)
                && entry
                    .class_id
                    .as_ref()
                    .map_or(true, |class| ineligibility(ctx, state, edition, class).is_none())
        })
        .map(|(_, entry)| entry.clone())
        .collect();
    ensure_primary(&mut classes);
    classes
}

/// Classes that survive eligibility, the multiclass limit and level clamping.
pub fn surviving_classes(ctx: &RuleContext<'_>, state: &BuildState) -> Vec<ClassEntry> {
    if state.edition.is_none() {
        return state.classes.clone();
    }
    let mut classes = eligible_classes(ctx, state);
    clamp_levels(&mut classes, state.total_level);
    let mut index = 0;
    classes.retain(|entry| {
        let keep = index == 0 || entry.level > 0;
        index += 1;
        keep
    });
    classes
}
