//! Spell slot and known-spell limits for a class level.

use serde::Serialize;

use crate::catalog::{RulesCatalog, SpellProgression, SpellcastingKind};
use crate::ids::{ClassId, EditionId};

/// What a class (or a combination of classes) may hold at a level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellLimits {
    pub cantrips: u32,
    /// Slot counts indexed by `spell_level - 1`
    pub slots_by_level: Vec<u32>,
    pub max_spell_level: u8,
    /// Overall known-spell count for known casters; 0 for prepared casters
    pub total_known: u32,
    pub known_caster: bool,
    pub prepared_caster: bool,
}

impl SpellLimits {
    pub fn none() -> Self {
        Self::default()
    }

    /// Slots for a spell level (1-based); 0 outside the table.
    pub fn slots_at(&self, spell_level: u8) -> u32 {
        match spell_level {
            0 => 0,
            level => self
                .slots_by_level
                .get(usize::from(level) - 1)
                .copied()
                .unwrap_or(0),
        }
    }

    /// Per-level cap: cantrips at level 0, slots above.
    pub fn cap_at(&self, spell_level: u8) -> u32 {
        if spell_level == 0 {
            self.cantrips
        } else {
            self.slots_at(spell_level)
        }
    }

    pub fn is_caster(&self) -> bool {
        self.known_caster || self.prepared_caster
    }

    /// Overall cap on kept spells, present only when every casting class is
    /// a known caster. Prepared casters choose from their whole list.
    pub fn known_cap(&self) -> Option<u32> {
        (self.known_caster && !self.prepared_caster).then_some(self.total_known)
    }

    fn merge(&mut self, other: &SpellLimits) {
        self.cantrips += other.cantrips;
        if self.slots_by_level.len() < other.slots_by_level.len() {
            self.slots_by_level.resize(other.slots_by_level.len(), 0);
        }
        for (mine, theirs) in self.slots_by_level.iter_mut().zip(&other.slots_by_level) {
            *mine += theirs;
        }
        self.max_spell_level = self.max_spell_level.max(other.max_spell_level);
        self.total_known += other.total_known;
        self.known_caster |= other.known_caster;
        self.prepared_caster |= other.prepared_caster;
    }
}

/// Limits for one spell progression at a class level.
///
/// Levels past the last authored row clamp to that row; an empty table yields
/// zero limits.
pub fn progression_limits(progression: &SpellProgression, level: u8) -> SpellLimits {
    if level == 0 {
        return SpellLimits::none();
    }
    let index = usize::from(level) - 1;
    let row_at = |len: usize| (len > 0).then(|| index.min(len - 1));

    let cantrips = row_at(progression.cantrips_known.len())
        .map_or(0, |row| progression.cantrips_known[row]);
    let mut slots_by_level = row_at(progression.slots.len())
        .map(|row| progression.slots[row].clone())
        .unwrap_or_default();
    let mut max_spell_level = slots_by_level
        .iter()
        .rposition(|&count| count > 0)
        .map_or(0, |i| u8::try_from(i + 1).unwrap_or(u8::MAX))
        .min(progression.max_spell_level);

    for grant in progression
        .mystic_arcanum
        .iter()
        .filter(|grant| grant.spell_level > 0 && grant.class_level <= level)
    {
        let slot = usize::from(grant.spell_level) - 1;
        if slots_by_level.len() <= slot {
            slots_by_level.resize(slot + 1, 0);
        }
        slots_by_level[slot] += 1;
        max_spell_level = max_spell_level.max(grant.spell_level);
    }

    let (total_known, known_caster, prepared_caster) = match &progression.kind {
        SpellcastingKind::Known { spells_known } => {
            let total = row_at(spells_known.rows()).map_or(0, |row| spells_known.total_at(row));
            (total, true, false)
        }
        SpellcastingKind::Prepared { .. } => (0, false, true),
    };

    SpellLimits {
        cantrips,
        slots_by_level,
        max_spell_level,
        total_known,
        known_caster,
        prepared_caster,
    }
}

/// Limits for a class at a class level in an edition.
pub fn spell_limits(
    catalog: &RulesCatalog,
    class: &ClassId,
    edition: &EditionId,
    level: u8,
) -> SpellLimits {
    catalog
        .class_edition_data(class, edition)
        .and_then(|data| data.progression.as_ref())
        .and_then(|progression| progression.spellcasting.as_ref())
        .map_or_else(SpellLimits::none, |spellcasting| {
            progression_limits(spellcasting, level)
        })
}

/// Limits summed over several classes (multiclass casters).
pub fn combined_spell_limits<'a>(
    catalog: &RulesCatalog,
    edition: &EditionId,
    classes: impl IntoIterator<Item = (&'a ClassId, u8)>,
) -> SpellLimits {
    classes
        .into_iter()
        .fold(SpellLimits::none(), |mut total, (class, level)| {
            total.merge(&spell_limits(catalog, class, edition, level));
            total
        })
}
