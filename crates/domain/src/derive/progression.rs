//! Level-scaling lookups: proficiency bonus, XP, wealth and magic-item budgets.

use crate::catalog::{Edition, ExperienceTable, LevelTier, RulesCatalog, SpellcastingKind};
use crate::ids::{ClassId, EditionId};
use crate::value_objects::{WealthFormula, WealthFormulaError};

use super::formula::{FormulaError, PreparedSpellFormula, StatSource};
use super::options::class_progression;

/// Proficiency bonus at a character level; 0 for editions without the table.
pub fn proficiency_bonus(edition: &Edition, level: u8) -> i32 {
    if level == 0 || edition.proficiency_bonus.is_empty() {
        return 0;
    }
    let index = (usize::from(level) - 1).min(edition.proficiency_bonus.len() - 1);
    edition.proficiency_bonus[index]
}

/// Level reached with `xp` experience points.
///
/// Editions with a shared table use it; per-class editions read the class's
/// own table. `None` when there is no table to consult.
pub fn level_for_xp(
    catalog: &RulesCatalog,
    edition: &EditionId,
    class: Option<&ClassId>,
    xp: u32,
) -> Option<u8> {
    let edition_data = catalog.edition(edition)?;
    let thresholds: &[u32] = match &edition_data.experience {
        ExperienceTable::Shared { thresholds } => thresholds,
        ExperienceTable::PerClass => {
            &class_progression(catalog, class?, edition)?.experience
        }
        ExperienceTable::None => return None,
    };
    if thresholds.is_empty() {
        return None;
    }
    let reached = thresholds.iter().take_while(|&&needed| needed <= xp).count();
    let level = u8::try_from(reached.max(1)).unwrap_or(u8::MAX);
    Some(level.min(edition_data.max_level))
}

fn tier_gold(tiers: &[LevelTier], level: u8) -> Option<u32> {
    tiers.iter().find(|tier| tier.contains(level)).map(|tier| tier.gold)
}

/// Level-banded starting gold for characters created above first level.
pub fn wealth_budget(edition: &Edition, level: u8) -> Option<u32> {
    tier_gold(&edition.wealth_tiers, level)
}

pub fn magic_item_budget(edition: &Edition, level: u8) -> Option<u32> {
    tier_gold(&edition.magic_item_tiers, level)
}

/// The class's starting-wealth formula, if it has one in this edition.
pub fn starting_wealth(
    catalog: &RulesCatalog,
    class: &ClassId,
    edition: &EditionId,
) -> Result<Option<WealthFormula>, WealthFormulaError> {
    catalog
        .class_edition_data(class, edition)
        .and_then(|data| data.requirements.starting_wealth.as_deref())
        .map(WealthFormula::parse)
        .transpose()
}

/// Spells a prepared caster may prepare at `level`.
///
/// `Ok(None)` for known casters, non-casters, and prepared casters whose
/// edition gives no formula.
pub fn prepared_spell_count(
    catalog: &RulesCatalog,
    class: &ClassId,
    edition: &EditionId,
    level: u8,
    stats: &dyn StatSource,
) -> Result<Option<u32>, FormulaError> {
    let formula = class_progression(catalog, class, edition)
        .and_then(|progression| progression.spellcasting.as_ref())
        .and_then(|spellcasting| match &spellcasting.kind {
            SpellcastingKind::Prepared { formula } => formula.as_deref(),
            SpellcastingKind::Known { .. } => None,
        });
    match formula {
        Some(formula) => {
            let parsed = PreparedSpellFormula::parse(formula)?;
            Ok(Some(parsed.evaluate(level, stats)))
        }
        None => Ok(None),
    }
}
