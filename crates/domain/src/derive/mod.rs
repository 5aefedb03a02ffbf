//! Derivation helpers: pure projections of catalog data onto current choices.
//!
//! Nothing here mutates state. Catalog gaps (an unknown edition, a class
//! with no data for an edition) degrade to empty lists or zero limits.

mod formula;
mod options;
mod progression;
mod spell_limits;

pub use formula::{FormulaError, PreparedSpellFormula, StatSource};
pub use options::{
    alignment_options, allowed_classes, allowed_races, class_eligible, class_progression,
    class_requirement, is_class_allowed, is_race_allowed,
};
pub use progression::{
    level_for_xp, magic_item_budget, prepared_spell_count, proficiency_bonus, starting_wealth,
    wealth_budget,
};
pub use spell_limits::{combined_spell_limits, progression_limits, spell_limits, SpellLimits};
