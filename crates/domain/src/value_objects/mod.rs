//! Value objects - Immutable objects defined by their attributes

mod ability;
mod names;
mod wealth_formula;

pub use ability::Ability;
pub use names::CharacterName;
pub use wealth_formula::{WealthFormula, WealthFormulaError};
