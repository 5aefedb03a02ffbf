//! Prepared-spell count formulas ("int+level", "wis+level/2", "3").
//!
//! The formula is evaluated against an injected [`StatSource`]; the builder
//! itself never owns ability scores.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::value_objects::Ability;

/// Ability modifier lookup supplied by whoever owns the character's stats.
pub trait StatSource {
    fn ability_modifier(&self, ability: Ability) -> i32;
}

impl<F> StatSource for F
where
    F: Fn(Ability) -> i32,
{
    fn ability_modifier(&self, ability: Ability) -> i32 {
        self(ability)
    }
}

impl StatSource for BTreeMap<Ability, i32> {
    fn ability_modifier(&self, ability: Ability) -> i32 {
        self.get(&ability).copied().unwrap_or(0)
    }
}

impl StatSource for HashMap<Ability, i32> {
    fn ability_modifier(&self, ability: Ability) -> i32 {
        self.get(&ability).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    #[error("Empty formula")]
    Empty,
    #[error("Unknown operand '{0}'")]
    UnknownOperand(String),
    #[error("Invalid divisor '{0}'")]
    InvalidDivisor(String),
    #[error("Missing operand in '{0}'")]
    MissingOperand(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operand {
    Constant(i32),
    Level,
    Modifier(Ability),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Term {
    negative: bool,
    operand: Operand,
    divisor: i32,
}

/// A parsed sum of terms, each optionally divided (rounded down).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedSpellFormula {
    source: String,
    terms: Vec<Term>,
}

impl PreparedSpellFormula {
    pub fn parse(input: &str) -> Result<Self, FormulaError> {
        let compact: String = input
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        if compact.is_empty() {
            return Err(FormulaError::Empty);
        }

        let mut terms = Vec::new();
        let mut negative = false;
        let mut current = String::new();
        for c in compact.chars() {
            match c {
                '+' | '-' => {
                    if current.is_empty() {
                        return Err(FormulaError::MissingOperand(compact.clone()));
                    }
                    terms.push(parse_term(&current, negative)?);
                    current.clear();
                    negative = c == '-';
                }
                other => current.push(other),
            }
        }
        if current.is_empty() {
            return Err(FormulaError::MissingOperand(compact.clone()));
        }
        terms.push(parse_term(&current, negative)?);

        Ok(Self {
            source: compact,
            terms,
        })
    }

    /// Number of spells that may be prepared; never less than 1.
    pub fn evaluate(&self, level: u8, stats: &dyn StatSource) -> u32 {
        let total: i32 = self
            .terms
            .iter()
            .map(|term| {
                let value = match term.operand {
                    Operand::Constant(n) => n,
                    Operand::Level => i32::from(level),
                    Operand::Modifier(ability) => stats.ability_modifier(ability),
                };
                let value = value.div_euclid(term.divisor);
                if term.negative {
                    -value
                } else {
                    value
                }
            })
            .sum();
        u32::try_from(total.max(1)).unwrap_or(1)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

fn parse_term(raw: &str, negative: bool) -> Result<Term, FormulaError> {
    let (operand_str, divisor) = match raw.split_once('/') {
        Some((operand, divisor)) => {
            let divisor: i32 = divisor
                .parse()
                .map_err(|_| FormulaError::InvalidDivisor(divisor.to_string()))?;
            if divisor <= 0 {
                return Err(FormulaError::InvalidDivisor(divisor.to_string()));
            }
            (operand, divisor)
        }
        None => (raw, 1),
    };

    let operand = if operand_str == "level" || operand_str == "lvl" {
        Operand::Level
    } else if let Ok(n) = operand_str.parse::<i32>() {
        Operand::Constant(n)
    } else {
        Ability::from_str(operand_str)
            .map(Operand::Modifier)
            .map_err(|_| FormulaError::UnknownOperand(operand_str.to_string()))?
    };

    Ok(Term {
        negative,
        operand,
        divisor,
    })
}

impl fmt::Display for PreparedSpellFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for PreparedSpellFormula {
    type Err = FormulaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(int: i32, wis: i32, cha: i32) -> BTreeMap<Ability, i32> {
        BTreeMap::from([(Ability::Int, int), (Ability::Wis, wis), (Ability::Cha, cha)])
    }

    #[test]
    fn ability_plus_level() {
        let formula = PreparedSpellFormula::parse("int+level").expect("formula");
        assert_eq!(formula.evaluate(5, &stats(3, 0, 0)), 8);
    }

    #[test]
    fn halved_level_rounds_down() {
        let formula = PreparedSpellFormula::parse("cha + level/2").expect("formula");
        assert_eq!(formula.evaluate(5, &stats(0, 0, 2)), 4);
    }

    #[test]
    fn result_is_at_least_one() {
        let formula = PreparedSpellFormula::parse("wis+level").expect("formula");
        assert_eq!(formula.evaluate(1, &stats(0, -4, 0)), 1);
    }

    #[test]
    fn constants_and_subtraction() {
        let formula = PreparedSpellFormula::parse("3+level-1").expect("formula");
        assert_eq!(formula.evaluate(4, &stats(0, 0, 0)), 6);
    }

    #[test]
    fn closures_are_stat_sources() {
        let formula = PreparedSpellFormula::parse("int").expect("formula");
        let source = |ability: Ability| if ability == Ability::Int { 4 } else { 0 };
        assert_eq!(formula.evaluate(1, &source), 4);
    }

    #[test]
    fn malformed_formulas_are_rejected() {
        assert_eq!(PreparedSpellFormula::parse(" "), Err(FormulaError::Empty));
        assert!(matches!(
            PreparedSpellFormula::parse("luck+level"),
            Err(FormulaError::UnknownOperand(_))
        ));
        assert!(matches!(
            PreparedSpellFormula::parse("level/0"),
            Err(FormulaError::InvalidDivisor(_))
        ));
        assert!(matches!(
            PreparedSpellFormula::parse("int+"),
            Err(FormulaError::MissingOperand(_))
        ));
    }
}
