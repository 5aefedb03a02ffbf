//! Starting-wealth formulas
//!
//! Classes carry their starting gold as a dice formula with an optional
//! multiplier: "5d4x10", "3d6x10", or "(1d4+1)x10". The builder never rolls;
//! it only needs the range and the expected value to suggest a budget.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error when parsing a wealth formula
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WealthFormulaError {
    #[error("Empty wealth formula")]
    Empty,
    /// Expected XdY, XdY+Z, or any of those followed by xM
    #[error("Invalid wealth format: {0}")]
    InvalidFormat(String),
    #[error("Dice count must be at least 1")]
    InvalidDiceCount,
    #[error("Die size must be at least 2")]
    InvalidDieSize,
}

/// A parsed formula like "(1d4+1)x10"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WealthFormula {
    pub dice_count: u8,
    pub die_size: u8,
    pub modifier: i32,
    pub multiplier: u32,
}

impl WealthFormula {
    pub fn parse(input: &str) -> Result<Self, WealthFormulaError> {
        let input = input.trim().to_lowercase().replace(' ', "");
        if input.is_empty() {
            return Err(WealthFormulaError::Empty);
        }

        // Split off "xM" / "*M" multiplier (the last 'x' or '*' outside the dice part)
        let (dice_part, multiplier) = match input.rfind(|c: char| c == 'x' || c == '*') {
            Some(pos) => {
                let mult_str = &input[pos + 1..];
                let multiplier: u32 = mult_str.parse().map_err(|_| {
                    WealthFormulaError::InvalidFormat(format!("Invalid multiplier: '{}'", mult_str))
                })?;
                (&input[..pos], multiplier)
            }
            None => (input.as_str(), 1),
        };

        let dice_part = dice_part
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .unwrap_or(dice_part);

        let d_pos = dice_part.find('d').ok_or_else(|| {
            WealthFormulaError::InvalidFormat(format!("Missing 'd' separator in '{}'", input))
        })?;

        let count_str = &dice_part[..d_pos];
        let dice_count: u8 = if count_str.is_empty() {
            1
        } else {
            count_str.parse().map_err(|_| {
                WealthFormulaError::InvalidFormat(format!("Invalid dice count: '{}'", count_str))
            })?
        };
        if dice_count == 0 {
            return Err(WealthFormulaError::InvalidDiceCount);
        }

        let after_d = &dice_part[d_pos + 1..];
        let (die_str, modifier) = if let Some(pos) = after_d.find('+') {
            let mod_str = &after_d[pos + 1..];
            let modifier: i32 = mod_str.parse().map_err(|_| {
                WealthFormulaError::InvalidFormat(format!("Invalid modifier: '+{}'", mod_str))
            })?;
            (&after_d[..pos], modifier)
        } else if let Some(pos) = after_d.find('-') {
            let mod_str = &after_d[pos + 1..];
            let modifier: i32 = mod_str.parse().map_err(|_| {
                WealthFormulaError::InvalidFormat(format!("Invalid modifier: '-{}'", mod_str))
            })?;
            (&after_d[..pos], -modifier)
        } else {
            (after_d, 0)
        };

        let die_size: u8 = die_str.parse().map_err(|_| {
            WealthFormulaError::InvalidFormat(format!("Invalid die size: '{}'", die_str))
        })?;
        if die_size < 2 {
            return Err(WealthFormulaError::InvalidDieSize);
        }

        Ok(Self {
            dice_count,
            die_size,
            modifier,
            multiplier,
        })
    }

    pub fn minimum(&self) -> u32 {
        self.scaled(i64::from(self.dice_count))
    }

    pub fn maximum(&self) -> u32 {
        self.scaled(i64::from(self.dice_count) * i64::from(self.die_size))
    }

    /// Expected value, rounded down.
    pub fn average(&self) -> u32 {
        let doubled = i64::from(self.dice_count) * (i64::from(self.die_size) + 1)
            + 2 * i64::from(self.modifier);
        let value = doubled * i64::from(self.multiplier) / 2;
        u32::try_from(value.max(0)).unwrap_or(u32::MAX)
    }

    fn scaled(&self, dice_total: i64) -> u32 {
        let value = (dice_total + i64::from(self.modifier)) * i64::from(self.multiplier);
        u32::try_from(value.max(0)).unwrap_or(u32::MAX)
    }
}

impl fmt::Display for WealthFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dice = match self.modifier {
            0 => format!("{}d{}", self.dice_count, self.die_size),
            m if m > 0 => format!("({}d{}+{})", self.dice_count, self.die_size, m),
            m => format!("({}d{}{})", self.dice_count, self.die_size, m),
        };
        if self.multiplier == 1 {
            write!(f, "{}", dice)
        } else {
            write!(f, "{}x{}", dice, self.multiplier)
        }
    }
}

impl std::str::FromStr for WealthFormula {
    type Err = WealthFormulaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
