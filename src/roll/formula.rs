//! Dice formula parsing and formatting.
//!
//! The grammar is `[count]d<sides>[(+|-)modifier]`, e.g. `d20`, `2d6+3` or
//! `1d8-1`. The `d` may be upper case; surrounding whitespace is ignored.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RollError};

/// Largest number of dice a single formula may roll.
pub const MAX_DICE: u32 = 255;

/// A parsed roll request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiceFormula {
    /// Number of dice, at least 1.
    pub count: u32,
    /// Sides per die, at least 2.
    pub sides: u32,
    /// Flat modifier added to the dice total.
    pub modifier: i32,
}

impl DiceFormula {
    /// Creates a formula, checking the count and side bounds.
    ///
    /// # Errors
    ///
    /// Returns [`RollError::InvalidFormula`] if `count` is zero or above
    /// [`MAX_DICE`], or if `sides` is below two.
    pub fn new(count: u32, sides: u32, modifier: i32) -> std::result::Result<Self, RollError> {
        if count == 0 {
            return Err(RollError::InvalidFormula("dice count must be at least 1".into()));
        }
        if count > MAX_DICE {
            return Err(RollError::InvalidFormula(format!(
                "at most {MAX_DICE} dice per formula, got {count}"
            )));
        }
        if sides < 2 {
            return Err(RollError::InvalidFormula(format!(
                "a die needs at least 2 sides, got {sides}"
            )));
        }
        Ok(Self {
            count,
            sides,
            modifier,
        })
    }

    /// A single d20 with a modifier, as used for checks.
    #[must_use]
    pub fn d20(modifier: i32) -> Self {
        Self {
            count: 1,
            sides: 20,
            modifier,
        }
    }
}

impl FromStr for DiceFormula {
    type Err = RollError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || RollError::InvalidFormula(s.to_string());
        let text = s.trim();

        let (count, rest) = text.split_once(['d', 'D']).ok_or_else(invalid)?;
        let count = if count.is_empty() {
            1
        } else {
            parse_digits(count).ok_or_else(invalid)?
        };

        let (sides, modifier) = match rest.find(['+', '-']) {
            Some(pos) => {
                let (sides, modifier) = rest.split_at(pos);
                if !modifier[1..].bytes().all(|b| b.is_ascii_digit()) || modifier.len() < 2 {
                    return Err(invalid());
                }
                (sides, modifier.parse::<i32>().map_err(|_| invalid())?)
            }
            None => (rest, 0),
        };
        let sides = parse_digits(sides).ok_or_else(invalid)?;

        Self::new(count, sides, modifier)
    }
}

/// Parses a non-empty run of ASCII digits.
fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl std::fmt::Display for DiceFormula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        if self.modifier != 0 {
            write!(f, "{:+}", self.modifier)?;
        }
        Ok(())
    }
}

/// Parses dice formula text.
///
/// # Errors
///
/// Returns [`RollError::InvalidFormula`] if the text does not match the
/// grammar.
pub fn parse_formula(text: &str) -> Result<DiceFormula> {
    Ok(text.parse()?)
}

/// Returns true if `text` is a valid dice formula.
#[must_use]
pub fn validate_formula(text: &str) -> bool {
    text.parse::<DiceFormula>().is_ok()
}
