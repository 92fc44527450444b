//! Roll outcomes and their display formats.

use serde::{Deserialize, Serialize};

use super::DiceFormula;

/// The die whose natural extremes count as critical results.
pub const CRITICAL_DIE: u32 = 20;

/// How a single d20 is rolled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RollMode {
    /// One draw.
    #[default]
    Normal,
    /// Two draws, keep the higher.
    Advantage,
    /// Two draws, keep the lower.
    Disadvantage,
}

/// The outcome of rolling one formula.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollResult {
    /// The formula as rolled, e.g. `1d20+5`.
    pub formula: String,
    /// Kept die values.
    pub rolls: Vec<u32>,
    /// The discarded draw of an advantage or disadvantage roll.
    pub dropped_rolls: Option<Vec<u32>>,
    /// Flat modifier included in `total`.
    pub modifier: i32,
    /// Sum of `rolls` plus `modifier`.
    pub total: i64,
    /// A kept d20 shows 20.
    pub is_natural_max: bool,
    /// Every kept d20 shows 1.
    pub is_natural_min: bool,
}

impl RollResult {
    /// Builds a result from kept rolls, computing the total and critical flags.
    #[must_use]
    pub fn new(formula: &DiceFormula, rolls: Vec<u32>, dropped_rolls: Option<Vec<u32>>) -> Self {
        let critical_die = formula.sides == CRITICAL_DIE;
        let is_natural_max = critical_die && rolls.contains(&CRITICAL_DIE);
        let is_natural_min = critical_die && !rolls.is_empty() && rolls.iter().all(|&r| r == 1);
        let total = dice_sum(&rolls) + i64::from(formula.modifier);
        Self {
            formula: formula.to_string(),
            rolls,
            dropped_rolls,
            modifier: formula.modifier,
            total,
            is_natural_max,
            is_natural_min,
        }
    }

    /// Sum of the kept dice, without the modifier.
    #[must_use]
    pub fn dice_total(&self) -> i64 {
        dice_sum(&self.rolls)
    }
}

fn dice_sum(rolls: &[u32]) -> i64 {
    rolls.iter().map(|&r| i64::from(r)).sum()
}

pub(super) fn join(values: &[u32]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" + ")
}

impl std::fmt::Display for RollResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_natural_min {
            write!(f, "Critical Fail! ")?;
        } else if self.is_natural_max {
            write!(f, "Critical! ")?;
        }
        write!(f, "{}: [{}]", self.formula, join(&self.rolls))?;
        if let Some(dropped) = self.dropped_rolls.as_deref().filter(|d| !d.is_empty()) {
            write!(f, " (dropped: {})", join(dropped))?;
        }
        if self.modifier != 0 {
            write!(f, " {:+}", self.modifier)?;
        }
        write!(f, " = {}", self.total)
    }
}

/// An attack check with its damage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackRoll {
    /// The d20 attack check.
    pub attack: RollResult,
    /// Damage dealt; on a critical hit it includes the second damage roll.
    pub damage: RollResult,
    /// The second, independent damage roll of a critical hit.
    pub crit_damage: Option<RollResult>,
}

impl AttackRoll {
    /// Returns true if the attack was a critical hit.
    #[must_use]
    pub fn is_critical(&self) -> bool {
        self.crit_damage.is_some()
    }
}

/// Independent rolls of several formulas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiRoll {
    /// One result per formula, in request order.
    pub results: Vec<RollResult>,
    /// Sum of every result's total.
    pub grand_total: i64,
}

/// A quick roll of a dice string, as shown on action cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceStringRoll {
    /// The dice string as given.
    pub dice: String,
    /// Individual die values.
    pub rolls: Vec<u32>,
    /// Flat modifier.
    pub modifier: i32,
    /// Sum of the dice, without the modifier.
    pub total: i64,
    /// Sum of the dice plus the modifier.
    pub result: i64,
}

impl std::fmt::Display for DiceStringRoll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let [single] = self.rolls.as_slice() {
            if self.modifier == 0 {
                return write!(f, "{}", self.result);
            }
            return write!(f, "{single}{:+} = {}", self.modifier, self.result);
        }

        write!(f, "{}", join(&self.rolls))?;
        if self.modifier != 0 {
            write!(f, "{:+}", self.modifier)?;
        }
        write!(f, " = {}", self.result)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn formula(text: &str) -> DiceFormula {
        text.parse().unwrap()
    }

    #[test]
    fn totals_include_modifier() {
        let r = RollResult::new(&formula("2d6-1"), vec![3, 5], None);
        assert_eq!(r.total, 7);
        assert_eq!(r.dice_total(), 8);
        assert_eq!(r.formula, "2d6-1");
    }

    #[test]
    fn natural_flags_only_apply_to_d20() {
        let crit = RollResult::new(&formula("1d20"), vec![20], None);
        assert!(crit.is_natural_max);
        assert!(!crit.is_natural_min);

        let fumble = RollResult::new(&formula("1d20+3"), vec![1], None);
        assert!(fumble.is_natural_min);
        assert!(!fumble.is_natural_max);

        let d6 = RollResult::new(&formula("1d6"), vec![6], None);
        assert!(!d6.is_natural_max);
        let d6_low = RollResult::new(&formula("1d6"), vec![1], None);
        assert!(!d6_low.is_natural_min);
    }

    #[test]
    fn natural_min_needs_every_die_at_one() {
        let r = RollResult::new(&formula("2d20"), vec![1, 7], None);
        assert!(!r.is_natural_min);
    }

    #[test]
    fn display_marks_critical_results() {
        let crit = RollResult::new(&formula("1d20+5"), vec![20], None);
        assert_eq!(crit.to_string(), "Critical! 1d20+5: [20] +5 = 25");

        let fumble = RollResult::new(&formula("1d20-2"), vec![1], Some(vec![14]));
        assert_eq!(fumble.to_string(), "Critical Fail! 1d20-2: [1] (dropped: 14) -2 = -1");
    }

    #[test]
    fn display_without_modifier() {
        let r = RollResult::new(&formula("3d6"), vec![2, 4, 6], None);
        assert_eq!(r.to_string(), "3d6: [2 + 4 + 6] = 12");
    }

    #[test]
    fn dice_string_formats() {
        let single = |rolls: Vec<u32>, modifier: i32| {
            let total: i64 = rolls.iter().map(|&r| i64::from(r)).sum();
            DiceStringRoll {
                dice: String::new(),
                rolls,
                modifier,
                total,
                result: total + i64::from(modifier),
            }
        };
        assert_eq!(single(vec![1], 3).to_string(), "1+3 = 4");
        assert_eq!(single(vec![5], 0).to_string(), "5");
        assert_eq!(single(vec![4], -1).to_string(), "4-1 = 3");
        assert_eq!(single(vec![2, 5], 0).to_string(), "2 + 5 = 7");
        assert_eq!(single(vec![2, 5], 2).to_string(), "2 + 5+2 = 9");
    }

    #[test]
    fn results_serialize_as_plain_data() {
        let r = RollResult::new(&formula("1d20"), vec![15], Some(vec![5]));
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["rolls"], serde_json::json!([15]));
        assert_eq!(json["dropped_rolls"], serde_json::json!([5]));
        let back: RollResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn mode_defaults_to_normal() {
        assert_eq!(RollMode::default(), RollMode::Normal);
    }
}
