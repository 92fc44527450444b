//! Keep, explode, reroll, minimum and pool mechanics.

use serde::{Deserialize, Serialize};

use crate::error::RollError;

use super::result::join;
use super::{DiceFormula, RandomSource, RollEngine, RollResult, CRITICAL_DIE};

/// Bounds on open-ended roll chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollLimits {
    /// Extra dice a single die may add by exploding.
    pub max_explosions: u32,
    /// Times a single die may be rerolled.
    pub max_rerolls: u32,
}

impl Default for RollLimits {
    fn default() -> Self {
        Self {
            max_explosions: 100,
            max_rerolls: 100,
        }
    }
}

/// One die that was rerolled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reroll {
    pub original: u32,
    pub rerolled: u32,
}

/// What an extended mechanic did to the dice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RollDetail {
    /// Dice discarded by keep-highest or keep-lowest.
    Kept { dropped: Vec<u32> },
    /// Extra dice drawn by exploding, compounding or penetrating dice, in
    /// draw order.
    Exploded { extra: Vec<u32> },
    /// Dice replaced by rerolls, one entry per affected die.
    Rerolled { rerolls: Vec<Reroll> },
    /// Dice raised to the minimum, as originally rolled.
    Raised { minimum: u32, raised: Vec<u32> },
    /// Rolls of each formula in a mixed pool.
    Pooled { groups: Vec<Vec<u32>> },
}

/// A roll together with what the mechanic changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedRoll {
    pub roll: RollResult,
    pub detail: RollDetail,
}

impl std::fmt::Display for ExtendedRoll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", join(&self.roll.rolls))?;
        match &self.detail {
            RollDetail::Kept { dropped } if !dropped.is_empty() => {
                write!(f, " (dropped: {})", join(dropped))?;
            }
            RollDetail::Exploded { extra } if !extra.is_empty() => {
                write!(f, " (exploded: {})", join(extra))?;
            }
            RollDetail::Rerolled { rerolls } if !rerolls.is_empty() => {
                let pairs: Vec<String> = rerolls
                    .iter()
                    .map(|r| format!("{}→{}", r.original, r.rerolled))
                    .collect();
                write!(f, " (rerolled: {})", pairs.join(", "))?;
            }
            RollDetail::Raised { minimum, raised } if !raised.is_empty() => {
                write!(f, " (raised to {minimum}: {})", join(raised))?;
            }
            _ => {}
        }
        if self.roll.modifier != 0 {
            write!(f, "{:+}", self.roll.modifier)?;
        }
        write!(f, " = {}", self.roll.total)
    }
}

#[derive(Clone, Copy)]
enum Keep {
    Highest,
    Lowest,
}

/// How an exploding die folds its extra draws into the result.
#[derive(Clone, Copy)]
enum Explode {
    /// Each extra draw is its own die.
    Append,
    /// Extra draws are added onto the die that exploded.
    Compound,
    /// Like `Compound`, but each extra draw counts one less.
    Penetrate,
}

impl<S: RandomSource> RollEngine<S> {
    /// Rolls every die and keeps the `keep` highest.
    ///
    /// # Errors
    ///
    /// Returns [`RollError::InvalidModifier`] unless `1 <= keep <= count`.
    pub fn roll_keep_highest(
        &mut self,
        formula: &DiceFormula,
        keep: u32,
    ) -> Result<ExtendedRoll, RollError> {
        self.roll_keep(formula, keep, Keep::Highest)
    }

    /// Rolls every die and keeps the `keep` lowest.
    ///
    /// # Errors
    ///
    /// Returns [`RollError::InvalidModifier`] unless `1 <= keep <= count`.
    pub fn roll_keep_lowest(
        &mut self,
        formula: &DiceFormula,
        keep: u32,
    ) -> Result<ExtendedRoll, RollError> {
        self.roll_keep(formula, keep, Keep::Lowest)
    }

    fn roll_keep(
        &mut self,
        formula: &DiceFormula,
        keep: u32,
        which: Keep,
    ) -> Result<ExtendedRoll, RollError> {
        if keep == 0 || keep > formula.count {
            return Err(RollError::InvalidModifier(format!(
                "cannot keep {keep} of {} dice",
                formula.count
            )));
        }

        let mut rolls = self.roll_dice(formula.count, formula.sides);
        match which {
            Keep::Highest => rolls.sort_unstable_by(|a, b| b.cmp(a)),
            Keep::Lowest => rolls.sort_unstable(),
        }
        let dropped = rolls.split_off(keep as usize);

        Ok(ExtendedRoll {
            roll: RollResult::new(formula, rolls, None),
            detail: RollDetail::Kept { dropped },
        })
    }

    /// Rolls with exploding dice: every die showing `explode_on` adds
    /// another die, which may explode in turn.
    ///
    /// Each die explodes at most [`RollLimits::max_explosions`] times.
    ///
    /// # Errors
    ///
    /// Returns [`RollError::InvalidModifier`] if `explode_on` is not a face
    /// of the die.
    pub fn roll_exploding(
        &mut self,
        formula: &DiceFormula,
        explode_on: u32,
    ) -> Result<ExtendedRoll, RollError> {
        self.roll_explode(formula, explode_on, Explode::Append)
    }

    /// Rolls with compounding dice: a die showing `compound_on` draws again
    /// and adds the draw onto itself, so each die stays a single value.
    ///
    /// # Errors
    ///
    /// Returns [`RollError::InvalidModifier`] if `compound_on` is not a face
    /// of the die.
    pub fn roll_compounding(
        &mut self,
        formula: &DiceFormula,
        compound_on: u32,
    ) -> Result<ExtendedRoll, RollError> {
        self.roll_explode(formula, compound_on, Explode::Compound)
    }

    /// Rolls with penetrating dice: like compounding, but every extra draw
    /// counts one less than it shows.
    ///
    /// # Errors
    ///
    /// Returns [`RollError::InvalidModifier`] if `penetrate_on` is not a face
    /// of the die.
    pub fn roll_penetrating(
        &mut self,
        formula: &DiceFormula,
        penetrate_on: u32,
    ) -> Result<ExtendedRoll, RollError> {
        self.roll_explode(formula, penetrate_on, Explode::Penetrate)
    }

    fn roll_explode(
        &mut self,
        formula: &DiceFormula,
        explode_on: u32,
        style: Explode,
    ) -> Result<ExtendedRoll, RollError> {
        if !(1..=formula.sides).contains(&explode_on) {
            return Err(RollError::InvalidModifier(format!(
                "d{} cannot explode on {explode_on}",
                formula.sides
            )));
        }

        let mut rolls = Vec::new();
        let mut extra = Vec::new();
        for _ in 0..formula.count {
            let mut value = self.roll_die(formula.sides);
            let mut die_total = value;
            rolls.push(value);
            let mut explosions = 0;
            while value == explode_on && explosions < self.limits.max_explosions {
                value = self.roll_die(formula.sides);
                extra.push(value);
                explosions += 1;
                match style {
                    Explode::Append => rolls.push(value),
                    Explode::Compound => die_total = die_total.saturating_add(value),
                    Explode::Penetrate => die_total = die_total.saturating_add(value - 1),
                }
            }
            if !matches!(style, Explode::Append) {
                if let Some(last) = rolls.last_mut() {
                    *last = die_total;
                }
            }
            if value == explode_on {
                tracing::debug!(
                    formula = %formula,
                    limit = self.limits.max_explosions,
                    "explosion chain hit its limit"
                );
            }
        }

        Ok(ExtendedRoll {
            roll: RollResult::new(formula, rolls, None),
            detail: RollDetail::Exploded { extra },
        })
    }

    /// Rolls, rerolling any die at or below `threshold` until it rises above.
    ///
    /// Each die is rerolled at most [`RollLimits::max_rerolls`] times; the
    /// last draw stands.
    ///
    /// # Errors
    ///
    /// Returns [`RollError::InvalidModifier`] if `threshold` would reroll
    /// every face.
    pub fn roll_with_reroll(
        &mut self,
        formula: &DiceFormula,
        threshold: u32,
    ) -> Result<ExtendedRoll, RollError> {
        if threshold >= formula.sides {
            return Err(RollError::InvalidModifier(format!(
                "rerolling at or below {threshold} rerolls every face of a d{}",
                formula.sides
            )));
        }

        let mut rolls = Vec::new();
        let mut rerolls = Vec::new();
        for _ in 0..formula.count {
            let original = self.roll_die(formula.sides);
            let mut value = original;
            let mut attempts = 0;
            while value <= threshold && attempts < self.limits.max_rerolls {
                value = self.roll_die(formula.sides);
                attempts += 1;
            }
            if attempts > 0 {
                rerolls.push(Reroll {
                    original,
                    rerolled: value,
                });
            }
            rolls.push(value);
        }

        Ok(ExtendedRoll {
            roll: RollResult::new(formula, rolls, None),
            detail: RollDetail::Rerolled { rerolls },
        })
    }

    /// Rolls, raising any die below `minimum` to `minimum`.
    ///
    /// # Errors
    ///
    /// Returns [`RollError::InvalidModifier`] if `minimum` exceeds the number
    /// of sides.
    pub fn roll_with_minimum(
        &mut self,
        formula: &DiceFormula,
        minimum: u32,
    ) -> Result<ExtendedRoll, RollError> {
        if minimum > formula.sides {
            return Err(RollError::InvalidModifier(format!(
                "minimum {minimum} is above the top face of a d{}",
                formula.sides
            )));
        }

        let mut raised = Vec::new();
        let rolls = self
            .roll_dice(formula.count, formula.sides)
            .into_iter()
            .map(|value| {
                if value < minimum {
                    raised.push(value);
                    minimum
                } else {
                    value
                }
            })
            .collect();

        Ok(ExtendedRoll {
            roll: RollResult::new(formula, rolls, None),
            detail: RollDetail::Raised { minimum, raised },
        })
    }

    /// Rolls a pool of mixed dice, e.g. `1d8 + 2d6`, as one result.
    ///
    /// Modifiers of the pooled formulas are summed. Critical flags apply only
    /// when every formula in the pool is a d20.
    ///
    /// # Errors
    ///
    /// Returns [`RollError::InvalidFormula`] for an empty pool and
    /// [`RollError::InvalidModifier`] if the summed modifier overflows.
    pub fn roll_pool(&mut self, pool: &[DiceFormula]) -> Result<ExtendedRoll, RollError> {
        if pool.is_empty() {
            return Err(RollError::InvalidFormula("empty dice pool".into()));
        }
        let modifier = pool
            .iter()
            .try_fold(0i32, |acc, f| acc.checked_add(f.modifier))
            .ok_or_else(|| RollError::InvalidModifier("pool modifier overflows".into()))?;

        let groups: Vec<Vec<u32>> = pool
            .iter()
            .map(|f| self.roll_dice(f.count, f.sides))
            .collect();
        let rolls: Vec<u32> = groups.iter().flatten().copied().collect();

        let all_d20 = pool.iter().all(|f| f.sides == CRITICAL_DIE);
        let dice_total: i64 = rolls.iter().map(|&r| i64::from(r)).sum();
        let roll = RollResult {
            formula: pool
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" + "),
            is_natural_max: all_d20 && rolls.contains(&CRITICAL_DIE),
            is_natural_min: all_d20 && rolls.iter().all(|&r| r == 1),
            total: dice_total + i64::from(modifier),
            rolls,
            dropped_rolls: None,
            modifier,
        };

        Ok(ExtendedRoll {
            roll,
            detail: RollDetail::Pooled { groups },
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::roll::{RngSource, ScriptedSource};

    fn engine(faces: &[(u32, u32)]) -> RollEngine<ScriptedSource> {
        RollEngine::new(ScriptedSource::faces(faces))
    }

    fn d6s(values: &[u32]) -> RollEngine<ScriptedSource> {
        let faces: Vec<(u32, u32)> = values.iter().map(|&v| (v, 6)).collect();
        engine(&faces)
    }

    fn formula(text: &str) -> DiceFormula {
        text.parse().unwrap()
    }

    #[test]
    fn keep_highest_drops_the_lowest_dice() {
        let mut engine = d6s(&[3, 6, 1, 4]);
        let r = engine.roll_keep_highest(&formula("4d6"), 3).unwrap();
        assert_eq!(r.roll.rolls, vec![6, 4, 3]);
        assert_eq!(r.roll.total, 13);
        assert!(r.roll.dropped_rolls.is_none());
        assert_eq!(r.detail, RollDetail::Kept { dropped: vec![1] });
    }

    #[test]
    fn keep_lowest_drops_the_highest_dice() {
        let mut engine = engine(&[(17, 20), (4, 20)]);
        let r = engine.roll_keep_lowest(&formula("2d20+1"), 1).unwrap();
        assert_eq!(r.roll.rolls, vec![4]);
        assert_eq!(r.roll.total, 5);
        assert_eq!(r.detail, RollDetail::Kept { dropped: vec![17] });
    }

    #[test]
    fn keeping_every_die_drops_nothing() {
        let mut engine = d6s(&[2, 5]);
        let r = engine.roll_keep_highest(&formula("2d6"), 2).unwrap();
        assert_eq!(r.roll.total, 7);
        assert_eq!(r.detail, RollDetail::Kept { dropped: vec![] });
    }

    #[test]
    fn keep_count_must_fit_the_dice() {
        let mut engine = d6s(&[1]);
        assert!(matches!(
            engine.roll_keep_highest(&formula("2d6"), 3),
            Err(RollError::InvalidModifier(_))
        ));
        assert!(engine.roll_keep_lowest(&formula("2d6"), 0).is_err());
    }

    #[test]
    fn dropped_rolls_stay_reserved_for_advantage() {
        let mut engine = RollEngine::new(RngSource::seeded(9));
        let f = formula("4d6+1");
        let results = [
            engine.roll_keep_highest(&f, 3).unwrap(),
            engine.roll_keep_lowest(&f, 1).unwrap(),
            engine.roll_exploding(&f, 6).unwrap(),
            engine.roll_compounding(&f, 6).unwrap(),
            engine.roll_penetrating(&f, 6).unwrap(),
            engine.roll_with_reroll(&f, 1).unwrap(),
            engine.roll_with_minimum(&f, 2).unwrap(),
            engine.roll_pool(&[f, formula("1d20")]).unwrap(),
        ];
        for r in results {
            assert!(r.roll.dropped_rolls.is_none(), "{r}");
        }
    }

    #[test]
    fn exploding_dice_chain() {
        let mut engine = d6s(&[6, 6, 2, 3]);
        let r = engine.roll_exploding(&formula("2d6"), 6).unwrap();
        assert_eq!(r.roll.rolls, vec![6, 6, 2, 3]);
        assert_eq!(r.roll.total, 17);
        assert_eq!(r.detail, RollDetail::Exploded { extra: vec![6, 2] });
    }

    #[test]
    fn explosions_stop_at_the_limit() {
        let mut engine = d6s(&[6]).with_limits(RollLimits {
            max_explosions: 3,
            ..RollLimits::default()
        });
        let r = engine.roll_exploding(&formula("1d6"), 6).unwrap();
        assert_eq!(r.roll.rolls, vec![6, 6, 6, 6]);
        assert_eq!(r.detail, RollDetail::Exploded { extra: vec![6, 6, 6] });
    }

    #[test]
    fn explode_target_must_be_a_face() {
        let mut engine = d6s(&[1]);
        assert!(engine.roll_exploding(&formula("1d6"), 7).is_err());
        assert!(engine.roll_exploding(&formula("1d6"), 0).is_err());
        assert!(engine.roll_compounding(&formula("1d6"), 7).is_err());
        assert!(engine.roll_penetrating(&formula("1d6"), 0).is_err());
    }

    #[test]
    fn compounding_folds_explosions_into_one_die() {
        let mut engine = d6s(&[6, 6, 2, 3]);
        let r = engine.roll_compounding(&formula("2d6"), 6).unwrap();
        assert_eq!(r.roll.rolls, vec![14, 3]);
        assert_eq!(r.roll.total, 17);
        assert_eq!(r.detail, RollDetail::Exploded { extra: vec![6, 2] });
    }

    #[test]
    fn compounding_stops_at_the_limit() {
        let mut engine = d6s(&[6]).with_limits(RollLimits {
            max_explosions: 3,
            ..RollLimits::default()
        });
        let r = engine.roll_compounding(&formula("1d6"), 6).unwrap();
        assert_eq!(r.roll.rolls, vec![24]);
    }

    #[test]
    fn penetrating_extra_draws_count_one_less() {
        let mut engine = d6s(&[6, 6, 2, 3]);
        let r = engine.roll_penetrating(&formula("2d6"), 6).unwrap();
        assert_eq!(r.roll.rolls, vec![12, 3]);
        assert_eq!(r.roll.total, 15);
        assert_eq!(r.detail, RollDetail::Exploded { extra: vec![6, 2] });
    }

    #[test]
    fn penetrating_stops_at_the_limit() {
        let mut engine = d6s(&[6]).with_limits(RollLimits {
            max_explosions: 2,
            ..RollLimits::default()
        });
        let r = engine.roll_penetrating(&formula("1d6"), 6).unwrap();
        assert_eq!(r.roll.rolls, vec![16]);
    }

    #[test]
    fn rerolls_replace_low_dice() {
        let mut engine = d6s(&[1, 2, 5, 4]);
        let r = engine.roll_with_reroll(&formula("2d6"), 2).unwrap();
        assert_eq!(r.roll.rolls, vec![5, 4]);
        assert_eq!(
            r.detail,
            RollDetail::Rerolled {
                rerolls: vec![Reroll {
                    original: 1,
                    rerolled: 5
                }]
            }
        );
    }

    #[test]
    fn rerolls_stop_at_the_limit() {
        let mut engine = d6s(&[1]).with_limits(RollLimits {
            max_rerolls: 2,
            ..RollLimits::default()
        });
        let r = engine.roll_with_reroll(&formula("1d6"), 1).unwrap();
        assert_eq!(r.roll.rolls, vec![1]);
        assert_eq!(engine.limits().max_rerolls, 2);
    }

    #[test]
    fn reroll_threshold_cannot_cover_every_face() {
        let mut engine = d6s(&[1]);
        assert!(matches!(
            engine.roll_with_reroll(&formula("1d6"), 6),
            Err(RollError::InvalidModifier(_))
        ));
        assert!(engine.roll_with_reroll(&formula("1d6"), 5).is_ok());
    }

    #[test]
    fn minimum_raises_low_dice() {
        let mut engine = d6s(&[1, 5, 2]);
        let r = engine.roll_with_minimum(&formula("3d6+1"), 3).unwrap();
        assert_eq!(r.roll.rolls, vec![3, 5, 3]);
        assert_eq!(r.roll.total, 12);
        assert_eq!(
            r.detail,
            RollDetail::Raised {
                minimum: 3,
                raised: vec![1, 2]
            }
        );
    }

    #[test]
    fn minimum_cannot_exceed_the_top_face() {
        let mut engine = d6s(&[1]);
        assert!(engine.roll_with_minimum(&formula("1d6"), 7).is_err());
        assert!(engine.roll_with_minimum(&formula("1d6"), 6).is_ok());
    }

    #[test]
    fn pool_rolls_each_formula_in_order() {
        let mut engine = engine(&[(3, 8), (2, 6), (5, 6)]);
        let r = engine
            .roll_pool(&[formula("1d8"), formula("2d6+1")])
            .unwrap();
        assert_eq!(r.roll.formula, "1d8 + 2d6+1");
        assert_eq!(r.roll.rolls, vec![3, 2, 5]);
        assert_eq!(r.roll.modifier, 1);
        assert_eq!(r.roll.total, 11);
        assert_eq!(
            r.detail,
            RollDetail::Pooled {
                groups: vec![vec![3], vec![2, 5]]
            }
        );
    }

    #[test]
    fn pool_of_d20s_can_be_critical() {
        let mut e = engine(&[(20, 20), (4, 20)]);
        let r = e.roll_pool(&[formula("1d20"), formula("1d20")]).unwrap();
        assert!(r.roll.is_natural_max);

        let mut e = engine(&[(20, 20), (4, 6)]);
        let r = e.roll_pool(&[formula("1d20"), formula("1d6")]).unwrap();
        assert!(!r.roll.is_natural_max);
    }

    #[test]
    fn pool_rejects_empty_and_overflowing_input() {
        let mut engine = d6s(&[1]);
        assert!(matches!(
            engine.roll_pool(&[]),
            Err(RollError::InvalidFormula(_))
        ));
        let big = DiceFormula::new(1, 6, i32::MAX).unwrap();
        assert!(matches!(
            engine.roll_pool(&[big, big]),
            Err(RollError::InvalidModifier(_))
        ));
    }

    #[test]
    fn display_annotates_each_mechanic() {
        let mut e = d6s(&[3, 6, 1, 4]);
        let r = e.roll_keep_highest(&formula("4d6"), 3).unwrap();
        assert_eq!(r.to_string(), "6 + 4 + 3 (dropped: 1) = 13");

        let mut e = d6s(&[6, 6, 2, 3]);
        let r = e.roll_exploding(&formula("2d6+1"), 6).unwrap();
        assert_eq!(r.to_string(), "6 + 6 + 2 + 3 (exploded: 6 + 2)+1 = 18");

        let mut e = d6s(&[1, 2, 5, 4]);
        let r = e.roll_with_reroll(&formula("2d6"), 2).unwrap();
        assert_eq!(r.to_string(), "5 + 4 (rerolled: 1→5) = 9");

        let mut e = d6s(&[1, 5, 2]);
        let r = e.roll_with_minimum(&formula("3d6+1"), 3).unwrap();
        assert_eq!(r.to_string(), "3 + 5 + 3 (raised to 3: 1 + 2)+1 = 12");

        let mut e = engine(&[(3, 8), (2, 6), (5, 6)]);
        let r = e.roll_pool(&[formula("1d8"), formula("2d6-1")]).unwrap();
        assert_eq!(r.to_string(), "3 + 2 + 5-1 = 9");
    }

    #[test]
    fn display_skips_empty_annotations() {
        let mut e = d6s(&[2, 5]);
        let r = e.roll_exploding(&formula("2d6"), 6).unwrap();
        assert_eq!(r.to_string(), "2 + 5 = 7");
    }

    #[test]
    fn seeded_reroll_results_stay_above_threshold() {
        let mut engine = RollEngine::new(RngSource::seeded(5));
        for _ in 0..100 {
            let r = engine.roll_with_reroll(&formula("4d8"), 3).unwrap();
            assert!(r.roll.rolls.iter().all(|&v| v > 3));
        }
    }

    #[test]
    fn extended_rolls_serialize() {
        let mut engine = d6s(&[6, 1]);
        let r = engine.roll_exploding(&formula("1d6"), 6).unwrap();
        let json = serde_json::to_string(&r).unwrap();
        let back: ExtendedRoll = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }
}
