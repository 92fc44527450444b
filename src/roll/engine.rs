use rand::rngs::StdRng;

use crate::error::Result;

use super::{
    draw_die, parse_formula, AttackRoll, DiceFormula, DiceStringRoll, MultiRoll, RandomSource,
    RngSource, RollLimits, RollMode, RollResult,
};

/// Resolves dice formulas against a random source.
///
/// The engine owns its source and nothing else, so independent engines never
/// share state. Every die consumes exactly one draw, in the order the dice
/// are rolled.
#[derive(Debug, Clone)]
pub struct RollEngine<S = RngSource<StdRng>> {
    pub(super) source: S,
    pub(super) limits: RollLimits,
}

impl RollEngine {
    /// An engine backed by a standard generator seeded from the OS.
    #[must_use]
    pub fn from_os_rng() -> Self {
        Self::new(RngSource::from_os_rng())
    }
}

impl Default for RollEngine {
    fn default() -> Self {
        Self::from_os_rng()
    }
}

impl<S: RandomSource> RollEngine<S> {
    /// Creates an engine drawing from `source`.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            limits: RollLimits::default(),
        }
    }

    /// Sets the bounds on explosion and reroll chains.
    #[must_use]
    pub fn with_limits(mut self, limits: RollLimits) -> Self {
        self.limits = limits;
        self
    }

    /// The current chain limits.
    #[must_use]
    pub fn limits(&self) -> RollLimits {
        self.limits
    }

    /// Gives the random source back.
    #[must_use]
    pub fn into_source(self) -> S {
        self.source
    }

    /// Rolls one die with `sides` faces.
    pub fn roll_die(&mut self, sides: u32) -> u32 {
        draw_die(&mut self.source, sides)
    }

    pub(super) fn roll_dice(&mut self, count: u32, sides: u32) -> Vec<u32> {
        (0..count).map(|_| self.roll_die(sides)).collect()
    }

    /// Rolls a parsed formula.
    ///
    /// Advantage and disadvantage only apply to a single d20: two dice are
    /// drawn, the higher (or lower) is kept and the other lands in
    /// `dropped_rolls`. Any other formula ignores `mode`.
    pub fn roll(&mut self, formula: &DiceFormula, mode: RollMode) -> RollResult {
        let single_d20 = formula.count == 1 && formula.sides == 20;
        let keep_higher = match mode {
            RollMode::Advantage if single_d20 => true,
            RollMode::Disadvantage if single_d20 => false,
            RollMode::Normal | RollMode::Advantage | RollMode::Disadvantage => {
                let rolls = self.roll_dice(formula.count, formula.sides);
                return RollResult::new(formula, rolls, None);
            }
        };

        let first = self.roll_die(formula.sides);
        let second = self.roll_die(formula.sides);
        let (kept, dropped) = if keep_higher {
            (first.max(second), first.min(second))
        } else {
            (first.min(second), first.max(second))
        };
        RollResult::new(formula, vec![kept], Some(vec![dropped]))
    }

    /// Parses and rolls formula text.
    ///
    /// # Errors
    ///
    /// Returns [`RollError::InvalidFormula`](crate::error::RollError::InvalidFormula)
    /// if the text does not parse. Nothing is drawn in that case.
    pub fn quick_roll(&mut self, text: &str, mode: RollMode) -> Result<RollResult> {
        let formula = parse_formula(text)?;
        Ok(self.roll(&formula, mode))
    }

    /// Rolls a d20 check with a flat modifier.
    pub fn roll_check(&mut self, modifier: i32, mode: RollMode) -> RollResult {
        self.roll(&DiceFormula::d20(modifier), mode)
    }

    /// Rolls an attack and its damage.
    ///
    /// On a natural 20 the damage formula is rolled a second time; the rolls
    /// are concatenated and both totals summed, so the modifier counts twice.
    /// Draws happen in the order attack, damage, critical damage.
    ///
    /// # Errors
    ///
    /// Returns [`RollError::InvalidFormula`](crate::error::RollError::InvalidFormula)
    /// if `damage` does not parse. The formula is checked before any draw.
    pub fn roll_attack(
        &mut self,
        attack_modifier: i32,
        damage: &str,
        mode: RollMode,
    ) -> Result<AttackRoll> {
        let damage_formula = parse_formula(damage)?;

        let attack = self.roll_check(attack_modifier, mode);
        let mut damage = self.roll(&damage_formula, RollMode::Normal);
        if !attack.is_natural_max {
            return Ok(AttackRoll {
                attack,
                damage,
                crit_damage: None,
            });
        }

        let crit = self.roll(&damage_formula, RollMode::Normal);
        damage.rolls.extend_from_slice(&crit.rolls);
        damage.total += crit.total;
        damage.is_natural_max |= crit.is_natural_max;
        damage.is_natural_min &= crit.is_natural_min;
        tracing::debug!(
            attack = attack.total,
            damage = damage.total,
            formula = %damage_formula,
            "critical hit"
        );

        Ok(AttackRoll {
            attack,
            damage,
            crit_damage: Some(crit),
        })
    }

    /// Rolls several formulas independently and sums their totals.
    ///
    /// # Errors
    ///
    /// Returns [`RollError::InvalidFormula`](crate::error::RollError::InvalidFormula)
    /// for the first formula that does not parse. All formulas are parsed
    /// before anything is drawn.
    pub fn roll_multiple<I, T>(&mut self, formulas: I) -> Result<MultiRoll>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let parsed = formulas
            .into_iter()
            .map(|text| parse_formula(text.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        let results: Vec<RollResult> = parsed
            .iter()
            .map(|formula| self.roll(formula, RollMode::Normal))
            .collect();
        let grand_total = results.iter().map(|r| r.total).sum();
        Ok(MultiRoll {
            results,
            grand_total,
        })
    }

    /// Rolls a dice string for display, e.g. `"1d20+3"` as `"1+3 = 4"`.
    ///
    /// # Errors
    ///
    /// Returns [`RollError::InvalidFormula`](crate::error::RollError::InvalidFormula)
    /// if the text does not parse.
    pub fn roll_dice_string(&mut self, text: &str) -> Result<DiceStringRoll> {
        let formula = parse_formula(text)?;
        let rolls = self.roll_dice(formula.count, formula.sides);
        let total: i64 = rolls.iter().map(|&r| i64::from(r)).sum();
        Ok(DiceStringRoll {
            dice: text.to_string(),
            rolls,
            modifier: formula.modifier,
            total,
            result: total + i64::from(formula.modifier),
        })
    }
}
