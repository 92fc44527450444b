//! Dice roll resolution.
//!
//! Formulas such as `2d6+3` are parsed into [`DiceFormula`] values and rolled
//! by a [`RollEngine`] against any [`RandomSource`]. Results are plain data
//! with `Display` renderings for logs and chat.

mod engine;
mod extended;
mod formula;
mod result;
mod source;

pub use engine::RollEngine;
pub use extended::{ExtendedRoll, Reroll, RollDetail, RollLimits};
pub use formula::{parse_formula, validate_formula, DiceFormula, MAX_DICE};
pub use result::{AttackRoll, DiceStringRoll, MultiRoll, RollMode, RollResult, CRITICAL_DIE};
pub use source::{draw_die, unit_for_face, RandomSource, RngSource, ScriptedSource};
