pub mod die;
pub mod error;
pub mod math;
pub mod operations;
pub mod roll;
pub mod tessellation;

pub use die::{DieKind, DieModel, DieRegistry};
pub use error::{DiceError, Result};
pub use roll::{parse_formula, DiceFormula, RollEngine, RollMode};
