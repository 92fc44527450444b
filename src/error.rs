use thiserror::Error;

/// Top-level error type for the polydice crate.
#[derive(Debug, Error)]
pub enum DiceError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Roll(#[from] RollError),
}

/// Errors related to die geometry construction.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("unsupported die type: d{0}")]
    UnsupportedDieType(u32),

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,
}

/// Errors related to the die model registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("die model not found: {0}")]
    ModelNotFound(String),
}

/// Errors related to roll resolution.
#[derive(Debug, Error)]
pub enum RollError {
    #[error("invalid dice formula: {0}")]
    InvalidFormula(String),

    #[error("invalid roll modifier: {0}")]
    InvalidModifier(String),
}

/// Convenience type alias for results using [`DiceError`].
pub type Result<T> = std::result::Result<T, DiceError>;
