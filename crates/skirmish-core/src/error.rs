//! Errors raised while loading catalogs and validating ship layouts.

use thiserror::Error;

/// A ship layout that cannot become a ship.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("ship layout has no pieces")]
    Empty,
    #[error("ship layout has no core piece")]
    MissingCore,
    #[error("ship layout has {0} core pieces, expected exactly one")]
    MultipleCores(usize),
    #[error("unknown piece type `{0}`")]
    UnknownPiece(String),
}

/// A piece catalog that cannot be used.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("piece `{kind}` has invalid {field}: {value}")]
    InvalidValue {
        kind: String,
        field: &'static str,
        value: f32,
    },
    #[error("unknown ship preset `{0}`")]
    UnknownPreset(String),
}
