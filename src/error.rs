// src/error.rs

use thiserror::Error;

/// A parameter set that cannot feed the model builder.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("missing entry {key} in table '{table}'")]
    MissingEntry { table: &'static str, key: String },

    #[error("negative value {value} at {key} in table '{table}'")]
    NegativeValue {
        table: &'static str,
        key: String,
        value: f64,
    },

    #[error("non-finite value at {key} in table '{table}'")]
    NonFiniteValue { table: &'static str, key: String },

    #[error("periods must be contiguous starting at 1, got {0:?}")]
    NonContiguousPeriods(Vec<u32>),

    #[error("a fixed production schedule is required in fixed production mode")]
    MissingProductionSchedule,

    #[error("invalid demand distribution: {0}")]
    InvalidDistribution(String),
}

/// Invalid catalog, period or bound shape detected while building the model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelConstructionError {
    #[error("catalog '{0}' is empty")]
    EmptyCatalog(&'static str),

    #[error("periods must be contiguous starting at 1, got {0:?}")]
    NonContiguousPeriods(Vec<u32>),

    #[error("replenishment cap must be non-negative, got {0}")]
    NegativeReplenishmentCap(i64),

    #[error("parameter '{table}' has no entry for {key}")]
    MissingParameter { table: &'static str, key: String },
}

/// The assignment does not belong to the model it is being read against.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    #[error("assignment holds {actual} values but the model declares {expected} variables")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("emission factor '{table}' has no entry for {key}")]
    MissingFactor { table: &'static str, key: String },
}

/// Anything that ends a planning run.
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("model construction error: {0}")]
    ModelConstruction(#[from] ModelConstructionError),

    #[error("solver failure: {0}")]
    Solver(#[from] crate::solver::traits::SolverFailure),

    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),
}
