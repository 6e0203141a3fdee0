use thiserror::Error;

use super::types::{MAX_BATCH_SIZE, MAX_HISTOGRAM_BINS, MAX_ITERATIONS, Parameter};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    #[error(
        "invalid range for {parameter}: lower bound {lower} must be below upper bound {upper}"
    )]
    InvalidRange {
        parameter: Parameter,
        lower: f64,
        upper: f64,
    },

    #[error("batch size must be between 1 and {}", MAX_BATCH_SIZE)]
    InvalidBatchSize,

    #[error("iteration count must be between 1 and {}", MAX_ITERATIONS)]
    InvalidIterations,

    #[error("histogram bin count must be between 1 and {}", MAX_HISTOGRAM_BINS)]
    InvalidBins,

    #[error("oil formation factor is zero; reserve is undefined")]
    ZeroFormationFactor,

    #[error("cannot draw from an empty {0} pool")]
    EmptyPool(Parameter),

    #[error("cannot summarise an empty reserve sequence")]
    EmptySequence,

    #[error("normal distribution for {parameter} rejected: {message}")]
    Distribution { parameter: Parameter, message: String },
}
