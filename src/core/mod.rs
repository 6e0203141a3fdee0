mod engine;
mod error;
mod formula;
mod sampler;
mod summary;
mod types;

pub use engine::{DRAW_ORDER, DrawSource, PoolDraws, run_model, simulate_reserves};
pub use error::SimulationError;
pub use formula::{BARRELS_PER_ACRE_FOOT, stoiip, stoiip_base};
pub use sampler::{ParameterPools, build_pools, draw};
pub use summary::{
    DistributionSummary, Ecdf, Histogram, HistogramBin, PercentileMarkers, ReserveClasses,
    summarize,
};
pub use types::{
    DEFAULT_BATCH_SIZE, DEFAULT_HISTOGRAM_BINS, DEFAULT_ITERATIONS, DEFAULT_SEED, Inputs,
    MAX_BATCH_SIZE, MAX_HISTOGRAM_BINS, MAX_ITERATIONS, ModelResult, Parameter, ParameterRange,
    ParameterRanges,
};
