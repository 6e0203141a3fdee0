use std::fmt;

use serde::Serialize;

use super::error::SimulationError;
use super::summary::DistributionSummary;

pub const DEFAULT_BATCH_SIZE: usize = 500;
pub const DEFAULT_ITERATIONS: usize = 4000;
pub const DEFAULT_HISTOGRAM_BINS: usize = 15;
pub const DEFAULT_SEED: u64 = 42;

pub const MAX_ITERATIONS: usize = 10_000_000;
pub const MAX_BATCH_SIZE: usize = 10_000_000;
pub const MAX_HISTOGRAM_BINS: usize = 10_000;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    Grv,
    Phi,
    SOil,
    BOil,
    Ntg,
}

impl Parameter {
    // Pool generation order; changing it changes every seeded run.
    pub const ALL: [Parameter; 5] = [
        Parameter::Phi,
        Parameter::SOil,
        Parameter::BOil,
        Parameter::Grv,
        Parameter::Ntg,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Parameter::Grv => "grv",
            Parameter::Phi => "phi",
            Parameter::SOil => "s_oil",
            Parameter::BOil => "b_oil",
            Parameter::Ntg => "ntg",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Parameter::Grv => "gross rock volume",
            Parameter::Phi => "porosity",
            Parameter::SOil => "oil saturation",
            Parameter::BOil => "oil formation factor",
            Parameter::Ntg => "net-to-gross",
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct ParameterRange {
    pub lower: f64,
    pub upper: f64,
}

impl ParameterRange {
    pub const fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    pub fn mean(self) -> f64 {
        (self.lower + self.upper) / 2.0
    }

    pub fn std_dev(self) -> f64 {
        (self.mean() - self.lower) / 4.0
    }

    pub fn width(self) -> f64 {
        self.upper - self.lower
    }

    fn validate(self, parameter: Parameter) -> Result<(), SimulationError> {
        if !self.lower.is_finite() || !self.upper.is_finite() || self.lower >= self.upper {
            return Err(SimulationError::InvalidRange {
                parameter,
                lower: self.lower,
                upper: self.upper,
            });
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct ParameterRanges {
    pub grv: ParameterRange,
    pub phi: ParameterRange,
    pub s_oil: ParameterRange,
    pub b_oil: ParameterRange,
    pub ntg: ParameterRange,
}

impl Default for ParameterRanges {
    fn default() -> Self {
        Self {
            grv: ParameterRange::new(114_000_000.0, 189_750_000.0),
            phi: ParameterRange::new(0.1, 0.5),
            s_oil: ParameterRange::new(0.6, 0.9),
            b_oil: ParameterRange::new(1.1, 1.8),
            ntg: ParameterRange::new(0.72, 0.94),
        }
    }
}

impl ParameterRanges {
    pub fn get(&self, parameter: Parameter) -> ParameterRange {
        match parameter {
            Parameter::Grv => self.grv,
            Parameter::Phi => self.phi,
            Parameter::SOil => self.s_oil,
            Parameter::BOil => self.b_oil,
            Parameter::Ntg => self.ntg,
        }
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        for parameter in Parameter::ALL {
            self.get(parameter).validate(parameter)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Inputs {
    pub ranges: ParameterRanges,
    pub batch_size: usize,
    pub iterations: usize,
    pub seed: u64,
    pub histogram_bins: usize,
}

impl Default for Inputs {
    fn default() -> Self {
        Self {
            ranges: ParameterRanges::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            iterations: DEFAULT_ITERATIONS,
            seed: DEFAULT_SEED,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
        }
    }
}

impl Inputs {
    pub fn validate(&self) -> Result<(), SimulationError> {
        self.ranges.validate()?;
        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(SimulationError::InvalidBatchSize);
        }
        if self.iterations == 0 || self.iterations > MAX_ITERATIONS {
            return Err(SimulationError::InvalidIterations);
        }
        if self.histogram_bins == 0 || self.histogram_bins > MAX_HISTOGRAM_BINS {
            return Err(SimulationError::InvalidBins);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelResult {
    pub reserves: Vec<f64>,
    pub summary: DistributionSummary,
}
