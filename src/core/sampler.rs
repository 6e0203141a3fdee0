use rand::Rng;
use rand::seq::SliceRandom;
use rand_distr::{Distribution, Normal};
use tracing::debug;

use super::error::SimulationError;
use super::types::{MAX_BATCH_SIZE, Parameter, ParameterRange, ParameterRanges};

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterPools {
    grv: Vec<f64>,
    phi: Vec<f64>,
    s_oil: Vec<f64>,
    b_oil: Vec<f64>,
    ntg: Vec<f64>,
}

impl ParameterPools {
    pub fn get(&self, parameter: Parameter) -> &[f64] {
        match parameter {
            Parameter::Grv => &self.grv,
            Parameter::Phi => &self.phi,
            Parameter::SOil => &self.s_oil,
            Parameter::BOil => &self.b_oil,
            Parameter::Ntg => &self.ntg,
        }
    }

    fn slot(&mut self, parameter: Parameter) -> &mut Vec<f64> {
        match parameter {
            Parameter::Grv => &mut self.grv,
            Parameter::Phi => &mut self.phi,
            Parameter::SOil => &mut self.s_oil,
            Parameter::BOil => &mut self.b_oil,
            Parameter::Ntg => &mut self.ntg,
        }
    }

    fn empty() -> Self {
        Self {
            grv: Vec::new(),
            phi: Vec::new(),
            s_oil: Vec::new(),
            b_oil: Vec::new(),
            ntg: Vec::new(),
        }
    }
}

pub fn build_pools<R: Rng + ?Sized>(
    ranges: &ParameterRanges,
    batch_size: usize,
    rng: &mut R,
) -> Result<ParameterPools, SimulationError> {
    ranges.validate()?;
    if batch_size == 0 || batch_size > MAX_BATCH_SIZE {
        return Err(SimulationError::InvalidBatchSize);
    }

    let mut pools = ParameterPools::empty();
    for parameter in Parameter::ALL {
        let range = ranges.get(parameter);
        let pool = sample_pool(parameter, range, batch_size, rng)?;
        debug!(
            parameter = parameter.key(),
            mean = range.mean(),
            std_dev = range.std_dev(),
            batch_size,
            "sampled parameter pool"
        );
        *pools.slot(parameter) = pool;
    }
    Ok(pools)
}

fn sample_pool<R: Rng + ?Sized>(
    parameter: Parameter,
    range: ParameterRange,
    batch_size: usize,
    rng: &mut R,
) -> Result<Vec<f64>, SimulationError> {
    let normal = Normal::new(range.mean(), range.std_dev()).map_err(|e| {
        SimulationError::Distribution {
            parameter,
            message: e.to_string(),
        }
    })?;
    Ok((0..batch_size).map(|_| normal.sample(rng)).collect())
}

pub fn draw<R: Rng + ?Sized>(
    pool: &[f64],
    parameter: Parameter,
    rng: &mut R,
) -> Result<f64, SimulationError> {
    pool.choose(rng)
        .copied()
        .ok_or(SimulationError::EmptyPool(parameter))
}
