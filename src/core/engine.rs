use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use super::error::SimulationError;
use super::formula::stoiip;
use super::sampler::{ParameterPools, build_pools, draw};
use super::summary::summarize;
use super::types::{Inputs, MAX_ITERATIONS, ModelResult, Parameter};

// Matches the argument order of `stoiip`.
pub const DRAW_ORDER: [Parameter; 5] = [
    Parameter::Grv,
    Parameter::Phi,
    Parameter::SOil,
    Parameter::BOil,
    Parameter::Ntg,
];

pub trait DrawSource {
    fn draw(&mut self, parameter: Parameter) -> Result<f64, SimulationError>;
}

pub struct PoolDraws<'a, R: Rng + ?Sized> {
    pools: &'a ParameterPools,
    rng: &'a mut R,
}

impl<'a, R: Rng + ?Sized> PoolDraws<'a, R> {
    pub fn new(pools: &'a ParameterPools, rng: &'a mut R) -> Self {
        Self { pools, rng }
    }
}

impl<R: Rng + ?Sized> DrawSource for PoolDraws<'_, R> {
    fn draw(&mut self, parameter: Parameter) -> Result<f64, SimulationError> {
        draw(self.pools.get(parameter), parameter, self.rng)
    }
}

pub fn run_model(inputs: &Inputs) -> Result<ModelResult, SimulationError> {
    inputs.validate()?;
    info!(
        iterations = inputs.iterations,
        batch_size = inputs.batch_size,
        seed = inputs.seed,
        "starting STOIIP simulation"
    );

    let mut rng = StdRng::seed_from_u64(inputs.seed);
    let pools = build_pools(&inputs.ranges, inputs.batch_size, &mut rng)?;
    let mut source = PoolDraws::new(&pools, &mut rng);
    let reserves = simulate_reserves(&mut source, inputs.iterations)?;
    let summary = summarize(&reserves, inputs.histogram_bins)?;

    info!(
        mean = summary.mean,
        p50 = summary.reserve_classes.p50,
        distinct_values = summary.ecdf.len(),
        "simulation complete"
    );
    Ok(ModelResult { reserves, summary })
}

pub fn simulate_reserves<S: DrawSource + ?Sized>(
    source: &mut S,
    iterations: usize,
) -> Result<Vec<f64>, SimulationError> {
    if iterations == 0 || iterations > MAX_ITERATIONS {
        return Err(SimulationError::InvalidIterations);
    }

    let mut reserves = Vec::with_capacity(iterations);
    for _ in 0..iterations {
        let mut drawn = [0.0; 5];
        for (slot, parameter) in drawn.iter_mut().zip(DRAW_ORDER) {
            *slot = source.draw(parameter)?;
        }
        let [grv, phi, s_oil, b_oil, ntg] = drawn;
        reserves.push(stoiip(grv, phi, s_oil, b_oil, ntg)?);
    }
    debug!(samples = reserves.len(), "monte carlo loop finished");
    Ok(reserves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ParameterRange;
    use proptest::prelude::{any, prop_assert, prop_assert_eq, proptest};
    use std::collections::VecDeque;

    struct FixedDraws {
        rows: VecDeque<[f64; 5]>,
        current: [f64; 5],
        requested: Vec<Parameter>,
    }

    impl FixedDraws {
        fn new(rows: &[[f64; 5]]) -> Self {
            Self {
                rows: rows.iter().copied().collect(),
                current: [0.0; 5],
                requested: Vec::new(),
            }
        }
    }

    impl DrawSource for FixedDraws {
        fn draw(&mut self, parameter: Parameter) -> Result<f64, SimulationError> {
            if parameter == DRAW_ORDER[0] {
                self.current = self
                    .rows
                    .pop_front()
                    .ok_or(SimulationError::EmptyPool(parameter))?;
            }
            self.requested.push(parameter);
            let index = DRAW_ORDER
                .iter()
                .position(|p| *p == parameter)
                .expect("known parameter");
            Ok(self.current[index])
        }
    }

    fn small_inputs() -> Inputs {
        Inputs {
            iterations: 300,
            batch_size: 50,
            seed: 17,
            ..Inputs::default()
        }
    }

    #[test]
    fn fixed_draws_produce_exact_formula_outputs() {
        let rows = [
            [150_000_000.0, 0.3, 0.75, 1.4, 0.8],
            [114_000_000.0, 0.1, 0.6, 1.8, 0.72],
            [189_750_000.0, 0.5, 0.9, 1.1, 0.94],
        ];
        let mut source = FixedDraws::new(&rows);
        let reserves = simulate_reserves(&mut source, rows.len()).expect("valid draws");

        assert_eq!(reserves.len(), rows.len());
        for (row, reserve) in rows.iter().zip(&reserves) {
            let expected = stoiip(row[0], row[1], row[2], row[3], row[4]).unwrap();
            assert_eq!(*reserve, expected);
        }
        assert_eq!(&source.requested[..5], &DRAW_ORDER);
    }

    #[test]
    fn draws_follow_formula_argument_order_every_iteration() {
        let rows = [[1.0, 2.0, 3.0, 4.0, 5.0]; 3];
        let mut source = FixedDraws::new(&rows);
        simulate_reserves(&mut source, rows.len()).expect("valid draws");

        let expected: Vec<Parameter> = DRAW_ORDER.iter().copied().cycle().take(15).collect();
        assert_eq!(source.requested, expected);
    }

    #[test]
    fn single_sample_pools_collapse_the_ecdf_to_one_step() {
        let inputs = Inputs {
            iterations: 25,
            batch_size: 1,
            ..Inputs::default()
        };
        let model = run_model(&inputs).expect("valid inputs");
        assert!(model.reserves.iter().all(|v| *v == model.reserves[0]));
        assert_eq!(model.summary.ecdf.values, vec![model.reserves[0]]);
        assert_eq!(model.summary.ecdf.fractions, vec![1.0]);
    }

    #[test]
    fn zero_formation_factor_aborts_the_run() {
        let rows = [
            [150_000_000.0, 0.3, 0.75, 1.4, 0.8],
            [150_000_000.0, 0.3, 0.75, 0.0, 0.8],
            [150_000_000.0, 0.3, 0.75, 1.4, 0.8],
        ];
        let mut source = FixedDraws::new(&rows);
        assert_eq!(
            simulate_reserves(&mut source, rows.len()),
            Err(SimulationError::ZeroFormationFactor)
        );
    }

    #[test]
    fn zero_iterations_is_a_configuration_error() {
        let mut source = FixedDraws::new(&[]);
        assert_eq!(
            simulate_reserves(&mut source, 0),
            Err(SimulationError::InvalidIterations)
        );
        assert_eq!(
            simulate_reserves(&mut source, MAX_ITERATIONS + 1),
            Err(SimulationError::InvalidIterations)
        );
        assert!(source.requested.is_empty());
    }

    #[test]
    fn fixed_seed_reruns_are_identical() {
        let inputs = small_inputs();
        let a = run_model(&inputs).expect("valid inputs");
        let b = run_model(&inputs).expect("valid inputs");
        assert_eq!(a.reserves, b.reserves);
        assert_eq!(a.summary, b.summary);

        let mut other = small_inputs();
        other.seed = 18;
        let c = run_model(&other).expect("valid inputs");
        assert_ne!(a.reserves, c.reserves);
    }

    #[test]
    fn run_model_rejects_invalid_ranges_before_sampling() {
        let mut inputs = small_inputs();
        inputs.ranges.s_oil = ParameterRange::new(0.9, 0.6);
        let err = run_model(&inputs).expect_err("inverted range");
        assert!(matches!(err, SimulationError::InvalidRange { .. }));
    }

    #[test]
    fn default_run_stays_in_physical_magnitude() {
        let model = run_model(&Inputs::default()).expect("default inputs are valid");
        assert_eq!(model.reserves.len(), 4000);

        // Midpoint inputs: 7758 * 151.875e6 * 0.3 * 0.75 * 0.83 / 1.45
        let midpoint = stoiip(151_875_000.0, 0.3, 0.75, 1.45, 0.83).unwrap();
        let rel = (model.summary.mean - midpoint).abs() / midpoint;
        assert!(rel < 0.1, "mean {} vs midpoint {midpoint}", model.summary.mean);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(24))]

        #[test]
        fn prop_sequence_has_requested_length_and_finite_values(
            iterations in 1usize..1_500,
            batch_size in 1usize..200,
            seed in any::<u64>(),
        ) {
            let inputs = Inputs {
                iterations,
                batch_size,
                seed,
                ..Inputs::default()
            };
            let model = run_model(&inputs).unwrap();
            prop_assert_eq!(model.reserves.len(), iterations);
            prop_assert!(model.reserves.iter().all(|v| v.is_finite()));
        }
    }
}
