use serde::Serialize;

use super::error::SimulationError;
use super::types::MAX_HISTOGRAM_BINS;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Histogram {
    pub bins: Vec<HistogramBin>,
}

impl Histogram {
    pub fn from_samples(samples: &[f64], bin_count: usize) -> Result<Self, SimulationError> {
        if samples.is_empty() {
            return Err(SimulationError::EmptySequence);
        }
        if bin_count == 0 || bin_count > MAX_HISTOGRAM_BINS {
            return Err(SimulationError::InvalidBins);
        }

        let (min, max) = min_max(samples);
        let (lo, hi) = if min == max {
            (min - 0.5, max + 0.5)
        } else {
            (min, max)
        };
        let width = (hi - lo) / bin_count as f64;

        let mut bins: Vec<HistogramBin> = (0..bin_count)
            .map(|i| HistogramBin {
                lower: lo + width * i as f64,
                upper: if i + 1 == bin_count {
                    hi
                } else {
                    lo + width * (i + 1) as f64
                },
                count: 0,
            })
            .collect();

        for &value in samples {
            let index = (((value - lo) / width) as usize).min(bin_count - 1);
            bins[index].count += 1;
        }
        Ok(Self { bins })
    }

    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ecdf {
    pub values: Vec<f64>,
    pub fractions: Vec<f64>,
}

impl Ecdf {
    pub fn from_samples(samples: &[f64]) -> Result<Self, SimulationError> {
        if samples.is_empty() {
            return Err(SimulationError::EmptySequence);
        }

        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        // Distinct values only, no origin point: the first fraction is the
        // multiplicity of the minimum over n, not necessarily 1/n.
        let n = sorted.len();
        let mut values: Vec<f64> = Vec::new();
        let mut fractions: Vec<f64> = Vec::new();
        for (i, &value) in sorted.iter().enumerate() {
            let fraction = (i + 1) as f64 / n as f64;
            match values.last() {
                Some(last) if *last == value => {
                    if let Some(f) = fractions.last_mut() {
                        *f = fraction;
                    }
                }
                _ => {
                    values.push(value);
                    fractions.push(fraction);
                }
            }
        }
        Ok(Self { values, fractions })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value_at(&self, fraction: f64) -> f64 {
        let index = self.fractions.partition_point(|f| *f < fraction);
        self.values[index.min(self.values.len() - 1)]
    }

    pub fn percentile_markers(&self) -> PercentileMarkers {
        PercentileMarkers {
            min: self.values[0],
            p25: self.value_at(0.25),
            p50: self.value_at(0.5),
            p75: self.value_at(0.75),
            max: self.values[self.values.len() - 1],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentileMarkers {
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

// P90 is exceeded with 90% probability, i.e. the 10th percentile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveClasses {
    pub p90: f64,
    pub p50: f64,
    pub p10: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionSummary {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub percentiles: PercentileMarkers,
    pub reserve_classes: ReserveClasses,
    pub histogram: Histogram,
    pub ecdf: Ecdf,
}

pub fn summarize(
    reserves: &[f64],
    bin_count: usize,
) -> Result<DistributionSummary, SimulationError> {
    if reserves.is_empty() {
        return Err(SimulationError::EmptySequence);
    }

    let histogram = Histogram::from_samples(reserves, bin_count)?;
    let ecdf = Ecdf::from_samples(reserves)?;

    let mut sorted = reserves.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let reserve_classes = ReserveClasses {
        p90: percentile(&sorted, 10.0),
        p50: percentile(&sorted, 50.0),
        p10: percentile(&sorted, 90.0),
    };

    let (mean, std_dev) = mean_and_std_dev(reserves);
    Ok(DistributionSummary {
        count: reserves.len(),
        mean,
        std_dev,
        percentiles: ecdf.percentile_markers(),
        reserve_classes,
        histogram,
        ecdf,
    })
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

fn mean_and_std_dev(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (mean, 0.0);
    }
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, var.sqrt())
}

fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }

    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }

    let rank = (p / 100.0) * (n as f64 - 1.0);
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;

    if lower == upper {
        sorted[lower]
    } else {
        let w = rank - lower as f64;
        let value = sorted[lower] + (sorted[upper] - sorted[lower]) * w;
        value.clamp(sorted[lower], sorted[upper])
    }
}
