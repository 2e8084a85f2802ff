use crate::types::{AggregatedStatistics, Implementation, MeanStats, Scenario, TrialMeasurement};
use crate::{Error, Result};

/// Reduce a trial batch to summary statistics.
///
/// The median is the observed trial at `floor(n / 2)` after a stable sort on
/// execution time, so for even batches it is the upper of the two middle
/// trials. Mean and standard deviation (population) use the two-pass formula.
pub fn aggregate(
    scenario: Scenario,
    implementation: Implementation,
    trials: Vec<TrialMeasurement>,
) -> Result<AggregatedStatistics> {
    if trials.is_empty() {
        return Err(Error::EmptyBatch {
            scenario,
            implementation,
        });
    }

    let n = trials.len() as f64;
    let mean_ms = trials.iter().map(|t| t.execution_time_ms).sum::<f64>() / n;
    let mean_throughput = trials.iter().map(|t| t.throughput_mpx_per_sec).sum::<f64>() / n;
    let variance = trials
        .iter()
        .map(|t| {
            let d = t.execution_time_ms - mean_ms;
            d * d
        })
        .sum::<f64>()
        / n;
    let std_dev_ms = variance.sqrt();
    let coefficient_of_variation_pct = if mean_ms == 0.0 {
        None
    } else {
        Some(100.0 * std_dev_ms / mean_ms)
    };

    let first_trial = trials.iter().find(|t| t.is_first_trial).cloned();

    let mut sorted: Vec<&TrialMeasurement> = trials.iter().collect();
    // sort_by is stable: equal times keep batch order
    sorted.sort_by(|a, b| a.execution_time_ms.total_cmp(&b.execution_time_ms));
    let median = sorted[sorted.len() / 2].clone();
    let min = sorted[0].clone();
    let max = sorted[sorted.len() - 1].clone();

    Ok(AggregatedStatistics {
        median,
        mean: MeanStats {
            execution_time_ms: mean_ms,
            throughput_mpx_per_sec: mean_throughput,
        },
        std_dev_ms,
        coefficient_of_variation_pct,
        min,
        max,
        count: trials.len() as u32,
        first_trial,
        all_trials: trials,
    })
}
