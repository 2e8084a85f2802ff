use tokio::time::Instant;
use tracing::debug;

use crate::engine::ProcessingEngine;
use crate::types::{ImageBuffer, ProcessParams, Scenario, TrialMeasurement};
use crate::Result;

/// Time exactly one processing call.
///
/// `input` must be a private copy: the engine takes ownership and may reuse it
/// as its output. Routine failures propagate unchanged; there is no retry here.
pub async fn run_trial(
    engine: &dyn ProcessingEngine,
    scenario: Scenario,
    input: ImageBuffer,
    is_first_trial: bool,
    params: &ProcessParams,
) -> Result<TrialMeasurement> {
    let dims = input.dims();

    let start = Instant::now();
    let output = engine.process(scenario, input, params).await?;
    let elapsed = start.elapsed();

    let trial = TrialMeasurement::new(elapsed, dims, is_first_trial, Some(output));
    debug!(
        "{} {} trial: {:.3} ms ({:.2} MP/s){}",
        engine.implementation(),
        scenario,
        trial.execution_time_ms,
        trial.throughput_mpx_per_sec,
        if is_first_trial { " [first]" } else { "" }
    );
    Ok(trial)
}
