use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info};

use super::statistics::aggregate;
use super::trial_runner::run_trial;
use super::verification::compare_buffers;
use super::{HistoryStore, SizeCorrelationStore};
use crate::config::Config;
use crate::engine::{EngineCache, ProcessingEngine};
use crate::types::{
    AggregatedStatistics, ComparisonOutcome, ImageBuffer, ImageSizeSample, Implementation,
    ProcessParams, Scenario, ScenarioRun, TrialMeasurement,
};
use crate::Result;

/// Drives measured comparisons between the two implementations.
///
/// Owns the loaded engines, the history and size stores, and the last outcome
/// per scenario. Trials run strictly one after another: every interpreted
/// trial completes before the first compiled trial starts.
pub struct BenchmarkOrchestrator {
    config: Config,
    engines: EngineCache,
    history: HistoryStore,
    sizes: SizeCorrelationStore,
    last_outcomes: HashMap<Scenario, ComparisonOutcome>,
}

impl BenchmarkOrchestrator {
    pub async fn new(config: Config) -> Self {
        Self::with_engines(config, EngineCache::new()).await
    }

    /// Use pre-installed engines; missing ones are still loaded on demand
    pub async fn with_engines(config: Config, engines: EngineCache) -> Self {
        let history = HistoryStore::new(&config);
        let sizes = SizeCorrelationStore::load(&config).await;
        Self {
            config,
            engines,
            history,
            sizes,
            last_outcomes: HashMap::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run a full comparison of both implementations on `input`.
    ///
    /// `trial_count` of `None` picks the count from the scenario's run policy.
    /// Any failure aborts the comparison before anything is recorded.
    pub async fn compare_implementations(
        &mut self,
        scenario: Scenario,
        input: &ImageBuffer,
        trial_count: Option<usize>,
        params: &ProcessParams,
    ) -> Result<ComparisonOutcome> {
        let dims = input.dims();
        let trial_count = trial_count.unwrap_or_else(|| {
            self.config
                .policies
                .for_scenario(scenario)
                .trials_for(dims.megapixels)
        });
        info!(
            "Comparing {} on {}x{} ({:.2} MP), {} trials per implementation",
            scenario, dims.width, dims.height, dims.megapixels, trial_count
        );

        let interpreted_engine = self.engines.get(Implementation::Interpreted)?;
        let compiled_engine = self.engines.get(Implementation::Compiled)?;

        let interpreted_trials = self
            .run_batch(interpreted_engine.as_ref(), scenario, input, trial_count, params)
            .await?;
        Self::pacing_delay(self.config.pacing.inter_phase_ms).await;
        let compiled_trials = self
            .run_batch(compiled_engine.as_ref(), scenario, input, trial_count, params)
            .await?;

        let mut interpreted = aggregate(scenario, Implementation::Interpreted, interpreted_trials)?;
        let mut compiled = aggregate(scenario, Implementation::Compiled, compiled_trials)?;

        // Outputs were dropped during the batches; rebuild the two median buffers
        let interpreted_output = interpreted_engine
            .process(scenario, input.clone(), params)
            .await?;
        let compiled_output = compiled_engine
            .process(scenario, input.clone(), params)
            .await?;

        let (winner, speedup_ratio) = decide_winner(&interpreted, &compiled);
        let tolerance = self.config.verification.tolerance;
        let verification = compare_buffers(&interpreted_output, &compiled_output, tolerance);

        interpreted.median.output = Some(interpreted_output);
        compiled.median.output = Some(compiled_output);

        let outcome = ComparisonOutcome {
            scenario,
            winner,
            speedup_ratio,
            verification,
            tolerance,
            image: dims,
            trial_count,
            interpreted: interpreted.sanitize(),
            compiled: compiled.sanitize(),
            completed_at: Utc::now(),
        };

        if let Some(sample) = ImageSizeSample::new(
            dims.megapixels,
            interpreted.median.execution_time_ms,
            compiled.median.execution_time_ms,
        ) {
            self.sizes.record(scenario, sample).await;
        }
        let run = ScenarioRun {
            interpreted: Some(interpreted),
            compiled: Some(compiled),
        };
        self.history.record_run(scenario, run).await;

        info!(
            "{} finished: {} ({:.2}x), outputs {}",
            scenario,
            winner.map(|w| w.name()).unwrap_or("tie"),
            speedup_ratio,
            if verification.is_match() { "match" } else { "differ" }
        );
        self.last_outcomes.insert(scenario, outcome.clone());
        Ok(outcome)
    }

    async fn run_batch(
        &self,
        engine: &dyn ProcessingEngine,
        scenario: Scenario,
        input: &ImageBuffer,
        trial_count: usize,
        params: &ProcessParams,
    ) -> Result<Vec<TrialMeasurement>> {
        let mut trials = Vec::with_capacity(trial_count);
        for index in 0..trial_count {
            if index > 0 {
                Self::pacing_delay(self.config.pacing.inter_trial_ms).await;
            }
            let mut trial = run_trial(engine, scenario, input.clone(), index == 0, params).await?;
            trial.discard_output();
            trials.push(trial);
        }
        debug!(
            "{} batch for {} done: {} trials",
            engine.implementation(),
            scenario,
            trials.len()
        );
        Ok(trials)
    }

    /// UI pacing only; never part of a measured interval
    pub async fn pacing_delay(ms: u64) {
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }

    /// Recorded runs for a scenario, oldest first
    pub async fn history(&mut self, scenario: Scenario) -> &[ScenarioRun] {
        self.history.read(scenario).await
    }

    /// Clear a scenario's history together with its cached outcome
    pub async fn clear_scenario(&mut self, scenario: Scenario) -> Result<()> {
        self.history.clear(scenario).await?;
        self.last_outcomes.remove(&scenario);
        Ok(())
    }

    pub fn last_outcome(&self, scenario: Scenario) -> Option<&ComparisonOutcome> {
        self.last_outcomes.get(&scenario)
    }

    pub fn size_samples(&self, scenario: Scenario) -> Vec<ImageSizeSample> {
        self.sizes.samples(scenario)
    }
}

/// Lower median wins; equal medians are a tie with ratio 1
fn decide_winner(
    interpreted: &AggregatedStatistics,
    compiled: &AggregatedStatistics,
) -> (Option<Implementation>, f64) {
    let a = interpreted.median.execution_time_ms;
    let b = compiled.median.execution_time_ms;
    if a < b {
        (Some(Implementation::Interpreted), speedup(b, a))
    } else if b < a {
        (Some(Implementation::Compiled), speedup(a, b))
    } else {
        (None, 1.0)
    }
}

/// Loser over winner; unbounded when the winner's median rounds to zero
fn speedup(loser_ms: f64, winner_ms: f64) -> f64 {
    if winner_ms <= 0.0 {
        f64::INFINITY
    } else {
        loser_ms / winner_ms
    }
}
