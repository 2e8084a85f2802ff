//! # pixelbench
//!
//! Benchmarks an interpreted and a compiled implementation of the same image
//! routines (invert, edge detection, colour quantization), reduces repeated
//! trials to robust statistics, verifies that both produce equivalent output
//! and keeps a bounded rolling history of results.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pixelbench::{Config, ImageBuffer, PixelBench, Scenario};
//!
//! let bench = PixelBench::new(Config::default()).await?;
//! let input = ImageBuffer::solid(1920, 1080, [255, 0, 0, 255]);
//!
//! let outcome = bench.compare(Scenario::Invert, &input, None, None).await?;
//! println!("{:?} wins by {:.2}x", outcome.winner, outcome.speedup_ratio);
//!
//! for run in bench.history(Scenario::Invert).await {
//!     // ...
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod services;
pub mod types;

// Re-export key types
pub use config::Config;
pub use engine::{CompiledEngine, EngineCache, InterpretedEngine, ProcessingEngine};
pub use error::{Error, Result};
pub use services::{BenchmarkOrchestrator, HistoryStore, SizeCorrelationStore};
pub use types::*;

use tokio::sync::RwLock;

/// Main facade owning the orchestrator and every store behind it
pub struct PixelBench {
    config: Config,
    orchestrator: RwLock<BenchmarkOrchestrator>,
}

impl PixelBench {
    /// Create a new PixelBench instance
    pub async fn new(config: Config) -> Result<Self> {
        Self::with_engines(config, EngineCache::new()).await
    }

    /// Create an instance with some engines already installed
    pub async fn with_engines(config: Config, engines: EngineCache) -> Result<Self> {
        config.validate()?;
        // Ensure directories exist
        config.ensure_dirs()?;

        let orchestrator = BenchmarkOrchestrator::with_engines(config.clone(), engines).await;
        Ok(Self {
            config,
            orchestrator: RwLock::new(orchestrator),
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Compare both implementations on `input`.
    ///
    /// `trials` and `params` fall back to the configured run policy and
    /// default parameters. Comparisons are serialized.
    pub async fn compare(
        &self,
        scenario: Scenario,
        input: &ImageBuffer,
        trials: Option<usize>,
        params: Option<ProcessParams>,
    ) -> Result<ComparisonOutcome> {
        let params = params.unwrap_or(self.config.params);
        self.orchestrator
            .write()
            .await
            .compare_implementations(scenario, input, trials, &params)
            .await
    }

    /// Recorded runs for a scenario, oldest first
    pub async fn history(&self, scenario: Scenario) -> Vec<ScenarioRun> {
        self.orchestrator.write().await.history(scenario).await.to_vec()
    }

    /// Clear a scenario's history and cached outcome
    pub async fn clear(&self, scenario: Scenario) -> Result<()> {
        self.orchestrator.write().await.clear_scenario(scenario).await
    }

    /// Image-size correlation samples, ordered by megapixels
    pub async fn size_samples(&self, scenario: Scenario) -> Vec<ImageSizeSample> {
        self.orchestrator.read().await.size_samples(scenario)
    }

    /// Outcome of the most recent comparison in this process
    pub async fn last_outcome(&self, scenario: Scenario) -> Option<ComparisonOutcome> {
        self.orchestrator.read().await.last_outcome(scenario).cloned()
    }
}
