//! Processing engines under benchmark
//!
//! Each engine implements every [`Scenario`]. The interpreted engine evaluates
//! the routines over f64 values pixel by pixel; the compiled engine runs
//! integer kernels over lookup tables prepared when it is loaded. Both are
//! deterministic and produce byte-identical output for the same input.

mod compiled;
mod interpreted;

pub use compiled::CompiledEngine;
pub use interpreted::InterpretedEngine;

use std::sync::Arc;

use async_trait::async_trait;

use crate::types::{ImageBuffer, Implementation, ProcessParams, Scenario};
use crate::{Error, Result};

/// Edge threshold applied to the rounded Sobel magnitude
pub const EDGE_THRESHOLD: u8 = 170;

/// Pixels used to train the quantization palette
pub const QUANTIZE_SAMPLE_SIZE: usize = 1000;

/// Upper bound on K-means refinement passes
pub const QUANTIZE_MAX_ITERATIONS: usize = 20;

/// Centroid movement under which K-means stops early
pub const QUANTIZE_CONVERGENCE: f64 = 1.0;

/// Largest palette quantize accepts; one entry per possible channel value
pub const MAX_QUANTIZE_COLORS: usize = 256;

/// Trait for image-processing engines
#[async_trait]
pub trait ProcessingEngine: Send + Sync {
    /// Which side of the comparison this engine provides
    fn implementation(&self) -> Implementation;

    /// Run one scenario over an owned input buffer
    async fn process(
        &self,
        scenario: Scenario,
        input: ImageBuffer,
        params: &ProcessParams,
    ) -> Result<ImageBuffer>;
}

/// Instantiate the engine for an implementation
pub fn load_engine(implementation: Implementation) -> Result<Arc<dyn ProcessingEngine>> {
    let engine: Arc<dyn ProcessingEngine> = match implementation {
        Implementation::Interpreted => Arc::new(InterpretedEngine::new()),
        Implementation::Compiled => Arc::new(CompiledEngine::load()?),
    };
    tracing::debug!("Loaded {} engine", implementation);
    Ok(engine)
}

/// Engines loaded on first use, once per implementation, and dropped with the owner
#[derive(Default)]
pub struct EngineCache {
    interpreted: Option<Arc<dyn ProcessingEngine>>,
    compiled: Option<Arc<dyn ProcessingEngine>>,
}

impl EngineCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install an engine up front instead of loading the built-in one
    pub fn with_engine(mut self, engine: Arc<dyn ProcessingEngine>) -> Self {
        let implementation = engine.implementation();
        *self.slot_mut(implementation) = Some(engine);
        self
    }

    pub fn is_loaded(&self, implementation: Implementation) -> bool {
        match implementation {
            Implementation::Interpreted => self.interpreted.is_some(),
            Implementation::Compiled => self.compiled.is_some(),
        }
    }

    /// Get the engine for an implementation, loading it if needed
    pub fn get(&mut self, implementation: Implementation) -> Result<Arc<dyn ProcessingEngine>> {
        let slot = self.slot_mut(implementation);
        if let Some(engine) = slot {
            return Ok(engine.clone());
        }
        let engine = load_engine(implementation)?;
        *slot = Some(engine.clone());
        Ok(engine)
    }

    fn slot_mut(&mut self, implementation: Implementation) -> &mut Option<Arc<dyn ProcessingEngine>> {
        match implementation {
            Implementation::Interpreted => &mut self.interpreted,
            Implementation::Compiled => &mut self.compiled,
        }
    }
}

pub(crate) fn check_params(scenario: Scenario, params: &ProcessParams) -> Result<()> {
    if scenario != Scenario::Quantize {
        return Ok(());
    }
    match params.quantize_colors {
        0 => Err(Error::InvalidParams(
            "quantize needs at least one color".to_string(),
        )),
        colors if colors > MAX_QUANTIZE_COLORS => Err(Error::InvalidParams(format!(
            "quantize supports at most {} colors, got {}",
            MAX_QUANTIZE_COLORS, colors
        ))),
        _ => Ok(()),
    }
}

/// Evenly strided sample indices: `floor(i * len / sample_size)`
pub(crate) fn sample_indices(len: usize, sample_size: usize) -> impl Iterator<Item = usize> {
    let step = len as f64 / sample_size.max(1) as f64;
    (0..sample_size).map(move |i| (i as f64 * step).floor() as usize)
}
