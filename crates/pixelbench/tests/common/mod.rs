#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pixelbench::{
    EngineCache, ImageBuffer, Implementation, ProcessParams, ProcessingEngine, Result, Scenario,
};

/// Engine that sleeps instead of computing: `cold` on the first call, `warm` after
pub struct SleepyEngine {
    implementation: Implementation,
    cold: Duration,
    warm: Duration,
    calls: AtomicUsize,
}

impl SleepyEngine {
    pub fn new(implementation: Implementation, cold_ms: u64, warm_ms: u64) -> Arc<Self> {
        Arc::new(Self {
            implementation,
            cold: Duration::from_millis(cold_ms),
            warm: Duration::from_millis(warm_ms),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProcessingEngine for SleepyEngine {
    fn implementation(&self) -> Implementation {
        self.implementation
    }

    async fn process(
        &self,
        _scenario: Scenario,
        input: ImageBuffer,
        _params: &ProcessParams,
    ) -> Result<ImageBuffer> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = if call == 0 { self.cold } else { self.warm };
        tokio::time::sleep(delay).await;
        Ok(input)
    }
}

pub fn sleepy_engines(
    interpreted: Arc<SleepyEngine>,
    compiled: Arc<SleepyEngine>,
) -> EngineCache {
    EngineCache::new()
        .with_engine(interpreted)
        .with_engine(compiled)
}

pub fn red(width: u32, height: u32) -> ImageBuffer {
    ImageBuffer::solid(width, height, [255, 0, 0, 255])
}
