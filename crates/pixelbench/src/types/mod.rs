//! Data model shared by the engines and services

pub mod image;
pub mod measurement;
pub mod run;
pub mod scenario;

pub use image::{ImageBuffer, ImageDims, CHANNELS};
pub use measurement::{
    throughput_mpx_per_sec, AggregatedStatistics, MeanStats, PersistedStatistics,
    TrialMeasurement,
};
pub use run::{
    ComparisonOutcome, ImageSizeSample, PersistedRun, RunPair, ScenarioRun, Verification,
};
pub use scenario::{Implementation, ProcessParams, Scenario};
