//! Trial measurements and the statistics reduced from them

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::image::{ImageBuffer, ImageDims};

/// Timing of a single processing call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialMeasurement {
    pub execution_time_ms: f64,
    pub throughput_mpx_per_sec: f64,
    pub is_first_trial: bool,
    pub image_dims: ImageDims,
    /// Output of the call; dropped as soon as the trial has been folded into a batch
    #[serde(skip)]
    pub output: Option<ImageBuffer>,
}

impl TrialMeasurement {
    pub fn new(
        elapsed: Duration,
        image_dims: ImageDims,
        is_first_trial: bool,
        output: Option<ImageBuffer>,
    ) -> Self {
        // Nanosecond integer division keeps whole-millisecond durations exact
        let execution_time_ms = elapsed.as_nanos() as f64 / 1e6;
        Self {
            execution_time_ms,
            throughput_mpx_per_sec: throughput_mpx_per_sec(image_dims.megapixels, execution_time_ms),
            is_first_trial,
            image_dims,
            output,
        }
    }

    /// Release the output buffer
    pub fn discard_output(&mut self) {
        self.output = None;
    }

    /// Copy of the scalar fields without the output buffer
    pub fn sanitized(&self) -> Self {
        Self {
            execution_time_ms: self.execution_time_ms,
            throughput_mpx_per_sec: self.throughput_mpx_per_sec,
            is_first_trial: self.is_first_trial,
            image_dims: self.image_dims,
            output: None,
        }
    }
}

/// Megapixels processed per second; 0.0 when the duration is too short to measure
pub fn throughput_mpx_per_sec(megapixels: f64, execution_time_ms: f64) -> f64 {
    if execution_time_ms <= 0.0 {
        return 0.0;
    }
    megapixels / (execution_time_ms / 1000.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeanStats {
    pub execution_time_ms: f64,
    pub throughput_mpx_per_sec: f64,
}

/// Summary of one implementation's trial batch
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedStatistics {
    /// Observed trial at index `floor(count / 2)` of the time-sorted batch
    pub median: TrialMeasurement,
    pub mean: MeanStats,
    pub std_dev_ms: f64,
    /// `None` when the mean execution time is zero
    pub coefficient_of_variation_pct: Option<f64>,
    pub min: TrialMeasurement,
    pub max: TrialMeasurement,
    pub count: u32,
    pub first_trial: Option<TrialMeasurement>,
    pub all_trials: Vec<TrialMeasurement>,
}

impl AggregatedStatistics {
    /// Cold-start overhead: first trial time minus median time
    pub fn first_trial_delta_ms(&self) -> Option<f64> {
        self.first_trial
            .as_ref()
            .map(|first| first.execution_time_ms - self.median.execution_time_ms)
    }

    pub fn has_output(&self) -> bool {
        self.median.output.is_some()
    }

    /// Drop every retained output buffer
    pub fn strip_outputs(&mut self) {
        self.median.discard_output();
        self.min.discard_output();
        self.max.discard_output();
        if let Some(first) = self.first_trial.as_mut() {
            first.discard_output();
        }
        for trial in &mut self.all_trials {
            trial.discard_output();
        }
    }

    /// Buffer-free projection used for persistence and reporting
    pub fn sanitize(&self) -> PersistedStatistics {
        PersistedStatistics {
            median: self.median.sanitized(),
            mean: self.mean,
            std_dev: self.std_dev_ms,
            coefficient_of_variation_pct: self.coefficient_of_variation_pct,
            min: self.min.sanitized(),
            max: self.max.sanitized(),
            count: self.count,
            first_run: self.first_trial.as_ref().map(TrialMeasurement::sanitized),
            all_trials: self.all_trials.iter().map(TrialMeasurement::sanitized).collect(),
        }
    }
}

/// Persisted form of [`AggregatedStatistics`]: identical scalars, no buffers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedStatistics {
    pub median: TrialMeasurement,
    pub mean: MeanStats,
    pub std_dev: f64,
    #[serde(default)]
    pub coefficient_of_variation_pct: Option<f64>,
    pub min: TrialMeasurement,
    pub max: TrialMeasurement,
    pub count: u32,
    pub first_run: Option<TrialMeasurement>,
    #[serde(default)]
    pub all_trials: Vec<TrialMeasurement>,
}

impl PersistedStatistics {
    /// Rebuild the in-memory form; output buffers stay empty
    pub fn inflate(self) -> AggregatedStatistics {
        AggregatedStatistics {
            median: self.median,
            mean: self.mean,
            std_dev_ms: self.std_dev,
            coefficient_of_variation_pct: self.coefficient_of_variation_pct,
            min: self.min,
            max: self.max,
            count: self.count,
            first_trial: self.first_run,
            all_trials: self.all_trials,
        }
    }
}

impl From<&AggregatedStatistics> for PersistedStatistics {
    fn from(stats: &AggregatedStatistics) -> Self {
        stats.sanitize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trial_timing_and_throughput() {
        let dims = ImageDims::new(1000, 1000);
        let trial = TrialMeasurement::new(Duration::from_millis(250), dims, true, None);
        assert_eq!(trial.execution_time_ms, 250.0);
        assert_eq!(trial.throughput_mpx_per_sec, 4.0);
        assert!(trial.is_first_trial);
    }

    #[test]
    fn test_zero_duration_throughput() {
        assert_eq!(throughput_mpx_per_sec(1.0, 0.0), 0.0);
    }

    #[test]
    fn test_sanitized_drops_output() {
        let img = ImageBuffer::solid(2, 2, [1, 2, 3, 4]);
        let trial =
            TrialMeasurement::new(Duration::from_micros(1500), img.dims(), false, Some(img));
        let clean = trial.sanitized();
        assert!(clean.output.is_none());
        assert_eq!(clean.execution_time_ms, trial.execution_time_ms);
        assert_eq!(clean.image_dims, trial.image_dims);
    }

    #[test]
    fn test_output_never_serialized() {
        let img = ImageBuffer::solid(1, 1, [9, 9, 9, 9]);
        let trial = TrialMeasurement::new(Duration::from_millis(1), img.dims(), false, Some(img));
        let json = serde_json::to_string(&trial).unwrap();
        assert!(!json.contains("output"));
        let back: TrialMeasurement = serde_json::from_str(&json).unwrap();
        assert!(back.output.is_none());
    }
}
