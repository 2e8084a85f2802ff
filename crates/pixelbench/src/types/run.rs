//! History rows, image-size samples and comparison outcomes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::image::ImageDims;
use super::measurement::{AggregatedStatistics, PersistedStatistics};
use super::scenario::{Implementation, Scenario};

/// One side per implementation. The persisted keys keep the `js`/`wasm`
/// record schema shared with the browser front-end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunPair<T> {
    #[serde(rename = "js", skip_serializing_if = "Option::is_none")]
    pub interpreted: Option<T>,
    #[serde(rename = "wasm", skip_serializing_if = "Option::is_none")]
    pub compiled: Option<T>,
}

/// A history row holding full statistics (and possibly median output buffers)
pub type ScenarioRun = RunPair<AggregatedStatistics>;

/// A history row as written to the session store
pub type PersistedRun = RunPair<PersistedStatistics>;

impl<T> Default for RunPair<T> {
    fn default() -> Self {
        Self {
            interpreted: None,
            compiled: None,
        }
    }
}

impl<T> RunPair<T> {
    pub fn get(&self, implementation: Implementation) -> Option<&T> {
        match implementation {
            Implementation::Interpreted => self.interpreted.as_ref(),
            Implementation::Compiled => self.compiled.as_ref(),
        }
    }

    pub fn slot_mut(&mut self, implementation: Implementation) -> &mut Option<T> {
        match implementation {
            Implementation::Interpreted => &mut self.interpreted,
            Implementation::Compiled => &mut self.compiled,
        }
    }

    pub fn has(&self, implementation: Implementation) -> bool {
        self.get(implementation).is_some()
    }

    /// Both sides recorded
    pub fn is_complete(&self) -> bool {
        self.interpreted.is_some() && self.compiled.is_some()
    }
}

impl ScenarioRun {
    pub fn strip_outputs(&mut self) {
        if let Some(stats) = self.interpreted.as_mut() {
            stats.strip_outputs();
        }
        if let Some(stats) = self.compiled.as_mut() {
            stats.strip_outputs();
        }
    }

    pub fn has_outputs(&self) -> bool {
        self.interpreted.as_ref().is_some_and(|s| s.has_output())
            || self.compiled.as_ref().is_some_and(|s| s.has_output())
    }

    pub fn sanitize(&self) -> PersistedRun {
        PersistedRun {
            interpreted: self.interpreted.as_ref().map(AggregatedStatistics::sanitize),
            compiled: self.compiled.as_ref().map(AggregatedStatistics::sanitize),
        }
    }
}

impl PersistedRun {
    pub fn inflate(self) -> ScenarioRun {
        ScenarioRun {
            interpreted: self.interpreted.map(PersistedStatistics::inflate),
            compiled: self.compiled.map(PersistedStatistics::inflate),
        }
    }
}

/// Cross-run correlation between image size and relative performance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSizeSample {
    pub megapixels: f64,
    pub interpreted_ms: f64,
    pub compiled_ms: f64,
    /// `interpreted_ms / compiled_ms`
    pub speedup_ratio: f64,
    pub timestamp: DateTime<Utc>,
}

impl ImageSizeSample {
    /// Returns `None` when either median is zero and the ratio is meaningless
    pub fn new(megapixels: f64, interpreted_ms: f64, compiled_ms: f64) -> Option<Self> {
        if interpreted_ms <= 0.0 || compiled_ms <= 0.0 {
            return None;
        }
        Some(Self {
            megapixels,
            interpreted_ms,
            compiled_ms,
            speedup_ratio: interpreted_ms / compiled_ms,
            timestamp: Utc::now(),
        })
    }

    /// Distance from parity; larger means a more informative sample
    pub fn informativeness(&self) -> f64 {
        (self.speedup_ratio - 1.0).abs()
    }
}

/// Result of comparing two output buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum Verification {
    /// Every byte within tolerance
    Match,
    /// Buffers differ in length; never equal
    LengthMismatch { left: usize, right: usize },
    /// First byte whose difference exceeds the tolerance
    ValueMismatch { index: usize, left: u8, right: u8 },
}

impl Verification {
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Match)
    }
}

/// Everything a caller needs to report one comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonOutcome {
    pub scenario: Scenario,
    /// `None` when both medians are identical
    pub winner: Option<Implementation>,
    /// Loser median over winner median, always >= 1
    pub speedup_ratio: f64,
    pub verification: Verification,
    pub tolerance: u8,
    pub image: ImageDims,
    pub trial_count: usize,
    pub interpreted: PersistedStatistics,
    pub compiled: PersistedStatistics,
    pub completed_at: DateTime<Utc>,
}

impl ComparisonOutcome {
    pub fn stats(&self, implementation: Implementation) -> &PersistedStatistics {
        match implementation {
            Implementation::Interpreted => &self.interpreted,
            Implementation::Compiled => &self.compiled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_sample_ratio() {
        let sample = ImageSizeSample::new(4.0, 30.0, 10.0).unwrap();
        assert_eq!(sample.speedup_ratio, 3.0);
        assert_eq!(sample.informativeness(), 2.0);
        assert!(ImageSizeSample::new(4.0, 0.0, 10.0).is_none());
    }

    #[test]
    fn test_run_pair_slots() {
        let mut run: RunPair<u32> = RunPair::default();
        assert!(!run.is_complete());
        *run.slot_mut(Implementation::Compiled) = Some(7);
        assert!(run.has(Implementation::Compiled));
        assert!(!run.has(Implementation::Interpreted));
        *run.slot_mut(Implementation::Interpreted) = Some(3);
        assert!(run.is_complete());
        assert_eq!(run.get(Implementation::Interpreted), Some(&3));
    }

    #[test]
    fn test_persisted_run_keys() {
        let run = RunPair {
            interpreted: Some(1u32),
            compiled: None,
        };
        let json = serde_json::to_string(&run).unwrap();
        assert_eq!(json, r#"{"js":1}"#);
        let back: RunPair<u32> = serde_json::from_str(r#"{"wasm":2}"#).unwrap();
        assert_eq!(back.compiled, Some(2));
        assert_eq!(back.interpreted, None);
    }

    #[test]
    fn test_one_sided_persisted_history_reads_back() {
        use crate::services::aggregate;
        use crate::types::TrialMeasurement;
        use std::time::Duration;

        let trial = TrialMeasurement::new(
            Duration::from_millis(12),
            ImageDims::new(8, 8),
            true,
            None,
        );
        let stats = aggregate(Scenario::Invert, Implementation::Interpreted, vec![trial]).unwrap();
        let run = ScenarioRun {
            interpreted: Some(stats),
            compiled: None,
        };

        let json = serde_json::to_string(&vec![run.sanitize()]).unwrap();
        assert!(!json.contains("wasm"));
        let back: Vec<PersistedRun> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), 1);
        assert!(back[0].compiled.is_none());

        let inflated = back[0].clone().inflate();
        assert_eq!(
            inflated.interpreted.unwrap().median.execution_time_ms,
            12.0
        );
    }

    #[test]
    fn test_verification_serialization() {
        let v = Verification::ValueMismatch {
            index: 4,
            left: 10,
            right: 20,
        };
        let json = serde_json::to_string(&v).unwrap();
        assert!(json.contains("value-mismatch"));
        assert!(!v.is_match());
        assert!(Verification::Match.is_match());
    }
}
