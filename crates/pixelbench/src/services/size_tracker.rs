use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::JsonStore;
use crate::config::Config;
use crate::types::{ImageSizeSample, Scenario};

const SIZE_KEY: &str = "size-correlation";

/// Long-lived correlation between image size and speedup, per scenario.
///
/// Samples within `merge_threshold` relative megapixel distance of an existing
/// one are merged, keeping whichever lies further from parity. Unlike history
/// this store lives in the data directory and is never cleared with it.
pub struct SizeCorrelationStore {
    store: JsonStore,
    max_samples: usize,
    merge_threshold: f64,
    samples: BTreeMap<String, Vec<ImageSizeSample>>,
}

impl SizeCorrelationStore {
    /// Open the store and read any persisted samples
    pub async fn load(config: &Config) -> Self {
        Self::load_from(
            JsonStore::new(&config.storage.data_dir),
            config.history.max_size_samples,
            config.history.size_merge_threshold,
        )
        .await
    }

    pub async fn load_from(store: JsonStore, max_samples: usize, merge_threshold: f64) -> Self {
        let samples = match store
            .load::<BTreeMap<String, Vec<ImageSizeSample>>>(SIZE_KEY)
            .await
        {
            Ok(Some(samples)) => samples,
            Ok(None) => BTreeMap::new(),
            Err(e) => {
                warn!("Ignoring persisted size samples: {}", e);
                BTreeMap::new()
            }
        };
        Self {
            store,
            max_samples: max_samples.max(1),
            merge_threshold,
            samples,
        }
    }

    pub async fn record(&mut self, scenario: Scenario, sample: ImageSizeSample) {
        let threshold = self.merge_threshold;
        let samples = self.samples.entry(scenario.key().to_string()).or_default();

        let nearby = samples
            .iter()
            .enumerate()
            .filter_map(|(index, old)| {
                relative_distance(old.megapixels, sample.megapixels)
                    .filter(|&distance| distance <= threshold)
                    .map(|distance| (index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index);
        match nearby {
            Some(index) => {
                let old = &samples[index];
                if sample.informativeness() >= old.informativeness() {
                    debug!(
                        "Size sample at {:.2} MP replaces {:.2} MP for {}",
                        sample.megapixels, old.megapixels, scenario
                    );
                    samples[index] = sample;
                } else {
                    debug!(
                        "Size sample at {:.2} MP dropped in favour of {:.2} MP for {}",
                        sample.megapixels, old.megapixels, scenario
                    );
                }
            }
            None => samples.push(sample),
        }

        if samples.len() > self.max_samples {
            let excess = samples.len() - self.max_samples;
            samples.drain(..excess);
        }

        if let Err(e) = self.store.save(SIZE_KEY, &self.samples).await {
            warn!("Failed to persist size samples: {}", e);
        }
    }

    /// Samples for a scenario, ordered by image size
    pub fn samples(&self, scenario: Scenario) -> Vec<ImageSizeSample> {
        let mut samples = self
            .samples
            .get(scenario.key())
            .cloned()
            .unwrap_or_default();
        samples.sort_by(|a, b| a.megapixels.total_cmp(&b.megapixels));
        samples
    }
}

/// Relative distance measured against the existing sample.
///
/// `None` when the existing size is zero and the new one differs from it.
fn relative_distance(old_mp: f64, new_mp: f64) -> Option<f64> {
    if old_mp <= 0.0 {
        return (new_mp == old_mp).then_some(0.0);
    }
    Some((new_mp - old_mp).abs() / old_mp)
}


#[cfg(test)]
mod tests {
    use super::*;

    fn within(old_mp: f64, new_mp: f64, threshold: f64) -> bool {
        relative_distance(old_mp, new_mp).is_some_and(|d| d <= threshold)
    }

    fn sample(mp: f64, interpreted_ms: f64, compiled_ms: f64) -> ImageSizeSample {
        ImageSizeSample::new(mp, interpreted_ms, compiled_ms).unwrap()
    }

    async fn open(dir: &std::path::Path, max: usize) -> SizeCorrelationStore {
        SizeCorrelationStore::load_from(JsonStore::new(dir), max, 0.05).await
    }

    #[tokio::test]
    async fn test_nearby_samples_merge_keeping_informative() {
        let dir = tempfile::tempdir().unwrap();
        let mut sizes = open(dir.path(), 100).await;

        sizes.record(Scenario::Invert, sample(4.00, 30.0, 10.0)).await;
        sizes.record(Scenario::Invert, sample(4.15, 12.0, 10.0)).await;

        let kept = sizes.samples(Scenario::Invert);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].megapixels, 4.00);
        assert_eq!(kept[0].speedup_ratio, 3.0);

        sizes.record(Scenario::Invert, sample(4.10, 50.0, 10.0)).await;
        let kept = sizes.samples(Scenario::Invert);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].megapixels, 4.10);
    }

    #[tokio::test]
    async fn test_merge_targets_nearest_sample() {
        let dir = tempfile::tempdir().unwrap();
        let mut sizes = open(dir.path(), 100).await;

        sizes.record(Scenario::Invert, sample(4.00, 20.0, 10.0)).await;
        sizes.record(Scenario::Invert, sample(4.38, 20.0, 10.0)).await;
        assert_eq!(sizes.samples(Scenario::Invert).len(), 2);

        // Within reach of both; 4.38 is the closer one
        sizes.record(Scenario::Invert, sample(4.19, 60.0, 10.0)).await;
        let mps: Vec<f64> = sizes
            .samples(Scenario::Invert)
            .iter()
            .map(|s| s.megapixels)
            .collect();
        assert_eq!(mps, vec![4.00, 4.19]);
    }

    #[tokio::test]
    async fn test_distant_samples_sorted_and_capped() {
        let dir = tempfile::tempdir().unwrap();
        let mut sizes = open(dir.path(), 3).await;

        for mp in [8.0, 1.0, 4.0, 2.0] {
            sizes.record(Scenario::Quantize, sample(mp, 20.0, 10.0)).await;
        }

        let mps: Vec<f64> = sizes
            .samples(Scenario::Quantize)
            .iter()
            .map(|s| s.megapixels)
            .collect();
        assert_eq!(mps, vec![1.0, 2.0, 4.0]);
        assert!(sizes.samples(Scenario::Invert).is_empty());
    }

    #[tokio::test]
    async fn test_samples_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut sizes = open(dir.path(), 100).await;
            sizes.record(Scenario::EdgeDetect, sample(0.5, 9.0, 3.0)).await;
        }
        let reopened = open(dir.path(), 100).await;
        let kept = reopened.samples(Scenario::EdgeDetect);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].speedup_ratio, 3.0);
    }

    #[test]
    fn test_within_is_relative_to_existing() {
        assert!(within(4.0, 4.15, 0.05));
        assert!(!within(4.0, 4.25, 0.05));
        assert!(!within(0.0, 0.1, 0.05));
    }
}
