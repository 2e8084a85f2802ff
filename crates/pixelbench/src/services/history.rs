use std::collections::HashMap;

use tracing::{debug, info, warn};

use super::JsonStore;
use crate::config::Config;
use crate::types::{AggregatedStatistics, Implementation, PersistedRun, Scenario, ScenarioRun};
use crate::Result;

/// Rolling per-scenario history of comparison runs.
///
/// The in-memory rows are authoritative for this process and may carry the
/// median output buffers of the newest complete run. Every write is mirrored
/// to the session store with buffers stripped. A scenario's persisted rows are
/// read lazily the first time it is touched, which is how history survives a
/// restart of the process within one session.
pub struct HistoryStore {
    store: JsonStore,
    max_runs: usize,
    runs: HashMap<Scenario, Vec<ScenarioRun>>,
}

impl HistoryStore {
    pub fn new(config: &Config) -> Self {
        Self::with_store(
            JsonStore::new(&config.storage.session_dir),
            config.history.max_runs,
        )
    }

    pub fn with_store(store: JsonStore, max_runs: usize) -> Self {
        Self {
            store,
            max_runs: max_runs.max(1),
            runs: HashMap::new(),
        }
    }

    fn key(scenario: Scenario) -> String {
        format!("history-{}", scenario.key())
    }

    /// Add one side of a run.
    ///
    /// Fills the last run when it is still missing this implementation,
    /// otherwise starts a new run.
    pub async fn record(
        &mut self,
        scenario: Scenario,
        implementation: Implementation,
        stats: AggregatedStatistics,
    ) {
        self.ensure_loaded(scenario).await;
        let runs = self.runs.entry(scenario).or_default();

        match runs.last_mut() {
            Some(last) if !last.is_complete() && !last.has(implementation) => {
                *last.slot_mut(implementation) = Some(stats);
            }
            _ => {
                let mut run = ScenarioRun::default();
                *run.slot_mut(implementation) = Some(stats);
                runs.push(run);
            }
        }

        debug!("Recorded {} result for {}", implementation, scenario);
        self.commit(scenario).await;
    }

    /// Append a run as its own row, never merging it into an earlier one
    pub async fn record_run(&mut self, scenario: Scenario, run: ScenarioRun) {
        self.ensure_loaded(scenario).await;
        self.runs.entry(scenario).or_default().push(run);
        debug!("Recorded {} run", scenario);
        self.commit(scenario).await;
    }

    /// Strip superseded buffers, apply the cap and persist
    async fn commit(&mut self, scenario: Scenario) {
        let max_runs = self.max_runs;
        let runs = self.runs.entry(scenario).or_default();

        // A freshly completed run supersedes the buffers held by older ones
        if runs.last().is_some_and(ScenarioRun::is_complete) {
            let newest = runs.len() - 1;
            for run in &mut runs[..newest] {
                run.strip_outputs();
            }
        }

        truncate_front(runs, max_runs);
        let mut persisted: Vec<PersistedRun> = runs.iter().map(ScenarioRun::sanitize).collect();
        truncate_front(&mut persisted, max_runs);

        if let Err(e) = self.store.save(&Self::key(scenario), &persisted).await {
            warn!("Failed to persist {} history: {}", scenario, e);
        }
    }

    /// Runs for a scenario, oldest first
    pub async fn read(&mut self, scenario: Scenario) -> &[ScenarioRun] {
        self.ensure_loaded(scenario).await;
        self.runs.get(&scenario).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Remove both the in-memory and the persisted history of a scenario.
    ///
    /// The persisted copy goes first; if that fails nothing is changed.
    pub async fn clear(&mut self, scenario: Scenario) -> Result<()> {
        self.store.remove(&Self::key(scenario)).await?;
        self.runs.insert(scenario, Vec::new());
        info!("Cleared {} history", scenario);
        Ok(())
    }

    async fn ensure_loaded(&mut self, scenario: Scenario) {
        if self.runs.contains_key(&scenario) {
            return;
        }
        let mut runs: Vec<ScenarioRun> = match self
            .store
            .load::<Vec<PersistedRun>>(&Self::key(scenario))
            .await
        {
            Ok(Some(persisted)) => persisted.into_iter().map(PersistedRun::inflate).collect(),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Ignoring persisted {} history: {}", scenario, e);
                Vec::new()
            }
        };
        truncate_front(&mut runs, self.max_runs);
        if !runs.is_empty() {
            debug!("Loaded {} persisted {} runs", runs.len(), scenario);
        }
        self.runs.insert(scenario, runs);
    }
}

/// Keep only the last `max` elements
fn truncate_front<T>(items: &mut Vec<T>, max: usize) {
    if items.len() > max {
        let excess = items.len() - max;
        items.drain(..excess);
    }
}
