mod history;
mod orchestrator;
mod size_tracker;
mod storage;

pub mod statistics;
pub mod trial_runner;
pub mod verification;

pub use history::HistoryStore;
pub use orchestrator::BenchmarkOrchestrator;
pub use size_tracker::SizeCorrelationStore;
pub use statistics::aggregate;
pub use storage::JsonStore;
pub use trial_runner::run_trial;
pub use verification::{compare_buffers, verify, DEFAULT_TOLERANCE};
