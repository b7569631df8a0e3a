/// Run configuration
pub mod config;

/// Sequence losses
pub mod loss;

/// One training pass
pub mod training;

/// Split evaluation and scoring
pub mod evaluation;

/// Learning rate schedule
pub mod schedule;

/// Persisted run logs
pub mod logs;

/// Run logs and fold checkpoints on disk
pub mod artifacts;

/// The k-fold orchestrator
pub mod folds;

/// Prediction with a trained tagger
pub mod inference;

pub use artifacts::ArtifactStore;
pub use config::RunConfig;
pub use evaluation::{evaluate, AccuracyEvaluator, Evaluation, Evaluator, Split};
pub use folds::run;
pub use inference::predict;
pub use logs::{FoldLog, LogEntry, RunLog};
pub use loss::SequenceLoss;
pub use training::train_one_epoch;
