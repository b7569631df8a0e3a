use std::collections::BTreeMap;

use serde::{de, Deserialize, Deserializer, Serialize};

use super::{config::RunConfig, evaluation::Evaluation};

/// One entry of a fold log, persisted either as an evaluation object or as a bare number
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LogEntry {
    /// An evaluation of a split
    Eval(Evaluation),

    /// The summed training loss of one epoch
    Loss(f64),
}

impl LogEntry {
    /// The evaluation, if this entry holds one
    pub fn evaluation(&self) -> Option<&Evaluation> {
        match self {
            LogEntry::Eval(evaluation) => Some(evaluation),
            LogEntry::Loss(_) => None,
        }
    }

    /// The summed loss of the entry
    pub fn loss(&self) -> f64 {
        match self {
            LogEntry::Eval(evaluation) => evaluation.loss_sum,
            LogEntry::Loss(loss) => *loss,
        }
    }
}

// Untagged deserialization buffers map keys as strings, which the integer keys of `errs_map`
// cannot be read back from, so entries go through a JSON value instead.
impl<'de> Deserialize<'de> for LogEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;

        if let Some(loss) = value.as_f64() {
            return Ok(LogEntry::Loss(loss));
        }

        serde_json::from_value(value)
            .map(LogEntry::Eval)
            .map_err(de::Error::custom)
    }
}

/// Everything recorded while training one fold
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FoldLog {
    /// Baseline evaluation, one training loss per epoch, final evaluation
    pub train_logs: Vec<LogEntry>,

    /// Baseline evaluation, one evaluation per epoch, final evaluation
    pub val_logs: Vec<LogEntry>,

    /// Baseline and final evaluations
    pub test_logs: Vec<LogEntry>,

    /// Baseline and final evaluations of the snippets
    pub snippets_losses: Vec<LogEntry>,
}

/// The persisted record of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunLog {
    /// The configuration the run was started with
    pub config: RunConfig,

    /// Completed folds
    pub logs: BTreeMap<usize, FoldLog>,
}

impl RunLog {
    /// Start an empty log for a run
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            logs: BTreeMap::new(),
        }
    }
}
