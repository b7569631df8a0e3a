use burn::lr_scheduler::exponential::{ExponentialLrScheduler, ExponentialLrSchedulerConfig};

use super::config::RunConfig;

/// Build the per-epoch learning rate schedule of a run.
///
/// The scheduler is stepped once at the start of every epoch. The first step returns
/// `learning_rate` and every later one multiplies it by `lr_decay`.
pub fn epoch_schedule(config: &RunConfig) -> ExponentialLrScheduler {
    ExponentialLrSchedulerConfig::new(config.learning_rate, config.lr_decay).init()
}
