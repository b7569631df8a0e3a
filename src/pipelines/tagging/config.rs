use std::{fs, path::Path};

use burn::LearningRate;

use crate::{
    models::{check_positive, Architecture},
    oracle::NUM_CLASSES,
};

/// Configuration for one cross-validated training run
#[derive(burn::config::Config, Debug)]
pub struct RunConfig {
    /// The architecture and its hyper-parameters
    pub model: Architecture,

    /// Size of the shifted token vocabulary
    pub vocab_size: usize,

    /// Number of highlighting classes
    #[config(default = "NUM_CLASSES")]
    pub n_classes: usize,

    /// Number of cross-validation folds
    #[config(default = 3)]
    pub num_folds: usize,

    /// Number of training epochs per fold
    #[config(default = 10)]
    pub max_epochs: usize,

    /// Initial learning rate
    #[config(default = 1e-3)]
    pub learning_rate: LearningRate,

    /// Factor applied to the learning rate after every epoch but the last
    #[config(default = 0.9)]
    pub lr_decay: f64,

    /// Adam epsilon
    #[config(default = 1e-8)]
    pub adam_epsilon: f32,

    /// AdamW weight decay
    #[config(default = 0.0)]
    pub weight_decay: f32,

    /// Seed for parameter initialization, and for fold splits when `seeded` is set
    #[config(default = 42)]
    pub seed: u64,

    /// Seed the fold split. Unseeded splits draw from entropy and are not repeatable.
    #[config(default = true)]
    pub seeded: bool,

    /// Share of each fold's non-test examples held out for validation
    #[config(default = 0.1)]
    pub validation_ratio: f64,

    /// Report training progress every this many examples
    #[config(default = 1000)]
    pub log_interval: usize,

    /// Keep per-sequence diagnostics in evaluation records
    #[config(default = false)]
    pub keep_diagnostics: bool,
}

impl RunConfig {
    /// Load a run configuration from a YAML or JSON file, chosen by extension
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| anyhow!("Unable to read run config {}: {}", path.display(), e))?;

        let config: Self = match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&contents)
                .map_err(|e| anyhow!("Unable to parse run config {}: {}", path.display(), e))?,
            _ => serde_json::from_str(&contents)
                .map_err(|e| anyhow!("Unable to parse run config {}: {}", path.display(), e))?,
        };

        config.validate()?;

        Ok(config)
    }

    /// Check the run before any fold starts
    pub fn validate(&self) -> anyhow::Result<()> {
        self.model.validate()?;
        check_positive("vocab_size", self.vocab_size)?;
        check_positive("n_classes", self.n_classes)?;
        check_positive("num_folds", self.num_folds)?;

        // The exponential scheduler only accepts rates and decays in (0, 1]
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(anyhow!(
                "learning_rate must be in (0, 1], got {}",
                self.learning_rate
            ));
        }

        if !(self.lr_decay > 0.0 && self.lr_decay <= 1.0) {
            return Err(anyhow!("lr_decay must be in (0, 1], got {}", self.lr_decay));
        }

        if !(0.0..1.0).contains(&self.validation_ratio) {
            return Err(anyhow!(
                "validation_ratio must be in [0, 1), got {}",
                self.validation_ratio
            ));
        }

        Ok(())
    }

    /// The seed for fold splitting, if the run is seeded
    pub fn split_seed(&self) -> Option<u64> {
        self.seeded.then_some(self.seed)
    }

    /// The backend seed for one fold's initialization, applied whether or not the split is seeded
    pub fn fold_seed(&self, fold: usize) -> u64 {
        self.seed.wrapping_add(fold as u64)
    }
}
