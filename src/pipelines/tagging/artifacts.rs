use std::path::PathBuf;

use burn::{
    module::Module,
    record::{CompactRecorder, Recorder},
    tensor::backend::Backend,
};

use super::logs::RunLog;
use crate::{
    models::TaggerVariant,
    utils::files::{read_json, write_json_atomic},
};

/// Where a run keeps its log and fold checkpoints.
///
/// The log lives at `<root>/<log_name>.json` and the checkpoint of fold `i` at
/// `<root>/<log_name>/fold-<i>` plus the recorder's extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactStore {
    root: PathBuf,
    log_name: String,
}

impl ArtifactStore {
    /// Create a store for one run
    pub fn new<P: Into<PathBuf>, S: Into<String>>(root: P, log_name: S) -> Self {
        Self {
            root: root.into(),
            log_name: log_name.into(),
        }
    }

    /// The run name
    pub fn log_name(&self) -> &str {
        &self.log_name
    }

    /// Path of the run log
    pub fn log_path(&self) -> PathBuf {
        self.root.join(format!("{}.json", self.log_name))
    }

    /// Path of a fold checkpoint, without the recorder extension
    pub fn checkpoint_path(&self, fold: usize) -> PathBuf {
        self.root.join(&self.log_name).join(format!("fold-{fold}"))
    }

    /// Replace the run log on disk
    pub fn save_log(&self, run_log: &RunLog) -> anyhow::Result<()> {
        let path = self.log_path();
        write_json_atomic(&path, run_log)?;

        log::debug!("Wrote {} fold logs to {}", run_log.logs.len(), path.display());

        Ok(())
    }

    /// Read the run log
    pub fn load_log(&self) -> anyhow::Result<RunLog> {
        read_json(self.log_path())
    }

    /// Save the weights of a fold's model
    pub fn save_checkpoint<B: Backend, M: Module<B>>(
        &self,
        model: M,
        fold: usize,
    ) -> anyhow::Result<()> {
        let path = self.checkpoint_path(fold);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        CompactRecorder::new()
            .record(model.into_record(), path.clone())
            .map_err(|e| anyhow!("Unable to save checkpoint {}: {}", path.display(), e))?;

        log::debug!("Saved checkpoint {}", path.display());

        Ok(())
    }

    /// Rebuild the model of a fold from the run log and its checkpoint
    pub fn load_model<B: Backend>(
        &self,
        fold: usize,
        device: &B::Device,
    ) -> anyhow::Result<(RunLog, TaggerVariant<B>)> {
        let run_log = self.load_log()?;

        if !run_log.logs.contains_key(&fold) {
            return Err(anyhow!(
                "Run {} has no completed fold {}",
                self.log_name,
                fold
            ));
        }

        let config = &run_log.config;
        let model = TaggerVariant::load(
            &config.model,
            config.vocab_size,
            config.n_classes,
            self.checkpoint_path(fold),
            device,
        )?;

        Ok((run_log, model))
    }
}

#[cfg(test)]
mod tests {
    use burn::backend::NdArray;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        models::{Architecture, CellKind, Mode, RecurrentConfig, Tagger},
        pipelines::tagging::{config::RunConfig, logs::FoldLog},
        utils::tensors::ids_to_tensor,
    };

    type TestBackend = NdArray;

    #[test]
    fn lays_out_runs_by_name() {
        let store = ArtifactStore::new("/tmp/runs", "lstm-a");

        assert_eq!(store.log_path(), PathBuf::from("/tmp/runs/lstm-a.json"));
        assert_eq!(
            store.checkpoint_path(2),
            PathBuf::from("/tmp/runs/lstm-a/fold-2")
        );
    }

    #[test]
    fn restores_checkpointed_weights() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path(), "gru");
        let device = Default::default();

        let recurrent = RecurrentConfig::new(CellKind::Gru)
            .with_embedding_dim(4)
            .with_hidden_dim(4);

        let mut run_log = RunLog::new(RunConfig::new(Architecture::Recurrent(recurrent.clone()), 10));
        run_log.logs.insert(0, FoldLog::default());
        store.save_log(&run_log).unwrap();

        let mut trained = recurrent.init::<TestBackend>(10, 12, &device);
        trained.set_mode(Mode::Inference);
        store.save_checkpoint(trained.clone(), 0).unwrap();

        let (_, mut loaded) = store.load_model::<TestBackend>(0, &device).unwrap();
        loaded.set_mode(Mode::Inference);

        // Checkpoints are stored at half precision
        let tokens = ids_to_tensor::<TestBackend>(&[1, 5, 9], &device);
        loaded
            .forward(tokens.clone())
            .into_data()
            .assert_approx_eq(&trained.forward(tokens).into_data(), 2);
    }

    #[test]
    fn missing_folds_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path(), "cnn");

        assert!(store.load_model::<TestBackend>(0, &Default::default()).is_err());
    }
}
