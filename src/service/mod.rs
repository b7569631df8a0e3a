use std::{path::PathBuf, time::Instant};

use burn::tensor::backend::Backend;
use serde::{Deserialize, Serialize};

use crate::{
    datasets::DatasetError,
    models::{Mode, Tagger, TaggerVariant},
    oracle::{Language, LanguageError, OracleFormatter, OracleSolution},
    pipelines::tagging::{predict, ArtifactStore},
};

/// JSON-lines requests and responses
pub mod protocol;

/// The answer to a model evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalResponse {
    /// Wall time of the prediction, in nanoseconds
    pub ns: u64,

    /// One predicted class id per input token
    pub ps: Vec<usize>,
}

struct ActiveModel<B: Backend> {
    log_name: String,
    index: usize,
    vocab_size: usize,
    tagger: TaggerVariant<B>,
}

struct ActiveLexer {
    language: Language,
    formatter: OracleFormatter,
}

/// Highlighting requests against one loaded model and one loaded lexer.
///
/// Loading takes `&mut self` and evaluation takes `&self`, so a caller holding the service can
/// never replace the model while an evaluation borrows it. Loads replace the previous state.
pub struct HighlightService<B: Backend> {
    root: PathBuf,
    device: B::Device,
    model: Option<ActiveModel<B>>,
    lexer: Option<ActiveLexer>,
}

impl<B: Backend> HighlightService<B> {
    /// Create a service reading runs from `root`
    pub fn new<P: Into<PathBuf>>(root: P, device: B::Device) -> Self {
        Self {
            root: root.into(),
            device,
            model: None,
            lexer: None,
        }
    }

    /// The name and fold of the loaded model
    pub fn loaded_model(&self) -> Option<(&str, usize)> {
        self.model
            .as_ref()
            .map(|model| (model.log_name.as_str(), model.index))
    }

    /// The loaded lexer language
    pub fn loaded_language(&self) -> Option<Language> {
        self.lexer.as_ref().map(|lexer| lexer.language)
    }

    /// Rebuild the model of fold `index` of run `log_name` and make it active
    pub fn load_model(&mut self, log_name: &str, index: usize) -> Result<(), ServiceError> {
        let store = ArtifactStore::new(self.root.clone(), log_name);

        let (run_log, mut tagger) = store
            .load_model::<B>(index, &self.device)
            .map_err(ServiceError::Load)?;
        tagger.set_mode(Mode::Inference);

        log::info!(
            "Loaded {} fold {} ({})",
            log_name,
            index,
            run_log.config.model.name()
        );

        self.model = Some(ActiveModel {
            log_name: log_name.to_string(),
            index,
            vocab_size: run_log.config.vocab_size,
            tagger,
        });

        Ok(())
    }

    /// Predict one class per raw token id with the active model
    pub fn eval_model(&self, raw_ids: &[i64]) -> Result<EvalResponse, ServiceError> {
        let model = self.model.as_ref().ok_or(ServiceError::ModelNotLoaded)?;

        let start = Instant::now();
        let ps = predict(&model.tagger, raw_ids, model.vocab_size, &self.device)?;
        let ns = u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX);

        Ok(EvalResponse { ns, ps })
    }

    /// Activate the oracle bindings of a language
    pub fn load_lexer(&mut self, lang: &str) -> Result<Language, ServiceError> {
        let language = Language::try_from(lang)?;

        self.lexer = Some(ActiveLexer {
            language,
            formatter: OracleFormatter::new(language.bindings()),
        });

        log::info!("Loaded {} oracle bindings", language);

        Ok(language)
    }

    /// Bind a lexed `(token_type, text)` stream with the active lexer's bindings
    pub fn eval_oracle<I, T, S>(&self, tokens: I) -> Result<Vec<OracleSolution>, ServiceError>
    where
        I: IntoIterator<Item = (T, S)>,
        T: Into<String>,
        S: Into<String>,
    {
        let lexer = self.lexer.as_ref().ok_or(ServiceError::LexerNotLoaded)?;

        Ok(lexer.formatter.format(tokens))
    }
}

/// Service Error
#[derive(thiserror::Error, Debug)]
pub enum ServiceError {
    /// Model evaluation before any model was loaded
    #[error("no model is loaded")]
    ModelNotLoaded,

    /// Oracle evaluation before any lexer was loaded
    #[error("no lexer is loaded")]
    LexerNotLoaded,

    /// A lexer for an unknown language was requested
    #[error(transparent)]
    UnsupportedLanguage(#[from] LanguageError),

    /// Invalid token ids
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// A run log or checkpoint could not be loaded
    #[error("unable to load model: {0:#}")]
    Load(anyhow::Error),
}
