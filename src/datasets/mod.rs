use serde::{Deserialize, Serialize};

/// Token/label examples
pub mod example;

/// CSV corpora of lexed source files
pub mod corpus;

/// Cached k-fold splits
pub mod folds;

pub use corpus::Corpus;
pub use example::{shift_token_ids, Example};
pub use folds::KFoldCache;

/// The disjoint example sets owned by one cross-validation fold
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldData {
    /// Training examples
    pub train: Vec<Example>,

    /// Validation examples, evaluated after every epoch
    pub validation: Vec<Example>,

    /// Held-out test examples
    pub test: Vec<Example>,

    /// Held-out snippet examples
    pub snippets: Vec<Example>,
}

impl FoldData {
    /// Check every example of every split against the vocabulary and taxonomy sizes
    pub fn validate(&self, vocab_size: usize, n_classes: usize) -> Result<(), DatasetError> {
        [&self.train, &self.validation, &self.test, &self.snippets]
            .into_iter()
            .flatten()
            .try_for_each(|example| example.validate(vocab_size, n_classes))
    }
}

/// A source of per-fold example sets
pub trait FoldSource {
    /// The number of folds available
    fn num_folds(&self) -> usize;

    /// Retrieve the example sets for a fold
    fn fold(&self, index: usize) -> anyhow::Result<FoldData>;
}

/// Dataset Error
#[derive(thiserror::Error, Debug)]
pub enum DatasetError {
    /// Tokens and labels differ in length
    #[error("sequence has {tokens} tokens but {labels} labels")]
    LengthMismatch {
        /// The number of tokens
        tokens: usize,
        /// The number of labels
        labels: usize,
    },

    /// A sequence without tokens
    #[error("sequence is empty")]
    EmptySequence,

    /// A raw token id that stays negative after shifting
    #[error("raw token id {0} is below -1")]
    NegativeTokenId(i64),

    /// A shifted token id outside the embedding table
    #[error("token id {token} is outside the vocabulary of size {vocab_size}")]
    OutOfVocabulary {
        /// The shifted token id
        token: usize,
        /// The vocabulary size
        vocab_size: usize,
    },

    /// A label id outside the taxonomy
    #[error("label {label} is outside the {n_classes} classes")]
    LabelOutOfRange {
        /// The label id
        label: usize,
        /// The number of classes
        n_classes: usize,
    },

    /// A fold index past the configured fold count
    #[error("no fold {index}, only {num_folds} folds are cached")]
    UnknownFold {
        /// The requested fold
        index: usize,
        /// The number of folds
        num_folds: usize,
    },

    /// A malformed id in a corpus row
    #[error("row {file_id}: unable to parse {value:?} as an id")]
    MalformedId {
        /// The file the row belongs to
        file_id: String,
        /// The offending value
        value: String,
    },
}
