use std::fmt::Display;

use crate::models::{
    Architecture, CellKind, ConvSeq2SeqConfig, ConvStackedConfig, RecurrentConfig,
};

/// Named architectures with their default hyper-parameters
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Preset {
    /// Plain recurrent network
    Rnn,
    /// Gated recurrent units
    Gru,
    /// Long short-term memory
    Lstm,
    /// Bidirectional long short-term memory
    BiLstm,
    /// Dual-kernel stacked convolutions
    Cnn,
    /// Convolutional encoder-decoder with attention
    CnnSeq2Seq,
}

impl Preset {
    /// All presets, in help order
    pub const ALL: [Preset; 6] = [
        Preset::Rnn,
        Preset::Gru,
        Preset::Lstm,
        Preset::BiLstm,
        Preset::Cnn,
        Preset::CnnSeq2Seq,
    ];

    /// Get the unique string token that identifies this preset
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Rnn => "rnn",
            Preset::Gru => "gru",
            Preset::Lstm => "lstm",
            Preset::BiLstm => "bilstm",
            Preset::Cnn => "cnn",
            Preset::CnnSeq2Seq => "cnn-seq2seq",
        }
    }

    /// The architecture this preset stands for
    pub fn architecture(&self) -> Architecture {
        match self {
            Preset::Rnn => Architecture::Recurrent(RecurrentConfig::new(CellKind::Rnn)),
            Preset::Gru => Architecture::Recurrent(RecurrentConfig::new(CellKind::Gru)),
            Preset::Lstm => Architecture::Recurrent(RecurrentConfig::new(CellKind::Lstm)),
            Preset::BiLstm => Architecture::Recurrent(
                RecurrentConfig::new(CellKind::Lstm).with_bidirectional(true),
            ),
            Preset::Cnn => Architecture::ConvStacked(ConvStackedConfig::new()),
            Preset::CnnSeq2Seq => Architecture::ConvSeq2Seq(ConvSeq2SeqConfig::new()),
        }
    }
}

impl TryFrom<&str> for Preset {
    type Error = ModelError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let value = value.to_lowercase();

        Preset::ALL
            .into_iter()
            .find(|preset| preset.as_str() == value)
            .ok_or(ModelError::Unknown(value))
    }
}

impl Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Model Error
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ModelError {
    /// No model found for the given string
    #[error("no model found for {0}")]
    Unknown(String),
}
