use std::path::PathBuf;

use burn::{
    module::Module,
    nn::{
        conv::{Conv1d, Conv1dConfig},
        PaddingConfig1d,
    },
    record::{CompactRecorder, Recorder, RecorderError},
    tensor::{activation::log_softmax, backend::Backend, Int, Tensor},
};
use serde::{Deserialize, Serialize};

/// Recurrent taggers (plain, gated and long short-term memory cells)
pub mod recurrent;

/// Dual-kernel stacked convolutional tagger
pub mod conv_stacked;

/// Convolutional encoder-decoder tagger with attention
pub mod conv_seq2seq;

pub use conv_seq2seq::{ConvSeq2Seq, ConvSeq2SeqConfig};
pub use conv_stacked::{ConvStacked, ConvStackedConfig};
pub use recurrent::{CellKind, Recurrent, RecurrentConfig};

/// Whether a tagger returns raw logits or normalized log-probabilities
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Mode {
    /// Raw logits, stochastic regularization enabled
    Training,
    /// Log-probabilities over the class axis, deterministic
    Inference,
}

/// A per-token classifier over one unbatched token-id sequence
pub trait Tagger<B: Backend> {
    /// Map `[seq_length]` shifted token ids to a `[seq_length, n_classes]` output.
    ///
    /// In [`Mode::Training`] the output holds raw logits, in [`Mode::Inference`] it holds
    /// log-probabilities.
    fn forward(&self, tokens: Tensor<B, 1, Int>) -> Tensor<B, 2>;

    /// The current mode
    fn mode(&self) -> Mode;

    /// Switch between training and inference
    fn set_mode(&mut self, mode: Mode);
}

/// Apply the output transformation of a mode to per-token logits
pub fn finish<B: Backend>(logits: Tensor<B, 2>, mode: Mode) -> Tensor<B, 2> {
    match mode {
        Mode::Training => logits,
        Mode::Inference => log_softmax(logits, 1),
    }
}

pub(crate) fn mode_of(inference: bool) -> Mode {
    if inference {
        Mode::Inference
    } else {
        Mode::Training
    }
}

/// A 1-D convolution whose output length equals its input length (for odd kernel sizes)
pub(crate) fn same_length_conv<B: Backend>(
    channels_in: usize,
    channels_out: usize,
    kernel_size: usize,
    device: &B::Device,
) -> Conv1d<B> {
    Conv1dConfig::new(channels_in, channels_out, kernel_size)
        .with_padding(PaddingConfig1d::Explicit((kernel_size - 1) / 2))
        .init(device)
}

pub(crate) fn check_odd_kernel(kernel_size: usize) -> Result<(), ConfigError> {
    if kernel_size % 2 == 1 {
        Ok(())
    } else {
        Err(ConfigError::EvenKernel(kernel_size))
    }
}

pub(crate) fn check_positive(name: &'static str, value: usize) -> Result<(), ConfigError> {
    if value > 0 {
        Ok(())
    } else {
        Err(ConfigError::Zero(name))
    }
}

/// Available tagging architectures and their hyper-parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Architecture {
    /// Recurrent stack
    Recurrent(RecurrentConfig),

    /// Dual-kernel stacked convolutions
    ConvStacked(ConvStackedConfig),

    /// Convolutional encoder-decoder with attention (experimental)
    #[serde(rename = "conv_seq2seq")]
    ConvSeq2Seq(ConvSeq2SeqConfig),
}

impl Architecture {
    /// A short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Architecture::Recurrent(config) => config.cell.as_str(),
            Architecture::ConvStacked(_) => "cnn",
            Architecture::ConvSeq2Seq(_) => "cnn-seq2seq",
        }
    }

    /// Check the hyper-parameters before any model is built
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Architecture::Recurrent(config) => config.validate(),
            Architecture::ConvStacked(config) => config.validate(),
            Architecture::ConvSeq2Seq(config) => config.validate(),
        }
    }
}

/// Any tagging architecture, for callers that pick one at runtime
#[derive(Debug, Clone)]
pub enum TaggerVariant<B: Backend> {
    /// Recurrent stack
    Recurrent(Recurrent<B>),

    /// Dual-kernel stacked convolutions
    ConvStacked(ConvStacked<B>),

    /// Convolutional encoder-decoder with attention
    ConvSeq2Seq(ConvSeq2Seq<B>),
}

impl<B: Backend> TaggerVariant<B> {
    /// Initialize a fresh model for an architecture
    pub fn init(
        architecture: &Architecture,
        vocab_size: usize,
        n_classes: usize,
        device: &B::Device,
    ) -> Self {
        match architecture {
            Architecture::Recurrent(config) => {
                Self::Recurrent(config.init(vocab_size, n_classes, device))
            }
            Architecture::ConvStacked(config) => {
                Self::ConvStacked(config.init(vocab_size, n_classes, device))
            }
            Architecture::ConvSeq2Seq(config) => {
                Self::ConvSeq2Seq(config.init(vocab_size, n_classes, device))
            }
        }
    }

    /// Rebuild an architecture and load its weights from a checkpoint file
    pub fn load(
        architecture: &Architecture,
        vocab_size: usize,
        n_classes: usize,
        checkpoint: PathBuf,
        device: &B::Device,
    ) -> anyhow::Result<Self> {
        let recorder = CompactRecorder::new();
        let failed = |e: RecorderError| {
            anyhow!("Unable to load trained model weights from {}: {}", checkpoint.display(), e)
        };

        let model = match architecture {
            Architecture::Recurrent(config) => {
                let record = recorder.load(checkpoint.clone(), device).map_err(failed)?;

                Self::Recurrent(config.init(vocab_size, n_classes, device).load_record(record))
            }
            Architecture::ConvStacked(config) => {
                let record = recorder.load(checkpoint.clone(), device).map_err(failed)?;

                Self::ConvStacked(config.init(vocab_size, n_classes, device).load_record(record))
            }
            Architecture::ConvSeq2Seq(config) => {
                let record = recorder.load(checkpoint.clone(), device).map_err(failed)?;

                Self::ConvSeq2Seq(config.init(vocab_size, n_classes, device).load_record(record))
            }
        };

        Ok(model)
    }
}

impl<B: Backend> Tagger<B> for TaggerVariant<B> {
    fn forward(&self, tokens: Tensor<B, 1, Int>) -> Tensor<B, 2> {
        match self {
            TaggerVariant::Recurrent(model) => model.forward(tokens),
            TaggerVariant::ConvStacked(model) => model.forward(tokens),
            TaggerVariant::ConvSeq2Seq(model) => model.forward(tokens),
        }
    }

    fn mode(&self) -> Mode {
        match self {
            TaggerVariant::Recurrent(model) => model.mode(),
            TaggerVariant::ConvStacked(model) => model.mode(),
            TaggerVariant::ConvSeq2Seq(model) => model.mode(),
        }
    }

    fn set_mode(&mut self, mode: Mode) {
        match self {
            TaggerVariant::Recurrent(model) => model.set_mode(mode),
            TaggerVariant::ConvStacked(model) => model.set_mode(mode),
            TaggerVariant::ConvSeq2Seq(model) => model.set_mode(mode),
        }
    }
}

/// Config Error
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Same-length convolutions need an odd kernel
    #[error("kernel size {0} must be odd to preserve the sequence length")]
    EvenKernel(usize),

    /// Attention heads must split the hidden width evenly
    #[error("hidden size {hidden} is not divisible by {heads} attention heads")]
    IndivisibleHeads {
        /// The hidden width
        hidden: usize,
        /// The number of heads
        heads: usize,
    },

    /// A size that must be positive
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}
