use burn::{
    nn::{EmbeddingConfig, LinearConfig},
    tensor::backend::Backend,
};
use serde::{Deserialize, Serialize};

use super::{cell::Cell, model::Layer, Recurrent};
use crate::models::{check_positive, ConfigError};

/// The recurrence computed by each cell
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    /// `h' = tanh(W x + U h)`
    Rnn,

    /// Gated recurrent unit
    Gru,

    /// Long short-term memory
    Lstm,
}

impl CellKind {
    /// The number of stacked gate projections the cell needs
    pub fn gates(&self) -> usize {
        match self {
            CellKind::Rnn => 1,
            CellKind::Gru => 3,
            CellKind::Lstm => 4,
        }
    }

    /// The cell kind with `gates` stacked projections, if there is one
    pub fn from_gates(gates: usize) -> Option<Self> {
        match gates {
            1 => Some(CellKind::Rnn),
            3 => Some(CellKind::Gru),
            4 => Some(CellKind::Lstm),
            _ => None,
        }
    }

    /// The name used in configs and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            CellKind::Rnn => "rnn",
            CellKind::Gru => "gru",
            CellKind::Lstm => "lstm",
        }
    }
}

/// Recurrent tagger configuration
#[derive(burn::config::Config, Debug)]
pub struct RecurrentConfig {
    /// The recurrent cell
    pub cell: CellKind,

    /// Embedding width. A width of 0 or 1 disables the embedding and feeds raw ids.
    #[config(default = 64)]
    pub embedding_dim: usize,

    /// Hidden state width per direction
    #[config(default = 128)]
    pub hidden_dim: usize,

    /// Number of stacked recurrent layers
    #[config(default = 1)]
    pub num_layers: usize,

    /// Also run every layer right to left
    #[config(default = false)]
    pub bidirectional: bool,
}

impl RecurrentConfig {
    /// Check the hyper-parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("hidden_dim", self.hidden_dim)?;
        check_positive("num_layers", self.num_layers)
    }

    /// The per-token width of the last layer's output
    pub fn output_dim(&self) -> usize {
        if self.bidirectional {
            2 * self.hidden_dim
        } else {
            self.hidden_dim
        }
    }

    /// Initialize a recurrent tagger with random weights
    pub fn init<B: Backend>(
        &self,
        vocab_size: usize,
        n_classes: usize,
        device: &B::Device,
    ) -> Recurrent<B> {
        let embedding = (self.embedding_dim > 1)
            .then(|| EmbeddingConfig::new(vocab_size, self.embedding_dim).init(device));

        let input_dim = if embedding.is_some() {
            self.embedding_dim
        } else {
            1
        };

        let layers = (0..self.num_layers)
            .map(|layer| {
                let layer_input = if layer == 0 {
                    input_dim
                } else {
                    self.output_dim()
                };

                let cell = || Cell::new(self.cell, layer_input, self.hidden_dim, device);

                Layer {
                    forward_cell: cell(),
                    backward_cell: self.bidirectional.then(cell),
                }
            })
            .collect();

        Recurrent {
            embedding,
            layers,
            output: LinearConfig::new(self.output_dim(), n_classes).init(device),
            inference: false,
        }
    }
}
