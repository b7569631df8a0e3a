use burn::{
    module::Module,
    nn::{Embedding, Linear},
    tensor::{backend::Backend, Int, Tensor},
};

use super::cell::Cell;
use crate::models::{finish, mode_of, Mode, Tagger};

/// One recurrent layer, optionally bidirectional
#[derive(Module, Debug)]
pub struct Layer<B: Backend> {
    /// Left-to-right cell
    pub forward_cell: Cell<B>,

    /// Right-to-left cell
    pub backward_cell: Option<Cell<B>>,
}

impl<B: Backend> Layer<B> {
    /// `[seq_length, input_dim]` to `[seq_length, directions * hidden_dim]`
    pub fn forward(&self, inputs: Tensor<B, 2>) -> Tensor<B, 2> {
        let forward = self.forward_cell.run(inputs.clone(), false);

        match &self.backward_cell {
            Some(cell) => Tensor::cat(vec![forward, cell.run(inputs, true)], 1),
            None => forward,
        }
    }
}

/// Recurrent tagger
#[derive(Module, Debug)]
pub struct Recurrent<B: Backend> {
    /// Token embedding, absent when raw ids are fed to the first layer
    pub embedding: Option<Embedding<B>>,

    /// Stacked recurrent layers
    pub layers: Vec<Layer<B>>,

    /// Per-token projection to class scores
    pub output: Linear<B>,

    /// Whether log-probabilities are returned
    pub inference: bool,
}

impl<B: Backend> Recurrent<B> {
    fn embed(&self, tokens: Tensor<B, 1, Int>) -> Tensor<B, 2> {
        let [seq_length] = tokens.dims();

        match &self.embedding {
            Some(embedding) => {
                let embedded = embedding.forward(tokens.reshape([1, seq_length]));
                let [_, _, d_model] = embedded.dims();

                embedded.reshape([seq_length, d_model])
            }
            None => tokens.float().reshape([seq_length, 1]),
        }
    }
}

impl<B: Backend> Tagger<B> for Recurrent<B> {
    fn forward(&self, tokens: Tensor<B, 1, Int>) -> Tensor<B, 2> {
        let hidden = self
            .layers
            .iter()
            .fold(self.embed(tokens), |hidden, layer| layer.forward(hidden));

        finish(self.output.forward(hidden), self.mode())
    }

    fn mode(&self) -> Mode {
        mode_of(self.inference)
    }

    fn set_mode(&mut self, mode: Mode) {
        self.inference = mode == Mode::Inference;
    }
}

#[cfg(test)]
mod tests {
    use burn::backend::NdArray;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        models::{tests::assert_log_probabilities, CellKind, RecurrentConfig},
        utils::tensors::ids_to_tensor,
    };

    type TestBackend = NdArray;

    // Both directions stay per token: slicing the singleton batch axis, not time, keeps every
    // step, even though a last-step-only reading of the layer would suggest otherwise.
    #[test]
    fn bidirectional_layers_tag_every_token() {
        let device = Default::default();
        let config = RecurrentConfig::new(CellKind::Lstm)
            .with_embedding_dim(6)
            .with_hidden_dim(4)
            .with_num_layers(2)
            .with_bidirectional(true);

        let model = config.init::<TestBackend>(20, 12, &device);

        assert_eq!(config.output_dim(), 8);
        assert_eq!(model.layers.len(), 2);
        assert!(model.layers[1].backward_cell.is_some());

        let output = model.forward(ids_to_tensor(&[1, 2, 3, 4, 5], &device));

        assert_eq!(output.dims(), [5, 12]);
    }

    #[test]
    fn raw_ids_skip_the_embedding() {
        let device = Default::default();
        let config = RecurrentConfig::new(CellKind::Rnn)
            .with_embedding_dim(1)
            .with_hidden_dim(3);

        let mut model = config.init::<TestBackend>(20, 12, &device);
        assert!(model.embedding.is_none());

        model.set_mode(Mode::Inference);
        let output = model.forward(ids_to_tensor(&[4, 9], &device));

        assert_eq!(output.dims(), [2, 12]);
        assert_log_probabilities(output);
    }

    #[test]
    fn single_token_sequences() {
        let device = Default::default();
        let model = RecurrentConfig::new(CellKind::Gru)
            .with_hidden_dim(4)
            .init::<TestBackend>(5, 12, &device);

        assert_eq!(model.forward(ids_to_tensor(&[2], &device)).dims(), [1, 12]);
    }
}
