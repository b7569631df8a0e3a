use burn::{
    module::Module,
    nn::{conv::Conv1d, Dropout, Embedding, Linear},
    tensor::{activation::relu, backend::Backend, Int, Tensor},
};

use crate::models::{finish, mode_of, Mode, Tagger};

/// Stacked convolutional tagger.
///
/// Two parallel convolutions with different kernels read the embedded sequence and their
/// channels are concatenated. Further same-length convolutions refine the result before a
/// narrowing convolution and a per-token linear projection.
#[derive(Module, Debug)]
pub struct ConvStacked<B: Backend> {
    /// Token embedding
    pub embedding: Embedding<B>,

    /// First input convolution
    pub conv1: Conv1d<B>,

    /// Second input convolution, with a different kernel
    pub conv2: Conv1d<B>,

    /// Stacked `2 * hidden_dim` convolutions
    pub stacked: Vec<Conv1d<B>>,

    /// Narrowing convolution
    pub narrow: Conv1d<B>,

    /// Per-token projection to class scores
    pub output: Linear<B>,

    /// Dropout, applied in training mode only
    pub dropout: Dropout,

    /// Whether log-probabilities are returned
    pub inference: bool,
}

impl<B: Backend> ConvStacked<B> {
    fn regularize<const D: usize>(&self, x: Tensor<B, D>) -> Tensor<B, D> {
        if self.inference {
            x
        } else {
            self.dropout.forward(x)
        }
    }
}

impl<B: Backend> Tagger<B> for ConvStacked<B> {
    fn forward(&self, tokens: Tensor<B, 1, Int>) -> Tensor<B, 2> {
        let [seq_length] = tokens.dims();

        // [1, seq_length, embedding_dim] -> [1, embedding_dim, seq_length]
        let embedded = self.embedding.forward(tokens.reshape([1, seq_length]));
        let x = self.regularize(embedded).swap_dims(1, 2);

        let x = Tensor::cat(vec![self.conv1.forward(x.clone()), self.conv2.forward(x)], 1);
        let x = self.regularize(relu(x));

        let x = self
            .stacked
            .iter()
            .fold(x, |x, conv| self.regularize(relu(conv.forward(x))));

        let x = relu(self.narrow.forward(x)).swap_dims(1, 2);
        let [_, _, narrow_dim] = x.dims();

        let logits = self.output.forward(x.reshape([seq_length, narrow_dim]));

        finish(logits, self.mode())
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
        models::{tests::assert_log_probabilities, ConfigError, ConvStackedConfig},
        utils::tensors::{ids_to_tensor, to_vec},
    };

    type TestBackend = NdArray;

    fn config() -> ConvStackedConfig {
        ConvStackedConfig::new()
            .with_embedding_dim(6)
            .with_hidden_dim(4)
            .with_num_layers(2)
            .with_narrow_dim(8)
    }

    #[test]
    fn convolutions_preserve_the_sequence_length() {
        let device = Default::default();
        let model = config().init::<TestBackend>(30, 12, &device);

        assert_eq!(model.stacked.len(), 2);

        for seq_length in [1, 2, 7, 40] {
            let ids: Vec<usize> = (0..seq_length).map(|i| i % 30).collect();

            let output = model.forward(ids_to_tensor(&ids, &device));

            assert_eq!(output.dims(), [seq_length, 12]);
        }
    }

    #[test]
    fn inference_is_deterministic_and_normalized() {
        let device = Default::default();
        let mut model = config().with_dropout(0.9).init::<TestBackend>(30, 12, &device);
        model.set_mode(Mode::Inference);

        let tokens = ids_to_tensor::<TestBackend>(&[5, 6, 7], &device);
        let first = model.forward(tokens.clone());
        let second = model.forward(tokens);

        assert_eq!(to_vec(first.clone()), to_vec(second));
        assert_log_probabilities(first);
    }

    #[test]
    fn second_kernel_must_be_odd() {
        assert_eq!(
            config().with_kernel_size2(2).validate(),
            Err(ConfigError::EvenKernel(2))
        );
    }
}
