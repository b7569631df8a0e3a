use std::f64::consts::FRAC_1_SQRT_2;

use burn::{
    module::Module,
    nn::{
        attention::{MhaInput, MultiHeadAttention},
        conv::Conv1d,
        Dropout, Embedding, Linear,
    },
    tensor::{activation::sigmoid, backend::Backend, Int, Tensor},
};

use crate::{
    models::{finish, mode_of, Mode, Tagger},
    utils::tensors::ids_to_tensor,
};

/// Keeps the variance of residual sums constant
const SCALE: f64 = FRAC_1_SQRT_2;

/// A gated convolution followed by attention over the encoder output
#[derive(Module, Debug)]
pub struct DecoderBlock<B: Backend> {
    /// `hidden -> 2 * hidden` convolution, gated back to `hidden`
    pub conv: Conv1d<B>,

    /// Attention from the decoder state to the encoder output
    pub attention: MultiHeadAttention<B>,
}

/// Convolutional encoder-decoder tagger.
///
/// The encoder and decoder both read the whole input; there is no autoregressive decoding. Each
/// decoder block attends to the encoder output and produces one state per token.
#[derive(Module, Debug)]
pub struct ConvSeq2Seq<B: Backend> {
    /// Token embedding
    pub token_embedding: Embedding<B>,

    /// Learned position embedding
    pub position_embedding: Embedding<B>,

    /// Projection from the embedding width to the hidden width
    pub emb2hidden: Linear<B>,

    /// Gated encoder convolutions
    pub encoder: Vec<Conv1d<B>>,

    /// Gated decoder convolutions with attention
    pub decoder: Vec<DecoderBlock<B>>,

    /// Per-token projection to class scores
    pub output: Linear<B>,

    /// Dropout, applied in training mode only
    pub dropout: Dropout,

    /// Number of learned positions
    pub max_input_len: usize,

    /// Whether log-probabilities are returned
    pub inference: bool,
}

/// Gated linear unit over the channel axis of `[batch, 2 * channels, length]`
fn glu<B: Backend>(x: Tensor<B, 3>) -> Tensor<B, 3> {
    let [batch, channels, length] = x.dims();
    let half = channels / 2;

    let value = x.clone().slice([0..batch, 0..half, 0..length]);
    let gate = x.slice([0..batch, half..channels, 0..length]);

    value * sigmoid(gate)
}

impl<B: Backend> ConvSeq2Seq<B> {
    fn regularize<const D: usize>(&self, x: Tensor<B, D>) -> Tensor<B, D> {
        if self.inference {
            x
        } else {
            self.dropout.forward(x)
        }
    }

    /// `[seq_length]` ids to `[1, seq_length, embedding_dim]`
    fn embed(&self, tokens: Tensor<B, 1, Int>) -> Tensor<B, 3> {
        let [seq_length] = tokens.dims();
        let last_position = self.max_input_len.saturating_sub(1);

        let positions: Vec<usize> = (0..seq_length).map(|p| p.min(last_position)).collect();
        let positions = ids_to_tensor::<B>(&positions, &tokens.device()).reshape([1, seq_length]);

        let embedded = self.token_embedding.forward(tokens.reshape([1, seq_length]))
            + self.position_embedding.forward(positions);

        self.regularize(embedded)
    }

    /// `[1, hidden, seq_length]` to the encoder output of the same shape
    fn encode(&self, projected: Tensor<B, 3>) -> Tensor<B, 3> {
        self.encoder.iter().fold(projected, |x, conv| {
            let conved = glu(conv.forward(self.regularize(x.clone())));

            (conved + x).mul_scalar(SCALE)
        })
    }
}

impl<B: Backend> Tagger<B> for ConvSeq2Seq<B> {
    fn forward(&self, tokens: Tensor<B, 1, Int>) -> Tensor<B, 2> {
        let [seq_length] = tokens.dims();

        let embedded = self.embed(tokens);
        let projected = self.emb2hidden.forward(embedded);

        // Attention keys are the encoder states, values also carry the input embedding
        let encoded = self.encode(projected.clone().swap_dims(1, 2)).swap_dims(1, 2);
        let combined = (encoded.clone() + projected.clone()).mul_scalar(SCALE);

        let decoded = self
            .decoder
            .iter()
            .fold(projected.swap_dims(1, 2), |x, block| {
                let conved = glu(block.conv.forward(self.regularize(x.clone())));

                let attended = block
                    .attention
                    .forward(MhaInput::new(
                        conved.clone().swap_dims(1, 2),
                        encoded.clone(),
                        combined.clone(),
                    ))
                    .context
                    .swap_dims(1, 2);

                let conved = (conved + attended).mul_scalar(SCALE);

                (conved + x).mul_scalar(SCALE)
            })
            .swap_dims(1, 2);

        let [_, _, hidden] = decoded.dims();
        let logits = self
            .output
            .forward(self.regularize(decoded).reshape([seq_length, hidden]));

        finish(logits, self.mode())
    }

    fn mode(&self) -> Mode {
        mode_of(self.inference)
    }

    fn set_mode(&mut self, mode: Mode) {
        self.inference = mode == Mode::Inference;
    }
}
