use burn::{
    nn::{attention::MultiHeadAttentionConfig, DropoutConfig, EmbeddingConfig, LinearConfig},
    tensor::backend::Backend,
};

use super::{model::DecoderBlock, ConvSeq2Seq};
use crate::models::{check_odd_kernel, check_positive, same_length_conv, ConfigError};

/// Convolutional encoder-decoder tagger configuration
#[derive(burn::config::Config, Debug)]
pub struct ConvSeq2SeqConfig {
    /// Token and position embedding width
    #[config(default = 64)]
    pub embedding_dim: usize,

    /// Channel width of every convolution block
    #[config(default = 128)]
    pub hidden_dim: usize,

    /// Number of learned positions. Later positions share the last one.
    #[config(default = 4096)]
    pub max_input_len: usize,

    /// Encoder kernel size
    #[config(default = 3)]
    pub enc_kernel_size: usize,

    /// Number of encoder blocks
    #[config(default = 4)]
    pub enc_num_layers: usize,

    /// Decoder kernel size
    #[config(default = 3)]
    pub dec_kernel_size: usize,

    /// Number of decoder blocks
    #[config(default = 2)]
    pub dec_num_layers: usize,

    /// Attention heads per decoder block
    #[config(default = 4)]
    pub num_heads: usize,

    /// Dropout probability
    #[config(default = 0.25)]
    pub dropout: f64,
}

impl ConvSeq2SeqConfig {
    /// Check the hyper-parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("embedding_dim", self.embedding_dim)?;
        check_positive("hidden_dim", self.hidden_dim)?;
        check_positive("max_input_len", self.max_input_len)?;
        check_positive("num_heads", self.num_heads)?;
        check_odd_kernel(self.enc_kernel_size)?;
        check_odd_kernel(self.dec_kernel_size)?;

        if self.hidden_dim % self.num_heads != 0 {
            return Err(ConfigError::IndivisibleHeads {
                hidden: self.hidden_dim,
                heads: self.num_heads,
            });
        }

        Ok(())
    }

    /// Initialize an encoder-decoder tagger with random weights
    pub fn init<B: Backend>(
        &self,
        vocab_size: usize,
        n_classes: usize,
        device: &B::Device,
    ) -> ConvSeq2Seq<B> {
        let hidden = self.hidden_dim;

        let encoder = (0..self.enc_num_layers)
            .map(|_| same_length_conv(hidden, 2 * hidden, self.enc_kernel_size, device))
            .collect();

        let decoder = (0..self.dec_num_layers)
            .map(|_| DecoderBlock {
                conv: same_length_conv(hidden, 2 * hidden, self.dec_kernel_size, device),
                attention: MultiHeadAttentionConfig::new(hidden, self.num_heads)
                    .with_dropout(0.0)
                    .init(device),
            })
            .collect();

        ConvSeq2Seq {
            token_embedding: EmbeddingConfig::new(vocab_size, self.embedding_dim).init(device),
            position_embedding: EmbeddingConfig::new(self.max_input_len, self.embedding_dim)
                .init(device),
            emb2hidden: LinearConfig::new(self.embedding_dim, hidden).init(device),
            encoder,
            decoder,
            output: LinearConfig::new(hidden, n_classes).init(device),
            dropout: DropoutConfig::new(self.dropout).init(),
            max_input_len: self.max_input_len,
            inference: false,
        }
    }
}
