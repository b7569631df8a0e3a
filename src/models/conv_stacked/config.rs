use burn::{
    nn::{DropoutConfig, EmbeddingConfig, LinearConfig},
    tensor::backend::Backend,
};

use super::ConvStacked;
use crate::models::{check_odd_kernel, check_positive, same_length_conv, ConfigError};

/// Kernel of the narrowing convolution before the output projection
pub const NARROWING_KERNEL_SIZE: usize = 5;

/// Stacked convolutional tagger configuration
#[derive(burn::config::Config, Debug)]
pub struct ConvStackedConfig {
    /// Embedding width
    #[config(default = 64)]
    pub embedding_dim: usize,

    /// Channels of each of the two parallel input convolutions
    #[config(default = 64)]
    pub hidden_dim: usize,

    /// Number of `2 * hidden_dim` convolutions stacked after the input convolutions
    #[config(default = 4)]
    pub num_layers: usize,

    /// Kernel of the first input convolution and the stacked convolutions
    #[config(default = 5)]
    pub kernel_size: usize,

    /// Kernel of the second input convolution
    #[config(default = 3)]
    pub kernel_size2: usize,

    /// Channels of the narrowing convolution
    #[config(default = 256)]
    pub narrow_dim: usize,

    /// Dropout probability
    #[config(default = 0.5)]
    pub dropout: f64,
}

impl ConvStackedConfig {
    /// Check the hyper-parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("embedding_dim", self.embedding_dim)?;
        check_positive("hidden_dim", self.hidden_dim)?;
        check_positive("narrow_dim", self.narrow_dim)?;
        check_odd_kernel(self.kernel_size)?;
        check_odd_kernel(self.kernel_size2)
    }

    /// Initialize a stacked convolutional tagger with random weights
    pub fn init<B: Backend>(
        &self,
        vocab_size: usize,
        n_classes: usize,
        device: &B::Device,
    ) -> ConvStacked<B> {
        let wide = 2 * self.hidden_dim;

        ConvStacked {
            embedding: EmbeddingConfig::new(vocab_size, self.embedding_dim).init(device),
            conv1: same_length_conv(self.embedding_dim, self.hidden_dim, self.kernel_size, device),
            conv2: same_length_conv(self.embedding_dim, self.hidden_dim, self.kernel_size2, device),
            stacked: (0..self.num_layers)
                .map(|_| same_length_conv(wide, wide, self.kernel_size, device))
                .collect(),
            narrow: same_length_conv(wide, self.narrow_dim, NARROWING_KERNEL_SIZE, device),
            output: LinearConfig::new(self.narrow_dim, n_classes).init(device),
            dropout: DropoutConfig::new(self.dropout).init(),
            inference: false,
        }
    }
}
