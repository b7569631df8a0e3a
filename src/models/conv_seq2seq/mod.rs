/// Encoder-decoder tagger configuration
pub mod config;

/// Encoder-decoder tagger
pub mod model;

pub use config::ConvSeq2SeqConfig;
pub use model::ConvSeq2Seq;
