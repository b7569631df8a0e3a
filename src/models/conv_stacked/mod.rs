/// Stacked convolutional tagger configuration
pub mod config;

/// Stacked convolutional tagger
pub mod model;

pub use config::ConvStackedConfig;
pub use model::ConvStacked;
