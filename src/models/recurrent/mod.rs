/// Recurrent cells
pub mod cell;

/// Recurrent tagger configuration
pub mod config;

/// Recurrent tagger
pub mod model;

pub use config::{CellKind, RecurrentConfig};
pub use model::Recurrent;
