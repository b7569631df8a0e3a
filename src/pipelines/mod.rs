/// Per-token tagging: training, evaluation and k-fold cross-validation
pub mod tagging;
