#![allow(dead_code)]

use burn_highlighter::{
    datasets::{Corpus, Example, KFoldCache},
    models::{Architecture, ConvStackedConfig},
    pipelines::tagging::RunConfig,
};

pub const VOCAB_SIZE: usize = 16;

/// A corpus of short synthetic sequences where a token's class is its id modulo 12
pub fn corpus(n: usize) -> Corpus {
    (0..n)
        .map(|i| {
            let tokens: Vec<usize> = (0..(i % 5) + 1).map(|t| (i + t) % VOCAB_SIZE).collect();
            let labels = tokens.iter().map(|t| t % 12).collect();

            Example::new(tokens, labels).unwrap()
        })
        .collect::<Vec<_>>()
        .into()
}

pub fn folds(n: usize, num_folds: usize) -> KFoldCache {
    KFoldCache::build(&corpus(n), &corpus(num_folds * 2), num_folds, 0.25, Some(5))
}

pub fn config(num_folds: usize, max_epochs: usize) -> RunConfig {
    let model = ConvStackedConfig::new()
        .with_embedding_dim(4)
        .with_hidden_dim(4)
        .with_num_layers(1)
        .with_narrow_dim(8);

    RunConfig::new(Architecture::ConvStacked(model), VOCAB_SIZE)
        .with_num_folds(num_folds)
        .with_max_epochs(max_epochs)
        .with_log_interval(0)
}
