use std::path::Path;

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};

use super::{Corpus, DatasetError, Example, FoldData, FoldSource};
use crate::utils::files::{read_json, write_json_atomic};

/// Precomputed k-fold splits of a corpus and a snippet corpus
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KFoldCache {
    folds: Vec<FoldData>,
}

impl KFoldCache {
    /// Split the corpora into `num_folds` folds.
    ///
    /// Fold `i` tests on every `num_folds`-th example of the shuffled corpus starting at `i`,
    /// validates on the last `validation_ratio` share of the remaining examples and trains on the
    /// rest. Snippets are assigned to folds the same way and only ever used for testing.
    pub fn build(
        corpus: &Corpus,
        snippets: &Corpus,
        num_folds: usize,
        validation_ratio: f64,
        seed: Option<u64>,
    ) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut order: Vec<usize> = (0..corpus.len()).collect();
        order.shuffle(&mut rng);

        let mut snippet_order: Vec<usize> = (0..snippets.len()).collect();
        snippet_order.shuffle(&mut rng);

        let folds = (0..num_folds)
            .map(|fold| {
                let (test, rest): (Vec<_>, Vec<_>) = order
                    .iter()
                    .enumerate()
                    .partition(|(position, _)| position % num_folds == fold);

                let n_validation = (rest.len() as f64 * validation_ratio).round() as usize;
                let split_at = rest.len() - n_validation.min(rest.len());

                let pick = |indices: &[(usize, &usize)]| -> Vec<Example> {
                    indices
                        .iter()
                        .map(|(_, i)| corpus.examples[**i].clone())
                        .collect()
                };

                let fold_snippets = snippet_order
                    .iter()
                    .enumerate()
                    .filter(|(position, _)| position % num_folds == fold)
                    .map(|(_, &i)| snippets.examples[i].clone())
                    .collect();

                FoldData {
                    train: pick(&rest[..split_at]),
                    validation: pick(&rest[split_at..]),
                    test: pick(&test),
                    snippets: fold_snippets,
                }
            })
            .collect();

        Self { folds }
    }

    /// Write the cache as JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        write_json_atomic(path, self)
    }

    /// Read a cache written by [`KFoldCache::save`]
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        read_json(path)
    }
}

impl FoldSource for KFoldCache {
    fn num_folds(&self) -> usize {
        self.folds.len()
    }

    fn fold(&self, index: usize) -> anyhow::Result<FoldData> {
        self.folds.get(index).cloned().ok_or_else(|| {
            DatasetError::UnknownFold {
                index,
                num_folds: self.folds.len(),
            }
            .into()
        })
    }
}
