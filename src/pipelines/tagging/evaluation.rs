use std::{collections::BTreeMap, fmt};

use burn::{
    module::AutodiffModule,
    tensor::{
        backend::{AutodiffBackend, Backend},
        ElementConversion,
    },
};
use serde::{Deserialize, Serialize};

use super::loss::SequenceLoss;
use crate::{
    datasets::Example,
    models::{Mode, Tagger},
    utils::tensors::{argmax_classes, ids_to_tensor},
};

/// Number of bins in the per-sequence accuracy histogram
pub const HISTOGRAM_BINS: usize = 10;

/// The split an evaluation ran on. Only used to label logs.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Split {
    /// Training examples
    Train,
    /// Validation examples
    Validation,
    /// Held-out test examples
    Test,
    /// Held-out snippets
    Snippets,
}

impl Split {
    /// The log label
    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Validation => "validation",
            Split::Test => "test",
            Split::Snippets => "snippets",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Scores for one split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Mean per-sequence token accuracy
    pub avg_acc: f64,

    /// Sum of per-sequence losses
    pub loss_sum: f64,

    /// Misclassified token counts, by target class then predicted class
    pub errs_map: BTreeMap<usize, BTreeMap<usize, usize>>,

    /// Number of misclassified tokens per sequence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errs_obs: Option<Vec<usize>>,

    /// Histogram of per-sequence accuracy over equal-width bins of `[0, 1]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errs_hist: Option<Vec<usize>>,

    /// Predicted classes per sequence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seqs_p: Option<Vec<Vec<usize>>>,
}

/// Scores a tagger over a list of examples
pub trait Evaluator {
    /// Evaluate `model`, which is already in inference mode
    fn evaluate<B: Backend, M: Tagger<B>, L: SequenceLoss<B>>(
        &self,
        examples: &[Example],
        model: &M,
        loss: &L,
        device: &B::Device,
    ) -> anyhow::Result<Evaluation>;
}

/// Token accuracy with error maps
#[derive(Debug, Clone, Copy, Default)]
pub struct AccuracyEvaluator {
    /// Keep per-sequence error counts, the accuracy histogram and predictions
    pub keep_diagnostics: bool,
}

impl AccuracyEvaluator {
    /// Create an evaluator
    pub fn new(keep_diagnostics: bool) -> Self {
        Self { keep_diagnostics }
    }
}

fn histogram_bin(accuracy: f64) -> usize {
    ((accuracy * HISTOGRAM_BINS as f64) as usize).min(HISTOGRAM_BINS - 1)
}

impl Evaluator for AccuracyEvaluator {
    fn evaluate<B: Backend, M: Tagger<B>, L: SequenceLoss<B>>(
        &self,
        examples: &[Example],
        model: &M,
        loss: &L,
        device: &B::Device,
    ) -> anyhow::Result<Evaluation> {
        let mut acc_sum = 0.0;
        let mut loss_sum = 0.0;
        let mut errs_map: BTreeMap<usize, BTreeMap<usize, usize>> = BTreeMap::new();
        let mut errs_obs = Vec::with_capacity(examples.len());
        let mut errs_hist = vec![0; HISTOGRAM_BINS];
        let mut seqs_p = Vec::with_capacity(examples.len());

        for example in examples {
            let output = model.forward(ids_to_tensor::<B>(example.tokens(), device));

            let [seq_length, _] = output.dims();
            if seq_length != example.len() {
                return Err(anyhow!(
                    "Model produced {} outputs for a sequence of {} tokens",
                    seq_length,
                    example.len()
                ));
            }

            let targets = ids_to_tensor::<B>(example.labels(), device);
            loss_sum += loss
                .loss(output.clone(), targets)
                .into_scalar()
                .elem::<f64>();

            let predicted = argmax_classes(output);

            let mut errors = 0;
            for (&target, &class) in example.labels().iter().zip(&predicted) {
                if target != class {
                    errors += 1;
                    *errs_map.entry(target).or_default().entry(class).or_default() += 1;
                }
            }

            let accuracy = 1.0 - errors as f64 / seq_length as f64;
            acc_sum += accuracy;

            errs_obs.push(errors);
            errs_hist[histogram_bin(accuracy)] += 1;
            seqs_p.push(predicted);
        }

        let avg_acc = if examples.is_empty() {
            0.0
        } else {
            acc_sum / examples.len() as f64
        };

        let keep = self.keep_diagnostics;

        Ok(Evaluation {
            avg_acc,
            loss_sum,
            errs_map,
            errs_obs: keep.then_some(errs_obs),
            errs_hist: keep.then_some(errs_hist),
            seqs_p: keep.then_some(seqs_p),
        })
    }
}

/// Evaluate a training model on one split.
///
/// Scoring runs on a gradient-free copy of the model switched to inference mode. The training
/// model itself is not modified and stays in training mode.
pub fn evaluate<B, M, L, E>(
    examples: &[Example],
    model: &M,
    loss: &L,
    split: Split,
    evaluator: &E,
    device: &B::Device,
) -> anyhow::Result<Evaluation>
where
    B: AutodiffBackend,
    M: AutodiffModule<B>,
    M::InnerModule: Tagger<B::InnerBackend>,
    L: SequenceLoss<B::InnerBackend>,
    E: Evaluator,
{
    let mut inference = model.valid();
    inference.set_mode(Mode::Inference);

    let evaluation = evaluator.evaluate::<B::InnerBackend, _, _>(examples, &inference, loss, device)?;

    log::info!(
        "{} ({} examples): accuracy {:.4}, loss sum {:.4}",
        split,
        examples.len(),
        evaluation.avg_acc,
        evaluation.loss_sum
    );

    Ok(evaluation)
}

#[cfg(test)]
mod tests {
    use burn::{
        backend::{Autodiff, NdArray},
        nn::loss::CrossEntropyLossConfig,
    };
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::{ConvStackedConfig, Tagger};

    type TestBackend = Autodiff<NdArray>;
    type InnerBackend = NdArray;

    fn examples() -> Vec<Example> {
        vec![
            Example::new(vec![3, 1, 7], vec![0, 4, 4]).unwrap(),
            Example::new(vec![5, 5, 5, 5], vec![1, 2, 3, 4]).unwrap(),
        ]
    }

    #[test]
    fn scores_without_touching_the_training_model() {
        let device = Default::default();
        let model = ConvStackedConfig::new()
            .with_embedding_dim(4)
            .with_hidden_dim(4)
            .with_num_layers(1)
            .with_narrow_dim(4)
            .init::<TestBackend>(10, 12, &device);
        let loss = CrossEntropyLossConfig::new().init::<InnerBackend>(&device);

        let evaluation = evaluate(
            &examples(),
            &model,
            &loss,
            Split::Validation,
            &AccuracyEvaluator::new(true),
            &device,
        )
        .unwrap();

        assert_eq!(model.mode(), Mode::Training);
        assert!((0.0..=1.0).contains(&evaluation.avg_acc));
        assert!(evaluation.loss_sum > 0.0);

        let errs_obs = evaluation.errs_obs.unwrap();
        let errors: usize = errs_obs.iter().sum();
        let mapped: usize = evaluation.errs_map.values().flat_map(|m| m.values()).sum();
        assert_eq!(errors, mapped);

        assert_eq!(evaluation.errs_hist.unwrap().iter().sum::<usize>(), 2);
        assert_eq!(
            evaluation.seqs_p.unwrap().iter().map(Vec::len).collect::<Vec<_>>(),
            vec![3, 4]
        );
    }

    #[test]
    fn empty_splits_score_zero() {
        let device = Default::default();
        let model = ConvStackedConfig::new()
            .with_embedding_dim(4)
            .with_hidden_dim(4)
            .with_num_layers(0)
            .init::<TestBackend>(10, 12, &device);
        let loss = CrossEntropyLossConfig::new().init::<InnerBackend>(&device);

        let evaluation = evaluate(
            &[],
            &model,
            &loss,
            Split::Snippets,
            &AccuracyEvaluator::default(),
            &device,
        )
        .unwrap();

        assert_eq!(evaluation.avg_acc, 0.0);
        assert_eq!(evaluation.loss_sum, 0.0);
        assert!(evaluation.errs_map.is_empty());
        assert_eq!(evaluation.errs_obs, None);
    }

    #[test]
    fn diagnostics_are_omitted_from_json() {
        let evaluation = Evaluation {
            avg_acc: 0.5,
            loss_sum: 1.25,
            errs_map: BTreeMap::from([(4, BTreeMap::from([(0, 2)]))]),
            errs_obs: None,
            errs_hist: None,
            seqs_p: None,
        };

        let json = serde_json::to_value(&evaluation).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "avg_acc": 0.5,
                "loss_sum": 1.25,
                "errs_map": { "4": { "0": 2 } }
            })
        );
    }

    #[test]
    fn perfect_sequences_land_in_the_last_bin() {
        assert_eq!(histogram_bin(1.0), HISTOGRAM_BINS - 1);
        assert_eq!(histogram_bin(0.0), 0);
        assert_eq!(histogram_bin(0.55), 5);
    }
}
