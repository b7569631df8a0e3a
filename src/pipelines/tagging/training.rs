use burn::{
    module::AutodiffModule,
    optim::{GradientsParams, Optimizer},
    tensor::{backend::AutodiffBackend, ElementConversion},
    LearningRate,
};

use super::loss::SequenceLoss;
use crate::{datasets::Example, models::Tagger, utils::tensors::ids_to_tensor};

/// Run one pass over `examples`, taking one optimizer step per example.
///
/// Sequences are not padded, so every example is its own batch. Examples are visited in the
/// given order. Returns the updated model and the sum of the per-example losses.
pub fn train_one_epoch<B, M, L, O>(
    examples: &[Example],
    mut model: M,
    loss: &L,
    optimizer: &mut O,
    learning_rate: LearningRate,
    device: &B::Device,
    log_interval: usize,
) -> anyhow::Result<(M, f64)>
where
    B: AutodiffBackend,
    M: AutodiffModule<B> + Tagger<B>,
    L: SequenceLoss<B>,
    O: Optimizer<M, B>,
{
    let mut loss_sum = 0.0;

    for (i, example) in examples.iter().enumerate() {
        let tokens = ids_to_tensor::<B>(example.tokens(), device);
        let targets = ids_to_tensor::<B>(example.labels(), device);

        let output = model.forward(tokens);

        let [seq_length, _] = output.dims();
        if seq_length != example.len() {
            return Err(anyhow!(
                "Model produced {} outputs for a sequence of {} tokens",
                seq_length,
                example.len()
            ));
        }

        let loss = loss.loss(output, targets);
        loss_sum += loss.clone().into_scalar().elem::<f64>();

        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &model);
        model = optimizer.step(learning_rate, model, grads);

        if log_interval > 0 && (i + 1) % log_interval == 0 {
            log::info!(
                "Trained {}/{} examples, loss sum {:.4}",
                i + 1,
                examples.len(),
                loss_sum
            );
        }
    }

    Ok((model, loss_sum))
}

#[cfg(test)]
mod tests {
    use burn::{
        backend::{Autodiff, NdArray},
        module::Module,
        nn::{loss::CrossEntropyLossConfig, Embedding, EmbeddingConfig},
        optim::{AdamWConfig, SgdConfig},
        tensor::{backend::Backend, Int, Tensor},
    };
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        models::{CellKind, Mode, RecurrentConfig},
        utils::tensors::to_vec,
    };

    type TestBackend = Autodiff<NdArray>;

    /// Looks each token's scores up directly
    #[derive(Module, Debug)]
    struct Lookup<B: Backend> {
        scores: Embedding<B>,
    }

    impl<B: Backend> Tagger<B> for Lookup<B> {
        fn forward(&self, tokens: Tensor<B, 1, Int>) -> Tensor<B, 2> {
            let [seq_length] = tokens.dims();
            let scores = self.scores.forward(tokens.reshape([1, seq_length]));
            let [_, _, n_classes] = scores.dims();

            scores.reshape([seq_length, n_classes])
        }

        fn mode(&self) -> Mode {
            Mode::Training
        }

        fn set_mode(&mut self, _mode: Mode) {}
    }

    /// Always zero, but still attached to the graph
    struct ZeroLoss;

    impl<B: Backend> SequenceLoss<B> for ZeroLoss {
        fn loss(&self, output: Tensor<B, 2>, _targets: Tensor<B, 1, Int>) -> Tensor<B, 1> {
            output.sum().mul_scalar(0.0)
        }
    }

    #[test]
    fn zero_loss_leaves_the_model_unchanged() {
        let device = Default::default();
        let model = Lookup::<TestBackend> {
            scores: EmbeddingConfig::new(10, 12).init(&device),
        };
        let before = to_vec(model.scores.weight.val());

        let examples = vec![Example::new(vec![3, 1, 7], vec![0, 4, 4]).unwrap()];
        let mut optimizer = SgdConfig::new().init();

        let (model, loss_sum) =
            train_one_epoch(&examples, model, &ZeroLoss, &mut optimizer, 0.1, &device, 1)
                .unwrap();

        assert_eq!(loss_sum, 0.0);
        assert_eq!(to_vec(model.scores.weight.val()), before);
    }

    #[test]
    fn returns_the_sum_of_example_losses() {
        let device = Default::default();
        let model = RecurrentConfig::new(CellKind::Lstm)
            .with_embedding_dim(4)
            .with_hidden_dim(4)
            .init::<TestBackend>(10, 12, &device);

        let examples = vec![
            Example::new(vec![3, 1, 7], vec![0, 4, 4]).unwrap(),
            Example::new(vec![2, 2], vec![1, 1]).unwrap(),
        ];
        let loss = CrossEntropyLossConfig::new().init(&device);
        let mut optimizer = AdamWConfig::new().init();

        let (_, loss_sum) =
            train_one_epoch(&examples, model, &loss, &mut optimizer, 1e-3, &device, 0).unwrap();

        // Two cross entropies near ln(12) each
        assert!(loss_sum > 2.0 && loss_sum < 10.0, "loss sum {loss_sum}");
    }
}
