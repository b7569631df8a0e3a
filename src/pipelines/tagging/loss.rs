use burn::{
    nn::loss::CrossEntropyLoss,
    tensor::{backend::Backend, Int, Tensor},
};

/// A loss over the per-token output of one sequence
pub trait SequenceLoss<B: Backend> {
    /// Score a `[seq_length, n_classes]` output against `[seq_length]` class ids, giving `[1]`
    fn loss(&self, output: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> Tensor<B, 1>;
}

/// Cross entropy over logits. Log-probabilities give the same value, since `log_softmax` is
/// idempotent.
impl<B: Backend> SequenceLoss<B> for CrossEntropyLoss<B> {
    fn loss(&self, output: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> Tensor<B, 1> {
        self.forward(output, targets)
    }
}

#[cfg(test)]
mod tests {
    use burn::{
        backend::NdArray,
        nn::loss::CrossEntropyLossConfig,
        tensor::{activation::log_softmax, ElementConversion},
    };

    use super::*;
    use crate::utils::tensors::ids_to_tensor;

    type TestBackend = NdArray;

    #[test]
    fn normalized_outputs_score_like_logits() {
        let device = Default::default();
        let loss = CrossEntropyLossConfig::new().init::<TestBackend>(&device);
        let logits = Tensor::<TestBackend, 2>::from_floats([[2.0, 0.5], [0.1, 1.5]], &device);
        let targets = ids_to_tensor::<TestBackend>(&[0, 0], &device);

        let raw: f64 = loss
            .loss(logits.clone(), targets.clone())
            .into_scalar()
            .elem();
        let normalized: f64 = loss
            .loss(log_softmax(logits, 1), targets)
            .into_scalar()
            .elem();

        assert!((raw - normalized).abs() < 1e-5);
    }
}
