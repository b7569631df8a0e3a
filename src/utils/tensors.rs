use burn::tensor::{backend::Backend, Data, ElementConversion, Int, Shape, Tensor};

/// Build a 1-D integer tensor from a sequence of ids
pub fn ids_to_tensor<B: Backend>(ids: &[usize], device: &B::Device) -> Tensor<B, 1, Int> {
    Tensor::from_data(
        Data::<B::IntElem, 1>::new(
            ids.iter().map(|&id| (id as i64).elem()).collect(),
            Shape::new([ids.len()]),
        ),
        device,
    )
}

/// The index of the highest scoring class for each row of a `[seq_length, n_classes]` output
pub fn argmax_classes<B: Backend>(output: Tensor<B, 2>) -> Vec<usize> {
    let [seq_length, _] = output.dims();

    output
        .argmax(1)
        .reshape([seq_length])
        .into_data()
        .convert::<i64>()
        .value
        .into_iter()
        .map(|class| class as usize)
        .collect()
}

/// Read a float tensor back into a flat vector
pub fn to_vec<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Vec<f32> {
    tensor.into_data().convert::<f32>().value
}

#[cfg(test)]
mod tests {
    use burn::backend::NdArray;
    use pretty_assertions::assert_eq;

    use super::*;

    type TestBackend = NdArray;

    #[test]
    fn builds_id_tensors() {
        let device = Default::default();

        let tensor = ids_to_tensor::<TestBackend>(&[3, 1, 7], &device);

        assert_eq!(tensor.dims(), [3]);
        assert_eq!(tensor.into_data().convert::<i64>().value, vec![3, 1, 7]);
    }

    #[test]
    fn picks_the_best_class_per_row() {
        let device = Default::default();
        let output = Tensor::<TestBackend, 2>::from_floats(
            [[0.1, 0.7, 0.2], [0.9, 0.0, 0.1], [0.0, 0.2, 0.8]],
            &device,
        );

        assert_eq!(argmax_classes(output), vec![1, 0, 2]);
    }
}
