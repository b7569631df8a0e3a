use burn::tensor::backend::Backend;

use crate::{
    datasets::{shift_token_ids, DatasetError},
    models::Tagger,
    utils::tensors::{argmax_classes, ids_to_tensor},
};

/// Predict one class id per raw token id.
///
/// Raw ids are shifted before the forward pass and must fit the vocabulary afterwards. The
/// model should already be in inference mode. An empty input gives an empty prediction without
/// running the model.
pub fn predict<B: Backend, M: Tagger<B>>(
    model: &M,
    raw_ids: &[i64],
    vocab_size: usize,
    device: &B::Device,
) -> Result<Vec<usize>, DatasetError> {
    let tokens = shift_token_ids(raw_ids)?;

    if let Some(&token) = tokens.iter().find(|&&token| token >= vocab_size) {
        return Err(DatasetError::OutOfVocabulary { token, vocab_size });
    }

    if tokens.is_empty() {
        return Ok(Vec::new());
    }

    let output = model.forward(ids_to_tensor::<B>(&tokens, device));

    Ok(argmax_classes(output))
}

#[cfg(test)]
mod tests {
    use burn::backend::NdArray;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::{ConvStackedConfig, Mode};

    type TestBackend = NdArray;

    #[test]
    fn predicts_one_class_per_token() {
        let device = Default::default();
        let mut model = ConvStackedConfig::new()
            .with_embedding_dim(4)
            .with_hidden_dim(4)
            .with_num_layers(1)
            .with_narrow_dim(8)
            .init::<TestBackend>(20, 12, &device);
        model.set_mode(Mode::Inference);

        for raw in [vec![-1], vec![2, 0, 6], (0..18).collect::<Vec<i64>>()] {
            let classes = predict(&model, &raw, 20, &device).unwrap();

            assert_eq!(classes.len(), raw.len());
            assert!(classes.iter().all(|&class| class < 12));
        }

        assert_eq!(predict(&model, &[], 20, &device).unwrap(), Vec::<usize>::new());
    }

    #[test]
    fn rejects_ids_outside_the_vocabulary() {
        let device = Default::default();
        let model = ConvStackedConfig::new()
            .with_embedding_dim(4)
            .with_hidden_dim(4)
            .init::<TestBackend>(5, 12, &device);

        assert!(matches!(
            predict(&model, &[4], 5, &device),
            Err(DatasetError::OutOfVocabulary {
                token: 5,
                vocab_size: 5
            })
        ));
        assert!(matches!(
            predict(&model, &[-2], 5, &device),
            Err(DatasetError::NegativeTokenId(-2))
        ));
    }
}
