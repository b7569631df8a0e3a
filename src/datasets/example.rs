use serde::{Deserialize, Serialize};

use super::DatasetError;

/// Shift raw lexer token ids so they are non-negative.
///
/// Raw ids start at `-1`, so every id moves up by one and `0` becomes the smallest valid index
/// into the embedding table.
pub fn shift_token_ids(raw: &[i64]) -> Result<Vec<usize>, DatasetError> {
    raw.iter()
        .map(|&id| {
            let shifted = id + 1;

            usize::try_from(shifted).map_err(|_| DatasetError::NegativeTokenId(id))
        })
        .collect()
}

/// One unpadded training example: a token-id sequence and its index-aligned labels
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawExample")]
pub struct Example {
    tokens: Vec<usize>,
    labels: Vec<usize>,
}

/// The serialized form of an [`Example`], checked by [`Example::new`] when read back
#[derive(Deserialize)]
struct RawExample {
    tokens: Vec<usize>,
    labels: Vec<usize>,
}

impl TryFrom<RawExample> for Example {
    type Error = DatasetError;

    fn try_from(raw: RawExample) -> Result<Self, Self::Error> {
        Example::new(raw.tokens, raw.labels)
    }
}

impl Example {
    /// Create an example from already shifted token ids
    pub fn new(tokens: Vec<usize>, labels: Vec<usize>) -> Result<Self, DatasetError> {
        if tokens.is_empty() {
            return Err(DatasetError::EmptySequence);
        }

        if tokens.len() != labels.len() {
            return Err(DatasetError::LengthMismatch {
                tokens: tokens.len(),
                labels: labels.len(),
            });
        }

        Ok(Self { tokens, labels })
    }

    /// Create an example from raw lexer token ids, shifting them first
    pub fn from_raw(raw_tokens: &[i64], labels: Vec<usize>) -> Result<Self, DatasetError> {
        Self::new(shift_token_ids(raw_tokens)?, labels)
    }

    /// Check that every id fits the vocabulary and every label fits the taxonomy
    pub fn validate(&self, vocab_size: usize, n_classes: usize) -> Result<(), DatasetError> {
        if let Some(&token) = self.tokens.iter().find(|&&t| t >= vocab_size) {
            return Err(DatasetError::OutOfVocabulary { token, vocab_size });
        }

        if let Some(&label) = self.labels.iter().find(|&&l| l >= n_classes) {
            return Err(DatasetError::LabelOutOfRange { label, n_classes });
        }

        Ok(())
    }

    /// The shifted token ids
    pub fn tokens(&self) -> &[usize] {
        &self.tokens
    }

    /// The class ids, one per token
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// The sequence length
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Always false, examples are never empty
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn shifts_every_id_by_one() {
        let raw = [-1, 0, 5, 41];

        let shifted = shift_token_ids(&raw).unwrap();

        assert_eq!(shifted, vec![0, 1, 6, 42]);
        for (raw, shifted) in raw.iter().zip(shifted) {
            assert_eq!(shifted as i64, raw + 1);
        }
    }

    #[test]
    fn rejects_ids_below_minus_one() {
        assert!(matches!(
            shift_token_ids(&[3, -2]),
            Err(DatasetError::NegativeTokenId(-2))
        ));
    }

    #[test]
    fn requires_aligned_non_empty_sequences() {
        assert!(matches!(
            Example::new(vec![1, 2], vec![0]),
            Err(DatasetError::LengthMismatch {
                tokens: 2,
                labels: 1
            })
        ));
        assert!(matches!(
            Example::new(vec![], vec![]),
            Err(DatasetError::EmptySequence)
        ));

        let example = Example::from_raw(&[2, 0, 6], vec![0, 4, 4]).unwrap();
        assert_eq!(example.tokens(), &[3, 1, 7]);
        assert_eq!(example.len(), 3);
    }

    #[test]
    fn deserializing_checks_alignment() {
        let example: Example = serde_json::from_str(r#"{"tokens":[1,2],"labels":[0,3]}"#).unwrap();
        assert_eq!(example.labels(), &[0, 3]);

        let mismatched = serde_json::from_str::<Example>(r#"{"tokens":[1,2,3],"labels":[0]}"#);
        assert!(mismatched.unwrap_err().to_string().contains("3 tokens but 1 labels"));

        assert!(serde_json::from_str::<Example>(r#"{"tokens":[],"labels":[]}"#).is_err());
    }

    #[test]
    fn validates_vocabulary_and_taxonomy() {
        let example = Example::new(vec![3, 1, 7], vec![0, 4, 11]).unwrap();

        assert!(example.validate(8, 12).is_ok());
        assert!(matches!(
            example.validate(7, 12),
            Err(DatasetError::OutOfVocabulary { token: 7, .. })
        ));
        assert!(matches!(
            example.validate(8, 11),
            Err(DatasetError::LabelOutOfRange { label: 11, .. })
        ));
    }
}
