use std::path::Path;

use burn::data::dataset::{Dataset as _, InMemDataset};
use derive_new::new;
use serde::{Deserialize, Serialize};

use super::{DatasetError, Example};

/// One lexed source file as stored in a corpus CSV
#[derive(Clone, Debug, Serialize, Deserialize, new)]
pub struct Row {
    /// An identifier for the source file
    pub file_id: String,

    /// Whitespace-separated raw lexer token ids
    pub tokens: String,

    /// Whitespace-separated class ids, one per token
    pub labels: String,
}

impl Row {
    /// Parse the row into a shifted example
    pub fn to_example(&self) -> Result<Example, DatasetError> {
        let tokens = parse_ids::<i64>(&self.file_id, &self.tokens)?;
        let labels = parse_ids::<usize>(&self.file_id, &self.labels)?;

        Example::from_raw(&tokens, labels)
    }
}

fn parse_ids<T: std::str::FromStr>(file_id: &str, value: &str) -> Result<Vec<T>, DatasetError> {
    value
        .split_whitespace()
        .map(|id| {
            id.parse().map_err(|_| DatasetError::MalformedId {
                file_id: file_id.to_string(),
                value: id.to_string(),
            })
        })
        .collect()
}

/// An ordered collection of examples
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Corpus {
    /// The parsed examples, in file order
    pub examples: Vec<Example>,
}

impl Corpus {
    /// Load a corpus from a CSV file with `file_id,tokens,labels` columns
    pub fn from_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let reader = csv::ReaderBuilder::new();

        let dataset: InMemDataset<Row> = InMemDataset::from_csv(path, &reader)
            .map_err(|e| anyhow!("Unable to read corpus {}: {}", path.display(), e))?;

        let examples = dataset
            .iter()
            .map(|row| row.to_example())
            .collect::<Result<Vec<_>, _>>()?;

        log::info!("Loaded {} examples from {}", examples.len(), path.display());

        Ok(Self { examples })
    }

    /// The number of examples
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    /// True if the corpus holds no examples
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }
}

impl From<Vec<Example>> for Corpus {
    fn from(examples: Vec<Example>) -> Self {
        Self { examples }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_rows() {
        let row = Row::new("a.java".to_string(), "2 0 6".to_string(), "0 4 4".to_string());

        let example = row.to_example().unwrap();

        assert_eq!(example.tokens(), &[3, 1, 7]);
        assert_eq!(example.labels(), &[0, 4, 4]);
    }

    #[test]
    fn rejects_malformed_ids() {
        let row = Row::new("b.java".to_string(), "2 x".to_string(), "0 1".to_string());

        assert!(matches!(
            row.to_example(),
            Err(DatasetError::MalformedId { value, .. }) if value == "x"
        ));
    }

    #[test]
    fn loads_csv_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "file_id,tokens,labels").unwrap();
        writeln!(file, "a.java,-1 4 4,0 1 1").unwrap();
        writeln!(file, "b.java,7,3").unwrap();

        let corpus = Corpus::from_csv(file.path()).unwrap();

        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.examples[0].tokens(), &[0, 5, 5]);
        assert_eq!(corpus.examples[1].labels(), &[3]);
    }
}
