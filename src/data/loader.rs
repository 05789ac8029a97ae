// ============================================================
// Layer 4 — Sample Store
// ============================================================
// Loads the pre-tokenized corpus written by the preprocessor.
//
// File format (JSON):
//   {
//     "samples": [[12, 5, 88, ...], [3, 41, ...], ...],
//     "authors": [0, 2, ...]
//   }
//
// samples[i] is a token id sequence, authors[i] the integer id
// of whoever wrote it. The two arrays are parallel.
//
// Anything that would make training meaningless is rejected
// up front rather than discovered mid-run:
//   - missing or unreadable file
//   - malformed JSON or unknown fields
//   - samples/authors of different lengths
//   - a sequence too short to form an (input, target) pair
//   - no samples at all
//
// Reference: serde_json documentation
//            Rust Book §9 (Error Handling)

use serde::Deserialize;
use std::{fs, path::PathBuf};

use crate::data::dataset::SampleSet;
use crate::domain::error::TrainError;

/// Shortest sequence that still yields one (input, target) pair
const MIN_SEQUENCE_LEN: usize = 2;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SampleFile {
    samples: Vec<Vec<u32>>,
    authors: Vec<u32>,
}

/// Reads a SampleSet from a single JSON data file.
pub struct SampleStore {
    path: PathBuf,
}

impl SampleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<SampleSet, TrainError> {
        let raw = fs::read_to_string(&self.path)
            .map_err(|e| self.load_error(e.to_string()))?;

        let file: SampleFile = serde_json::from_str(&raw)
            .map_err(|e| self.load_error(e.to_string()))?;

        if file.samples.len() != file.authors.len() {
            return Err(self.load_error(format!(
                "{} samples but {} authors",
                file.samples.len(),
                file.authors.len()
            )));
        }

        if file.samples.is_empty() {
            return Err(TrainError::EmptyDataset { path: self.path.clone() });
        }

        if let Some(index) = file.samples.iter().position(|s| s.len() < MIN_SEQUENCE_LEN) {
            return Err(self.load_error(format!(
                "sample {index} has fewer than {MIN_SEQUENCE_LEN} tokens"
            )));
        }

        let set = SampleSet::new(file.samples, file.authors);
        tracing::info!(
            "Loaded {} samples from '{}' (vocab_size={}, author_size={})",
            set.len(),
            self.path.display(),
            set.vocab_size(),
            set.author_size(),
        );
        Ok(set)
    }

    fn load_error(&self, reason: String) -> TrainError {
        TrainError::DataLoad { path: self.path.clone(), reason }
    }
}
