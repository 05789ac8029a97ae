// ============================================================
// Layer 4 — Batch Sampler
// ============================================================
// Turns a slice of samples into a lazy, finite sequence of
// SampleBatch values. One sampler covers one pass over its
// slice; the training loop builds a new one for every epoch,
// starting at the resume offset on the first resumed epoch.
//
// How batching works here:
//   Input:  samples[offset..], authors[offset..], batch_size B
//   Output: ceil(len / B) batches of consecutive samples
//
//   Each sample is split into (input, target) by a
//   TargetEncoding. Rows are then right-padded with PAD_TOKEN
//   to the longest row in their batch.
//
// Short final batch:
//   When len is not a multiple of B the last batch simply has
//   fewer rows. It is not padded with extra rows and it is not
//   dropped, so every sample is trained exactly once per epoch
//   and ceil(len / B) steps make up an epoch.
//
// Reference: Rust Book §13 (Iterators and Closures)

use std::{iter::Zip, slice::Chunks};

use crate::domain::batch::{SampleBatch, PAD_TOKEN};

// ─── TargetEncoding ───────────────────────────────────────────────────────────
/// Derives the model input and the training target from one sample.
pub trait TargetEncoding {
    fn encode(&self, tokens: &[u32]) -> (Vec<u32>, Vec<u32>);
}

/// Next-token prediction: position i of the input predicts
/// token i + 1 of the sample.
#[derive(Debug, Clone, Copy, Default)]
pub struct NextTokenShift;

impl TargetEncoding for NextTokenShift {
    fn encode(&self, tokens: &[u32]) -> (Vec<u32>, Vec<u32>) {
        if tokens.len() < 2 {
            return (Vec::new(), Vec::new());
        }
        (tokens[..tokens.len() - 1].to_vec(), tokens[1..].to_vec())
    }
}

// ─── BatchSampler ─────────────────────────────────────────────────────────────
pub struct BatchSampler<'a, E = NextTokenShift> {
    chunks:   Zip<Chunks<'a, Vec<u32>>, Chunks<'a, u32>>,
    encoding: E,
}

/// Batch `samples` and `authors` with next-token targets.
///
/// Panics if `batch_size` is zero.
pub fn batches<'a>(
    samples:    &'a [Vec<u32>],
    authors:    &'a [u32],
    batch_size: usize,
) -> BatchSampler<'a, NextTokenShift> {
    BatchSampler::with_encoding(samples, authors, batch_size, NextTokenShift)
}

impl<'a, E: TargetEncoding> BatchSampler<'a, E> {
    pub fn with_encoding(
        samples:    &'a [Vec<u32>],
        authors:    &'a [u32],
        batch_size: usize,
        encoding:   E,
    ) -> Self {
        assert_eq!(samples.len(), authors.len(), "samples and authors must be parallel");
        Self {
            chunks: samples.chunks(batch_size).zip(authors.chunks(batch_size)),
            encoding,
        }
    }

    fn build(&self, samples: &[Vec<u32>], authors: &[u32]) -> SampleBatch {
        let (inputs, targets): (Vec<_>, Vec<_>) =
            samples.iter().map(|s| self.encoding.encode(s)).unzip();

        let lengths: Vec<usize> = inputs.iter().map(Vec::len).collect();
        let width = lengths.iter().copied().max().unwrap_or(0);

        SampleBatch {
            sequences: inputs.into_iter().map(|row| pad(row, width)).collect(),
            targets:   targets.into_iter().map(|row| pad(row, width)).collect(),
            authors:   authors.to_vec(),
            lengths,
        }
    }
}

impl<E: TargetEncoding> Iterator for BatchSampler<'_, E> {
    type Item = SampleBatch;

    fn next(&mut self) -> Option<SampleBatch> {
        let (samples, authors) = self.chunks.next()?;
        Some(self.build(samples, authors))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl<E: TargetEncoding> ExactSizeIterator for BatchSampler<'_, E> {}

fn pad(mut row: Vec<u32>, width: usize) -> Vec<u32> {
    row.resize(width, PAD_TOKEN);
    row
}
