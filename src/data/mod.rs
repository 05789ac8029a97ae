// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between the pre-tokenized sample file and the
// batches handed to the model:
//
//   samples.json
//       │
//       ▼
//   SampleStore   → reads and validates the corpus
//       │
//       ▼
//   SampleSet     → ordered samples + derived vocab/author sizes
//       │
//       ▼
//   BatchSampler  → one lazy pass of padded batches from an offset
//
// Reference: Rust Book §13 (Iterators and Closures)

/// Loads the pre-tokenized JSON corpus
pub mod loader;

/// The in-memory corpus and its derived sizes
pub mod dataset;

/// Lazy single-pass batch iterator
pub mod batcher;
