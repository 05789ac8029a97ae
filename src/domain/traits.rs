// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The training loop only ever talks to these two seams:
//
//   TrainableModel → anything that can take one optimisation
//                    step on a batch and persist its own state.
//                    Implementations:
//                      - ml::network::Network  (Burn LSTM + Adam)
//                      - test_support::RecordingModel (tests)
//
//   ProgressSink   → anything that wants per-step progress.
//                    Implementations:
//                      - infra::metrics::CsvProgressSink
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;
use std::path::Path;

use crate::domain::batch::SampleBatch;

// ─── TrainableModel ───────────────────────────────────────────────────────────
/// A model the training loop can drive without knowing its internals.
pub trait TrainableModel {
    /// Compute the loss on `batch`, back-propagate, and apply one
    /// optimiser update at `learning_rate`. Returns the loss value.
    fn train_step(&mut self, batch: &SampleBatch, learning_rate: f64) -> Result<f32>;

    /// Write the full numeric state (weights and optimiser moments)
    /// into the existing directory `dir`.
    fn save_state(&self, dir: &Path) -> Result<()>;

    /// Replace the current state with the one saved in `dir`.
    fn load_state(&mut self, dir: &Path) -> Result<()>;
}

// ─── ProgressSink ─────────────────────────────────────────────────────────────
/// What is reported after every batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    /// Global step *after* this batch
    pub step:          u64,
    pub epoch:         usize,
    pub loss:          f32,
    pub learning_rate: f64,
}

/// Receives per-step progress. Errors are logged by the caller
/// and never stop training.
pub trait ProgressSink {
    fn record(&mut self, report: &StepReport) -> Result<()>;
}

impl<S: ProgressSink + ?Sized> ProgressSink for &mut S {
    fn record(&mut self, report: &StepReport) -> Result<()> {
        (**self).record(report)
    }
}
