// ============================================================
// Layer 5 — Training Loop / Resumption Engine
// ============================================================
// Drives any TrainableModel through the configured number of
// epochs, picking up exactly where the last checkpoint left off.
//
// Phases:
//   ResolvingConfig → LoadingData → RestoringCheckpoint
//     → ComputingResumePoint → EpochLoop → Finalizing
//   (any fatal error → Failed)
//
// The first two phases happen in TrainUseCase; this file owns
// the rest. Position in the data is never remembered between
// runs: it is derived from the restored global step.

use anyhow::{Context, Result};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::batches, dataset::SampleSet};
use crate::domain::progress::ResumePoint;
use crate::domain::traits::{ProgressSink, StepReport, TrainableModel};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::schedule::ExponentialDecay;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainPhase {
    ResolvingConfig,
    LoadingData,
    RestoringCheckpoint,
    ComputingResumePoint,
    EpochLoop,
    Finalizing,
    Failed,
}

/// Summary of one invocation of the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainOutcome {
    /// Position the run resumed from
    pub start:       ResumePoint,
    pub start_step:  u64,
    pub final_step:  u64,
    /// Batches trained by this invocation
    pub batches_run: u64,
}

pub struct Trainer<'a> {
    cfg:         &'a TrainConfig,
    checkpoints: &'a CheckpointManager,
    schedule:    ExponentialDecay,
}

impl<'a> Trainer<'a> {
    pub fn new(cfg: &'a TrainConfig, checkpoints: &'a CheckpointManager) -> Self {
        Self { cfg, checkpoints, schedule: ExponentialDecay::from_config(cfg) }
    }

    pub fn run<M, S>(&self, data: &SampleSet, model: &mut M, mut sink: S) -> Result<TrainOutcome>
    where
        M: TrainableModel,
        S: ProgressSink,
    {
        let cfg = self.cfg;

        tracing::info!(phase = ?TrainPhase::RestoringCheckpoint, "Restoring checkpoint");
        let mut step   = self.checkpoints.initialize_or_restore(model)?;
        let start_step = step.value();

        let start = ResumePoint::from_step(step, data.len(), cfg.batch_size);
        tracing::info!(
            phase = ?TrainPhase::ComputingResumePoint,
            "Step {}: resuming at epoch {}, sample offset {} ({} batches per epoch, {} to go)",
            step,
            start.epoch,
            start.offset,
            start.batches_per_epoch,
            start.remaining_batches(cfg.num_epochs),
        );

        let mut offset      = start.offset;
        let mut batches_run = 0u64;

        for epoch in start.epoch..=cfg.num_epochs {
            tracing::debug!(phase = ?TrainPhase::EpochLoop, "Epoch {}/{}", epoch, cfg.num_epochs);

            let (samples, authors) = data.slice_from(offset);
            for batch in batches(samples, authors, cfg.batch_size) {
                let learning_rate = self.schedule.rate_at(step.value());
                let loss = model
                    .train_step(&batch, learning_rate)
                    .with_context(|| format!("Training step {} failed", step.value() + 1))?;
                step.advance();
                batches_run += 1;

                tracing::info!("Epoch: {} Step: {} Loss: {:.4}", epoch, step, loss);

                let report = StepReport { step: step.value(), epoch, loss, learning_rate };
                if let Err(e) = sink.record(&report) {
                    tracing::warn!("Could not report step {}: {:#}", step, e);
                }

                if step.is_multiple_of(cfg.checkpoint_interval) {
                    self.checkpoints.save(&*model, step)?;
                }
            }

            // only the first resumed epoch starts mid-way
            offset = 0;
        }

        tracing::info!(phase = ?TrainPhase::Finalizing, "Saving final checkpoint at step {}", step);
        self.checkpoints.save(&*model, step)?;

        Ok(TrainOutcome { start, start_step, final_step: step.value(), batches_run })
    }
}
