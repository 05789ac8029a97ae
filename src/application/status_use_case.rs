// ============================================================
// Layer 2 — StatusUseCase
// ============================================================
// Answers "where would this run resume?" without building a
// model or touching any checkpoint:
//
//   Step 1: Read the pinned params.json     (Layer 6 - infra)
//   Step 2: Load the samples it points at   (Layer 4 - data)
//   Step 3: Read the checkpoint index       (Layer 6 - infra)
//   Step 4: Derive epoch/offset from step   (Layer 3 - domain)

use anyhow::Result;
use std::{fmt, path::PathBuf};

use crate::application::train_use_case::TrainConfig;
use crate::data::loader::SampleStore;
use crate::domain::progress::{GlobalStep, ResumePoint};
use crate::infra::{checkpoint::CheckpointManager, lock::RunLock, run_config::RunConfigManager};

#[derive(Debug, Clone)]
pub struct RunStatus {
    pub config:       TrainConfig,
    pub dataset_size: usize,
    /// Step of the latest checkpoint, None before the first one
    pub step:         Option<u64>,
    pub resume:       ResumePoint,
    pub remaining:    u64,
    /// A live trainer holds train.lock
    pub locked:       bool,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.step {
            Some(step) => writeln!(f, "Global step:       {step}")?,
            None       => writeln!(f, "Global step:       none (not started)")?,
        }
        writeln!(f, "Samples:           {}", self.dataset_size)?;
        writeln!(f, "Batch size:        {}", self.config.batch_size)?;
        writeln!(f, "Batches per epoch: {}", self.resume.batches_per_epoch)?;
        writeln!(f, "Resume epoch:      {}/{}", self.resume.epoch, self.config.num_epochs)?;
        writeln!(f, "Resume offset:     {}", self.resume.offset)?;
        writeln!(f, "Batches remaining: {}", self.remaining)?;
        write!(f, "Locked:            {}", if self.locked { "yes" } else { "no" })
    }
}

pub struct StatusUseCase {
    run_dir: PathBuf,
}

impl StatusUseCase {
    pub fn new(run_dir: impl Into<PathBuf>) -> Self {
        Self { run_dir: run_dir.into() }
    }

    pub fn execute(&self) -> Result<RunStatus> {
        let config = RunConfigManager::new(&self.run_dir).load()?;
        let data   = SampleStore::new(&config.data_file).load()?;
        let step   = CheckpointManager::new(&self.run_dir).latest()?.map(|i| i.step);

        let resume = ResumePoint::from_step(
            GlobalStep::new(step.unwrap_or(0)),
            data.len(),
            config.batch_size,
        );

        Ok(RunStatus {
            remaining:    resume.remaining_batches(config.num_epochs),
            dataset_size: data.len(),
            locked:       RunLock::is_held(&self.run_dir),
            config,
            step,
            resume,
        })
    }
}
