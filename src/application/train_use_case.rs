// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates one (possibly resumed) training run:
//
//   Step 1: Take the run-directory lock           (Layer 6 - infra)
//   Step 2: Pin or reload the run configuration   (Layer 6 - infra)
//   Step 3: Load the pre-tokenized samples        (Layer 4 - data)
//   Step 4: Build the network from the data sizes (Layer 5 - ml)
//   Step 5: Restore or create the checkpoint      (Layer 6 - infra)
//   Step 6: Run the resumable training loop       (Layer 5 - ml)
//
// The candidate configuration passed in from the CLI is only
// used the first time a run directory is seen. After that the
// persisted params.json wins. The lock is taken first so two
// trainers starting on a fresh directory cannot both pin.
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use anyhow::{Context, Result};
use burn::tensor::backend::AutodiffBackend;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::data::loader::SampleStore;
use crate::domain::error::TrainError;
use crate::infra::{
    checkpoint::CheckpointManager,
    lock::RunLock,
    metrics::CsvProgressSink,
    run_config::RunConfigManager,
};
use crate::ml::{
    network::Network,
    trainer::{TrainOutcome, TrainPhase, Trainer},
};

/// Schema version written into every params.json
pub const CONFIG_VERSION: u32 = 1;

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a run. Every field is required when
// reading params.json back: nothing is silently defaulted and
// unknown fields are an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrainConfig {
    pub version:             u32,
    /// Pre-tokenized sample file (see data::loader)
    pub data_file:           String,
    pub batch_size:          usize,
    pub num_epochs:          usize,
    /// Initial learning rate of the exponential decay
    pub learn_rate:          f64,
    pub decay_rate:          f64,
    /// Steps per decay period
    pub decay_steps:         u64,
    /// Decay in whole periods (true) or continuously (false)
    pub staircase:           bool,
    /// Save a checkpoint every this many steps
    pub checkpoint_interval: u64,
    pub embedding_dim:       usize,
    pub author_dim:          usize,
    pub hidden_size:         usize,
    pub dropout:             f64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            version:             CONFIG_VERSION,
            data_file:           "data/samples.json".to_string(),
            batch_size:          50,
            num_epochs:          20,
            learn_rate:          2e-3,
            decay_rate:          0.97,
            decay_steps:         1000,
            staircase:           true,
            checkpoint_interval: 100,
            embedding_dim:       128,
            author_dim:          16,
            hidden_size:         256,
            dropout:             0.2,
        }
    }
}

impl TrainConfig {
    /// Reject values the training loop cannot run with.
    pub fn validate(&self) -> Result<(), TrainError> {
        let invalid = |msg: &str| Err(TrainError::InvalidConfig(msg.to_string()));

        if self.version != CONFIG_VERSION {
            return Err(TrainError::InvalidConfig(format!(
                "unsupported config version {} (expected {CONFIG_VERSION})",
                self.version
            )));
        }
        if self.batch_size == 0 {
            return invalid("batch_size must be at least 1");
        }
        if self.num_epochs == 0 {
            return invalid("num_epochs must be at least 1");
        }
        if self.decay_steps == 0 {
            return invalid("decay_steps must be at least 1");
        }
        if self.checkpoint_interval == 0 {
            return invalid("checkpoint_interval must be at least 1");
        }
        if !(self.learn_rate.is_finite() && self.learn_rate > 0.0) {
            return invalid("learn_rate must be positive");
        }
        if !(self.decay_rate.is_finite() && self.decay_rate > 0.0) {
            return invalid("decay_rate must be positive");
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return invalid("dropout must be in [0, 1)");
        }
        if self.embedding_dim == 0 || self.author_dim == 0 || self.hidden_size == 0 {
            return invalid("model dimensions must be at least 1");
        }
        Ok(())
    }
}

/// Backend the CLI trains on
pub type TrainBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase<B: AutodiffBackend> {
    run_dir:   PathBuf,
    candidate: TrainConfig,
    device:    B::Device,
}

impl<B: AutodiffBackend> TrainUseCase<B> {
    pub fn new(run_dir: impl Into<PathBuf>, candidate: TrainConfig, device: B::Device) -> Self {
        Self { run_dir: run_dir.into(), candidate, device }
    }

    /// Execute the run end to end. The first fatal error is
    /// returned and training stops before any further step.
    pub fn execute(&self) -> Result<TrainOutcome> {
        let result = self.run_phases();
        if let Err(e) = &result {
            tracing::error!(phase = ?TrainPhase::Failed, "Training failed: {e:#}");
        }
        result
    }

    fn run_phases(&self) -> Result<TrainOutcome> {
        // ── Step 1: One trainer per run directory ─────────────────────────────
        fs::create_dir_all(&self.run_dir).map_err(|source| TrainError::Io {
            path: self.run_dir.clone(),
            source,
        })?;
        let lock = RunLock::acquire(&self.run_dir)?;
        tracing::info!("Holding run lock '{}'", lock.path().display());

        // ── Step 2: Resolve configuration ─────────────────────────────────────
        tracing::info!(phase = ?TrainPhase::ResolvingConfig, "Resolving run configuration");
        let cfg = RunConfigManager::new(&self.run_dir).resolve(&self.candidate)?;

        // ── Step 3: Load samples ──────────────────────────────────────────────
        tracing::info!(phase = ?TrainPhase::LoadingData, "Loading samples from '{}'", cfg.data_file);
        let data = SampleStore::new(&cfg.data_file).load()?;

        // ── Step 4: Build the network ─────────────────────────────────────────
        tracing::info!("Using device: {:?}", self.device);
        let mut network = Network::<B>::new(
            data.vocab_size(),
            data.author_size(),
            &cfg,
            self.device.clone(),
        );

        // ── Steps 5-6: Restore and train ──────────────────────────────────────
        let checkpoints = CheckpointManager::new(&self.run_dir);
        let mut sink = CsvProgressSink::new(&self.run_dir)
            .context("Cannot open metrics log")?;

        Trainer::new(&cfg, &checkpoints).run(&data, &mut network, &mut sink)
    }
}
