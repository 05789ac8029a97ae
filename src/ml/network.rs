// ============================================================
// Layer 5 — Network (TrainableModel over Burn)
// ============================================================
// Couples the AuthorLm module with its Adam optimiser so the
// training loop sees a single object that can:
//
//   - take one optimisation step on a SampleBatch
//   - write its weights + Adam moments into a checkpoint dir
//   - restore both from a checkpoint dir
//
// Optimiser state is checkpointed alongside the weights so the
// first step after a resume uses the same moment estimates an
// uninterrupted run would have used.
//
// Records use the MessagePack+gzip format of CompactRecorder but
// at full precision: a checkpoint is for continuing training,
// not for shipping a small model.
//
// Reference: Burn Book §5 (Training, Records and Checkpointing)

use anyhow::{Context, Result};
use burn::{
    optim::{adaptor::OptimizerAdaptor, Adam, AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkGzFileRecorder, Recorder},
    tensor::backend::AutodiffBackend,
};
use std::path::Path;

use crate::application::train_use_case::TrainConfig;
use crate::domain::batch::SampleBatch;
use crate::domain::traits::TrainableModel;
use crate::ml::model::{AuthorLm, AuthorLmConfig};

type CheckpointRecorder = NamedMpkGzFileRecorder<FullPrecisionSettings>;

const MODEL_RECORD: &str = "model";
const OPTIM_RECORD: &str = "optimizer";

pub struct Network<B: AutodiffBackend> {
    model:        AuthorLm<B>,
    optim:        OptimizerAdaptor<Adam, AuthorLm<B>, B>,
    optim_config: AdamConfig,
    device:       B::Device,
}

impl<B: AutodiffBackend> Network<B> {
    pub fn new(vocab_size: usize, author_size: usize, cfg: &TrainConfig, device: B::Device) -> Self {
        let model_cfg = AuthorLmConfig::new(
            vocab_size,
            author_size,
            cfg.embedding_dim,
            cfg.author_dim,
            cfg.hidden_size,
            cfg.dropout,
        );
        let model = model_cfg.init::<B>(&device);
        tracing::info!(
            "Model ready: vocab_size={}, author_size={}, hidden_size={}",
            vocab_size,
            author_size,
            cfg.hidden_size,
        );

        let optim_config = AdamConfig::new().with_epsilon(1e-8);
        let optim        = optim_config.init::<B, AuthorLm<B>>();

        Self { model, optim, optim_config, device }
    }

    fn batch_loss(&self, batch: &SampleBatch) -> Tensor<B, 1> {
        let (batch_size, seq_len) = (batch.len(), batch.seq_len());

        let sequences: Vec<i32> = batch.sequences.iter().flatten().map(|&t| t as i32).collect();
        let targets:   Vec<i32> = batch.targets.iter().flatten().map(|&t| t as i32).collect();
        let authors:   Vec<i32> = batch.authors.iter().map(|&a| a as i32).collect();

        let sequences = Tensor::<B, 1, Int>::from_ints(sequences.as_slice(), &self.device)
            .reshape([batch_size, seq_len]);
        let targets = Tensor::<B, 1, Int>::from_ints(targets.as_slice(), &self.device)
            .reshape([batch_size, seq_len]);
        let authors = Tensor::<B, 1, Int>::from_ints(authors.as_slice(), &self.device);

        self.model.forward_loss(sequences, authors, targets)
    }
}

impl<B: AutodiffBackend> TrainableModel for Network<B> {
    fn train_step(&mut self, batch: &SampleBatch, learning_rate: f64) -> Result<f32> {
        let loss = self.batch_loss(batch);
        let loss_val: f32 = loss.clone().into_scalar().elem::<f32>();

        // Backward pass + Adam update
        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &self.model);
        self.model = self.optim.step(learning_rate, self.model.clone(), grads);

        Ok(loss_val)
    }

    fn save_state(&self, dir: &Path) -> Result<()> {
        let recorder = CheckpointRecorder::new();
        recorder
            .record(self.model.clone().into_record(), dir.join(MODEL_RECORD))
            .with_context(|| format!("Failed to save model weights to '{}'", dir.display()))?;
        recorder
            .record(self.optim.to_record(), dir.join(OPTIM_RECORD))
            .with_context(|| format!("Failed to save optimizer state to '{}'", dir.display()))?;
        Ok(())
    }

    fn load_state(&mut self, dir: &Path) -> Result<()> {
        let recorder = CheckpointRecorder::new();

        let record = recorder
            .load(dir.join(MODEL_RECORD), &self.device)
            .with_context(|| format!("Cannot load model weights from '{}'", dir.display()))?;
        self.model = self.model.clone().load_record(record);

        let record = recorder
            .load(dir.join(OPTIM_RECORD), &self.device)
            .with_context(|| format!("Cannot load optimizer state from '{}'", dir.display()))?;
        self.optim = self.optim_config.init::<B, AuthorLm<B>>().load_record(record);

        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::batcher::batches;
    use tempfile::TempDir;

    type TestBackend = burn::backend::Autodiff<burn::backend::NdArray>;

    fn tiny_config() -> TrainConfig {
        TrainConfig {
            embedding_dim: 8,
            author_dim:    4,
            hidden_size:   16,
            dropout:       0.0,
            ..TrainConfig::default()
        }
    }

    fn network() -> Network<TestBackend> {
        Network::new(9, 2, &tiny_config(), Default::default())
    }

    fn batch() -> SampleBatch {
        let samples = vec![vec![1, 2, 3, 4, 5], vec![6, 7, 8, 9], vec![3, 1]];
        let authors = vec![0, 1, 0];
        batches(&samples, &authors, 3).next().unwrap()
    }

    #[test]
    fn test_train_step_reduces_loss_on_repeated_batch() {
        let mut net = network();
        let batch   = batch();

        let first = net.train_step(&batch, 1e-2).unwrap();
        assert!(first.is_finite());

        let mut last = first;
        for _ in 0..30 {
            last = net.train_step(&batch, 1e-2).unwrap();
        }
        assert!(last < first, "loss did not decrease: {first} -> {last}");
    }

    #[test]
    fn test_state_round_trips_through_checkpoint_dir() {
        let dir     = TempDir::new().unwrap();
        let mut net = network();
        let batch   = batch();
        for _ in 0..3 {
            net.train_step(&batch, 1e-2).unwrap();
        }
        net.save_state(dir.path()).unwrap();

        let mut restored = network();
        restored.load_state(dir.path()).unwrap();

        let expected: f32 = net.batch_loss(&batch).into_scalar().elem();
        let actual:   f32 = restored.batch_loss(&batch).into_scalar().elem();
        assert!((expected - actual).abs() < 1e-5, "{expected} != {actual}");
    }

    #[test]
    fn test_loading_from_empty_dir_fails() {
        let dir = TempDir::new().unwrap();
        assert!(network().load_state(dir.path()).is_err());
    }
}
