// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Owns everything persisted about training progress: the model
// state and the global step it belongs to.
//
// File layout inside the run directory:
//   run_dir/
//     checkpoint.json        ← index: latest step + its directory
//     model.ckpt-0/          ← state written at the very first start
//     model.ckpt-100/        ← periodic saves
//     model.ckpt-137/        ← final save of a run
//
// Save protocol (crash-safe at every point):
//   1. model writes its state into .model.ckpt-<step>.partial/
//   2. the staging directory is renamed to model.ckpt-<step>/
//   3. checkpoint.json is replaced with write-then-rename
//
// Until step 3 completes the index still names the previous
// checkpoint, which is never touched. Old checkpoints are kept.
//
// Restore never falls back to a fresh model when the index
// exists: an unreadable index or checkpoint is fatal, because
// silently restarting from step 0 would hide lost training.
//
// Reference: Burn Book §5 (Records and Checkpointing)
//            Rust Book §9 (Error Handling)

use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    thread,
    time::Duration,
};

use crate::domain::error::TrainError;
use crate::domain::progress::GlobalStep;
use crate::domain::traits::TrainableModel;
use crate::infra::atomic::write_atomic;

pub const INDEX_FILE: &str = "checkpoint.json";

const CHECKPOINT_PREFIX: &str = "model.ckpt-";

const DEFAULT_WRITE_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(250);

/// Contents of checkpoint.json
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckpointIndex {
    /// Global step the latest checkpoint was taken at
    pub step: u64,

    /// Directory name of that checkpoint, relative to the run dir
    pub checkpoint: String,
}

pub struct CheckpointManager {
    dir:                PathBuf,
    max_write_attempts: u32,
    retry_backoff:      Duration,
}

impl CheckpointManager {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir:                dir.as_ref().to_path_buf(),
            max_write_attempts: DEFAULT_WRITE_ATTEMPTS,
            retry_backoff:      DEFAULT_RETRY_BACKOFF,
        }
    }

    /// Override how often a failing write is retried and how long
    /// to wait between attempts (the wait grows linearly).
    pub fn with_retry(mut self, max_write_attempts: u32, retry_backoff: Duration) -> Self {
        self.max_write_attempts = max_write_attempts.max(1);
        self.retry_backoff      = retry_backoff;
        self
    }

    pub fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }

    /// Directory a checkpoint for `step` lives in
    pub fn checkpoint_path(&self, step: u64) -> PathBuf {
        self.dir.join(checkpoint_name(step))
    }

    /// Read checkpoint.json. `None` means no checkpoint was ever
    /// completed in this run directory.
    pub fn latest(&self) -> Result<Option<CheckpointIndex>, TrainError> {
        let path = self.index_path();
        if !path.exists() {
            return Ok(None);
        }

        let corrupt = |reason: String| TrainError::CheckpointCorrupt { path: path.clone(), reason };

        let json  = fs::read_to_string(&path).map_err(|e| corrupt(e.to_string()))?;
        let index: CheckpointIndex =
            serde_json::from_str(&json).map_err(|e| corrupt(e.to_string()))?;

        if index.checkpoint != checkpoint_name(index.step) {
            return Err(corrupt(format!(
                "index names '{}' for step {}",
                index.checkpoint, index.step
            )));
        }
        Ok(Some(index))
    }

    /// Restore `model` from the latest checkpoint and return its step,
    /// or keep the freshly built model, save it as step 0, and return 0.
    pub fn initialize_or_restore<M: TrainableModel>(
        &self,
        model: &mut M,
    ) -> Result<GlobalStep, TrainError> {
        match self.latest()? {
            Some(index) => {
                let path = self.checkpoint_path(index.step);
                if !path.is_dir() {
                    return Err(TrainError::CheckpointCorrupt {
                        path,
                        reason: "checkpoint directory named by the index is missing".into(),
                    });
                }

                model.load_state(&path).map_err(|e| TrainError::CheckpointCorrupt {
                    path:   path.clone(),
                    reason: format!("{e:#}"),
                })?;

                tracing::info!("Restored checkpoint '{}' (step {})", path.display(), index.step);
                Ok(GlobalStep::new(index.step))
            }
            None => {
                tracing::info!("No checkpoint in '{}', starting fresh", self.dir.display());
                let step = GlobalStep::new(0);
                self.save(&*model, step)?;
                Ok(step)
            }
        }
    }

    /// Persist `model` as the checkpoint for `step` and point the
    /// index at it. Saving the step the index already names is a
    /// no-op: the state at a given step never differs.
    pub fn save<M: TrainableModel>(
        &self,
        model: &M,
        step:  GlobalStep,
    ) -> Result<PathBuf, TrainError> {
        let target = self.checkpoint_path(step.value());

        if let Some(index) = self.latest()? {
            if index.step == step.value() && target.is_dir() {
                tracing::debug!("Checkpoint for step {} already current", step);
                return Ok(target);
            }
        }

        let staging = self.dir.join(format!(".{}.partial", checkpoint_name(step.value())));

        self.with_retries(&target, || {
            if staging.exists() {
                fs::remove_dir_all(&staging)?;
            }
            fs::create_dir_all(&staging)?;
            model.save_state(&staging)?;

            // A directory for this step that the index does not name is
            // left over from a run that crashed before updating the index.
            if target.exists() {
                fs::remove_dir_all(&target)?;
            }
            fs::rename(&staging, &target)?;
            Ok(())
        })?;

        let index = CheckpointIndex {
            step:       step.value(),
            checkpoint: checkpoint_name(step.value()),
        };
        let json = serde_json::to_vec_pretty(&index).map_err(|e| TrainError::CheckpointWrite {
            path:     self.index_path(),
            attempts: 0,
            reason:   e.to_string(),
        })?;

        let index_path = self.index_path();
        self.with_retries(&index_path, || Ok(write_atomic(&index_path, &json)?))?;

        tracing::info!("Checkpoint saved: '{}' (step {})", target.display(), step);
        Ok(target)
    }

    fn with_retries<F>(&self, path: &Path, mut op: F) -> Result<(), TrainError>
    where
        F: FnMut() -> anyhow::Result<()>,
    {
        let mut attempt = 1;
        loop {
            match op() {
                Ok(()) => return Ok(()),
                Err(e) if attempt < self.max_write_attempts => {
                    tracing::warn!(
                        "Writing '{}' failed (attempt {}/{}): {:#}",
                        path.display(),
                        attempt,
                        self.max_write_attempts,
                        e
                    );
                    thread::sleep(self.retry_backoff * attempt);
                    attempt += 1;
                }
                Err(e) => {
                    return Err(TrainError::CheckpointWrite {
                        path:     path.to_path_buf(),
                        attempts: attempt,
                        reason:   format!("{e:#}"),
                    });
                }
            }
        }
    }
}

fn checkpoint_name(step: u64) -> String {
    format!("{CHECKPOINT_PREFIX}{step}")
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::progress::ResumePoint;
    use crate::test_support::RecordingModel;
    use tempfile::TempDir;

    fn manager(dir: &TempDir) -> CheckpointManager {
        CheckpointManager::new(dir.path()).with_retry(3, Duration::ZERO)
    }

    #[test]
    fn test_fresh_directory_starts_at_zero_and_saves() {
        let dir   = TempDir::new().unwrap();
        let mut m = RecordingModel::default();

        let step = manager(&dir).initialize_or_restore(&mut m).unwrap();
        assert_eq!(step.value(), 0);

        let index = manager(&dir).latest().unwrap().unwrap();
        assert_eq!(index.step, 0);
        assert!(dir.path().join("model.ckpt-0").is_dir());
    }

    #[test]
    fn test_save_then_restore_returns_step_and_state() {
        let dir = TempDir::new().unwrap();
        let mut trained = RecordingModel::default();
        trained.state.trained = vec![vec![1, 2], vec![3]];

        manager(&dir).save(&trained, GlobalStep::new(42)).unwrap();

        let mut restored = RecordingModel::default();
        let step = manager(&dir).initialize_or_restore(&mut restored).unwrap();
        assert_eq!(step.value(), 42);
        assert_eq!(restored.state, trained.state);
    }

    #[test]
    fn test_restore_then_save_is_idempotent() {
        let dir = TempDir::new().unwrap();
        manager(&dir).save(&RecordingModel::default(), GlobalStep::new(7)).unwrap();

        let mut m  = RecordingModel::default();
        let step   = manager(&dir).initialize_or_restore(&mut m).unwrap();
        let before = ResumePoint::from_step(step, 10, 4);

        manager(&dir).save(&m, step).unwrap();

        let mut again = RecordingModel::default();
        let step      = manager(&dir).initialize_or_restore(&mut again).unwrap();
        assert_eq!(ResumePoint::from_step(step, 10, 4), before);
        assert_eq!(before.epoch, 3);
        assert_eq!(before.offset, 4);
    }

    #[test]
    fn test_previous_checkpoints_are_kept() {
        let dir = TempDir::new().unwrap();
        let m   = RecordingModel::default();
        manager(&dir).save(&m, GlobalStep::new(100)).unwrap();
        manager(&dir).save(&m, GlobalStep::new(200)).unwrap();

        assert!(dir.path().join("model.ckpt-100").is_dir());
        assert!(dir.path().join("model.ckpt-200").is_dir());
        assert_eq!(manager(&dir).latest().unwrap().unwrap().step, 200);
    }

    #[test]
    fn test_corrupt_index_is_fatal() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(INDEX_FILE), "{\"step\": ").unwrap();

        let err = manager(&dir)
            .initialize_or_restore(&mut RecordingModel::default())
            .unwrap_err();
        assert!(matches!(err, TrainError::CheckpointCorrupt { .. }));
    }

    #[test]
    fn test_index_pointing_at_missing_checkpoint_is_fatal() {
        let dir = TempDir::new().unwrap();
        manager(&dir).save(&RecordingModel::default(), GlobalStep::new(3)).unwrap();
        fs::remove_dir_all(dir.path().join("model.ckpt-3")).unwrap();

        let err = manager(&dir)
            .initialize_or_restore(&mut RecordingModel::default())
            .unwrap_err();
        assert!(matches!(err, TrainError::CheckpointCorrupt { .. }));
    }

    #[test]
    fn test_unreadable_model_state_is_fatal() {
        let dir = TempDir::new().unwrap();
        manager(&dir).save(&RecordingModel::default(), GlobalStep::new(3)).unwrap();
        fs::write(
            dir.path().join("model.ckpt-3").join(RecordingModel::STATE_FILE),
            "garbage",
        )
        .unwrap();

        let err = manager(&dir)
            .initialize_or_restore(&mut RecordingModel::default())
            .unwrap_err();
        assert!(matches!(err, TrainError::CheckpointCorrupt { .. }));
    }

    #[test]
    fn test_mismatched_index_name_is_fatal() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(INDEX_FILE),
            r#"{"step": 5, "checkpoint": "../elsewhere"}"#,
        )
        .unwrap();
        assert!(matches!(
            manager(&dir).latest(),
            Err(TrainError::CheckpointCorrupt { .. })
        ));
    }

    #[test]
    fn test_transient_write_failures_are_retried() {
        let dir = TempDir::new().unwrap();
        let m   = RecordingModel::default().failing_saves(2);

        manager(&dir).save(&m, GlobalStep::new(9)).unwrap();
        assert_eq!(manager(&dir).latest().unwrap().unwrap().step, 9);
    }

    #[test]
    fn test_persistent_write_failure_keeps_previous_checkpoint() {
        let dir = TempDir::new().unwrap();
        manager(&dir).save(&RecordingModel::default(), GlobalStep::new(100)).unwrap();

        let broken = RecordingModel::default().failing_saves(10);
        let err    = manager(&dir).save(&broken, GlobalStep::new(200)).unwrap_err();
        assert!(matches!(err, TrainError::CheckpointWrite { attempts: 3, .. }));

        assert_eq!(manager(&dir).latest().unwrap().unwrap().step, 100);
        let step = manager(&dir)
            .initialize_or_restore(&mut RecordingModel::default())
            .unwrap();
        assert_eq!(step.value(), 100);
    }

    #[test]
    fn test_stale_unindexed_checkpoint_is_replaced() {
        let dir = TempDir::new().unwrap();
        manager(&dir).save(&RecordingModel::default(), GlobalStep::new(5)).unwrap();

        // left behind by a crash between rename and index update
        let stale = dir.path().join("model.ckpt-6");
        fs::create_dir_all(&stale).unwrap();
        fs::write(stale.join(RecordingModel::STATE_FILE), "stale").unwrap();

        let mut m = RecordingModel::default();
        m.state.trained = vec![vec![6]];
        manager(&dir).save(&m, GlobalStep::new(6)).unwrap();

        let mut restored = RecordingModel::default();
        manager(&dir).initialize_or_restore(&mut restored).unwrap();
        assert_eq!(restored.state.trained, vec![vec![6]]);
    }
}
