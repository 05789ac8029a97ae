// ============================================================
// Layer 6 — Run Configuration Manager
// ============================================================
// Pins the hyperparameters of a run to its directory.
//
//   First run    → {run_dir}/params.json does not exist:
//                  validate the candidate, create the directory,
//                  write params.json atomically, return it.
//   Later runs   → params.json exists: the candidate is ignored
//                  and the persisted config is returned.
//
// A resumed run therefore always trains with the exact learning
// rate schedule, batch size and model shape it started with.
// Passing different flags to an existing run only produces a
// warning.
//
// Reference: serde_json documentation

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::application::train_use_case::TrainConfig;
use crate::domain::error::TrainError;
use crate::infra::atomic::write_atomic;

pub const PARAMS_FILE: &str = "params.json";

pub struct RunConfigManager {
    dir: PathBuf,
}

impl RunConfigManager {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    pub fn params_path(&self) -> PathBuf {
        self.dir.join(PARAMS_FILE)
    }

    /// Return the configuration this run directory is pinned to,
    /// pinning `candidate` if the directory is new.
    pub fn resolve(&self, candidate: &TrainConfig) -> Result<TrainConfig, TrainError> {
        let path = self.params_path();

        if path.exists() {
            let pinned = self.load()?;
            if &pinned != candidate {
                tracing::warn!(
                    "Run '{}' already has a configuration; ignoring the supplied parameters",
                    self.dir.display()
                );
            }
            tracing::info!("Loaded pinned configuration from '{}'", path.display());
            return Ok(pinned);
        }

        candidate.validate()?;

        let json = serde_json::to_string_pretty(candidate)
            .map_err(|e| TrainError::InvalidConfig(e.to_string()))?;
        fs::create_dir_all(&self.dir)
            .and_then(|_| write_atomic(&path, json.as_bytes()))
            .map_err(|e| TrainError::ConfigCorrupt {
                path:   path.clone(),
                reason: format!("cannot write: {e}"),
            })?;

        tracing::info!("Pinned new configuration to '{}'", path.display());
        Ok(candidate.clone())
    }

    /// Read the persisted configuration. A file that parses but
    /// fails validation is reported as corrupt.
    pub fn load(&self) -> Result<TrainConfig, TrainError> {
        let path = self.params_path();
        let corrupt = |reason: String| TrainError::ConfigCorrupt { path: path.clone(), reason };

        let json = fs::read_to_string(&path).map_err(|e| corrupt(e.to_string()))?;
        let cfg: TrainConfig = serde_json::from_str(&json).map_err(|e| corrupt(e.to_string()))?;

        // a deserializable file can still hold values training cannot run with
        cfg.validate().map_err(|e| corrupt(e.to_string()))?;
        Ok(cfg)
    }
}
