// ============================================================
// Layer 3 — Training Error Taxonomy
// ============================================================
// Every failure that must stop a training run has a variant here.
// None of them are retried by the caller: the last successful
// checkpoint is always the place to resume from.
//
// The application layer works with anyhow::Result, so these
// errors travel upwards inside anyhow::Error and can be
// recovered with `err.downcast_ref::<TrainError>()`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrainError {
    /// params.json exists but cannot be read back as a TrainConfig
    #[error("run configuration '{path}' is corrupt: {reason}")]
    ConfigCorrupt { path: PathBuf, reason: String },

    /// A candidate configuration failed validation before being pinned
    #[error("invalid training configuration: {0}")]
    InvalidConfig(String),

    /// Data file missing, unreadable or malformed
    #[error("cannot load samples from '{path}': {reason}")]
    DataLoad { path: PathBuf, reason: String },

    #[error("sample file '{path}' contains no samples")]
    EmptyDataset { path: PathBuf },

    /// Index or checkpoint contents cannot be restored
    #[error("checkpoint '{path}' is corrupt: {reason}")]
    CheckpointCorrupt { path: PathBuf, reason: String },

    #[error("failed to write checkpoint '{path}' after {attempts} attempts: {reason}")]
    CheckpointWrite {
        path: PathBuf,
        attempts: u32,
        reason: String,
    },

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("run directory is locked by another running trainer ('{path}')")]
    RunLocked { path: PathBuf },
}
