// ============================================================
// Layer 6 — Run Directory Lock
// ============================================================
// Two trainers writing checkpoints into the same directory
// would interleave saves and corrupt the index. The guard holds
// an exclusive advisory lock on `train.lock` for as long as it
// lives.
//
// The lock belongs to the open file, not to the file on disk:
// the OS releases it when the owning process exits, however it
// dies. A `train.lock` left behind by a killed trainer is just
// an unlocked file and the next trainer takes it over. The file
// is never deleted.

use std::{
    fs::{File, OpenOptions, TryLockError},
    io::Write,
    path::{Path, PathBuf},
};

use crate::domain::error::TrainError;

pub const LOCK_FILE: &str = "train.lock";

/// Held for the lifetime of a training run.
#[derive(Debug)]
pub struct RunLock {
    path:  PathBuf,
    _file: File,
}

impl RunLock {
    /// `run_dir` must already exist.
    pub fn acquire(run_dir: &Path) -> Result<Self, TrainError> {
        let path = run_dir.join(LOCK_FILE);

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| TrainError::Io { path: path.clone(), source })?;

        match file.try_lock() {
            Ok(()) => {}
            Err(TryLockError::WouldBlock) => return Err(TrainError::RunLocked { path }),
            Err(TryLockError::Error(source)) => return Err(TrainError::Io { path, source }),
        }

        // the pid only helps a human find the owner
        let _ = file.set_len(0).and_then(|_| writeln!(file, "{}", std::process::id()));

        Ok(Self { path, _file: file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when a live trainer currently holds the lock on `run_dir`.
    pub fn is_held(run_dir: &Path) -> bool {
        let Ok(file) = File::open(run_dir.join(LOCK_FILE)) else {
            return false;
        };
        matches!(file.try_lock(), Err(TryLockError::WouldBlock))
    }
}
