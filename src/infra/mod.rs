// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Everything that touches the run directory:
//
//   run_config.rs — Pins params.json on the first run and
//                   reloads it on every later run.
//
//   checkpoint.rs — Saves and restores model state together
//                   with the global step. The only place
//                   training progress is persisted.
//
//   lock.rs       — train.lock guard so only one trainer
//                   writes to a run directory at a time.
//
//   metrics.rs    — Per-step CSV log of loss and learning rate.
//
//   atomic.rs     — Write-then-rename helper used for every
//                   small file that must never be half-written.
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling)

pub mod atomic;

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Exclusive ownership of a run directory
pub mod lock;

/// Training metrics CSV logger
pub mod metrics;

/// Configuration pinning per run directory
pub mod run_config;
