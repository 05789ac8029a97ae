// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records per-step training progress to a CSV file in the run
// directory.
//
// Metrics recorded per step:
//   - step:          global step after the batch
//   - epoch:         1-based epoch the batch belonged to
//   - loss:          training loss of the batch
//   - learning_rate: decayed learning rate used for the update
//
// Output file: {run_dir}/metrics.csv
//
// Example CSV output:
//   step,epoch,loss,learning_rate
//   1,1,4.812300,0.00200000
//   2,1,4.790115,0.00200000
//
// A resumed run appends to the same file. Rows between the last
// checkpoint and a crash are therefore logged twice; the later
// row for a step is the one that counts.
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::Result;
use std::{
    fs::{self, File, OpenOptions},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::domain::traits::{ProgressSink, StepReport};

pub const METRICS_FILE: &str = "metrics.csv";

const HEADER: &str = "step,epoch,loss,learning_rate";

/// Appends one CSV row per training step.
pub struct CsvProgressSink {
    csv_path: PathBuf,
    writer:   BufWriter<File>,
}

impl CsvProgressSink {
    /// Open (or create) the metrics file inside `dir`.
    /// Writes the CSV header only if the file is new.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let csv_path = dir.join(METRICS_FILE);
        let is_new   = !csv_path.exists();

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&csv_path)?;
        let mut writer = BufWriter::new(file);

        if is_new {
            writeln!(writer, "{HEADER}")?;
            writer.flush()?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path, writer })
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

impl ProgressSink for CsvProgressSink {
    fn record(&mut self, r: &StepReport) -> Result<()> {
        writeln!(
            self.writer,
            "{},{},{:.6},{:.8}",
            r.step, r.epoch, r.loss, r.learning_rate,
        )?;
        // flushed per row so a killed run keeps its history
        self.writer.flush()?;
        Ok(())
    }
}
