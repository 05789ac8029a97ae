//! Test doubles shared by the unit tests of several layers.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{cell::Cell, fs, path::Path};

use crate::data::dataset::SampleSet;
use crate::domain::batch::SampleBatch;
use crate::domain::traits::{ProgressSink, StepReport, TrainableModel};

/// Everything the recording model "learns": which samples it saw,
/// in which order, and at which learning rate.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingState {
    /// First input token of every row, one entry per trained batch
    pub trained:        Vec<Vec<u32>>,
    pub learning_rates: Vec<f64>,
}

/// A TrainableModel whose persisted state is its own training
/// history, so a crashed-and-resumed run can be compared with an
/// uninterrupted one.
#[derive(Debug, Default)]
pub struct RecordingModel {
    pub state:     RecordingState,
    crash_after:   Option<usize>,
    steps_taken:   usize,
    failing_saves: Cell<u32>,
}

impl RecordingModel {
    pub const STATE_FILE: &'static str = "state.json";

    /// Let `steps` train steps succeed, then fail every later one.
    pub fn crash_after(mut self, steps: usize) -> Self {
        self.crash_after = Some(steps);
        self
    }

    /// Fail the next `count` calls to save_state.
    pub fn failing_saves(self, count: u32) -> Self {
        self.failing_saves.set(count);
        self
    }
}

impl TrainableModel for RecordingModel {
    fn train_step(&mut self, batch: &SampleBatch, learning_rate: f64) -> Result<f32> {
        if self.crash_after.is_some_and(|n| self.steps_taken >= n) {
            bail!("simulated crash after {} steps", self.steps_taken);
        }
        self.steps_taken += 1;
        self.state
            .trained
            .push(batch.sequences.iter().map(|row| row[0]).collect());
        self.state.learning_rates.push(learning_rate);
        Ok(1.0 / batch.len() as f32)
    }

    fn save_state(&self, dir: &Path) -> Result<()> {
        let remaining = self.failing_saves.get();
        if remaining > 0 {
            self.failing_saves.set(remaining - 1);
            bail!("simulated transient write failure");
        }
        fs::write(dir.join(Self::STATE_FILE), serde_json::to_vec(&self.state)?)?;
        Ok(())
    }

    fn load_state(&mut self, dir: &Path) -> Result<()> {
        let raw = fs::read(dir.join(Self::STATE_FILE))?;
        self.state = serde_json::from_slice(&raw).context("state.json is not valid")?;
        Ok(())
    }
}

/// Collects reports in memory, optionally failing every call.
#[derive(Debug, Default)]
pub struct VecSink {
    pub reports: Vec<StepReport>,
    pub fail:    bool,
}

impl ProgressSink for VecSink {
    fn record(&mut self, report: &StepReport) -> Result<()> {
        if self.fail {
            bail!("sink unavailable");
        }
        self.reports.push(*report);
        Ok(())
    }
}

/// `n` two-token samples; sample i starts with token i + 1.
pub fn numbered_samples(n: usize) -> SampleSet {
    let samples = (0..n as u32).map(|i| vec![i + 1, i + 2]).collect();
    let authors = (0..n as u32).map(|i| i % 2).collect();
    SampleSet::new(samples, authors)
}
