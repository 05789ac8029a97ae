// ============================================================
// Layer 5 — Learning Rate Schedule
// ============================================================
// Exponential decay keyed on the global step:
//
//   lr(step) = learn_rate * decay_rate ^ (step / decay_steps)
//
// staircase = true  → the exponent is floored, so the rate drops
//                     in discrete jumps every decay_steps steps
// staircase = false → the exponent is real-valued (smooth decay)
//
// Because it depends only on the step, a resumed run continues
// exactly where the interrupted one left off.

use crate::application::train_use_case::TrainConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialDecay {
    pub initial_rate: f64,
    pub decay_rate:   f64,
    pub decay_steps:  u64,
    pub staircase:    bool,
}

impl ExponentialDecay {
    pub fn from_config(cfg: &TrainConfig) -> Self {
        Self {
            initial_rate: cfg.learn_rate,
            decay_rate:   cfg.decay_rate,
            decay_steps:  cfg.decay_steps.max(1),
            staircase:    cfg.staircase,
        }
    }

    /// Learning rate for the update that takes the model from
    /// `step` to `step + 1`.
    pub fn rate_at(&self, step: u64) -> f64 {
        let mut exponent = step as f64 / self.decay_steps as f64;
        if self.staircase {
            exponent = exponent.floor();
        }
        self.initial_rate * self.decay_rate.powf(exponent)
    }
}
