// ============================================================
// Layer 3 — Training Progress
// ============================================================
// The global step is the single source of truth for how much
// training has happened. Epoch and dataset offset are never
// stored: they are recomputed from the step every time a run
// starts.
//
//   batches_per_epoch = ceil(dataset_size / batch_size)
//   epoch             = step / batches_per_epoch + 1
//   offset            = (step % batches_per_epoch) * batch_size
//
// Example: 10 samples, batch size 4 → 3 batches per epoch.
//   step 0 → epoch 1, offset 0
//   step 7 → epoch 3, offset 4
//   step 6 → epoch 3, offset 0


/// Count of batches processed since the run began.
///
/// Only the checkpoint manager creates one and only `advance`
/// moves it forward, one batch at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct GlobalStep(u64);

impl GlobalStep {
    pub(crate) fn new(step: u64) -> Self {
        Self(step)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// Record one processed batch.
    pub fn advance(&mut self) {
        self.0 += 1;
    }

    /// True when this step falls on a checkpoint boundary
    pub fn is_multiple_of(&self, interval: u64) -> bool {
        interval != 0 && self.0 % interval == 0
    }
}

impl std::fmt::Display for GlobalStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Number of batches (including a short final one) in one epoch.
/// Never zero: a dataset smaller than one batch still takes one step.
pub fn batches_per_epoch(dataset_size: usize, batch_size: usize) -> u64 {
    assert!(batch_size > 0, "batch_size must be positive");
    (dataset_size.div_ceil(batch_size) as u64).max(1)
}

/// Where a run picks up, derived from the persisted step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumePoint {
    /// 1-based epoch number to continue in
    pub epoch: usize,

    /// Index of the first sample still to be trained in that epoch
    pub offset: usize,

    /// Batches of `epoch` already trained (offset / batch_size)
    pub batch_in_epoch: u64,

    pub batches_per_epoch: u64,
}

impl ResumePoint {
    pub fn from_step(step: GlobalStep, dataset_size: usize, batch_size: usize) -> Self {
        let per_epoch = batches_per_epoch(dataset_size, batch_size);
        let step = step.value();
        let batch_in_epoch = step % per_epoch;
        Self {
            epoch:             (step / per_epoch) as usize + 1,
            offset:            batch_in_epoch as usize * batch_size,
            batch_in_epoch,
            batches_per_epoch: per_epoch,
        }
    }

    /// Batches still to run before `num_epochs` is complete.
    pub fn remaining_batches(&self, num_epochs: usize) -> u64 {
        if self.epoch > num_epochs {
            return 0;
        }
        let epochs_left = (num_epochs - self.epoch + 1) as u64;
        epochs_left * self.batches_per_epoch - self.batch_in_epoch
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn point(step: u64, dataset_size: usize, batch_size: usize) -> (usize, usize) {
        let p = ResumePoint::from_step(GlobalStep::new(step), dataset_size, batch_size);
        (p.epoch, p.offset)
    }

    #[test]
    fn test_fresh_run_starts_at_epoch_one() {
        assert_eq!(point(0, 10, 4), (1, 0));
    }

    #[test]
    fn test_mid_epoch_resume() {
        // 10 samples / 4 per batch → 3 batches per epoch
        assert_eq!(batches_per_epoch(10, 4), 3);
        assert_eq!(point(7, 10, 4), (3, 4));
    }

    #[test]
    fn test_step_on_epoch_boundary_starts_next_epoch() {
        assert_eq!(point(6, 10, 4), (3, 0));
    }

    #[test]
    fn test_dataset_smaller_than_batch() {
        assert_eq!(batches_per_epoch(3, 8), 1);
        assert_eq!(point(5, 3, 8), (6, 0));
    }

    #[test]
    fn test_uneven_division_rounds_up() {
        assert_eq!(batches_per_epoch(9, 2), 5);
        assert_eq!(batches_per_epoch(8, 2), 4);
    }

    #[test]
    fn test_remaining_batches() {
        let p = ResumePoint::from_step(GlobalStep::new(7), 10, 4);
        // epochs 3..=4 → 6 batches, 1 already done in epoch 3
        assert_eq!(p.remaining_batches(4), 5);
        assert_eq!(p.remaining_batches(2), 0);
    }

    #[test]
    fn test_advance_and_interval() {
        let mut step = GlobalStep::new(99);
        assert!(!step.is_multiple_of(100));
        step.advance();
        assert_eq!(step.value(), 100);
        assert!(step.is_multiple_of(100));
        assert!(!step.is_multiple_of(0));
    }

    /// Walk an uninterrupted run batch by batch and check that the
    /// position reached after `k` batches is what resuming at step
    /// `k` would compute.
    #[test]
    fn test_resume_matches_uninterrupted_walk() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..200 {
            let dataset_size = rng.gen_range(1..60);
            let batch_size   = rng.gen_range(1..12);

            let mut epoch  = 1usize;
            let mut offset = 0usize;
            let mut step   = 0u64;

            for _ in 0..(4 * batches_per_epoch(dataset_size, batch_size)) {
                assert_eq!(
                    point(step, dataset_size, batch_size),
                    (epoch, offset),
                    "dataset_size={dataset_size} batch_size={batch_size} step={step}"
                );

                // consume one batch the way the sampler does
                offset += batch_size;
                if offset >= dataset_size {
                    offset = 0;
                    epoch += 1;
                }
                step += 1;
            }
        }
    }
}
