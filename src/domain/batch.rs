// ============================================================
// Layer 3 — SampleBatch Domain Type
// ============================================================
// One mini-batch as the trainable model receives it.
// Plain vectors only; the ML layer turns them into tensors.
//
// Layout for a batch of N rows padded to length T:
//   sequences: N rows × T token ids   (model input)
//   targets:   N rows × T token ids   (what each position predicts)
//   authors:   N author ids           (one per row)
//   lengths:   N unpadded row lengths

/// Token id used to right-pad rows inside a batch.
/// The loss ignores positions whose target is this id.
pub const PAD_TOKEN: u32 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleBatch {
    pub sequences: Vec<Vec<u32>>,
    pub targets:   Vec<Vec<u32>>,
    pub authors:   Vec<u32>,
    pub lengths:   Vec<usize>,
}

impl SampleBatch {
    /// Number of rows in the batch (may be less than the configured
    /// batch size for the last batch of an epoch)
    pub fn len(&self) -> usize {
        self.authors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
    }

    /// Padded row length shared by every row
    pub fn seq_len(&self) -> usize {
        self.sequences.first().map_or(0, Vec::len)
    }
}
