/// The fixed, ordered training corpus for one run.
///
/// `samples[i]` is a pre-tokenized sequence written by `authors[i]`.
/// Order matters: resumption addresses samples by position.
#[derive(Debug, Clone)]
pub struct SampleSet {
    samples:     Vec<Vec<u32>>,
    authors:     Vec<u32>,
    vocab_size:  usize,
    author_size: usize,
}

impl SampleSet {
    /// Build a set from already validated parallel vectors.
    /// Callers guarantee equal lengths and at least one token.
    pub(crate) fn new(samples: Vec<Vec<u32>>, authors: Vec<u32>) -> Self {
        debug_assert_eq!(samples.len(), authors.len());
        let vocab_size = samples
            .iter()
            .flat_map(|s| s.iter().copied())
            .max()
            .unwrap_or(0) as usize;
        let author_size = authors.iter().copied().max().map_or(0, |a| a as usize + 1);
        Self { samples, authors, vocab_size, author_size }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Largest token id in the corpus.
    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    /// Largest author id + 1.
    pub fn author_size(&self) -> usize {
        self.author_size
    }

    /// Samples and authors from `offset` to the end of the corpus.
    /// An offset past the end yields two empty slices.
    pub fn slice_from(&self, offset: usize) -> (&[Vec<u32>], &[u32]) {
        let offset = offset.min(self.samples.len());
        (&self.samples[offset..], &self.authors[offset..])
    }
}
