use burn::{
    nn::{
        loss::CrossEntropyLossConfig,
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        Linear, LinearConfig,
        Lstm, LstmConfig,
    },
    prelude::*,
};

use crate::domain::batch::PAD_TOKEN;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct AuthorLmConfig {
    /// Largest token id in the corpus
    pub vocab_size:    usize,
    pub author_size:   usize,
    pub embedding_dim: usize,
    pub author_dim:    usize,
    pub hidden_size:   usize,
    pub dropout:       f64,
}

impl AuthorLmConfig {
    /// Token ids run from 0 (padding) to vocab_size inclusive.
    pub fn num_classes(&self) -> usize {
        self.vocab_size + 1
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> AuthorLm<B> {
        let token_embedding  = EmbeddingConfig::new(self.num_classes(), self.embedding_dim).init(device);
        let author_embedding = EmbeddingConfig::new(self.author_size.max(1), self.author_dim).init(device);
        let lstm = LstmConfig::new(self.embedding_dim + self.author_dim, self.hidden_size, true)
            .init(device);
        let dropout = DropoutConfig::new(self.dropout).init();
        let output  = LinearConfig::new(self.hidden_size, self.num_classes()).init(device);
        AuthorLm { token_embedding, author_embedding, lstm, dropout, output }
    }
}

/// Next-token LSTM conditioned on who wrote the sequence: the
/// author embedding is appended to every token embedding.
#[derive(Module, Debug)]
pub struct AuthorLm<B: Backend> {
    pub token_embedding:  Embedding<B>,
    pub author_embedding: Embedding<B>,
    pub lstm:             Lstm<B>,
    pub dropout:          Dropout,
    pub output:           Linear<B>,
}

impl<B: Backend> AuthorLm<B> {
    /// sequences: [batch, seq_len], authors: [batch] → logits: [batch, seq_len, classes]
    pub fn forward(&self, sequences: Tensor<B, 2, Int>, authors: Tensor<B, 1, Int>) -> Tensor<B, 3> {
        let [batch_size, seq_len] = sequences.dims();

        let tokens = self.token_embedding.forward(sequences);
        let author = self.author_embedding.forward(authors.unsqueeze_dim::<2>(1)); // [batch, 1, author_dim]
        let [_, _, author_dim] = author.dims();
        let author = author.expand([batch_size, seq_len, author_dim]);

        let x = Tensor::cat(vec![tokens, author], 2);
        let (hidden, _) = self.lstm.forward(x, None);
        self.output.forward(self.dropout.forward(hidden))
    }

    /// Mean cross-entropy over all non-padding target positions.
    pub fn forward_loss(
        &self,
        sequences: Tensor<B, 2, Int>,
        authors:   Tensor<B, 1, Int>,
        targets:   Tensor<B, 2, Int>,
    ) -> Tensor<B, 1> {
        let [batch_size, seq_len] = targets.dims();
        let logits = self.forward(sequences, authors);
        let [_, _, classes] = logits.dims();

        let ce = CrossEntropyLossConfig::new()
            .with_pad_tokens(Some(vec![PAD_TOKEN as usize]))
            .init(&logits.device());
        ce.forward(
            logits.reshape([batch_size * seq_len, classes]),
            targets.reshape([batch_size * seq_len]),
        )
    }
}
