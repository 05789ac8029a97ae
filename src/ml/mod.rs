// ============================================================
// Layer 5 — ML / Training Layer
// ============================================================
// All Burn framework code lives in model.rs and network.rs.
// The training loop itself only sees the TrainableModel trait,
// so it is tested without a GPU.
//
//   model.rs    — AuthorLm: token + author embeddings, LSTM,
//                 projection to next-token logits
//
//   network.rs  — AuthorLm + Adam behind TrainableModel,
//                 including checkpoint records
//
//   schedule.rs — Exponential learning-rate decay keyed on the
//                 global step
//
//   trainer.rs  — The resumable epoch/batch loop
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)

/// Author-conditioned LSTM language model
pub mod model;

/// Burn model + optimiser as a TrainableModel
pub mod network;

/// Learning-rate decay
pub mod schedule;

/// Resumable training loop
pub mod trainer;
