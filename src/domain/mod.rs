// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust structs, enums, and traits that define the core
// concepts of the trainer.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// One mini-batch of padded token rows
pub mod batch;

// Fatal error taxonomy shared by every layer
pub mod error;

// Global step counter and the epoch/offset derived from it
pub mod progress;

// Core abstractions (traits) that other layers implement
pub mod traits;
