// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types describing what the system works with:
// labelled tweets going in, predictions coming out.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O or network calls
//   - Only plain Rust structs, enums, and traits

// A labelled tweet read from the dataset
pub mod tweet;

// The verdict produced for one tweet at inference time
pub mod prediction;

// Core abstractions (traits) that other layers implement
pub mod traits;
