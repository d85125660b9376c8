// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns used by several layers:
//
//   checkpoint.rs      — The saved-model directory: weights,
//                        model config, tokenizer, train config
//
//   hub.rs             — Pretrained config/weights/tokenizer,
//                        from a local directory or the
//                        HuggingFace Hub
//
//   tokenizer_store.rs — tokenizer.json persistence
//
//   metrics.rs         — Per-epoch metrics CSV
//
//   device.rs          — Maps the --device flag to a backend
//
// Reference: Rust Book §7 (Modules)
//            Burn Book §5 (Checkpointing)

/// Fine-tuned model saving and loading
pub mod checkpoint;

/// Pretrained artifact resolution
pub mod hub;

/// Tokenizer saving and loading
pub mod tokenizer_store;

/// Training metrics CSV logger
pub mod metrics;

/// Compute backend selection
pub mod device;
