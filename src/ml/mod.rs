// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All model maths lives here:
//
//   model.rs      — BERT encoder + pooler + classification head
//                   written with Burn modules
//
//   weights.rs    — Copies a HuggingFace safetensors checkpoint
//                   into the Burn module tree
//
//   trainer.rs    — Fine-tuning loop: forward, loss, backward,
//                   AdamW step, per-epoch validation accuracy
//
//   inferencer.rs — Softmax verdicts for single tweets
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Devlin et al. (2019) BERT

/// BERT sequence classifier architecture
pub mod model;

/// Pretrained weight import
pub mod weights;

/// Fine-tuning loop with validation
pub mod trainer;

/// Inference on raw tweet text
pub mod inferencer;
