// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers to accomplish one goal each
// (fine-tuning, or classifying with a saved model).
//
// Rules for this layer:
//   - No ML math or model code here
//   - No verdict formatting here (that's Layer 1)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern

// The fine-tuning workflow
pub mod train_use_case;

// Classification with a saved model
pub mod predict_use_case;
