// ============================================================
// Layer 3 — Prediction Domain Type
// ============================================================

use serde::{Deserialize, Serialize};

/// The classifier's verdict for a single tweet.
///
/// `is_disaster` comes from the argmax over both class
/// probabilities, which for two classes is the same as
/// `disaster_probability > 0.5` (ties go to "not a disaster").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub text: String,

    /// Softmax probability of the disaster class, in [0, 1]
    pub disaster_probability: f32,

    pub is_disaster: bool,
}

impl Prediction {
    pub fn new(text: impl Into<String>, disaster_probability: f32, is_disaster: bool) -> Self {
        Self {
            text: text.into(),
            disaster_probability,
            is_disaster,
        }
    }
}
