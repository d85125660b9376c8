// ============================================================
// Layer 2 — PredictUseCase
// ============================================================
// Loads a saved model directory and classifies tweets:
//
//   Step 1: Rebuild model + tokenizer   (Layer 6 - infra)
//   Step 2: Classify each tweet         (Layer 5 - ml)
//
// Runs on a plain backend: no autodiff, no dropout.

use anyhow::Result;
use burn::{
    backend::{ndarray::NdArrayDevice, NdArray},
    prelude::Backend,
};

use crate::domain::{prediction::Prediction, traits::TweetClassifier};
use crate::infra::{
    checkpoint::ModelStore,
    device::{ComputeBackend, DevicePreference},
};
use crate::ml::inferencer::DisasterClassifier;

/// Tweets classified at the end of training, and by `predict`
/// when no tweets are given.
pub const SAMPLE_TWEETS: &[&str] = &[
    "Breaking news: Earthquake tremors felt in downtown Tokyo.",
    "Can’t believe how amazing the concert was last night!",
    "Severe flooding reported near the river banks. Evacuation ongoing.",
    "I’m so excited for the new movie release tomorrow!",
    "Wildfire spreads rapidly in California, residents warned to evacuate.",
];

pub struct PredictUseCase {
    model_dir: String,
    device:    DevicePreference,
}

impl PredictUseCase {
    pub fn new(model_dir: impl Into<String>, device: DevicePreference) -> Self {
        Self { model_dir: model_dir.into(), device }
    }

    /// Classify `tweets`, or `SAMPLE_TWEETS` if the list is empty.
    pub fn execute<S: AsRef<str>>(&self, tweets: &[S]) -> Result<Vec<Prediction>> {
        match self.device.resolve() {
            ComputeBackend::NdArray => self.run::<NdArray, S>(&NdArrayDevice::default(), tweets),
            ComputeBackend::Wgpu => {
                #[cfg(feature = "wgpu")]
                let result = self.run::<burn::backend::Wgpu, S>(&Default::default(), tweets);
                #[cfg(not(feature = "wgpu"))]
                let result = self.run::<NdArray, S>(&NdArrayDevice::default(), tweets);
                result
            }
        }
    }

    fn run<B: Backend, S: AsRef<str>>(&self, device: &B::Device, tweets: &[S]) -> Result<Vec<Prediction>> {
        let store      = ModelStore::new(&self.model_dir);
        let classifier = DisasterClassifier::<B>::from_store(&store, device)?;

        if tweets.is_empty() {
            classifier.classify_all(SAMPLE_TWEETS)
        } else {
            classifier.classify_all(tweets)
        }
    }
}
