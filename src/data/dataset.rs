// ============================================================
// Layer 4 — Tweet Dataset
// ============================================================
// Wraps the encoded samples so Burn's DataLoader can call
// .get(index) and .len() on them.

use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

/// One fully tokenised and padded training sample.
/// Sequence format: [CLS] tweet [SEP] [PAD]...
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TweetSample {
    pub input_ids:      Vec<u32>,
    pub attention_mask: Vec<u32>,
    pub label:          u8,
}

pub struct TweetDataset {
    samples: Vec<TweetSample>,
}

impl TweetDataset {
    pub fn new(samples: Vec<TweetSample>) -> Self { Self { samples } }

    pub fn sample_count(&self) -> usize { self.samples.len() }

    /// Sequence length shared by every sample (0 when empty)
    pub fn seq_len(&self) -> usize {
        self.samples.first().map_or(0, |s| s.input_ids.len())
    }
}

impl Dataset<TweetSample> for TweetDataset {
    fn get(&self, index: usize) -> Option<TweetSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
