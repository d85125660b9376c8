// ============================================================
// Layer 4 — Tweet Batcher
// ============================================================
// Implements Burn's Batcher trait to stack a Vec<TweetSample>
// into tensors:
//
//   Input:  N samples, each with sequences of length L
//   Output: TweetBatch with ids/mask [N, L] and labels [N]
//
// All samples are padded to the same length by the encoder,
// so stacking is a flatten + reshape.

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::TweetSample;

#[derive(Debug, Clone)]
pub struct TweetBatch<B: Backend> {
    /// Token ids — shape: [batch_size, seq_len]
    pub input_ids: Tensor<B, 2, Int>,

    /// 1 = real token, 0 = padding — shape: [batch_size, seq_len]
    pub attention_mask: Tensor<B, 2, Int>,

    /// Class targets — shape: [batch_size]
    pub labels: Tensor<B, 1, Int>,
}

/// Holds the target device so tensors are created on the
/// correct GPU/CPU.
#[derive(Clone, Debug)]
pub struct TweetBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> TweetBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<TweetSample, TweetBatch<B>> for TweetBatcher<B> {
    fn batch(&self, items: Vec<TweetSample>) -> TweetBatch<B> {
        let batch_size = items.len();
        let seq_len    = items.first().map_or(0, |s| s.input_ids.len());

        // Burn Int tensors are built from i32 slices
        let input_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.input_ids.iter().map(|&x| x as i32))
            .collect();

        let mask_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.attention_mask.iter().map(|&x| x as i32))
            .collect();

        let labels: Vec<i32> = items.iter().map(|s| s.label as i32).collect();

        let input_ids = Tensor::<B, 1, Int>::from_ints(
            input_flat.as_slice(), &self.device
        ).reshape([batch_size, seq_len]);

        let attention_mask = Tensor::<B, 1, Int>::from_ints(
            mask_flat.as_slice(), &self.device
        ).reshape([batch_size, seq_len]);

        let labels = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), &self.device);

        TweetBatch { input_ids, attention_mask, labels }
    }
}
