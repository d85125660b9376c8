// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Classifies single tweets with a fine-tuned model:
//
//   text ─► TweetEncoder ─► [1, max_len] ids + mask
//        ─► BertClassifier::forward ─► logits [1, 2]
//        ─► softmax ─► p(disaster) = probs[1]
//
// Runs on a plain (non-autodiff) backend, so no gradient graph
// is ever built.

use anyhow::Result;
use burn::{prelude::*, tensor::activation::softmax};

use crate::data::encoder::{EncodedTweet, TweetEncoder};
use crate::domain::{prediction::Prediction, tweet::DISASTER, traits::TweetClassifier};
use crate::infra::checkpoint::ModelStore;
use crate::ml::{model::BertClassifier, trainer::argmax};

pub struct DisasterClassifier<B: Backend> {
    model:   BertClassifier<B>,
    encoder: TweetEncoder,
    device:  B::Device,
}

impl<B: Backend> DisasterClassifier<B> {
    pub fn new(model: BertClassifier<B>, encoder: TweetEncoder, device: B::Device) -> Self {
        Self { model, encoder, device }
    }

    /// Rebuild the classifier saved in `store`: model config,
    /// weights, tokenizer and the sequence length it was trained with.
    pub fn from_store(store: &ModelStore, device: &B::Device) -> Result<Self> {
        let train_cfg = store.load_train_config()?;
        let model     = store.load_model::<B>(device)?;
        let encoder   = TweetEncoder::new(store.load_tokenizer()?, train_cfg.max_len)?;

        tracing::info!("Model loaded from '{}'", store.dir().display());
        Ok(Self::new(model, encoder, device.clone()))
    }

    /// Class probabilities for one tweet, in label order
    pub fn probabilities(&self, text: &str) -> Result<Vec<f32>> {
        let EncodedTweet { input_ids, attention_mask } = self.encoder.encode(text)?;
        let len = input_ids.len();

        let ids: Vec<i32>  = input_ids.iter().map(|&x| x as i32).collect();
        let mask: Vec<i32> = attention_mask.iter().map(|&x| x as i32).collect();

        let ids  = Tensor::<B, 1, Int>::from_ints(ids.as_slice(), &self.device).reshape([1, len]);
        let mask = Tensor::<B, 1, Int>::from_ints(mask.as_slice(), &self.device).reshape([1, len]);

        let logits = self.model.forward(ids, mask);
        Ok(softmax(logits, 1).into_data().iter::<f32>().collect())
    }
}

impl<B: Backend> TweetClassifier for DisasterClassifier<B> {
    fn classify(&self, text: &str) -> Result<Prediction> {
        let probs = self.probabilities(text)?;
        let label = argmax(&probs);
        let p     = probs.get(DISASTER as usize).copied().unwrap_or(0.0);

        tracing::debug!("'{}' → label {} (p_disaster={:.4})", text, label, p);
        Ok(Prediction::new(text, p, label == DISASTER as usize))
    }
}
