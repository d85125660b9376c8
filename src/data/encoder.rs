// ============================================================
// Layer 4 — Tweet Encoder
// ============================================================
// Turns raw tweet text into the fixed-length id/mask pair the
// BERT model consumes:
//
//   [CLS] tok tok tok ... [SEP] [PAD] [PAD] ... [PAD]
//    1    1   1   1       1     0     0         0     ← attention mask
//
// Word-piece splitting and lower-casing are the tokenizer's job;
// this module only frames, truncates and pads, so every output
// is exactly `max_len` long no matter how long the tweet is.

use anyhow::{anyhow, bail, Result};
use tokenizers::Tokenizer;

use crate::data::dataset::TweetSample;
use crate::domain::tweet::Tweet;

/// Token ids and attention mask for one piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedTweet {
    pub input_ids:      Vec<u32>,
    pub attention_mask: Vec<u32>,
}

impl EncodedTweet {
    /// Number of real (non-padding) tokens, [CLS] and [SEP] included
    pub fn token_count(&self) -> usize {
        self.attention_mask.iter().filter(|&&m| m == 1).count()
    }
}

#[derive(Clone)]
pub struct TweetEncoder {
    tokenizer: Tokenizer,
    max_len:   usize,
    cls_id:    u32,
    sep_id:    u32,
    pad_id:    u32,
}

impl TweetEncoder {
    /// Wrap a tokenizer. Fails if its vocabulary has no
    /// [CLS], [SEP] or [PAD] token, or if `max_len` can't even
    /// hold the two framing tokens.
    pub fn new(tokenizer: Tokenizer, max_len: usize) -> Result<Self> {
        if max_len < 2 {
            bail!("max_len must be at least 2 to fit [CLS] and [SEP], got {max_len}");
        }
        let lookup = |token: &str| {
            tokenizer
                .token_to_id(token)
                .ok_or_else(|| anyhow!("Tokenizer vocabulary has no {token} token"))
        };
        let cls_id = lookup("[CLS]")?;
        let sep_id = lookup("[SEP]")?;
        let pad_id = lookup("[PAD]")?;

        Ok(Self { tokenizer, max_len, cls_id, sep_id, pad_id })
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn encode(&self, text: &str) -> Result<EncodedTweet> {
        let enc = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| anyhow!("Tokenisation error: {e}"))?;

        // Leave room for [CLS] and [SEP]
        let body = enc.get_ids();
        let body = &body[..body.len().min(self.max_len - 2)];

        let mut input_ids = Vec::with_capacity(self.max_len);
        input_ids.push(self.cls_id);
        input_ids.extend_from_slice(body);
        input_ids.push(self.sep_id);

        let mut attention_mask = vec![1u32; input_ids.len()];
        input_ids.resize(self.max_len, self.pad_id);
        attention_mask.resize(self.max_len, 0);

        Ok(EncodedTweet { input_ids, attention_mask })
    }

    pub fn encode_tweet(&self, tweet: &Tweet) -> Result<TweetSample> {
        let enc = self.encode(&tweet.text)?;
        Ok(TweetSample {
            input_ids:      enc.input_ids,
            attention_mask: enc.attention_mask,
            label:          tweet.target,
        })
    }

    pub fn encode_all(&self, tweets: &[Tweet]) -> Result<Vec<TweetSample>> {
        tweets.iter().map(|t| self.encode_tweet(t)).collect()
    }
}
