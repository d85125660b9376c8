// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer talks to data sources and classifiers
// through these traits, so the CSV loader or the Burn model can
// be swapped without touching the use cases.

use anyhow::Result;

use crate::domain::{prediction::Prediction, tweet::Tweet};

// ─── TweetSource ──────────────────────────────────────────────────────────────
/// Any component that can produce labelled tweets.
///
/// Implementations:
///   - CsvTweetLoader → reads `text` / `target` columns from a CSV file
pub trait TweetSource {
    fn load_all(&self) -> Result<Vec<Tweet>>;
}

// ─── TweetClassifier ──────────────────────────────────────────────────────────
/// Any component that can decide whether a tweet is about a disaster.
///
/// Implementations:
///   - DisasterClassifier → fine-tuned BERT model
pub trait TweetClassifier {
    fn classify(&self, text: &str) -> Result<Prediction>;

    /// Classify several tweets in order, stopping at the first failure.
    fn classify_all<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<Prediction>> {
        texts.iter().map(|t| self.classify(t.as_ref())).collect()
    }
}
