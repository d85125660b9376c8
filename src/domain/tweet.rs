// ============================================================
// Layer 3 — Tweet Domain Type
// ============================================================
// One row of the training CSV: the raw tweet text and its
// binary target (1 = about a real disaster, 0 = not).

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Target value for tweets about a real disaster.
pub const DISASTER: u8 = 1;

/// Target value for everything else.
pub const NOT_DISASTER: u8 = 0;

/// A labelled tweet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tweet {
    /// Raw tweet text, untouched; the tokenizer normalises it
    pub text: String,

    /// Binary target, always 0 or 1
    pub target: u8,
}

impl Tweet {
    /// Create a tweet, rejecting any target outside {0, 1}.
    pub fn new(text: impl Into<String>, target: u8) -> Result<Self> {
        if target != DISASTER && target != NOT_DISASTER {
            bail!("target must be 0 or 1, got {target}");
        }
        Ok(Self { text: text.into(), target })
    }

    pub fn is_disaster(&self) -> bool {
        self.target == DISASTER
    }
}
