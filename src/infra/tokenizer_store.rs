// ============================================================
// Layer 6 — Tokenizer Store
// ============================================================
// Saves and loads the HuggingFace tokenizer that travels with
// a fine-tuned model, so inference splits text exactly the way
// training did.
//
// File: {dir}/tokenizer.json (HuggingFace JSON format)

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use tokenizers::Tokenizer;

pub struct TokenizerStore {
    dir: PathBuf,
}

impl TokenizerStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join("tokenizer.json")
    }

    /// Load the tokenizer saved in this directory
    pub fn load(&self) -> Result<Tokenizer> {
        Self::load_file(self.path())
    }

    /// Load a tokenizer JSON from anywhere, e.g. a pretrained
    /// model's download location
    pub fn load_file(path: impl AsRef<Path>) -> Result<Tokenizer> {
        let path = path.as_ref();
        Tokenizer::from_file(path)
            .map_err(|e| anyhow!("Cannot load tokenizer from '{}': {}", path.display(), e))
    }

    pub fn save(&self, tokenizer: &Tokenizer) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;

        let path = self.path();
        tokenizer
            .save(&path, true)
            .map_err(|e| anyhow!("Cannot write tokenizer to '{}': {}", path.display(), e))?;

        tracing::debug!("Saved tokenizer to '{}'", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_tokenizer;

    #[test]
    fn test_save_then_load_encodes_identically() {
        let dir   = tempfile::tempdir().unwrap();
        let store = TokenizerStore::new(dir.path().join("model"));
        let tok   = test_tokenizer();

        store.save(&tok).unwrap();
        let back = store.load().unwrap();

        let text = "Flood warning in Tokyo";
        assert_eq!(
            tok.encode(text, false).unwrap().get_ids(),
            back.encode(text, false).unwrap().get_ids(),
        );
    }

    #[test]
    fn test_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = TokenizerStore::new(dir.path()).load().unwrap_err();
        assert!(err.to_string().contains("tokenizer.json"));
    }
}
