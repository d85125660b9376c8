// ============================================================
// Layer 6 — Model Store
// ============================================================
// Saves and restores a fine-tuned classifier as a directory:
//
//   disaster_bert_model/
//     model.mpk           ← weights (Burn DefaultRecorder:
//                           named MessagePack, full precision)
//     config.json         ← BertClassifierConfig, needed to
//                           rebuild the module tree before the
//                           weights can be loaded into it
//     tokenizer.json      ← the tokenizer the model was trained with
//     train_config.json   ← hyperparameters of the run
//     metrics.csv         ← written by MetricsLogger
//
// Loading fails if the record does not match the architecture
// described by config.json.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{anyhow, Context, Result};
use burn::{
    prelude::*,
    record::{DefaultRecorder, Recorder},
};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tokenizers::Tokenizer;

use crate::application::train_use_case::TrainConfig;
use crate::infra::tokenizer_store::TokenizerStore;
use crate::ml::model::{BertClassifier, BertClassifierConfig};

const MODEL_FILE:        &str = "model";
const CONFIG_FILE:       &str = "config.json";
const TRAIN_CONFIG_FILE: &str = "train_config.json";

pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write weights, model config and tokenizer.
    pub fn save<B: Backend>(
        &self,
        model:     &BertClassifier<B>,
        config:    &BertClassifierConfig,
        tokenizer: &Tokenizer,
    ) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;

        // The recorder appends the .mpk extension itself
        let path = self.dir.join(MODEL_FILE);
        DefaultRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save model to '{}'", path.display()))?;

        let config_path = self.dir.join(CONFIG_FILE);
        config
            .save(&config_path)
            .with_context(|| format!("Cannot write '{}'", config_path.display()))?;

        TokenizerStore::new(&self.dir).save(tokenizer)?;

        tracing::info!("Model saved to '{}'", self.dir.display());
        Ok(())
    }

    pub fn save_train_config(&self, cfg: &TrainConfig) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;

        let path = self.dir.join(TRAIN_CONFIG_FILE);
        fs::write(&path, serde_json::to_string_pretty(cfg)?)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    pub fn load_train_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join(TRAIN_CONFIG_FILE);
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read '{}'. Make sure you have run 'train' before 'predict'.",
                path.display()
            )
        })?;
        serde_json::from_str(&json)
            .with_context(|| format!("Cannot parse '{}'", path.display()))
    }

    pub fn load_config(&self) -> Result<BertClassifierConfig> {
        let path = self.dir.join(CONFIG_FILE);
        BertClassifierConfig::load(&path)
            .map_err(|e| anyhow!("Cannot load model config '{}': {}", path.display(), e))
    }

    /// Rebuild the architecture from config.json, then load the weights into it.
    pub fn load_model<B: Backend>(&self, device: &B::Device) -> Result<BertClassifier<B>> {
        let config = self.load_config()?;
        config.validate()?;
        let model = config.init::<B>(device);

        let path   = self.dir.join(MODEL_FILE);
        let record = DefaultRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load model weights '{}'. Have you trained the model first?",
                    path.display())
            })?;

        Ok(model.load_record(record))
    }

    pub fn load_tokenizer(&self) -> Result<Tokenizer> {
        TokenizerStore::new(&self.dir).load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::encoder::TweetEncoder;
    use crate::ml::inferencer::DisasterClassifier;
    use crate::test_support::{
        test_model_config, test_tokenizer, test_train_config, TestBackend, TEST_MAX_LEN,
    };

    const TEXT: &str = "Massive earthquake hits Tokyo, buildings collapsed";

    #[test]
    fn test_save_and_reload_preserves_predictions() {
        let dir    = tempfile::tempdir().unwrap();
        let store  = ModelStore::new(dir.path().join("disaster_bert_model"));
        let device = Default::default();

        let cfg   = test_model_config();
        let model = cfg.init::<TestBackend>(&device);
        let tok   = test_tokenizer();

        store.save(&model, &cfg, &tok).unwrap();
        store.save_train_config(&test_train_config(store.dir())).unwrap();

        let before = DisasterClassifier::new(
            model,
            TweetEncoder::new(tok, TEST_MAX_LEN).unwrap(),
            device.clone(),
        )
        .probabilities(TEXT)
        .unwrap();

        let reloaded = DisasterClassifier::<TestBackend>::from_store(&store, &device).unwrap();
        let after    = reloaded.probabilities(TEXT).unwrap();

        assert_eq!(before.len(), after.len());
        for (a, b) in before.iter().zip(&after) {
            assert!((a - b).abs() < 1e-6, "{before:?} vs {after:?}");
        }
    }

    #[test]
    fn test_configs_round_trip() {
        let dir   = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path());

        let train = test_train_config(dir.path());
        store.save_train_config(&train).unwrap();
        let back = store.load_train_config().unwrap();
        assert_eq!(back.max_len, train.max_len);
        assert_eq!(back.seed, train.seed);

        let cfg = test_model_config();
        cfg.save(dir.path().join(CONFIG_FILE)).unwrap();
        let back = store.load_config().unwrap();
        assert_eq!(back.hidden_size, cfg.hidden_size);
        assert_eq!(back.vocab_size, cfg.vocab_size);
    }

    #[test]
    fn test_loading_before_training_fails() {
        let dir   = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path());
        assert!(store.load_train_config().is_err());
        assert!(store.load_model::<TestBackend>(&Default::default()).is_err());
    }
}
