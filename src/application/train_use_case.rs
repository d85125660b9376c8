// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full fine-tuning pipeline in order:
//
//   Step 1: Load labelled tweets           (Layer 4 - data)
//   Step 2: Fetch pretrained artifacts     (Layer 6 - infra)
//   Step 3: Encode tweets to fixed length  (Layer 4 - data)
//   Step 4: Split train/validation         (Layer 4 - data)
//   Step 5: Build BERT + load weights      (Layer 5 - ml)
//   Step 6: Save run config                (Layer 6 - infra)
//   Step 7: Run the training loop          (Layer 5 - ml)
//   Step 8: Save model + tokenizer         (Layer 6 - infra)
//   Step 9: Classify the sample tweets     (Layer 5 - ml)
//
// Reference: Burn Book §5 (Training)

use anyhow::{bail, Result};
use burn::{
    backend::{ndarray::NdArrayDevice, Autodiff, NdArray},
    module::AutodiffModule,
    tensor::backend::AutodiffBackend,
};
use serde::{Deserialize, Serialize};

use crate::application::predict_use_case::SAMPLE_TWEETS;
use crate::data::{
    dataset::TweetDataset,
    encoder::TweetEncoder,
    loader::{self, CsvTweetLoader},
    splitter::split_train_val,
};
use crate::domain::{prediction::Prediction, traits::{TweetClassifier, TweetSource}};
use crate::infra::{
    checkpoint::ModelStore,
    device::{ComputeBackend, DevicePreference},
    hub::{HubModelConfig, PretrainedFiles},
    metrics::MetricsLogger,
    tokenizer_store::TokenizerStore,
};
use crate::ml::{inferencer::DisasterClassifier, trainer::run_training, weights::load_pretrained};

/// Disaster / not-disaster
const NUM_LABELS: usize = 2;

// ─── Training Configuration ──────────────────────────────────────────────────
// All settings for one fine-tuning run. Saved next to the model as
// train_config.json so inference knows the sequence length used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_path:    String,
    pub output_dir:   String,
    /// HuggingFace Hub id or local directory of the pretrained encoder
    pub model:        String,
    pub max_len:      usize,
    pub batch_size:   usize,
    pub epochs:       usize,
    pub lr:           f64,
    pub val_fraction: f64,
    pub seed:         u64,
    pub device:       DevicePreference,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_path:    "train.csv".to_string(),
            output_dir:   "disaster_bert_model".to_string(),
            model:        "bert-base-uncased".to_string(),
            max_len:      64,
            batch_size:   16,
            epochs:       3,
            lr:           2e-5,
            val_fraction: 0.2,
            seed:         42,
            device:       DevicePreference::Auto,
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_len < 2 {
            bail!("max_len must be at least 2, got {}", self.max_len);
        }
        if self.batch_size == 0 {
            bail!("batch_size must be positive");
        }
        if self.val_fraction.is_nan() || self.val_fraction <= 0.0 || self.val_fraction >= 1.0 {
            bail!("val_fraction must be between 0 and 1, got {}", self.val_fraction);
        }
        if self.lr.is_nan() || self.lr <= 0.0 {
            bail!("learning rate must be positive, got {}", self.lr);
        }
        Ok(())
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Fine-tune, save, then return the verdicts for `SAMPLE_TWEETS`.
    pub fn execute(&self) -> Result<Vec<Prediction>> {
        self.config.validate()?;

        match self.config.device.resolve() {
            ComputeBackend::NdArray => self.run::<Autodiff<NdArray>>(&NdArrayDevice::default()),
            ComputeBackend::Wgpu => {
                #[cfg(feature = "wgpu")]
                let result = self.run::<Autodiff<burn::backend::Wgpu>>(&Default::default());
                #[cfg(not(feature = "wgpu"))]
                let result = self.run::<Autodiff<NdArray>>(&NdArrayDevice::default());
                result
            }
        }
    }

    fn run<B: AutodiffBackend>(&self, device: &B::Device) -> Result<Vec<Prediction>> {
        let cfg = &self.config;

        // ── Step 1: Load the labelled CSV ─────────────────────────────────────
        let tweets = CsvTweetLoader::new(&cfg.data_path).load_all()?;
        if tweets.is_empty() {
            bail!("No tweets found in '{}'", cfg.data_path);
        }
        loader::preview(&tweets, 5);
        let disasters = tweets.iter().filter(|t| t.is_disaster()).count();
        tracing::info!("{} disaster tweets, {} others", disasters, tweets.len() - disasters);

        // ── Step 2: Pretrained config, weights and tokenizer ──────────────────
        let files     = PretrainedFiles::resolve(&cfg.model)?;
        let model_cfg = HubModelConfig::from_file(&files.config)?.to_classifier_config(NUM_LABELS)?;
        if cfg.max_len > model_cfg.max_position_embeddings {
            bail!(
                "max_len {} exceeds the model's {} position embeddings",
                cfg.max_len,
                model_cfg.max_position_embeddings
            );
        }
        let encoder = TweetEncoder::new(TokenizerStore::load_file(&files.tokenizer)?, cfg.max_len)?;

        // ── Step 3: Encode every tweet to exactly max_len tokens ──────────────
        let first = encoder.encode(&tweets[0].text)?;
        println!("Original Tweet: {}", tweets[0].text);
        println!("Token IDs: {:?}", first.input_ids);
        println!("Attention Mask: {:?}", first.attention_mask);
        tracing::debug!("First tweet uses {} of {} positions", first.token_count(), cfg.max_len);

        let samples = encoder.encode_all(&tweets)?;

        // ── Step 4: Seeded train / validation split ───────────────────────────
        let (train_samples, val_samples) = split_train_val(samples, cfg.val_fraction, cfg.seed);
        if train_samples.is_empty() || val_samples.is_empty() {
            bail!(
                "{} tweets are too few to split into training and validation sets",
                tweets.len()
            );
        }
        let train_dataset = TweetDataset::new(train_samples);
        let val_dataset   = TweetDataset::new(val_samples);
        println!("Train shape: [{}, {}]", train_dataset.sample_count(), train_dataset.seq_len());
        println!("Validation shape: [{}, {}]", val_dataset.sample_count(), val_dataset.seq_len());

        // ── Step 5: BERT with pretrained encoder, fresh classifier head ───────
        let model = model_cfg.init::<B>(device);
        let model = load_pretrained(model, &model_cfg, &files.weights, device)?;
        println!("Model loaded on device: {:?}", device);

        // ── Step 6: Save the run config before training starts ────────────────
        let store   = ModelStore::new(&cfg.output_dir);
        store.save_train_config(cfg)?;
        let metrics = MetricsLogger::new(&cfg.output_dir)?;

        // ── Step 7: Fine-tune ─────────────────────────────────────────────────
        let outcome = run_training(
            cfg,
            model,
            train_dataset,
            val_dataset,
            device,
            &metrics,
        )?;
        if let Some(last) = outcome.history.last() {
            tracing::info!(
                "Final epoch {}: loss {:.4}, validation accuracy {:.4} (metrics in '{}')",
                last.epoch,
                last.train_loss,
                last.val_accuracy,
                metrics.csv_path().display()
            );
        }

        // ── Step 8: Persist weights + tokenizer ───────────────────────────────
        store.save(&outcome.model, &model_cfg, encoder.tokenizer())?;

        // ── Step 9: Classify the sample tweets with the fine-tuned model ──────
        let classifier = DisasterClassifier::new(outcome.model.valid(), encoder, device.clone());
        classifier.classify_all(SAMPLE_TWEETS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{test_train_config, write_pretrained_dir, write_train_csv};

    #[test]
    fn test_default_config_matches_reference_run() {
        let cfg = TrainConfig::default();
        assert_eq!(cfg.data_path, "train.csv");
        assert_eq!(cfg.output_dir, "disaster_bert_model");
        assert_eq!(cfg.model, "bert-base-uncased");
        assert_eq!((cfg.max_len, cfg.batch_size, cfg.epochs), (64, 16, 3));
        assert_eq!(cfg.lr, 2e-5);
        assert_eq!(cfg.val_fraction, 0.2);
        assert_eq!(cfg.seed, 42);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        let bad = [
            TrainConfig { batch_size: 0, ..TrainConfig::default() },
            TrainConfig { max_len: 1, ..TrainConfig::default() },
            TrainConfig { val_fraction: 0.0, ..TrainConfig::default() },
            TrainConfig { val_fraction: 1.0, ..TrainConfig::default() },
            TrainConfig { lr: 0.0, ..TrainConfig::default() },
        ];
        for cfg in bad {
            assert!(cfg.validate().is_err(), "{cfg:?}");
        }
    }

    #[test]
    fn test_end_to_end_on_cpu() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = test_train_config(&dir.path().join("out"));
        cfg.model     = write_pretrained_dir(&dir.path().join("bert")).display().to_string();
        cfg.data_path = write_train_csv(dir.path(), 12).display().to_string();

        let preds = TrainUseCase::new(cfg.clone()).execute().unwrap();

        assert_eq!(preds.len(), SAMPLE_TWEETS.len());
        for (pred, text) in preds.iter().zip(SAMPLE_TWEETS) {
            assert_eq!(pred.text, *text);
            assert!((0.0..=1.0).contains(&pred.disaster_probability));
        }

        let out = std::path::Path::new(&cfg.output_dir);
        for file in ["model.mpk", "config.json", "tokenizer.json", "train_config.json", "metrics.csv"] {
            assert!(out.join(file).is_file(), "missing {file}");
        }
    }

    #[test]
    fn test_single_tweet_cannot_be_split() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = test_train_config(&dir.path().join("out"));
        cfg.model     = write_pretrained_dir(&dir.path().join("bert")).display().to_string();
        cfg.data_path = write_train_csv(dir.path(), 1).display().to_string();

        let err = TrainUseCase::new(cfg).execute().unwrap_err();
        assert!(err.to_string().contains("too few"), "{err}");
    }
}
