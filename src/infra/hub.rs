// ============================================================
// Layer 6 — Pretrained Artifacts
// ============================================================
// Locates the three files a pretrained BERT needs:
//
//   config.json        → architecture (hidden size, layers, ...)
//   model.safetensors  → encoder weights
//   tokenizer.json     → WordPiece vocabulary + normaliser
//
// `--model` is either a local directory holding those files or
// a HuggingFace Hub id such as `bert-base-uncased`, which is
// downloaded once into the hf-hub cache (~/.cache/huggingface).

use anyhow::{anyhow, bail, Context, Result};
use hf_hub::api::sync::Api;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::ml::model::BertClassifierConfig;

const CONFIG_FILE:    &str = "config.json";
const WEIGHTS_FILE:   &str = "model.safetensors";
const TOKENIZER_FILE: &str = "tokenizer.json";

#[derive(Debug, Clone)]
pub struct PretrainedFiles {
    pub config:    PathBuf,
    pub weights:   PathBuf,
    pub tokenizer: PathBuf,
}

impl PretrainedFiles {
    /// Local directory if the path exists, Hub download otherwise.
    pub fn resolve(model_id_or_path: &str) -> Result<Self> {
        let local = Path::new(model_id_or_path);
        if local.is_dir() {
            tracing::info!("Loading pretrained model from local path: {}", model_id_or_path);
            Self::from_local(local)
        } else if model_id_or_path.starts_with('.') || model_id_or_path.starts_with('/') {
            bail!("Local model path does not exist: {}", model_id_or_path)
        } else {
            Self::download(model_id_or_path)
        }
    }

    pub fn from_local(dir: &Path) -> Result<Self> {
        let require = |name: &str| {
            let path = dir.join(name);
            if path.is_file() {
                Ok(path)
            } else {
                Err(anyhow!("{} not found in '{}'", name, dir.display()))
            }
        };
        Ok(Self {
            config:    require(CONFIG_FILE)?,
            weights:   require(WEIGHTS_FILE)?,
            tokenizer: require(TOKENIZER_FILE)?,
        })
    }

    fn download(model_id: &str) -> Result<Self> {
        tracing::info!("Downloading model from HuggingFace Hub: {}", model_id);

        let api  = Api::new().context("Failed to initialise HuggingFace Hub API")?;
        let repo = api.model(model_id.to_string());
        let get  = |name: &str| {
            repo.get(name)
                .with_context(|| format!("Failed to download {name} for '{model_id}'"))
        };

        let files = Self {
            config:    get(CONFIG_FILE)?,
            weights:   get(WEIGHTS_FILE)?,
            tokenizer: get(TOKENIZER_FILE)?,
        };
        tracing::debug!("Pretrained files: {:?}", files);
        Ok(files)
    }
}

/// The subset of a HuggingFace `config.json` the classifier uses.
/// Missing fields fall back to `bert-base-uncased` values.
#[derive(Debug, Clone, Deserialize)]
pub struct HubModelConfig {
    #[serde(default)]
    pub architectures: Vec<String>,
    pub model_type: Option<String>,
    pub vocab_size: Option<usize>,
    pub hidden_size: Option<usize>,
    pub num_hidden_layers: Option<usize>,
    pub num_attention_heads: Option<usize>,
    pub intermediate_size: Option<usize>,
    pub hidden_act: Option<String>,
    pub hidden_dropout_prob: Option<f64>,
    pub attention_probs_dropout_prob: Option<f64>,
    pub max_position_embeddings: Option<usize>,
    pub type_vocab_size: Option<usize>,
    pub layer_norm_eps: Option<f64>,
}

impl HubModelConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read model config '{}'", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Cannot parse model config '{}'", path.display()))
    }

    fn is_bert(&self) -> bool {
        match &self.model_type {
            Some(t) => t == "bert",
            None    => self.architectures.iter().any(|a| a.starts_with("Bert")),
        }
    }

    /// Classifier config with `num_labels` outputs on top of this encoder.
    pub fn to_classifier_config(&self, num_labels: usize) -> Result<BertClassifierConfig> {
        if !self.is_bert() {
            bail!(
                "Model is not a BERT encoder. model_type: {:?}, architectures: {:?}",
                self.model_type,
                self.architectures
            );
        }
        if let Some(act) = self.hidden_act.as_deref() {
            if act != "gelu" {
                bail!("Unsupported hidden activation '{act}', only gelu is implemented");
            }
        }
        let vocab_size = self
            .vocab_size
            .ok_or_else(|| anyhow!("Model config is missing vocab_size"))?;

        let mut cfg = BertClassifierConfig::new(vocab_size).with_num_labels(num_labels);
        if let Some(v) = self.hidden_size                  { cfg = cfg.with_hidden_size(v); }
        if let Some(v) = self.num_hidden_layers            { cfg = cfg.with_num_hidden_layers(v); }
        if let Some(v) = self.num_attention_heads          { cfg = cfg.with_num_attention_heads(v); }
        if let Some(v) = self.intermediate_size            { cfg = cfg.with_intermediate_size(v); }
        if let Some(v) = self.max_position_embeddings      { cfg = cfg.with_max_position_embeddings(v); }
        if let Some(v) = self.type_vocab_size              { cfg = cfg.with_type_vocab_size(v); }
        if let Some(v) = self.layer_norm_eps               { cfg = cfg.with_layer_norm_eps(v); }
        if let Some(v) = self.hidden_dropout_prob          { cfg = cfg.with_hidden_dropout_prob(v); }
        if let Some(v) = self.attention_probs_dropout_prob { cfg = cfg.with_attention_probs_dropout_prob(v); }

        cfg.validate()?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BERT_BASE: &str = r#"{
        "architectures": ["BertForMaskedLM"],
        "attention_probs_dropout_prob": 0.1,
        "hidden_act": "gelu",
        "hidden_dropout_prob": 0.1,
        "hidden_size": 768,
        "initializer_range": 0.02,
        "intermediate_size": 3072,
        "layer_norm_eps": 1e-12,
        "max_position_embeddings": 512,
        "model_type": "bert",
        "num_attention_heads": 12,
        "num_hidden_layers": 12,
        "pad_token_id": 0,
        "type_vocab_size": 2,
        "vocab_size": 30522
    }"#;

    #[test]
    fn test_bert_base_config_converts() {
        let hub: HubModelConfig = serde_json::from_str(BERT_BASE).unwrap();
        let cfg = hub.to_classifier_config(2).unwrap();

        assert_eq!(cfg.vocab_size, 30522);
        assert_eq!(cfg.hidden_size, 768);
        assert_eq!(cfg.num_hidden_layers, 12);
        assert_eq!(cfg.head_dim(), 64);
        assert_eq!(cfg.num_labels, 2);
    }

    #[test]
    fn test_rejects_other_model_types() {
        let json = BERT_BASE.replace(r#""model_type": "bert""#, r#""model_type": "roberta""#);
        let hub: HubModelConfig = serde_json::from_str(&json).unwrap();
        assert!(hub.to_classifier_config(2).is_err());
    }

    #[test]
    fn test_missing_vocab_is_an_error() {
        let hub: HubModelConfig = serde_json::from_str(r#"{"model_type": "bert"}"#).unwrap();
        assert!(hub.to_classifier_config(2).is_err());
    }

    #[test]
    fn test_local_directory_must_hold_all_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), BERT_BASE).unwrap();
        std::fs::write(dir.path().join(TOKENIZER_FILE), "{}").unwrap();

        let err = PretrainedFiles::resolve(dir.path().to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains(WEIGHTS_FILE), "{err}");

        std::fs::write(dir.path().join(WEIGHTS_FILE), b"").unwrap();
        let files = PretrainedFiles::resolve(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(files.weights, dir.path().join(WEIGHTS_FILE));
    }

    #[test]
    fn test_missing_local_path_is_not_downloaded() {
        assert!(PretrainedFiles::resolve("./no/such/model").is_err());
    }
}
