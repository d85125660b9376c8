// ============================================================
// Test Fixtures
// ============================================================
// Shared by the unit tests of every layer: a CPU backend, a
// tiny BERT configuration and a word-level tokenizer with
// BERT's special tokens, so nothing needs a download.

use std::path::{Path, PathBuf};

use safetensors::{tensor::TensorView, Dtype};
use tokenizers::Tokenizer;

use crate::application::train_use_case::TrainConfig;
use crate::infra::device::DevicePreference;
use crate::ml::{model::BertClassifierConfig, weights::pretrained_tensor_shapes};

pub type TestBackend  = burn::backend::NdArray;
pub type TestAutodiff = burn::backend::Autodiff<TestBackend>;

pub const TEST_MAX_LEN: usize = 64;

const TEST_WORDS: &[&str] = &[
    "flood", "warning", "fire", "earthquake", "in", "tokyo", "wildfire",
    "spreads", "rapidly", "california", "residents", "warned", "to",
    "evacuate", "just", "watched", "an", "amazing", "movie", "the",
    "concert", "was", "on", "tonight", "huge", "hit", "downtown", "area",
    "storm", "coming", "i", "love", "this", "song", "best", "day", "ever",
    "my", "new", "phone", "is",
];

/// Word-level tokenizer in HuggingFace JSON form: BERT specials
/// at ids 0..=4, then `TEST_WORDS` in order.
pub fn test_tokenizer() -> Tokenizer {
    let mut vocab = serde_json::json!({
        "[PAD]":  0,
        "[UNK]":  1,
        "[CLS]":  2,
        "[SEP]":  3,
        "[MASK]": 4,
    });
    for (i, word) in TEST_WORDS.iter().enumerate() {
        vocab[*word] = serde_json::json!(i + 5);
    }

    let special = |id: u32, content: &str| serde_json::json!({
        "id": id, "content": content, "single_word": false, "lstrip": false,
        "rstrip": false, "normalized": false, "special": true
    });

    let tokenizer_json = serde_json::json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [
            special(0, "[PAD]"),
            special(1, "[UNK]"),
            special(2, "[CLS]"),
            special(3, "[SEP]"),
            special(4, "[MASK]"),
        ],
        "normalizer": {
            "type": "BertNormalizer",
            "clean_text": true,
            "handle_chinese_chars": true,
            "strip_accents": null,
            "lowercase": true
        },
        "pre_tokenizer": { "type": "Whitespace" },
        "post_processor": null,
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": vocab,
            "unk_token": "[UNK]"
        }
    });

    Tokenizer::from_bytes(tokenizer_json.to_string().as_bytes()).unwrap()
}

/// Two-layer, 16-wide BERT whose vocabulary covers `test_tokenizer`.
pub fn test_model_config() -> BertClassifierConfig {
    BertClassifierConfig::new(TEST_WORDS.len() + 16)
        .with_hidden_size(16)
        .with_num_hidden_layers(2)
        .with_num_attention_heads(2)
        .with_intermediate_size(32)
        .with_max_position_embeddings(TEST_MAX_LEN)
}

pub fn test_train_config(output_dir: &Path) -> TrainConfig {
    TrainConfig {
        data_path:    output_dir.join("train.csv").display().to_string(),
        output_dir:   output_dir.display().to_string(),
        model:        "bert-base-uncased".to_string(),
        max_len:      TEST_MAX_LEN,
        batch_size:   4,
        epochs:       1,
        lr:           1e-3,
        val_fraction: 0.2,
        seed:         42,
        device:       DevicePreference::Cpu,
    }
}

/// Write a HuggingFace-style model directory for `test_model_config`:
/// config.json, model.safetensors (small deterministic weights) and
/// tokenizer.json. Returns the directory.
pub fn write_pretrained_dir(dir: &Path) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    let cfg = test_model_config();

    let config = serde_json::json!({
        "architectures": ["BertForMaskedLM"],
        "model_type": "bert",
        "hidden_act": "gelu",
        "vocab_size": cfg.vocab_size,
        "hidden_size": cfg.hidden_size,
        "num_hidden_layers": cfg.num_hidden_layers,
        "num_attention_heads": cfg.num_attention_heads,
        "intermediate_size": cfg.intermediate_size,
        "max_position_embeddings": cfg.max_position_embeddings,
        "type_vocab_size": cfg.type_vocab_size,
        "layer_norm_eps": 1e-12,
    });
    std::fs::write(dir.join("config.json"), config.to_string()).unwrap();

    let tensors: Vec<(String, Vec<usize>, Vec<u8>)> = pretrained_tensor_shapes(&cfg)
        .into_iter()
        .map(|(name, shape)| {
            let n: usize = shape.iter().product();
            let bytes = (0..n)
                .flat_map(|j| {
                    let v = if name.contains("LayerNorm.weight") {
                        1.0f32
                    } else {
                        ((j % 7) as f32 - 3.0) * 0.02
                    };
                    v.to_le_bytes()
                })
                .collect();
            (name, shape, bytes)
        })
        .collect();
    let views: Vec<(String, TensorView<'_>)> = tensors
        .iter()
        .map(|(name, shape, bytes)| {
            (name.clone(), TensorView::new(Dtype::F32, shape.clone(), bytes).unwrap())
        })
        .collect();
    let st = safetensors::serialize(views, &None).unwrap();
    std::fs::write(dir.join("model.safetensors"), st).unwrap();

    test_tokenizer().save(dir.join("tokenizer.json"), false).unwrap();
    dir.to_path_buf()
}

/// Write a Kaggle-layout train.csv with `n` rows alternating
/// between a disaster tweet and an ordinary one.
pub fn write_train_csv(dir: &Path, n: usize) -> PathBuf {
    let path = dir.join("train.csv");
    let mut w = csv::Writer::from_path(&path).unwrap();
    w.write_record(["id", "keyword", "location", "text", "target"]).unwrap();
    for i in 0..n {
        let (text, target) = if i % 2 == 0 {
            ("Flood warning, residents warned to evacuate", "1")
        } else {
            ("Just watched an amazing movie", "0")
        };
        w.write_record([i.to_string().as_str(), "", "", text, target]).unwrap();
    }
    w.flush().unwrap();
    path
}
