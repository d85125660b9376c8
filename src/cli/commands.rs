// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `train` and `predict`, and all
// their configurable flags. The defaults reproduce the reference
// fine-tuning run exactly.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::train_use_case::TrainConfig;
use crate::infra::device::DevicePreference;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fine-tune BERT on labelled tweets, save it, and classify the sample tweets
    Train(TrainArgs),

    /// Classify tweets with a saved model
    Predict(PredictArgs),
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// CSV file with `text` and `target` columns
    #[arg(long = "data", default_value = "train.csv")]
    pub data_path: String,

    /// Directory the fine-tuned model, tokenizer and metrics are written to
    #[arg(long, default_value = "disaster_bert_model")]
    pub output_dir: String,

    /// Pretrained encoder: HuggingFace Hub id or local directory
    #[arg(long, default_value = "bert-base-uncased")]
    pub model: String,

    /// Tokens per tweet after truncation/padding, [CLS] and [SEP] included
    #[arg(long, default_value_t = 64)]
    pub max_len: usize,

    #[arg(long, default_value_t = 16)]
    pub batch_size: usize,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 3)]
    pub epochs: usize,

    /// AdamW learning rate
    #[arg(long, default_value_t = 2e-5)]
    pub lr: f64,

    /// Share of tweets held out for validation
    #[arg(long, default_value_t = 0.2)]
    pub val_fraction: f64,

    /// Seed for the train/validation split and the per-epoch shuffle
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[arg(long, value_enum, default_value_t = DevicePreference::Auto)]
    pub device: DevicePreference,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_path:    a.data_path,
            output_dir:   a.output_dir,
            model:        a.model,
            max_len:      a.max_len,
            batch_size:   a.batch_size,
            epochs:       a.epochs,
            lr:           a.lr,
            val_fraction: a.val_fraction,
            seed:         a.seed,
            device:       a.device,
        }
    }
}

/// All arguments for the `predict` command
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Directory written by `train`
    #[arg(long, default_value = "disaster_bert_model")]
    pub model_dir: String,

    #[arg(long, value_enum, default_value_t = DevicePreference::Auto)]
    pub device: DevicePreference,

    /// Tweets to classify; the five sample tweets when omitted
    pub tweets: Vec<String>,
}
