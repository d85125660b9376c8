// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses the command line with clap and prints verdicts. All
// work is delegated to Layer 2 (application).
//
//   disaster-bert                 — same as `train` with defaults
//   disaster-bert train [...]     — fine-tune, save, classify samples
//   disaster-bert predict [...]   — classify with a saved model

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, PredictArgs};

use crate::application::{
    predict_use_case::PredictUseCase,
    train_use_case::{TrainConfig, TrainUseCase},
};
use crate::domain::prediction::Prediction;

#[derive(Parser, Debug)]
#[command(
    name = "disaster-bert",
    version,
    about = "Fine-tune BERT to flag disaster tweets, then classify new ones."
)]
pub struct Cli {
    /// Runs `train` with default settings when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Some(Commands::Train(args))   => run_train(args.into()),
            Some(Commands::Predict(args)) => run_predict(args),
            None                          => run_train(TrainConfig::default()),
        }
    }
}

fn run_train(config: TrainConfig) -> Result<()> {
    tracing::info!("Fine-tuning '{}' on '{}'", config.model, config.data_path);

    let output_dir = config.output_dir.clone();
    let preds = TrainUseCase::new(config).execute()?;
    tracing::info!("Model saved to '{}'", output_dir);

    print_verdicts(&preds);
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    let preds = PredictUseCase::new(args.model_dir, args.device).execute(&args.tweets)?;
    print_verdicts(&preds);
    Ok(())
}

fn print_verdicts(preds: &[Prediction]) {
    for p in preds {
        for line in verdict_lines(p) {
            println!("{line}");
        }
    }
}

/// Console report for one tweet, separator line included.
pub fn verdict_lines(p: &Prediction) -> Vec<String> {
    let mut lines = if p.is_disaster {
        vec![
            format!("🚨 ALERT: Disaster detected! Tweet: {}", p.text),
            format!("Disaster Probability: {:.3}", p.disaster_probability),
        ]
    } else {
        vec![format!("Tweet OK: {}", p.text)]
    };
    lines.push("-".repeat(80));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_default_training() {
        let cli = Cli::try_parse_from(["disaster-bert"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_train_flags_default_to_reference_run() {
        let cli = Cli::try_parse_from(["disaster-bert", "train"]).unwrap();
        let Some(Commands::Train(args)) = cli.command else {
            panic!("expected train");
        };
        let cfg: TrainConfig = args.into();
        let def = TrainConfig::default();

        assert_eq!(cfg.data_path, def.data_path);
        assert_eq!(cfg.output_dir, def.output_dir);
        assert_eq!(cfg.model, def.model);
        assert_eq!((cfg.max_len, cfg.batch_size, cfg.epochs, cfg.seed), (64, 16, 3, 42));
        assert_eq!(cfg.lr, def.lr);
        assert_eq!(cfg.val_fraction, def.val_fraction);
        assert_eq!(cfg.device, def.device);
    }

    #[test]
    fn test_train_flags_override() {
        let cli = Cli::try_parse_from([
            "disaster-bert", "train", "--data", "tweets.csv", "--epochs", "1",
            "--lr", "3e-5", "--device", "cpu",
        ])
        .unwrap();
        let Some(Commands::Train(args)) = cli.command else {
            panic!("expected train");
        };
        assert_eq!(args.data_path, "tweets.csv");
        assert_eq!(args.epochs, 1);
        assert_eq!(args.lr, 3e-5);
        assert_eq!(args.device, crate::infra::device::DevicePreference::Cpu);
    }

    #[test]
    fn test_predict_collects_tweets() {
        let cli = Cli::try_parse_from(["disaster-bert", "predict", "fire downtown", "nice day"]).unwrap();
        let Some(Commands::Predict(args)) = cli.command else {
            panic!("expected predict");
        };
        assert_eq!(args.model_dir, "disaster_bert_model");
        assert_eq!(args.tweets, vec!["fire downtown", "nice day"]);
    }

    #[test]
    fn test_alert_verdict_lines() {
        let p = Prediction::new("Wildfire spreads", 0.9123, true);
        assert_eq!(
            verdict_lines(&p),
            vec![
                "🚨 ALERT: Disaster detected! Tweet: Wildfire spreads".to_string(),
                "Disaster Probability: 0.912".to_string(),
                "-".repeat(80),
            ]
        );
    }

    #[test]
    fn test_ok_verdict_has_no_probability() {
        let p = Prediction::new("Great concert", 0.1, false);
        let lines = verdict_lines(&p);
        assert_eq!(lines[0], "Tweet OK: Great concert");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].len(), 80);
    }
}
