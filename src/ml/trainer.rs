// ============================================================
// Layer 5 — Fine-tuning Loop
// ============================================================
// Fixed-epoch supervised fine-tuning using Burn's DataLoader
// and AdamW.
//
// Key Burn insights:
//   - Training runs on B (an AutodiffBackend) for gradients
//   - model.valid() returns the model on B::InnerBackend:
//     no autodiff graph, dropout disabled
//   - The validation batcher must therefore use B::InnerBackend
//
// Console output follows the classic BERT fine-tuning script:
//   ======== Epoch 1 / 3 ========
//   Step 0, Loss: 0.7012
//   Step 50, Loss: 0.5531
//   Average training loss: 0.4620
//   Validation Accuracy: 0.8295

use anyhow::Result;
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{AdamWConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::TweetBatcher, dataset::TweetDataset};
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::model::BertClassifier;

/// Print the running loss every this many steps
const LOG_EVERY: usize = 50;

pub struct TrainingOutcome<B: AutodiffBackend> {
    pub model:   BertClassifier<B>,
    pub history: Vec<EpochMetrics>,
}

pub fn run_training<B: AutodiffBackend>(
    cfg:           &TrainConfig,
    model:         BertClassifier<B>,
    train_dataset: TweetDataset,
    val_dataset:   TweetDataset,
    device:        &B::Device,
    metrics:       &MetricsLogger,
) -> Result<TrainingOutcome<B>> {
    let mut model = model;

    // ── AdamW optimiser ───────────────────────────────────────────────────────
    // Same settings as torch.optim.AdamW(lr=2e-5) defaults
    let mut optim = AdamWConfig::new()
        .with_epsilon(1e-8)
        .with_weight_decay(0.01)
        .init();

    // ── Training data loader (AutodiffBackend, reshuffled every epoch) ────────
    let train_loader = DataLoaderBuilder::new(TweetBatcher::<B>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .build(train_dataset);

    // ── Validation data loader (InnerBackend, sequential) ─────────────────────
    let val_loader = DataLoaderBuilder::new(TweetBatcher::<B::InnerBackend>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .build(val_dataset);

    let mut history = Vec::with_capacity(cfg.epochs);
    let mut best_accuracy = f64::NEG_INFINITY;

    for epoch in 1..=cfg.epochs {
        println!("\n======== Epoch {} / {} ========", epoch, cfg.epochs);

        // ── Training phase ────────────────────────────────────────────────────
        let mut total_loss = 0.0f64;
        let mut steps      = 0usize;

        for (step, batch) in train_loader.iter().enumerate() {
            let output = model.forward_classification(
                batch.input_ids,
                batch.attention_mask,
                batch.labels,
            );

            let loss_val: f64 = output.loss.clone().into_scalar().elem::<f64>();
            if !loss_val.is_finite() {
                tracing::warn!("Non-finite loss {} at epoch {} step {}", loss_val, epoch, step);
            }

            let grads = output.loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);

            total_loss += loss_val;
            steps      += 1;
            if step % LOG_EVERY == 0 {
                println!("Step {}, Loss: {:.4}", step, loss_val);
            }
        }

        let avg_train_loss = if steps > 0 { total_loss / steps as f64 } else { f64::NAN };
        println!("Average training loss: {:.4}", avg_train_loss);

        // ── Validation phase ──────────────────────────────────────────────────
        let model_valid = model.valid();
        let mut accuracy_sum = 0.0f64;
        let mut val_batches  = 0usize;

        for batch in val_loader.iter() {
            let logits = model_valid.forward(batch.input_ids, batch.attention_mask);
            let [_, num_labels] = logits.dims();

            let scores: Vec<f32> = logits.into_data().iter::<f32>().collect();
            let labels: Vec<i64> = batch.labels.into_data().iter::<i64>().collect();
            let rows: Vec<&[f32]> = scores.chunks(num_labels).collect();

            accuracy_sum += flat_accuracy(&rows, &labels);
            val_batches  += 1;
        }

        let val_accuracy = if val_batches > 0 { accuracy_sum / val_batches as f64 } else { 0.0 };
        println!("Validation Accuracy: {:.4}", val_accuracy);

        let m = EpochMetrics::new(epoch, avg_train_loss, val_accuracy);
        metrics.log(&m)?;
        if m.is_improvement(best_accuracy) {
            tracing::info!("Epoch {}: best validation accuracy so far ({:.4})", epoch, val_accuracy);
            best_accuracy = val_accuracy;
        }
        history.push(m);
    }

    tracing::info!("Training complete!");
    Ok(TrainingOutcome { model, history })
}

/// Fraction of rows whose highest score sits at the label's index.
///
/// Ties resolve to the lowest index, the same as numpy's argmax.
/// Returns 0.0 for an empty batch.
pub fn flat_accuracy<P: AsRef<[f32]>>(preds: &[P], labels: &[i64]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    let correct = preds
        .iter()
        .zip(labels)
        .filter(|(row, &label)| argmax(row.as_ref()) as i64 == label)
        .count();
    correct as f64 / labels.len() as f64
}

/// Index of the largest value, first one wins on ties
pub fn argmax(row: &[f32]) -> usize {
    row.iter()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |(best_i, best), (i, &v)| {
            if v > best { (i, v) } else { (best_i, best) }
        })
        .0
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::data::dataset::TweetSample;
    use crate::test_support::{test_model_config, test_train_config, TestAutodiff, TEST_MAX_LEN};

    #[test]
    fn test_flat_accuracy_all_correct() {
        assert_eq!(flat_accuracy(&[[0.9f32, 0.1], [0.1, 0.9]], &[0, 1]), 1.0);
    }

    #[test]
    fn test_flat_accuracy_all_wrong() {
        assert_eq!(flat_accuracy(&[[0.9f32, 0.1], [0.1, 0.9]], &[1, 0]), 0.0);
    }

    #[test]
    fn test_flat_accuracy_partial() {
        let preds = [[2.0f32, -1.0], [0.3, 0.2], [-0.5, 0.5], [1.0, 3.0]];
        assert_eq!(flat_accuracy(&preds, &[0, 1, 1, 1]), 0.75);
    }

    #[test]
    fn test_flat_accuracy_empty() {
        assert_eq!(flat_accuracy::<[f32; 2]>(&[], &[]), 0.0);
    }

    #[test]
    fn test_argmax_ties_pick_first() {
        assert_eq!(argmax(&[0.5, 0.5]), 0);
        assert_eq!(argmax(&[-3.0, -1.0, -2.0]), 1);
    }

    #[test]
    fn test_training_loop_runs_and_logs_each_epoch() {
        let dir    = tempfile::tempdir().unwrap();
        let device = Default::default();
        let mut cfg = test_train_config(dir.path());
        cfg.epochs  = 2;

        let sample = |token: u32, label: u8| {
            let mut input_ids = vec![0u32; TEST_MAX_LEN];
            input_ids[..3].copy_from_slice(&[2, token, 3]);
            let mut attention_mask = vec![0u32; TEST_MAX_LEN];
            attention_mask[..3].fill(1);
            TweetSample { input_ids, attention_mask, label }
        };
        let train: Vec<TweetSample> = (0..20).map(|i| sample(5 + (i % 2) as u32, (i % 2) as u8)).collect();
        let val:   Vec<TweetSample> = (0..6).map(|i| sample(5 + (i % 2) as u32, (i % 2) as u8)).collect();

        let model   = test_model_config().init::<TestAutodiff>(&device);
        let metrics = MetricsLogger::new(dir.path()).unwrap();
        let outcome = run_training(
            &cfg,
            model,
            TweetDataset::new(train),
            TweetDataset::new(val),
            &device,
            &metrics,
        )
        .unwrap();

        assert_eq!(outcome.history.len(), 2);
        for m in &outcome.history {
            assert!(m.train_loss.is_finite());
            assert!((0.0..=1.0).contains(&m.val_accuracy));
        }

        let csv = std::fs::read_to_string(metrics.csv_path()).unwrap();
        assert_eq!(csv.lines().count(), 3); // header + 2 epochs
    }
}
