// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records training metrics to a CSV file after each epoch, next
// to the saved model.
//
// Example CSV output:
//   epoch,train_loss,val_accuracy
//   1,0.462013,0.829500
//   2,0.331870,0.836200
//   3,0.240145,0.833600
//
// Reading it:
//   - train_loss should fall every epoch
//   - val_accuracy flattening while train_loss keeps falling
//     means the model has started to overfit

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Mean cross-entropy over all training batches
    pub train_loss: f64,

    /// Mean of per-batch accuracies on the validation set, in [0.0, 1.0]
    pub val_accuracy: f64,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64, val_accuracy: f64) -> Self {
        Self { epoch, train_loss, val_accuracy }
    }

    /// Returns true if this epoch beat the best validation accuracy so far
    pub fn is_improvement(&self, best_accuracy: f64) -> bool {
        self.val_accuracy > best_accuracy
    }
}

/// Appends epoch metrics to `{dir}/metrics.csv`.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Writes the CSV header if the file doesn't exist yet, so
    /// repeated runs into the same directory append.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create '{}'", dir.display()))?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)
                .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
            writeln!(f, "epoch,train_loss,val_accuracy")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        writeln!(f, "{},{:.6},{:.6}", m.epoch, m.train_loss, m.val_accuracy)?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, val_accuracy={:.4}",
            m.epoch,
            m.train_loss,
            m.val_accuracy,
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}
