// ============================================================
// Layer 4 — Train/Validation Splitter
// ============================================================
// Shuffles samples with a seeded RNG and splits them into a
// training set and a validation set.
//
// The validation share is rounded UP (ceil(n * val_fraction)),
// so 7 samples at 0.2 give 5 train / 2 validation.
//
// A fixed seed makes the split reproducible run to run.

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// Shuffle `samples` with `seed` and split into (train, validation).
///
/// # Arguments
/// * `samples`      - All available samples (consumed by this function)
/// * `val_fraction` - Proportion held out for validation, e.g. 0.2
/// * `seed`         - RNG seed; the same seed always yields the same split
pub fn split_train_val<T>(mut samples: Vec<T>, val_fraction: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    let mut rng = StdRng::seed_from_u64(seed);
    samples.shuffle(&mut rng);

    let total   = samples.len();
    let val_len = ((total as f64) * val_fraction.clamp(0.0, 1.0)).ceil() as usize;
    let val_len = val_len.min(total);

    // split_off(n) keeps [0..n) and returns [n..total)
    let val = samples.split_off(total - val_len);

    tracing::debug!(
        "Dataset split: {} training, {} validation (seed {})",
        samples.len(),
        val.len(),
        seed,
    );

    (samples, val)
}
