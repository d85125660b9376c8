// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from the raw CSV to tensor batches:
//
//   train.csv
//       │
//       ▼
//   CsvTweetLoader    → reads (text, target) rows
//       │
//       ▼
//   TweetEncoder      → [CLS] tokens [SEP] [PAD]... + mask
//       │
//       ▼
//   split_train_val   → seeded 80/20 shuffle-and-split
//       │
//       ▼
//   TweetDataset      → implements Burn's Dataset trait
//       │
//       ▼
//   TweetBatcher      → stacks samples into tensor batches
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop

/// Reads labelled tweets from CSV
pub mod loader;

/// Tokenises, truncates and pads tweet text
pub mod encoder;

/// Implements Burn's Dataset trait for encoded tweets
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Seeded train/validation split
pub mod splitter;
