// ============================================================
// Layer 4 — CSV Tweet Loader
// ============================================================
// Reads the labelled training file. Only two columns matter:
//
//   text   — the raw tweet
//   target — 1 if the tweet is about a real disaster, else 0
//
// Any other columns (the Kaggle file also has id, keyword and
// location) are ignored by serde's header-based mapping.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::traits::TweetSource;
use crate::domain::tweet::Tweet;

/// Raw CSV row before label validation
#[derive(Debug, Deserialize)]
struct CsvRow {
    text:   String,
    target: i64,
}

/// Loads labelled tweets from a CSV file with a header row.
pub struct CsvTweetLoader {
    path: PathBuf,
}

impl CsvTweetLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TweetSource for CsvTweetLoader {
    fn load_all(&self) -> Result<Vec<Tweet>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)
            .with_context(|| format!("Cannot open dataset '{}'", self.path.display()))?;

        let mut tweets = Vec::new();
        for (row_num, result) in reader.deserialize::<CsvRow>().enumerate() {
            // +2: rows are 1-based and the header occupies line 1
            let line = row_num + 2;
            let row = result.with_context(|| {
                format!("Malformed row at line {} of '{}'", line, self.path.display())
            })?;

            let tweet = u8::try_from(row.target)
                .map_err(|_| anyhow!("target must be 0 or 1, got {}", row.target))
                .and_then(|t| Tweet::new(row.text, t))
                .with_context(|| format!("Invalid label at line {line}"))?;
            tweets.push(tweet);
        }

        tracing::info!("Loaded {} tweets from '{}'", tweets.len(), self.path.display());
        Ok(tweets)
    }
}

/// Log the first `n` tweets, the equivalent of eyeballing `head()`.
pub fn preview(tweets: &[Tweet], n: usize) {
    for (i, tweet) in tweets.iter().take(n).enumerate() {
        tracing::info!("[{i}] target={} text={:?}", tweet.target, tweet.text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_reads_text_and_target_ignoring_other_columns() {
        let file = write_csv(
            "id,keyword,location,text,target\n\
             1,,,Our Deeds are the Reason of this #earthquake,1\n\
             23,,,\"What's up man, all good?\",0\n",
        );
        let tweets = CsvTweetLoader::new(file.path()).load_all().unwrap();

        assert_eq!(tweets.len(), 2);
        assert_eq!(tweets[0].text, "Our Deeds are the Reason of this #earthquake");
        assert!(tweets[0].is_disaster());
        assert_eq!(tweets[1].text, "What's up man, all good?");
        assert_eq!(tweets[1].target, 0);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let loader = CsvTweetLoader::new("does/not/exist/train.csv");
        let err = loader.load_all().unwrap_err();
        assert!(err.to_string().contains("Cannot open dataset"));
    }

    #[test]
    fn test_non_binary_target_is_rejected() {
        let file = write_csv("text,target\nflood warning,1\nnot sure,3\n");
        let err = CsvTweetLoader::new(file.path()).load_all().unwrap_err();
        assert!(format!("{err:#}").contains("line 3"));
    }

    #[test]
    fn test_missing_target_column_is_rejected() {
        let file = write_csv("text\njust text\n");
        assert!(CsvTweetLoader::new(file.path()).load_all().is_err());
    }
}
