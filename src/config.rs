//! Job configuration.
//!
//! A [`JobConfig`] can be read from a JSON file and is then overridden by
//! command-line flags. Only `tokenizer` affects the counting core; the rest
//! steers the standalone driver.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::tokenizer::DEFAULT_TOKENIZER;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JobConfig {
    /// Tokenizer selector, `name` or `name:argument`.
    pub tokenizer: String,
    /// Number of reduce partitions, i.e. output files.
    pub num_reduce_partitions: u32,
    /// Whether to run the combiner before the shuffle.
    pub combine: bool,
    /// Maximum records per partition. `None` keeps each input file whole.
    pub split_records: Option<usize>,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            tokenizer: DEFAULT_TOKENIZER.to_string(),
            num_reduce_partitions: 1,
            combine: true,
            split_records: None,
        }
    }
}

impl JobConfig {
    /// Reads a configuration from a JSON file. Missing fields take their
    /// default values.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Rejects values the driver cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.tokenizer.is_empty() {
            return Err(Error::InvalidConfig("tokenizer must not be empty".into()));
        }
        if self.num_reduce_partitions == 0 {
            return Err(Error::InvalidConfig(
                "num_reduce_partitions must be at least 1".into(),
            ));
        }
        if self.split_records == Some(0) {
            return Err(Error::InvalidConfig(
                "split_records must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_reference_job() {
        let config = JobConfig::default();
        assert_eq!("standard", config.tokenizer);
        assert_eq!(1, config.num_reduce_partitions);
        assert!(config.combine);
        assert_eq!(None, config.split_records);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: JobConfig =
            serde_json::from_str(r#"{"tokenizer":"words","num_reduce_partitions":4}"#).unwrap();
        assert_eq!("words", config.tokenizer);
        assert_eq!(4, config.num_reduce_partitions);
        assert!(config.combine);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let parsed = serde_json::from_str::<JobConfig>(r#"{"tokeniser":"words"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn zero_values_are_invalid() {
        let config = JobConfig {
            num_reduce_partitions: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let config = JobConfig {
            split_records: Some(0),
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().is_config_error());

        let config = JobConfig {
            tokenizer: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn reads_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"combine": false, "split_records": 10}}"#).unwrap();

        let config = JobConfig::from_file(file.path()).unwrap();
        assert!(!config.combine);
        assert_eq!(Some(10), config.split_records);
        assert_eq!("standard", config.tokenizer);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(JobConfig::from_file(dir.path().join("nope.json")).is_err());
    }
}
