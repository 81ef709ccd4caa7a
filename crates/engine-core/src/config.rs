use crate::error::ConfigError;
use connectors::{
    file::csv::{lines::DEFAULT_MAX_LINE_LENGTH, parser::ParserConfig},
    metadata::{dictionary::Dictionary, resolver::ColumnResolver},
};
use serde::{Deserialize, Deserializer};
use std::{collections::HashMap, path::PathBuf, str::FromStr, time::Duration};

pub const ENV_BATCH_SIZE: &str = "CUBELOAD_BATCH_SIZE";
pub const ENV_MAX_LINE_LENGTH: &str = "CUBELOAD_MAX_LINE_LENGTH";
pub const ENV_LEASE_SECS: &str = "CUBELOAD_LEASE_SECS";
pub const ENV_DELIMITERS: &str = "CUBELOAD_DELIMITERS";
pub const ENV_QUOTE: &str = "CUBELOAD_QUOTE";
pub const ENV_TABLE_PREFIX: &str = "CUBELOAD_TABLE_PREFIX";
pub const ENV_METADATA_TABLE: &str = "CUBELOAD_METADATA_TABLE";
pub const ENV_DICTIONARY: &str = "CUBELOAD_DICTIONARY";

/// Configuration for ingestion behavior.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Number of rows buffered before a multi-row INSERT is issued
    pub batch_size: usize,

    /// Longest accepted line, in bytes
    pub max_line_length: usize,

    /// How long a parked job may wait for its next request before it is
    /// rolled back
    #[serde(rename = "lease_secs", deserialize_with = "duration_from_secs")]
    pub lease: Duration,

    /// Field delimiters; any of them separates cells
    pub delimiters: Vec<char>,

    pub quote: char,

    /// Prefix of every import table name
    pub table_prefix: String,

    /// Table holding one metadata record per import table
    pub metadata_table: String,

    /// Replaces the built-in column dictionary when set
    pub dictionary_path: Option<PathBuf>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            lease: Duration::from_secs(30),
            delimiters: vec![','],
            quote: '"',
            table_prefix: "cube_".to_string(),
            metadata_table: "cubeload_imports".to_string(),
            dictionary_path: None,
        }
    }
}

impl IngestConfig {
    /// Overlays `CUBELOAD_*` variables on the defaults.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(v) = vars.get(ENV_BATCH_SIZE) {
            config.batch_size = parse_positive(ENV_BATCH_SIZE, v)?;
        }
        if let Some(v) = vars.get(ENV_MAX_LINE_LENGTH) {
            config.max_line_length = parse_positive(ENV_MAX_LINE_LENGTH, v)?;
        }
        if let Some(v) = vars.get(ENV_LEASE_SECS) {
            config.lease = Duration::from_secs(parse_positive(ENV_LEASE_SECS, v)?);
        }
        if let Some(v) = vars.get(ENV_DELIMITERS) {
            config.delimiters = parse_delimiters(v)
                .map_err(|reason| invalid(ENV_DELIMITERS, v, reason))?;
        }
        if let Some(v) = vars.get(ENV_QUOTE) {
            config.quote = parse_char(v).map_err(|reason| invalid(ENV_QUOTE, v, reason))?;
        }
        if let Some(v) = vars.get(ENV_TABLE_PREFIX) {
            config.table_prefix = v.clone();
        }
        if let Some(v) = vars.get(ENV_METADATA_TABLE) {
            config.metadata_table = v.clone();
        }
        if let Some(v) = vars.get(ENV_DICTIONARY).filter(|v| !v.is_empty()) {
            config.dictionary_path = Some(PathBuf::from(v));
        }

        Ok(config)
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    pub fn with_max_line_length(mut self, length: usize) -> Self {
        self.max_line_length = length;
        self
    }

    pub fn with_lease(mut self, lease: Duration) -> Self {
        self.lease = lease;
        self
    }

    pub fn with_delimiters(mut self, delimiters: Vec<char>) -> Self {
        self.delimiters = delimiters;
        self
    }

    pub fn with_quote(mut self, quote: char) -> Self {
        self.quote = quote;
        self
    }

    pub fn with_table_prefix(mut self, prefix: &str) -> Self {
        self.table_prefix = prefix.to_string();
        self
    }

    pub fn with_metadata_table(mut self, table: &str) -> Self {
        self.metadata_table = table.to_string();
        self
    }

    pub fn with_dictionary_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.dictionary_path = Some(path.into());
        self
    }

    pub fn parser_config(&self) -> ParserConfig {
        ParserConfig::default()
            .with_delimiters(self.delimiters.clone())
            .with_quote(self.quote)
    }

    /// Builds the column resolver, loading the configured dictionary.
    pub fn resolver(&self) -> Result<ColumnResolver, ConfigError> {
        let dictionary = Dictionary::from_path_or_embedded(self.dictionary_path.as_deref())?;
        Ok(ColumnResolver::new(dictionary))
    }
}

fn invalid(key: &str, value: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn parse_positive<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + Default,
    T::Err: std::fmt::Display,
{
    let parsed = value
        .trim()
        .parse::<T>()
        .map_err(|e| invalid(key, value, e.to_string()))?;
    if parsed <= T::default() {
        return Err(invalid(key, value, "must be greater than zero"));
    }
    Ok(parsed)
}

fn parse_char(value: &str) -> Result<char, String> {
    match unescape(value).as_slice() {
        [ch] => Ok(*ch),
        _ => Err("expected exactly one character".to_string()),
    }
}

/// Every character of the value is a delimiter. `\t` is accepted for tab.
fn parse_delimiters(value: &str) -> Result<Vec<char>, String> {
    let chars = unescape(value);
    if chars.is_empty() {
        return Err("at least one delimiter is required".to_string());
    }
    Ok(chars)
}

fn unescape(value: &str) -> Vec<char> {
    value.replace("\\t", "\t").chars().collect()
}

fn duration_from_secs<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Duration::from_secs(u64::deserialize(deserializer)?))
}
