use crate::error::CliError;
use engine_core::config::IngestConfig;
use std::{collections::HashMap, fs, path::Path};

pub const ENV_DATABASE_URL: &str = "CUBELOAD_DATABASE_URL";

const SETTINGS_PREFIX: &str = "CUBELOAD_";

/// Process environment overlaid with `.env` files.
#[derive(Debug, Clone)]
pub struct EnvManager {
    vars: HashMap<String, String>,
    sensitive_patterns: Vec<&'static str>,
}

impl EnvManager {
    pub fn new() -> Self {
        Self::with_vars(std::env::vars().collect())
    }

    pub fn with_vars(vars: HashMap<String, String>) -> Self {
        Self {
            vars,
            sensitive_patterns: vec!["password", "passwd", "secret", "token", "url", "key"],
        }
    }

    /// Loads KEY=VALUE pairs from `path`. Later files win over earlier ones
    /// and over the process environment.
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), CliError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read env file {}: {}", path.display(), e))
        })?;
        self.parse_env_content(&content)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn ingest_config(&self) -> Result<IngestConfig, CliError> {
        Ok(IngestConfig::from_vars(&self.vars)?)
    }

    /// The `CUBELOAD_*` settings in effect, with secrets masked, sorted by
    /// key for logging.
    pub fn settings(&self) -> Vec<(String, String)> {
        let mut settings: Vec<(String, String)> = self
            .vars
            .iter()
            .filter(|(key, _)| key.starts_with(SETTINGS_PREFIX))
            .map(|(key, value)| {
                let shown = if self.is_sensitive(key) {
                    "********".to_string()
                } else {
                    value.clone()
                };
                (key.clone(), shown)
            })
            .collect();
        settings.sort();
        settings
    }

    fn is_sensitive(&self, key: &str) -> bool {
        let key = key.to_ascii_lowercase();
        self.sensitive_patterns.iter().any(|p| key.contains(p))
    }

    fn parse_env_content(&mut self, content: &str) -> Result<(), CliError> {
        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let line = line.strip_prefix("export ").unwrap_or(line);

            let Some((key, value)) = line.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid env file: malformed line {} (expected KEY=VALUE)",
                    line_num + 1
                )));
            };

            let key = key.trim();
            if key.is_empty() {
                return Err(CliError::Config(format!(
                    "Invalid env file: empty key at line {}",
                    line_num + 1
                )));
            }
            self.vars.insert(key.to_string(), unquote(value.trim()));
        }
        Ok(())
    }
}

impl Default for EnvManager {
    fn default() -> Self {
        Self::new()
    }
}

fn unquote(value: &str) -> String {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return value[1..value.len() - 1].to_string();
        }
    }
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{io::Write, time::Duration};

    fn empty() -> EnvManager {
        EnvManager::with_vars(HashMap::new())
    }

    #[test]
    fn test_parse_basic_env() {
        let mut env = empty();
        let content = r#"
# Comment
CUBELOAD_BATCH_SIZE=250
export CUBELOAD_LEASE_SECS=5
        "#;

        env.parse_env_content(content).unwrap();
        assert_eq!(env.get("CUBELOAD_BATCH_SIZE"), Some("250"));

        let config = env.ingest_config().unwrap();
        assert_eq!(config.batch_size, 250);
        assert_eq!(config.lease, Duration::from_secs(5));
    }

    #[test]
    fn test_parse_quoted_values() {
        let mut env = empty();
        let content = r#"
QUOTED="value with spaces"
SINGLE='single quoted'
UNQUOTED=no_spaces
EQUALS=a=b
        "#;

        env.parse_env_content(content).unwrap();
        assert_eq!(env.get("QUOTED"), Some("value with spaces"));
        assert_eq!(env.get("SINGLE"), Some("single quoted"));
        assert_eq!(env.get("UNQUOTED"), Some("no_spaces"));
        assert_eq!(env.get("EQUALS"), Some("a=b"));
    }

    #[test]
    fn test_invalid_env_format() {
        let mut env = empty();
        assert!(env.parse_env_content("INVALID LINE WITHOUT EQUALS").is_err());
        assert!(env.parse_env_content("=value").is_err());
    }

    #[test]
    fn invalid_setting_is_a_config_error() {
        let mut env = empty();
        env.parse_env_content("CUBELOAD_BATCH_SIZE=lots").unwrap();
        assert!(matches!(env.ingest_config(), Err(CliError::ConfigValue(_))));
    }

    #[test]
    fn loads_file_and_masks_secrets() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "CUBELOAD_DATABASE_URL=postgres://u:p@h/db").unwrap();
        writeln!(file, "CUBELOAD_QUOTE=\"'\"").unwrap();
        writeln!(file, "OTHER=1").unwrap();

        let mut env = empty();
        env.load_from_file(file.path()).unwrap();

        assert_eq!(env.ingest_config().unwrap().quote, '\'');
        assert_eq!(
            env.settings(),
            vec![
                ("CUBELOAD_DATABASE_URL".to_string(), "********".to_string()),
                ("CUBELOAD_QUOTE".to_string(), "'".to_string()),
            ]
        );
    }
}
