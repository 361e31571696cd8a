use serde::Deserialize;
use std::fs;
use std::path::Path;

const ENV_CONFIG_PATH: &str = "CASE_MOMENTUM_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Tunables for the scoring, timeline and version-store passes
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Corpora shorter than this (in characters) are never pattern-matched
    pub min_corpus_chars: usize,
    /// Document AI summaries must be longer than this to enter the corpus
    pub min_summary_chars: usize,
    /// Correspondence gaps of at least this many days are reported as long gaps
    pub long_gap_days: i64,
    /// Reply pairs at or beyond this many days are discarded as outliers
    pub max_reply_days: i64,
    /// Silence beyond `average * concerning_multiplier` is reported as concerning
    pub concerning_multiplier: f64,
    /// Attempts at assigning a version number before giving up
    pub version_conflict_retries: u32,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            min_corpus_chars: 100,
            min_summary_chars: 50,
            long_gap_days: 14,
            max_reply_days: 365,
            concerning_multiplier: 1.5,
            version_conflict_retries: 5,
        }
    }
}

/// YAML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub analysis: AnalysisSettings,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub analysis: AnalysisSettings,
    pub port: u16,
    pub host: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            analysis: AnalysisSettings::default(),
            port: 8080,
            host: "127.0.0.1".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let config_path = std::env::var(ENV_CONFIG_PATH)
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let analysis = Self::load_config_file(&config_path)
            .map(|cf| cf.analysis)
            .unwrap_or_default();

        Self {
            analysis,
            port,
            host,
        }
    }

    /// Load configuration from YAML file
    fn load_config_file(path: &str) -> Option<ConfigFile> {
        let path = Path::new(path);

        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return None;
        }

        match fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents, path),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read config file, using defaults");
                None
            }
        }
    }

    fn parse(contents: &str, path: &Path) -> Option<ConfigFile> {
        let contents = contents.trim();
        if contents.is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Some(ConfigFile::default());
        }

        match serde_yaml::from_str(contents) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "Loaded configuration from file");
                Some(config)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to parse config file, using defaults");
                None
            }
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_analysis_section_keeps_defaults() {
        let yaml = "analysis:\n  long_gap_days: 21\n";
        let parsed = Config::parse(yaml, Path::new("inline.yaml")).unwrap();

        assert_eq!(parsed.analysis.long_gap_days, 21);
        assert_eq!(parsed.analysis.min_corpus_chars, 100);
        assert_eq!(parsed.analysis.max_reply_days, 365);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let parsed = Config::parse("   \n", Path::new("empty.yaml")).unwrap();
        assert_eq!(parsed.analysis.version_conflict_retries, 5);
    }

    #[test]
    fn test_invalid_yaml_is_rejected() {
        assert!(Config::parse("analysis: [not, a, map", Path::new("bad.yaml")).is_none());
    }
}
