//! Configuration schema for baseline
//!
//! Config lives at `.config/baseline/config.yaml` relative to the working
//! directory. Every field is optional:
//!
//! ```yaml
//! registry_file: data/registry.json
//! weights:
//!   newly_available: 0.6
//!   limited: 0.2
//! server:
//!   port: 5000
//! github:
//!   api_url: https://api.github.com
//!   token_env: GITHUB_PAT
//! scan:
//!   deadline_secs: 120
//! ```

use baseline_core::{BaselineTier, FeatureRegistry, ScoreWeights};
use eyre::{Result, WrapErr};
use facet::Facet;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = ".config/baseline/config.yaml";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_TOKEN_ENV: &str = "GITHUB_PAT";

/// Root configuration for baseline
#[derive(Debug, Clone, Default, Facet)]
pub struct Config {
    /// Feature registry JSON to use instead of the bundled snapshot.
    /// Relative paths resolve against the config file's directory.
    #[facet(default)]
    pub registry_file: Option<String>,

    #[facet(default)]
    pub weights: WeightsConfig,

    #[facet(default)]
    pub server: ServerConfig,

    #[facet(default)]
    pub github: GitHubConfig,

    #[facet(default)]
    pub scan: ScanConfig,
}

/// Score weights for the non-widely-available tiers
#[derive(Debug, Clone, Default, Facet)]
#[facet(default)]
pub struct WeightsConfig {
    #[facet(default)]
    pub newly_available: Option<f64>,
    #[facet(default)]
    pub limited: Option<f64>,
}

#[derive(Debug, Clone, Default, Facet)]
#[facet(default)]
pub struct ServerConfig {
    #[facet(default)]
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, Facet)]
#[facet(default)]
pub struct GitHubConfig {
    /// Base URL of the GitHub REST API
    #[facet(default)]
    pub api_url: Option<String>,
    /// Name of the environment variable holding the access token
    #[facet(default)]
    pub token_env: Option<String>,
}

#[derive(Debug, Clone, Default, Facet)]
#[facet(default)]
pub struct ScanConfig {
    /// Wall-clock budget for one repository scan; unlimited when unset
    #[facet(default)]
    pub deadline_secs: Option<u64>,
}

impl Config {
    /// Parse a config from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config =
            facet_yaml::from_str(yaml).wrap_err("Failed to parse config YAML")?;
        config.weights()?;
        Ok(config)
    }

    /// Load config from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config = Self::from_yaml(&content)
            .wrap_err_with(|| format!("Failed to load config file: {}", path.display()))?;
        if let (Some(file), Some(dir)) = (&config.registry_file, path.parent()) {
            config.registry_file = Some(dir.join(file).to_string_lossy().into_owned());
        }
        Ok(config)
    }

    /// Validated score weights
    pub fn weights(&self) -> Result<ScoreWeights> {
        let defaults = ScoreWeights::default();
        let weights = ScoreWeights::new(
            self.weights
                .newly_available
                .unwrap_or(defaults.weight(BaselineTier::NewlyAvailable)),
            self.weights
                .limited
                .unwrap_or(defaults.weight(BaselineTier::Limited)),
        )?;
        Ok(weights)
    }

    /// The configured registry, or the bundled snapshot
    pub fn registry(&self) -> Result<FeatureRegistry> {
        match &self.registry_file {
            Some(file) => FeatureRegistry::load(file),
            None => FeatureRegistry::bundled(),
        }
    }

    pub fn port(&self) -> u16 {
        self.server.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn github_api_url(&self) -> &str {
        self.github
            .api_url
            .as_deref()
            .unwrap_or(DEFAULT_GITHUB_API_URL)
    }

    pub fn token_env(&self) -> &str {
        self.github.token_env.as_deref().unwrap_or(DEFAULT_TOKEN_ENV)
    }

    pub fn scan_deadline(&self) -> Option<Duration> {
        self.scan.deadline_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port(), 5000);
        assert_eq!(config.github_api_url(), "https://api.github.com");
        assert_eq!(config.token_env(), "GITHUB_PAT");
        assert_eq!(config.scan_deadline(), None);
        assert_eq!(config.weights().unwrap(), ScoreWeights::default());
    }

    #[test]
    fn test_partial_yaml() {
        let config = Config::from_yaml("server:\n  port: 8080\nweights:\n  limited: 0.0\n").unwrap();
        assert_eq!(config.port(), 8080);

        let weights = config.weights().unwrap();
        assert_eq!(weights.weight(BaselineTier::NewlyAvailable), 0.6);
        assert_eq!(weights.weight(BaselineTier::Limited), 0.0);
    }

    #[test]
    fn test_out_of_range_weight_is_rejected() {
        let err = Config::from_yaml("weights:\n  newly_available: 0.9\n").unwrap_err();
        assert!(format!("{:?}", err).contains("0.7"));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("config.yaml")).unwrap();
        assert_eq!(config.port(), 5000);
        assert!(config.registry_file.is_none());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "server: [not, a, map\n").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(format!("{:?}", err).contains("config.yaml"));
    }

    #[test]
    fn test_registry_file_resolves_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("registry.json"),
            r#"{"features": {"grid": {"baseline": "low"}}}"#,
        )
        .unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "registry_file: registry.json\n").unwrap();

        let registry = Config::load(&path).unwrap().registry().unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("grid"));
    }
}
