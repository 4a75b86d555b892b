//! baseline - Browser compatibility analysis for CSS and JavaScript
//!
//! This crate wires the analysis engine from `baseline-core` into a CLI and
//! an HTTP server, and adds repository scanning over the GitHub API.

pub mod config;
pub mod output;
pub mod provider;
pub mod rate_limit;
pub mod scanner;
pub mod server;

use baseline_core::Analyzer;
use config::Config;
use eyre::{Result, WrapErr};
use provider::GitHubProvider;
use scanner::{RepositoryScanner, ScanLimits};
use std::sync::Arc;

/// Build the analyzer described by `config`
pub fn analyzer(config: &Config) -> Result<Analyzer> {
    let registry = config.registry().wrap_err("Failed to load feature registry")?;
    let weights = config.weights()?;
    Ok(Analyzer::new(Arc::new(registry), weights))
}

/// Build a scanner reading from GitHub, as described by `config`
pub fn github_scanner(config: &Config, analyzer: Arc<Analyzer>) -> Result<RepositoryScanner> {
    let provider = GitHubProvider::from_env(config.github_api_url(), config.token_env())
        .wrap_err("Failed to create GitHub client")?;
    let limits = ScanLimits {
        deadline: config.scan_deadline(),
        ..ScanLimits::default()
    };
    Ok(RepositoryScanner::new(Arc::new(provider), analyzer).with_limits(limits))
}
