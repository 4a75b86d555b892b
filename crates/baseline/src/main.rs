//! baseline - Browser compatibility analysis for CSS and JavaScript
//!
//! Analyzes sources for web-platform features and scores them by how widely
//! those features are supported, for single files, GitHub repositories, or
//! over HTTP.

use baseline::config::{Config, DEFAULT_CONFIG_PATH};
use baseline::output::{OutputFormat, render_analysis, render_summary};
use baseline_core::Language;
use eyre::{Result, WrapErr};
use facet_args as args;
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// CLI arguments
#[derive(Debug, facet::Facet)]
struct Args {
    /// Subcommand to run
    #[facet(args::subcommand)]
    command: Option<Command>,

    /// Path to config file (default: .config/baseline/config.yaml)
    #[facet(args::named, args::short = 'c', default)]
    config: Option<PathBuf>,
}

/// Subcommands
#[derive(Debug, facet::Facet)]
#[repr(u8)]
enum Command {
    /// Analyze one CSS or JavaScript file
    Analyze {
        /// File to analyze
        #[facet(args::positional)]
        file: PathBuf,

        /// Source language: css or js (default: from the file extension)
        #[facet(args::named, args::short = 'l', default)]
        language: Option<String>,

        /// Output format: text, json
        #[facet(args::named, args::short = 'f', default)]
        format: Option<String>,
    },

    /// Scan a GitHub repository (owner/repo)
    Scan {
        /// Repository as owner/repo
        #[facet(args::positional)]
        repository: String,

        /// Output format: text, json
        #[facet(args::named, args::short = 'f', default)]
        format: Option<String>,
    },

    /// Start the HTTP server
    Serve {
        /// Port to listen on (default: from config, else 5000)
        #[facet(args::named, args::short = 'p', default)]
        port: Option<u16>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Args =
        facet_args::from_std_args().wrap_err("Failed to parse command line arguments")?;

    let config_path = args
        .config
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = Config::load(&config_path)?;

    match args.command {
        Some(Command::Analyze {
            file,
            language,
            format,
        }) => run_analyze(&config, &file, language, format),
        Some(Command::Scan { repository, format }) => {
            run_scan(&config, &repository, format).await
        }
        Some(Command::Serve { port }) => baseline::server::run(&config, port).await,
        None => {
            eyre::bail!(
                "No command given. Usage:\n  \
                 baseline analyze <file> [--language css|js] [--format text|json]\n  \
                 baseline scan <owner/repo> [--format text|json]\n  \
                 baseline serve [--port N]"
            )
        }
    }
}

fn parse_format(format: Option<String>) -> Result<OutputFormat> {
    match format {
        Some(f) => OutputFormat::from_str(&f)
            .ok_or_else(|| eyre::eyre!("Unknown format '{}', expected text or json", f)),
        None => Ok(OutputFormat::default()),
    }
}

fn run_analyze(
    config: &Config,
    file: &Path,
    language: Option<String>,
    format: Option<String>,
) -> Result<()> {
    let format = parse_format(format)?;
    let language = match language {
        Some(l) => Language::parse(&l)
            .ok_or_else(|| eyre::eyre!("Unknown language '{}', expected css or js", l))?,
        None => Language::from_path(&file.to_string_lossy()),
    };

    let source = std::fs::read_to_string(file)
        .wrap_err_with(|| format!("Failed to read {}", file.display()))?;

    let analyzer = baseline::analyzer(config)?;
    let analysis = analyzer.analyze_detailed(&source, language);

    if let Some(err) = &analysis.parse_error {
        eprintln!(
            "{} {} could not be parsed as {}: {}",
            "!".yellow().bold(),
            file.display(),
            language,
            err
        );
    }

    let name = file.display().to_string();
    println!("{}", render_analysis(&name, &analysis.result, format)?);
    Ok(())
}

async fn run_scan(config: &Config, repository: &str, format: Option<String>) -> Result<()> {
    let format = parse_format(format)?;
    let Some((owner, repo)) = repository.split_once('/') else {
        eyre::bail!("Expected a repository as owner/repo, got '{}'", repository);
    };
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        eyre::bail!("Expected a repository as owner/repo, got '{}'", repository);
    }

    let analyzer = Arc::new(baseline::analyzer(config)?);
    let scanner = baseline::github_scanner(config, analyzer)?;

    eprintln!("{} Scanning {}...", "->".blue().bold(), repository);
    let summary = scanner
        .scan(owner, repo)
        .await
        .wrap_err_with(|| format!("Failed to scan {}", repository))?;

    println!("{}", render_summary(&summary, format)?);
    Ok(())
}
