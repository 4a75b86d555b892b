//! Repository scanning
//!
//! A scan lists the repository's default-branch tree, keeps source files,
//! caps their number, then fetches and analyzes them one at a time.

use crate::provider::{EntryKind, ProviderError, RepositoryContentProvider, TreeEntry};
use baseline_api::{FileAnalysisResult, RepositoryAnalysisSummary, SkippedFile};
use baseline_core::{Analyzer, Language};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Maximum number of files analyzed per scan
pub const MAX_FILES: usize = 50;

/// Maximum decoded size of an analyzed file, in bytes
pub const MAX_FILE_SIZE: usize = 100 * 1024;

const SOURCE_EXTENSIONS: &[&str] = &[".js", ".jsx", ".ts", ".tsx", ".css"];

/// Paths containing any of these are never scanned
const EXCLUDED_FRAGMENTS: &[&str] = &["node_modules", "dist", "build", ".min."];

/// Whether a repository path is a source file the scanner analyzes
pub fn is_eligible(path: &str) -> bool {
    let path = path.to_lowercase();
    SOURCE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
        && !EXCLUDED_FRAGMENTS.iter().any(|frag| path.contains(frag))
}

/// Resource limits for one scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanLimits {
    pub max_files: usize,
    pub max_file_size: usize,
    /// Wall-clock budget; files not reached in time are skipped
    pub deadline: Option<Duration>,
}

impl Default for ScanLimits {
    fn default() -> Self {
        Self {
            max_files: MAX_FILES,
            max_file_size: MAX_FILE_SIZE,
            deadline: None,
        }
    }
}

/// Why a scan produced no summary
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("repository {0} not found")]
    RepositoryNotFound(String),

    #[error("access to repository {0} was denied")]
    AccessDenied(String),

    #[error("{0}")]
    Upstream(String),
}

impl ScanError {
    fn from_provider(repository: &str, err: ProviderError) -> Self {
        match err {
            ProviderError::NotFound(_) => ScanError::RepositoryNotFound(repository.to_string()),
            ProviderError::AccessDenied(_) => ScanError::AccessDenied(repository.to_string()),
            other @ ProviderError::MissingCredentials { .. } => ScanError::Upstream(other.to_string()),
            other => ScanError::Upstream(format!("failed to read {}: {}", repository, other)),
        }
    }
}

/// Scans repositories for browser compatibility issues
#[derive(Clone)]
pub struct RepositoryScanner {
    provider: Arc<dyn RepositoryContentProvider>,
    analyzer: Arc<Analyzer>,
    limits: ScanLimits,
}

impl RepositoryScanner {
    pub fn new(provider: Arc<dyn RepositoryContentProvider>, analyzer: Arc<Analyzer>) -> Self {
        Self {
            provider,
            analyzer,
            limits: ScanLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: ScanLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> &ScanLimits {
        &self.limits
    }

    /// Scan `owner/repo` on its default branch.
    ///
    /// Failing to resolve the repository or list its tree aborts the scan.
    /// Failures on individual files are recorded in `skipped_files` and the
    /// scan continues.
    pub async fn scan(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<RepositoryAnalysisSummary, ScanError> {
        let repository = format!("{}/{}", owner, repo);
        let started = Instant::now();

        let branch = self
            .provider
            .default_branch(owner, repo)
            .await
            .map_err(|e| ScanError::from_provider(&repository, e))?;

        let tree = self
            .provider
            .tree(owner, repo, &branch)
            .await
            .map_err(|e| ScanError::from_provider(&repository, e))?;

        let mut eligible: Vec<TreeEntry> = tree
            .into_iter()
            .filter(|entry| entry.kind == EntryKind::Blob && is_eligible(&entry.path))
            .collect();

        let mut summary = RepositoryAnalysisSummary::new(&repository);
        summary.eligible_files = eligible.len();
        eligible.truncate(self.limits.max_files);
        summary.total_files = eligible.len();

        info!(
            "Scanning {} on {}: {} eligible files, analyzing up to {}",
            repository, branch, summary.eligible_files, summary.total_files
        );

        let mut entries = eligible.into_iter();
        while let Some(entry) = entries.next() {
            if self.deadline_passed(started) {
                warn!(
                    "Scan of {} exceeded its deadline; skipping remaining files",
                    repository
                );
                for entry in std::iter::once(entry).chain(entries.by_ref()) {
                    summary.skipped_files.push(skipped(entry.path, "deadline exceeded"));
                }
                break;
            }

            self.scan_file(owner, repo, entry, &mut summary).await;
        }

        info!(
            "Scanned {} in {:?}: {} files analyzed, {} with issues, {} issues, {} skipped",
            repository,
            started.elapsed(),
            summary.files_analyzed,
            summary.files_with_issues,
            summary.total_issues,
            summary.skipped_files.len()
        );

        Ok(summary)
    }

    fn deadline_passed(&self, started: Instant) -> bool {
        self.limits
            .deadline
            .is_some_and(|deadline| started.elapsed() >= deadline)
    }

    async fn scan_file(
        &self,
        owner: &str,
        repo: &str,
        entry: TreeEntry,
        summary: &mut RepositoryAnalysisSummary,
    ) {
        let Some(sha) = entry.sha.as_deref() else {
            debug!("Skipping {}: no blob SHA", entry.path);
            summary.skipped_files.push(skipped(entry.path, "missing blob sha"));
            return;
        };

        let bytes = match self.provider.blob(owner, repo, sha).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Failed to fetch {}: {}", entry.path, e);
                summary
                    .skipped_files
                    .push(skipped(entry.path, format!("fetch failed: {}", e)));
                return;
            }
        };

        if bytes.len() > self.limits.max_file_size {
            debug!("Skipping {}: {} bytes", entry.path, bytes.len());
            summary.skipped_files.push(skipped(
                entry.path,
                format!("file too large ({} bytes)", bytes.len()),
            ));
            return;
        }

        let content = String::from_utf8_lossy(&bytes);
        let language = Language::from_path(&entry.path);
        let analysis = self.analyzer.analyze_detailed(&content, language);
        if let Some(err) = &analysis.parse_error {
            debug!("{} did not parse: {}", entry.path, err);
        } else if let Some(err) = &analysis.recovered_error {
            debug!("{} analyzed past a syntax error: {}", entry.path, err);
        }

        summary.files_analyzed += 1;

        let result = analysis.result;
        if result.issues.is_empty() {
            return;
        }

        summary.files_with_issues += 1;
        summary.total_issues += result.issues.len();
        summary.file_results.push(FileAnalysisResult {
            path: entry.path,
            language,
            score: result.score,
            issue_count: result.issues.len(),
            issues: result.issues,
        });
    }
}

fn skipped(path: String, reason: impl Into<String>) -> SkippedFile {
    SkippedFile {
        path,
        reason: reason.into(),
    }
}
