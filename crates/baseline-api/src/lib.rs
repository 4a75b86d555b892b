//! API types for the baseline server
//!
//! This crate contains the JSON types shared by the baseline HTTP server and
//! CLI: repository scan summaries and the small response envelopes. Single
//! source results use [`baseline_core::AnalysisResult`] directly.

use baseline_core::{CompatibilityIssue, Language};
use facet::Facet;

/// Analysis of one file from a repository scan
#[derive(Debug, Clone, PartialEq, Facet)]
#[facet(rename_all = "camelCase")]
pub struct FileAnalysisResult {
    /// Path within the repository
    pub path: String,
    pub language: Language,
    pub score: u8,
    pub issue_count: usize,
    pub issues: Vec<CompatibilityIssue>,
}

/// A file the scanner did not analyze, and why
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct SkippedFile {
    pub path: String,
    pub reason: String,
}

/// Aggregate result of scanning a repository
#[derive(Debug, Clone, PartialEq, Facet)]
#[facet(rename_all = "camelCase")]
pub struct RepositoryAnalysisSummary {
    /// `owner/repo`
    pub repository: String,
    /// Eligible files after the per-scan file cap
    pub total_files: usize,
    /// Eligible files before the per-scan file cap
    pub eligible_files: usize,
    pub files_analyzed: usize,
    pub files_with_issues: usize,
    pub total_issues: usize,
    /// Only files with at least one issue, in tree order
    pub file_results: Vec<FileAnalysisResult>,
    #[facet(default)]
    pub skipped_files: Vec<SkippedFile>,
}

impl RepositoryAnalysisSummary {
    /// An empty summary for `repository`
    pub fn new(repository: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            total_files: 0,
            eligible_files: 0,
            files_analyzed: 0,
            files_with_issues: 0,
            total_issues: 0,
            file_results: Vec::new(),
            skipped_files: Vec::new(),
        }
    }

    /// Share of analyzed files without issues, from 0 to 100.
    ///
    /// A scan that analyzed nothing scores 100.
    pub fn overall_score(&self) -> u8 {
        if self.files_analyzed == 0 {
            return 100;
        }
        let clean = self.files_analyzed.saturating_sub(self.files_with_issues);
        ((clean as f64 / self.files_analyzed as f64) * 100.0).round() as u8
    }
}

/// Body of `POST /api/analyze`
#[derive(Debug, Clone, Facet)]
pub struct AnalyzeRequest {
    pub code: String,
    pub language: String,
}

/// Body of `POST /api/analyze-repo`
#[derive(Debug, Clone, Facet)]
pub struct AnalyzeRepoRequest {
    pub owner: String,
    pub repo: String,
}

/// Health check response
#[derive(Debug, Clone, Facet)]
pub struct HealthResponse {
    pub status: String,
}

/// API error response (always JSON)
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct ApiErrorBody {
    pub error: String,
    pub code: String,
}
