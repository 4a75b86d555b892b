//! Output formatting for analysis results and repository summaries

use baseline_api::RepositoryAnalysisSummary;
use baseline_core::{AnalysisResult, BaselineTier, CompatibilityIssue};
use eyre::{Result, WrapErr};
use owo_colors::OwoColorize;

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Render the analysis of one source
pub fn render_analysis(name: &str, result: &AnalysisResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_analysis_text(name, result)),
        OutputFormat::Json => {
            facet_json::to_string_pretty(result).wrap_err("Failed to serialize analysis result")
        }
    }
}

/// Render a repository scan summary
pub fn render_summary(summary: &RepositoryAnalysisSummary, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_summary_text(summary)),
        OutputFormat::Json => {
            facet_json::to_string_pretty(summary).wrap_err("Failed to serialize scan summary")
        }
    }
}

fn colored_score(score: u8) -> String {
    let s = score.to_string();
    if score >= 80 {
        s.green().bold().to_string()
    } else if score >= 50 {
        s.yellow().bold().to_string()
    } else {
        s.red().bold().to_string()
    }
}

fn tier_marker(tier: BaselineTier) -> String {
    match tier {
        BaselineTier::WidelyAvailable => "✓".green().to_string(),
        BaselineTier::NewlyAvailable => "~".yellow().to_string(),
        BaselineTier::Limited => "!".red().to_string(),
    }
}

fn push_issue(output: &mut String, location: &str, issue: &CompatibilityIssue) {
    let position = match (issue.line, issue.column) {
        (Some(line), Some(column)) => format!("{}:{}:{}", location, line, column),
        (Some(line), None) => format!("{}:{}", location, line),
        _ => location.to_string(),
    };

    output.push_str(&format!(
        "  {} {} {} {}\n",
        tier_marker(issue.status),
        issue.feature.bold(),
        format!("[{}]", issue.status).dimmed(),
        position.dimmed()
    ));
    if let Some(recommendation) = &issue.recommendation {
        output.push_str(&format!("      {}\n", recommendation.dimmed()));
    }
}

fn render_analysis_text(name: &str, result: &AnalysisResult) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str(&format!("{} {}\n", "##".bold(), name.cyan().bold()));
    output.push('\n');
    output.push_str(&format!("Score: {}/100\n", colored_score(result.score)));

    if result.issues.is_empty() {
        output.push_str(&format!("{}\n", "No tracked features found".dimmed()));
        return output;
    }

    output.push_str(&format!(
        "  {} widely available, {} newly available, {} limited\n",
        result.count(BaselineTier::WidelyAvailable),
        result.count(BaselineTier::NewlyAvailable),
        result.count(BaselineTier::Limited)
    ));
    output.push('\n');

    for issue in &result.issues {
        push_issue(&mut output, name, issue);
    }

    output
}

fn render_summary_text(summary: &RepositoryAnalysisSummary) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str(&format!(
        "{} {} Compatibility Report\n",
        "##".bold(),
        summary.repository.cyan().bold()
    ));
    output.push('\n');

    output.push_str(&format!(
        "Overall score: {}/100\n",
        colored_score(summary.overall_score())
    ));
    output.push_str(&format!(
        "  {} of {} eligible files scanned, {} analyzed, {} with issues, {} issues total\n",
        summary.total_files,
        summary.eligible_files,
        summary.files_analyzed,
        summary.files_with_issues,
        summary.total_issues
    ));
    output.push('\n');

    for file in &summary.file_results {
        output.push_str(&format!(
            "{} {} ({}, score {})\n",
            "->".blue().bold(),
            file.path,
            file.language,
            colored_score(file.score)
        ));
        for issue in &file.issues {
            push_issue(&mut output, &file.path, issue);
        }
        output.push('\n');
    }

    if !summary.skipped_files.is_empty() {
        output.push_str(&format!(
            "{} Skipped Files ({}):\n",
            "?".yellow().bold(),
            summary.skipped_files.len()
        ));
        for skipped in &summary.skipped_files {
            output.push_str(&format!(
                "  {} {} - {}\n",
                "-".yellow(),
                skipped.path,
                skipped.reason.dimmed()
            ));
        }
        output.push('\n');
    }

    output
}
