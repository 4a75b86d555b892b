//! Single-source analysis: parse, extract, classify, score

use crate::classify::{BaselineTier, Classification, classify};
use crate::extract::{FeatureMatch, extract};
use crate::features::TierSource;
use crate::parser::{Language, ParseError, parse};
use crate::registry::FeatureRegistry;
use crate::score::{ScoreWeights, score};
use facet::Facet;
use std::sync::Arc;

/// One detected use of a classified feature
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct CompatibilityIssue {
    /// Discovery index within one result (`"0"`, `"1"`, ...)
    pub id: String,
    /// Human-readable feature, e.g. `display: grid`
    pub feature: String,
    pub status: BaselineTier,
    /// Line number (1-indexed)
    #[facet(default)]
    pub line: Option<usize>,
    /// Column number (1-indexed)
    #[facet(default)]
    pub column: Option<usize>,
    pub message: String,
    #[facet(default)]
    pub recommendation: Option<String>,
    /// Date the feature became baseline
    #[facet(default)]
    pub since: Option<String>,
}

/// Score and issues for one source
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct AnalysisResult {
    /// Compatibility score from 0 to 100
    pub score: u8,
    /// Issues in document order
    pub issues: Vec<CompatibilityIssue>,
}

impl AnalysisResult {
    /// A result with no issues
    pub fn clean() -> Self {
        Self {
            score: 100,
            issues: Vec::new(),
        }
    }

    /// Number of issues with the given tier
    pub fn count(&self, tier: BaselineTier) -> usize {
        self.issues.iter().filter(|i| i.status == tier).count()
    }
}

/// An analysis result together with how well its source parsed.
///
/// A source that failed to parse yields a clean result, which says nothing
/// about its compatibility; `parse_error` tells the two cases apart.
/// `recovered_error` is set when the source was analyzed from a tree the
/// parser had to repair.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub result: AnalysisResult,
    pub parse_error: Option<ParseError>,
    pub recovered_error: Option<ParseError>,
}

/// Analyzes CSS and JavaScript sources against a feature registry
#[derive(Debug, Clone)]
pub struct Analyzer {
    registry: Arc<FeatureRegistry>,
    weights: ScoreWeights,
}

impl Analyzer {
    pub fn new(registry: Arc<FeatureRegistry>, weights: ScoreWeights) -> Self {
        Self { registry, weights }
    }

    pub fn registry(&self) -> &FeatureRegistry {
        &self.registry
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    /// Analyze one source. Never fails: unparseable input has no issues.
    pub fn analyze(&self, source: &str, language: Language) -> AnalysisResult {
        self.analyze_detailed(source, language).result
    }

    /// Analyze one source, reporting whether it had to recover from a parse error
    pub fn analyze_detailed(&self, source: &str, language: Language) -> Analysis {
        let tree = match parse(source, language) {
            Ok(tree) => tree,
            Err(parse_error) => {
                return Analysis {
                    result: AnalysisResult::clean(),
                    parse_error: Some(parse_error),
                    recovered_error: None,
                };
            }
        };

        let issues: Vec<CompatibilityIssue> = extract(&tree)
            .into_iter()
            .filter_map(|m| self.classify_match(m))
            .enumerate()
            .map(|(index, (m, classification))| to_issue(index, m, classification))
            .collect();

        Analysis {
            result: AnalysisResult {
                score: score(&issues, &self.weights),
                issues,
            },
            parse_error: None,
            recovered_error: tree.recovered_error().cloned(),
        }
    }

    fn classify_match(&self, m: FeatureMatch) -> Option<(FeatureMatch, Classification)> {
        let classification = match m.feature.tier_source() {
            TierSource::Registry => classify(&self.registry, m.feature.id())?,
            TierSource::Fixed(tier) => Classification { tier, since: None },
        };
        Some((m, classification))
    }
}

fn to_issue(index: usize, m: FeatureMatch, classification: Classification) -> CompatibilityIssue {
    let (message, recommendation) = match classification.tier {
        BaselineTier::WidelyAvailable => (
            format!("{} is widely available across browsers", m.display_name),
            None,
        ),
        BaselineTier::NewlyAvailable => (
            format!(
                "{} is newly available and may be missing in older browsers",
                m.display_name
            ),
            Some("Check your supported browsers or provide a fallback".to_string()),
        ),
        BaselineTier::Limited => (
            format!("{} has limited availability across browsers", m.display_name),
            Some("Use feature detection or provide a fallback".to_string()),
        ),
    };

    CompatibilityIssue {
        id: index.to_string(),
        feature: m.display_name,
        status: classification.tier,
        line: Some(m.line),
        column: Some(m.column),
        message,
        recommendation,
        since: classification.since,
    }
}
