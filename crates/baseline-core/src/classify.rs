//! Baseline tier classification against the feature registry

use crate::registry::FeatureRegistry;
use facet::Facet;

/// How broadly a feature is supported across browsers.
///
/// Variants are declared from least to most desirable so that the derived
/// ordering matches: `WidelyAvailable > NewlyAvailable > Limited`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Facet)]
#[facet(rename_all = "kebab-case")]
#[repr(u8)]
pub enum BaselineTier {
    /// Not baseline in all core browsers
    Limited,
    /// Baseline, but only recently
    NewlyAvailable,
    /// Baseline for long enough to be safe everywhere
    WidelyAvailable,
}

impl BaselineTier {
    /// Map the registry's native baseline value onto a tier.
    ///
    /// `"high"` and `"low"` are the only values that mean baseline; anything
    /// else, including a missing value, is limited.
    pub fn from_registry(value: Option<&str>) -> Self {
        match value {
            Some("high") => BaselineTier::WidelyAvailable,
            Some("low") => BaselineTier::NewlyAvailable,
            _ => BaselineTier::Limited,
        }
    }

    /// Get the string representation of this tier
    pub fn as_str(&self) -> &'static str {
        match self {
            BaselineTier::WidelyAvailable => "widely-available",
            BaselineTier::NewlyAvailable => "newly-available",
            BaselineTier::Limited => "limited",
        }
    }
}

impl std::fmt::Display for BaselineTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying a known feature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub tier: BaselineTier,
    /// Date the feature became baseline, if the registry knows it
    pub since: Option<String>,
}

/// Classify a feature identifier.
///
/// Returns `None` when the registry has no entry for `id`. Callers drop such
/// features; an unknown feature is never reported as limited.
pub fn classify(registry: &FeatureRegistry, id: &str) -> Option<Classification> {
    let entry = registry.get(id)?;
    Some(Classification {
        tier: BaselineTier::from_registry(entry.baseline.as_deref()),
        since: entry.since.clone(),
    })
}
