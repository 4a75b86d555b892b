//! Compatibility score computation

use crate::analyze::CompatibilityIssue;
use crate::classify::BaselineTier;

/// Weight of a widely available feature. Fixed; the other tiers are configurable.
pub const WIDELY_AVAILABLE_WEIGHT: f64 = 1.0;

/// Upper bound for the configurable tier weights
pub const MAX_TIER_WEIGHT: f64 = 0.7;

/// Per-tier weights used to score a list of issues
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    newly_available: f64,
    limited: f64,
}

/// A configured weight is outside `0.0..=0.7`
#[derive(Debug, Clone, PartialEq)]
pub struct WeightError {
    pub tier: BaselineTier,
    pub weight: f64,
}

impl std::fmt::Display for WeightError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "weight {} for {} must be between 0.0 and {}",
            self.weight, self.tier, MAX_TIER_WEIGHT
        )
    }
}

impl std::error::Error for WeightError {}

impl ScoreWeights {
    /// Create weights for the newly-available and limited tiers
    pub fn new(newly_available: f64, limited: f64) -> Result<Self, WeightError> {
        for (tier, weight) in [
            (BaselineTier::NewlyAvailable, newly_available),
            (BaselineTier::Limited, limited),
        ] {
            if !(0.0..=MAX_TIER_WEIGHT).contains(&weight) {
                return Err(WeightError { tier, weight });
            }
        }
        Ok(Self {
            newly_available,
            limited,
        })
    }

    /// Weight assigned to one issue of the given tier
    pub fn weight(&self, tier: BaselineTier) -> f64 {
        match tier {
            BaselineTier::WidelyAvailable => WIDELY_AVAILABLE_WEIGHT,
            BaselineTier::NewlyAvailable => self.newly_available,
            BaselineTier::Limited => self.limited,
        }
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            newly_available: 0.6,
            limited: 0.2,
        }
    }
}

/// Score a list of tiers from 0 to 100.
///
/// The score is the mean per-issue weight scaled to 100, so it measures the
/// share of feature usage that is safe. An empty list scores 100.
pub fn score_tiers(tiers: impl IntoIterator<Item = BaselineTier>, weights: &ScoreWeights) -> u8 {
    let (count, total) = tiers
        .into_iter()
        .fold((0usize, 0.0f64), |(count, total), tier| {
            (count + 1, total + weights.weight(tier))
        });

    if count == 0 {
        return 100;
    }

    ((total / count as f64) * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Score a list of issues from 0 to 100
pub fn score(issues: &[CompatibilityIssue], weights: &ScoreWeights) -> u8 {
    score_tiers(issues.iter().map(|issue| issue.status), weights)
}
