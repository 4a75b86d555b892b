//! Feature registry loading and lookup

use eyre::{Result, WrapErr};
use facet::Facet;
use std::collections::HashMap;
use std::path::Path;

/// Registry snapshot bundled with the crate, used when no registry file is configured.
const BUNDLED_REGISTRY: &str = include_str!("../data/registry.json");

/// Support data for one feature, as published by the registry
#[derive(Debug, Clone, Facet)]
pub struct FeatureEntry {
    /// Human-readable feature name
    #[facet(default)]
    pub name: Option<String>,
    /// Native baseline value: `"high"`, `"low"`, or null when not baseline
    #[facet(default)]
    pub baseline: Option<String>,
    /// Date the feature became baseline (newly available)
    #[facet(default)]
    pub since: Option<String>,
}

/// The feature registry structure (from registry.json)
#[derive(Debug, Clone, Facet)]
pub struct FeatureRegistry {
    /// Map of feature identifiers to their support data
    pub features: HashMap<String, FeatureEntry>,
}

impl FeatureRegistry {
    /// Parse a registry from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        facet_json::from_str(json).wrap_err("Failed to parse feature registry JSON")
    }

    /// Load a registry from a local file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read feature registry from {}", path.display()))?;
        Self::from_json(&content)
            .wrap_err_with(|| format!("Failed to parse feature registry from {}", path.display()))
    }

    /// The registry snapshot shipped with this crate
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_REGISTRY).wrap_err("Bundled feature registry is invalid")
    }

    /// Look up a feature by identifier
    pub fn get(&self, id: &str) -> Option<&FeatureEntry> {
        self.features.get(id)
    }

    /// Check if a feature identifier exists in this registry
    pub fn contains(&self, id: &str) -> bool {
        self.features.contains_key(id)
    }

    /// Number of features in this registry
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether this registry has no features
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
