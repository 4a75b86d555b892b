//! Common test utilities.

#![allow(dead_code)]

use baseline::provider::{MemoryProvider, MemoryRepo};
use baseline::scanner::RepositoryScanner;
use baseline_core::{Analyzer, FeatureRegistry, ScoreWeights};
use std::path::PathBuf;
use std::sync::Arc;

/// Get the path to the test fixtures directory.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Source fixtures shared with baseline-core.
pub fn source_fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../baseline-core/tests/fixtures")
}

pub fn read_source_fixture(name: &str) -> String {
    std::fs::read_to_string(source_fixtures_dir().join(name))
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", name, e))
}

/// Analyzer over the bundled registry with default weights.
pub fn analyzer() -> Arc<Analyzer> {
    Arc::new(Analyzer::new(
        Arc::new(FeatureRegistry::bundled().expect("bundled registry")),
        ScoreWeights::default(),
    ))
}

pub fn scanner(provider: MemoryProvider) -> RepositoryScanner {
    RepositoryScanner::new(Arc::new(provider), analyzer())
}

/// A small web project: two files with issues, one without, plus noise the
/// scanner must ignore.
pub fn sample_repo() -> MemoryRepo {
    MemoryRepo::new("main")
        .file("README.md", "# sample")
        .file("src/styles/layout.css", read_source_fixture("layout.css"))
        .file("src/util.js", "export const add = (a, b) => a + b;\n")
        .file("src/Dashboard.tsx", read_source_fixture("dashboard.tsx"))
        .file("node_modules/lib/index.js", "Promise.any([]);\n")
        .file("dist/bundle.js", "Promise.any([]);\n")
        .file("public/vendor.min.js", "Promise.any([]);\n")
}
