//! baseline-core - Core library for browser compatibility analysis
//!
//! This crate provides the building blocks for:
//! - Parsing CSS and JavaScript/TypeScript (including JSX) with tree-sitter
//! - Extracting uses of web-platform features from the syntax tree
//! - Classifying features against a baseline registry
//! - Scoring a source by the share of its feature usage that is safe
//!
//! # Analyzing a source
//!
//! ```
//! use std::sync::Arc;
//! use baseline_core::{Analyzer, BaselineTier, FeatureRegistry, Language, ScoreWeights};
//!
//! let registry = Arc::new(FeatureRegistry::bundled().unwrap());
//! let analyzer = Analyzer::new(registry, ScoreWeights::default());
//!
//! let result = analyzer.analyze(".a { display: grid; }", Language::Css);
//! assert_eq!(result.score, 100);
//! assert_eq!(result.issues.len(), 1);
//! assert_eq!(result.issues[0].feature, "display: grid");
//! assert_eq!(result.issues[0].status, BaselineTier::WidelyAvailable);
//! ```
//!
//! # Registry
//!
//! The registry maps feature identifiers to a baseline value (`"high"`,
//! `"low"`, or null) and a "since" date. A snapshot is bundled with the crate;
//! use [`FeatureRegistry::load`] to analyze against another one.
//!
//! ```json
//! { "features": { "grid": { "baseline": "high", "since": "2017-10-17" } } }
//! ```
//!
//! Features the extractor recognizes but the registry does not know are
//! dropped from results.

mod analyze;
mod classify;
mod extract;
pub mod features;
mod parser;
mod registry;
mod score;

pub use analyze::{Analysis, AnalysisResult, Analyzer, CompatibilityIssue};
pub use classify::{BaselineTier, Classification, classify};
pub use extract::{FeatureMatch, extract};
pub use features::{Feature, TierSource};
pub use parser::{Language, ParseError, SourceTree, parse};
pub use registry::{FeatureEntry, FeatureRegistry};
pub use score::{MAX_TIER_WEIGHT, ScoreWeights, WeightError, score, score_tiers};
