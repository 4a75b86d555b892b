//! The fixed set of web-platform features the extractor recognizes
//!
//! Every recognized syntactic shape maps to exactly one [`Feature`], and every
//! feature knows its registry identifier and where its tier comes from.
//! Adding a feature means adding a variant; the compiler then points at every
//! match that needs a new arm.

use crate::classify::BaselineTier;

/// A recognized web-platform feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    // CSS properties and values
    ContainerQueries,
    Grid,
    Flexbox,
    Gap,
    WordBreakAutoPhrase,

    // CSS pseudo-classes
    HasPseudoClass,
    IsPseudoClass,
    WherePseudoClass,

    // JavaScript static members
    PromiseAllSettled,
    PromiseAny,
    PromiseWithResolvers,
    ObjectHasOwn,
    ObjectGroupBy,
    ObjectFromEntries,
    MapGroupBy,
    ArrayFromAsync,
    IntlDurationFormat,

    // JavaScript instance methods
    ArrayAt,
    ArrayToSorted,
}

/// Where a feature's baseline tier comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierSource {
    /// Looked up in the feature registry by identifier
    Registry,
    /// Fixed tier, the registry is not consulted
    Fixed(BaselineTier),
}

impl Feature {
    /// Registry identifier for this feature.
    ///
    /// Pseudo-classes live in their own `:`-prefixed namespace.
    pub fn id(&self) -> &'static str {
        match self {
            Feature::ContainerQueries => "container-queries",
            Feature::Grid => "grid",
            Feature::Flexbox => "flexbox",
            Feature::Gap => "gap",
            Feature::WordBreakAutoPhrase => "word-break-auto-phrase",
            Feature::HasPseudoClass => ":has",
            Feature::IsPseudoClass => ":is",
            Feature::WherePseudoClass => ":where",
            Feature::PromiseAllSettled => "promise-allsettled",
            Feature::PromiseAny => "promise-any",
            Feature::PromiseWithResolvers => "promise-withresolvers",
            Feature::ObjectHasOwn => "object-hasown",
            Feature::ObjectGroupBy | Feature::MapGroupBy => "array-group",
            Feature::ObjectFromEntries => "object-fromentries",
            Feature::ArrayFromAsync => "array-fromasync",
            Feature::IntlDurationFormat => "intl-duration-format",
            Feature::ArrayAt => "array-at",
            Feature::ArrayToSorted => "array-by-copy",
        }
    }

    pub fn tier_source(&self) -> TierSource {
        match self {
            Feature::ArrayToSorted => TierSource::Fixed(BaselineTier::NewlyAvailable),
            _ => TierSource::Registry,
        }
    }

    /// Whether the tier is looked up in the registry
    pub fn registry_driven(&self) -> bool {
        matches!(self.tier_source(), TierSource::Registry)
    }

    /// Display name for JavaScript features; CSS features are named after
    /// the declaration or selector they were found in.
    pub fn api_name(&self) -> Option<&'static str> {
        let name = match self {
            Feature::PromiseAllSettled => "Promise.allSettled",
            Feature::PromiseAny => "Promise.any",
            Feature::PromiseWithResolvers => "Promise.withResolvers",
            Feature::ObjectHasOwn => "Object.hasOwn",
            Feature::ObjectGroupBy => "Object.groupBy",
            Feature::ObjectFromEntries => "Object.fromEntries",
            Feature::MapGroupBy => "Map.groupBy",
            Feature::ArrayFromAsync => "Array.fromAsync",
            Feature::IntlDurationFormat => "Intl.DurationFormat",
            Feature::ArrayAt => "Array.prototype.at",
            Feature::ArrayToSorted => "Array.prototype.toSorted",
            Feature::ContainerQueries
            | Feature::Grid
            | Feature::Flexbox
            | Feature::Gap
            | Feature::WordBreakAutoPhrase
            | Feature::HasPseudoClass
            | Feature::IsPseudoClass
            | Feature::WherePseudoClass => return None,
        };
        Some(name)
    }
}

/// Match a CSS declaration. `property` and `value` must already be lowercased.
pub fn css_declaration(property: &str, value: &str) -> Option<Feature> {
    match property {
        "container-type" | "container-name" => Some(Feature::ContainerQueries),
        "display" if value.contains("grid") => Some(Feature::Grid),
        "display" if value.contains("flex") => Some(Feature::Flexbox),
        "gap" => Some(Feature::Gap),
        "word-break" if value == "auto-phrase" => Some(Feature::WordBreakAutoPhrase),
        _ => None,
    }
}

/// Match a CSS pseudo-class by name (without the leading colon), lowercased.
pub fn css_pseudo_class(name: &str) -> Option<Feature> {
    match name {
        "has" => Some(Feature::HasPseudoClass),
        "is" => Some(Feature::IsPseudoClass),
        "where" => Some(Feature::WherePseudoClass),
        _ => None,
    }
}

/// Match a two-part static member access such as `Promise.any`.
pub fn js_static_member(object: &str, property: &str) -> Option<Feature> {
    match (object, property) {
        ("Promise", "allSettled") => Some(Feature::PromiseAllSettled),
        ("Promise", "any") => Some(Feature::PromiseAny),
        ("Promise", "withResolvers") => Some(Feature::PromiseWithResolvers),
        ("Object", "hasOwn") => Some(Feature::ObjectHasOwn),
        ("Object", "groupBy") => Some(Feature::ObjectGroupBy),
        ("Object", "fromEntries") => Some(Feature::ObjectFromEntries),
        ("Map", "groupBy") => Some(Feature::MapGroupBy),
        ("Array", "fromAsync") => Some(Feature::ArrayFromAsync),
        ("Intl", "DurationFormat") => Some(Feature::IntlDurationFormat),
        _ => None,
    }
}

/// Match a method call by method name alone, whatever the receiver.
///
/// `foo.at(0)` is reported even when `foo` is not an array.
pub fn js_method_call(method: &str) -> Option<Feature> {
    match method {
        "at" => Some(Feature::ArrayAt),
        "toSorted" => Some(Feature::ArrayToSorted),
        _ => None,
    }
}
