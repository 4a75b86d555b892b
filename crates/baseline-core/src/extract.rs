//! Feature extraction from parsed syntax trees
//!
//! The extractor walks the tree in document order and recognizes a small set
//! of syntactic shapes:
//!
//! - CSS: declarations (`property: value`) and pseudo-class selectors
//! - JS/TS: static member accesses (`Promise.any`) and method calls (`xs.at(-1)`)
//!
//! It does not classify anything; see [`crate::classify`].

use crate::features::{self, Feature};
use crate::parser::{Language, SourceTree};
use arborium::tree_sitter::Node;

/// One recognized use of a feature in a source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureMatch {
    pub feature: Feature,
    /// Human-readable name, e.g. `display: grid` or `Array.prototype.at`
    pub display_name: String,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

/// Extract all feature uses from a parsed source, in document order
pub fn extract(tree: &SourceTree) -> Vec<FeatureMatch> {
    let mut matches = Vec::new();
    let visit: fn(&SourceTree, Node, &mut Vec<FeatureMatch>) = match tree.language {
        Language::Css => visit_css,
        Language::Js => visit_js,
    };
    walk(tree, tree.root(), &mut matches, visit);
    matches
}

fn walk<F>(tree: &SourceTree, node: Node, matches: &mut Vec<FeatureMatch>, visit: F)
where
    F: Fn(&SourceTree, Node, &mut Vec<FeatureMatch>) + Copy,
{
    // Text inside error nodes has no reliable structure
    if node.is_error() {
        return;
    }
    visit(tree, node, matches);

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk(tree, child, matches, visit);
    }
}

fn push(matches: &mut Vec<FeatureMatch>, feature: Feature, display_name: String, at: Node) {
    let pos = at.start_position();
    matches.push(FeatureMatch {
        feature,
        display_name,
        line: pos.row + 1,
        column: pos.column + 1,
    });
}

// CSS

fn visit_css(tree: &SourceTree, node: Node, matches: &mut Vec<FeatureMatch>) {
    match node.kind() {
        "declaration" => css_declaration(tree, node, matches),
        "pseudo_class_selector" => css_pseudo_class(tree, node, matches),
        _ => {}
    }
}

fn css_declaration(tree: &SourceTree, node: Node, matches: &mut Vec<FeatureMatch>) {
    let mut cursor = node.walk();
    let mut property = None;
    let mut values = Vec::new();

    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "property_name" if property.is_none() => property = Some(tree.text(child)),
            "important" | "comment" => {}
            _ if property.is_some() => values.push(tree.text(child)),
            _ => {}
        }
    }

    let Some(property) = property else {
        return;
    };
    let property = property.trim().to_lowercase();
    let value = values.join(" ");
    let value = value.trim();

    if let Some(feature) = features::css_declaration(&property, &value.to_lowercase()) {
        push(matches, feature, format!("{}: {}", property, value), node);
    }
}

fn css_pseudo_class(tree: &SourceTree, node: Node, matches: &mut Vec<FeatureMatch>) {
    // The name is the first identifier after the `:` token; anything before
    // the colon is the selector the pseudo-class is attached to.
    let mut cursor = node.walk();
    let mut colon = None;

    for child in node.children(&mut cursor) {
        if colon.is_none() {
            if tree.text(child) == ":" {
                colon = Some(child);
            }
            continue;
        }
        if matches!(child.kind(), "class_name" | "identifier") {
            let name = tree.text(child).to_lowercase();
            if let (Some(feature), Some(colon)) = (features::css_pseudo_class(&name), colon) {
                push(matches, feature, format!(":{}()", name), colon);
            }
            return;
        }
    }
}

// JavaScript / TypeScript

fn visit_js(tree: &SourceTree, node: Node, matches: &mut Vec<FeatureMatch>) {
    match node.kind() {
        "call_expression" => js_call(tree, node, matches),
        "member_expression" => js_member(tree, node, matches),
        _ => {}
    }
}

fn js_call(tree: &SourceTree, node: Node, matches: &mut Vec<FeatureMatch>) {
    let Some(callee) = node.child_by_field_name("function") else {
        return;
    };
    if callee.kind() != "member_expression" {
        return;
    }
    let Some(property) = callee.child_by_field_name("property") else {
        return;
    };

    if let Some(feature) = features::js_method_call(tree.text(property)) {
        let name = feature.api_name().unwrap_or_else(|| tree.text(property));
        push(matches, feature, name.to_string(), property);
    }
}

fn js_member(tree: &SourceTree, node: Node, matches: &mut Vec<FeatureMatch>) {
    let (Some(object), Some(property)) = (
        node.child_by_field_name("object"),
        node.child_by_field_name("property"),
    ) else {
        return;
    };
    if object.kind() != "identifier" {
        return;
    }

    if let Some(feature) = features::js_static_member(tree.text(object), tree.text(property)) {
        let name = feature.api_name().unwrap_or_else(|| tree.text(node));
        push(matches, feature, name.to_string(), node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn extract_from(source: &str, language: Language) -> Vec<FeatureMatch> {
        let tree = parse(source, language).expect("source should parse");
        extract(&tree)
    }

    fn names(matches: &[FeatureMatch]) -> Vec<&str> {
        matches.iter().map(|m| m.display_name.as_str()).collect()
    }

    #[test]
    fn test_css_declarations_in_order() {
        let source = r#"
.layout {
    display: grid;
    gap: 1rem;
    container-type: inline-size;
}
.row { display: inline-flex; color: red; }
"#;
        let matches = extract_from(source, Language::Css);
        assert_eq!(
            names(&matches),
            vec![
                "display: grid",
                "gap: 1rem",
                "container-type: inline-size",
                "display: inline-flex",
            ]
        );
        assert_eq!(matches[0].line, 3);
        assert_eq!(matches[0].column, 5);
        assert_eq!(matches[3].feature, Feature::Flexbox);
    }

    #[test]
    fn test_css_case_insensitive() {
        let matches = extract_from(".a { DISPLAY: Grid; }", Language::Css);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].feature, Feature::Grid);
        assert_eq!(matches[0].display_name, "display: Grid");
    }

    #[test]
    fn test_css_important_is_not_part_of_value() {
        let matches = extract_from(".a { word-break: auto-phrase !important; }", Language::Css);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].feature, Feature::WordBreakAutoPhrase);
    }

    #[test]
    fn test_css_pseudo_classes() {
        let source = ".card:has(img) { color: red; }\n:is(h1, h2):hover { margin: 0; }\n";
        let matches = extract_from(source, Language::Css);
        assert_eq!(names(&matches), vec![":has()", ":is()"]);
        assert_eq!(matches[0].line, 1);
        assert_eq!(matches[0].column, 6);
        assert_eq!(matches[1].line, 2);
    }

    #[test]
    fn test_css_inside_at_rules() {
        let source = "@media (min-width: 600px) { .a { display: grid; } }";
        let matches = extract_from(source, Language::Css);
        assert_eq!(names(&matches), vec!["display: grid"]);
    }

    #[test]
    fn test_js_static_members_and_calls() {
        let source = r#"
const settled = Promise.allSettled(tasks);
const last = items.at(-1);
const sorted = items.toSorted();
if (Object.hasOwn(obj, "key")) {}
"#;
        let matches = extract_from(source, Language::Js);
        assert_eq!(
            names(&matches),
            vec![
                "Promise.allSettled",
                "Array.prototype.at",
                "Array.prototype.toSorted",
                "Object.hasOwn",
            ]
        );
        assert_eq!(matches[1].line, 3);
    }

    #[test]
    fn test_js_at_matches_any_receiver() {
        let matches = extract_from("const c = \"hello\".at(0);", Language::Js);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].feature, Feature::ArrayAt);
    }

    #[test]
    fn test_js_at_requires_call() {
        let matches = extract_from("const f = items.at;", Language::Js);
        assert!(matches.is_empty());
    }

    #[test]
    fn test_js_ignores_unknown_members() {
        let matches = extract_from("Object.keys(o); Math.max(1, 2); foo.bar.baz();", Language::Js);
        assert!(matches.is_empty());
    }

    #[test]
    fn test_js_in_typescript_jsx() {
        let source = r#"
type Item = { id: number };
export const Last = ({ items }: { items: Item[] }) => <span>{items.at(-1)?.id}</span>;
"#;
        let matches = extract_from(source, Language::Js);
        assert_eq!(names(&matches), vec!["Array.prototype.at"]);
    }

    #[test]
    fn test_js_in_typescript_type_assertion() {
        let source = "const el = <HTMLElement>document.body;\nconst last = items.at(-1);";
        let matches = extract_from(source, Language::Js);
        assert_eq!(names(&matches), vec!["Array.prototype.at"]);
        assert_eq!(matches[0].line, 2);
    }
}
