//! Tree-sitter parsing of CSS and JavaScript/TypeScript sources

use arborium::tree_sitter::{self, Node, Parser, Tree};
use facet::Facet;

/// Source language accepted by the analyzer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Facet)]
#[facet(rename_all = "lowercase")]
#[repr(u8)]
pub enum Language {
    /// CSS stylesheets
    Css,
    /// JavaScript, TypeScript, JSX and TSX
    Js,
}

impl Language {
    /// Parse a language name as accepted at the API boundary.
    ///
    /// `"javascript"` is an alias for `"js"`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "css" => Some(Language::Css),
            "js" | "javascript" => Some(Language::Js),
            _ => None,
        }
    }

    /// Infer the language from a file path: `.css` is CSS, anything else is JS.
    pub fn from_path(path: &str) -> Self {
        if path.to_lowercase().ends_with(".css") {
            Language::Css
        } else {
            Language::Js
        }
    }

    /// Get the string representation of this language
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Css => "css",
            Language::Js => "js",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source text could not be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub language: Language,
    /// Line of the first syntax error (1-indexed)
    pub line: usize,
    /// Column of the first syntax error (1-indexed)
    pub column: usize,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} syntax error at line {}, column {}",
            self.language, self.line, self.column
        )
    }
}

impl std::error::Error for ParseError {}

/// A parsed source, holding the text the tree refers to
pub struct SourceTree<'src> {
    pub language: Language,
    pub source: &'src str,
    tree: Tree,
    recovered: Option<ParseError>,
}

impl<'src> SourceTree<'src> {
    /// Root node of the syntax tree
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Text covered by a node
    pub fn text(&self, node: Node) -> &'src str {
        self.source
            .get(node.start_byte()..node.end_byte())
            .unwrap_or("")
    }

    /// First syntax error the parser recovered from, if the tree has any
    pub fn recovered_error(&self) -> Option<&ParseError> {
        self.recovered.as_ref()
    }
}

/// Parse `source` as `language`.
///
/// Tree-sitter recovers from input it does not understand by wrapping it in
/// error nodes, which also happens for valid syntax newer than the grammar
/// (named container queries, range media queries, `@import ... layer()`).
/// The recovered tree is kept as long as one top-level item parsed cleanly,
/// and [`SourceTree::recovered_error`] reports where recovery started. A
/// source where nothing parsed cleanly is a [`ParseError`].
///
/// JS is parsed as TSX first. Sources the TSX grammar rejects are retried as
/// plain TypeScript, which accepts `<T>expr` type assertions.
pub fn parse(source: &str, language: Language) -> Result<SourceTree<'_>, ParseError> {
    let tree = match language {
        Language::Css => parse_with(source, arborium_css::language().into()),
        Language::Js => match parse_with(source, arborium_tsx::language().into()) {
            Some(tsx) if !tsx.root_node().has_error() => Some(tsx),
            tsx => match parse_with(source, arborium_typescript::language().into()) {
                Some(ts) if !ts.root_node().has_error() => Some(ts),
                _ => tsx,
            },
        },
    };
    let Some(tree) = tree else {
        return Err(ParseError {
            language,
            line: 1,
            column: 1,
        });
    };

    let root = tree.root_node();
    let recovered = root.has_error().then(|| {
        let (line, column) = first_error(root)
            .map(|node| {
                let pos = node.start_position();
                (pos.row + 1, pos.column + 1)
            })
            .unwrap_or((1, 1));
        ParseError {
            language,
            line,
            column,
        }
    });

    match recovered {
        Some(err) if root.is_error() || !has_clean_item(root) => Err(err),
        recovered => Ok(SourceTree {
            language,
            source,
            tree,
            recovered,
        }),
    }
}

fn parse_with(source: &str, grammar: tree_sitter::Language) -> Option<Tree> {
    let mut parser = Parser::new();
    parser.set_language(&grammar).ok()?;
    parser.parse(source, None)
}

/// Whether any top-level item other than a comment parsed without errors
fn has_clean_item(root: Node) -> bool {
    let mut cursor = root.walk();
    root.named_children(&mut cursor)
        .any(|child| !child.is_extra() && !child.is_error() && !child.has_error())
}

fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = first_error(child) {
            return Some(found);
        }
    }
    None
}
