//! Import extraction for Python source files
//!
//! Uses `tree-sitter-python` to parse source text and collect the top-level
//! module name of every `import` / `from ... import` statement in the file.

use std::collections::BTreeSet;

use thiserror::Error;
use tree_sitter::{Node, Parser, Tree};

/// Errors that can occur while extracting imports
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Failed to load Python grammar: {0}")]
    Grammar(#[from] tree_sitter::LanguageError),

    #[error("Parser produced no syntax tree")]
    NoTree,

    #[error("Invalid syntax at line {line}, column {column}: {snippet:?}")]
    Syntax {
        line: usize,
        column: usize,
        snippet: String,
    },
}

/// Reusable import extractor holding one tree-sitter parser
pub struct ImportExtractor {
    parser: Parser,
}

impl ImportExtractor {
    /// Create an extractor configured for Python
    pub fn new() -> Result<Self, ImportError> {
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_python::LANGUAGE.into())?;
        Ok(Self { parser })
    }

    /// Collect the distinct top-level module names imported by `source`
    pub fn extract(&mut self, source: &str) -> Result<BTreeSet<String>, ImportError> {
        let tree = self.parse(source)?;
        let bytes = source.as_bytes();

        let mut imports = BTreeSet::new();
        let mut stack = vec![tree.root_node()];

        while let Some(node) = stack.pop() {
            match node.kind() {
                "import_statement" => {
                    let mut cursor = node.walk();
                    for name in node.children_by_field_name("name", &mut cursor) {
                        // `import a.b as c` wraps the dotted name in an aliased_import
                        let dotted = if name.kind() == "aliased_import" {
                            name.child_by_field_name("name")
                        } else {
                            Some(name)
                        };
                        if let Some(top) = dotted.and_then(|d| top_level_name(d, bytes)) {
                            imports.insert(top);
                        }
                    }
                }
                "import_from_statement" => {
                    if let Some(top) = node
                        .child_by_field_name("module_name")
                        .and_then(|module| from_module_name(module, bytes))
                    {
                        imports.insert(top);
                    }
                }
                "future_import_statement" => {
                    imports.insert("__future__".to_string());
                }
                _ => {}
            }

            let mut cursor = node.walk();
            stack.extend(node.named_children(&mut cursor));
        }

        Ok(imports)
    }

    fn parse(&mut self, source: &str) -> Result<Tree, ImportError> {
        let tree = self.parser.parse(source, None).ok_or(ImportError::NoTree)?;

        let root = tree.root_node();
        let bytes = source.as_bytes();
        let rejected = if root.has_error() {
            Some(first_error(root).unwrap_or(root))
        } else {
            first_rejected(root, bytes).or_else(|| stray_backtick(root, bytes))
        };

        if let Some(bad) = rejected {
            let position = bad.start_position();
            let snippet = bad
                .utf8_text(bytes)
                .unwrap_or_default()
                .lines()
                .next()
                .unwrap_or_default()
                .to_string();
            return Err(ImportError::Syntax {
                line: position.row + 1,
                column: position.column + 1,
                snippet,
            });
        }

        Ok(tree)
    }
}

/// First node, in document order, that the grammar accepts but Python 3
/// rejects.
///
/// tree-sitter-python still parses Python 2 forms (`print x`, `exec code`,
/// `except E, e`, `<>`, `0777`, `10L`) and does not track indentation levels, so
/// these are checked after the parse.
fn first_rejected<'t>(root: Node<'t>, source: &[u8]) -> Option<Node<'t>> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if let Some(bad) = rejected_node(node, source) {
            return Some(bad);
        }
        let mut cursor = node.walk();
        let children: Vec<_> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    None
}

fn rejected_node<'t>(node: Node<'t>, source: &[u8]) -> Option<Node<'t>> {
    match node.kind() {
        "print_statement" | "exec_statement" | "<>" => Some(node),
        "except_clause" => {
            // `except E, e:` puts the comma directly under the clause
            let mut cursor = node.walk();
            node.children(&mut cursor).find(|c| c.kind() == ",")
        }
        "integer" => {
            let text = node.utf8_text(source).ok()?;
            is_python2_integer(text).then_some(node)
        }
        "identifier" => {
            let text = node.utf8_text(source).ok()?;
            matches!(text, "async" | "await").then_some(node)
        }
        "module" => misaligned_statement(node, source, Some(0)),
        "block" => misaligned_statement(node, source, None),
        _ => None,
    }
}

/// Python 2 integer forms: `0777` octal and `10L` longs.
/// `0`, `00`, `0_0`, `0x1f`, `0o17` and imaginary `017j` are fine.
fn is_python2_integer(text: &str) -> bool {
    if text.ends_with(['l', 'L']) {
        return true;
    }
    let digits: String = text.chars().filter(|&c| c != '_').collect();
    digits.len() > 1
        && digits.starts_with('0')
        && digits.bytes().all(|b| b.is_ascii_digit())
        && digits.bytes().any(|b| b != b'0')
}

/// A statement that starts its line at a column different from its
/// siblings (inconsistent dedent) or, at module level, anywhere but column 0.
fn misaligned_statement<'t>(
    body: Node<'t>,
    source: &[u8],
    expected: Option<usize>,
) -> Option<Node<'t>> {
    let mut column = expected;
    let mut cursor = body.walk();
    for child in body.named_children(&mut cursor) {
        if child.kind() == "comment" || !starts_line(child, source) {
            continue;
        }
        let start = child.start_position().column;
        match column {
            Some(expected) if expected != start => return Some(child),
            Some(_) => {}
            None => column = Some(start),
        }
    }
    None
}

/// True when only whitespace precedes `node` on its line
fn starts_line(node: Node<'_>, source: &[u8]) -> bool {
    let start = node.start_byte();
    let line_start = start - node.start_position().column;
    source[line_start..start]
        .iter()
        .all(|b| matches!(b, b' ' | b'\t' | b'\x0c'))
}

/// Backquote repr (`` `x` ``) outside a string or comment
fn stray_backtick<'t>(root: Node<'t>, source: &[u8]) -> Option<Node<'t>> {
    source
        .iter()
        .enumerate()
        .filter(|(_, b)| **b == b'`')
        .filter_map(|(offset, _)| root.descendant_for_byte_range(offset, offset + 1))
        .find(|node| !inside_literal(*node))
}

fn inside_literal(node: Node<'_>) -> bool {
    let mut current = Some(node);
    while let Some(n) = current {
        if matches!(n.kind(), "string" | "comment") {
            return true;
        }
        current = n.parent();
    }
    false
}

/// Parse `source` with a fresh extractor and return its imports
pub fn extract_imports(source: &str) -> Result<BTreeSet<String>, ImportError> {
    ImportExtractor::new()?.extract(source)
}

/// Module part of a `from X import Y` statement.
///
/// Relative imports keep their dotted part (`from ..a.b import c` gives `a`);
/// a bare relative import (`from . import c`) has no module and yields `None`.
fn from_module_name(module: Node<'_>, source: &[u8]) -> Option<String> {
    match module.kind() {
        "dotted_name" => top_level_name(module, source),
        "relative_import" => {
            let mut cursor = module.walk();
            let dotted = module
                .named_children(&mut cursor)
                .find(|child| child.kind() == "dotted_name");
            dotted.and_then(|d| top_level_name(d, source))
        }
        _ => None,
    }
}

/// First identifier of a dotted name (`a` in `a.b.c`)
fn top_level_name(dotted: Node<'_>, source: &[u8]) -> Option<String> {
    let first = if dotted.kind() == "dotted_name" {
        dotted.named_child(0)?
    } else {
        dotted
    };
    let text = first.utf8_text(source).ok()?.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Depth-first search for the first ERROR or MISSING node in document order
fn first_error(root: Node<'_>) -> Option<Node<'_>> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if node.has_error() {
            let mut cursor = node.walk();
            let children: Vec<_> = node.children(&mut cursor).collect();
            // Reversed so the leftmost child is visited first
            stack.extend(children.into_iter().rev());
        }
    }
    None
}
