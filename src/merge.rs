//! Literal merging.
//!
//! The parser emits one node per character. Drawn as-is, `hello` would be
//! five boxes; merging folds each run of plain literals into one.

use crate::ast::Node;

/// Coalesces every maximal run of unquantified literal and literal-escape
/// siblings into a single literal node.
pub fn merge(siblings: &[Node]) -> Vec<Node> {
    let mut merged = Vec::with_capacity(siblings.len());
    let mut run: Option<String> = None;

    for node in siblings {
        if node.is_mergeable_literal() {
            run.get_or_insert_with(String::new)
                .push_str(node.literal_text());
            continue;
        }
        if let Some(text) = run.take() {
            merged.push(Node::literal(text));
        }
        merged.push(node.clone());
    }
    if let Some(text) = run {
        merged.push(Node::literal(text));
    }
    merged
}
