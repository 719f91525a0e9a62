//! Node helpers shared by every grammar.

use ast_grep_core::Node;
use ast_grep_core::tree_sitter::StrDoc;
use ast_grep_language::SupportLang;

pub type AstNode<'r> = Node<'r, StrDoc<SupportLang>>;

/// Text of a named field, whitespace-normalized.
pub fn field_text(node: &AstNode<'_>, field: &str) -> Option<String> {
    node.field(field).map(|n| normalize(&n.text()))
}

/// Collapse whitespace runs (including newlines) to single spaces.
pub fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Kind of the nearest ancestor whose kind is in `kinds`.
pub fn nearest_kind(node: &AstNode<'_>, kinds: &[&str]) -> Option<String> {
    node.ancestors()
        .map(|a| a.kind().to_string())
        .find(|k| kinds.contains(&k.as_str()))
}

/// Text of the first descendant (pre-order) with the given kind.
pub fn first_descendant_text(node: &AstNode<'_>, kind: &str) -> Option<String> {
    for child in node.children() {
        if child.kind().as_ref() == kind {
            return Some(child.text().to_string());
        }
        if let Some(found) = first_descendant_text(&child, kind) {
            return Some(found);
        }
    }
    None
}

/// First node of kind `ERROR` in pre-order.
pub fn first_error(node: &AstNode<'_>) -> Option<u32> {
    if node.kind().as_ref() == "ERROR" {
        return Some(line_of(node.start_pos().line()));
    }
    node.children().find_map(|c| first_error(&c))
}

/// Signature: everything before the first `{` or `;`, whitespace-normalized.
pub fn signature(node: &AstNode<'_>) -> String {
    let text = node.text();
    let end = text.find(['{', ';']).unwrap_or(text.len());
    normalize(text[..end].trim())
}

/// Text hashed for body changes: the `body` (or `value`) field when the
/// grammar exposes one, otherwise the whole node.
pub fn body_text(node: &AstNode<'_>) -> String {
    node.field("body")
        .or_else(|| node.field("value"))
        .map_or_else(|| node.text().to_string(), |b| b.text().to_string())
}

/// 0-based tree-sitter row to 1-based line.
#[allow(clippy::cast_possible_truncation)]
pub const fn line_of(row: usize) -> u32 {
    row as u32 + 1
}
