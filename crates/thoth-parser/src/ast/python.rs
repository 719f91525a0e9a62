//! Python grammar: classes and (nested) functions.

use thoth_core::enums::SymbolKind;

use super::Def;
use super::helpers::{AstNode, field_text, nearest_kind};

pub(super) fn classify(node: &AstNode<'_>) -> Option<Def> {
    let kind = match node.kind().as_ref() {
        "function_definition" => {
            match nearest_kind(node, &["class_definition", "function_definition"]).as_deref() {
                Some("class_definition") => SymbolKind::Method,
                _ => SymbolKind::Function,
            }
        }
        "class_definition" => SymbolKind::Class,
        _ => return None,
    };
    Some(Def::new(kind, field_text(node, "name")?))
}

pub(super) fn container(node: &AstNode<'_>) -> Option<String> {
    match node.kind().as_ref() {
        "class_definition" | "function_definition" => field_text(node, "name"),
        _ => None,
    }
}

/// Definition line(s) before the body: `def name(params) -> T` or `class Name(bases)`.
pub(super) fn signature(node: &AstNode<'_>) -> String {
    let name = field_text(node, "name").unwrap_or_default();
    let prefix = if node.kind().as_ref() == "class_definition" {
        "class"
    } else if node.text().starts_with("async ") {
        "async def"
    } else {
        "def"
    };

    let mut sig = format!("{prefix} {name}");
    if let Some(params) = field_text(node, "parameters") {
        sig.push_str(&params);
    } else if let Some(bases) = field_text(node, "superclasses") {
        sig.push_str(&bases);
    }
    if let Some(ret) = field_text(node, "return_type") {
        sig.push_str(" -> ");
        sig.push_str(&ret);
    }
    sig
}
