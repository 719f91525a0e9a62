//! TypeScript, TSX and JavaScript grammar.
//!
//! `const f = () => {}` style declarations count as functions only at
//! module or namespace level; locals inside function bodies are skipped.

use thoth_core::enums::SymbolKind;

use super::Def;
use super::helpers::{AstNode, field_text, nearest_kind};

const FUNCTION_LIKE: &[&str] = &[
    "function_declaration",
    "generator_function_declaration",
    "function_expression",
    "function",
    "arrow_function",
    "method_definition",
];

const FUNCTION_VALUES: &[&str] = &[
    "arrow_function",
    "function_expression",
    "function",
    "generator_function",
];

pub(super) fn classify(node: &AstNode<'_>) -> Option<Def> {
    let kind = match node.kind().as_ref() {
        "function_declaration" | "generator_function_declaration" => SymbolKind::Function,
        "class_declaration" | "abstract_class_declaration" => SymbolKind::Class,
        "method_definition" => SymbolKind::Method,
        "method_signature" | "abstract_method_signature" => {
            if nearest_kind(node, &["interface_declaration", "class_declaration", "abstract_class_declaration"]).as_deref()
                != Some("interface_declaration")
            {
                return None;
            }
            SymbolKind::Method
        }
        "interface_declaration" => SymbolKind::Interface,
        "type_alias_declaration" => SymbolKind::TypeAlias,
        "enum_declaration" => SymbolKind::Enum,
        "internal_module" | "module" => SymbolKind::Module,
        "variable_declarator" => {
            let value = node.field("value")?;
            if !FUNCTION_VALUES.contains(&value.kind().as_ref())
                || nearest_kind(node, FUNCTION_LIKE).is_some()
            {
                return None;
            }
            SymbolKind::Function
        }
        _ => return None,
    };
    Some(Def::new(kind, field_text(node, "name")?))
}

pub(super) fn container(node: &AstNode<'_>) -> Option<String> {
    match node.kind().as_ref() {
        "class_declaration"
        | "abstract_class_declaration"
        | "interface_declaration"
        | "internal_module"
        | "module"
        | "function_declaration"
        | "generator_function_declaration"
        | "method_definition" => field_text(node, "name"),
        _ => None,
    }
}
