//! Go grammar: functions, methods (scoped by receiver type), type specs,
//! interface methods, constants.

use thoth_core::enums::SymbolKind;

use super::Def;
use super::helpers::{AstNode, field_text, first_descendant_text};

pub(super) fn classify(node: &AstNode<'_>) -> Option<Def> {
    match node.kind().as_ref() {
        "function_declaration" => Some(Def::new(SymbolKind::Function, field_text(node, "name")?)),
        "method_declaration" => {
            let name = field_text(node, "name")?;
            let receiver = node
                .field("receiver")
                .and_then(|r| first_descendant_text(&r, "type_identifier"));
            Some(Def {
                receiver,
                ..Def::new(SymbolKind::Method, name)
            })
        }
        "type_spec" => {
            let kind = match node.field("type").map(|t| t.kind().to_string()).as_deref() {
                Some("struct_type") => SymbolKind::Struct,
                Some("interface_type") => SymbolKind::Interface,
                _ => SymbolKind::TypeAlias,
            };
            Some(Def::new(kind, field_text(node, "name")?))
        }
        "type_alias" => Some(Def::new(SymbolKind::TypeAlias, field_text(node, "name")?)),
        "const_spec" => Some(Def::new(SymbolKind::Const, field_text(node, "name")?)),
        "method_elem" => Some(Def::new(SymbolKind::Method, field_text(node, "name")?)),
        _ => None,
    }
}

pub(super) fn container(node: &AstNode<'_>) -> Option<String> {
    match node.kind().as_ref() {
        "type_spec" => field_text(node, "name"),
        _ => None,
    }
}
