//! Rust grammar: items, impl/trait/mod scopes.
//!
//! Inherent impls scope their items under the bare type name (`Foo::new`);
//! trait impls use the qualified form (`<Foo as Display>::fmt`) so the same
//! method name under different traits stays unique.

use thoth_core::enums::SymbolKind;

use super::Def;
use super::helpers::{AstNode, field_text, nearest_kind};

const SCOPES: &[&str] = &["impl_item", "trait_item", "function_item", "mod_item"];

pub(super) fn classify(node: &AstNode<'_>) -> Option<Def> {
    let kind = match node.kind().as_ref() {
        "function_item" => {
            match nearest_kind(node, SCOPES).as_deref() {
                Some("impl_item" | "trait_item") => SymbolKind::Method,
                _ => SymbolKind::Function,
            }
        }
        "function_signature_item" => SymbolKind::Method,
        "struct_item" => SymbolKind::Struct,
        "enum_item" => SymbolKind::Enum,
        "union_item" => SymbolKind::Union,
        "trait_item" => SymbolKind::Trait,
        "type_item" => SymbolKind::TypeAlias,
        "const_item" => SymbolKind::Const,
        "static_item" => SymbolKind::Static,
        "macro_definition" => SymbolKind::Macro,
        "mod_item" => SymbolKind::Module,
        _ => return None,
    };
    Some(Def::new(kind, field_text(node, "name")?))
}

pub(super) fn container(node: &AstNode<'_>) -> Option<String> {
    match node.kind().as_ref() {
        "impl_item" => {
            let ty = field_text(node, "type")?;
            match field_text(node, "trait") {
                Some(tr) => Some(format!("<{ty} as {tr}>")),
                None => Some(ty.split('<').next().unwrap_or(&ty).trim().to_string()),
            }
        }
        "trait_item" | "mod_item" | "function_item" => field_text(node, "name"),
        _ => None,
    }
}
