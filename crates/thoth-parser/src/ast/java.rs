//! Java grammar: type declarations and methods.
//!
//! Methods and constructors carry their parameter types in the FQN so
//! overloads resolve to distinct symbols: `com.acme.Repo.save(User,boolean)`.

use thoth_core::enums::SymbolKind;

use super::Def;
use super::helpers::{AstNode, field_text, normalize};

pub(super) fn classify(node: &AstNode<'_>) -> Option<Def> {
    let kind = match node.kind().as_ref() {
        "class_declaration" | "record_declaration" => SymbolKind::Class,
        "interface_declaration" | "annotation_type_declaration" => SymbolKind::Interface,
        "enum_declaration" => SymbolKind::Enum,
        "method_declaration" | "constructor_declaration" => {
            return Some(Def {
                disambiguator: Some(parameter_types(node)),
                ..Def::new(SymbolKind::Method, field_text(node, "name")?)
            });
        }
        _ => return None,
    };
    Some(Def::new(kind, field_text(node, "name")?))
}

pub(super) fn container(node: &AstNode<'_>) -> Option<String> {
    match node.kind().as_ref() {
        "class_declaration"
        | "record_declaration"
        | "interface_declaration"
        | "annotation_type_declaration"
        | "enum_declaration" => field_text(node, "name"),
        _ => None,
    }
}

/// `package a.b.c;` of the compilation unit.
pub(super) fn package(root: &AstNode<'_>) -> Option<String> {
    let decl = root
        .children()
        .find(|c| c.kind().as_ref() == "package_declaration")?;
    let text = decl.text();
    let name = text
        .trim()
        .trim_start_matches("package")
        .trim_end_matches(';')
        .trim();
    (!name.is_empty()).then(|| normalize(name))
}

fn parameter_types(node: &AstNode<'_>) -> String {
    let Some(params) = node.field("parameters") else {
        return "()".to_string();
    };
    let types: Vec<String> = params
        .children()
        .filter_map(|p| match p.kind().as_ref() {
            "formal_parameter" => field_text(&p, "type"),
            "spread_parameter" => p
                .children()
                .find(|c| c.is_named() && c.kind().as_ref() != "variable_declarator")
                .map(|t| format!("{}...", normalize(&t.text()))),
            _ => None,
        })
        .collect();
    format!("({})", types.join(","))
}
