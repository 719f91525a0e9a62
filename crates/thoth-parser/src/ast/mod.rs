//! ast-grep backed parse capability.
//!
//! Each grammar is a small table of functions: which node kinds declare
//! symbols, which nodes open a scope, and how signatures are cut. The tree
//! walk, scope resolution and query handling are shared.

mod ecma;
mod go;
pub(crate) mod helpers;
mod java;
mod python;
mod rust;

use std::collections::BTreeMap;

use ast_grep_core::tree_sitter::StrDoc;
use ast_grep_core::{AstGrep, Pattern};
use ast_grep_language::{LanguageExt, SupportLang};
use thoth_core::enums::SymbolKind;

use crate::error::ParserError;
use crate::hash::canonical_hash;
use crate::language::{
    Capture, FqnTemplate, GO, JAVA, JAVASCRIPT, ModuleStyle, PYTHON, ParseCapability, RUST, TSX,
    TYPESCRIPT, SyntaxTree,
};
use helpers::{AstNode, body_text, first_error, line_of, signature};

/// The concrete AST tree type produced by ast-grep.
pub type AstTree = AstGrep<StrDoc<SupportLang>>;

/// A declaration recognized by a grammar.
#[derive(Debug, Clone)]
pub(crate) struct Def {
    kind: SymbolKind,
    name: String,
    disambiguator: Option<String>,
    /// Scope contributed by the declaration itself (Go method receivers).
    receiver: Option<String>,
}

impl Def {
    const fn new(kind: SymbolKind, name: String) -> Self {
        Self {
            kind,
            name,
            disambiguator: None,
            receiver: None,
        }
    }
}

struct Grammar {
    template: FqnTemplate,
    classify: fn(&AstNode<'_>) -> Option<Def>,
    container: fn(&AstNode<'_>) -> Option<String>,
    signature: fn(&AstNode<'_>) -> String,
    module: fn(&AstNode<'_>) -> Option<String>,
}

const fn no_module(_: &AstNode<'_>) -> Option<String> {
    None
}

static RUST_GRAMMAR: Grammar = Grammar {
    template: FqnTemplate {
        separator: "::",
        module: ModuleStyle::FilePath,
        index_stems: &["mod"],
        file_scoped: &[],
    },
    classify: rust::classify,
    container: rust::container,
    signature,
    module: no_module,
};

static GO_GRAMMAR: Grammar = Grammar {
    template: FqnTemplate {
        separator: ".",
        module: ModuleStyle::Directory,
        index_stems: &[],
        file_scoped: &["init"],
    },
    classify: go::classify,
    container: go::container,
    signature,
    module: no_module,
};

static PYTHON_GRAMMAR: Grammar = Grammar {
    template: FqnTemplate {
        separator: ".",
        module: ModuleStyle::FilePath,
        index_stems: &["__init__"],
        file_scoped: &[],
    },
    classify: python::classify,
    container: python::container,
    signature: python::signature,
    module: no_module,
};

static ECMA_GRAMMAR: Grammar = Grammar {
    template: FqnTemplate {
        separator: ".",
        module: ModuleStyle::FilePath,
        index_stems: &["index"],
        file_scoped: &[],
    },
    classify: ecma::classify,
    container: ecma::container,
    signature,
    module: no_module,
};

static JAVA_GRAMMAR: Grammar = Grammar {
    template: FqnTemplate {
        separator: ".",
        module: ModuleStyle::Declared,
        index_stems: &[],
        file_scoped: &[],
    },
    classify: java::classify,
    container: java::container,
    signature,
    module: java::package,
};

/// Parse capability for one ast-grep built-in language.
#[derive(Clone, Copy)]
pub struct AstGrepCapability {
    tag: &'static str,
    lang: SupportLang,
    grammar: &'static Grammar,
}

impl AstGrepCapability {
    /// Capabilities for every supported language.
    #[must_use]
    pub fn all() -> Vec<Self> {
        vec![
            Self::new(RUST, SupportLang::Rust, &RUST_GRAMMAR),
            Self::new(GO, SupportLang::Go, &GO_GRAMMAR),
            Self::new(PYTHON, SupportLang::Python, &PYTHON_GRAMMAR),
            Self::new(TYPESCRIPT, SupportLang::TypeScript, &ECMA_GRAMMAR),
            Self::new(TSX, SupportLang::Tsx, &ECMA_GRAMMAR),
            Self::new(JAVASCRIPT, SupportLang::JavaScript, &ECMA_GRAMMAR),
            Self::new(JAVA, SupportLang::Java, &JAVA_GRAMMAR),
        ]
    }

    const fn new(tag: &'static str, lang: SupportLang, grammar: &'static Grammar) -> Self {
        Self { tag, lang, grammar }
    }
}

impl ParseCapability for AstGrepCapability {
    fn lang(&self) -> &str {
        self.tag
    }

    fn template(&self) -> FqnTemplate {
        self.grammar.template
    }

    fn parse(&self, source: &str) -> Result<Box<dyn SyntaxTree>, ParserError> {
        let tree = self.lang.ast_grep(source);
        if let Some(line) = first_error(&tree.root()) {
            return Err(ParserError::ParseFailed {
                language: self.tag.to_string(),
                message: format!("syntax error at line {line}"),
            });
        }
        Ok(Box::new(AstGrepTree {
            tree,
            capability: *self,
        }))
    }
}

struct AstGrepTree {
    tree: AstTree,
    capability: AstGrepCapability,
}

impl AstGrepTree {
    fn grammar(&self) -> &'static Grammar {
        self.capability.grammar
    }

    fn collect(&self, node: &AstNode<'_>, out: &mut Vec<Capture>) {
        if let Some(def) = (self.grammar().classify)(node) {
            let body = body_text(node);
            out.push(self.capture(node, def, &body));
        }
        for child in node.children() {
            self.collect(&child, out);
        }
    }

    fn scope_of(&self, node: &AstNode<'_>) -> Vec<String> {
        let mut scope: Vec<String> = node
            .ancestors()
            .filter_map(|a| (self.grammar().container)(&a))
            .collect();
        scope.reverse();
        scope
    }

    fn capture(&self, node: &AstNode<'_>, def: Def, body: &str) -> Capture {
        let mut scope = self.scope_of(node);
        scope.extend(def.receiver);
        Capture {
            name: def.name,
            disambiguator: def.disambiguator,
            kind: def.kind,
            scope,
            start_line: line_of(node.start_pos().line()),
            end_line: line_of(node.end_pos().line()),
            signature_text: (self.grammar().signature)(node),
            body_hash: canonical_hash(body),
        }
    }

    /// Innermost declaration containing `node`, itself included.
    fn owner<'r>(&self, node: &AstNode<'r>) -> Option<(AstNode<'r>, Def)> {
        let classify = self.grammar().classify;
        if let Some(def) = classify(node) {
            return Some((node.clone(), def));
        }
        node.ancestors().find_map(|a| classify(&a).map(|def| (a, def)))
    }
}

impl SyntaxTree for AstGrepTree {
    fn declared_module(&self) -> Option<String> {
        (self.grammar().module)(&self.tree.root())
    }

    fn definitions(&self) -> Vec<Capture> {
        let mut out = Vec::new();
        self.collect(&self.tree.root(), &mut out);
        out
    }

    fn query(&self, query: &str) -> Result<Vec<Capture>, ParserError> {
        let pattern = Pattern::try_new(query, self.capability.lang).map_err(|e| {
            ParserError::InvalidQuery {
                language: self.capability.tag.to_string(),
                query: query.to_string(),
                reason: e.to_string(),
            }
        })?;

        // Matches grouped by owning declaration, keyed by its start byte.
        // Matches outside any declaration share the `None` group.
        let root = self.tree.root();
        let mut groups: BTreeMap<Option<usize>, (Option<(AstNode<'_>, Def)>, Vec<String>, u32, u32)> =
            BTreeMap::new();
        for m in root.find_all(&pattern) {
            let node: &AstNode<'_> = &m;
            let owner = self.owner(node);
            let key = owner.as_ref().map(|(n, _)| n.range().start);
            let start = line_of(node.start_pos().line());
            let end = line_of(node.end_pos().line());
            let entry = groups
                .entry(key)
                .or_insert_with(|| (owner, Vec::new(), start, end));
            entry.1.push(node.text().to_string());
            entry.2 = entry.2.min(start);
            entry.3 = entry.3.max(end);
        }

        Ok(groups
            .into_values()
            .map(|(owner, texts, start, end)| {
                let matched = texts.join("\n");
                match owner {
                    Some((node, def)) => self.capture(&node, def, &matched),
                    None => Capture {
                        name: String::new(),
                        disambiguator: None,
                        kind: SymbolKind::Module,
                        scope: Vec::new(),
                        start_line: start,
                        end_line: end,
                        signature_text: String::new(),
                        body_hash: canonical_hash(&matched),
                    },
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn capability(tag: &str) -> AstGrepCapability {
        AstGrepCapability::all()
            .into_iter()
            .find(|c| c.tag == tag)
            .unwrap()
    }

    fn names(tag: &str, source: &str) -> Vec<(String, SymbolKind, Vec<String>)> {
        capability(tag)
            .parse(source)
            .unwrap()
            .definitions()
            .into_iter()
            .map(|c| (c.name, c.kind, c.scope))
            .collect()
    }

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn rust_items_and_impl_scopes() {
        let src = r"
pub struct Wal;
impl Wal {
    pub fn flush(&self) {}
}
impl std::fmt::Display for Wal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { Ok(()) }
}
pub trait Sink {
    fn write(&mut self, buf: &[u8]);
}
mod inner {
    pub fn helper() {}
}
";
        assert_eq!(
            names(RUST, src),
            vec![
                ("Wal".to_string(), SymbolKind::Struct, s(&[])),
                ("flush".to_string(), SymbolKind::Method, s(&["Wal"])),
                (
                    "fmt".to_string(),
                    SymbolKind::Method,
                    s(&["<Wal as std::fmt::Display>"])
                ),
                ("Sink".to_string(), SymbolKind::Trait, s(&[])),
                ("write".to_string(), SymbolKind::Method, s(&["Sink"])),
                ("inner".to_string(), SymbolKind::Module, s(&[])),
                ("helper".to_string(), SymbolKind::Function, s(&["inner"])),
            ]
        );
    }

    #[test]
    fn go_methods_scope_under_receiver() {
        let src = "package wal

type Writer interface {
	Write(p []byte) (int, error)
}

type Segment struct {
	id int
}

func (s *Segment) Flush() error { return nil }

func Open(path string) (*Segment, error) { return nil, nil }
";
        assert_eq!(
            names(GO, src),
            vec![
                ("Writer".to_string(), SymbolKind::Interface, s(&[])),
                ("Write".to_string(), SymbolKind::Method, s(&["Writer"])),
                ("Segment".to_string(), SymbolKind::Struct, s(&[])),
                ("Flush".to_string(), SymbolKind::Method, s(&["Segment"])),
                ("Open".to_string(), SymbolKind::Function, s(&[])),
            ]
        );
    }

    #[test]
    fn python_methods_and_signatures() {
        let src = "class UserService:\n    def get(self, user_id: int) -> dict:\n        return {}\n\ndef main():\n    pass\n";
        let defs = capability(PYTHON).parse(src).unwrap().definitions();
        assert_eq!(defs.len(), 3);
        assert_eq!(defs[1].kind, SymbolKind::Method);
        assert_eq!(defs[1].scope, s(&["UserService"]));
        assert_eq!(defs[1].signature_text, "def get(self, user_id: int) -> dict");
        assert_eq!(defs[2].kind, SymbolKind::Function);
    }

    #[test]
    fn typescript_interfaces_and_arrow_functions() {
        let src = "export interface UserService {\n  get(id: string): User;\n}\nexport const load = (id: string) => {\n  const local = () => 1;\n  return local();\n};\nclass Repo {\n  save(u: User) {}\n}\n";
        assert_eq!(
            names(TYPESCRIPT, src),
            vec![
                ("UserService".to_string(), SymbolKind::Interface, s(&[])),
                ("get".to_string(), SymbolKind::Method, s(&["UserService"])),
                ("load".to_string(), SymbolKind::Function, s(&[])),
                ("Repo".to_string(), SymbolKind::Class, s(&[])),
                ("save".to_string(), SymbolKind::Method, s(&["Repo"])),
            ]
        );
    }

    #[test]
    fn java_overloads_are_disambiguated() {
        let src = "package com.acme;\nclass Repo {\n  void save(User u) {}\n  void save(User u, boolean flush) {}\n}\n";
        let tree = capability(JAVA).parse(src).unwrap();
        assert_eq!(tree.declared_module().as_deref(), Some("com.acme"));
        let defs = tree.definitions();
        let dis: Vec<Option<String>> = defs.iter().map(|d| d.disambiguator.clone()).collect();
        assert_eq!(
            dis,
            vec![
                None,
                Some("(User)".to_string()),
                Some("(User,boolean)".to_string()),
            ]
        );
    }

    #[test]
    fn syntax_errors_fail_the_parse() {
        let err = capability(RUST).parse("fn broken( {").err().unwrap();
        assert!(matches!(err, ParserError::ParseFailed { .. }));
    }

    #[test]
    fn signature_cut_before_body() {
        let defs = capability(RUST)
            .parse("pub fn open(path: &str,\n    mode: u32) -> Result<(), E> { todo!() }")
            .unwrap()
            .definitions();
        assert_eq!(
            defs[0].signature_text,
            "pub fn open(path: &str, mode: u32) -> Result<(), E>"
        );
    }

    #[test]
    fn query_captures_only_matching_declarations() {
        let src = "fn a() { x() }\nfn b(v: u32) { y() }\nfn c() { z() }\n";
        let tree = capability(RUST).parse(src).unwrap();
        let hits = tree.query("fn $NAME() { $$$ }").unwrap();
        let owners: Vec<&str> = hits.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(owners, vec!["a", "c"]);
        assert_eq!(hits[1].start_line, 3);
    }
}
