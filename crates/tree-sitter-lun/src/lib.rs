//! Lun grammar for tree-sitter.
//!
//! This crate ships the Lun grammar (`grammar.js` and its serialized form
//! `src/grammar.json`). The build script generates the parser from it and
//! links it in: Rust callers load [`LANGUAGE`] into a tree-sitter `Parser`,
//! foreign hosts call the C function `tree_sitter_lun` declared in
//! `bindings/c/tree-sitter-lun.h`.
//!
//! ```
//! let mut parser = tree_sitter::Parser::new();
//! parser.set_language(&tree_sitter_lun::LANGUAGE.into()).expect("Error loading Lun grammar");
//!
//! let tree = parser.parse("answer : i32 = 40 + 2;", None).unwrap();
//! assert_eq!(tree.root_node().kind(), "source_file");
//! ```
//!
//! The grammar model is also public. [`LANGUAGE_INFO`] holds the node kinds,
//! fields and keywords derived from it at build time, and [`validate`] checks
//! any other `grammar.json` the same way the build does.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::multiple_crate_versions)]

/// Typed model of the tree-sitter JSON grammar format.
///
/// Everything else in the crate is derived from these types, including the
/// tables the build script bakes into [`LANGUAGE_INFO`].
pub mod grammar;

/// Grammar validation and consistency checking utilities.
///
/// Validation rejects grammars whose references do not resolve, and reports
/// unreachable rules without failing.
pub mod validate;

/// Symbol, field and keyword tables.
pub mod symbols;

mod ffi;
mod language;

pub use ffi::LANGUAGE;
pub use grammar::{parse_grammar, Grammar, GrammarError, Rule};
pub use language::{LanguageInfo, SymbolInfo, LANGUAGE_INFO};
pub use symbols::{SymbolKind, SymbolTable};
pub use validate::{validate, Report, ValidationError};

/// The Lun grammar in tree-sitter JSON form.
pub const GRAMMAR_JSON: &str = include_str!("grammar.json");

/// The syntax highlighting query for Lun.
pub const HIGHLIGHTS_QUERY: &str = include_str!("../queries/highlights.scm");
