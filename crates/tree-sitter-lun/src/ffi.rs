//! The generated parser's C entry point.
#![allow(unsafe_code)]

use tree_sitter_language::LanguageFn;

unsafe extern "C" {
    fn tree_sitter_lun() -> *const ();
}

/// The tree-sitter [`LanguageFn`] for Lun.
///
/// Calling it returns a pointer to the `TSLanguage` that the generated
/// `parser.c` defines as a `static`: never null, the same address on every
/// call, never freed. It is the function declared in
/// `bindings/c/tree-sitter-lun.h`.
///
/// ```
/// let language = tree_sitter_lun::LANGUAGE;
/// let mut parser = tree_sitter::Parser::new();
/// parser.set_language(&language.into()).expect("Error loading Lun grammar");
/// ```
pub const LANGUAGE: LanguageFn = unsafe { LanguageFn::from_raw(tree_sitter_lun) };
