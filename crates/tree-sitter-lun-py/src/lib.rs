//! Python bindings for the Lun grammar.
//!
//! The extension module is `tree_sitter_lun._tree_sitter_lun`. `language()`
//! wraps the generated parser's `TSLanguage` in the capsule that
//! `tree_sitter.Language` accepts; the other functions read the grammar tables.
#![allow(unsafe_code)]

use pyo3::ffi;
use pyo3::prelude::*;
use std::ffi::CStr;
use tree_sitter_lun::{HIGHLIGHTS_QUERY, LANGUAGE, LANGUAGE_INFO};

/// The capsule name `tree_sitter.Language` checks for.
const CAPSULE_NAME: &CStr = c"tree_sitter.Language";

/// Returns the Lun language as a `tree_sitter.Language` capsule.
#[pyfunction]
fn language(py: Python<'_>) -> PyResult<Bound<'_, PyAny>> {
    // SAFETY: the generated entry point returns a pointer to a static
    // `TSLanguage`, which outlives the capsule and needs no destructor.
    unsafe {
        let raw = (LANGUAGE.into_raw())();
        let capsule = ffi::PyCapsule_New(raw.cast_mut().cast(), CAPSULE_NAME.as_ptr(), None);
        Bound::from_owned_ptr_or_err(py, capsule)
    }
}

/// Returns the grammar name.
#[pyfunction]
fn name() -> &'static str {
    LANGUAGE_INFO.name()
}

/// Returns all node kinds that appear in syntax trees, named ones first.
#[pyfunction]
fn node_kinds() -> Vec<&'static str> {
    let visible = || LANGUAGE_INFO.symbols().iter().filter(|s| s.kind().is_visible());
    visible()
        .filter(|s| s.kind().is_named())
        .chain(visible().filter(|s| !s.kind().is_named()))
        .map(|s| s.name())
        .collect()
}

/// Returns all field names, sorted.
#[pyfunction]
fn field_names() -> Vec<&'static str> {
    LANGUAGE_INFO.field_names().to_vec()
}

/// Returns the keywords of the language.
#[pyfunction]
fn keywords() -> Vec<&'static str> {
    LANGUAGE_INFO.keywords().to_vec()
}

#[pymodule]
fn _tree_sitter_lun(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(language, m)?)?;
    m.add_function(wrap_pyfunction!(name, m)?)?;
    m.add_function(wrap_pyfunction!(node_kinds, m)?)?;
    m.add_function(wrap_pyfunction!(field_names, m)?)?;
    m.add_function(wrap_pyfunction!(keywords, m)?)?;
    m.add("HIGHLIGHTS_QUERY", HIGHLIGHTS_QUERY)?;
    Ok(())
}
