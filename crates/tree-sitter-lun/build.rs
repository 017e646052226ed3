//! Builds the Lun parser from `src/grammar.json`.
//!
//! The grammar is parsed and validated with the same modules the library
//! exports, so a grammar with dangling references fails the build before the
//! generator sees it. Then:
//!
//! - the symbol, field and keyword tables behind `LANGUAGE_INFO` are written to
//!   `$OUT_DIR/language_tables.rs`;
//! - `tree-sitter-generate` turns the grammar into `parser.c`, which is
//!   compiled with `cc` and provides the `tree_sitter_lun` C symbol.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::{env, fs};

#[allow(dead_code)]
#[path = "src/grammar.rs"]
mod grammar;

#[allow(dead_code)]
#[path = "src/symbols.rs"]
mod symbols;

#[allow(dead_code)]
#[path = "src/validate.rs"]
mod validate;

use grammar::Grammar;
use symbols::{SymbolKind, SymbolTable};

/// The first rule of `grammar.js`.
const START_RULE: &str = "source_file";

fn main() {
    let grammar_path = Path::new("src").join("grammar.json");
    for input in [
        grammar_path.as_path(),
        Path::new("src/grammar.rs"),
        Path::new("src/symbols.rs"),
        Path::new("src/validate.rs"),
    ] {
        println!("cargo:rerun-if-changed={}", input.display());
    }

    let json = fs::read_to_string(&grammar_path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", grammar_path.display()));
    let grammar = grammar::parse_grammar(&json)
        .unwrap_or_else(|e| panic!("{}: {e}", grammar_path.display()));
    let report = validate::validate(&grammar, START_RULE)
        .unwrap_or_else(|e| panic!("{}: invalid grammar: {e}", grammar_path.display()));

    for rule in &report.unreachable {
        println!("cargo:warning=grammar '{}': unused rule '{rule}'", grammar.name);
    }

    let out_dir = env::var("OUT_DIR").map(PathBuf::from).expect("OUT_DIR not set");

    let table = SymbolTable::from_grammar(&grammar, START_RULE);
    let source = render(&grammar, &table).expect("formatting into a String cannot fail");
    let tables_path = out_dir.join("language_tables.rs");
    fs::write(&tables_path, source)
        .unwrap_or_else(|e| panic!("failed to write {}: {e}", tables_path.display()));

    compile_parser(&json, &out_dir);
}

/// Generates `parser.c` under `$OUT_DIR/src` and compiles it.
fn compile_parser(json: &str, out_dir: &Path) {
    // ABI 15 requires a semantic version; use the crate's own.
    let version = |var: &str| -> u8 {
        env::var(var)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(|| panic!("{var} is not a valid u8"))
    };
    let semver = (
        version("CARGO_PKG_VERSION_MAJOR"),
        version("CARGO_PKG_VERSION_MINOR"),
        version("CARGO_PKG_VERSION_PATCH"),
    );
    let (name, parser_c) = tree_sitter_generate::generate_parser_for_grammar(json, Some(semver))
        .unwrap_or_else(|e| panic!("failed to generate the parser: {e}"));

    let src_dir = out_dir.join("src");
    let header_dir = src_dir.join("tree_sitter");
    fs::create_dir_all(&header_dir)
        .unwrap_or_else(|e| panic!("failed to create {}: {e}", header_dir.display()));
    fs::write(header_dir.join("parser.h"), tree_sitter::PARSER_HEADER)
        .unwrap_or_else(|e| panic!("failed to write parser.h: {e}"));

    let parser_path = src_dir.join("parser.c");
    fs::write(&parser_path, parser_c)
        .unwrap_or_else(|e| panic!("failed to write {}: {e}", parser_path.display()));

    let mut c_config = cc::Build::new();
    c_config
        .std("c11")
        .include(&src_dir)
        .warnings(false)
        .file(&parser_path);
    c_config.compile(&format!("tree-sitter-{name}"));
}

fn kind_path(kind: SymbolKind) -> &'static str {
    match kind {
        SymbolKind::Builtin => "SymbolKind::Builtin",
        SymbolKind::Anonymous => "SymbolKind::Anonymous",
        SymbolKind::Named => "SymbolKind::Named",
        SymbolKind::Hidden => "SymbolKind::Hidden",
    }
}

fn render(grammar: &Grammar, table: &SymbolTable) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    writeln!(out, "// Generated by build.rs from src/grammar.json. Do not edit.")?;
    writeln!(out)?;
    writeln!(out, "const NAME: &str = {:?};", grammar.name)?;
    writeln!(out, "const START_RULE: &str = {START_RULE:?};")?;
    writeln!(out, "const WORD: Option<&str> = {:?};", grammar.word.as_deref())?;
    writeln!(out)?;

    writeln!(out, "const SYMBOLS: &[SymbolInfo] = &[")?;
    for symbol in table.symbols() {
        writeln!(
            out,
            "    SymbolInfo::new({:?}, {}),",
            symbol.name,
            kind_path(symbol.kind)
        )?;
    }
    writeln!(out, "];")?;
    writeln!(out)?;

    write_str_slice(&mut out, "FIELDS", table.fields())?;
    write_str_slice(&mut out, "KEYWORDS", table.keywords())?;

    let extras: Vec<&str> = grammar.extras().iter().filter_map(|r| r.symbol_name()).collect();
    write_str_slice(&mut out, "EXTRAS", &extras)?;

    writeln!(out, "const CONFLICTS: &[&[&str]] = &[")?;
    for group in grammar.conflicts() {
        writeln!(out, "    &{group:?},")?;
    }
    writeln!(out, "];")?;

    Ok(out)
}

fn write_str_slice<S: AsRef<str>>(
    out: &mut String,
    name: &str,
    values: &[S],
) -> std::fmt::Result {
    writeln!(out, "const {name}: &[&str] = &[")?;
    for value in values {
        writeln!(out, "    {:?},", value.as_ref())?;
    }
    writeln!(out, "];")?;
    writeln!(out)
}
