//! Static tables describing the Lun grammar.
//!
//! [`LANGUAGE_INFO`] is built entirely from constants that the build script
//! derives from `src/grammar.json`, so it exists before `main` runs and is
//! never initialized, locked or mutated at runtime. It answers questions about
//! the grammar without loading a parser: which node kinds and fields exist,
//! which literals are keywords.

use crate::grammar::{parse_grammar, Grammar, GrammarError};
use crate::symbols::SymbolKind;

include!(concat!(env!("OUT_DIR"), "/language_tables.rs"));

/// Tables of the Lun grammar.
pub static LANGUAGE_INFO: LanguageInfo = LanguageInfo {
    name: NAME,
    start_rule: START_RULE,
    word: WORD,
    symbols: SYMBOLS,
    fields: FIELDS,
    keywords: KEYWORDS,
    extras: EXTRAS,
    conflicts: CONFLICTS,
    grammar_json: crate::GRAMMAR_JSON,
};

/// One entry of a language's symbol table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolInfo {
    name: &'static str,
    kind: SymbolKind,
}

impl SymbolInfo {
    const fn new(name: &'static str, kind: SymbolKind) -> Self {
        Self { name, kind }
    }

    /// The node kind.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The visibility class.
    #[must_use]
    pub const fn kind(&self) -> SymbolKind {
        self.kind
    }
}

/// The symbol, field and keyword tables of a grammar plus the rule set they
/// were derived from.
///
/// Lookups mirror the `Language` API of tree-sitter's bindings, with `Option`
/// in place of sentinel ids. Symbol ids index this table, which orders node
/// kinds by name; they are not the ids of the generated parser. Field ids
/// start at 1 and follow name order.
#[derive(Debug)]
pub struct LanguageInfo {
    name: &'static str,
    start_rule: &'static str,
    word: Option<&'static str>,
    symbols: &'static [SymbolInfo],
    fields: &'static [&'static str],
    keywords: &'static [&'static str],
    extras: &'static [&'static str],
    conflicts: &'static [&'static [&'static str]],
    grammar_json: &'static str,
}

impl LanguageInfo {
    /// The grammar name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The rule that roots every syntax tree.
    #[must_use]
    pub const fn start_rule(&self) -> &'static str {
        self.start_rule
    }

    /// The rule used to recognize keywords, if the grammar declares one.
    #[must_use]
    pub const fn word(&self) -> Option<&'static str> {
        self.word
    }

    /// The number of distinct node kinds, including hidden and builtin ones.
    #[must_use]
    pub const fn node_kind_count(&self) -> usize {
        self.symbols.len()
    }

    /// The number of distinct field names.
    #[must_use]
    pub const fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// The full symbol table, indexed by symbol id.
    #[must_use]
    pub const fn symbols(&self) -> &'static [SymbolInfo] {
        self.symbols
    }

    /// Returns the node kind for a symbol id.
    #[must_use]
    pub fn node_kind_for_id(&self, id: u16) -> Option<&'static str> {
        self.symbols.get(usize::from(id)).map(SymbolInfo::name)
    }

    /// Returns the symbol id of a visible node kind.
    ///
    /// `named` selects between a named node and a literal token of the same
    /// spelling, e.g. `primitive_type` against `"bool"`.
    #[must_use]
    pub fn id_for_node_kind(&self, kind: &str, named: bool) -> Option<u16> {
        self.symbols
            .iter()
            .position(|s| s.kind.is_visible() && s.kind.is_named() == named && s.name == kind)
            .and_then(|index| u16::try_from(index).ok())
    }

    /// Returns `true` if the symbol is a named node.
    #[must_use]
    pub fn node_kind_is_named(&self, id: u16) -> bool {
        self.kind(id).is_some_and(SymbolKind::is_named)
    }

    /// Returns `true` if the symbol appears in syntax trees.
    #[must_use]
    pub fn node_kind_is_visible(&self, id: u16) -> bool {
        self.kind(id).is_some_and(SymbolKind::is_visible)
    }

    /// Returns the field name for a field id. Field ids start at 1.
    #[must_use]
    pub fn field_name_for_id(&self, id: u16) -> Option<&'static str> {
        let index = usize::from(id).checked_sub(1)?;
        self.fields.get(index).copied()
    }

    /// Returns the field id for a field name.
    #[must_use]
    pub fn field_id_for_name(&self, name: &str) -> Option<u16> {
        let index = self.fields.binary_search(&name).ok()?;
        u16::try_from(index + 1).ok()
    }

    /// All field names, sorted; field id `n` names `field_names()[n - 1]`.
    #[must_use]
    pub const fn field_names(&self) -> &'static [&'static str] {
        self.fields
    }

    /// Literal tokens lexed through the word rule, sorted.
    #[must_use]
    pub const fn keywords(&self) -> &'static [&'static str] {
        self.keywords
    }

    /// Returns `true` if `text` is a keyword of this language.
    #[must_use]
    pub fn is_keyword(&self, text: &str) -> bool {
        self.keywords.binary_search(&text).is_ok()
    }

    /// Node kinds that may appear between any two tokens, such as `comment`.
    #[must_use]
    pub const fn extras(&self) -> &'static [&'static str] {
        self.extras
    }

    /// Rule groups whose conflicts the grammar resolves at parse time.
    #[must_use]
    pub const fn conflicts(&self) -> &'static [&'static [&'static str]] {
        self.conflicts
    }

    /// The grammar this language was compiled from, in tree-sitter JSON form.
    #[must_use]
    pub const fn grammar_json(&self) -> &'static str {
        self.grammar_json
    }

    /// Parses [`LanguageInfo::grammar_json`] into an owned [`Grammar`].
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::JsonParse`] if the embedded JSON does not
    /// deserialize. The build script parses the same text, so this only fails
    /// if the two disagree.
    pub fn grammar(&self) -> Result<Grammar, GrammarError> {
        parse_grammar(self.grammar_json)
    }

    fn kind(&self, id: u16) -> Option<SymbolKind> {
        self.symbols.get(usize::from(id)).map(SymbolInfo::kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::SymbolTable;

    #[test]
    fn test_table_sizes() {
        assert_eq!(LANGUAGE_INFO.name(), "lun");
        assert_eq!(LANGUAGE_INFO.node_kind_count(), 108);
        assert_eq!(LANGUAGE_INFO.field_count(), 23);
        assert_eq!(LANGUAGE_INFO.keywords().len(), 35);
    }

    #[test]
    fn test_node_kind_lookups() {
        assert_eq!(LANGUAGE_INFO.node_kind_for_id(0), Some("end"));
        assert!(!LANGUAGE_INFO.node_kind_is_visible(0));

        let binary = LANGUAGE_INFO.id_for_node_kind("binary_expr", true).unwrap();
        assert_eq!(LANGUAGE_INFO.node_kind_for_id(binary), Some("binary_expr"));
        assert!(LANGUAGE_INFO.node_kind_is_named(binary));

        let while_kw = LANGUAGE_INFO.id_for_node_kind("while", false).unwrap();
        assert!(LANGUAGE_INFO.node_kind_is_visible(while_kw));
        assert!(!LANGUAGE_INFO.node_kind_is_named(while_kw));

        assert_eq!(LANGUAGE_INFO.id_for_node_kind("while", true), None);
        assert_eq!(LANGUAGE_INFO.id_for_node_kind("_expression", true), None);
        assert_eq!(LANGUAGE_INFO.node_kind_for_id(u16::MAX), None);
    }

    #[test]
    fn test_aliases_and_unreachable_rules() {
        assert!(LANGUAGE_INFO.id_for_node_kind("string_content", true).is_some());
        assert!(LANGUAGE_INFO.id_for_node_kind("fundef_expr", true).is_none());
        assert!(LANGUAGE_INFO.id_for_node_kind("fun", false).is_none());
        assert!(LANGUAGE_INFO
            .symbols()
            .iter()
            .any(|s| s.name() == "_expression" && s.kind() == SymbolKind::Hidden));
    }

    #[test]
    fn test_field_lookups() {
        assert_eq!(LANGUAGE_INFO.field_name_for_id(0), None);
        assert_eq!(LANGUAGE_INFO.field_name_for_id(1), Some("args"));
        assert_eq!(LANGUAGE_INFO.field_id_for_name("var"), Some(23));

        let lhs = LANGUAGE_INFO.field_id_for_name("lhs").unwrap();
        assert_eq!(LANGUAGE_INFO.field_name_for_id(lhs), Some("lhs"));
        assert_eq!(LANGUAGE_INFO.field_id_for_name("nope"), None);
    }

    #[test]
    fn test_keywords_and_extras() {
        for kw in ["while", "loop", "orb", "isz", "null", "in"] {
            assert!(LANGUAGE_INFO.is_keyword(kw), "{kw} should be a keyword");
        }
        assert!(!LANGUAGE_INFO.is_keyword("::"));
        assert!(!LANGUAGE_INFO.is_keyword("fun"));
        assert_eq!(LANGUAGE_INFO.extras(), ["comment"]);
        assert_eq!(LANGUAGE_INFO.word(), Some("identifier"));
        assert_eq!(LANGUAGE_INFO.conflicts(), [["_expression", "_statement"].as_slice()]);
    }

    #[test]
    fn test_embedded_grammar_matches_tables() {
        let grammar = LANGUAGE_INFO.grammar().unwrap();
        assert_eq!(grammar.name, LANGUAGE_INFO.name());

        let table = SymbolTable::from_grammar(&grammar, LANGUAGE_INFO.start_rule());
        let derived: Vec<(&str, SymbolKind)> = table
            .symbols()
            .iter()
            .map(|s| (s.name.as_str(), s.kind))
            .collect();
        let baked: Vec<(&str, SymbolKind)> = LANGUAGE_INFO
            .symbols()
            .iter()
            .map(|s| (s.name(), s.kind()))
            .collect();
        assert_eq!(derived, baked);
        assert_eq!(table.fields(), LANGUAGE_INFO.field_names());
        assert_eq!(table.keywords(), LANGUAGE_INFO.keywords());
    }
}
