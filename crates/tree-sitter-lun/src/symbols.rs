//! Symbol, field and keyword tables derived from a grammar.
//!
//! A tree-sitter language identifies node kinds by a numeric symbol id and
//! child positions by a numeric field id. [`SymbolTable`] computes both tables
//! from a [`Grammar`] with deterministic ids, so the same grammar always yields
//! the same numbering. The build script runs this derivation over the bundled
//! Lun grammar and bakes the result into [`crate::LANGUAGE_INFO`].

use crate::grammar::{Grammar, Rule, RuleType};
use crate::validate::reachable_rules;
use regex::Regex;
use std::collections::BTreeSet;

/// Name of the builtin symbol that terminates every input.
pub const END_SYMBOL: &str = "end";

/// How a symbol shows up in a syntax tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SymbolKind {
    /// The builtin end-of-input symbol.
    Builtin,
    /// A literal token such as `"while"` or `"+"`.
    Anonymous,
    /// A visible, named node such as `binary_expr`.
    Named,
    /// A rule whose name starts with `_`: it never appears as a node.
    Hidden,
}

impl SymbolKind {
    /// Returns `true` for kinds that appear as nodes in a syntax tree.
    #[must_use]
    pub const fn is_visible(self) -> bool {
        matches!(self, SymbolKind::Anonymous | SymbolKind::Named)
    }

    /// Returns `true` for kinds that appear as named nodes.
    #[must_use]
    pub const fn is_named(self) -> bool {
        matches!(self, SymbolKind::Named)
    }
}

/// A derived symbol: its node kind and how it is displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// The node kind, e.g. `if_expr` or `"if"` (without quotes).
    pub name: String,
    /// The visibility class of the symbol.
    pub kind: SymbolKind,
}

impl Symbol {
    fn new(name: &str, kind: SymbolKind) -> Self {
        Self {
            name: name.to_owned(),
            kind,
        }
    }
}

/// The symbol, field and keyword tables of a grammar.
///
/// Symbol ids are indices into [`SymbolTable::symbols`]: the builtin
/// [`END_SYMBOL`] first, then anonymous tokens, named nodes and hidden rules,
/// each group sorted by name. Field ids start at 1; id 0 means "no field".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    fields: Vec<String>,
    keywords: Vec<String>,
}

#[derive(Default)]
struct Collector<'g> {
    anonymous: BTreeSet<&'g str>,
    named: BTreeSet<&'g str>,
    hidden: BTreeSet<&'g str>,
    fields: BTreeSet<&'g str>,
}

impl<'g> Collector<'g> {
    fn visit(&mut self, rule: &'g Rule, in_token: bool) {
        match rule.rule_type {
            RuleType::String => {
                if !in_token {
                    self.anonymous.extend(rule.string_value());
                }
            }
            RuleType::Token | RuleType::ImmediateToken => {
                let content = rule.content.as_deref().map(Rule::without_precedence);
                match content.and_then(Rule::string_value) {
                    Some(literal) if !in_token => {
                        self.anonymous.insert(literal);
                    }
                    _ => {
                        for child in rule.children() {
                            self.visit(child, true);
                        }
                    }
                }
            }
            RuleType::Field => {
                if !in_token {
                    self.fields.extend(rule.field_name());
                }
                for child in rule.children() {
                    self.visit(child, in_token);
                }
            }
            RuleType::Alias => {
                if let Some((value, named)) = rule.alias() {
                    if named {
                        self.named.insert(value);
                    } else {
                        self.anonymous.insert(value);
                    }
                }
                // An aliased terminal is replaced wholesale; only structure is walked.
                for child in rule.children() {
                    if !child.is_terminal() && !child.is_token() {
                        self.visit(child, in_token);
                    }
                }
            }
            _ => {
                for child in rule.children() {
                    self.visit(child, in_token);
                }
            }
        }
    }
}

impl SymbolTable {
    /// Derives the tables of `grammar`, rooted at the `start` rule.
    ///
    /// Rules that are unreachable from `start`, the extras and the word rule do
    /// not get a symbol. Literals and fields nested inside `token(...)` are part
    /// of a single lexical token and are skipped.
    #[must_use]
    pub fn from_grammar(grammar: &Grammar, start: &str) -> Self {
        let reachable = reachable_rules(grammar, start);
        let mut collector = Collector::default();

        for name in grammar.rule_names() {
            if !reachable.contains(name) {
                continue;
            }
            if name.starts_with('_') {
                collector.hidden.insert(name);
            } else {
                collector.named.insert(name);
            }
            collector.visit(&grammar.rules[name], false);
        }
        for extra in grammar.extras() {
            collector.visit(extra, false);
        }

        let keywords = match word_pattern(grammar) {
            Some(word) => collector
                .anonymous
                .iter()
                .filter(|literal| word.is_match(literal))
                .map(|literal| (*literal).to_owned())
                .collect(),
            None => Vec::new(),
        };

        let mut symbols = vec![Symbol::new(END_SYMBOL, SymbolKind::Builtin)];
        symbols.extend(
            collector
                .anonymous
                .iter()
                .map(|name| Symbol::new(name, SymbolKind::Anonymous)),
        );
        symbols.extend(collector.named.iter().map(|name| Symbol::new(name, SymbolKind::Named)));
        symbols.extend(collector.hidden.iter().map(|name| Symbol::new(name, SymbolKind::Hidden)));

        Self {
            symbols,
            fields: collector.fields.into_iter().map(str::to_owned).collect(),
            keywords,
        }
    }

    /// All symbols, indexed by symbol id.
    #[must_use]
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// All field names; the name of field id `n` is at index `n - 1`.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Literal tokens that match the word rule, sorted.
    #[must_use]
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

/// Compiles the word rule into an anchored regex, when it is a plain pattern.
fn word_pattern(grammar: &Grammar) -> Option<Regex> {
    let mut rule = grammar.rule(grammar.word.as_deref()?)?.without_precedence();
    while rule.is_token() {
        rule = rule.content.as_deref()?.without_precedence();
    }
    let pattern = rule.pattern_value()?;
    match Regex::new(&format!("^(?:{pattern})$")) {
        Ok(regex) => Some(regex),
        Err(err) => {
            tracing::warn!(grammar = %grammar.name, %err, "word pattern is not a valid regex");
            None
        }
    }
}
