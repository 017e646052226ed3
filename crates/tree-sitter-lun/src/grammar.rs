//! The tree-sitter JSON grammar format.
//!
//! `src/grammar.json` is what `tree-sitter generate` reads; this module gives it
//! a typed shape so the rest of the crate can walk the rule graph. The build
//! script compiles this file too, and derives the symbol tables behind
//! [`crate::LANGUAGE_INFO`] from it before handing the same JSON to the parser
//! generator.

use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

/// A grammar as serialized in `grammar.json`.
///
/// See <https://tree-sitter.github.io/tree-sitter/assets/schemas/grammar.schema.json>
#[derive(Debug, Clone, Deserialize)]
pub struct Grammar {
    /// Editor hint pointing at the JSON schema.
    #[serde(rename = "$schema", default)]
    pub schema: Option<String>,

    /// The language name; the parser entry point is `tree_sitter_<name>`.
    pub name: String,

    /// Base grammar this one extends.
    #[serde(default)]
    pub inherits: Option<String>,

    /// Rule definitions by name.
    pub rules: HashMap<String, Rule>,

    /// Tokens allowed between any two tokens, e.g. whitespace and `comment`.
    #[serde(default)]
    pub extras: Option<Vec<Rule>>,

    /// Tokens produced by an external scanner.
    #[serde(default)]
    pub externals: Option<Vec<Rule>>,

    /// Rules that never produce a node of their own.
    #[serde(default)]
    pub inline: Option<Vec<String>>,

    /// Named precedence orderings.
    #[serde(default)]
    pub precedences: Option<Vec<Vec<Precedence>>>,

    /// Rule groups whose LR conflicts are resolved at parse time.
    #[serde(default)]
    pub conflicts: Option<Vec<Vec<String>>>,

    /// Reserved word sets by context name.
    #[serde(default)]
    pub reserved: Option<HashMap<String, Vec<Rule>>>,

    /// The identifier-like rule that keywords are lexed through.
    #[serde(default)]
    pub word: Option<String>,

    /// Hidden rules exposed as abstract node types.
    #[serde(default)]
    pub supertypes: Option<Vec<String>>,
}

/// One entry of a `precedences` ordering.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum Precedence {
    /// A named precedence level, written as a string in `grammar.js`.
    #[serde(rename = "STRING")]
    String {
        /// The level name.
        value: String,
    },

    /// A rule whose productions take their place in the ordering.
    #[serde(rename = "SYMBOL")]
    Symbol {
        /// The rule name.
        name: String,
    },
}

/// A node of the rule graph.
///
/// Which optional fields are set depends on [`Rule::rule_type`]: `SEQ` and
/// `CHOICE` carry `members`, wrappers carry `content`, terminals and
/// precedences carry `value`.
#[derive(Debug, Clone, Deserialize)]
pub struct Rule {
    /// The `type` tag.
    #[serde(rename = "type")]
    pub rule_type: RuleType,

    /// Literal, pattern, alias target or precedence level.
    #[serde(default)]
    pub value: Option<RuleValue>,

    /// Referenced rule (`SYMBOL`) or field name (`FIELD`).
    #[serde(default)]
    pub name: Option<String>,

    /// The wrapped rule.
    #[serde(default)]
    pub content: Option<Box<Rule>>,

    /// Operands of `SEQ` and `CHOICE`.
    #[serde(default)]
    pub members: Vec<Rule>,

    /// Whether an `ALIAS` produces a named node.
    #[serde(default)]
    pub named: Option<bool>,

    /// Regex flags of a `PATTERN`.
    #[serde(default)]
    pub flags: Option<String>,

    /// Reserved word set of a `RESERVED` wrapper.
    #[serde(default)]
    pub context_name: Option<String>,
}

/// The `value` of a rule: text for terminals and aliases, a number or a
/// level name for precedences.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
    /// Literal text, a pattern, an alias target or a named precedence.
    String(String),

    /// A numeric precedence.
    Integer(i32),
}

/// The `type` tag of a [`Rule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleType {
    /// Matches the empty string.
    Blank,
    /// A literal; reachable literals become anonymous nodes.
    String,
    /// A regular expression.
    Pattern,
    /// A reference to a rule.
    Symbol,
    /// Alternatives.
    Choice,
    /// A sequence.
    Seq,
    /// Zero or more.
    Repeat,
    /// One or more.
    Repeat1,
    /// Precedence without associativity.
    Prec,
    /// Left-associative precedence.
    PrecLeft,
    /// Right-associative precedence.
    PrecRight,
    /// Precedence applied when resolving conflicts at parse time.
    PrecDynamic,
    /// Labels a child position.
    Field,
    /// Renames the node its content produces.
    Alias,
    /// Lexes its content as one token.
    Token,
    /// A token with no extras allowed before it.
    ImmediateToken,
    /// Switches the reserved word set.
    Reserved,
}

/// Parses `grammar.json` text.
///
/// # Errors
///
/// Returns [`GrammarError::JsonParse`] if the text is not JSON or does not
/// have the shape of a grammar.
pub fn parse_grammar(json: &str) -> Result<Grammar, GrammarError> {
    serde_json::from_str(json).map_err(|e| GrammarError::JsonParse(e.to_string()))
}

/// Errors from reading or checking a grammar.
#[derive(Debug, Error)]
pub enum GrammarError {
    /// The text is not a grammar.
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// The grammar is well formed but refers to rules that do not exist.
    #[error("validation error: {0}")]
    Validation(String),
}

impl Grammar {
    /// Returns the definition of the rule called `name`.
    #[must_use]
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name)
    }

    /// Returns the extras, or an empty slice when the grammar declares none.
    #[must_use]
    pub fn extras(&self) -> &[Rule] {
        self.extras.as_deref().unwrap_or_default()
    }

    /// Returns the declared conflict groups.
    #[must_use]
    pub fn conflicts(&self) -> &[Vec<String>] {
        self.conflicts.as_deref().unwrap_or_default()
    }

    /// Returns every rule name, sorted.
    ///
    /// `rules` is a hash map, so this is the order to use wherever the result
    /// has to be reproducible.
    #[must_use]
    pub fn rule_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Rule {
    /// The `type` tag as spelled in JSON.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self.rule_type {
            RuleType::Blank => "BLANK",
            RuleType::String => "STRING",
            RuleType::Pattern => "PATTERN",
            RuleType::Symbol => "SYMBOL",
            RuleType::Choice => "CHOICE",
            RuleType::Seq => "SEQ",
            RuleType::Repeat => "REPEAT",
            RuleType::Repeat1 => "REPEAT1",
            RuleType::Prec => "PREC",
            RuleType::PrecLeft => "PREC_LEFT",
            RuleType::PrecRight => "PREC_RIGHT",
            RuleType::PrecDynamic => "PREC_DYNAMIC",
            RuleType::Field => "FIELD",
            RuleType::Alias => "ALIAS",
            RuleType::Token => "TOKEN",
            RuleType::ImmediateToken => "IMMEDIATE_TOKEN",
            RuleType::Reserved => "RESERVED",
        }
    }

    /// Returns the direct sub-rules: `members` first, then `content`.
    pub fn children(&self) -> impl Iterator<Item = &Rule> {
        self.members.iter().chain(self.content.as_deref())
    }

    /// Returns `true` if this rule represents a terminal (lexical) token.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self.rule_type, RuleType::String | RuleType::Pattern)
    }

    /// Returns `true` if this rule wraps its content into a single token.
    #[must_use]
    pub fn is_token(&self) -> bool {
        matches!(self.rule_type, RuleType::Token | RuleType::ImmediateToken)
    }

    /// Returns `true` if this rule is a precedence wrapper.
    #[must_use]
    pub fn is_precedence(&self) -> bool {
        matches!(
            self.rule_type,
            RuleType::Prec | RuleType::PrecLeft | RuleType::PrecRight | RuleType::PrecDynamic
        )
    }

    /// Returns `true` if this rule is a symbol reference.
    #[must_use]
    pub fn is_symbol(&self) -> bool {
        matches!(self.rule_type, RuleType::Symbol)
    }

    /// Returns the referenced symbol name, if applicable.
    #[must_use]
    pub fn symbol_name(&self) -> Option<&str> {
        if self.is_symbol() {
            self.name.as_deref()
        } else {
            None
        }
    }

    /// Returns the field name if this is a `FIELD` rule.
    #[must_use]
    pub fn field_name(&self) -> Option<&str> {
        if matches!(self.rule_type, RuleType::Field) {
            self.name.as_deref()
        } else {
            None
        }
    }

    /// Returns the alias target and whether it is named, if this is an `ALIAS` rule.
    #[must_use]
    pub fn alias(&self) -> Option<(&str, bool)> {
        if !matches!(self.rule_type, RuleType::Alias) {
            return None;
        }
        match &self.value {
            Some(RuleValue::String(value)) => Some((value.as_str(), self.named.unwrap_or(false))),
            _ => None,
        }
    }

    /// Returns the numeric precedence value if this rule is a precedence wrapper.
    #[must_use]
    pub fn precedence(&self) -> Option<i32> {
        if !self.is_precedence() {
            return None;
        }
        self.value.as_ref().and_then(|v| match v {
            RuleValue::Integer(i) => Some(*i),
            RuleValue::String(_) => None,
        })
    }

    /// Returns the literal string value if this is a `STRING` rule.
    #[must_use]
    pub fn string_value(&self) -> Option<&str> {
        if matches!(self.rule_type, RuleType::String) {
            self.text_value()
        } else {
            None
        }
    }

    /// Returns the pattern source if this is a `PATTERN` rule.
    #[must_use]
    pub fn pattern_value(&self) -> Option<&str> {
        if matches!(self.rule_type, RuleType::Pattern) {
            self.text_value()
        } else {
            None
        }
    }

    /// Strips precedence wrappers and returns the first rule that is not one.
    #[must_use]
    pub fn without_precedence(&self) -> &Rule {
        let mut rule = self;
        while rule.is_precedence() {
            match rule.content.as_deref() {
                Some(content) => rule = content,
                None => break,
            }
        }
        rule
    }

    fn text_value(&self) -> Option<&str> {
        self.value.as_ref().and_then(|v| match v {
            RuleValue::String(s) => Some(s.as_str()),
            RuleValue::Integer(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_grammar() {
        let json = r#"{
            "name": "test",
            "rules": {
                "source_file": {
                    "type": "SYMBOL",
                    "name": "expression"
                },
                "expression": {
                    "type": "CHOICE",
                    "members": [
                        {
                            "type": "STRING",
                            "value": "hello"
                        },
                        {
                            "type": "PATTERN",
                            "value": "[0-9]+"
                        }
                    ]
                }
            }
        }"#;

        let grammar = parse_grammar(json).unwrap();
        assert_eq!(grammar.name, "test");
        assert_eq!(grammar.rule_names(), vec!["expression", "source_file"]);
        assert!(grammar.extras().is_empty());

        let expression = grammar.rule("expression").unwrap();
        let values: Vec<_> = expression
            .children()
            .map(|r| (r.string_value(), r.pattern_value()))
            .collect();
        assert_eq!(values, vec![(Some("hello"), None), (None, Some("[0-9]+"))]);
    }

    #[test]
    fn test_parse_precedence() {
        let json = r#"{
            "name": "test",
            "rules": {
                "expr": {
                    "type": "PREC_LEFT",
                    "value": 1,
                    "content": {
                        "type": "SEQ",
                        "members": [
                            {"type": "SYMBOL", "name": "expr"},
                            {"type": "STRING", "value": "+"},
                            {"type": "SYMBOL", "name": "expr"}
                        ]
                    }
                },
                "kw": {
                    "type": "PREC",
                    "value": -1,
                    "content": {"type": "STRING", "value": "return"}
                }
            }
        }"#;

        let grammar = parse_grammar(json).unwrap();
        let expr_rule = grammar.rule("expr").unwrap();
        assert_eq!(expr_rule.precedence(), Some(1));
        assert_eq!(expr_rule.rule_type, RuleType::PrecLeft);
        assert_eq!(expr_rule.without_precedence().rule_type, RuleType::Seq);

        let kw = grammar.rule("kw").unwrap();
        assert_eq!(kw.precedence(), Some(-1));
        assert_eq!(kw.without_precedence().string_value(), Some("return"));
    }

    #[test]
    fn test_field_and_alias_accessors() {
        let json = r#"{
            "name": "test",
            "rules": {
                "string_lit": {
                    "type": "SEQ",
                    "members": [
                        {
                            "type": "FIELD",
                            "name": "tag",
                            "content": {"type": "SYMBOL", "name": "identifier"}
                        },
                        {
                            "type": "ALIAS",
                            "named": true,
                            "value": "string_content",
                            "content": {"type": "PATTERN", "value": "[^\"]+"}
                        }
                    ]
                },
                "identifier": {"type": "PATTERN", "value": "[a-z]+"}
            }
        }"#;

        let grammar = parse_grammar(json).unwrap();
        let members = &grammar.rule("string_lit").unwrap().members;
        assert_eq!(members[0].field_name(), Some("tag"));
        assert_eq!(members[0].alias(), None);
        assert_eq!(members[1].alias(), Some(("string_content", true)));
        assert_eq!(members[1].type_name(), "ALIAS");
    }

    #[test]
    fn test_value_accepts_text_and_numbers() {
        let json = r#"{
            "name": "test",
            "rules": {
                "colon": {"type": "STRING", "value": ":"},
                "low": {"type": "PREC", "value": -1, "content": {"type": "BLANK"}},
                "named": {"type": "PREC", "value": "call", "content": {"type": "BLANK"}}
            },
            "precedences": [[
                {"type": "STRING", "value": "call"},
                {"type": "SYMBOL", "name": "colon"}
            ]]
        }"#;

        let grammar = parse_grammar(json).unwrap();
        assert_eq!(grammar.rule("colon").unwrap().value, Some(RuleValue::String(":".into())));
        assert_eq!(grammar.rule("low").unwrap().value, Some(RuleValue::Integer(-1)));
        assert_eq!(grammar.rule("named").unwrap().precedence(), None);
        assert_eq!(
            grammar.precedences.unwrap()[0],
            vec![
                Precedence::String { value: "call".into() },
                Precedence::Symbol { name: "colon".into() },
            ]
        );
    }

    #[test]
    fn test_parse_bundled_grammar() {
        let grammar = parse_grammar(include_str!("grammar.json")).unwrap();
        assert_eq!(grammar.name, "lun");
        assert_eq!(grammar.rules.len(), 41);
        assert_eq!(grammar.word.as_deref(), Some("identifier"));
        assert!(grammar
            .schema
            .as_deref()
            .is_some_and(|s| s.ends_with("grammar.schema.json")));

        let extras: Vec<_> = grammar.extras().iter().map(Rule::type_name).collect();
        assert_eq!(extras, ["PATTERN", "SYMBOL"]);

        let mut_spec = grammar.rule("mut_spec").unwrap();
        assert_eq!(mut_spec.string_value(), Some("mut"));

        let returns = grammar.rule("return_expr").unwrap();
        let levels: Vec<_> = returns.children().filter_map(Rule::precedence).collect();
        assert_eq!(levels, [0, -1]);
    }

    #[test]
    fn test_invalid_json_is_a_parse_error() {
        let err = parse_grammar("{ \"name\": ").unwrap_err();
        assert!(matches!(err, GrammarError::JsonParse(_)));
        assert!(err.to_string().starts_with("JSON parse error"));
    }
}
