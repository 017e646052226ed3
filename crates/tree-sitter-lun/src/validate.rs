//! Validation routines for tree-sitter grammars.
//!
//! This module performs structural checks over parsed [`Grammar`] definitions:
//! every symbol reference must resolve, the start rule must exist, and the
//! grammar-level declarations (`word`, `inline`, `supertypes`, `conflicts`)
//! must name real rules. Softer findings such as unreachable rules are collected
//! into a [`Report`] and logged rather than rejected.

use crate::grammar::{Grammar, GrammarError, Rule};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use thiserror::Error;

/// Represents a validation failure encountered when checking a grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// The descriptive human-readable error message.
    pub message: String,
}

impl ValidationError {
    fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl From<ValidationError> for GrammarError {
    fn from(err: ValidationError) -> Self {
        GrammarError::Validation(err.message)
    }
}

/// Non-fatal findings about a grammar that passed validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    /// Rules that cannot be reached from the start rule, the extras or the word rule.
    pub unreachable: Vec<String>,

    /// Rules whose first element may be the rule itself.
    pub left_recursive: Vec<String>,

    /// Rules that use more than one precedence level, with the levels in use.
    pub mixed_precedence: BTreeMap<String, Vec<i32>>,
}

/// Performs semantic validation of a parsed [`Grammar`].
///
/// `start` names the rule that roots every parse tree. Tree-sitter uses the
/// first rule of the grammar, which a hash map cannot recover, so callers pass
/// it explicitly.
///
/// # Errors
///
/// Returns a [`ValidationError`] if the grammar is empty, `start` is not a rule,
/// or any reference (symbol, `word`, `inline`, `supertypes`, `conflicts`) names
/// an undefined rule.
pub fn validate(grammar: &Grammar, start: &str) -> Result<Report, ValidationError> {
    if grammar.rules.is_empty() {
        return Err(ValidationError::new("grammar has no rules"));
    }
    if !grammar.rules.contains_key(start) {
        return Err(ValidationError::new(format!(
            "start rule '{start}' is not defined"
        )));
    }

    check_undefined_symbols(grammar)?;
    check_declarations(grammar)?;

    let report = Report {
        unreachable: unreachable_rules(grammar, start),
        left_recursive: left_recursive_rules(grammar),
        mixed_precedence: mixed_precedence(grammar),
    };

    for rule in &report.unreachable {
        tracing::warn!(grammar = %grammar.name, rule = %rule, "unreachable rule");
    }
    for rule in &report.left_recursive {
        tracing::debug!(grammar = %grammar.name, rule = %rule, "left-recursive rule");
    }
    for (rule, levels) in &report.mixed_precedence {
        tracing::debug!(grammar = %grammar.name, rule = %rule, ?levels, "multiple precedence levels");
    }

    Ok(report)
}

/// Returns the names of all rules reachable from `start`, the extras and the word rule.
#[must_use]
pub fn reachable_rules<'g>(grammar: &'g Grammar, start: &'g str) -> HashSet<&'g str> {
    let mut to_visit = vec![start];
    for extra in grammar.extras() {
        collect_referenced_symbols(extra, &mut to_visit);
    }
    if let Some(word) = grammar.word.as_deref() {
        to_visit.push(word);
    }

    let mut reachable = HashSet::new();
    while let Some(rule_name) = to_visit.pop() {
        if !reachable.insert(rule_name) {
            continue;
        }
        if let Some(rule) = grammar.rule(rule_name) {
            collect_referenced_symbols(rule, &mut to_visit);
        }
    }
    reachable
}

fn check_undefined_symbols(grammar: &Grammar) -> Result<(), ValidationError> {
    for rule_name in grammar.rule_names() {
        check_rule_symbols(&grammar.rules[rule_name], grammar, rule_name)?;
    }
    for extra in grammar.extras() {
        check_rule_symbols(extra, grammar, "extras")?;
    }
    Ok(())
}

fn check_rule_symbols(rule: &Rule, grammar: &Grammar, context: &str) -> Result<(), ValidationError> {
    if let Some(name) = rule.symbol_name() {
        if !grammar.rules.contains_key(name) {
            return Err(ValidationError::new(format!(
                "undefined symbol '{name}' referenced in rule '{context}'"
            )));
        }
    }
    for child in rule.children() {
        check_rule_symbols(child, grammar, context)?;
    }
    Ok(())
}

fn check_declarations(grammar: &Grammar) -> Result<(), ValidationError> {
    let defined = |name: &str, what: &str| {
        if grammar.rules.contains_key(name) {
            Ok(())
        } else {
            Err(ValidationError::new(format!(
                "{what} '{name}' is not a defined rule"
            )))
        }
    };

    if let Some(word) = grammar.word.as_deref() {
        defined(word, "word rule")?;
    }
    for name in grammar.inline.iter().flatten() {
        defined(name.as_str(), "inline rule")?;
    }
    for name in grammar.supertypes.iter().flatten() {
        defined(name.as_str(), "supertype")?;
    }
    for group in grammar.conflicts() {
        for name in group {
            defined(name.as_str(), "conflict member")?;
        }
    }
    Ok(())
}

fn unreachable_rules(grammar: &Grammar, start: &str) -> Vec<String> {
    let reachable = reachable_rules(grammar, start);
    let inlined: HashSet<&str> = grammar.inline.iter().flatten().map(String::as_str).collect();

    grammar
        .rule_names()
        .into_iter()
        .filter(|name| !reachable.contains(name) && !inlined.contains(name))
        .map(str::to_owned)
        .collect()
}

fn collect_referenced_symbols<'g>(rule: &'g Rule, symbols: &mut Vec<&'g str>) {
    if let Some(name) = rule.symbol_name() {
        symbols.push(name);
    }
    for child in rule.children() {
        collect_referenced_symbols(child, symbols);
    }
}

fn left_recursive_rules(grammar: &Grammar) -> Vec<String> {
    grammar
        .rule_names()
        .into_iter()
        .filter(|name| has_immediate_left_recursion(&grammar.rules[*name], name))
        .map(str::to_owned)
        .collect()
}

fn has_immediate_left_recursion(rule: &Rule, target: &str) -> bool {
    use crate::grammar::RuleType;

    match rule.rule_type {
        RuleType::Symbol => rule.name.as_deref() == Some(target),
        RuleType::Seq => rule
            .members
            .first()
            .is_some_and(|first| has_immediate_left_recursion(first, target)),
        RuleType::Choice => rule
            .members
            .iter()
            .any(|member| has_immediate_left_recursion(member, target)),
        RuleType::Prec
        | RuleType::PrecLeft
        | RuleType::PrecRight
        | RuleType::PrecDynamic
        | RuleType::Field
        | RuleType::Alias => rule
            .content
            .as_deref()
            .is_some_and(|content| has_immediate_left_recursion(content, target)),
        _ => false,
    }
}

fn mixed_precedence(grammar: &Grammar) -> BTreeMap<String, Vec<i32>> {
    let mut result = BTreeMap::new();
    for name in grammar.rule_names() {
        let mut levels = BTreeSet::new();
        collect_precedence_levels(&grammar.rules[name], &mut levels);
        if levels.len() > 1 {
            result.insert(name.to_owned(), levels.into_iter().collect());
        }
    }
    result
}

fn collect_precedence_levels(rule: &Rule, levels: &mut BTreeSet<i32>) {
    if let Some(p) = rule.precedence() {
        levels.insert(p);
    }
    for child in rule.children() {
        collect_precedence_levels(child, levels);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::parse_grammar;

    fn grammar(rules: &str, tail: &str) -> Grammar {
        parse_grammar(&format!(r#"{{"name": "test", "rules": {{{rules}}}{tail}}}"#)).unwrap()
    }

    #[test]
    fn test_valid_grammar_reports_unreachable_rules() {
        let g = grammar(
            r##"
            "source_file": {"type": "REPEAT", "content": {"type": "SYMBOL", "name": "item"}},
            "item": {"type": "SYMBOL", "name": "identifier"},
            "identifier": {"type": "PATTERN", "value": "[a-z]+"},
            "comment": {"type": "PATTERN", "value": "#.*"},
            "orphan": {"type": "STRING", "value": "fun"}
            "##,
            r#", "extras": [{"type": "SYMBOL", "name": "comment"}]"#,
        );

        let report = validate(&g, "source_file").unwrap();
        assert_eq!(g.rule("comment").unwrap().pattern_value(), Some("#.*"));
        assert_eq!(report.unreachable, vec!["orphan".to_string()]);
        assert!(report.left_recursive.is_empty());
    }

    #[test]
    fn test_undefined_symbol_is_rejected() {
        let g = grammar(
            r#""source_file": {"type": "SYMBOL", "name": "missing"}"#,
            "",
        );

        let err = validate(&g, "source_file").unwrap_err();
        assert_eq!(
            err.message,
            "undefined symbol 'missing' referenced in rule 'source_file'"
        );
    }

    #[test]
    fn test_undefined_start_rule_is_rejected() {
        let g = grammar(r#""program": {"type": "BLANK"}"#, "");

        let err = validate(&g, "source_file").unwrap_err();
        assert_eq!(err.to_string(), "start rule 'source_file' is not defined");

        let err = GrammarError::from(err);
        assert_eq!(
            err.to_string(),
            "validation error: start rule 'source_file' is not defined"
        );
    }

    #[test]
    fn test_undefined_conflict_member_is_rejected() {
        let g = grammar(
            r#""source_file": {"type": "BLANK"}"#,
            r#", "conflicts": [["source_file", "_expression"]]"#,
        );

        let err = validate(&g, "source_file").unwrap_err();
        assert_eq!(
            err.message,
            "conflict member '_expression' is not a defined rule"
        );
    }

    #[test]
    fn test_undefined_word_is_rejected() {
        let g = grammar(
            r#""source_file": {"type": "BLANK"}"#,
            r#", "word": "identifier""#,
        );

        assert!(validate(&g, "source_file").is_err());
    }

    #[test]
    fn test_left_recursion_and_precedence_levels() {
        let g = grammar(
            r#"
            "expr": {"type": "CHOICE", "members": [
                {"type": "PREC_LEFT", "value": 1, "content": {"type": "SEQ", "members": [
                    {"type": "SYMBOL", "name": "expr"},
                    {"type": "STRING", "value": "+"},
                    {"type": "SYMBOL", "name": "expr"}
                ]}},
                {"type": "PREC", "value": -1, "content": {"type": "STRING", "value": "x"}}
            ]}
            "#,
            "",
        );

        let report = validate(&g, "expr").unwrap();
        assert_eq!(report.left_recursive, vec!["expr".to_string()]);
        assert_eq!(report.mixed_precedence["expr"], vec![-1, 1]);
    }
}
