//! Grammar model: rule values and the interned rule table.
//!
//! A grammar is built from [`Rule`] values, a plain data description of what
//! to match. Building a [`Grammar`] interns every rule value into an
//! id-indexed table so that each rule has a stable identity for the lifetime
//! of the grammar. The engine keys its memoization on that identity, so
//! interning happens exactly once, up front; in particular regex patterns are
//! compiled (and anchored) at this point and never again.
//!
//! Sequences are stored flat: an ordered list of elements where a distinguished
//! separator partitions the list into prioritized alternatives. The encoding
//! `[A, B, /, C, D, /, E]` reads as the three alternatives `(A B)`, `(C D)`
//! and `(E)`, tried left to right.

use hashbrown::HashMap;
use regex::Regex;

use crate::error::GrammarError;
use crate::state::State;
use crate::EngineError;

// =============================================================================
// Public rule values
// =============================================================================

/// One element of a sequence: a nested rule or the alternative separator.
#[derive(Debug, Clone)]
pub enum Term {
    Rule(Rule),
    Alt,
}

/// A grammar rule, as written by the caller.
///
/// Terminals consume input directly; [`Rule::Reference`] names another rule
/// in the grammar; [`Rule::Sequence`] composes rules in order, with
/// [`Term::Alt`] separating prioritized alternatives.
#[derive(Debug, Clone)]
pub enum Rule {
    Sequence(Vec<Term>),
    Reference(String),
    Regex(String),
    Str(String),
    Char(char),
}

impl Rule {
    /// A reference to a named rule.
    pub fn reference(name: impl Into<String>) -> Self {
        Rule::Reference(name.into())
    }

    /// A literal string terminal.
    pub fn literal(text: impl Into<String>) -> Self {
        Rule::Str(text.into())
    }

    /// A single-character terminal.
    pub fn ch(c: char) -> Self {
        Rule::Char(c)
    }

    /// A regex terminal. The pattern is anchored to the current input
    /// position when the grammar is built; it never matches further ahead.
    pub fn pattern(pattern: impl Into<String>) -> Self {
        Rule::Regex(pattern.into())
    }

    /// A sequence with a single alternative.
    pub fn seq(rules: impl IntoIterator<Item = Rule>) -> Self {
        Rule::Sequence(rules.into_iter().map(Term::Rule).collect())
    }

    /// A sequence of prioritized alternatives, tried left to right.
    pub fn alts(alternatives: impl IntoIterator<Item = Vec<Rule>>) -> Self {
        let mut terms = Vec::new();
        for (i, alternative) in alternatives.into_iter().enumerate() {
            if i > 0 {
                terms.push(Term::Alt);
            }
            terms.extend(alternative.into_iter().map(Term::Rule));
        }
        Rule::Sequence(terms)
    }
}

// =============================================================================
// Interned rule table
// =============================================================================

/// Identity of an interned rule node within its [`Grammar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleId(u32);

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// One element of an interned sequence.
#[derive(Debug, Clone, Copy)]
pub(crate) enum SeqItem {
    Rule(RuleId),
    Alt,
}

/// An interned rule node.
#[derive(Debug)]
pub(crate) enum RuleNode {
    Sequence(Vec<SeqItem>),
    Reference(String),
    Regex { pattern: String, regex: Regex },
    Str(String),
    Char(char),
}

/// A compiled grammar: a mapping from rule names to interned rule bodies.
///
/// Reference nodes are deduplicated by name, so every mention of a name -
/// including the start reference a [`State`] is rooted on - shares one
/// identity. Terminals and sequences get one node per occurrence.
pub struct Grammar {
    nodes: Vec<RuleNode>,
    bodies: HashMap<String, RuleId>,
    refs: HashMap<String, RuleId>,
}

impl Grammar {
    /// Start defining a grammar.
    pub fn builder() -> GrammarBuilder {
        GrammarBuilder { defs: Vec::new() }
    }

    /// One-shot convenience: create a state for `input` rooted at `start`
    /// and drive it to completion.
    pub fn parse(&self, start: &str, input: impl Into<String>) -> Result<State<'_>, EngineError> {
        let mut state = State::new(self, start, input)?;
        state.parse()?;
        Ok(state)
    }

    pub(crate) fn node(&self, id: RuleId) -> &RuleNode {
        &self.nodes[id.0 as usize]
    }

    /// The interned body of the named rule, if defined.
    pub(crate) fn body(&self, name: &str) -> Option<RuleId> {
        self.bodies.get(name).copied()
    }

    /// The interned reference node for a name.
    pub(crate) fn reference(&self, name: &str) -> Option<RuleId> {
        self.refs.get(name).copied()
    }

    /// Render a rule for traces and debug output.
    pub fn display_rule(&self, id: RuleId) -> String {
        match self.node(id) {
            RuleNode::Reference(name) => name.clone(),
            RuleNode::Str(text) => format!("{:?}", text),
            RuleNode::Char(c) => format!("'{}'", c),
            RuleNode::Regex { pattern, .. } => format!("/{}/", pattern),
            RuleNode::Sequence(items) => {
                let parts: Vec<String> = items
                    .iter()
                    .map(|item| match item {
                        SeqItem::Alt => "/".to_string(),
                        SeqItem::Rule(rule) => self.display_rule(*rule),
                    })
                    .collect();
                format!("[{}]", parts.join(" "))
            }
        }
    }
}

/// Collects rule definitions and interns them into a [`Grammar`].
pub struct GrammarBuilder {
    defs: Vec<(String, Rule)>,
}

impl GrammarBuilder {
    /// Define a rule. Redefining a name replaces the earlier body.
    pub fn rule(mut self, name: impl Into<String>, rule: Rule) -> Self {
        self.defs.push((name.into(), rule));
        self
    }

    /// Intern all definitions. Fails if a regex pattern does not compile.
    /// References to undefined names are not checked here; they surface as
    /// [`EngineError::UnknownRule`] if a parse ever reaches them.
    pub fn build(self) -> Result<Grammar, GrammarError> {
        let mut grammar = Grammar {
            nodes: Vec::new(),
            bodies: HashMap::new(),
            refs: HashMap::new(),
        };
        for (name, rule) in self.defs {
            let body = intern(&mut grammar, rule)?;
            intern_reference(&mut grammar, &name);
            grammar.bodies.insert(name, body);
        }
        Ok(grammar)
    }
}

fn push_node(grammar: &mut Grammar, node: RuleNode) -> RuleId {
    let id = RuleId(grammar.nodes.len() as u32);
    grammar.nodes.push(node);
    id
}

fn intern_reference(grammar: &mut Grammar, name: &str) -> RuleId {
    if let Some(&id) = grammar.refs.get(name) {
        return id;
    }
    let id = push_node(grammar, RuleNode::Reference(name.to_string()));
    grammar.refs.insert(name.to_string(), id);
    id
}

fn intern(grammar: &mut Grammar, rule: Rule) -> Result<RuleId, GrammarError> {
    match rule {
        Rule::Reference(name) => Ok(intern_reference(grammar, &name)),
        Rule::Str(text) => Ok(push_node(grammar, RuleNode::Str(text))),
        Rule::Char(c) => Ok(push_node(grammar, RuleNode::Char(c))),
        Rule::Regex(pattern) => {
            // Anchor once so the pattern only ever matches at the head of
            // the remaining input, wherever the current position is.
            let regex = Regex::new(&format!("^(?:{})", pattern)).map_err(|source| {
                GrammarError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                }
            })?;
            Ok(push_node(grammar, RuleNode::Regex { pattern, regex }))
        }
        Rule::Sequence(terms) => {
            let mut items = Vec::with_capacity(terms.len());
            for term in terms {
                items.push(match term {
                    Term::Alt => SeqItem::Alt,
                    Term::Rule(rule) => SeqItem::Rule(intern(grammar, rule)?),
                });
            }
            Ok(push_node(grammar, RuleNode::Sequence(items)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_references_share_identity() {
        let grammar = Grammar::builder()
            .rule("a", Rule::reference("b"))
            .rule("b", Rule::seq([Rule::reference("b"), Rule::literal("x")]))
            .build()
            .unwrap();
        // Every mention of "b" resolves to the same interned node.
        let body_of_a = grammar.body("a").unwrap();
        assert_eq!(body_of_a, grammar.reference("b").unwrap());
    }

    #[test]
    fn test_alts_encoding() {
        let grammar = Grammar::builder()
            .rule(
                "greet",
                Rule::alts([vec![Rule::literal("hello")], vec![Rule::literal("hi")]]),
            )
            .build()
            .unwrap();
        let body = grammar.body("greet").unwrap();
        assert_eq!(grammar.display_rule(body), "[\"hello\" / \"hi\"]");
    }

    #[test]
    fn test_bad_pattern_is_rejected() {
        let err = Grammar::builder()
            .rule("broken", Rule::pattern("("))
            .build();
        assert!(matches!(err, Err(GrammarError::InvalidPattern { .. })));
    }

    #[test]
    fn test_redefinition_replaces_body() {
        let grammar = Grammar::builder()
            .rule("a", Rule::literal("old"))
            .rule("a", Rule::literal("new"))
            .build()
            .unwrap();
        let body = grammar.body("a").unwrap();
        assert_eq!(grammar.display_rule(body), "\"new\"");
    }
}
