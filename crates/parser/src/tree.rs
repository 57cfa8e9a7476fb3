//! Shaping a completed step trace into a tree.
//!
//! The engine's canonical output is the flat step list; this pass is one way
//! to fold it into something nested. Reference steps become named branches,
//! the terminals below them become leaves, and bare sequence frames - pure
//! control structure - disappear. Nodes are arena-allocated and borrow their
//! names from an interner, so a shaped tree is cheap to traverse and lives
//! exactly as long as its arena.

use bumpalo::{collections::Vec as BumpVec, Bump};
use common::StringInterner;

use crate::grammar::RuleNode;
use crate::state::State;

// Leaf names for terminals, by rule kind.
const NODE_LITERAL: &str = "_literal";
const NODE_CHAR: &str = "_char";
const NODE_MATCH: &str = "_match";

/// A node of a shaped parse tree.
#[derive(Debug)]
pub struct TreeNode<'a> {
    /// The rule name for branches; `_literal`, `_char` or `_match` for
    /// terminal leaves.
    pub name: &'a str,
    /// Start byte offset of the span this node covers.
    pub start: usize,
    /// Exclusive end byte offset.
    pub end: usize,
    /// The input text this node matched.
    pub text: &'a str,
    pub children: &'a [&'a TreeNode<'a>],
}

impl<'a> TreeNode<'a> {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Shape the step trace of a successful parse into a tree rooted at the
/// start reference. Returns `None` if the trace is empty or its root frame
/// never completed.
pub fn shape<'a>(arena: &'a Bump, state: &State) -> Option<&'a TreeNode<'a>> {
    state.steps().first()?.end_pos?;
    let mut strings = StringInterner::new(arena);
    let (root, _) = branch(arena, &mut strings, state, 0)?;
    Some(root)
}

/// Build the branch for the reference step at `index`; returns the node and
/// the index just past its subtree.
fn branch<'a>(
    arena: &'a Bump,
    strings: &mut StringInterner<'a>,
    state: &State,
    index: usize,
) -> Option<(&'a TreeNode<'a>, usize)> {
    let steps = state.steps();
    let grammar = state.grammar();
    let step = &steps[index];
    let end = step.end_pos?;
    let name = match grammar.node(step.rule) {
        RuleNode::Reference(name) => strings.intern(name),
        _ => return None,
    };

    let mut children = BumpVec::new_in(arena);
    let mut next = index + 1;
    while next < steps.len() {
        let inner = &steps[next];
        let Some(inner_end) = inner.end_pos else { break };
        if inner.pos < step.pos || inner_end > end {
            break;
        }
        match grammar.node(inner.rule) {
            RuleNode::Reference(_) => {
                let (child, past) = branch(arena, strings, state, next)?;
                children.push(child);
                next = past;
            }
            kind => {
                if let Some(value) = &inner.value {
                    let name = match kind {
                        RuleNode::Str(_) => NODE_LITERAL,
                        RuleNode::Char(_) => NODE_CHAR,
                        _ => NODE_MATCH,
                    };
                    let leaf = &*arena.alloc(TreeNode {
                        name: strings.intern(name),
                        start: inner.pos,
                        end: inner_end,
                        text: arena.alloc_str(value),
                        children: &[],
                    });
                    children.push(leaf);
                }
                next += 1;
            }
        }
    }

    let node = &*arena.alloc(TreeNode {
        name,
        start: step.pos,
        end,
        text: arena.alloc_str(&state.input()[step.pos..end]),
        children: children.into_bump_slice(),
    });
    Some((node, next))
}
