//! gnaw parser
//!
//! A general-purpose parser driven by a data-described grammar. Grammars map
//! rule names to rule values (sequences with prioritized alternatives,
//! references, regexes, string and character literals); the engine matches an
//! input string against them one explicit step at a time.
//!
//! # Overview
//!
//! Instead of recursive descent, the engine keeps a reified stack of
//! [`Step`] frames inside a [`State`]. Each [`State::advance`] call performs
//! one transition: expanding a non-terminal, matching a terminal, climbing
//! forward after a match, or backtracking to the next alternative after a
//! mismatch. A packrat memo cache, filled on the backtracking path, replays
//! completed sub-parses instead of rematching them - and the same cache lets
//! [`State::increment`] reuse unaffected work after an input edit.
//!
//! # Example
//!
//! ```ignore
//! use parser::{Grammar, Rule};
//!
//! let grammar = Grammar::builder()
//!     .rule("sum", Rule::alts([
//!         vec![Rule::reference("number"), Rule::ch('+'), Rule::reference("sum")],
//!         vec![Rule::reference("number")],
//!     ]))
//!     .rule("number", Rule::pattern(r"\d+"))
//!     .build()?;
//!
//! let state = grammar.parse("sum", "40+2")?;
//! assert!(state.errors().is_empty());
//! for step in state.steps() {
//!     // every frame records its rule, span, and matched text
//! }
//! ```
//!
//! # Public API
//!
//! - [`Grammar::builder`] / [`GrammarBuilder`] - define and intern a grammar
//! - [`State::new`] - root a parse on a start rule
//! - [`State::advance`] - one unit of work; never blocks
//! - [`State::parse`] - drive to completion
//! - [`State::increment`] - edit the input and reuse prior work
//! - [`State::steps`] / [`State::errors`] - the raw result
//! - [`tree::shape`] - fold a finished trace into a named tree
//!
//! The engine never fails across [`State::advance`]: parse failures are
//! recorded in the state's error set, and only unusable grammars surface as
//! [`EngineError`].

pub mod format;
mod grammar;
mod state;
mod step;
pub mod tree;

mod error;

// Re-export from gnaw-common
pub use common::{create_logger, Logger};

// Re-export public types
pub use error::{EngineError, GrammarError};
pub use format::{format_errors, format_step, format_steps, format_tree};
pub use grammar::{Grammar, GrammarBuilder, Rule, RuleId, Term};
pub use state::State;
pub use step::Step;
pub use tree::{shape, TreeNode};
