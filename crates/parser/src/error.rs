//! Fatal error types.
//!
//! Ordinary parse failures are not errors: they are recorded in the state's
//! expectation set and position. The types here cover configuration problems
//! that no amount of backtracking can recover from.

use thiserror::Error;

/// A grammar that cannot be constructed.
#[derive(Debug, Error)]
pub enum GrammarError {
    /// A regex terminal whose pattern does not compile.
    #[error("invalid pattern '{pattern}'")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// A parse that cannot proceed because the grammar is unusable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// A reference names a rule the grammar does not define.
    #[error("unknown rule '{name}'")]
    UnknownRule { name: String },

    /// A sequence whose current element is missing or an alternative
    /// separator. Well-formed grammars never produce this.
    #[error("sequence has no matchable rule at element {index}")]
    MalformedSequence { index: usize },
}
