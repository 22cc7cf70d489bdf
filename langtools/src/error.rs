//! Error kinds raised by the core pipeline: regex compilation and grammar normalization.
//!
//! These are distinct from [`crate::nfa::parse::NfaParseError`] and
//! [`crate::dfa::parse::DfaParseError`], which describe failures in the unrelated transition-table
//! file format.

use thiserror::Error;

/// A single top-level error type for every fallible operation in the regex and grammar pipelines.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Shunting Yard detected unbalanced parentheses, an operand-starved operator, or an
    /// unterminated bracket class or escape.
    #[error("malformed regex: {0}")]
    MalformedRegex(String),

    /// The AST builder underflowed the operand stack, or finished with more than one node on it.
    #[error("malformed postfix expression: {0}")]
    MalformedPostfix(String),

    /// The grammar parser could not split a line into `Head -> Bodies`, or found an unclosed `{`.
    #[error("malformed grammar line: {0}")]
    MalformedGrammarLine(String),

    /// The transformation pipeline produced a grammar whose start symbol has no bodies after
    /// useless-symbol elimination.
    #[error("grammar has no derivable strings from its start symbol")]
    EmptyLanguage,

    /// ε-removal variant generation exceeded the configured ceiling.
    #[error("epsilon-removal expansion budget of {budget} exceeded for a single production body")]
    ExpansionBudgetExceeded {
        /// The budget that was exceeded.
        budget: usize,
    },

    /// A regex construct outside §4.1's catalogue (`( ) | * + ? \ [ ]`, literal `ε`) was
    /// encountered.
    #[error("unsupported regex feature: {0}")]
    UnsupportedFeature(String),
}

pub type Result<T> = std::result::Result<T, Error>;
