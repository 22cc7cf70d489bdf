//! # Regular expressions
//!
//! A regular expression is compiled through three stages: infix text is tokenized and reordered to
//! postfix by the Shunting Yard algorithm ([`shunting_yard`]), the postfix sequence is folded into
//! an abstract syntax tree ([`ast`]), and the tree is compiled to an NFA by Thompson construction
//! ([`thompson`]).
//!
//! ## Syntax
//! Regular expressions are written in UTF-8. There are eight reserved characters: `(`, `)`, `|`,
//! `*`, `+`, `?`, `\` and the literal epsilon glyph `ε`; these (and `∅`, which is recognized but
//! rejected as unsupported) must be escaped with a backslash to appear literally. Parentheses
//! group, `|` alternates, `*`/`+`/`?` are Kleene star/plus/optional, and `[abc]` is sugar for
//! `(a|b|c)`, expanded before tokenizing. Initial and trailing whitespace is ignored.
//!
//! ```
//! use langtools::regex::Regex;
//!
//! let r = Regex::parse("(a|b)*abb").unwrap();
//! let nfa = r.to_nfa();
//! assert!(nfa.accepts_graphemes("ababb"));
//! assert!(!nfa.accepts_graphemes("ab"));
//! ```

pub mod ast;
pub mod shunting_yard;
pub mod thompson;

use crate::error::Error;
use crate::nfa::Nfa;
use ast::Node;
use std::fmt;

/// A compiled regular expression, represented by its abstract syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Regex {
    ast: Node,
}

impl Regex {
    /// Parses `text` through Shunting Yard and the AST builder. `text` is trimmed before
    /// tokenizing; everything else in it is significant.
    pub fn parse(text: &str) -> Result<Regex, Error> {
        let postfix = shunting_yard::to_postfix(text)?;
        let ast = ast::build_ast(&postfix)?;
        Ok(Regex { ast })
    }

    /// The AST this regex compiles to. Exposed for callers that want the postfix/AST stages
    /// directly, e.g. to check the round-trip properties in §8.
    pub fn ast(&self) -> &Node {
        &self.ast
    }

    /// Compiles this regular expression to a NFA via Thompson construction. The resulting NFA may
    /// be large; `nfa.to_dfa()` followed by `dfa.minimize()` usually shrinks it considerably.
    pub fn to_nfa(&self) -> Nfa {
        thompson::thompson_construct(&self.ast)
    }
}

impl fmt::Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ast)
    }
}
