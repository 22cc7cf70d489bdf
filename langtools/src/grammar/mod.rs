//! # Context-free grammars
//!
//! A [`Grammar`] is an ordered, duplicate-free list of non-terminals and terminals plus a
//! `Head → Bodies` production map, built incrementally from text lines ([`Grammar::add_production_from_text`])
//! or parsed whole from a grammar file ([`parse::parse_grammars`]). From a built grammar, the
//! normalization pipeline ([`left_factor`], [`epsilon`], [`unit`], [`useless`], [`cnf`]) produces a
//! Chomsky Normal Form grammar, which [`cyk`] then recognizes strings against.
//!
//! ```
//! use langtools::grammar::Grammar;
//!
//! let mut g = Grammar::new();
//! g.add_production_from_text("S -> aSa | bSb | ε").unwrap();
//! let cnf = g.normalize_to_cnf(4096).unwrap();
//! assert!(cnf.cyk_accepts("abba"));
//! assert!(!cnf.cyk_accepts("")); // the empty word is never accepted, per §9's Open Question
//! ```

pub mod cnf;
pub mod cyk;
pub mod epsilon;
pub mod left_factor;
pub mod parse;
pub mod unit;
pub mod useless;

use crate::error::Error;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// An atom in a grammar body: a terminal glyph or a non-terminal. Equality is structural over all
/// three fields; ordering is lexicographic by printed form and exists only to make sorting (hence
/// output) deterministic, per §3/§5.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    value: Rc<str>,
    terminal: bool,
    /// Disambiguates freshly generated non-terminals sharing a base name. Always `0` for
    /// terminals and for non-terminals read straight from text.
    id: usize,
}

impl Symbol {
    /// A terminal symbol for a single input glyph.
    pub fn terminal(c: char) -> Symbol {
        Symbol {
            value: Rc::from(c.to_string()),
            terminal: true,
            id: 0,
        }
    }

    /// The distinguished epsilon terminal, `ε`.
    pub fn epsilon() -> Symbol {
        Symbol {
            value: Rc::from("ε"),
            terminal: true,
            id: 0,
        }
    }

    /// A non-terminal with the given base name and freshness id. `id` is `0` for non-terminals
    /// read directly from grammar text; [`Grammar::add_fresh_non_terminal`] assigns higher ids.
    pub fn non_terminal(value: impl Into<Rc<str>>, id: usize) -> Symbol {
        Symbol {
            value: value.into(),
            terminal: false,
            id,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    pub fn is_epsilon(&self) -> bool {
        self.terminal && &*self.value == "ε"
    }

    /// The base name this symbol was built from (without id or bracket decoration).
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn id(&self) -> usize {
        self.id
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terminal {
            write!(f, "{}", self.value)
        } else if self.id == 0 {
            if self.value.chars().count() == 1 {
                write!(f, "{}", self.value)
            } else {
                write!(f, "{{{}}}", self.value)
            }
        } else {
            write!(f, "{{{}_{}}}", self.value, self.id)
        }
    }
}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.to_string().cmp(&other.to_string())
    }
}

/// A context-free grammar: ordered non-terminal and terminal lists plus a `Head → Bodies` map.
/// The first element of the non-terminal list is the start symbol. See §3 for the full invariant
/// list; every operation here upholds them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Grammar {
    non_terminals: Vec<Symbol>,
    terminals: Vec<Symbol>,
    productions: HashMap<Symbol, Vec<Vec<Symbol>>>,
}

impl Grammar {
    pub fn new() -> Grammar {
        Grammar::default()
    }

    /// The non-terminals of this grammar, in the order they were first introduced. The first
    /// element, if any, is the start symbol.
    pub fn non_terminals(&self) -> &[Symbol] {
        &self.non_terminals
    }

    /// The terminals of this grammar, in the order [`Grammar::recompute_terminals`] (or
    /// incremental insertion) last established.
    pub fn terminals(&self) -> &[Symbol] {
        &self.terminals
    }

    /// The start symbol: the first non-terminal introduced. `None` only for an empty grammar.
    pub fn start_symbol(&self) -> Option<&Symbol> {
        self.non_terminals.first()
    }

    /// The bodies of `head`, or `None` if `head` is not a non-terminal of this grammar.
    pub fn bodies(&self, head: &Symbol) -> Option<&[Vec<Symbol>]> {
        self.productions.get(head).map(Vec::as_slice)
    }

    fn ensure_non_terminal(&mut self, symbol: &Symbol) {
        if !self.non_terminals.contains(symbol) {
            self.non_terminals.push(symbol.clone());
            self.productions.entry(symbol.clone()).or_default();
        }
    }

    fn ensure_terminal(&mut self, symbol: &Symbol) {
        if !self.terminals.contains(symbol) {
            self.terminals.push(symbol.clone());
        }
    }

    fn register_body(&mut self, body: &[Symbol]) {
        for symbol in body {
            if symbol.is_terminal() {
                self.ensure_terminal(symbol);
            } else {
                self.ensure_non_terminal(symbol);
            }
        }
    }

    /// Parses a line of the form `Head -> a1 | a2 | …` (§4.8/§6) and merges its bodies into this
    /// grammar, coalescing duplicate bodies under the head. Bare uppercase ASCII letters and
    /// `{Name}` both denote non-terminals (the latter for multi-character bases); every other
    /// non-whitespace glyph, including `ε`, is a terminal.
    pub fn add_production_from_text(&mut self, line: &str) -> Result<(), Error> {
        let (head, bodies) = parse::parse_production_line(line)?;
        self.ensure_non_terminal(&head);
        for body in &bodies {
            self.register_body(body);
        }
        let existing = self.productions.entry(head).or_default();
        for body in bodies {
            if !existing.contains(&body) {
                existing.push(body);
            }
        }
        Ok(())
    }

    /// Returns a fresh non-terminal whose value is `base` and whose id is one greater than any
    /// existing non-terminal sharing that base (`0` if none exists yet), per §4.8. The returned
    /// symbol is already registered in this grammar with an empty body list.
    pub fn add_fresh_non_terminal(&mut self, base: &str) -> Symbol {
        let next_id = self
            .non_terminals
            .iter()
            .filter(|s| !s.is_terminal() && &*s.value == base)
            .map(|s| s.id)
            .max()
            .map_or(0, |max| max + 1);
        let symbol = Symbol::non_terminal(base, next_id);
        self.ensure_non_terminal(&symbol);
        symbol
    }

    /// Replaces the body list of an existing head, deduplicating bodies. Does not touch the
    /// terminal list; call [`Grammar::recompute_terminals`] afterwards if bodies may have dropped
    /// or introduced terminals, per §4.8.
    pub fn set_bodies(&mut self, head: &Symbol, bodies: Vec<Vec<Symbol>>) -> Result<(), Error> {
        if !self.non_terminals.contains(head) {
            return Err(Error::MalformedGrammarLine(format!(
                "cannot set bodies of unknown non-terminal {head}"
            )));
        }
        let mut deduped: Vec<Vec<Symbol>> = Vec::with_capacity(bodies.len());
        for body in bodies {
            if !deduped.contains(&body) {
                for symbol in &body {
                    if !symbol.is_terminal() {
                        self.ensure_non_terminal(symbol);
                    }
                }
                deduped.push(body);
            }
        }
        self.productions.insert(head.clone(), deduped);
        Ok(())
    }

    /// Rebuilds the terminal list as the set of terminal symbols present in any body, in first-
    /// encountered order over non-terminals in [`Grammar::non_terminals`] order.
    pub fn recompute_terminals(&mut self) {
        let mut terminals = Vec::new();
        for head in &self.non_terminals {
            if let Some(bodies) = self.productions.get(head) {
                for body in bodies {
                    for symbol in body {
                        if symbol.is_terminal() && !terminals.contains(symbol) {
                            terminals.push(symbol.clone());
                        }
                    }
                }
            }
        }
        self.terminals = terminals;
    }

    /// Runs the full normalization pipeline (§2): left-factoring, ε-removal (bounded by
    /// `expansion_budget`, see [`epsilon::remove_epsilons`]), unit-production removal,
    /// useless-symbol elimination, and Chomsky Normal Form conversion. Returns
    /// [`Error::EmptyLanguage`] if the start symbol has no bodies once useless symbols are gone.
    pub fn normalize_to_cnf(&self, expansion_budget: usize) -> Result<Grammar, Error> {
        let factored = left_factor::left_factor(self);
        let epsilon_free = epsilon::remove_epsilons(&factored, expansion_budget)?;
        let unit_free = unit::remove_unit_productions(&epsilon_free);
        let useless_free = useless::remove_useless_symbols(&unit_free);
        if useless_free
            .start_symbol()
            .and_then(|s| useless_free.bodies(s))
            .map(<[_]>::is_empty)
            .unwrap_or(true)
        {
            return Err(Error::EmptyLanguage);
        }
        Ok(cnf::to_cnf(&useless_free))
    }

    /// Recognizes `word` against this grammar using the CYK algorithm (§4.14). `self` must
    /// already be in Chomsky Normal Form, e.g. the output of [`Grammar::normalize_to_cnf`]. The
    /// empty word is never accepted, per §9's Open Question resolution.
    pub fn cyk_accepts(&self, word: &str) -> bool {
        cyk::accepts(self, word)
    }
}

impl fmt::Display for Grammar {
    /// `Head -> α1 | α2 | …` lines in non-terminal-list order, per §6.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, head) in self.non_terminals.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{head} -> ")?;
            let bodies = self.productions.get(head).map(Vec::as_slice).unwrap_or(&[]);
            for (body_idx, body) in bodies.iter().enumerate() {
                if body_idx > 0 {
                    write!(f, " | ")?;
                }
                for symbol in body {
                    write!(f, "{symbol}")?;
                }
            }
        }
        Ok(())
    }
}
