//! AST → NFA via Thompson construction, per §4.3.
//!
//! Grounded on `original_source/internal/nfa/thompson.go` for the alternation/star/concatenation
//! cases. That source never builds `+` or `?`; those two cases below are derived directly from
//! this crate's own construction rules rather than ported from anywhere.

use crate::nfa::{Nfa, NfaState};
use crate::regex::ast::Node;
use crate::regex::shunting_yard::Op;
use std::collections::BTreeMap;
use std::rc::Rc;

/// A growable arena of in-progress states, addressed by index, before final renaming.
struct Builder {
    epsilon: Vec<Vec<usize>>,
    chars: Vec<BTreeMap<char, Vec<usize>>>,
}

impl Builder {
    fn new() -> Self {
        Self {
            epsilon: Vec::new(),
            chars: Vec::new(),
        }
    }

    fn new_state(&mut self) -> usize {
        let idx = self.epsilon.len();
        self.epsilon.push(Vec::new());
        self.chars.push(BTreeMap::new());
        idx
    }

    fn add_epsilon(&mut self, from: usize, to: usize) {
        self.epsilon[from].push(to);
    }

    fn add_char(&mut self, from: usize, c: char, to: usize) {
        self.chars[from].entry(c).or_default().push(to);
    }

    /// Recursively builds `node`, returning the (start, accept) pair of the constructed
    /// sub-automaton. Each sub-NFA has exactly one start and one accept, per §4.3.
    fn build(&mut self, node: &Node) -> (usize, usize) {
        match node {
            Node::Character(c) => {
                let s = self.new_state();
                let e = self.new_state();
                self.add_char(s, *c, e);
                (s, e)
            }
            Node::Epsilon => {
                let s = self.new_state();
                let e = self.new_state();
                self.add_epsilon(s, e);
                (s, e)
            }
            Node::Operator(Op::Concat, children) => {
                let (s1, e1) = self.build(&children[0]);
                let (s2, e2) = self.build(&children[1]);
                self.add_epsilon(e1, s2);
                (s1, e2)
            }
            Node::Operator(Op::Alt, children) => {
                let (s1, e1) = self.build(&children[0]);
                let (s2, e2) = self.build(&children[1]);
                let s = self.new_state();
                let e = self.new_state();
                self.add_epsilon(s, s1);
                self.add_epsilon(s, s2);
                self.add_epsilon(e1, e);
                self.add_epsilon(e2, e);
                (s, e)
            }
            Node::Operator(Op::Star, children) => {
                let (s1, e1) = self.build(&children[0]);
                let s = self.new_state();
                let e = self.new_state();
                self.add_epsilon(s, s1);
                self.add_epsilon(s, e);
                self.add_epsilon(e1, s1);
                self.add_epsilon(e1, e);
                (s, e)
            }
            Node::Operator(Op::Plus, children) => {
                let (s1, e1) = self.build(&children[0]);
                let s = self.new_state();
                let e = self.new_state();
                self.add_epsilon(s, s1);
                self.add_epsilon(e1, s1);
                self.add_epsilon(e1, e);
                (s, e)
            }
            Node::Operator(Op::Optional, children) => {
                let (s1, e1) = self.build(&children[0]);
                let s = self.new_state();
                let e = self.new_state();
                self.add_epsilon(s, s1);
                self.add_epsilon(s, e);
                self.add_epsilon(e1, e);
                (s, e)
            }
        }
    }
}

/// Converts an AST to an NFA. All intermediate accept flags are cleared; only the outermost
/// accept state is marked accepting. States are renamed `q0, q1, …` by depth-first traversal from
/// the start, so two invocations on an equal AST produce byte-equal artifacts.
pub fn thompson_construct(ast: &Node) -> Nfa {
    let mut builder = Builder::new();
    let (start, accept) = builder.build(ast);

    let alphabet_chars: Vec<char> = builder
        .chars
        .iter()
        .flat_map(|m| m.keys().copied())
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .collect();
    let char_index: BTreeMap<char, usize> = alphabet_chars
        .iter()
        .enumerate()
        .map(|(i, c)| (*c, i))
        .collect();

    let n = builder.epsilon.len();
    let mut new_index: Vec<Option<usize>> = vec![None; n];
    let mut order = Vec::with_capacity(n);
    let mut stack = vec![start];
    while let Some(cur) = stack.pop() {
        if new_index[cur].is_some() {
            continue;
        }
        new_index[cur] = Some(order.len());
        order.push(cur);

        let mut neighbors: Vec<usize> = builder.epsilon[cur].clone();
        for targets in builder.chars[cur].values() {
            neighbors.extend(targets.iter().copied());
        }
        for t in neighbors.into_iter().rev() {
            if new_index[t].is_none() {
                stack.push(t);
            }
        }
    }

    let states: Vec<NfaState> = order
        .iter()
        .map(|&old_idx| {
            let name = Rc::from(format!("q{}", new_index[old_idx].unwrap()));
            let mut transitions = vec![Vec::new(); alphabet_chars.len()];
            for (c, targets) in &builder.chars[old_idx] {
                let idx = char_index[c];
                transitions[idx] = targets.iter().map(|&t| new_index[t].unwrap()).collect();
            }
            let epsilon_transitions = builder.epsilon[old_idx]
                .iter()
                .map(|&t| new_index[t].unwrap())
                .collect();
            NfaState {
                name,
                initial: old_idx == start,
                accepting: old_idx == accept,
                epsilon_transitions,
                transitions,
            }
        })
        .collect();

    let alphabet: Rc<[Rc<str>]> = alphabet_chars
        .iter()
        .map(|c| Rc::from(c.to_string()))
        .collect::<Vec<_>>()
        .into();

    Nfa {
        alphabet,
        states,
        initial_state: new_index[start].unwrap(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regex::ast::build_ast;
    use crate::regex::shunting_yard::to_postfix;

    fn nfa_for(regex: &str) -> Nfa {
        let postfix = to_postfix(regex).unwrap();
        let ast = build_ast(&postfix).unwrap();
        thompson_construct(&ast)
    }

    /// §8's Thompson-NFA uniqueness property, across every operator the catalogue supports.
    #[test]
    fn exactly_one_accepting_state() {
        for regex in ["a", "ab", "a|b", "a*", "a+", "a?", "(a|b)*abb", "ε"] {
            let nfa = nfa_for(regex);
            let accepting = nfa.states().iter().filter(|s| s.is_accepting()).count();
            assert_eq!(accepting, 1, "regex {regex:?} has {accepting} accepting states");
        }
    }

    #[test]
    fn states_are_renamed_sequentially_from_the_start() {
        let nfa = nfa_for("ab");
        assert_eq!(nfa.initial_state().name(), "q0");
        assert!(nfa.states().iter().any(|s| s.name() == "q0"));
    }

    #[test]
    fn concatenation_accepts_exactly_the_concatenated_word() {
        let nfa = nfa_for("ab");
        assert!(nfa.accepts(&["a", "b"]));
        assert!(!nfa.accepts(&["a"]));
        assert!(!nfa.accepts(&["b", "a"]));
    }

    #[test]
    fn alternation_accepts_either_branch() {
        let nfa = nfa_for("a|b");
        assert!(nfa.accepts(&["a"]));
        assert!(nfa.accepts(&["b"]));
        assert!(!nfa.accepts(&["c"]));
    }

    #[test]
    fn star_accepts_zero_or_more_repetitions() {
        let nfa = nfa_for("a*");
        assert!(nfa.accepts(&[]));
        assert!(nfa.accepts(&["a"]));
        assert!(nfa.accepts(&["a", "a", "a"]));
        assert!(!nfa.accepts(&["b"]));
    }

    #[test]
    fn plus_requires_at_least_one_repetition() {
        let nfa = nfa_for("a+");
        assert!(!nfa.accepts(&[]));
        assert!(nfa.accepts(&["a"]));
        assert!(nfa.accepts(&["a", "a"]));
    }

    #[test]
    fn optional_accepts_zero_or_one_occurrence() {
        let nfa = nfa_for("a?");
        assert!(nfa.accepts(&[]));
        assert!(nfa.accepts(&["a"]));
        assert!(!nfa.accepts(&["a", "a"]));
    }

    #[test]
    fn epsilon_accepts_the_empty_word_only() {
        let nfa = nfa_for("ε");
        assert!(nfa.accepts(&[]));
        assert!(!nfa.accepts(&["a"]));
    }
}
