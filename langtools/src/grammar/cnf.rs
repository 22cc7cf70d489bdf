//! Chomsky Normal Form conversion (§4.13), in two passes: terminal substitution introduces a
//! fresh non-terminal for every terminal that appears in a body of length ≥ 2, then binarization
//! right-folds every body longer than two symbols into a chain of binary productions. Grounded on
//! `original_source/internal/grammar/cnf_conversion.go`'s `CNFTerminalSubstitution`/
//! `CNFSplitLargeProductions` pair, re-expressed over owned `Grammar` values and the crate's own
//! `add_fresh_non_terminal`/`set_bodies` API instead of hand-built maps.

use crate::grammar::{Grammar, Symbol};
use std::collections::HashMap;

/// Converts `grammar` to Chomsky Normal Form: every resulting body is either a single terminal or
/// exactly two non-terminals.
pub fn to_cnf(grammar: &Grammar) -> Grammar {
    let substituted = substitute_terminals(grammar);
    binarize(&substituted)
}

fn substitute_terminals(grammar: &Grammar) -> Grammar {
    let mut result = grammar.clone();
    let mut terminal_to_non_terminal: HashMap<Symbol, Symbol> = HashMap::new();

    for terminal in grammar.terminals() {
        let appears_in_long_body = grammar.non_terminals().iter().any(|head| {
            grammar
                .bodies(head)
                .unwrap_or(&[])
                .iter()
                .any(|body| body.len() >= 2 && body.contains(terminal))
        });
        if !appears_in_long_body {
            continue;
        }
        let fresh = result.add_fresh_non_terminal(terminal.value());
        result
            .set_bodies(&fresh, vec![vec![terminal.clone()]])
            .expect("add_fresh_non_terminal just registered this symbol");
        terminal_to_non_terminal.insert(terminal.clone(), fresh);
    }

    for head in grammar.non_terminals() {
        let bodies = grammar.bodies(head).unwrap_or(&[]);
        let new_bodies: Vec<Vec<Symbol>> = bodies
            .iter()
            .map(|body| {
                if body.len() < 2 {
                    return body.clone();
                }
                body.iter()
                    .map(|s| terminal_to_non_terminal.get(s).cloned().unwrap_or_else(|| s.clone()))
                    .collect()
            })
            .collect();
        result
            .set_bodies(head, new_bodies)
            .expect("head was read from this grammar's own non-terminal list");
    }

    result.recompute_terminals();
    result
}

fn binarize(grammar: &Grammar) -> Grammar {
    let mut result = grammar.clone();
    for head in grammar.non_terminals().to_vec() {
        let Some(bodies) = grammar.bodies(&head).map(<[_]>::to_vec) else {
            continue;
        };
        let mut new_bodies = Vec::with_capacity(bodies.len());
        for body in bodies {
            if body.len() <= 2 {
                new_bodies.push(body);
                continue;
            }
            let mut tail = body[body.len() - 1].clone();
            for symbol in body[1..body.len() - 1].iter().rev() {
                let base = format!("{}_{}", symbol.value(), tail.value());
                let fresh = result.add_fresh_non_terminal(&base);
                result
                    .set_bodies(&fresh, vec![vec![symbol.clone(), tail]])
                    .expect("add_fresh_non_terminal just registered this symbol");
                tail = fresh;
            }
            new_bodies.push(vec![body[0].clone(), tail]);
        }
        result
            .set_bodies(&head, new_bodies)
            .expect("head was read from this grammar's own non-terminal list");
    }
    result.recompute_terminals();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_cnf_shape(grammar: &Grammar) -> bool {
        grammar.non_terminals().iter().all(|head| {
            grammar.bodies(head).unwrap_or(&[]).iter().all(|body| {
                (body.len() == 1 && body[0].is_terminal())
                    || (body.len() == 2 && body.iter().all(|s| !s.is_terminal()))
            })
        })
    }

    #[test]
    fn substitutes_terminals_in_long_bodies() {
        let mut g = Grammar::new();
        g.add_production_from_text("S -> aSb | ab").unwrap();
        let cnf = to_cnf(&g);
        assert!(is_cnf_shape(&cnf), "{cnf}");
    }

    #[test]
    fn binarizes_long_bodies() {
        let mut g = Grammar::new();
        g.add_production_from_text("S -> ABCD").unwrap();
        g.add_production_from_text("A -> a").unwrap();
        g.add_production_from_text("B -> b").unwrap();
        g.add_production_from_text("C -> c").unwrap();
        g.add_production_from_text("D -> d").unwrap();
        let cnf = to_cnf(&g);
        assert!(is_cnf_shape(&cnf), "{cnf}");
    }

    #[test]
    fn leaves_already_cnf_grammar_shape_intact() {
        let mut g = Grammar::new();
        g.add_production_from_text("S -> AB | BC").unwrap();
        g.add_production_from_text("A -> BA | a").unwrap();
        g.add_production_from_text("B -> CC | b").unwrap();
        g.add_production_from_text("C -> AB | a").unwrap();
        let cnf = to_cnf(&g);
        assert!(is_cnf_shape(&cnf), "{cnf}");
    }
}
