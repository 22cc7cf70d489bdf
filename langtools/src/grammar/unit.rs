//! Unit-production removal (§4.11): computes unit pairs `(A, B)` — `A ⇒* B` via single-non-
//! terminal productions only — then replaces each head's bodies with the non-unit bodies of every
//! `B` paired with it. Grounded on `original_source/internal/grammar/unary_elimination.go`'s
//! `initializeUnaryPairs`/`findUnaryPairs`/`removeUnaryProductions` trio, re-expressed with a
//! `HashMap<Symbol, HashSet<Symbol>>` reachability table instead of string-keyed maps.

use crate::grammar::{Grammar, Symbol};
use std::collections::{HashMap, HashSet};

/// Removes unit productions from `grammar`, returning a fresh, equivalent grammar.
pub fn remove_unit_productions(grammar: &Grammar) -> Grammar {
    let unit_pairs = compute_unit_pairs(grammar);

    let mut productions: HashMap<Symbol, Vec<Vec<Symbol>>> = HashMap::new();
    for head in &grammar.non_terminals {
        let mut bodies: Vec<Vec<Symbol>> = Vec::new();
        if let Some(reachable) = unit_pairs.get(head) {
            for paired in reachable {
                if let Some(paired_bodies) = grammar.productions.get(paired) {
                    for body in paired_bodies {
                        if !is_unit_body(body) && !bodies.contains(body) {
                            bodies.push(body.clone());
                        }
                    }
                }
            }
        }
        productions.insert(head.clone(), bodies);
    }

    let mut result = Grammar {
        non_terminals: grammar.non_terminals.clone(),
        terminals: grammar.terminals.clone(),
        productions,
    };
    result.recompute_terminals();
    result
}

fn is_unit_body(body: &[Symbol]) -> bool {
    body.len() == 1 && !body[0].is_terminal()
}

/// `(A, B)` is a unit pair if `A == B`, or some body of `A` is the single non-terminal `C` with
/// `(C, B)` already a unit pair (transitive closure, computed by saturation).
fn compute_unit_pairs(grammar: &Grammar) -> HashMap<Symbol, HashSet<Symbol>> {
    let mut pairs: HashMap<Symbol, HashSet<Symbol>> = HashMap::new();
    for head in &grammar.non_terminals {
        pairs.entry(head.clone()).or_default().insert(head.clone());
    }

    loop {
        let mut changed = false;
        for head in &grammar.non_terminals {
            let reachable_so_far: Vec<Symbol> = pairs[head].iter().cloned().collect();
            for intermediate in reachable_so_far {
                let Some(bodies) = grammar.productions.get(&intermediate) else {
                    continue;
                };
                for body in bodies {
                    if is_unit_body(body) {
                        let target = body[0].clone();
                        if pairs.get_mut(head).unwrap().insert(target) {
                            changed = true;
                        }
                    }
                }
            }
        }
        if !changed {
            break;
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_transitive_unit_chain() {
        let mut g = Grammar::new();
        g.add_production_from_text("A -> B").unwrap();
        g.add_production_from_text("B -> C").unwrap();
        g.add_production_from_text("C -> c").unwrap();
        let result = remove_unit_productions(&g);
        let a = Symbol::non_terminal("A", 0);
        assert_eq!(result.bodies(&a).unwrap(), &[vec![Symbol::terminal('c')]]);
    }

    #[test]
    fn keeps_non_unit_bodies_untouched() {
        let mut g = Grammar::new();
        g.add_production_from_text("S -> AB | A").unwrap();
        g.add_production_from_text("A -> a").unwrap();
        g.add_production_from_text("B -> b").unwrap();
        let result = remove_unit_productions(&g);
        let s = Symbol::non_terminal("S", 0);
        let bodies = result.bodies(&s).unwrap();
        assert!(bodies.contains(&vec![Symbol::non_terminal("A", 0), Symbol::non_terminal("B", 0)]));
        assert!(bodies.contains(&vec![Symbol::terminal('a')]));
        assert!(!bodies.iter().any(|b| b.len() == 1 && !b[0].is_terminal()));
    }
}
