//! ε-removal (§4.10): computes the nullable non-terminals by fixpoint, expands every body
//! containing nullable occurrences into all present/absent variants, then drops the epsilon body
//! everywhere. Grounded on `original_source/internal/grammar/epsilon_elimination.go`'s
//! `identifyIndirectNullables`/`ReplaceNullables` pair (a past-vs-new worklist fixpoint and a
//! combination-generating replacement step), re-expressed over symbol sequences instead of whole
//! production strings.
//!
//! Per §9's Open Question resolution, the start symbol's epsilon body is always discarded along
//! with every other one — the empty word is never derivable after this pass.

use crate::error::Error;
use crate::grammar::{Grammar, Symbol};
use std::collections::{HashMap, HashSet};

/// Removes epsilon productions from `grammar`, bounded by `expansion_budget` variants per body
/// (§5: ε-variant expansion is exponential in the number of nullable occurrences in a body).
pub fn remove_epsilons(grammar: &Grammar, expansion_budget: usize) -> Result<Grammar, Error> {
    let nullable = compute_nullable(grammar);

    let mut productions: HashMap<Symbol, Vec<Vec<Symbol>>> = HashMap::new();
    for head in &grammar.non_terminals {
        let mut bodies: Vec<Vec<Symbol>> = Vec::new();
        if let Some(original_bodies) = grammar.productions.get(head) {
            for body in original_bodies {
                for variant in expand_body(body, &nullable, expansion_budget)? {
                    if variant.is_empty() || (variant.len() == 1 && variant[0].is_epsilon()) {
                        continue;
                    }
                    if !bodies.contains(&variant) {
                        bodies.push(variant);
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
    Ok(result)
}

/// The least set of non-terminals with a body composed entirely of symbols already known
/// nullable (or the epsilon body), computed by a past-vs-new worklist fixpoint.
fn compute_nullable(grammar: &Grammar) -> HashSet<Symbol> {
    let mut nullable: HashSet<Symbol> = HashSet::new();
    loop {
        let mut changed = false;
        for head in &grammar.non_terminals {
            if nullable.contains(head) {
                continue;
            }
            let is_nullable = grammar
                .productions
                .get(head)
                .map(|bodies| {
                    bodies.iter().any(|body| {
                        body.iter()
                            .all(|s| s.is_epsilon() || (!s.is_terminal() && nullable.contains(s)))
                    })
                })
                .unwrap_or(false);
            if is_nullable {
                nullable.insert(head.clone());
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    nullable
}

/// Expands `body` into every variant obtained by independently keeping or dropping each nullable
/// non-terminal occurrence.
fn expand_body(
    body: &[Symbol],
    nullable: &HashSet<Symbol>,
    expansion_budget: usize,
) -> Result<Vec<Vec<Symbol>>, Error> {
    let nullable_positions: Vec<usize> = body
        .iter()
        .enumerate()
        .filter(|(_, s)| !s.is_terminal() && nullable.contains(s))
        .map(|(i, _)| i)
        .collect();

    let variant_count = 1usize
        .checked_shl(nullable_positions.len() as u32)
        .unwrap_or(usize::MAX);
    if variant_count > expansion_budget {
        return Err(Error::ExpansionBudgetExceeded {
            budget: expansion_budget,
        });
    }

    let mut variants = Vec::with_capacity(variant_count);
    for mask in 0..variant_count {
        let mut variant = Vec::with_capacity(body.len());
        let mut next_position = 0;
        for (i, symbol) in body.iter().enumerate() {
            if next_position < nullable_positions.len() && nullable_positions[next_position] == i {
                let keep = (mask >> next_position) & 1 == 1;
                next_position += 1;
                if keep {
                    variant.push(symbol.clone());
                }
            } else {
                variant.push(symbol.clone());
            }
        }
        variants.push(variant);
    }
    Ok(variants)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_start_epsilon_but_keeps_language_for_nonempty_words() {
        let mut g = Grammar::new();
        g.add_production_from_text("S -> aSa | bSb | ε").unwrap();
        let result = remove_epsilons(&g, 4096).unwrap();
        let start = Symbol::non_terminal("S", 0);
        let bodies = result.bodies(&start).unwrap();
        assert!(!bodies.iter().any(|b| b.len() == 1 && b[0].is_epsilon()));
        assert!(bodies.contains(&vec![Symbol::terminal('a'), Symbol::terminal('a')]));
        assert!(bodies.contains(&vec![Symbol::terminal('b'), Symbol::terminal('b')]));
    }

    #[test]
    fn expands_multiple_nullable_occurrences() {
        let mut g = Grammar::new();
        g.add_production_from_text("S -> AB").unwrap();
        g.add_production_from_text("A -> a | ε").unwrap();
        g.add_production_from_text("B -> b | ε").unwrap();
        let result = remove_epsilons(&g, 4096).unwrap();
        let start = Symbol::non_terminal("S", 0);
        let bodies = result.bodies(&start).unwrap();
        assert!(bodies.contains(&vec![Symbol::terminal('a'), Symbol::terminal('b')]));
        assert!(bodies.contains(&vec![Symbol::terminal('a')]));
        assert!(bodies.contains(&vec![Symbol::terminal('b')]));
        assert!(!bodies.iter().any(Vec::is_empty));
    }

    #[test]
    fn budget_ceiling_is_enforced() {
        let mut g = Grammar::new();
        let mut body = "S -> ".to_string();
        for _ in 0..6 {
            body.push('A');
        }
        g.add_production_from_text(&body).unwrap();
        g.add_production_from_text("A -> a | ε").unwrap();
        assert!(matches!(
            remove_epsilons(&g, 8),
            Err(Error::ExpansionBudgetExceeded { budget: 8 })
        ));
        assert!(remove_epsilons(&g, 64).is_ok());
    }
}
