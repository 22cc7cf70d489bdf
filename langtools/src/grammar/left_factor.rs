//! Left factoring (§4.9): repeatedly extracts the most common, longest common prefix shared by at
//! least two bodies of a non-terminal, introducing a fresh non-terminal for the factored
//! remainder. Grounded on `original_source/internal/grammar/left_factorization.go`'s
//! `findLongestCommonPrefix`/`leftFactor` pair, re-expressed over owned `Grammar` values instead
//! of in-place map mutation.

use crate::grammar::{Grammar, Symbol};
use std::collections::HashMap;

/// Left-factors every non-terminal of `grammar`, returning a fresh, equivalent grammar.
pub fn left_factor(grammar: &Grammar) -> Grammar {
    let mut result = grammar.clone();
    for head in grammar.non_terminals().to_vec() {
        if let Some(bodies) = result.bodies(&head).map(<[_]>::to_vec) {
            let new_bodies = factor_head(&mut result, &head, bodies);
            result
                .set_bodies(&head, new_bodies)
                .expect("head was read from this grammar's own non-terminal list");
        }
    }
    result.recompute_terminals();
    result
}

fn factor_head(grammar: &mut Grammar, head: &Symbol, bodies: Vec<Vec<Symbol>>) -> Vec<Vec<Symbol>> {
    let (prefix, prefix_bodies, rest_bodies) = longest_common_prefix(&bodies);
    let Some(prefix) = prefix else {
        return bodies;
    };

    let fresh = grammar.add_fresh_non_terminal(head.value());
    let fresh_bodies = factor_head(grammar, &fresh, prefix_bodies);
    grammar
        .set_bodies(&fresh, fresh_bodies)
        .expect("add_fresh_non_terminal just registered this symbol");

    let mut factored_body = prefix;
    factored_body.push(fresh);
    let mut new_bodies = vec![factored_body];

    if !rest_bodies.is_empty() {
        new_bodies.extend(factor_head(grammar, head, rest_bodies));
    }
    new_bodies
}

/// Finds the prefix with the highest pairwise multiplicity across `bodies`, breaking ties by
/// longest prefix, then by smallest printed form (§4.9's determinism rule). Returns the prefix
/// (with it stripped, remnants replaced by the epsilon body) split from the bodies that don't
/// share it.
fn longest_common_prefix(
    bodies: &[Vec<Symbol>],
) -> (Option<Vec<Symbol>>, Vec<Vec<Symbol>>, Vec<Vec<Symbol>>) {
    if bodies.len() < 2 {
        return (None, Vec::new(), Vec::new());
    }

    let mut counts: HashMap<Vec<Symbol>, usize> = HashMap::new();
    for i in 0..bodies.len() {
        for j in (i + 1)..bodies.len() {
            let prefix = common_prefix(&bodies[i], &bodies[j]);
            if !prefix.is_empty() {
                *counts.entry(prefix).or_insert(0) += 1;
            }
        }
    }

    let mut candidates: Vec<(Vec<Symbol>, usize)> = counts.into_iter().collect();
    candidates.sort_by(|(pa, ca), (pb, cb)| {
        cb.cmp(ca)
            .then_with(|| pb.len().cmp(&pa.len()))
            .then_with(|| printed(pa).cmp(&printed(pb)))
    });

    let Some((prefix, _)) = candidates.into_iter().next() else {
        return (None, Vec::new(), Vec::new());
    };

    let prefix_len = prefix.len();
    let mut prefix_bodies = Vec::new();
    let mut rest_bodies = Vec::new();
    for body in bodies.iter().cloned() {
        if body.len() >= prefix_len && body[..prefix_len] == prefix[..] {
            let mut remainder = body[prefix_len..].to_vec();
            if remainder.is_empty() {
                remainder.push(Symbol::epsilon());
            }
            prefix_bodies.push(remainder);
        } else {
            rest_bodies.push(body);
        }
    }

    (Some(prefix), prefix_bodies, rest_bodies)
}

fn common_prefix(a: &[Symbol], b: &[Symbol]) -> Vec<Symbol> {
    a.iter()
        .zip(b.iter())
        .take_while(|(x, y)| x == y)
        .map(|(x, _)| x.clone())
        .collect()
}

fn printed(symbols: &[Symbol]) -> String {
    symbols.iter().map(Symbol::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factors_shared_prefix() {
        let mut g = Grammar::new();
        g.add_production_from_text("A -> Bx | jk | Bb | jl").unwrap();
        g.add_production_from_text("B -> mm | mb | m").unwrap();
        let factored = left_factor(&g);

        for head in factored.non_terminals() {
            let bodies = factored.bodies(head).unwrap();
            let mut by_first: HashMap<Option<Symbol>, usize> = HashMap::new();
            for body in bodies {
                let first = if body == [Symbol::epsilon()] {
                    None
                } else {
                    body.first().cloned()
                };
                *by_first.entry(first).or_insert(0) += 1;
            }
            for (first, count) in by_first {
                assert!(
                    count <= 1 || first.is_none(),
                    "non-terminal {head} still has {count} bodies sharing a first symbol"
                );
            }
        }
    }

    #[test]
    fn leaves_already_factored_grammar_unchanged_in_language() {
        let mut g = Grammar::new();
        g.add_production_from_text("S -> a | b").unwrap();
        let factored = left_factor(&g);
        assert_eq!(factored.bodies(&Symbol::non_terminal("S", 0)).unwrap().len(), 2);
    }
}
