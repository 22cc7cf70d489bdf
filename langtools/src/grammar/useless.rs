//! Useless-symbol elimination (§4.12), two phases: drop non-generating non-terminals (those that
//! derive no terminal string), then drop non-terminals unreachable from the start symbol.
//! Grounded on `original_source/internal/grammar/useless_symbol_elimination.go`'s
//! `findGeneratingSymbols`/`findReachableSymbols` pair, re-expressed as two independent
//! grammar-to-grammar passes composed by [`remove_useless_symbols`].

use crate::grammar::{Grammar, Symbol};
use std::collections::{HashMap, HashSet, VecDeque};

/// Runs both phases of useless-symbol elimination, in the order §4.12 specifies: generating
/// symbols first, then reachability over what remains. The grammar's true start symbol is
/// captured before either pass runs and threaded through explicitly, rather than re-derived from
/// `non_terminals.first()` of the already generating-filtered grammar — if the real start is
/// itself non-generating, it is gone from that filtered grammar, and re-deriving "start" from
/// whatever non-terminal happens to survive first would treat an unrelated symbol as the start.
pub fn remove_useless_symbols(grammar: &Grammar) -> Grammar {
    let start = grammar.start_symbol().cloned();
    let generating_only = remove_non_generating(grammar);
    remove_non_reachable(&generating_only, start.as_ref())
}

fn compute_generating(grammar: &Grammar) -> HashSet<Symbol> {
    let mut generating: HashSet<Symbol> = HashSet::new();
    loop {
        let mut changed = false;
        for head in &grammar.non_terminals {
            if generating.contains(head) {
                continue;
            }
            let is_generating = grammar
                .productions
                .get(head)
                .map(|bodies| {
                    bodies
                        .iter()
                        .any(|body| body.iter().all(|s| s.is_terminal() || generating.contains(s)))
                })
                .unwrap_or(false);
            if is_generating {
                generating.insert(head.clone());
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    generating
}

fn remove_non_generating(grammar: &Grammar) -> Grammar {
    let generating = compute_generating(grammar);
    let non_terminals: Vec<Symbol> = grammar
        .non_terminals
        .iter()
        .filter(|s| generating.contains(s))
        .cloned()
        .collect();

    let mut productions: HashMap<Symbol, Vec<Vec<Symbol>>> = HashMap::new();
    for head in &non_terminals {
        let bodies = grammar
            .productions
            .get(head)
            .map(|bodies| {
                bodies
                    .iter()
                    .filter(|body| body.iter().all(|s| s.is_terminal() || generating.contains(s)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        productions.insert(head.clone(), bodies);
    }

    let mut result = Grammar {
        non_terminals,
        terminals: grammar.terminals.clone(),
        productions,
    };
    result.recompute_terminals();
    result
}

fn remove_non_reachable(grammar: &Grammar, start: Option<&Symbol>) -> Grammar {
    let Some(start) = start else {
        return grammar.clone();
    };

    if !grammar.non_terminals.contains(start) {
        // The true start symbol was dropped by generating-filtering already: it derives no
        // terminal string, so nothing is reachable from it either. The language is empty; keep
        // `start` as the result's only non-terminal, with no bodies, rather than letting whatever
        // non-terminal happens to remain stand in for it.
        let mut result = Grammar {
            non_terminals: vec![start.clone()],
            terminals: Vec::new(),
            productions: HashMap::from([(start.clone(), Vec::new())]),
        };
        result.recompute_terminals();
        return result;
    }
    let start = start.clone();

    let mut reachable: HashSet<Symbol> = HashSet::new();
    let mut queue: VecDeque<Symbol> = VecDeque::new();
    reachable.insert(start.clone());
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        if let Some(bodies) = grammar.productions.get(&current) {
            for body in bodies {
                for symbol in body {
                    if !symbol.is_terminal() && reachable.insert(symbol.clone()) {
                        queue.push_back(symbol.clone());
                    }
                }
            }
        }
    }

    let non_terminals: Vec<Symbol> = grammar
        .non_terminals
        .iter()
        .filter(|s| reachable.contains(s))
        .cloned()
        .collect();

    let mut productions: HashMap<Symbol, Vec<Vec<Symbol>>> = HashMap::new();
    for head in &non_terminals {
        productions.insert(
            head.clone(),
            grammar.productions.get(head).cloned().unwrap_or_default(),
        );
    }

    let mut result = Grammar {
        non_terminals,
        terminals: grammar.terminals.clone(),
        productions,
    };
    result.recompute_terminals();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_non_generating_non_terminal() {
        let mut g = Grammar::new();
        g.add_production_from_text("S -> a | B").unwrap();
        g.add_production_from_text("B -> B").unwrap(); // B only ever derives itself
        let result = remove_useless_symbols(&g);
        assert!(!result.non_terminals().contains(&Symbol::non_terminal("B", 0)));
        assert_eq!(
            result.bodies(&Symbol::non_terminal("S", 0)).unwrap(),
            &[vec![Symbol::terminal('a')]]
        );
    }

    #[test]
    fn drops_unreachable_non_terminal() {
        let mut g = Grammar::new();
        g.add_production_from_text("S -> a").unwrap();
        g.add_production_from_text("U -> b").unwrap(); // never referenced from S
        let result = remove_useless_symbols(&g);
        assert!(!result.non_terminals().contains(&Symbol::non_terminal("U", 0)));
        assert!(!result.terminals().contains(&Symbol::terminal('b')));
    }

    /// The start symbol itself can be the one generating-filtering drops. `B` is generating but
    /// unreachable from `S`, so a reachability pass re-deriving "start" from whatever non-terminal
    /// survives generating-filtering would wrongly keep `B -> b` as if it were the whole grammar.
    #[test]
    fn start_symbol_itself_non_generating_yields_empty_language() {
        let mut g = Grammar::new();
        g.add_production_from_text("S -> A").unwrap();
        g.add_production_from_text("A -> A").unwrap(); // A only ever derives itself
        g.add_production_from_text("B -> b").unwrap(); // generating, but unreachable from S
        let result = remove_useless_symbols(&g);
        assert_eq!(result.non_terminals(), &[Symbol::non_terminal("S", 0)]);
        assert_eq!(result.bodies(&Symbol::non_terminal("S", 0)).unwrap(), &[] as &[Vec<Symbol>]);

        let err = g.normalize_to_cnf(4096).unwrap_err();
        assert!(matches!(err, crate::error::Error::EmptyLanguage));
    }
}
