//! The CYK recognizer (§4.14): a triangular dynamic-programming table over substrings of `word`,
//! built bottom-up from single characters. Requires `self` to already be in Chomsky Normal Form.
//! Grounded on `original_source/internal/grammar/algorithm_cyk.go`'s `CYKParse`, re-expressed with
//! precomputed reverse-lookup maps (terminal/pair → producing heads) instead of a linear scan of
//! every production per cell.
//!
//! Per §9's Open Question resolution, the empty word is always rejected: a CNF grammar has no body
//! that could derive it, since [`Grammar::normalize_to_cnf`] already discarded the start symbol's
//! epsilon body during ε-removal.

use crate::grammar::{Grammar, Symbol};
use std::collections::{HashMap, HashSet};

/// Returns whether `grammar` (assumed to already be in Chomsky Normal Form) derives `word`.
pub fn accepts(grammar: &Grammar, word: &str) -> bool {
    let Some(start) = grammar.start_symbol() else {
        return false;
    };
    let chars: Vec<char> = word.chars().collect();
    let n = chars.len();
    if n == 0 {
        return false;
    }

    let (terminal_heads, pair_heads) = reverse_lookups(grammar);

    // table[i][j] holds the non-terminals deriving the substring of length i+1 starting at j.
    let mut table: Vec<Vec<HashSet<Symbol>>> = (0..n).map(|i| vec![HashSet::new(); n - i]).collect();

    for (j, ch) in chars.iter().enumerate() {
        if let Some(heads) = terminal_heads.get(ch) {
            table[0][j].extend(heads.iter().cloned());
        }
    }

    for length in 2..=n {
        let i = length - 1;
        for j in 0..=n - length {
            for split in 1..length {
                let left = &table[split - 1][j];
                let right = &table[length - split - 1][j + split];
                let mut found: Vec<Symbol> = Vec::new();
                for b in left {
                    for c in right {
                        if let Some(heads) = pair_heads.get(&(b.clone(), c.clone())) {
                            found.extend(heads.iter().cloned());
                        }
                    }
                }
                table[i][j].extend(found);
            }
        }
    }

    table[n - 1][0].contains(start)
}

type TerminalHeads = HashMap<char, Vec<Symbol>>;
type PairHeads = HashMap<(Symbol, Symbol), Vec<Symbol>>;

fn reverse_lookups(grammar: &Grammar) -> (TerminalHeads, PairHeads) {
    let mut terminal_heads: TerminalHeads = HashMap::new();
    let mut pair_heads: PairHeads = HashMap::new();

    for head in grammar.non_terminals() {
        for body in grammar.bodies(head).unwrap_or(&[]) {
            match body.as_slice() {
                [t] if t.is_terminal() => {
                    let ch = t.value().chars().next().unwrap_or_default();
                    terminal_heads.entry(ch).or_default().push(head.clone());
                }
                [b, c] if !b.is_terminal() && !c.is_terminal() => {
                    pair_heads
                        .entry((b.clone(), c.clone()))
                        .or_default()
                        .push(head.clone());
                }
                _ => {}
            }
        }
    }

    (terminal_heads, pair_heads)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn palindromes_over_ab() -> Grammar {
        let mut g = Grammar::new();
        g.add_production_from_text("S -> aSa | bSb | a | b | ε").unwrap();
        g
    }

    #[test]
    fn accepts_derivable_word() {
        let cnf = palindromes_over_ab().normalize_to_cnf(4096).unwrap();
        assert!(cnf.cyk_accepts("abba"));
        assert!(cnf.cyk_accepts("a"));
    }

    #[test]
    fn rejects_non_derivable_word() {
        let cnf = palindromes_over_ab().normalize_to_cnf(4096).unwrap();
        assert!(!cnf.cyk_accepts("ab"));
    }

    #[test]
    fn rejects_empty_word() {
        let cnf = palindromes_over_ab().normalize_to_cnf(4096).unwrap();
        assert!(!cnf.cyk_accepts(""));
    }

    #[test]
    fn rejects_symbol_outside_alphabet() {
        let cnf = palindromes_over_ab().normalize_to_cnf(4096).unwrap();
        assert!(!cnf.cyk_accepts("abc"));
    }
}
