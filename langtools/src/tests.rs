use crate::dfa::{Dfa, DfaState};
use crate::error::Error;
use crate::grammar::Grammar;
use crate::nfa::{Nfa, NfaState};
use crate::*;
use ::regex::Regex as LibRegex;
use proptest::prelude::*;
use rand::prelude::*;
use std::collections::HashSet;
use std::ops::RangeInclusive;
use std::rc::Rc;

#[test]
fn test_subset_construction() {
    let nfa_source = "
                a       b
        ->  s1 {s1 s2} {s1}
            s2 {s3}    {}
            s3 {}      {s4}
          * s4 {}      {}
    ";
    let nfa: nfa::Nfa = parser::nfa(nfa_source).unwrap().try_into().unwrap();
    let dfa = nfa.to_dfa();
    assert!(dfa.accepts_graphemes("abaab"));
    assert!(!dfa.accepts_graphemes("aabb"));
}

#[test]
fn cyk_accepts_already_cnf_grammar() {
    let mut g = Grammar::new();
    g.add_production_from_text("S -> AB | BC").unwrap();
    g.add_production_from_text("A -> BA | a").unwrap();
    g.add_production_from_text("B -> CC | b").unwrap();
    g.add_production_from_text("C -> AB | a").unwrap();
    assert!(g.cyk_accepts("baaba"));
}

#[test]
fn epsilon_removal_then_cyk_rejects_empty_word() {
    let mut g = Grammar::new();
    g.add_production_from_text("S -> aSa | bSb | ε").unwrap();
    let cnf = g.normalize_to_cnf(4096).unwrap();
    assert!(cnf.cyk_accepts("abba"));
    assert!(!cnf.cyk_accepts(""));
}

#[test]
fn left_factoring_gives_every_body_a_unique_first_symbol() {
    let mut g = Grammar::new();
    g.add_production_from_text("A -> Bx | jk | Bb | jl").unwrap();
    g.add_production_from_text("B -> mm | mb | m").unwrap();
    let factored = grammar::left_factor::left_factor(&g);

    for head in factored.non_terminals() {
        let mut seen_first_symbols = HashSet::new();
        for body in factored.bodies(head).unwrap() {
            if body == [grammar::Symbol::epsilon()] {
                continue;
            }
            let first = body.first().expect("non-epsilon body is non-empty");
            assert!(
                seen_first_symbols.insert(first.clone()),
                "{head} has two bodies starting with {first}"
            );
        }
    }
}

proptest! {
    /// Every grammar that survives normalization (doesn't hit the empty-language or expansion-
    /// budget error) comes out in CNF shape: every body is a single terminal or exactly two
    /// non-terminals.
    #[test]
    fn cnf_conversion_produces_cnf_shape(grammar in cfg_grammar(4)) {
        match grammar.normalize_to_cnf(256) {
            Ok(cnf) => {
                for head in cnf.non_terminals() {
                    for body in cnf.bodies(head).unwrap() {
                        let shape_ok = (body.len() == 1 && body[0].is_terminal())
                            || (body.len() == 2 && body.iter().all(|s| !s.is_terminal()));
                        assert!(shape_ok, "non-CNF body under {head}: {body:?}");
                    }
                }
            }
            Err(Error::EmptyLanguage) | Err(Error::ExpansionBudgetExceeded { .. }) => {}
            Err(e) => panic!("unexpected normalization error: {e}"),
        }
    }
}

proptest! {
    /// Tests that a DFA can be turned into a table with dfa.to_table() and then be
    /// parsed to the *very same* DFA again (not just equivalent)
    #[test]
    fn dfa_table_reparse(dfa in dfa(50, 50)) {
        let parsed_dfa: Dfa = parser::dfa(&dfa.to_table()).unwrap().try_into().unwrap();
        assert_eq!(dfa, parsed_dfa);
    }

    /// Tests that a DFA can be minimized and is then still equivalent to the original DFA
    #[test]
    fn dfa_minimize_eq(dfa in dfa(25, 25)) { // This size is adequate, larger size takes too long time
        let mut minimized_dfa = dfa.clone();
        minimized_dfa.minimize();
        assert!(minimized_dfa.equivalent_to(&dfa), "Minimized DFA should be equivalent to original");
        assert!(dfa.equivalent_to(&minimized_dfa), "Original DFA should be equivalent to original");
    }

    /// §8's minimization idempotence property: `minimize(minimize(D))` is the very same DFA as
    /// `minimize(D)`, not merely an equivalent one, since the merge step is fully deterministic.
    #[test]
    fn dfa_minimize_idempotent(dfa in dfa(25, 25)) {
        let mut once = dfa.clone();
        once.minimize();
        let mut twice = once.clone();
        twice.minimize();
        assert_eq!(once, twice, "minimizing an already-minimal DFA should change nothing");
    }

    /// Two structurally identical DFAs (same states/transitions, built independently) must
    /// minimize to byte-equal artifacts, per §8's Determinism property: the merge step's state
    /// naming must not depend on hash-iteration order.
    #[test]
    fn dfa_minimize_deterministic_across_runs(dfa in dfa(25, 25)) {
        let mut first = dfa.clone();
        first.minimize();
        let mut second = dfa;
        second.minimize();
        assert_eq!(first.to_table(), second.to_table());
    }

    /// Tests that a DFA can be turned into an NFA and then turned back again to a DFA
    /// while still being equivalent to the original DFA
    #[test]
    fn dfa_to_nfa_to_dfa(dfa in dfa(50, 50)) {
        let converted = dfa.clone().to_nfa().to_dfa();
        assert!(dfa.equivalent_to(&converted), "DFA should be equivalent to DFA->NFA->DFA");
        assert!(converted.equivalent_to(&dfa), "DFA->NFA->DFA should be equivalent to DFA");
    }


    /// Tests that a NFA can be turned into a table with dfa.to_table() and then be
    /// parsed to the *very same* DFA again (not just equivalent)
    #[test]
    fn nfa_table_reparse(nfa in nfa(50, 50)) {
        let parsed_nfa: Nfa = parser::nfa(&nfa.to_table()).unwrap().try_into().unwrap();
        assert_eq!(nfa, parsed_nfa);
    }

    /// Tests that a NFA can be turned into an DFA and then turned back again to a NFA
    /// while still being equivalent to the original NFA
    #[test]
    fn nfa_to_dfa_to_nfa(nfa in nfa(25, 25)) {
        let converted = nfa.to_dfa().to_nfa();
        assert!(nfa.equivalent_to(&converted), "NFA should be equivalent to NFA->DFA->NFA");
        assert!(converted.equivalent_to(&nfa), "NFA->DFA->NFA should be equivalent to NFA");
    }

    #[test]
    fn binary_dfa_ops(
        dfa1 in fixed_alphabet_dfa(20, 'a'..='f', ('a'..='f').count()),
        dfa2 in fixed_alphabet_dfa(20, 'a'..='f', ('a'..='f').count()),
        tests in prop::collection::vec("[a-f]+", 100)
    ) {
        let intersection = dfa1.intersection(&dfa2).unwrap();
        let union = dfa1.union(&dfa2).unwrap();
        let difference = dfa1.difference(&dfa2).unwrap();
        let symmetric_difference = dfa1.symmetric_difference(&dfa2).unwrap();
        for test in tests.iter() {
            let r1 = dfa1.accepts_graphemes(test);
            let r2 = dfa2.accepts_graphemes(test);
            assert_eq!(intersection.accepts_graphemes(test), r1 && r2);
            assert_eq!(union.accepts_graphemes(test), r1 || r2);
            assert_eq!(difference.accepts_graphemes(test), r1 && !r2);
            assert_eq!(symmetric_difference.accepts_graphemes(test), r1 != r2);
        }
    }

    #[test]
    fn dfa_self_union(dfa in fixed_alphabet_dfa(20, 'a'..='z', ('a'..='z').count())) {
        let union = dfa.union(&dfa).unwrap();
        assert!(union.equivalent_to(&dfa));
    }

    #[test]
    fn dfa_self_intersection(dfa in fixed_alphabet_dfa(20, 'a'..='z', ('a'..='z').count())) {
        let intersection = dfa.intersection(&dfa).unwrap();
        assert!(intersection.equivalent_to(&dfa));
    }

    #[test]
    fn dfa_inversion_tautologies(
        dfa in fixed_alphabet_dfa(20, 'a'..='f', ('a'..='f').count()),
        tests in prop::collection::vec("[a-f]+", 100)
    ) {
        let inv_dfa = {
            let mut dfa = dfa.clone();
            dfa.invert();
            dfa
        };
        let union = dfa.union(&inv_dfa).unwrap();
        let intersection = dfa.intersection(&inv_dfa).unwrap();
        tests.iter().for_each(|test| {
            assert!(union.accepts_graphemes(test));
            assert!(union.has_reachable_accepting_state());
            assert!(!intersection.accepts_graphemes(test));
            assert!(!intersection.has_reachable_accepting_state());
        });
    }

    #[test]
    fn regex(
        regex_str in random_regex(),
        tests in prop::collection::vec("[a-z]+", 20)
    ) {
        let regex = parser::regex(&regex_str).unwrap();
        let mut dfa = regex.to_nfa().to_dfa();
        dfa.minimize();
        let lib_regex = LibRegex::new(&format!("^({regex_str})$")).unwrap();

        let accepted_chars = regex_str.chars().collect::<HashSet<_>>();

        tests.iter().for_each(|test|{
            // Need to filter string since it can't use characters not in the regex itself
            // due to the DFA alphabet
            let s = test.chars().filter(|c| accepted_chars.contains(c)).collect::<String>();
            assert_eq!(dfa.accepts_graphemes(&s), lib_regex.is_match(&s));
        })
    }
}

prop_compose! {
    fn nfa(max_states: usize, max_alphabet_size: usize)
        (num_states in 1..max_states, alphabet_size in 1..max_alphabet_size)
        (
            states in state_names(num_states),
            alphabet in alphabet_elems(alphabet_size),
            initial_state in 0..num_states,
            accepting_states in prop::collection::vec(any::<bool>(), num_states..=num_states),
            epsilon_transitions in prop::collection::vec(epsilon_transitions(num_states), num_states..=num_states),
            transitions in prop::collection::vec(nfa_transitions(num_states, alphabet_size), num_states..=num_states)
        )
    -> Nfa {
        let states = states.into_iter().zip(
            accepting_states.into_iter().zip(
                transitions.into_iter().zip(
                    epsilon_transitions.into_iter()
                )
            )
        ).enumerate().map(|(idx, (state_name, (accepting, (transitions, epsilon_transitions))))|
            NfaState {
                name: Rc::from(state_name.as_str()),
                initial: idx == initial_state,
                accepting,
                epsilon_transitions,
                transitions
            }
        ).collect();

        Nfa {
            alphabet: alphabet.iter().map(|entry| Rc::from(entry.as_str())).collect(),
            states,
            initial_state
        }
    }
}

prop_compose! {
    fn fixed_alphabet_dfa(max_states: usize, alphabet: RangeInclusive<char>, alphabet_size: usize)
        (num_states in 1..max_states)
        (
            states in state_names(num_states),
            initial_state in 0..num_states,
            accepting_states in prop::collection::vec(any::<bool>(), num_states..=num_states),
            transitions in prop::collection::vec(dfa_transitions(num_states, alphabet_size), num_states..=num_states)
        )
    -> Dfa {
        let states = states.into_iter().zip(
            accepting_states.into_iter().zip(
                transitions.into_iter()
            )
        ).enumerate().map(|(idx, (state_name, (accepting, transitions)))|
            DfaState {
                name: Rc::from(state_name.as_str()),
                initial: idx == initial_state,
                accepting,
                transitions
            }
        ).collect();

        let mut alphabet: Vec<Rc<str>> = alphabet.clone().map(|c| Rc::from(c.to_string())).collect();
        alphabet.shuffle(&mut thread_rng());
        let alphabet = Rc::from(alphabet);

        Dfa {
            alphabet,
            states,
            initial_state
        }
    }
}

prop_compose! {
    fn dfa(max_states: usize, max_alphabet_size: usize)
        (num_states in 1..max_states, alphabet_size in 1..max_alphabet_size)
        (
            states in state_names(num_states),
            alphabet in alphabet_elems(alphabet_size),
            initial_state in 0..num_states,
            accepting_states in prop::collection::vec(any::<bool>(), num_states..=num_states),
            transitions in prop::collection::vec(dfa_transitions(num_states, alphabet_size), num_states..=num_states)
        )
    -> Dfa {
        let states = states.into_iter().zip(
            accepting_states.into_iter().zip(
                transitions.into_iter()
            )
        ).enumerate().map(|(idx, (state_name, (accepting, transitions)))|
            DfaState {
                name: Rc::from(state_name.as_str()),
                initial: idx == initial_state,
                accepting,
                transitions
            }
        ).collect();

        Dfa {
            alphabet: alphabet.iter().map(|entry| Rc::from(entry.as_str())).collect(),
            states,
            initial_state
        }
    }
}

prop_compose! {
    // Always total: every generated index is wrapped in `Some`, matching the DFAs these tests
    // expect to compare against full table round-trips and against each other.
    fn dfa_transitions(states: usize, alphabet_size: usize)
        (transitions in prop::collection::vec(0..states, alphabet_size..=alphabet_size))
    -> Vec<Option<usize>> {
        transitions.into_iter().map(Some).collect()
    }
}

prop_compose! {
    fn epsilon_transitions(states: usize)
        (transitions in prop::collection::vec(any::<bool>(), states..=states))
    -> Vec<usize> {
        let mut rng = thread_rng();
        let mut transitions: Vec<_> = transitions.into_iter()
            .enumerate()
            .filter_map(|(idx, b)| b.then_some(idx))
            .collect();
        transitions.shuffle(&mut rng);
        transitions
    }
}

prop_compose! {
    fn nfa_transitions(states: usize, alphabet_size: usize)
        (transitions in prop::collection::vec(
            // This is a bytevec saying for each state if it has a transition there or not
            // HashMap would be a better fit but maybe too much rejections?
            prop::collection::vec(any::<bool>(), states..=states),
            alphabet_size..=alphabet_size
        ))
    -> Vec<Vec<usize>> {
        let mut rng = thread_rng();
        transitions.into_iter()
            .map(|row| {
                let mut row: Vec<usize> = row.into_iter()
                    .enumerate()
                    .filter_map(|(idx, b)| b.then_some(idx))
                    .collect();
                row.as_mut_slice().shuffle(&mut rng);
                row
            })
            .collect()
    }
}

prop_compose! {
    fn state_names(count: usize)
        (names in filtered_set(count, r"[^\s#{}]+", &["ε", "eps", "→", "->", "*"]))
    -> HashSet<String> {
        names
    }
}

prop_compose! {
    fn simple_alphabet(count: usize)
        (names in filtered_set(std::cmp::max(count, 4), "[a-e]", &[]))
    -> HashSet<String> {
        names
    }
}

prop_compose! {
    fn alphabet_elems(count: usize)
        (names in filtered_set(count, r"[^\s#{}]+", &["ε", "eps", "→", "->", "*"]))
    -> HashSet<String> {
        names
    }
}

prop_compose! {
    fn filtered_set(count: usize, regex: &'static str, deny: &'static [&'static str])
        (names in prop::collection::hash_set(
            regex.prop_filter( // No whitespace
                "name should not be reserved",
                |s| !deny.contains(&s.as_str()) && !s.contains(|c: char| c.is_whitespace())
            ),
            count..=count
        ))
    -> HashSet<String> {
        names
    }
}

prop_compose! {
    /// A small random context-free grammar: `num_non_terminals` heads named `A`, `B`, … each with
    /// one to three bodies of zero to three symbols, drawn from a 3-letter terminal alphabet or
    /// any of the grammar's own non-terminals (including itself, so recursive grammars are
    /// common). Built through the text format so it exercises the same parsing path a CLI user
    /// would.
    fn cfg_grammar(max_non_terminals: usize)
        (num_non_terminals in 1..=max_non_terminals)
        (bodies_per_head in prop::collection::vec(grammar_bodies(num_non_terminals), num_non_terminals))
    -> Grammar {
        let mut g = Grammar::new();
        for (idx, bodies) in bodies_per_head.into_iter().enumerate() {
            let line = format!("{} -> {}", non_terminal_name(idx), bodies.join(" | "));
            g.add_production_from_text(&line).unwrap();
        }
        g
    }
}

fn non_terminal_name(idx: usize) -> char {
    (b'A' + idx as u8) as char
}

fn grammar_bodies(num_non_terminals: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(grammar_body(num_non_terminals), 1..=3)
}

fn grammar_body(num_non_terminals: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(grammar_symbol(num_non_terminals), 0..4).prop_map(|symbols| {
        if symbols.is_empty() {
            "ε".to_string()
        } else {
            symbols.concat()
        }
    })
}

fn grammar_symbol(num_non_terminals: usize) -> impl Strategy<Value = String> {
    prop_oneof![
        3 => "[a-c]".prop_map(|s| s),
        2 => (0..num_non_terminals).prop_map(|idx| non_terminal_name(idx).to_string()),
    ]
}

fn random_regex() -> impl Strategy<Value = String> {
    // `?` and bracket classes are added to the recursive cases below: both have a direct
    // equivalent in the `regex` crate used as the oracle, so they don't disturb the comparison.
    // Literal `ε` and `\`-escapes are exercised by dedicated unit tests in the regex submodules
    // instead, since `ε` means "the empty word" here but matches the literal character in the
    // oracle crate, which would make the two sides disagree for reasons unrelated to this crate.
    "[a-z]".prop_recursive(20, 1024, 20, |inner| {
        prop_oneof![
            10 => prop::collection::vec(inner.clone(), 1..20)
                .prop_map(|vec| format!("({})", vec.join(""))),
            10 => prop::collection::vec(inner.clone(), 1..20).prop_map(|vec| vec.join("|")),
            3 => inner.clone().prop_map(|r| format!("({r})*")),
            3 => inner.clone().prop_map(|r| format!("({r})+")),
            3 => inner.clone().prop_map(|r| format!("({r})?")),
            2 => ("[a-z]", "[a-z]", "[a-z]").prop_map(|(a, b, c)| format!("[{a}{b}{c}]")),
        ]
    })
}
