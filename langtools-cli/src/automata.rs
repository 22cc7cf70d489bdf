use clap::ValueEnum;
use langtools::dfa::Dfa;
use langtools::nfa::Nfa;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("parsing regex: {0}")]
    Regex(#[from] langtools::error::Error),
}

/// Which artifact a `regex` invocation should print or test against.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AutomataType {
    Nfa,
    #[default]
    Dfa,
    MinDfa,
}

/// A compiled regex, widened to whichever automaton type the caller asked for. Mirrors the
/// teacher's own `Automata` wrapper: a thin enum over the crate's automaton types plus the
/// conversions between them, used as the CLI's single dispatch point instead of duplicating the
/// match-on-type logic at each call site.
#[derive(Debug, Clone, PartialEq)]
pub enum Automata {
    Nfa(Nfa),
    Dfa(Dfa),
}

impl Automata {
    /// Compiles `text` as a regex and lowers it straight to an NFA via Thompson construction.
    pub fn load_regex(text: &str) -> Result<Self, Error> {
        let regex = langtools::parser::regex(text)?;
        Ok(Self::Nfa(regex.to_nfa()))
    }

    /// Converts to `target`, minimizing when `target` is [`AutomataType::MinDfa`]. Returns whether
    /// a conversion or minimization actually took place.
    pub fn convert_to(self, target: AutomataType) -> (Self, bool) {
        match (self, target) {
            (Self::Nfa(nfa), AutomataType::Nfa) => (Self::Nfa(nfa), false),
            (Self::Dfa(dfa), AutomataType::Dfa) => (Self::Dfa(dfa), false),
            (Self::Nfa(nfa), AutomataType::Dfa) => (Self::Dfa(nfa.to_dfa()), true),
            (Self::Dfa(dfa), AutomataType::Nfa) => (Self::Nfa(dfa.to_nfa()), true),
            (Self::Nfa(nfa), AutomataType::MinDfa) => {
                let mut dfa = nfa.to_dfa();
                dfa.minimize();
                (Self::Dfa(dfa), true)
            }
            (Self::Dfa(mut dfa), AutomataType::MinDfa) => {
                let before = dfa.states().len();
                dfa.minimize();
                let changed = dfa.states().len() != before;
                (Self::Dfa(dfa), changed)
            }
        }
    }

    /// Tests `word` for acceptance, segmenting it into grapheme clusters first.
    pub fn accepts(&self, word: &str) -> bool {
        match self {
            Self::Nfa(nfa) => nfa.accepts_graphemes(word),
            Self::Dfa(dfa) => dfa.accepts_graphemes(word),
        }
    }

    pub fn table(&self) -> String {
        match self {
            Self::Nfa(nfa) => nfa.to_table(),
            Self::Dfa(dfa) => dfa.to_table(),
        }
    }
}
