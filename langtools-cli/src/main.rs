mod automata;

use automata::{Automata, AutomataType};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

/// Regex/automata compilation and context-free grammar normalization, from the command line.
#[derive(Parser)]
#[command(name = "langtools", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a regular expression and print or test the resulting automaton
    Regex(RegexArgs),
    /// Normalize a context-free grammar to Chomsky Normal Form and recognize words with CYK
    Grammar(GrammarArgs),
}

#[derive(Args)]
struct RegexArgs {
    /// The regular expression, or a path to a file containing one if --file is set
    pattern: String,

    /// Treat `pattern` as a path to a file holding the regex, instead of the regex itself
    #[arg(long)]
    file: bool,

    /// Which automaton to print or test against
    #[arg(long = "as", value_enum, default_value_t = AutomataType::Dfa)]
    as_type: AutomataType,

    /// Test this word for acceptance instead of printing a transition table
    #[arg(long)]
    test: Option<String>,
}

#[derive(Args)]
struct GrammarArgs {
    /// Path to a grammar file in the `Head -> a1 | a2 | …` line format
    path: PathBuf,

    /// Expansion budget passed to ε-removal (§4.10's nullable-occurrence variant ceiling)
    #[arg(long, default_value_t = 4096)]
    budget: usize,

    /// Recognize this word with CYK against the normalized grammar, instead of printing it
    #[arg(long)]
    test: Option<String>,

    /// Index of the grammar to use, if the file holds more than one separated by `---`
    #[arg(long, default_value_t = 0)]
    index: usize,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = match &cli.command {
        Command::Regex(args) => run_regex(args),
        Command::Grammar(args) => run_grammar(args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run_regex(args: &RegexArgs) -> Result<(), String> {
    let text = if args.file {
        fs::read_to_string(&args.pattern)
            .map_err(|e| format!("reading {:?}: {e}", args.pattern))?
    } else {
        args.pattern.clone()
    };

    let automata = Automata::load_regex(&text).map_err(|e| e.to_string())?;
    let (automata, _) = automata.convert_to(args.as_type);

    match &args.test {
        Some(word) => println!("{}", automata.accepts(word)),
        None => println!("{}", automata.table()),
    }
    Ok(())
}

fn run_grammar(args: &GrammarArgs) -> Result<(), String> {
    let text =
        fs::read_to_string(&args.path).map_err(|e| format!("reading {:?}: {e}", args.path))?;
    let grammars = langtools::parser::grammar(&text).map_err(|e| e.to_string())?;
    let grammar = grammars.get(args.index).ok_or_else(|| {
        format!(
            "{:?} only contains {} grammar(s), index {} is out of range",
            args.path,
            grammars.len(),
            args.index
        )
    })?;

    let cnf = grammar
        .normalize_to_cnf(args.budget)
        .map_err(|e| e.to_string())?;

    match &args.test {
        Some(word) => println!("{}", cnf.cyk_accepts(word)),
        None => println!("{cnf}"),
    }
    Ok(())
}
