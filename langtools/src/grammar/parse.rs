//! Grammar line-file format: `Head -> a1 | a2 | …` lines, `{Name}` multi-character non-terminals,
//! `#` comments, blank lines, and `---` as a separator between independent grammars in one file
//! (§6). Comment/blank-line recognition mirrors [`crate::parser::fa`]'s conventions; per-line head
//! and body tokenizing is hand-rolled, the same way [`crate::regex::shunting_yard`] hand-rolls its
//! tokenizer, since dispatching on `{`/uppercase-letter/other-glyph does not fit a combinator's
//! precedence-climbing shape any better here than it does there.

use crate::error::Error;
use crate::grammar::{Grammar, Symbol};
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{not_line_ending, space0};
use nom::combinator::{all_consuming, opt, value};
use nom::sequence::pair;
use nom::IResult;

fn comment(input: &str) -> IResult<&str, ()> {
    value((), pair(tag("#"), not_line_ending))(input)
}

fn space_comment(input: &str) -> IResult<&str, ()> {
    value((), pair(space0, opt(comment)))(input)
}

/// A line containing only whitespace and/or a `#` comment.
fn is_blank_or_comment(line: &str) -> bool {
    all_consuming(space_comment)(line).is_ok()
}

/// Splits `text` into independent grammars separated by a `---` line, skipping blank and comment
/// lines, and parses each production line into the corresponding [`Grammar`].
pub fn parse_grammars(text: &str) -> Result<Vec<Grammar>, Error> {
    let mut grammars = Vec::new();
    let mut current = Grammar::new();
    let mut has_productions = false;

    for line in text.lines() {
        if is_blank_or_comment(line) {
            continue;
        }
        if line.trim() == "---" {
            if has_productions {
                grammars.push(std::mem::take(&mut current));
                has_productions = false;
            }
            continue;
        }
        current.add_production_from_text(line)?;
        has_productions = true;
    }
    if has_productions {
        grammars.push(current);
    }
    Ok(grammars)
}

/// Parses one `Head -> a1 | a2 | …` line into its head symbol and alternative bodies, per §4.8.
pub(crate) fn parse_production_line(line: &str) -> Result<(Symbol, Vec<Vec<Symbol>>), Error> {
    let line = line.trim();
    let arrow = line.find("->").ok_or_else(|| {
        Error::MalformedGrammarLine(format!("missing '->' in production line: {line:?}"))
    })?;
    let head_str = line[..arrow].trim();
    let body_str = &line[arrow + 2..];

    let head_tokens = tokenize_symbols(head_str)?;
    let head = match head_tokens.as_slice() {
        [single] if !single.is_terminal() => single.clone(),
        _ => {
            return Err(Error::MalformedGrammarLine(format!(
                "production head must be a single non-terminal, found {head_str:?}"
            )))
        }
    };

    let mut bodies = Vec::new();
    for alt_str in body_str.split('|') {
        let alt_str = alt_str.trim();
        if alt_str.is_empty() {
            return Err(Error::MalformedGrammarLine(format!(
                "empty alternative in production line: {line:?}"
            )));
        }
        bodies.push(tokenize_symbols(alt_str)?);
    }
    if bodies.is_empty() {
        return Err(Error::MalformedGrammarLine(format!(
            "production line has no alternatives: {line:?}"
        )));
    }

    Ok((head, bodies))
}

/// Tokenizes a head or single alternative into its symbol sequence. A bare uppercase ASCII letter
/// or a `{Name}` brace group denotes a non-terminal (id `0`); every other non-whitespace glyph,
/// including `ε`, is a terminal. Whitespace between symbols is insignificant and skipped.
fn tokenize_symbols(text: &str) -> Result<Vec<Symbol>, Error> {
    let mut symbols = Vec::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c.is_whitespace() {
            continue;
        }
        if c == '{' {
            let mut name = String::new();
            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(inner) => name.push(inner),
                    None => {
                        return Err(Error::MalformedGrammarLine(format!(
                            "unclosed '{{' in {text:?}"
                        )))
                    }
                }
            }
            if name.is_empty() {
                return Err(Error::MalformedGrammarLine(format!(
                    "empty non-terminal name '{{}}' in {text:?}"
                )));
            }
            symbols.push(Symbol::non_terminal(name, 0));
        } else if c == '}' {
            return Err(Error::MalformedGrammarLine(format!(
                "unmatched '}}' in {text:?}"
            )));
        } else if c == 'ε' {
            symbols.push(Symbol::epsilon());
        } else if c.is_ascii_uppercase() {
            symbols.push(Symbol::non_terminal(c.to_string(), 0));
        } else {
            symbols.push(Symbol::terminal(c));
        }
    }
    Ok(symbols)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_production() {
        let (head, bodies) = parse_production_line("S -> aSa | bSb | ε").unwrap();
        assert_eq!(head, Symbol::non_terminal("S", 0));
        assert_eq!(
            bodies,
            vec![
                vec![
                    Symbol::terminal('a'),
                    Symbol::non_terminal("S", 0),
                    Symbol::terminal('a')
                ],
                vec![
                    Symbol::terminal('b'),
                    Symbol::non_terminal("S", 0),
                    Symbol::terminal('b')
                ],
                vec![Symbol::epsilon()],
            ]
        );
    }

    #[test]
    fn parses_brace_non_terminal() {
        let (head, bodies) = parse_production_line("A -> {Foo}x").unwrap();
        assert_eq!(head, Symbol::non_terminal("A", 0));
        assert_eq!(
            bodies,
            vec![vec![Symbol::non_terminal("Foo", 0), Symbol::terminal('x')]]
        );
    }

    #[test]
    fn rejects_missing_arrow() {
        assert!(matches!(
            parse_production_line("S aSa"),
            Err(Error::MalformedGrammarLine(_))
        ));
    }

    #[test]
    fn rejects_unclosed_brace() {
        assert!(matches!(
            parse_production_line("A -> {Foo"),
            Err(Error::MalformedGrammarLine(_))
        ));
    }

    #[test]
    fn strips_comments_and_separators() {
        let text = "# a comment\nS -> a\n\n---\n\nA -> b\n";
        let grammars = parse_grammars(text).unwrap();
        assert_eq!(grammars.len(), 2);
        assert_eq!(grammars[0].start_symbol(), Some(&Symbol::non_terminal("S", 0)));
        assert_eq!(grammars[1].start_symbol(), Some(&Symbol::non_terminal("A", 0)));
    }
}
