//! Tokenization for yash
//!
//! A command line is split on runs of ASCII space or tab. Tokens are not
//! interpreted here; `<`, `>`, `2>`, `|` and `&` only acquire meaning in
//! the parser.

use nom::{
    bytes::complete::{take_while, take_while1},
    combinator::map,
    multi::many0,
    sequence::preceded,
    IResult,
};

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Consume a (possibly empty) run of blanks.
fn blanks(input: &str) -> IResult<&str, &str> {
    take_while(is_blank)(input)
}

/// Consume one token: a maximal run of non-blank characters.
fn token(input: &str) -> IResult<&str, String> {
    map(take_while1(|c| !is_blank(c)), str::to_string)(input)
}

/// Split a command line into tokens.
///
/// Empty input (or input consisting only of blanks) yields an empty
/// vector, which the caller treats as "nothing to do".
pub fn lex(input: &str) -> Vec<String> {
    // many0 cannot fail: it stops at the first position where no further
    // token can be consumed, which for this grammar is end of input or a
    // trailing run of blanks.
    match many0(preceded(blanks, token))(input) {
        Ok((_, tokens)) => tokens,
        Err(_) => Vec::new(),
    }
}
