//! Parsing for yash
//!
//! Folds a token sequence into a [`Job`]: one or two process specs,
//! per-process redirection filenames, and a background flag. The parser is
//! a single pass with a cursor; the "current process" switches from the
//! first to the second spec when `|` is consumed.

use thiserror::Error;

use crate::job::{Job, ProcessSpec};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("'{0}' must appear between a command and a filename")]
    MisplacedRedirect(String),
    #[error("'|' must separate two commands")]
    MisplacedPipe,
    #[error("at most two commands may be joined by '|'")]
    PipelineTooLong,
    #[error("'&' may only end a command")]
    MisplacedBackground,
}

/// Parser state: a cursor over the token vector.
pub struct Parser {
    tokens: Vec<String>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<String>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&str> {
        self.tokens.get(self.pos).map(String::as_str)
    }

    fn advance(&mut self) -> Option<String> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// True when the token at the cursor is the final one.
    fn at_last(&self) -> bool {
        self.pos + 1 == self.tokens.len()
    }

    fn is_alone(&self) -> bool {
        self.tokens.len() == 1
    }

    /// Fold the whole token sequence into a job description.
    pub fn parse(mut self, command: String) -> Result<Job, ParseError> {
        let mut first = ProcessSpec::new();
        let mut second: Option<ProcessSpec> = None;
        let mut background = false;

        while let Some(token) = self.peek() {
            let token = token.to_string();
            let last = self.at_last();
            let current = second.as_mut().unwrap_or(&mut first);

            match token.as_str() {
                "<" | ">" | "2>" => {
                    // A redirection needs a command word before it and a
                    // filename after it.
                    if current.argv.is_empty() || last {
                        return Err(ParseError::MisplacedRedirect(token));
                    }
                    self.advance();
                    let filename = self.advance().ok_or(ParseError::MisplacedRedirect(token.clone()))?;
                    match token.as_str() {
                        "<" => current.stdin_file = Some(filename),
                        ">" => current.stdout_file = Some(filename),
                        _ => current.stderr_file = Some(filename),
                    }
                }
                "|" => {
                    if current.argv.is_empty() || last {
                        return Err(ParseError::MisplacedPipe);
                    }
                    if second.is_some() {
                        return Err(ParseError::PipelineTooLong);
                    }
                    self.advance();
                    second = Some(ProcessSpec::new());
                }
                "&" => {
                    if !last || self.is_alone() {
                        return Err(ParseError::MisplacedBackground);
                    }
                    self.advance();
                    background = true;
                }
                _ => {
                    current.argv.push(token);
                    self.advance();
                }
            }
        }

        // `a | &` reaches here with an empty second argv.
        if second.as_ref().is_some_and(|p| p.argv.is_empty()) {
            return Err(ParseError::MisplacedPipe);
        }

        Ok(Job::new(command, first, second, background))
    }
}

/// Parse a token sequence, remembering the original command text.
pub fn parse(tokens: Vec<String>, command: String) -> Result<Job, ParseError> {
    Parser::new(tokens).parse(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    fn parse_line(line: &str) -> Result<Job, ParseError> {
        parse(lex(line), line.to_string())
    }

    #[test]
    fn parse_simple_command() {
        let job = parse_line("ls -la /tmp").unwrap();
        assert_eq!(job.first.argv, vec!["ls", "-la", "/tmp"]);
        assert!(job.second.is_none());
        assert!(!job.background);
        assert_eq!(job.command, "ls -la /tmp");
    }

    #[test]
    fn parse_redirections() {
        let job = parse_line("sort < in > out 2> err").unwrap();
        assert_eq!(job.first.argv, vec!["sort"]);
        assert_eq!(job.first.stdin_file.as_deref(), Some("in"));
        assert_eq!(job.first.stdout_file.as_deref(), Some("out"));
        assert_eq!(job.first.stderr_file.as_deref(), Some("err"));
    }

    #[test]
    fn parse_pipeline_with_per_process_redirects() {
        let job = parse_line("cat < in | wc -l > out").unwrap();
        assert_eq!(job.first.argv, vec!["cat"]);
        assert_eq!(job.first.stdin_file.as_deref(), Some("in"));
        let second = job.second.unwrap();
        assert_eq!(second.argv, vec!["wc", "-l"]);
        assert_eq!(second.stdout_file.as_deref(), Some("out"));
    }

    #[test]
    fn parse_background_job() {
        let job = parse_line("sleep 30 &").unwrap();
        assert!(job.background);
        assert_eq!(job.first.argv, vec!["sleep", "30"]);
        assert_eq!(job.command, "sleep 30 &");
    }

    #[test]
    fn redirect_needs_a_preceding_word() {
        assert_eq!(
            parse_line("< in cat"),
            Err(ParseError::MisplacedRedirect("<".into()))
        );
        // Also for the second process of a pipeline.
        assert_eq!(
            parse_line("cat | > out wc"),
            Err(ParseError::MisplacedRedirect(">".into()))
        );
    }

    #[test]
    fn redirect_needs_a_filename() {
        assert_eq!(
            parse_line("cat <"),
            Err(ParseError::MisplacedRedirect("<".into()))
        );
        assert_eq!(
            parse_line("cat 2>"),
            Err(ParseError::MisplacedRedirect("2>".into()))
        );
    }

    #[test]
    fn pipe_needs_both_sides() {
        assert_eq!(parse_line("| wc"), Err(ParseError::MisplacedPipe));
        assert_eq!(parse_line("cat |"), Err(ParseError::MisplacedPipe));
    }

    #[test]
    fn pipeline_of_three_is_rejected() {
        assert_eq!(parse_line("a | b | c"), Err(ParseError::PipelineTooLong));
    }

    #[test]
    fn background_must_be_final() {
        assert_eq!(parse_line("sleep & 30"), Err(ParseError::MisplacedBackground));
        assert_eq!(parse_line("&"), Err(ParseError::MisplacedBackground));
    }

    #[test]
    fn argv_round_trips_through_the_parser() {
        let line = "grep -n main src/lib.rs";
        let job = parse_line(line).unwrap();
        assert_eq!(job.first.argv.join(" "), line);
    }
}
