//! Common test utilities for yash integration tests

use nix::unistd::Pid;

pub use yash::{lex, parse, Job, JobStatus, JobTable, ParseError};

/// Tokenize and parse one command line.
pub fn parse_line(line: &str) -> Result<Job, ParseError> {
    parse(lex(line), line.to_string())
}

/// Parse a line and place it in the table under the given pgid, the way
/// the shell does once the launcher has returned.
#[allow(dead_code)]
pub fn launch_into(table: &mut JobTable, pgid: i32, line: &str) {
    let mut job = parse_line(line).expect("test command must parse");
    job.pgid = Pid::from_raw(pgid);
    table.add(job);
}
