//! yash - yet another shell
//!
//! A minimal interactive UNIX shell with exact job-control semantics:
//! foreground and background execution, two-process pipelines, file
//! redirections, and the `fg` / `bg` / `jobs` built-ins.
//!
//! # Architecture
//!
//! The shell is a single-threaded, event-reactive process; all concurrency
//! lives in the child process groups it launches. One [`Shell`] value owns
//! the [`JobTable`] and is threaded through the prompt loop:
//!
//! 1. Tokenize (lexer) - whitespace splitting only.
//! 2. Parse (parser) - fold tokens into a [`Job`] of one or two processes.
//! 3. Launch (executor) - fork a process group per job; pipelines get a
//!    supervisor child so each job maps to exactly one pgid.
//! 4. Reconcile (job table) - map `waitpid` results onto job state.
//! 5. Hand off the terminal (terminal/shell) - the shell pgid owns the
//!    controlling terminal except while a foreground job runs.
//!
//! # Example
//!
//! ```rust
//! use yash::{lex, parse};
//!
//! let line = "cat < notes.txt | wc -l";
//! let job = parse(lex(line), line.to_string()).unwrap();
//! assert!(job.is_pipeline());
//! assert_eq!(job.first.argv, vec!["cat"]);
//! ```

pub mod builtins;
pub mod executor;
pub mod job;
pub mod lexer;
pub mod parser;
pub mod redirect;
pub mod repl;
pub mod shell;
pub mod signals;
pub mod terminal;

// Re-export commonly used items
pub use builtins::{try_builtin, BuiltinResult};
pub use job::{Job, JobNumber, JobStatus, JobTable, ProcessSpec};
pub use lexer::lex;
pub use parser::{parse, ParseError};
pub use repl::Repl;
pub use shell::{Shell, ShellError};
