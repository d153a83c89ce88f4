//! The prompt loop
//!
//! Glues the collaborators together. Each iteration: reap finished
//! children, report and prune completed jobs, read one line, dispatch a
//! built-in or parse and launch a job, and wait synchronously when the job
//! runs in the foreground. End of input ends the shell.

use std::env;
use std::path::PathBuf;

use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use tracing::debug;

use crate::builtins::{self, BuiltinResult};
use crate::shell::{Shell, ShellError};

const PROMPT: &str = "# ";
const HISTORY_FILE: &str = ".yash_history";

/// Interactive read-parse-execute loop over a [`Shell`].
pub struct Repl {
    editor: DefaultEditor,
    shell: Shell,
}

impl Repl {
    pub fn new(shell: Shell) -> RlResult<Self> {
        Ok(Repl {
            editor: DefaultEditor::new()?,
            shell,
        })
    }

    /// Run until end of input. Returns cleanly on EOF; the job table is
    /// released on drop.
    pub fn run(&mut self) -> RlResult<()> {
        let history_path = history_path();
        if let Some(ref path) = history_path {
            let _ = self.editor.load_history(path);
        }

        loop {
            // Pick up whatever finished while the last command ran, and
            // tell the user about it before the next prompt.
            self.shell.drain();
            self.shell.notify_completed();

            match self.editor.readline(PROMPT) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = self.editor.add_history_entry(line.as_str());
                    }

                    if let BuiltinResult::Handled = builtins::try_builtin(&line, &mut self.shell) {
                        continue;
                    }

                    match self.shell.run_command(&line) {
                        Ok(()) => {}
                        Err(err @ ShellError::Parse(_)) => println!("-yash: {err}"),
                        Err(err) => eprintln!("-yash: {err}"),
                    }
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => {
                    debug!("end of input");
                    break;
                }
                Err(err) => return Err(err),
            }
        }

        if let Some(ref path) = history_path {
            let _ = self.editor.save_history(path);
        }
        Ok(())
    }
}

fn history_path() -> Option<PathBuf> {
    env::var_os("HOME").map(|home| PathBuf::from(home).join(HISTORY_FILE))
}
