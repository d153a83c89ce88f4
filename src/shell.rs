//! Shell state and the wait coordinator
//!
//! The [`Shell`] owns the job table and the shell's own process-group id,
//! and coordinates the two wait modes: the non-blocking *drain* run at
//! every prompt and before every built-in, and the blocking *foreground
//! wait* that hands the controlling terminal to a job, reaps status
//! changes until the job leaves `Running`, and takes the terminal back.

use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitPidFlag};
use nix::unistd::{getpid, setpgid, Pid};
use thiserror::Error;
use tracing::{debug, error};

use crate::executor::{self, LaunchError};
use crate::job::{JobStatus, JobTable};
use crate::lexer;
use crate::parser::{self, ParseError};
use crate::signals;
use crate::terminal;

#[derive(Error, Debug)]
pub enum ShellError {
    #[error("{0}")]
    Parse(#[from] ParseError),
    #[error("{0}")]
    Launch(#[from] LaunchError),
    #[error("cannot take control of the terminal: {0}")]
    Terminal(Errno),
}

/// The single shell value threaded through the prompt loop.
pub struct Shell {
    pgid: Pid,
    pub jobs: JobTable,
}

impl Shell {
    /// Construct the shell: claim a process group of our own, take the
    /// terminal, and ignore the signals the terminal generates. Failure to
    /// set our own pgid is the one fatal startup error.
    pub fn new() -> Result<Self, ShellError> {
        signals::ignore_job_control_signals().map_err(ShellError::Terminal)?;

        let pgid = getpid();
        setpgid(Pid::from_raw(0), Pid::from_raw(0)).map_err(ShellError::Terminal)?;
        if let Err(err) = terminal::give_terminal_to(pgid) {
            debug!(?err, "could not claim terminal at startup");
        }

        Ok(Shell {
            pgid,
            jobs: JobTable::new(),
        })
    }

    /// Tokenize, parse, launch, and (for foreground jobs) wait.
    ///
    /// Empty input is nothing to do. Errors do not cross the prompt-loop
    /// boundary: the caller reports them and the loop continues.
    pub fn run_command(&mut self, line: &str) -> Result<(), ShellError> {
        let tokens = lexer::lex(line);
        if tokens.is_empty() {
            return Ok(());
        }

        let mut job = parser::parse(tokens, line.to_string())?;
        let pgid = executor::launch(&job)?;
        job.pgid = pgid;

        let background = job.background;
        self.jobs.add(job);

        if !background {
            self.wait_foreground(pgid);
        }
        Ok(())
    }

    /// Non-blocking reap: pick up every pending child status change and
    /// reconcile it into the job table.
    pub fn drain(&mut self) {
        loop {
            match waitpid(None, Some(WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED)) {
                Ok(status) => {
                    if !self.jobs.reconcile(status) {
                        break;
                    }
                }
                Err(Errno::ECHILD) => break,
                Err(err) => {
                    error!(?err, "waitpid failed while draining");
                    break;
                }
            }
        }
    }

    /// Blocking wait on the foreground job: grant it the terminal, reap
    /// until it exits or stops, then reclaim the terminal for the shell.
    pub fn wait_foreground(&mut self, pgid: Pid) {
        if let Err(err) = terminal::give_terminal_to(pgid) {
            debug!(?err, pgid = pgid.as_raw(), "could not hand terminal to job");
        }

        loop {
            match waitpid(None, Some(WaitPidFlag::WUNTRACED)) {
                Ok(status) => {
                    if !self.jobs.reconcile(status) {
                        break;
                    }
                    let still_running = self
                        .jobs
                        .find_by_pgid(pgid)
                        .is_some_and(|job| job.status == JobStatus::Running);
                    if !still_running {
                        break;
                    }
                }
                Err(Errno::ECHILD) => break,
                Err(err) => {
                    error!(?err, "waitpid failed in foreground wait");
                    break;
                }
            }
        }

        if let Err(err) = terminal::give_terminal_to(self.pgid) {
            debug!(?err, "could not reclaim terminal");
        }
    }

    /// Print one completion notice per finished background job, then drop
    /// every completed job. Notices always print before the prune.
    pub fn notify_completed(&mut self) {
        for line in self.jobs.completed_report_lines() {
            println!("{line}");
        }
        self.jobs.prune_done();
    }
}
