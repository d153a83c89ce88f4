//! The job-control built-ins: `jobs`, `bg`, `fg`
//!
//! Built-in names are matched against the raw command line, not the token
//! vector. Every built-in drains pending child notifications first and
//! finishes by reporting completed jobs.

use nix::sys::signal::{killpg, Signal};
use tracing::debug;

use crate::job::JobStatus;
use crate::shell::Shell;

/// Outcome of built-in dispatch.
pub enum BuiltinResult {
    Handled,
    NotHandled,
}

/// Dispatch `line` if it names a built-in.
pub fn try_builtin(line: &str, shell: &mut Shell) -> BuiltinResult {
    match line {
        "jobs" => jobs(shell),
        "bg" => bg(shell),
        "fg" => fg(shell),
        _ => return BuiltinResult::NotHandled,
    }
    BuiltinResult::Handled
}

/// List the job table: completed background jobs are reported and pruned
/// first, then every running or stopped background job is printed.
fn jobs(shell: &mut Shell) {
    shell.drain();
    shell.notify_completed();

    let table = &shell.jobs;
    for job in table.iter().filter(|j| j.background) {
        match job.status {
            JobStatus::Running | JobStatus::Stopped => println!("{}", table.status_line(job)),
            JobStatus::Done => {}
        }
    }
}

/// Resume the most recent stopped background job, leaving it in the
/// background. No stopped job is a no-op.
fn bg(shell: &mut Shell) {
    shell.drain();

    if let Some(pgid) = shell.jobs.next_job_to_bg().map(|j| j.pgid) {
        if let Some(job) = shell.jobs.find_by_pgid_mut(pgid) {
            job.mark_background_command();
            job.status = JobStatus::Running;
        }
        if let Some(job) = shell.jobs.find_by_pgid(pgid) {
            println!("{}", shell.jobs.announce_line(job));
        }
        debug!(pgid = pgid.as_raw(), "resuming job in background");
        let _ = killpg(pgid, Signal::SIGCONT);
    }

    shell.notify_completed();
}

/// Move the most recent live job to the foreground, resuming it if
/// stopped, and wait for it. No live job is a no-op.
fn fg(shell: &mut Shell) {
    shell.drain();

    if let Some(pgid) = shell.jobs.next_job_to_fg().map(|j| j.pgid) {
        if let Some(job) = shell.jobs.find_by_pgid_mut(pgid) {
            job.mark_foreground_command();
            println!("{}", job.command);
            // The job number stays as-is: no new job can be created while
            // this one holds the foreground.
            job.background = false;
            job.status = JobStatus::Running;
        }
        debug!(pgid = pgid.as_raw(), "resuming job in foreground");
        let _ = killpg(pgid, Signal::SIGCONT);
        shell.wait_foreground(pgid);
    }

    shell.notify_completed();
}
