//! Process launching
//!
//! Creates one child per job and returns its pid, which doubles as the
//! job's process-group id. Single commands fork and exec directly. A
//! two-process pipeline forks an intermediate *supervisor* child that owns
//! the pipe, forks both ends as grandchildren inside its own process
//! group, and waits for them, so the shell always observes exactly one
//! pid per job and pipeline completion is reported atomically.

use std::ffi::CString;
use std::process;

use libc::{STDIN_FILENO, STDOUT_FILENO};
use nix::errno::Errno;
use nix::sys::wait::waitpid;
use nix::unistd::{close, dup2, execvp, fork, getpid, pipe, setpgid, ForkResult, Pid};
use thiserror::Error;
use tracing::debug;

use crate::job::{Job, ProcessSpec};
use crate::redirect;
use crate::signals;
use crate::terminal;

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("cannot fork: {0}")]
    Fork(Errno),
}

/// Launch a job and return the pid of the shell's direct child, which is
/// the pgid of the job's process group.
pub fn launch(job: &Job) -> Result<Pid, LaunchError> {
    let pgid = if job.is_pipeline() {
        launch_pipeline(job)?
    } else {
        launch_single(job)?
    };
    debug!(pgid = pgid.as_raw(), command = %job.command, "job launched");
    Ok(pgid)
}

/// Post-fork setup shared by the single child and the pipeline
/// supervisor: default SIGINT/SIGTSTP, ignored SIGTTOU, a fresh process
/// group, and (for foreground jobs) the controlling terminal.
fn child_preamble(foreground: bool) {
    if signals::restore_child_defaults().is_err() {
        process::exit(1);
    }
    if setpgid(Pid::from_raw(0), Pid::from_raw(0)).is_err() {
        process::exit(1);
    }
    if foreground {
        // Best-effort: the parent also grants the terminal before waiting,
        // whichever side wins the race.
        let _ = terminal::give_terminal_to(getpid());
    }
}

/// Apply redirections and exec; never returns.
fn exec_process(spec: &ProcessSpec) -> ! {
    if redirect::apply(spec).is_err() {
        process::exit(1);
    }

    let argv: Vec<CString> = match spec
        .argv
        .iter()
        .map(|arg| CString::new(arg.as_str()))
        .collect()
    {
        Ok(argv) => argv,
        Err(_) => process::exit(1),
    };

    let _ = execvp(&argv[0], &argv);
    eprintln!("-yash: {}: command not found", spec.argv[0]);
    process::exit(1);
}

fn launch_single(job: &Job) -> Result<Pid, LaunchError> {
    match unsafe { fork() }.map_err(LaunchError::Fork)? {
        ForkResult::Child => {
            child_preamble(!job.background);
            exec_process(&job.first)
        }
        ForkResult::Parent { child } => Ok(child),
    }
}

fn launch_pipeline(job: &Job) -> Result<Pid, LaunchError> {
    match unsafe { fork() }.map_err(LaunchError::Fork)? {
        ForkResult::Child => supervise_pipeline(job),
        ForkResult::Parent { child } => Ok(child),
    }
}

/// Body of the pipeline supervisor; never returns.
///
/// Both grandchildren inherit the supervisor's process group and signal
/// dispositions, so SIGTSTP from the terminal stops the whole group,
/// supervisor included; `fg`'s SIGCONT to the group resumes all three.
fn supervise_pipeline(job: &Job) -> ! {
    child_preamble(!job.background);

    let (read_end, write_end) = match pipe() {
        Ok(ends) => ends,
        Err(_) => process::exit(1),
    };

    let producer = match unsafe { fork() } {
        Ok(ForkResult::Child) => {
            let _ = close(read_end);
            if dup2(write_end, STDOUT_FILENO).is_err() {
                process::exit(1);
            }
            let _ = close(write_end);
            exec_process(&job.first)
        }
        Ok(ForkResult::Parent { child }) => child,
        Err(_) => process::exit(1),
    };

    let Some(second) = job.second.as_ref() else {
        // A pipeline supervisor is only forked for two-process jobs.
        process::exit(1);
    };

    let consumer = match unsafe { fork() } {
        Ok(ForkResult::Child) => {
            let _ = close(write_end);
            if dup2(read_end, STDIN_FILENO).is_err() {
                process::exit(1);
            }
            let _ = close(read_end);
            exec_process(second)
        }
        Ok(ForkResult::Parent { child }) => child,
        Err(_) => process::exit(1),
    };

    // Drop both pipe ends so EOF propagates once the producer exits.
    let _ = close(read_end);
    let _ = close(write_end);

    let _ = waitpid(producer, None);
    let _ = waitpid(consumer, None);
    process::exit(0);
}
