//! Controlling-terminal handoff
//!
//! Exactly one process group owns the controlling terminal at any instant.
//! The shell group owns it except while a foreground wait is in progress;
//! every transition is an explicit `tcsetpgrp` on the shell's terminal fd.

use std::os::unix::io::RawFd;

use nix::unistd::{tcsetpgrp, Pid};

/// The shell's terminal: standard input.
pub const SHELL_TERMINAL: RawFd = libc::STDIN_FILENO;

/// Make `pgid` the foreground process group of the terminal.
///
/// Callers treat failure as best-effort: SIGTTOU is ignored, so a failed
/// or racing handoff cannot stop the shell.
pub fn give_terminal_to(pgid: Pid) -> nix::Result<()> {
    tcsetpgrp(SHELL_TERMINAL, pgid)
}
