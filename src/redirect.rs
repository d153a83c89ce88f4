//! File redirections
//!
//! Rewires the standard descriptors of the *current* process according to
//! a [`ProcessSpec`], so this runs between fork and exec. Targets are
//! opened in a fixed order: error, input, output. A failed open does not
//! abort the pass; it is remembered, and once every requested target has
//! been attempted the standard descriptors are discarded and the caller
//! terminates the child.

use std::os::unix::io::RawFd;

use libc::{STDERR_FILENO, STDIN_FILENO, STDOUT_FILENO};
use nix::fcntl::{open, OFlag};
use nix::sys::stat::Mode;
use nix::unistd::{close, dup2};
use thiserror::Error;

use crate::job::ProcessSpec;

#[derive(Error, Debug)]
#[error("failed to redirect standard streams")]
pub struct RedirectError;

/// Creation mode for output and error targets: rw-rw-r--.
const CREATE_MODE: Mode = Mode::from_bits_truncate(0o664);

/// Open an input target read-only; the file must exist.
pub fn open_input(path: &str) -> nix::Result<RawFd> {
    open(path, OFlag::O_RDONLY, Mode::empty())
}

/// Open (create-or-truncate) an output or error target.
pub fn open_output(path: &str) -> nix::Result<RawFd> {
    open(path, OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC, CREATE_MODE)
}

/// Duplicate `fd` onto `target` and close the original.
fn rewire(fd: RawFd, target: RawFd, failed: &mut bool) {
    if dup2(fd, target).is_err() {
        *failed = true;
    }
    let _ = close(fd);
}

/// Apply every redirection requested by `spec` to this process.
///
/// On any failure the remaining standard descriptors are closed and
/// `RedirectError` is returned; the caller exits the child with a failure
/// status.
pub fn apply(spec: &ProcessSpec) -> Result<(), RedirectError> {
    let mut failed = false;

    if let Some(path) = &spec.stderr_file {
        match open_output(path) {
            Ok(fd) => rewire(fd, STDERR_FILENO, &mut failed),
            Err(_) => failed = true,
        }
    }

    if let Some(path) = &spec.stdin_file {
        match open_input(path) {
            Ok(fd) => rewire(fd, STDIN_FILENO, &mut failed),
            Err(_) => {
                eprintln!("-yash: {}: No such file or directory", path);
                failed = true;
            }
        }
    }

    if let Some(path) = &spec.stdout_file {
        match open_output(path) {
            Ok(fd) => rewire(fd, STDOUT_FILENO, &mut failed),
            Err(_) => failed = true,
        }
    }

    if failed {
        for fd in [STDIN_FILENO, STDOUT_FILENO, STDERR_FILENO] {
            let _ = close(fd);
        }
        return Err(RedirectError);
    }
    Ok(())
}
