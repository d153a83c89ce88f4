//! Signal dispositions for shell and children
//!
//! The shell itself must survive everything the terminal can throw at it:
//! SIGINT and SIGTSTP are ignored so Ctrl-C / Ctrl-Z only reach the
//! foreground job, and SIGTTOU / SIGTTIN are ignored so the shell can
//! touch the terminal (and call `tcsetpgrp`) while it is not in the
//! foreground group. Children undo that inheritance before exec.

use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};

fn set_handler(signal: Signal, handler: SigHandler) -> nix::Result<()> {
    let action = SigAction::new(handler, SaFlags::empty(), SigSet::empty());
    unsafe { sigaction(signal, &action) }?;
    Ok(())
}

/// Install the shell's ignore set. Called once at startup.
pub fn ignore_job_control_signals() -> nix::Result<()> {
    for signal in [
        Signal::SIGINT,
        Signal::SIGTSTP,
        Signal::SIGTTOU,
        Signal::SIGTTIN,
    ] {
        set_handler(signal, SigHandler::SigIgn)?;
    }
    Ok(())
}

/// Restore child dispositions after fork: SIGINT and SIGTSTP return to
/// their defaults so the terminal can interrupt and stop the job, SIGTTOU
/// stays ignored.
pub fn restore_child_defaults() -> nix::Result<()> {
    set_handler(Signal::SIGINT, SigHandler::SigDfl)?;
    set_handler(Signal::SIGTSTP, SigHandler::SigDfl)?;
    set_handler(Signal::SIGTTOU, SigHandler::SigIgn)?;
    Ok(())
}
