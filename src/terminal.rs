//! One-time terminal setup for interactive sessions.
//!
//! The shell waits until it is the terminal's foreground process group, makes
//! sure the terminal agrees, and remembers the terminal modes so they can be
//! put back on the way out. Commands run afterwards inherit the shell's group.

use nix::sys::signal::{Signal, killpg};
use nix::sys::termios::{self, SetArg, Termios};
use nix::unistd::{getpgrp, tcgetpgrp, tcsetpgrp};
use std::io;
use std::os::fd::AsFd;
use tracing::debug;

/// Terminal ownership captured at startup.
pub struct TerminalState {
    saved_modes: Termios,
}

impl TerminalState {
    /// Take the foreground of the terminal on standard input.
    ///
    /// Blocks (by stopping the shell's own group with `SIGTTIN`) for as long as
    /// some other group holds the foreground.
    pub fn init() -> nix::Result<Self> {
        let stdin = io::stdin();

        loop {
            let pgid = getpgrp();
            let foreground = tcgetpgrp(stdin.as_fd())?;
            if foreground == pgid {
                break;
            }
            debug!(%pgid, %foreground, "not in foreground, stopping until continued");
            killpg(pgid, Signal::SIGTTIN)?;
        }

        let shell_pgid = getpgrp();
        tcsetpgrp(stdin.as_fd(), shell_pgid)?;
        let saved_modes = termios::tcgetattr(stdin.as_fd())?;
        debug!(%shell_pgid, "terminal acquired");

        Ok(Self { saved_modes })
    }

    /// Put back the terminal modes saved by [`TerminalState::init`].
    pub fn restore(&self) -> nix::Result<()> {
        termios::tcsetattr(io::stdin().as_fd(), SetArg::TCSANOW, &self.saved_modes)
    }
}
