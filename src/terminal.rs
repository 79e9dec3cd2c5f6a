//! Local terminal handling
//!
//! Raw mode is entered once after the connection is up and must be undone
//! on every way out of the process. [`RawModeGuard`] owns that obligation:
//! callers restore explicitly on the normal path, and `Drop` covers early
//! returns and unwinding panics.

use std::fs::File;
use std::io::{self, IsTerminal};
use std::os::fd::AsFd;

/// Switches the controlling terminal in and out of raw mode
pub trait TerminalMode {
    /// Save the current settings and install raw ones (no canonical mode,
    /// no echo, no signal keys, one byte per read)
    fn enter_raw(&mut self) -> io::Result<()>;

    /// Reinstate the settings saved by `enter_raw`
    fn restore(&mut self) -> io::Result<()>;
}

/// Raw mode through crossterm, which keeps the original termios itself
#[derive(Debug, Default)]
pub struct CrosstermTerminal;

impl TerminalMode for CrosstermTerminal {
    fn enter_raw(&mut self) -> io::Result<()> {
        crossterm::terminal::enable_raw_mode()
    }

    fn restore(&mut self) -> io::Result<()> {
        crossterm::terminal::disable_raw_mode()
    }
}

/// Used when stdin is not a terminal: nothing to switch
#[derive(Debug, Default)]
pub struct NoTerminal;

impl TerminalMode for NoTerminal {
    fn enter_raw(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn restore(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Pick the controller for this process's stdin
pub fn controlling_terminal() -> Box<dyn TerminalMode> {
    if io::stdin().is_terminal() {
        Box::new(CrosstermTerminal)
    } else {
        tracing::debug!("stdin is not a terminal, leaving its mode alone");
        Box::new(NoTerminal)
    }
}

/// Holds the terminal in raw mode until restored or dropped
pub struct RawModeGuard {
    terminal: Box<dyn TerminalMode>,
    active: bool,
}

impl RawModeGuard {
    pub fn enter(mut terminal: Box<dyn TerminalMode>) -> io::Result<Self> {
        terminal.enter_raw()?;
        tracing::debug!("terminal set to raw");
        Ok(Self {
            terminal,
            active: true,
        })
    }

    /// Put the saved settings back; a second call is a no-op
    pub fn restore(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        self.terminal.restore()?;
        tracing::debug!("terminal reset");
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

/// An unbuffered handle on stdin
///
/// `io::Stdin` reads ahead into its own buffer, which would leave typed bytes
/// invisible to the readiness wait. A duplicated descriptor wrapped in a
/// `File` reads straight from the kernel.
pub fn local_input() -> io::Result<File> {
    let fd = io::stdin().as_fd().try_clone_to_owned()?;
    Ok(File::from(fd))
}
