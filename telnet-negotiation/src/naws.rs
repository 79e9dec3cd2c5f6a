//! # NAWS - Negotiate About Window Size (RFC 1073)
//!
//! When the host sends `IAC DO NAWS` the client agrees with `IAC WILL NAWS`
//! and immediately reports its size in a sub-negotiation:
//!
//! ```text
//! IAC SB NAWS <width-high> <width-low> <height-high> <height-low> IAC SE
//! ```
//!
//! Width and height are 16-bit values in network byte order (big-endian).
//! This client always announces the classic 80x24 screen; it never queries
//! the local terminal's real geometry.

use crate::protocol::{TelnetCommand, TelnetOption, TelnetSequence};

/// Terminal window size information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSize {
    /// Terminal width in characters
    pub width: u16,
    /// Terminal height in lines
    pub height: u16,
}

impl WindowSize {
    /// The size announced to every host: 80 columns by 24 lines
    pub const CLASSIC: WindowSize = WindowSize {
        width: 80,
        height: 24,
    };

    /// Create a new window size
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Encode window size for the NAWS sub-negotiation payload
    ///
    /// Returns <width-high> <width-low> <height-high> <height-low>
    pub fn encode(self) -> [u8; 4] {
        let [wh, wl] = self.width.to_be_bytes();
        let [hh, hl] = self.height.to_be_bytes();
        [wh, wl, hh, hl]
    }

    /// `IAC WILL NAWS`
    pub fn acknowledgement() -> TelnetSequence {
        TelnetSequence::Negotiation {
            command: TelnetCommand::WILL,
            option: TelnetOption::NAWS,
        }
    }

    /// `IAC SB NAWS <size> IAC SE`
    pub fn report(self) -> TelnetSequence {
        TelnetSequence::SubNegotiation {
            option: TelnetOption::NAWS,
            data: self.encode().to_vec(),
        }
    }
}

impl Default for WindowSize {
    fn default() -> Self {
        Self::CLASSIC
    }
}
