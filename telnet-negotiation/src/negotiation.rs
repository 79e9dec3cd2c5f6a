//! # Minimal Option Negotiation
//!
//! A full RFC 1143 Q-method negotiator tracks per-option state on both sides
//! of the connection. The hosts this client talks to (simulators, old
//! mainframe front ends) negotiate little or nothing, so the client takes a
//! much simpler, stateless posture:
//!
//! - `DO NAWS` is accepted: reply `WILL NAWS` and report an 80x24 window.
//! - Any other `DO` is declined with `WONT`.
//! - Any `WILL` is answered with `DO` (passively accepted, never acted on).
//! - `DONT` and `WONT` are echoed back unchanged.
//!
//! Every reply depends only on the three bytes of the incoming frame.

use crate::naws::WindowSize;
use crate::protocol::{IAC, TelnetCommand, TelnetOption};

/// One `IAC <verb> <option>` command as read off the wire
///
/// The verb byte is kept raw: the client reads two bytes after every IAC and
/// answers them whatever they turn out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NegotiationFrame([u8; 3]);

impl NegotiationFrame {
    /// Build a frame from the two bytes that followed an IAC
    pub fn new(verb: u8, option: u8) -> Self {
        Self([IAC, verb, option])
    }

    pub fn verb(&self) -> Option<TelnetCommand> {
        TelnetCommand::from_byte(self.0[1])
    }

    pub fn option(&self) -> TelnetOption {
        TelnetOption(self.0[2])
    }

    pub fn as_bytes(&self) -> &[u8; 3] {
        &self.0
    }

    /// True for `IAC DO NAWS`
    pub fn requests_window_size(&self) -> bool {
        self.verb() == Some(TelnetCommand::DO) && self.option() == TelnetOption::NAWS
    }

    /// The frame with every `DO` byte turned into `WONT` and every `WILL`
    /// byte into `DO`; all other bytes are left alone.
    pub fn declined(&self) -> Self {
        Self(self.0.map(decline_byte))
    }
}

fn decline_byte(byte: u8) -> u8 {
    match TelnetCommand::from_byte(byte) {
        Some(TelnetCommand::DO) => TelnetCommand::WONT.to_byte(),
        Some(TelnetCommand::WILL) => TelnetCommand::DO.to_byte(),
        _ => byte,
    }
}

/// What to send back for one incoming frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// `IAC WILL NAWS` followed by the window-size sub-negotiation
    WindowSize { acknowledgement: Vec<u8>, report: Vec<u8> },

    /// The incoming frame transformed by [`NegotiationFrame::declined`]
    Frame(NegotiationFrame),
}

impl Reply {
    /// The reply as the separate writes the client issues, in order
    pub fn segments(&self) -> Vec<&[u8]> {
        match self {
            Reply::WindowSize {
                acknowledgement,
                report,
            } => vec![acknowledgement.as_slice(), report.as_slice()],
            Reply::Frame(frame) => vec![frame.as_bytes().as_slice()],
        }
    }

    /// Total number of bytes the reply puts on the wire
    pub fn byte_count(&self) -> usize {
        self.segments().iter().map(|s| s.len()).sum()
    }
}

/// Compute the reply to one frame
///
/// # Example
/// ```
/// use telnet_negotiation::{negotiate, NegotiationFrame};
///
/// let reply = negotiate(&NegotiationFrame::new(253, 1)); // IAC DO ECHO
/// assert_eq!(reply.segments(), vec![&[255u8, 252, 1][..]]); // IAC WONT ECHO
/// ```
pub fn negotiate(frame: &NegotiationFrame) -> Reply {
    if frame.requests_window_size() {
        tracing::debug!("DO NAWS received, announcing 80x24");
        let size = WindowSize::CLASSIC;
        return Reply::WindowSize {
            acknowledgement: WindowSize::acknowledgement().to_bytes(),
            report: size.report().to_bytes(),
        };
    }

    let reply = frame.declined();
    tracing::debug!(
        verb = ?frame.verb(),
        option = %frame.option(),
        reply_verb = ?reply.verb(),
        "negotiation frame answered"
    );
    Reply::Frame(reply)
}
