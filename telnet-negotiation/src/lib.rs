//! # Telnet Negotiation Library
//!
//! The protocol half of a minimal telnet client, following:
//! - RFC 854: Telnet Protocol Specification (https://tools.ietf.org/html/rfc854)
//! - RFC 855: Telnet Option Specifications
//! - RFC 1073: Telnet Window Size Option
//!
//! ## Architecture Overview
//!
//! - `protocol`: IAC, command verbs, option codes and wire sequences
//! - `negotiation`: the 3-byte negotiation frame and the stateless reply rules
//! - `naws`: window-size report encoding
//!
//! The crate does no I/O. A caller that has read `IAC` plus two bytes off the
//! wire builds a [`NegotiationFrame`], passes it to [`negotiate`], and writes
//! each of the reply's segments back to the host.

pub mod naws;
pub mod negotiation;
pub mod protocol;

pub use naws::WindowSize;
pub use negotiation::{NegotiationFrame, Reply, negotiate};
pub use protocol::{IAC, TelnetCommand, TelnetOption, TelnetSequence};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Supported Telnet RFCs
pub const SUPPORTED_RFCS: &[&str] = &[
    "RFC 854 - Telnet Protocol Specification",
    "RFC 855 - Telnet Option Specifications",
    "RFC 1073 - Telnet Window Size Option",
];
