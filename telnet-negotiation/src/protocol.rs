//! # Telnet Protocol Constants and Types
//!
//! This module holds the small slice of **RFC 854** / **RFC 855** a minimal
//! client needs to recognise and answer option negotiation.
//!
//! ## Key Concepts from RFC 854:
//!
//! ### IAC (Interpret As Command) - Byte 255
//! The IAC byte (255/0xFF) signals that the following bytes are a Telnet
//! command rather than data.
//!
//! ### Command Structure
//! - Negotiation: `IAC WILL/WONT/DO/DONT <option>`
//! - Sub-option (RFC 855): `IAC SB <option> <parameters...> IAC SE`

use std::fmt;

/// IAC - Interpret As Command (RFC 854, Section 4)
///
/// The IAC byte (255/0xFF) indicates that the next byte(s) should be interpreted
/// as a Telnet command sequence rather than regular data.
pub const IAC: u8 = 255;

/// Telnet Commands (RFC 854, Section 4)
///
/// These commands follow the IAC byte. Only the four negotiation verbs and
/// the sub-negotiation brackets are acted on by this crate; the rest are
/// named so that logs and traces can print something readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TelnetCommand {
    /// End of subnegotiation parameters (RFC 855)
    SE = 240,
    /// No Operation
    NOP = 241,
    /// Data Mark
    DM = 242,
    /// Break
    BRK = 243,
    /// Interrupt Process
    IP = 244,
    /// Abort Output
    AO = 245,
    /// Are You There
    AYT = 246,
    /// Erase Character
    EC = 247,
    /// Erase Line
    EL = 248,
    /// Go Ahead
    GA = 249,
    /// Subnegotiation Begin (RFC 855)
    SB = 250,
    /// WILL - sender wants to enable option
    WILL = 251,
    /// WON'T - sender refuses to enable option
    WONT = 252,
    /// DO - sender wants receiver to enable option
    DO = 253,
    /// DON'T - sender wants receiver to disable option
    DONT = 254,
}

impl TelnetCommand {
    /// Convert a byte to a TelnetCommand if it represents a valid command
    ///
    /// # Example
    /// ```
    /// use telnet_negotiation::protocol::TelnetCommand;
    ///
    /// assert_eq!(TelnetCommand::from_byte(251), Some(TelnetCommand::WILL));
    /// assert_eq!(TelnetCommand::from_byte(100), None);
    /// ```
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            240 => Some(TelnetCommand::SE),
            241 => Some(TelnetCommand::NOP),
            242 => Some(TelnetCommand::DM),
            243 => Some(TelnetCommand::BRK),
            244 => Some(TelnetCommand::IP),
            245 => Some(TelnetCommand::AO),
            246 => Some(TelnetCommand::AYT),
            247 => Some(TelnetCommand::EC),
            248 => Some(TelnetCommand::EL),
            249 => Some(TelnetCommand::GA),
            250 => Some(TelnetCommand::SB),
            251 => Some(TelnetCommand::WILL),
            252 => Some(TelnetCommand::WONT),
            253 => Some(TelnetCommand::DO),
            254 => Some(TelnetCommand::DONT),
            _ => None,
        }
    }

    /// Convert command to its byte representation
    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for TelnetCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A Telnet option code
///
/// Options arrive from the host as arbitrary bytes, so this is a newtype over
/// `u8` rather than a closed enum: every value is representable, and the
/// handful the client cares about are available as associated constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TelnetOption(pub u8);

impl TelnetOption {
    /// Echo (RFC 857)
    pub const ECHO: TelnetOption = TelnetOption(1);
    /// Suppress Go Ahead (RFC 858)
    pub const SUPPRESS_GO_AHEAD: TelnetOption = TelnetOption(3);
    /// Terminal Type (RFC 1091)
    pub const TERMINAL_TYPE: TelnetOption = TelnetOption(24);
    /// Negotiate About Window Size (RFC 1073)
    pub const NAWS: TelnetOption = TelnetOption(31);
    /// Terminal Speed (RFC 1079)
    pub const TERMINAL_SPEED: TelnetOption = TelnetOption(32);
    /// Linemode (RFC 1184)
    pub const LINEMODE: TelnetOption = TelnetOption(34);
    /// New Environment (RFC 1571)
    pub const NEW_ENVIRON: TelnetOption = TelnetOption(39);

    /// Convert option to its byte representation
    pub fn to_byte(self) -> u8 {
        self.0
    }

    /// Conventional short name, if the option is one we know about
    pub fn name(self) -> Option<&'static str> {
        match self.0 {
            0 => Some("BINARY"),
            1 => Some("ECHO"),
            3 => Some("SUPPRESS_GO_AHEAD"),
            5 => Some("STATUS"),
            6 => Some("TIMING_MARK"),
            24 => Some("TERMINAL_TYPE"),
            31 => Some("NAWS"),
            32 => Some("TERMINAL_SPEED"),
            33 => Some("TOGGLE_FLOW_CONTROL"),
            34 => Some("LINEMODE"),
            35 => Some("X_DISPLAY_LOCATION"),
            36 => Some("OLD_ENVIRON"),
            39 => Some("NEW_ENVIRON"),
            _ => None,
        }
    }
}

impl fmt::Display for TelnetOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "OPTION({})", self.0),
        }
    }
}

/// A complete Telnet command sequence as sent on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelnetSequence {
    /// Option negotiation command (e.g., IAC WILL NAWS)
    Negotiation {
        command: TelnetCommand,
        option: TelnetOption,
    },

    /// Sub-negotiation sequence (RFC 855)
    /// Contains option-specific data between IAC SB and IAC SE
    SubNegotiation { option: TelnetOption, data: Vec<u8> },
}

impl TelnetSequence {
    /// Serialize this sequence to bytes for transmission
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            TelnetSequence::Negotiation { command, option } => {
                vec![IAC, command.to_byte(), option.to_byte()]
            }
            TelnetSequence::SubNegotiation { option, data } => {
                let mut bytes = Vec::with_capacity(data.len() + 5);
                bytes.push(IAC);
                bytes.push(TelnetCommand::SB.to_byte());
                bytes.push(option.to_byte());
                bytes.extend_from_slice(data);
                bytes.push(IAC);
                bytes.push(TelnetCommand::SE.to_byte());
                bytes
            }
        }
    }
}
