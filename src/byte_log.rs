//! Byte-by-byte session log
//!
//! One line per byte moved in either direction:
//!
//! ```text
//! I 00000000 41 A
//! O 00000000 ff 8/DEL
//! ```
//!
//! Direction letter, per-direction sequence number, hex value, mnemonic.
//! Free-form `INFO:`/`ERROR:` notes are interleaved. Every line is flushed
//! as soon as it is written so a crash loses nothing.

use crate::errors::{ClientError, ClientResult};

use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Names for the 7-bit values; the 8th-bit-set half reuses them with an `8/` prefix
const ASCII_NAMES: [&str; 128] = [
    "NUL", "SOH", "STX", "ETX", "EOT", "ENQ", "ACK", "BEL", //
    "BS", "TAB", "LF", "VT", "FF", "CR", "SO", "SI", //
    "DLE", "DC1", "DC2", "DC3", "DC4", "NAK", "SYN", "ETB", //
    "CAN", "EM", "SUB", "ESC", "FS", "GS", "RS", "US", //
    "SP", "!", "\"", "#", "$", "%", "&", "'", //
    "(", ")", "*", "+", ",", "-", ".", "/", //
    "0", "1", "2", "3", "4", "5", "6", "7", //
    "8", "9", ":", ";", "<", "=", ">", "?", //
    "@", "A", "B", "C", "D", "E", "F", "G", //
    "H", "I", "J", "K", "L", "M", "N", "O", //
    "P", "Q", "R", "S", "T", "U", "V", "W", //
    "X", "Y", "Z", "[", "\\", "]", "^", "_", //
    "`", "a", "b", "c", "d", "e", "f", "g", //
    "h", "i", "j", "k", "l", "m", "n", "o", //
    "p", "q", "r", "s", "t", "u", "v", "w", //
    "x", "y", "z", "{", "|", "}", "~", "DEL", //
];

/// Human-readable name of a byte, defined for all 256 values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mnemonic(pub u8);

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 & 0x80 != 0 {
            f.write_str("8/")?;
        }
        f.write_str(ASCII_NAMES[usize::from(self.0 & 0x7F)])
    }
}

/// Which way a byte travelled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Host to client
    In,
    /// Client to host
    Out,
}

impl Direction {
    pub fn letter(self) -> char {
        match self {
            Direction::In => 'I',
            Direction::Out => 'O',
        }
    }
}

/// Render one byte record, without the trailing newline
pub fn format_record(direction: Direction, sequence: u64, byte: u8) -> String {
    format!(
        "{} {:08} {:02x} {}",
        direction.letter(),
        sequence,
        byte,
        Mnemonic(byte)
    )
}

/// Append-only sink for byte records and notes
pub struct ByteLogger {
    file: File,
}

impl ByteLogger {
    /// Create (truncating) the log file at `path`
    pub fn create(path: &Path) -> ClientResult<Self> {
        let file = File::create(path).map_err(|source| ClientError::LogFile {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "byte log opened");
        Ok(Self { file })
    }

    pub fn record(&mut self, direction: Direction, sequence: u64, byte: u8) -> io::Result<()> {
        self.line(&format_record(direction, sequence, byte))
    }

    /// Write a free-form line such as `INFO: Connected ...`
    pub fn note(&mut self, message: &str) -> io::Result<()> {
        self.line(message)
    }

    fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.file, "{}", text)?;
        self.file.flush()
    }
}
