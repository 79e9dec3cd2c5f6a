use std::path::PathBuf;
use thiserror::Error;

/// Exit status for a host name that does not resolve to an IPv4 address
pub const EXIT_RESOLVE_FAILED: u8 = 33;

/// Exit status for every other setup or transport failure
pub const EXIT_FAILURE: u8 = 1;

/// Custom error types for the telnet client
#[derive(Debug, Error)]
pub enum ClientError {
    /// Bad command line (missing host/port, unparsable port)
    #[error("{0}")]
    Usage(String),

    /// Defaults file could not be read or parsed
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Host name lookup produced no IPv4 address
    #[error("Failed to convert host name '{host}' to IP address")]
    Resolve {
        host: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Host token starts with a digit but is not a dotted IPv4 address
    #[error("Invalid IPv4 address '{0}'")]
    InvalidAddress(String),

    /// Log file could not be created
    #[error("Cannot create log file {}: {source}", .path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Log needs $HOME and it is not set
    #[error("Cannot create log file: HOME is not set")]
    NoHomeDirectory,

    /// Socket creation or connect() failed
    #[error("Could not connect() to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// send() failed mid-session, including negotiation replies
    #[error("Failed to send() to host: {0}")]
    Send(#[source] std::io::Error),

    /// recv() failed mid-session
    #[error("Could not recv() from host: {0}")]
    Receive(#[source] std::io::Error),

    /// The readiness wait itself failed
    #[error("Could not poll() for input: {0}")]
    Wait(#[source] std::io::Error),

    /// Reading the keyboard or writing the screen failed
    #[error("Local terminal I/O failed: {0}")]
    Local(#[source] std::io::Error),

    /// Entering or leaving raw mode failed
    #[error("Could not change terminal mode: {0}")]
    TerminalMode(#[source] std::io::Error),
}

impl ClientError {
    /// Process exit status for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            ClientError::Resolve { .. } => EXIT_RESOLVE_FAILED,
            _ => EXIT_FAILURE,
        }
    }
}

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;
