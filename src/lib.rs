//! ctelnet - a minimal telnet client
//!
//! Puts the local terminal in raw mode and pipes bytes between it and a
//! TCP host, answering option negotiation with the smallest reply set that
//! keeps a server talking: window size is reported as 80x24, everything
//! else is declined or acknowledged as-is. Every byte can be logged.

pub mod app;
pub mod byte_log;
pub mod cli;
pub mod config;
pub mod connector;
pub mod errors;
pub mod resolver;
pub mod session;
pub mod signals;
pub mod strategy;
pub mod terminal;
pub mod transform;

pub use config::{ClientConfig, LoopStrategy};
pub use errors::{ClientError, ClientResult};
pub use session::{Session, SessionEnd, SessionStats};
