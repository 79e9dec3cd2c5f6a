use crate::byte_log::{ByteLogger, Direction};
use crate::config::ClientConfig;
use crate::connector::Connector;
use crate::errors::{ClientError, ClientResult};
use crate::signals::SignalFlag;
use crate::strategy::{Readiness, ReadinessWait, read_nonblocking};
use crate::transform::OutputTransform;

use std::fmt;
use std::io::{self, Read, Write};
use std::os::fd::AsFd;
use std::time::Duration;

use telnet_negotiation::{IAC, NegotiationFrame, negotiate};

/// Most bytes taken from local input per read
pub const LOCAL_CHUNK: usize = 20;

/// Why a session finished without an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The host closed the connection
    RemoteClosed,
    /// Local input reached end of file
    LocalEof,
    /// A terminating signal arrived
    Signalled(i32),
}

impl SessionEnd {
    /// Process exit status for this ending
    pub fn exit_code(self) -> u8 {
        match self {
            SessionEnd::RemoteClosed | SessionEnd::LocalEof => 0,
            SessionEnd::Signalled(signal) => u8::try_from(128 + signal).unwrap_or(u8::MAX),
        }
    }
}

impl fmt::Display for SessionEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionEnd::RemoteClosed => f.write_str("Connection closed by the remote end"),
            SessionEnd::LocalEof => f.write_str("EOF on stdin (keyboard)."),
            SessionEnd::Signalled(signal) => write!(f, "Terminated by signal {}", signal),
        }
    }
}

/// Bytes moved in each direction; also the byte log's sequence numbers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub bytes_in: u64,
    pub bytes_out: u64,
}

/// One client session: the socket, local input and output, and everything
/// that decides how bytes move between them
///
/// Single-threaded. `run` loops until the host closes, local input ends, a
/// terminating signal arrives, or an I/O error occurs.
pub struct Session<I, O> {
    strategy: Box<dyn ReadinessWait>,
    connector: Connector,
    input: I,
    output: O,
    transform: OutputTransform,
    show_lf_after_newline: bool,
    slow_pause: Option<Duration>,
    logger: Option<ByteLogger>,
    signals: Option<SignalFlag>,
    stats: SessionStats,
}

impl<I, O> Session<I, O>
where
    I: Read + AsFd,
    O: Write,
{
    pub fn new(config: &ClientConfig, connector: Connector, input: I, output: O) -> Self {
        Self {
            strategy: config.loop_strategy.build(),
            connector,
            input,
            output,
            transform: OutputTransform::from_config(config),
            show_lf_after_newline: config.show_lf_after_newline,
            slow_pause: config.slow_pause,
            logger: None,
            signals: None,
            stats: SessionStats::default(),
        }
    }

    pub fn with_logger(mut self, logger: ByteLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn with_signals(mut self, signals: SignalFlag) -> Self {
        self.signals = Some(signals);
        self
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    /// Append a free-form line to the byte log, if there is one
    pub fn note(&mut self, message: &str) {
        if let Some(logger) = self.logger.as_mut() {
            if let Err(e) = logger.note(message) {
                tracing::warn!(error = %e, "byte log write failed");
            }
        }
    }

    /// Shut the connection down
    pub fn close(&mut self) {
        self.connector.close();
    }

    /// Run until the session ends
    ///
    /// Errors are noted in the byte log before being returned.
    pub fn run(&mut self) -> ClientResult<SessionEnd> {
        tracing::debug!(strategy = self.strategy.name(), peer = %self.connector.peer(), "session loop starting");

        let result = self.run_loop();

        match &result {
            Ok(end) => self.note(&format!("INFO: {}", end)),
            Err(err) => self.note(&format!("ERROR: {}", err)),
        }
        tracing::debug!(
            bytes_in = self.stats.bytes_in,
            bytes_out = self.stats.bytes_out,
            "session loop finished"
        );

        result
    }

    fn run_loop(&mut self) -> ClientResult<SessionEnd> {
        loop {
            let readiness = self
                .strategy
                .wait(self.connector.as_fd(), self.input.as_fd())
                .map_err(ClientError::Wait)?;

            if let Some(signal) = self.signals.as_ref().and_then(SignalFlag::raised) {
                return Ok(SessionEnd::Signalled(signal));
            }

            let outcome = match readiness {
                Readiness::Host => self.service_host()?,
                Readiness::Local => self.service_local()?,
                Readiness::Idle => None,
            };

            if let Some(end) = outcome {
                return Ok(end);
            }
        }
    }

    /// One byte from the host: either a negotiation frame or screen output
    fn service_host(&mut self) -> ClientResult<Option<SessionEnd>> {
        let mut byte = [0u8; 1];
        if self.connector.receive(&mut byte)? == 0 {
            return Ok(Some(SessionEnd::RemoteClosed));
        }
        self.record(Direction::In, &byte);

        if byte[0] != IAC {
            self.output.write_all(&byte).map_err(ClientError::Local)?;
            self.output.flush().map_err(ClientError::Local)?;
            return Ok(None);
        }

        let mut rest = [0u8; 2];
        if !self.connector.receive_exact(&mut rest)? {
            return Ok(Some(SessionEnd::RemoteClosed));
        }
        self.record(Direction::In, &rest);

        let frame = NegotiationFrame::new(rest[0], rest[1]);
        let reply = negotiate(&frame);
        self.note(&format!(
            "INFO: negotiate {} {} -> {} bytes",
            frame
                .verb()
                .map_or_else(|| rest[0].to_string(), |verb| verb.to_string()),
            frame.option(),
            reply.byte_count()
        ));

        for segment in reply.segments() {
            self.send(segment)?;
        }
        Ok(None)
    }

    /// A chunk of local input, transformed and sent to the host
    fn service_local(&mut self) -> ClientResult<Option<SessionEnd>> {
        let mut chunk = vec![0u8; LOCAL_CHUNK];
        let read = if self.strategy.local_reads_nonblocking() {
            read_nonblocking(&mut self.input, &mut chunk)
        } else {
            self.input.read(&mut chunk)
        };
        let n = match read {
            Ok(n) => n,
            Err(e)
                if e.kind() == io::ErrorKind::WouldBlock
                    || e.kind() == io::ErrorKind::Interrupted =>
            {
                return Ok(None);
            }
            Err(e) => return Err(ClientError::Local(e)),
        };
        if n == 0 {
            return Ok(Some(SessionEnd::LocalEof));
        }
        chunk.truncate(n);

        let shape = self.transform.apply(&mut chunk);
        self.send(&chunk)?;

        if shape.starts_with_lf {
            if self.show_lf_after_newline {
                self.output.write_all(b"\r").map_err(ClientError::Local)?;
                self.output.flush().map_err(ClientError::Local)?;
            }
            if let Some(pause) = self.slow_pause {
                std::thread::sleep(pause);
            }
        }
        Ok(None)
    }

    fn send(&mut self, bytes: &[u8]) -> ClientResult<()> {
        self.connector.send(bytes)?;
        self.record(Direction::Out, bytes);
        Ok(())
    }

    fn record(&mut self, direction: Direction, bytes: &[u8]) {
        let counter = match direction {
            Direction::In => &mut self.stats.bytes_in,
            Direction::Out => &mut self.stats.bytes_out,
        };

        for &byte in bytes {
            tracing::trace!(?direction, sequence = *counter, byte, "byte");
            if let Some(logger) = self.logger.as_mut() {
                if let Err(e) = logger.record(direction, *counter, byte) {
                    tracing::warn!(error = %e, "byte log write failed");
                }
            }
            *counter += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_exit_codes() {
        assert_eq!(SessionEnd::RemoteClosed.exit_code(), 0);
        assert_eq!(SessionEnd::LocalEof.exit_code(), 0);
        assert_eq!(SessionEnd::Signalled(15).exit_code(), 143);
    }

    #[test]
    fn test_end_messages() {
        assert_eq!(
            SessionEnd::RemoteClosed.to_string(),
            "Connection closed by the remote end"
        );
        assert!(SessionEnd::Signalled(2).to_string().contains('2'));
    }
}
