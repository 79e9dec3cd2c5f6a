use crate::byte_log::ByteLogger;
use crate::config::ClientConfig;
use crate::connector::Connector;
use crate::errors::{ClientError, ClientResult};
use crate::resolver::resolve_host;
use crate::session::{Session, SessionEnd};
use crate::signals::SignalFlag;
use crate::terminal::{RawModeGuard, controlling_terminal, local_input};

use std::io;

/// Connect, run one session against the real terminal, and clean up
///
/// The terminal is back in its original mode by the time this returns,
/// whichever way the session ended.
pub fn run(config: &ClientConfig) -> ClientResult<SessionEnd> {
    let mut logger = match &config.log_path {
        Some(path) => Some(ByteLogger::create(path)?),
        None => None,
    };

    let ip = resolve_host(&config.host)
        .inspect_err(|e| note(&mut logger, &format!("ERROR: {}", e)))?;

    let connector = Connector::connect(ip, config.port)
        .inspect_err(|e| note(&mut logger, &format!("ERROR: {}", e)))?;

    let connected = format!("INFO: Connected to {}:{}", ip, config.port);
    println!("{}", connected);
    note(&mut logger, &connected);

    let input = local_input().map_err(ClientError::Local)?;
    let signals = SignalFlag::register().map_err(ClientError::Local)?;

    let mut guard = RawModeGuard::enter(controlling_terminal()).map_err(ClientError::TerminalMode)?;

    let mut session = Session::new(config, connector, input, io::stdout()).with_signals(signals);
    if let Some(logger) = logger {
        session = session.with_logger(logger);
    }
    session.note("INFO: Terminal set to raw.");

    let result = session.run();

    let restored = guard.restore();
    match &restored {
        Ok(()) => session.note("INFO: Terminal reset."),
        Err(e) => session.note(&format!("ERROR: Terminal reset failed: {}", e)),
    }
    session.close();

    let end = result?;
    restored.map_err(ClientError::TerminalMode)?;
    Ok(end)
}

/// Note a line in the byte log before the session owns it
fn note(logger: &mut Option<ByteLogger>, message: &str) {
    if let Some(logger) = logger.as_mut() {
        if let Err(e) = logger.note(message) {
            tracing::warn!(error = %e, "byte log write failed");
        }
    }
}
