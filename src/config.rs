use crate::cli::CliArgs;
use crate::errors::{ClientError, ClientResult};

use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming an alternative defaults file
pub const CONFIG_ENV: &str = "CTELNET_CONFIG";

/// Defaults file name under $HOME
pub const CONFIG_FILE_NAME: &str = ".ctelnet.json";

/// Pause used by `--slow` when the defaults file does not override it
pub const DEFAULT_SLOW_PAUSE_SECS: u64 = 5;

/// How the session loop waits for input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum LoopStrategy {
    /// Pick per platform
    #[default]
    #[serde(rename = "auto")]
    Auto,
    /// One readiness wait over both the socket and local input
    #[serde(rename = "dual")]
    DualDescriptor,
    /// Wait on the socket only and poll local input without blocking
    #[serde(rename = "polling")]
    SocketPolling,
}

impl LoopStrategy {
    /// Resolve `Auto` for the running platform
    ///
    /// Haiku's select()/poll() does not report terminals reliably, so the
    /// socket-only strategy is used there.
    pub fn resolve(self) -> LoopStrategy {
        match self {
            LoopStrategy::Auto if cfg!(target_os = "haiku") => LoopStrategy::SocketPolling,
            LoopStrategy::Auto => LoopStrategy::DualDescriptor,
            other => other,
        }
    }
}

/// Optional JSON defaults file
///
/// Every field may be omitted. Command line flags are OR-ed on top.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub crlf: bool,
    pub lfafternl: bool,
    pub log: bool,
    pub log_dir: Option<PathBuf>,
    pub slow: bool,
    pub slow_pause_secs: u64,
    pub loop_strategy: LoopStrategy,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            crlf: false,
            lfafternl: false,
            log: false,
            log_dir: None,
            slow: false,
            slow_pause_secs: DEFAULT_SLOW_PAUSE_SECS,
            loop_strategy: LoopStrategy::Auto,
        }
    }
}

impl ConfigFile {
    /// `$CTELNET_CONFIG`, else `$HOME/.ctelnet.json`
    pub fn default_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        std::env::var_os("HOME").map(|home| Path::new(&home).join(CONFIG_FILE_NAME))
    }

    /// Read a defaults file; `Ok(None)` when it does not exist
    pub fn load(path: &Path) -> ClientResult<Option<Self>> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(ClientError::Configuration(format!(
                    "{}: {}",
                    path.display(),
                    e
                )));
            }
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| ClientError::Configuration(format!("{}: {}", path.display(), e)))
    }

    /// Load a defaults file, falling back to built-in defaults on any problem
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match Self::load(path) {
            Ok(Some(config)) => {
                tracing::debug!(path = %path.display(), "defaults file loaded");
                config
            }
            Ok(None) => Self::default(),
            Err(e) => {
                eprintln!("Config error: {}. Using defaults.", e);
                Self::default()
            }
        }
    }
}

/// Everything the client needs to run one session
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Host token as typed: a dotted IPv4 address or a host name
    pub host: String,
    pub port: u16,
    /// Append LF to a typed chunk that ends in CR
    pub send_crlf_at_newline: bool,
    /// Accepted on the command line but never enabled
    pub send_cr_after_lf: bool,
    /// Echo CR to the local screen after a chunk that starts with LF
    pub show_lf_after_newline: bool,
    /// Sleep after sending a chunk that starts with LF
    pub slow_pause: Option<Duration>,
    /// Byte log destination, when logging is enabled
    pub log_path: Option<PathBuf>,
    pub loop_strategy: LoopStrategy,
}

impl ClientConfig {
    /// Combine command line flags with the defaults file
    ///
    /// `home` and `now` are only consulted when logging is enabled; they
    /// decide the log file's directory and unique name.
    pub fn build(
        cli: &CliArgs,
        file: &ConfigFile,
        home: Option<&Path>,
        now: jiff::Timestamp,
    ) -> ClientResult<Self> {
        let log_path = if cli.log || file.log {
            let dir = match (&file.log_dir, home) {
                (Some(dir), _) => dir.clone(),
                (None, Some(home)) => home.to_path_buf(),
                (None, None) => return Err(ClientError::NoHomeDirectory),
            };
            Some(log_file_path(&dir, now))
        } else {
            None
        };

        let slow_pause = (cli.slow || file.slow).then(|| Duration::from_secs(file.slow_pause_secs));

        Ok(Self {
            host: cli.host.clone(),
            port: cli.port,
            send_crlf_at_newline: cli.crlf || file.crlf,
            // --cr_after_lf has always been parsed and then switched off
            send_cr_after_lf: false,
            show_lf_after_newline: cli.lfafternl || file.lfafternl,
            slow_pause,
            log_path,
            loop_strategy: file.loop_strategy.resolve(),
        })
    }

    /// The `INFO:`/`WARNING:` lines printed for accepted flags
    pub fn announcements(&self, cli: &CliArgs) -> Vec<String> {
        let mut lines = Vec::new();
        if self.send_crlf_at_newline {
            lines.push("INFO: --crlf is set.".to_string());
        }
        if cli.cr_after_lf {
            lines.push("WARNING: --cr_after_lf is accepted but has no effect.".to_string());
        }
        if self.show_lf_after_newline {
            lines.push("INFO: --lfafternl is set.".to_string());
        }
        if let Some(pause) = self.slow_pause {
            lines.push(format!("INFO: --slow is set ({}s pause).", pause.as_secs()));
        }
        if let Some(path) = &self.log_path {
            lines.push(format!("INFO: --log to {} is set.", path.display()));
        }
        lines
    }
}

/// `<dir>/ctelnet_log_<unix-seconds>.txt`
pub fn log_file_path(dir: &Path, now: jiff::Timestamp) -> PathBuf {
    dir.join(format!("ctelnet_log_{}.txt", now.as_second()))
}
