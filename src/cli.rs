use clap::Parser;
use std::ffi::OsString;

/// Minimal telnet client: a transparent byte pipe between this terminal and a host
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "ctelnet", version)]
pub struct CliArgs {
    /// Host name or dotted IPv4 address
    pub host: String,

    /// TCP port
    pub port: u16,

    /// Send CR LF when a typed chunk ends in CR
    #[arg(long)]
    pub crlf: bool,

    /// Accepted for compatibility; has no effect
    #[arg(long = "cr_after_lf")]
    pub cr_after_lf: bool,

    /// Echo CR locally after sending a chunk that starts with LF
    #[arg(long)]
    pub lfafternl: bool,

    /// Record every byte to $HOME/ctelnet_log_<time>.txt
    #[arg(long)]
    pub log: bool,

    /// Pause after sending a chunk that starts with LF
    #[arg(long)]
    pub slow: bool,
}

/// Parsed arguments plus the unknown flags that were dropped
#[derive(Debug)]
pub struct ParsedArgs {
    pub args: CliArgs,
    pub ignored: Vec<String>,
}

const KNOWN_FLAGS: &[&str] = &[
    "--crlf",
    "--cr_after_lf",
    "--lfafternl",
    "--log",
    "--slow",
    "-h",
    "--help",
    "-V",
    "--version",
];

/// Parse the command line, dropping unrecognised flags instead of failing
///
/// The first element is the program name, as with `std::env::args_os()`.
pub fn parse_args<I, T>(argv: I) -> Result<ParsedArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut kept = Vec::new();
    let mut ignored = Vec::new();

    for (index, arg) in argv.into_iter().enumerate() {
        let arg: OsString = arg.into();
        let text = arg.to_string_lossy().into_owned();
        let is_flag = text.len() > 1 && text.starts_with('-');
        if index > 0 && is_flag && !KNOWN_FLAGS.contains(&text.as_str()) {
            ignored.push(text);
            continue;
        }
        kept.push(arg);
    }

    let args = CliArgs::try_parse_from(kept)?;
    Ok(ParsedArgs { args, ignored })
}
