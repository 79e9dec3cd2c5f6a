use ctelnet::cli::parse_args;
use ctelnet::config::{ClientConfig, ConfigFile};
use ctelnet::errors::EXIT_FAILURE;
use ctelnet::{SessionEnd, app};

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    init_tracing();

    println!("CTELNET: Minimal telnet client V{}", env!("CARGO_PKG_VERSION"));

    let parsed = match parse_args(env::args_os()) {
        Ok(parsed) => parsed,
        Err(e) => {
            // --help and --version land here too
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(EXIT_FAILURE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    for flag in &parsed.ignored {
        eprintln!("WARNING: Unknown option: {} (ignored)", flag);
    }

    let file = ConfigFile::load_or_default(ConfigFile::default_path().as_deref());
    let home = env::var_os("HOME").map(PathBuf::from);

    let config = match ClientConfig::build(&parsed.args, &file, home.as_deref(), jiff::Timestamp::now()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            return ExitCode::from(e.exit_code());
        }
    };
    for line in config.announcements(&parsed.args) {
        println!("{}", line);
    }

    match app::run(&config) {
        Ok(end) => {
            match end {
                SessionEnd::Signalled(_) => eprintln!("\r\nINFO: {}", end),
                _ => println!("\r\nINFO: {}", end),
            }
            ExitCode::from(end.exit_code())
        }
        Err(e) => {
            eprintln!("\r\nERROR: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("CTELNET_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
