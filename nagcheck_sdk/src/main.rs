//! # nagcheck CLI
//!
//! Nagios plugin entry point: one status line plus detail lines on stdout,
//! severity as the exit code.

use clap::Parser;
use nagcheck_sdk::cli::{self, Cli};
use nagcheck_engine::types::Severity;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = cli::parse_error_exit_code(err.kind());
            if code != 0 {
                println!("{}: invalid arguments", Severity::Unknown);
            }
            let _ = err.print();
            std::process::exit(code);
        }
    };

    init_logging(cli.verbose);
    log::info!("nagcheck {} starting", env!("CARGO_PKG_VERSION"));

    let report = cli::execute(&cli);
    for line in cli::render(&report, cli.json) {
        println!("{}", line);
    }

    log::debug!("Run {} finished with {}", report.run_id, report.severity);
    std::process::exit(report.exit_code());
}

/// Log to stderr so stdout carries only plugin output; RUST_LOG wins
fn init_logging(verbose: u8) {
    let default = cli::log_level(verbose).to_string().to_lowercase();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .target(env_logger::Target::Stderr)
        .format_timestamp_secs()
        .init();
}
