//! # Command Line Interface
//!
//! Argument definitions and dispatch for the `nagcheck` binary. Output
//! follows the monitoring plugin convention: the status line first, then
//! one line per failing item, and the exit code carries the severity.

use crate::checks::arista::{self, AristaCheck, AristaOptions};
use crate::checks::crashplan::{self, CrashPlanOptions};
use crate::checks::ossec::{self, OssecCheck, OssecOptions};
use crate::checks::ItemSelection;
use crate::collectors::crashplan::DEFAULT_REPORT_URL;
use crate::config::ProbeConfig;
use crate::error::ProbeError;
use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand};
use nagcheck_engine::results::CheckReport;
use nagcheck_engine::types::Severity;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "nagcheck",
    version,
    about = "Nagios-compatible probes for switches, backups and HIDS servers"
)]
pub struct Cli {
    /// Configuration file (TOML); defaults to $NAGCHECK_CONFIG
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Print the report as JSON instead of plugin lines
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub probe: Probe,
}

#[derive(Debug, Subcommand)]
pub enum Probe {
    /// Check an Arista switch over eAPI
    Arista(AristaArgs),
    /// Check backup recency in a CrashPlan server
    Crashplan(CrashPlanArgs),
    /// Check an OSSEC server
    Ossec(OssecArgs),
}

#[derive(Debug, Args)]
pub struct AristaArgs {
    /// <host:port> e.g. arista.company.org:443
    #[arg(short = 'H', long)]
    pub host: String,

    /// File containing the API credentials
    #[arg(short = 'f', long = "filename")]
    pub credentials: PathBuf,

    /// Type of check
    #[arg(short = 'T', long = "type", value_enum)]
    pub check: AristaCheck,

    /// Items to skip (sep: ,)
    #[arg(short, long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Devices to check (def: all) (sep: ,) e.g. Ethernet1/1/3
    #[arg(short, long = "device", value_delimiter = ',')]
    pub devices: Vec<String>,

    /// Critical value in Mbps
    #[arg(short, long)]
    pub critical: Option<f64>,

    /// Warning value in Mbps
    #[arg(short, long)]
    pub warning: Option<f64>,

    /// Ethernet range for rate checks, e.g. 9/1-24
    #[arg(long)]
    pub interfaces: Option<String>,
}

#[derive(Debug, Args)]
pub struct CrashPlanArgs {
    /// File containing the API credentials
    #[arg(short = 'f', long = "filename")]
    pub credentials: PathBuf,

    /// Device backup report URL
    #[arg(long, default_value = DEFAULT_REPORT_URL)]
    pub url: String,

    /// Critical age in hours
    #[arg(short, long)]
    pub critical: Option<f64>,

    /// Warning age in hours
    #[arg(short, long)]
    pub warning: Option<f64>,
}

#[derive(Debug, Args)]
pub struct OssecArgs {
    /// Type of check
    #[arg(short = 'T', long = "type", value_enum)]
    pub check: OssecCheck,

    /// Items to skip (sep: ,)
    #[arg(short, long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Agents to check (def: all) (sep: ,) e.g. www1,www2
    #[arg(short, long, value_delimiter = ',')]
    pub agents: Vec<String>,

    /// Path of the OSSEC directory
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// Critical value: agent count, or hours for scan checks
    #[arg(short, long)]
    pub critical: Option<f64>,

    /// Warning value: agent count, or hours for scan checks
    #[arg(short, long)]
    pub warning: Option<f64>,
}

impl Probe {
    /// Name used in reports when the probe fails before running
    pub fn check_name(&self) -> &'static str {
        match self {
            Probe::Arista(args) => args.check.as_str(),
            Probe::Crashplan(_) => crashplan::CHECK_NAME,
            Probe::Ossec(args) => args.check.as_str(),
        }
    }
}

impl From<&AristaArgs> for AristaOptions {
    fn from(args: &AristaArgs) -> Self {
        Self {
            host: args.host.trim().to_string(),
            credentials_file: args.credentials.clone(),
            check: args.check,
            selection: ItemSelection::new(&args.skip, &args.devices),
            critical: args.critical,
            warning: args.warning,
            interfaces: args.interfaces.clone(),
        }
    }
}

impl From<&CrashPlanArgs> for CrashPlanOptions {
    fn from(args: &CrashPlanArgs) -> Self {
        Self {
            credentials_file: args.credentials.clone(),
            url: args.url.clone(),
            critical: args.critical,
            warning: args.warning,
        }
    }
}

impl From<&OssecArgs> for OssecOptions {
    fn from(args: &OssecArgs) -> Self {
        Self {
            check: args.check,
            selection: ItemSelection::new(&args.skip, &args.agents),
            path: args.path.clone(),
            critical: args.critical,
            warning: args.warning,
        }
    }
}

/// Log level for the `-v` count
pub fn log_level(verbose: u8) -> log::LevelFilter {
    match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    }
}

/// Exit code for an argument parsing failure
///
/// Help and version requests succeed; every other parse error is UNKNOWN so
/// the plugin never exits outside 0..=3.
pub fn parse_error_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => Severity::Unknown.exit_code(),
    }
}

/// Run the selected probe
pub fn run(cli: &Cli) -> Result<CheckReport, ProbeError> {
    let config = ProbeConfig::load(cli.config.as_deref())?;
    log::debug!("Effective configuration: {:?}", config);

    match &cli.probe {
        Probe::Arista(args) => arista::run(&args.into(), &config),
        Probe::Crashplan(args) => crashplan::run(&args.into(), &config),
        Probe::Ossec(args) => ossec::run(&args.into(), &config),
    }
}

/// Run and convert any error into an UNKNOWN report
pub fn execute(cli: &Cli) -> CheckReport {
    let check = cli.probe.check_name();
    run(cli).unwrap_or_else(|err| {
        log::error!("{} failed: {}", check, err);
        CheckReport::unknown(check, err.user_message())
    })
}

/// Lines to print for a report
pub fn render(report: &CheckReport, json: bool) -> Vec<String> {
    if json {
        match report.to_json() {
            Ok(text) => vec![text],
            Err(e) => vec![format!("UNKNOWN: failed to serialize report: {}", e)],
        }
    } else {
        report.lines()
    }
}
