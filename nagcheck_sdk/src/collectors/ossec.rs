//! OSSEC server collectors
//!
//! Agent and service state come from the OSSEC control binaries. Scan
//! runtimes come from the per-agent queue files under `queue/rootcheck`.

use chrono::{DateTime, Utc};
use nagcheck_engine::strategies::{CollectionError, RecordCollector, SystemCommandExecutor};
use nagcheck_engine::types::{FieldValue, Record};
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Files every server installation carries, relative to the root
pub const REQUIRED_FILES: [&str; 5] = [
    "etc/ossec.conf",
    "etc/shared/agent.conf",
    "bin/syscheck_control",
    "bin/rootcheck_control",
    "bin/agent_control",
];

pub const AGENT_CONTROL: &str = "bin/agent_control";
pub const OSSEC_CONTROL: &str = "bin/ossec-control";
pub const QUEUE_DIR: &str = "queue/rootcheck";

pub const STATUS_FIELD: &str = "status";
pub const AGE_FIELD: &str = "age_hours";
pub const STATE_FIELD: &str = "state";

#[derive(Debug, thiserror::Error)]
pub enum InstallationError {
    #[error("Installation missing file {}", path.display())]
    MissingFile { path: PathBuf },

    #[error("Cannot open file {}. Is OSSEC installed?", path.display())]
    InitConfUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to detect OSSEC server: {found}")]
    NotServer { found: String },
}

/// Check the install layout and that it is a server install
pub fn validate_installation(root: &Path, init_conf: &Path) -> Result<(), InstallationError> {
    for file in REQUIRED_FILES {
        let path = root.join(file);
        if !path.is_file() {
            return Err(InstallationError::MissingFile { path });
        }
    }

    let contents =
        fs::read_to_string(init_conf).map_err(|source| InstallationError::InitConfUnreadable {
            path: init_conf.to_path_buf(),
            source,
        })?;

    match install_type(&contents) {
        Some("server") => Ok(()),
        other => Err(InstallationError::NotServer {
            found: other.unwrap_or("no TYPE entry").to_string(),
        }),
    }
}

/// Value of the `TYPE=` entry, quotes stripped
pub fn install_type(init_conf: &str) -> Option<&str> {
    init_conf
        .lines()
        .filter_map(|line| line.trim().strip_prefix("TYPE="))
        .map(|value| value.trim().trim_matches('"'))
        .next()
}

// ============================================================================
// Output parsing
// ============================================================================

/// Agent records from `agent_control -l`
///
/// Only lines with exactly four comma-separated fields describe an agent:
/// `ID: 001, Name: www1, IP: 10.0.0.1, Active`. Duplicate names collapse.
pub fn parse_agent_list<'a, I>(lines: I) -> Vec<Record>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut agents = BTreeMap::new();

    for line in lines {
        let parts: Vec<&str> = line.split(',').collect();
        if parts.len() != 4 {
            continue;
        }

        let name_field = parts[1].trim();
        let name = name_field
            .strip_prefix("Name:")
            .unwrap_or(name_field)
            .trim();
        if name.is_empty() {
            continue;
        }

        agents.insert(name.to_string(), parts[3].trim().to_string());
    }

    agents
        .into_iter()
        .map(|(name, status)| Record::new(name).with_field(STATUS_FIELD, status))
        .collect()
}

/// Service records from `ossec-control status`
///
/// Each non-empty line names a service in its first word; the service is
/// `not running` when the line says so.
pub fn parse_service_status<'a, I>(lines: I) -> Vec<Record>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut services = BTreeMap::new();

    for line in lines.into_iter().map(str::trim).filter(|l| !l.is_empty()) {
        let Some(name) = line.split_whitespace().next() else {
            continue;
        };
        let state = if line.contains("not running") {
            "not running"
        } else {
            "running"
        };
        services.insert(name.to_string(), state);
    }

    services
        .into_iter()
        .map(|(name, state)| Record::new(name).with_field(STATE_FIELD, state))
        .collect()
}

/// Agent name from a queue file name such as `(www1) 10.0.0.1->rootcheck`
pub fn agent_name_from_queue_file(file_name: &str) -> Option<String> {
    let trimmed = file_name.trim_matches(|c| c == '(' || c == ')');
    let first = trimmed.split_whitespace().next()?;
    let name = first.trim_end_matches(')');
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Kind of scan whose runtime is checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanService {
    Syscheck,
    Rootcheck,
}

impl ScanService {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanService::Syscheck => "syscheck",
            ScanService::Rootcheck => "rootcheck",
        }
    }
}

/// Extracts the start epoch from queue lines like `!1700000000 Starting syscheck scan.`
pub struct ScanStartParser {
    epoch: Regex,
    marker: String,
}

impl ScanStartParser {
    pub fn new(service: ScanService) -> Result<Self, CollectionError> {
        let epoch = Regex::new(r"^.(\d{10})")
            .map_err(|e| CollectionError::data_format(format!("invalid epoch pattern: {}", e)))?;
        Ok(Self {
            epoch,
            marker: format!("Starting {} scan.", service.as_str()),
        })
    }

    /// Epoch of the first scan start entry, if any
    pub fn scan_start(&self, contents: &str) -> Option<i64> {
        let line = contents.lines().find(|line| line.contains(&self.marker))?;
        let captures = self.epoch.captures(line)?;
        captures.get(1)?.as_str().parse().ok()
    }
}

// ============================================================================
// Collectors
// ============================================================================

pub struct AgentCollector<'a> {
    executor: &'a SystemCommandExecutor,
    program: String,
}

impl<'a> AgentCollector<'a> {
    pub fn new(executor: &'a SystemCommandExecutor, root: &Path) -> Self {
        Self {
            executor,
            program: root.join(AGENT_CONTROL).to_string_lossy().to_string(),
        }
    }
}

impl RecordCollector for AgentCollector<'_> {
    fn collector_id(&self) -> &str {
        "ossec_agents"
    }

    fn collect(&self) -> Result<Vec<Record>, CollectionError> {
        let output = self.executor.execute(&self.program, &["-l"], None)?;
        if !output.success() {
            log::warn!(
                "{} exited with {}: {}",
                self.program,
                output.exit_code,
                output.stderr.trim()
            );
        }
        Ok(parse_agent_list(output.lines()))
    }
}

pub struct ServiceCollector<'a> {
    executor: &'a SystemCommandExecutor,
    program: String,
}

impl<'a> ServiceCollector<'a> {
    pub fn new(executor: &'a SystemCommandExecutor, root: &Path) -> Self {
        Self {
            executor,
            program: root.join(OSSEC_CONTROL).to_string_lossy().to_string(),
        }
    }
}

impl RecordCollector for ServiceCollector<'_> {
    fn collector_id(&self) -> &str {
        "ossec_services"
    }

    fn collect(&self) -> Result<Vec<Record>, CollectionError> {
        // ossec-control exits non-zero when a service is down
        let output = self.executor.execute(&self.program, &["status"], None)?;
        Ok(parse_service_status(output.lines()))
    }
}

/// Scan age per agent from the queue directory
pub struct ScanAgeCollector {
    queue_dir: PathBuf,
    parser: ScanStartParser,
    now: DateTime<Utc>,
}

impl ScanAgeCollector {
    pub fn new(root: &Path, service: ScanService) -> Result<Self, CollectionError> {
        Ok(Self {
            queue_dir: root.join(QUEUE_DIR),
            parser: ScanStartParser::new(service)?,
            now: Utc::now(),
        })
    }

    /// Measure ages against a fixed instant
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    fn age_hours(&self, epoch: i64) -> FieldValue {
        match DateTime::<Utc>::from_timestamp(epoch, 0) {
            Some(started) => {
                FieldValue::Float((self.now - started).num_seconds() as f64 / 3600.0)
            }
            None => FieldValue::Null,
        }
    }
}

impl RecordCollector for ScanAgeCollector {
    fn collector_id(&self) -> &str {
        "ossec_scan_queue"
    }

    fn collect(&self) -> Result<Vec<Record>, CollectionError> {
        let mut records = Vec::new();

        for entry in WalkDir::new(&self.queue_dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| CollectionError::Io {
                path: self.queue_dir.clone(),
                source: e.into(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy();
            let Some(name) = agent_name_from_queue_file(&file_name) else {
                log::debug!("Ignoring queue file '{}'", file_name);
                continue;
            };

            let bytes = fs::read(entry.path()).map_err(|source| CollectionError::Io {
                path: entry.path().to_path_buf(),
                source,
            })?;
            let contents = String::from_utf8_lossy(&bytes);

            let age = match self.parser.scan_start(&contents) {
                Some(epoch) => self.age_hours(epoch),
                None => FieldValue::Null,
            };
            records.push(Record::new(name).with_field(AGE_FIELD, age));
        }

        log::info!(
            "Read {} queue files from {}",
            records.len(),
            self.queue_dir.display()
        );
        Ok(records)
    }
}
