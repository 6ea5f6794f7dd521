//! Backup recency check against the CrashPlan device backup report

use crate::checks::run_record_check;
use crate::collectors::crashplan::{BackupReportCollector, AGE_FIELD};
use crate::collectors::http::{HttpSettings, HttpTransport};
use crate::config::ProbeConfig;
use crate::credentials::Credentials;
use crate::error::ProbeError;
use nagcheck_engine::execution::{Aggregation, AggregationMode, ItemEvaluator, ItemRule, Threshold};
use nagcheck_engine::results::CheckReport;
use std::path::PathBuf;

pub const CHECK_NAME: &str = "backup_age";

/// Hours since the last completed backup
pub const DEFAULT_MAX_AGE_HOURS: f64 = 48.0;

#[derive(Debug, Clone)]
pub struct CrashPlanOptions {
    pub credentials_file: PathBuf,
    pub url: String,
    pub critical: Option<f64>,
    pub warning: Option<f64>,
}

impl CrashPlanOptions {
    pub fn threshold(&self) -> Threshold {
        Threshold::new(
            self.critical.unwrap_or(DEFAULT_MAX_AGE_HOURS),
            self.warning.unwrap_or(DEFAULT_MAX_AGE_HOURS),
        )
    }
}

pub fn evaluator(threshold: Threshold) -> ItemEvaluator {
    ItemEvaluator::new(ItemRule::ceiling(AGE_FIELD, threshold).scaled(1.0, "hours"))
}

pub fn report(aggregation: &Aggregation) -> CheckReport {
    CheckReport::from_aggregation(
        CHECK_NAME,
        aggregation,
        "All backups have been completed recently",
        format!(
            "{} devices have not completed a recent backup",
            aggregation.failed_count()
        ),
    )
}

pub fn run(options: &CrashPlanOptions, config: &ProbeConfig) -> Result<CheckReport, ProbeError> {
    let credentials = Credentials::load(&options.credentials_file)?;
    let settings = HttpSettings {
        timeout: config.http_timeout(),
        accept_invalid_certs: config.accept_invalid_certs,
    };
    let collector = BackupReportCollector::new(
        HttpTransport::new(&settings, credentials)?,
        options.url.clone(),
    );

    let aggregation = run_record_check(
        &collector,
        &evaluator(options.threshold()),
        AggregationMode::WorstOfN,
    )?;
    Ok(report(&aggregation))
}
