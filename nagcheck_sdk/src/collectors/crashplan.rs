//! CrashPlan device backup report collector

use crate::collectors::http::HttpTransport;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use nagcheck_engine::strategies::{CollectionError, RecordCollector};
use nagcheck_engine::types::{FieldValue, Record};
use serde_json::Value;

/// Timestamp format of `lastCompletedBackupDate`, e.g. `Mar 4, 2024 1:05:09 PM`
pub const BACKUP_DATE_FORMAT: &str = "%b %d, %Y %I:%M:%S %p";

pub const DEFAULT_REPORT_URL: &str =
    "https://crashplan.company.com:4285/api/DeviceBackupReport?active=true&srtKey=lastConnectedDate";

pub const AGE_FIELD: &str = "backup_age_hours";
pub const DATE_FIELD: &str = "lastCompletedBackupDate";

pub struct BackupReportCollector {
    transport: HttpTransport,
    url: String,
}

impl BackupReportCollector {
    pub fn new(transport: HttpTransport, url: impl Into<String>) -> Self {
        Self {
            transport,
            url: url.into(),
        }
    }
}

impl RecordCollector for BackupReportCollector {
    fn collector_id(&self) -> &str {
        "crashplan_backup_report"
    }

    fn collect(&self) -> Result<Vec<Record>, CollectionError> {
        let body = self.transport.get_json(&self.url)?;
        parse_backup_report(&body, Local::now())
    }
}

/// Parse a local-time backup date; `None` if malformed or nonexistent
pub fn parse_backup_date(text: &str) -> Option<DateTime<Local>> {
    let naive = NaiveDateTime::parse_from_str(text.trim(), BACKUP_DATE_FORMAT).ok()?;
    Local.from_local_datetime(&naive).earliest()
}

/// One record per device with a completed backup, ages relative to `now`
///
/// Devices that never completed a backup (null date) are left out. A date
/// that cannot be parsed yields a null age.
pub fn parse_backup_report(
    body: &Value,
    now: DateTime<Local>,
) -> Result<Vec<Record>, CollectionError> {
    let devices = body
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| CollectionError::missing_field("data"))?;

    let mut records = Vec::with_capacity(devices.len());
    for device in devices {
        let name = device
            .get("deviceName")
            .and_then(Value::as_str)
            .ok_or_else(|| CollectionError::missing_field("deviceName"))?;

        let date = match device.get(DATE_FIELD) {
            None | Some(Value::Null) => {
                log::debug!("Device '{}' has no completed backup, skipping", name);
                continue;
            }
            Some(Value::String(date)) => date.as_str(),
            Some(other) => {
                return Err(CollectionError::data_format(format!(
                    "{} for '{}' is not a string: {}",
                    DATE_FIELD, name, other
                )))
            }
        };

        let age = match parse_backup_date(date) {
            Some(completed) => {
                FieldValue::Float((now - completed).num_seconds() as f64 / 3600.0)
            }
            None => {
                log::warn!("Unparsable backup date '{}' for device '{}'", date, name);
                FieldValue::Null
            }
        };

        records.push(
            Record::new(name)
                .with_field(DATE_FIELD, date)
                .with_field(AGE_FIELD, age),
        );
    }
    Ok(records)
}
