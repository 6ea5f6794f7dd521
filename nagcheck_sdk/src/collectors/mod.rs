//! Backend adapters producing records or snapshot facts

pub mod arista;
pub mod crashplan;
pub mod http;
pub mod ossec;

pub use arista::{AclCollector, EapiClient, InterfaceCollector, LinkStatusCollector};
pub use crashplan::BackupReportCollector;
pub use http::{HttpSettings, HttpTransport};
pub use ossec::{AgentCollector, ScanAgeCollector, ScanService, ServiceCollector};
