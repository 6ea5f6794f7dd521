//! Arista eAPI collector
//!
//! eAPI is JSON-RPC 2.0 over HTTPS: `runCmds` with a list of CLI commands
//! returns one JSON result object per command.

use crate::collectors::http::{HttpSettings, HttpTransport};
use crate::credentials::Credentials;
use nagcheck_engine::strategies::{CollectionError, FactCollector, RecordCollector};
use nagcheck_engine::types::Record;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;

const EAPI_VERSION: u32 = 1;
const LINK_CHANGE_KEY: &str = "lastStatusChangeTimestamp";

#[derive(Debug, Serialize)]
struct RunCmdsRequest<'a> {
    jsonrpc: &'static str,
    method: &'static str,
    params: RunCmdsParams<'a>,
    id: &'static str,
}

#[derive(Debug, Serialize)]
struct RunCmdsParams<'a> {
    version: u32,
    cmds: &'a [&'a str],
    format: &'static str,
}

/// Client for one switch's command API
#[derive(Debug)]
pub struct EapiClient {
    transport: HttpTransport,
    endpoint: String,
}

impl EapiClient {
    /// `host` is `<host>` or `<host:port>`
    pub fn new(
        host: &str,
        credentials: Credentials,
        settings: &HttpSettings,
    ) -> Result<Self, CollectionError> {
        Ok(Self {
            transport: HttpTransport::new(settings, credentials)?,
            endpoint: endpoint_for(host),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run `cmds` and return one result per command
    pub fn run_cmds(&self, cmds: &[&str]) -> Result<Vec<Value>, CollectionError> {
        log::debug!("runCmds {:?} on {}", cmds, self.endpoint);
        let response = self
            .transport
            .post_json(&self.endpoint, &run_cmds_request(cmds))?;
        parse_run_cmds_response(&self.endpoint, response, cmds.len())
    }
}

pub fn endpoint_for(host: &str) -> String {
    format!("https://{}/command-api", host.trim_end_matches('/'))
}

fn run_cmds_request<'a>(cmds: &'a [&'a str]) -> RunCmdsRequest<'a> {
    RunCmdsRequest {
        jsonrpc: "2.0",
        method: "runCmds",
        params: RunCmdsParams {
            version: EAPI_VERSION,
            cmds,
            format: "json",
        },
        id: "nagcheck",
    }
}

/// Unwrap a JSON-RPC response into its per-command results
pub fn parse_run_cmds_response(
    endpoint: &str,
    response: Value,
    expected: usize,
) -> Result<Vec<Value>, CollectionError> {
    if let Some(error) = response.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown eAPI error");
        let code = error.get("code").and_then(Value::as_i64).unwrap_or_default();
        return Err(CollectionError::BackendError {
            endpoint: endpoint.to_string(),
            message: format!("{} (code {})", message, code),
        });
    }

    let results = match response {
        Value::Object(mut map) => map.remove("result"),
        _ => None,
    };

    match results {
        Some(Value::Array(results)) if results.len() == expected => Ok(results),
        Some(Value::Array(results)) => Err(CollectionError::data_format(format!(
            "expected {} command results, got {}",
            expected,
            results.len()
        ))),
        _ => Err(CollectionError::missing_field("result")),
    }
}

/// One record per interface from a `show interfaces` result
pub fn interface_records(result: &Value) -> Result<Vec<Record>, CollectionError> {
    let interfaces = result
        .get("interfaces")
        .and_then(Value::as_object)
        .ok_or_else(|| CollectionError::missing_field("interfaces"))?;

    Ok(interfaces
        .iter()
        .filter_map(|(name, info)| {
            info.as_object()
                .map(|fields| Record::from_json_object(name.as_str(), fields))
        })
        .collect())
}

/// `"<acl> - <rule text>"` for every non-permit rule outside skipped ACLs
pub fn acl_facts(result: &Value, skip: &BTreeSet<String>) -> Result<Vec<String>, CollectionError> {
    let acls = result
        .get("aclList")
        .and_then(Value::as_array)
        .ok_or_else(|| CollectionError::missing_field("aclList"))?;

    let mut facts = Vec::new();
    for acl in acls {
        let name = acl
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| CollectionError::missing_field("aclList.name"))?;
        if skip.contains(name) {
            continue;
        }

        let rules = acl.get("sequence").and_then(Value::as_array);
        for rule in rules.into_iter().flatten() {
            let Some(text) = rule.get("text").and_then(Value::as_str) else {
                continue;
            };
            if text.contains("permit") {
                continue;
            }
            facts.push(format!("{} - {}", name, text));
        }
    }
    Ok(facts)
}

/// `"<interface> <lastStatusChangeTimestamp>"` in interface order
pub fn link_facts(result: &Value, skip: &BTreeSet<String>) -> Result<Vec<String>, CollectionError> {
    let interfaces = result
        .get("interfaces")
        .and_then(Value::as_object)
        .ok_or_else(|| CollectionError::missing_field("interfaces"))?;

    let mut names: Vec<&String> = interfaces.keys().collect();
    names.sort();

    Ok(names
        .into_iter()
        .filter(|name| !skip.contains(name.as_str()))
        .filter_map(|name| {
            let stamp = interfaces.get(name)?.get(LINK_CHANGE_KEY)?;
            let stamp = match stamp {
                Value::String(s) => s.clone(),
                Value::Null => return None,
                other => other.to_string(),
            };
            Some(format!("{} {}", name, stamp))
        })
        .collect())
}

// ============================================================================
// Collectors
// ============================================================================

/// Interface records from `show interfaces [<range>]`
pub struct InterfaceCollector<'a> {
    client: &'a EapiClient,
    command: String,
}

impl<'a> InterfaceCollector<'a> {
    pub fn all(client: &'a EapiClient) -> Self {
        Self {
            client,
            command: "show interfaces".to_string(),
        }
    }

    /// Restrict to an Ethernet range such as `9/1-24`
    pub fn ethernet_range(client: &'a EapiClient, range: &str) -> Self {
        Self {
            client,
            command: format!("show interfaces Ethernet{}", range),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

impl RecordCollector for InterfaceCollector<'_> {
    fn collector_id(&self) -> &str {
        "arista_interfaces"
    }

    fn collect(&self) -> Result<Vec<Record>, CollectionError> {
        let results = self.client.run_cmds(&[self.command.as_str()])?;
        let records = interface_records(&results[0])?;
        log::info!("Collected {} interfaces from {}", records.len(), self.client.endpoint());
        Ok(records)
    }
}

/// Non-permit ACL rules for the `dumbno` change check
pub struct AclCollector<'a> {
    client: &'a EapiClient,
    skip: BTreeSet<String>,
}

impl<'a> AclCollector<'a> {
    pub fn new(client: &'a EapiClient, skip: BTreeSet<String>) -> Self {
        Self { client, skip }
    }
}

impl FactCollector for AclCollector<'_> {
    fn collector_id(&self) -> &str {
        "arista_acl"
    }

    fn collect_facts(&self) -> Result<Vec<String>, CollectionError> {
        let results = self.client.run_cmds(&["enable", "show ip access-lists"])?;
        acl_facts(&results[1], &self.skip)
    }
}

/// Interface status-change timestamps for the `link_status` change check
pub struct LinkStatusCollector<'a> {
    client: &'a EapiClient,
    skip: BTreeSet<String>,
}

impl<'a> LinkStatusCollector<'a> {
    pub fn new(client: &'a EapiClient, skip: BTreeSet<String>) -> Self {
        Self { client, skip }
    }
}

impl FactCollector for LinkStatusCollector<'_> {
    fn collector_id(&self) -> &str {
        "arista_link_status"
    }

    fn collect_facts(&self) -> Result<Vec<String>, CollectionError> {
        let results = self.client.run_cmds(&["show interfaces"])?;
        link_facts(&results[0], &self.skip)
    }
}
