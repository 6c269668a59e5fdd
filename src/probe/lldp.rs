use std::time::Duration;

use log::debug;
use serde_json::{Map, Value};

use super::command::run_with_timeout;
use super::{LldpProbe, ProbeError};
use crate::state::{LldpRecord, UNKNOWN_FIELD};

pub const DEFAULT_LLDPCTL: &str = "lldpctl";

/// Queries the local `lldpd` through its `lldpctl` client.
pub struct LldpCtl {
    program: String,
    timeout: Duration,
}

impl LldpCtl {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    fn query(&self, format: &str, interface: &str) -> Result<String, ProbeError> {
        let output = run_with_timeout(&self.program, &["-f", format, interface], self.timeout)?
            .require_success(&self.program)?;
        Ok(output.stdout)
    }
}

impl LldpProbe for LldpCtl {
    fn has_neighbor(&mut self, interface: &str) -> Result<bool, ProbeError> {
        let raw = self.query("keyvalue", interface)?;
        Ok(has_keyvalue_entry(&raw, interface))
    }

    fn neighbor(&mut self, interface: &str) -> Result<LldpRecord, ProbeError> {
        let raw = self.query("json", interface)?;
        parse_neighbor_json(&raw, interface)
    }
}

/// True when the keyvalue dump carries at least one `lldp.<interface>.` entry.
pub fn has_keyvalue_entry(raw: &str, interface: &str) -> bool {
    let prefix = format!("lldp.{interface}.");
    raw.lines().any(|line| line.trim_start().starts_with(&prefix))
}

/// Pull the neighbor record for `interface` out of `lldpctl -f json` output.
///
/// Only the first chassis (in document order) is reported. Leaf fields that
/// are absent come back as [`UNKNOWN_FIELD`]; a document without the
/// interface or chassis objects is malformed.
pub fn parse_neighbor_json(raw: &str, interface: &str) -> Result<LldpRecord, ProbeError> {
    let doc: Value = serde_json::from_str(raw)
        .map_err(|e| ProbeError::Malformed(format!("lldpctl json: {e}")))?;

    let entries = interface_entries(&doc, interface);
    let entry = entries.first().copied().ok_or_else(|| {
        ProbeError::Malformed(format!("no lldp.interface.{interface} object in output"))
    })?;
    if entries.len() > 1 {
        debug!(
            "{} neighbors on {interface}, showing the first",
            entries.len()
        );
    }

    let chassis = entry
        .get("chassis")
        .and_then(Value::as_object)
        .ok_or_else(|| ProbeError::Malformed(format!("no chassis for {interface}")))?;
    let (hostname, details) = first_chassis(chassis)?;

    let mgmt_ip = details.get("mgmt-ip").and_then(leaf_text);
    let port = entry.pointer("/port/id/value").and_then(leaf_text);
    let vlan = entry
        .get("vlan")
        .map(first_item)
        .and_then(|v| v.get("vlan-id"))
        .and_then(leaf_text);

    Ok(LldpRecord {
        hostname,
        mgmt_ip: mgmt_ip.unwrap_or_else(unknown),
        port: port.unwrap_or_else(unknown),
        vlan: vlan.unwrap_or_else(unknown),
    })
}

fn unknown() -> String {
    UNKNOWN_FIELD.to_string()
}

// lldpctl emits `interface` as an object for one neighbor and as an array of
// single-key objects when several neighbors share the port.
fn interface_entries<'a>(doc: &'a Value, interface: &str) -> Vec<&'a Value> {
    let Some(node) = doc.get("lldp").and_then(|l| l.get("interface")) else {
        return Vec::new();
    };
    match node {
        Value::Object(map) => match map.get(interface) {
            Some(Value::Array(list)) => list.iter().collect(),
            Some(entry) => vec![entry],
            None => Vec::new(),
        },
        Value::Array(list) => list.iter().filter_map(|e| e.get(interface)).collect(),
        _ => Vec::new(),
    }
}

fn first_chassis(
    chassis: &Map<String, Value>,
) -> Result<(String, &Map<String, Value>), ProbeError> {
    // Without a system name, lldpctl puts the chassis fields at this level.
    if chassis.contains_key("id") {
        return Ok((unknown(), chassis));
    }
    let (name, details) = chassis
        .iter()
        .next()
        .ok_or_else(|| ProbeError::Malformed("empty chassis object".into()))?;
    let details = details
        .as_object()
        .ok_or_else(|| ProbeError::Malformed(format!("chassis '{name}' is not an object")))?;
    Ok((name.clone(), details))
}

fn first_item(value: &Value) -> &Value {
    match value {
        Value::Array(items) => items.first().unwrap_or(value),
        other => other,
    }
}

fn leaf_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => items.iter().find_map(leaf_text),
        Value::Object(map) => map.get("value").and_then(leaf_text),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
      "lldp": {
        "interface": {
          "eth0": {
            "via": "LLDP",
            "chassis": {
              "dc1-core-01.example.net": {
                "id": {"type": "mac", "value": "00:11:22:33:44:55"},
                "mgmt-ip": "10.20.30.40"
              }
            },
            "port": {"id": {"type": "ifname", "value": "Gi1/0/22"}},
            "vlan": {"vlan-id": "120", "pvid": true}
          }
        }
      }
    }"#;

    #[test]
    fn extracts_neighbor_fields() {
        let record = parse_neighbor_json(SAMPLE, "eth0").unwrap();
        assert_eq!(record.hostname, "dc1-core-01.example.net");
        assert_eq!(record.mgmt_ip, "10.20.30.40");
        assert_eq!(record.port, "Gi1/0/22");
        assert_eq!(record.vlan, "120");
    }

    #[test]
    fn missing_leaves_become_unknown() {
        let raw = r#"{"lldp":{"interface":{"eth0":{"chassis":{"sw1":{}}}}}}"#;
        let record = parse_neighbor_json(raw, "eth0").unwrap();
        assert_eq!(record.hostname, "sw1");
        assert_eq!(record.mgmt_ip, UNKNOWN_FIELD);
        assert_eq!(record.port, UNKNOWN_FIELD);
        assert_eq!(record.vlan, UNKNOWN_FIELD);
    }

    #[test]
    fn array_valued_fields_use_first_entry() {
        let raw = r#"{"lldp":{"interface":{"eth0":{
            "chassis":{"sw1":{"mgmt-ip":["10.0.0.1","fe80::1"]}},
            "port":{"id":{"value":"Te1/1"}},
            "vlan":[{"vlan-id":"5"},{"vlan-id":"6"}]
        }}}}"#;
        let record = parse_neighbor_json(raw, "eth0").unwrap();
        assert_eq!(record.mgmt_ip, "10.0.0.1");
        assert_eq!(record.vlan, "5");
    }

    #[test]
    fn first_chassis_in_document_order_wins() {
        let raw = r#"{"lldp":{"interface":{"eth0":{"chassis":{
            "zz-switch":{"mgmt-ip":"10.0.0.9"},
            "aa-switch":{"mgmt-ip":"10.0.0.1"}
        }}}}}"#;
        let record = parse_neighbor_json(raw, "eth0").unwrap();
        assert_eq!(record.hostname, "zz-switch");
        assert_eq!(record.mgmt_ip, "10.0.0.9");
    }

    #[test]
    fn interface_array_form_is_accepted() {
        let raw = r#"{"lldp":{"interface":[
            {"eth0":{"chassis":{"first":{"mgmt-ip":"1.1.1.1"}}}},
            {"eth0":{"chassis":{"second":{"mgmt-ip":"2.2.2.2"}}}}
        ]}}"#;
        let record = parse_neighbor_json(raw, "eth0").unwrap();
        assert_eq!(record.hostname, "first");
    }

    #[test]
    fn chassis_without_name_reports_unknown_hostname() {
        let raw = r#"{"lldp":{"interface":{"eth0":{"chassis":{
            "id":{"type":"mac","value":"00:11:22:33:44:55"},
            "mgmt-ip":"10.1.1.1"
        }}}}}"#;
        let record = parse_neighbor_json(raw, "eth0").unwrap();
        assert_eq!(record.hostname, UNKNOWN_FIELD);
        assert_eq!(record.mgmt_ip, "10.1.1.1");
    }

    #[test]
    fn structural_problems_are_malformed() {
        for raw in [
            "not json",
            r#"{"lldp":{}}"#,
            r#"{"lldp":{"interface":{"eth1":{}}}}"#,
            r#"{"lldp":{"interface":{"eth0":{"via":"LLDP"}}}}"#,
            r#"{"lldp":{"interface":{"eth0":{"chassis":{}}}}}"#,
        ] {
            let err = parse_neighbor_json(raw, "eth0").unwrap_err();
            assert_eq!(err.kind(), "malformed", "input: {raw}");
        }
    }

    #[test]
    fn keyvalue_detection_matches_interface_prefix() {
        let raw = "lldp.eth0.via=LLDP\nlldp.eth0.chassis.name=sw1\n";
        assert!(has_keyvalue_entry(raw, "eth0"));
        assert!(!has_keyvalue_entry(raw, "eth1"));
        assert!(!has_keyvalue_entry("", "eth0"));
        assert!(!has_keyvalue_entry("lldp.eth00.via=LLDP", "eth0"));
    }

    #[test]
    fn failing_lldpctl_is_transient() {
        let mut probe = LldpCtl::new("false", Duration::from_secs(5));
        let err = probe.has_neighbor("eth0").unwrap_err();
        assert_eq!(err, ProbeError::Transient("false failed with exit code 1".into()));
    }

    #[test]
    fn missing_lldpctl_is_unavailable() {
        let mut probe = LldpCtl::new("/nonexistent/lldpctl", Duration::from_secs(1));
        assert_eq!(probe.neighbor("eth0").unwrap_err().kind(), "unavailable");
    }
}
