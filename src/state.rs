use std::fmt;
use std::time::SystemTime;

pub const UNKNOWN_FIELD: &str = "Unknown";

/// Link state of the watched interface as reported by the link probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkStatus {
    Up,
    Down,
    /// The probe could not report (interface missing or unreadable).
    #[default]
    Unknown,
}

impl LinkStatus {
    pub fn is_up(self) -> bool {
        matches!(self, LinkStatus::Up)
    }
}

/// Neighbor details learned over LLDP for one interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LldpRecord {
    pub hostname: String,
    pub mgmt_ip: String,
    pub port: String,
    /// Parsed for completeness; never drawn.
    pub vlan: String,
}

impl Default for LldpRecord {
    fn default() -> Self {
        Self {
            hostname: UNKNOWN_FIELD.to_string(),
            mgmt_ip: UNKNOWN_FIELD.to_string(),
            port: UNKNOWN_FIELD.to_string(),
            vlan: UNKNOWN_FIELD.to_string(),
        }
    }
}

/// Battery charge, or `Unknown` when the sensor could not be read.
///
/// A failed read is kept distinct from a real empty battery so the display
/// never claims `0%` on a probe failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatteryLevel {
    Percent(u8),
    #[default]
    Unknown,
}

impl BatteryLevel {
    /// Build a level from a raw probe reading, clamping into `[0, 100]`.
    pub fn from_raw(raw: i64) -> Self {
        BatteryLevel::Percent(raw.clamp(0, 100) as u8)
    }

    /// Percentage used for the gauge fill; `Unknown` draws as empty.
    pub fn percent(self) -> u8 {
        match self {
            BatteryLevel::Percent(p) => p.min(100),
            BatteryLevel::Unknown => 0,
        }
    }

    pub fn label(self) -> String {
        match self {
            BatteryLevel::Percent(p) => format!("{}%", p.min(100)),
            BatteryLevel::Unknown => "--%".to_string(),
        }
    }
}

impl fmt::Display for BatteryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Results of one polling round. Built once per tick and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub link: LinkStatus,
    pub lldp_available: bool,
    pub lldp: Option<LldpRecord>,
    pub battery: BatteryLevel,
    pub timestamp: SystemTime,
}

impl StatusSnapshot {
    pub fn new(
        link: LinkStatus,
        lldp_available: bool,
        lldp: Option<LldpRecord>,
        battery: BatteryLevel,
    ) -> Self {
        Self {
            link,
            lldp_available,
            lldp,
            battery,
            timestamp: SystemTime::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn battery_level_clamps_raw_readings() {
        assert_eq!(BatteryLevel::from_raw(-5), BatteryLevel::Percent(0));
        assert_eq!(BatteryLevel::from_raw(57), BatteryLevel::Percent(57));
        assert_eq!(BatteryLevel::from_raw(140), BatteryLevel::Percent(100));
    }

    #[test]
    fn percent_reclamps_out_of_range_values() {
        assert_eq!(BatteryLevel::Percent(250).percent(), 100);
        assert_eq!(BatteryLevel::Percent(250).label(), "100%");
    }

    #[test]
    fn unknown_battery_renders_as_placeholder() {
        assert_eq!(BatteryLevel::Unknown.percent(), 0);
        assert_eq!(BatteryLevel::Unknown.to_string(), "--%");
    }

    #[test]
    fn default_record_is_all_unknown() {
        let record = LldpRecord::default();
        assert_eq!(record.hostname, "Unknown");
        assert_eq!(record.mgmt_ip, "Unknown");
        assert_eq!(record.port, "Unknown");
        assert_eq!(record.vlan, "Unknown");
    }
}
