use crate::state::{LldpRecord, StatusSnapshot};

pub const LLDP_HEADER: &str = "LLDP Information";
pub const DEV_HEADER: &str = "Dev LLDP Info";
pub const NO_LLDP_LINES: [&str; 2] = ["No LLDP information", "available."];
pub const DEV_MGMT_LABEL: &str = "MGMT IP: ";

/// Display mode for one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    NoLink,
    NoLldp,
    LldpInfo(LldpRecord),
    DevDemo,
}

/// One text line of a screen, positioned by row index (8 px rows).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenLine {
    pub row: u8,
    pub text: String,
    pub scroll: bool,
}

impl ScreenLine {
    fn fixed(row: u8, text: impl Into<String>) -> Self {
        Self {
            row,
            text: text.into(),
            scroll: false,
        }
    }

    fn scrolling(row: u8, text: impl Into<String>) -> Self {
        Self {
            row,
            text: text.into(),
            scroll: true,
        }
    }
}

/// Pick the screen for a snapshot. Pure and total: the previous screen plays no part.
pub fn select_screen(snapshot: &StatusSnapshot) -> Screen {
    if !snapshot.link.is_up() {
        return Screen::NoLink;
    }
    if !snapshot.lldp_available {
        return Screen::NoLldp;
    }
    Screen::LldpInfo(snapshot.lldp.clone().unwrap_or_default())
}

/// Fixed neighbor used by dev mode to exercise the scroller without hardware.
pub fn demo_record() -> LldpRecord {
    LldpRecord {
        hostname: "dc1-tst-net-sw-005.letsautomateit.com".into(),
        mgmt_ip: "222.222.222.222".into(),
        port: "Gi1/0/22".into(),
        vlan: "4096".into(),
    }
}

impl Screen {
    pub fn name(&self) -> &'static str {
        match self {
            Screen::NoLink => "no-link",
            Screen::NoLldp => "no-lldp",
            Screen::LldpInfo(_) => "lldp-info",
            Screen::DevDemo => "dev-demo",
        }
    }

    /// Lines to draw for this screen. VLAN is intentionally absent.
    pub fn lines(&self, interface: &str) -> Vec<ScreenLine> {
        match self {
            Screen::NoLink => vec![ScreenLine::fixed(2, format!("{interface} not connected"))],
            Screen::NoLldp => vec![
                ScreenLine::fixed(1, NO_LLDP_LINES[0]),
                ScreenLine::fixed(2, NO_LLDP_LINES[1]),
            ],
            Screen::LldpInfo(record) => record_lines(LLDP_HEADER, "", record),
            Screen::DevDemo => record_lines(DEV_HEADER, DEV_MGMT_LABEL, &demo_record()),
        }
    }

    /// Whether the screen owns the header row (row 0) next to the battery.
    pub fn has_header(&self) -> bool {
        matches!(self, Screen::LldpInfo(_) | Screen::DevDemo)
    }
}

fn record_lines(header: &str, mgmt_label: &str, record: &LldpRecord) -> Vec<ScreenLine> {
    vec![
        ScreenLine::fixed(0, header),
        ScreenLine::scrolling(1, format!("{mgmt_label}{}", record.mgmt_ip)),
        ScreenLine::scrolling(2, record.hostname.clone()),
        ScreenLine::scrolling(3, record.port.clone()),
    ]
}
