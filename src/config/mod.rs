use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::path::Path;

pub mod loader;

pub const DEFAULT_INTERFACE: &str = "eth0";
pub const DEFAULT_TICK_MS: u64 = 100;
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 2_000;
pub const DEFAULT_WIDTH: u32 = 128;
pub const DEFAULT_HEIGHT: u32 = 32;
pub const DEFAULT_FRAMEBUFFER_PATH: &str = "/run/port-finder/frame";
const CONFIG_DIR_NAME: &str = ".port_finder";
const CONFIG_FILE_NAME: &str = "config.toml";

const MIN_TICK_MS: u64 = 10;
const MAX_TICK_MS: u64 = 10_000;
const MIN_PROBE_TIMEOUT_MS: u64 = 100;
const MAX_PROBE_TIMEOUT_MS: u64 = 60_000;
const MIN_WIDTH: u32 = 64;
const MAX_WIDTH: u32 = 512;
const MIN_HEIGHT: u32 = 32;
const MAX_HEIGHT: u32 = 256;

/// Where frames go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayKind {
    #[default]
    Headless,
    Framebuffer,
}

impl std::str::FromStr for DisplayKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "headless" | "none" => Ok(DisplayKind::Headless),
            "framebuffer" | "fb" => Ok(DisplayKind::Framebuffer),
            other => Err(format!(
                "unknown display '{other}' (expected headless or framebuffer)"
            )),
        }
    }
}

impl fmt::Display for DisplayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayKind::Headless => f.write_str("headless"),
            DisplayKind::Framebuffer => f.write_str("framebuffer"),
        }
    }
}

/// User-supplied settings loaded from the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub interface: String,
    pub dev_mode: bool,
    pub tick_ms: u64,
    pub probe_timeout_ms: u64,
    pub battery_addr: String,
    pub lldpctl_path: String,
    pub sysfs_net_root: String,
    pub scroll_px_per_sec: u32,
    pub scroll_gap_px: u32,
    pub static_max_chars: usize,
    pub width: u32,
    pub height: u32,
    pub display: DisplayKind,
    pub framebuffer_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interface: DEFAULT_INTERFACE.to_string(),
            dev_mode: false,
            tick_ms: DEFAULT_TICK_MS,
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
            battery_addr: crate::probe::battery::DEFAULT_BATTERY_ADDR.to_string(),
            lldpctl_path: crate::probe::lldp::DEFAULT_LLDPCTL.to_string(),
            sysfs_net_root: crate::probe::link::DEFAULT_SYSFS_NET.to_string(),
            scroll_px_per_sec: crate::display::scroll::DEFAULT_PIXELS_PER_SECOND,
            scroll_gap_px: crate::display::scroll::DEFAULT_GAP_PX,
            static_max_chars: crate::display::scroll::DEFAULT_STATIC_MAX_CHARS,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            display: DisplayKind::default(),
            framebuffer_path: DEFAULT_FRAMEBUFFER_PATH.to_string(),
        }
    }
}

impl Config {
    pub fn load_or_default() -> Result<Self> {
        loader::load_or_default()
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        loader::load_from_path(path)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        loader::save_to_path(self, path)
    }

    pub fn battery_socket_addr(&self) -> Result<SocketAddr> {
        parse_socket_addr(&self.battery_addr)
    }
}

pub fn parse_socket_addr(raw: &str) -> Result<SocketAddr> {
    raw.trim().parse().map_err(|_| {
        Error::InvalidArgs(format!("battery_addr '{raw}' must look like 127.0.0.1:8423"))
    })
}

pub fn validate_interface(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > 15 {
        return Err(Error::InvalidArgs(
            "interface must be 1-15 characters long".into(),
        ));
    }
    if name.contains('/') || name.chars().any(char::is_whitespace) || name.starts_with('.') {
        return Err(Error::InvalidArgs(format!(
            "interface '{name}' is not a valid interface name"
        )));
    }
    Ok(())
}

pub(crate) fn validate(cfg: &Config) -> Result<()> {
    validate_interface(&cfg.interface)?;
    if !(MIN_TICK_MS..=MAX_TICK_MS).contains(&cfg.tick_ms) {
        return Err(Error::InvalidArgs(format!(
            "tick_ms must be between {MIN_TICK_MS} and {MAX_TICK_MS}"
        )));
    }
    if !(MIN_PROBE_TIMEOUT_MS..=MAX_PROBE_TIMEOUT_MS).contains(&cfg.probe_timeout_ms) {
        return Err(Error::InvalidArgs(format!(
            "probe_timeout_ms must be between {MIN_PROBE_TIMEOUT_MS} and {MAX_PROBE_TIMEOUT_MS}"
        )));
    }
    parse_socket_addr(&cfg.battery_addr)?;
    if cfg.lldpctl_path.trim().is_empty() {
        return Err(Error::InvalidArgs("lldpctl_path must not be empty".into()));
    }
    if cfg.scroll_px_per_sec == 0 {
        return Err(Error::InvalidArgs(
            "scroll_px_per_sec must be at least 1".into(),
        ));
    }
    if cfg.static_max_chars == 0 {
        return Err(Error::InvalidArgs(
            "static_max_chars must be at least 1".into(),
        ));
    }
    if !(MIN_WIDTH..=MAX_WIDTH).contains(&cfg.width) {
        return Err(Error::InvalidArgs(format!(
            "width must be between {MIN_WIDTH} and {MAX_WIDTH}"
        )));
    }
    if !(MIN_HEIGHT..=MAX_HEIGHT).contains(&cfg.height) || cfg.height % 8 != 0 {
        return Err(Error::InvalidArgs(format!(
            "height must be a multiple of 8 between {MIN_HEIGHT} and {MAX_HEIGHT}"
        )));
    }
    if cfg.display == DisplayKind::Framebuffer && cfg.framebuffer_path.trim().is_empty() {
        return Err(Error::InvalidArgs(
            "framebuffer_path must be set when display = \"framebuffer\"".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = Config::default();
        validate(&cfg).unwrap();
        assert_eq!(cfg.interface, "eth0");
        assert_eq!(cfg.tick_ms, 100);
        assert_eq!(
            cfg.battery_socket_addr().unwrap(),
            "127.0.0.1:8423".parse().unwrap()
        );
    }

    #[test]
    fn display_kind_parses_aliases() {
        assert_eq!("FB".parse::<DisplayKind>().unwrap(), DisplayKind::Framebuffer);
        assert_eq!("headless".parse::<DisplayKind>().unwrap(), DisplayKind::Headless);
        assert!("oled".parse::<DisplayKind>().is_err());
        assert_eq!(DisplayKind::Framebuffer.to_string(), "framebuffer");
    }

    #[test]
    fn interface_names_are_checked() {
        validate_interface("eth0").unwrap();
        validate_interface("enx00e04c680001").unwrap();
        for bad in ["", "../etc", "eth 0", ".", "averyveryverylongname"] {
            assert!(validate_interface(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn rejects_bad_ranges() {
        let cases: Vec<(Config, &str)> = vec![
            (Config { tick_ms: 1, ..Config::default() }, "tick_ms"),
            (Config { probe_timeout_ms: 0, ..Config::default() }, "probe_timeout_ms"),
            (Config { battery_addr: "localhost".into(), ..Config::default() }, "battery_addr"),
            (Config { scroll_px_per_sec: 0, ..Config::default() }, "scroll_px_per_sec"),
            (Config { static_max_chars: 0, ..Config::default() }, "static_max_chars"),
            (Config { width: 16, ..Config::default() }, "width"),
            (Config { height: 36, ..Config::default() }, "height"),
            (
                Config {
                    display: DisplayKind::Framebuffer,
                    framebuffer_path: " ".into(),
                    ..Config::default()
                },
                "framebuffer_path",
            ),
        ];
        for (cfg, key) in cases {
            let err = validate(&cfg).unwrap_err();
            assert!(format!("{err}").contains(key), "{err} should mention {key}");
        }
    }
}
