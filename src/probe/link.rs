use std::fs;
use std::path::{Path, PathBuf};

use super::errors::classify_io_error;
use super::{LinkProbe, ProbeError};
use crate::state::LinkStatus;

pub const DEFAULT_SYSFS_NET: &str = "/sys/class/net";

/// Reads link state from the kernel's `operstate` and `carrier` attributes.
pub struct SysfsLink {
    root: PathBuf,
}

impl SysfsLink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for SysfsLink {
    fn default() -> Self {
        Self::new(DEFAULT_SYSFS_NET)
    }
}

impl LinkProbe for SysfsLink {
    fn link_status(&mut self, interface: &str) -> Result<LinkStatus, ProbeError> {
        let dir = self.root.join(interface);
        if !dir.is_dir() {
            return Err(ProbeError::Unavailable(format!(
                "no interface {interface} under {}",
                self.root.display()
            )));
        }
        let status = match read_attr(&dir, "operstate")?.as_str() {
            "up" => LinkStatus::Up,
            // Drivers without operstate support report "unknown"; fall back to carrier.
            "unknown" => match read_attr(&dir, "carrier") {
                Ok(carrier) if carrier == "1" => LinkStatus::Up,
                _ => LinkStatus::Down,
            },
            _ => LinkStatus::Down,
        };
        Ok(status)
    }
}

fn read_attr(dir: &Path, name: &str) -> Result<String, ProbeError> {
    let path = dir.join(name);
    fs::read_to_string(&path)
        .map(|raw| raw.trim().to_ascii_lowercase())
        .map_err(|e| classify_io_error(&format!("read {}", path.display()), &e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fake_iface(root: &TempDir, name: &str, operstate: &str, carrier: Option<&str>) {
        let dir = root.path().join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("operstate"), format!("{operstate}\n")).unwrap();
        if let Some(carrier) = carrier {
            fs::write(dir.join("carrier"), format!("{carrier}\n")).unwrap();
        }
    }

    #[test]
    fn operstate_up_and_down() {
        let root = TempDir::new().unwrap();
        fake_iface(&root, "eth0", "up", Some("1"));
        fake_iface(&root, "eth1", "down", None);
        let mut probe = SysfsLink::new(root.path());
        assert_eq!(probe.link_status("eth0").unwrap(), LinkStatus::Up);
        assert_eq!(probe.link_status("eth1").unwrap(), LinkStatus::Down);
    }

    #[test]
    fn unknown_operstate_uses_carrier() {
        let root = TempDir::new().unwrap();
        fake_iface(&root, "usb0", "unknown", Some("1"));
        fake_iface(&root, "usb1", "unknown", Some("0"));
        fake_iface(&root, "usb2", "unknown", None);
        let mut probe = SysfsLink::new(root.path());
        assert_eq!(probe.link_status("usb0").unwrap(), LinkStatus::Up);
        assert_eq!(probe.link_status("usb1").unwrap(), LinkStatus::Down);
        assert_eq!(probe.link_status("usb2").unwrap(), LinkStatus::Down);
    }

    #[test]
    fn missing_interface_is_unavailable() {
        let root = TempDir::new().unwrap();
        let mut probe = SysfsLink::new(root.path());
        assert_eq!(probe.link_status("eth9").unwrap_err().kind(), "unavailable");
    }

    #[test]
    fn missing_operstate_is_an_error() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("eth0")).unwrap();
        let mut probe = SysfsLink::new(root.path());
        assert!(probe.link_status("eth0").is_err());
    }
}
