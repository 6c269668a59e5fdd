use log::{debug, info, warn};

use crate::probe::{BatteryProbe, LinkProbe, LldpProbe, ProbeError};
use crate::state::{BatteryLevel, LinkStatus, LldpRecord, StatusSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Link = 0,
    LldpAvailability = 1,
    LldpDetail = 2,
    Battery = 3,
}

impl Source {
    fn as_str(self) -> &'static str {
        match self {
            Source::Link => "link",
            Source::LldpAvailability => "lldp availability",
            Source::LldpDetail => "lldp detail",
            Source::Battery => "battery",
        }
    }
}

/// Last failure per probe, so a steady failure is logged once at warn level
/// rather than every tick.
#[derive(Debug, Default)]
struct FailureMemo {
    last: [Option<ProbeError>; 4],
}

impl FailureMemo {
    fn failed(&mut self, source: Source, err: ProbeError) {
        let slot = &mut self.last[source as usize];
        if slot.as_ref() == Some(&err) {
            debug!("{} probe still failing ({}): {err}", source.as_str(), err.kind());
        } else {
            warn!("{} probe failed ({}): {err}", source.as_str(), err.kind());
            *slot = Some(err);
        }
    }

    fn succeeded(&mut self, source: Source) {
        if self.last[source as usize].take().is_some() {
            info!("{} probe recovered", source.as_str());
        }
    }
}

/// Runs the link, LLDP and battery probes for one tick.
///
/// Never fails: each probe error is logged with its class and replaced by
/// the safe value (`Unknown`, `false`, `None`).
pub struct StatusPoller {
    interface: String,
    link: Box<dyn LinkProbe>,
    lldp: Box<dyn LldpProbe>,
    battery: Box<dyn BatteryProbe>,
    failures: FailureMemo,
}

impl StatusPoller {
    pub fn new(
        interface: impl Into<String>,
        link: Box<dyn LinkProbe>,
        lldp: Box<dyn LldpProbe>,
        battery: Box<dyn BatteryProbe>,
    ) -> Self {
        Self {
            interface: interface.into(),
            link,
            lldp,
            battery,
            failures: FailureMemo::default(),
        }
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// Full poll. LLDP is only queried while the link is up, and the detail
    /// query only when availability was confirmed.
    pub fn poll(&mut self) -> StatusSnapshot {
        let link = self.poll_link();
        let (lldp_available, lldp) = if link.is_up() {
            self.poll_lldp()
        } else {
            (false, None)
        };
        let battery = self.poll_battery();
        StatusSnapshot::new(link, lldp_available, lldp, battery)
    }

    /// Dev-mode poll: the screen is fixed, so only the battery is read.
    pub fn poll_battery_only(&mut self) -> StatusSnapshot {
        let battery = self.poll_battery();
        StatusSnapshot::new(LinkStatus::Unknown, false, None, battery)
    }

    fn poll_link(&mut self) -> LinkStatus {
        match self.link.link_status(&self.interface) {
            Ok(status) => {
                self.failures.succeeded(Source::Link);
                status
            }
            Err(err) => {
                self.failures.failed(Source::Link, err);
                LinkStatus::Unknown
            }
        }
    }

    fn poll_lldp(&mut self) -> (bool, Option<LldpRecord>) {
        match self.lldp.has_neighbor(&self.interface) {
            Ok(true) => self.failures.succeeded(Source::LldpAvailability),
            Ok(false) => {
                self.failures.succeeded(Source::LldpAvailability);
                return (false, None);
            }
            Err(err) => {
                self.failures.failed(Source::LldpAvailability, err);
                return (false, None);
            }
        }

        match self.lldp.neighbor(&self.interface) {
            Ok(record) => {
                self.failures.succeeded(Source::LldpDetail);
                (true, Some(record))
            }
            Err(err) => {
                self.failures.failed(Source::LldpDetail, err);
                (true, None)
            }
        }
    }

    fn poll_battery(&mut self) -> BatteryLevel {
        match self.battery.battery_percent() {
            Ok(raw) => {
                self.failures.succeeded(Source::Battery);
                BatteryLevel::from_raw(raw)
            }
            Err(err) => {
                self.failures.failed(Source::Battery, err);
                BatteryLevel::Unknown
            }
        }
    }
}
