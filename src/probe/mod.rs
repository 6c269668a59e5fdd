//! External status sources: interface link, LLDP neighbor, battery charge.
//!
//! Each source sits behind a small trait so the poller can be driven by the
//! scripted fakes in [`fake`] during tests.

pub mod battery;
pub mod command;
pub mod errors;
pub mod fake;
pub mod link;
pub mod lldp;

pub use battery::BatterySocket;
pub use errors::ProbeError;
pub use link::SysfsLink;
pub use lldp::LldpCtl;

use crate::state::{LinkStatus, LldpRecord};

pub trait LinkProbe {
    fn link_status(&mut self, interface: &str) -> Result<LinkStatus, ProbeError>;
}

pub trait LldpProbe {
    /// Cheap check whether any neighbor is known on `interface`.
    fn has_neighbor(&mut self, interface: &str) -> Result<bool, ProbeError>;
    fn neighbor(&mut self, interface: &str) -> Result<LldpRecord, ProbeError>;
}

pub trait BatteryProbe {
    /// Raw charge reading; clamping happens in the poller.
    fn battery_percent(&mut self) -> Result<i64, ProbeError>;
}
