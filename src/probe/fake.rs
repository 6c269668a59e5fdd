//! Scripted probes for driving the poller and frame loop without hardware.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use super::{BatteryProbe, LinkProbe, LldpProbe, ProbeError};
use crate::state::{LinkStatus, LldpRecord};

/// Link probe returning whatever the test last set. Clones share state.
#[derive(Clone)]
pub struct FakeLink {
    status: Rc<RefCell<Result<LinkStatus, ProbeError>>>,
    calls: Rc<RefCell<usize>>,
}

impl FakeLink {
    pub fn new(status: LinkStatus) -> Self {
        Self {
            status: Rc::new(RefCell::new(Ok(status))),
            calls: Rc::default(),
        }
    }

    pub fn set(&self, status: Result<LinkStatus, ProbeError>) {
        *self.status.borrow_mut() = status;
    }

    pub fn calls(&self) -> usize {
        *self.calls.borrow()
    }
}

impl LinkProbe for FakeLink {
    fn link_status(&mut self, _interface: &str) -> Result<LinkStatus, ProbeError> {
        *self.calls.borrow_mut() += 1;
        self.status.borrow().clone()
    }
}

#[derive(Debug)]
struct LldpScript {
    available: Result<bool, ProbeError>,
    record: Result<LldpRecord, ProbeError>,
    availability_calls: usize,
    detail_calls: usize,
}

/// LLDP probe with settable availability and neighbor answers.
#[derive(Clone)]
pub struct FakeLldp {
    script: Rc<RefCell<LldpScript>>,
}

impl FakeLldp {
    pub fn none() -> Self {
        Self::with(Ok(false), Err(ProbeError::Unavailable("no neighbor".into())))
    }

    pub fn neighbor(record: LldpRecord) -> Self {
        Self::with(Ok(true), Ok(record))
    }

    pub fn with(
        available: Result<bool, ProbeError>,
        record: Result<LldpRecord, ProbeError>,
    ) -> Self {
        Self {
            script: Rc::new(RefCell::new(LldpScript {
                available,
                record,
                availability_calls: 0,
                detail_calls: 0,
            })),
        }
    }

    pub fn set_available(&self, available: Result<bool, ProbeError>) {
        self.script.borrow_mut().available = available;
    }

    pub fn set_record(&self, record: Result<LldpRecord, ProbeError>) {
        self.script.borrow_mut().record = record;
    }

    pub fn availability_calls(&self) -> usize {
        self.script.borrow().availability_calls
    }

    pub fn detail_calls(&self) -> usize {
        self.script.borrow().detail_calls
    }
}

impl LldpProbe for FakeLldp {
    fn has_neighbor(&mut self, _interface: &str) -> Result<bool, ProbeError> {
        let mut script = self.script.borrow_mut();
        script.availability_calls += 1;
        script.available.clone()
    }

    fn neighbor(&mut self, _interface: &str) -> Result<LldpRecord, ProbeError> {
        let mut script = self.script.borrow_mut();
        script.detail_calls += 1;
        script.record.clone()
    }
}

/// Battery probe that replays a fixed sequence, repeating the final answer.
#[derive(Clone)]
pub struct ScriptedBattery {
    script: Rc<RefCell<VecDeque<Result<i64, ProbeError>>>>,
}

impl ScriptedBattery {
    pub fn new(readings: impl IntoIterator<Item = Result<i64, ProbeError>>) -> Self {
        Self {
            script: Rc::new(RefCell::new(readings.into_iter().collect())),
        }
    }

    pub fn percents(values: &[i64]) -> Self {
        Self::new(values.iter().copied().map(Ok))
    }

    pub fn push(&self, reading: Result<i64, ProbeError>) {
        self.script.borrow_mut().push_back(reading);
    }
}

impl BatteryProbe for ScriptedBattery {
    fn battery_percent(&mut self) -> Result<i64, ProbeError> {
        let mut script = self.script.borrow_mut();
        if script.len() > 1 {
            if let Some(next) = script.pop_front() {
                return next;
            }
        }
        script
            .front()
            .cloned()
            .unwrap_or_else(|| Err(ProbeError::Unavailable("battery script is empty".into())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_battery_repeats_last_reading() {
        let mut battery = ScriptedBattery::percents(&[80, 79]);
        assert_eq!(battery.battery_percent().unwrap(), 80);
        assert_eq!(battery.battery_percent().unwrap(), 79);
        assert_eq!(battery.battery_percent().unwrap(), 79);
    }

    #[test]
    fn empty_script_is_unavailable() {
        let mut battery = ScriptedBattery::new(Vec::new());
        assert_eq!(battery.battery_percent().unwrap_err().kind(), "unavailable");
    }

    #[test]
    fn fake_link_clones_share_state() {
        let link = FakeLink::new(LinkStatus::Down);
        let mut handle = link.clone();
        link.set(Ok(LinkStatus::Up));
        assert_eq!(handle.link_status("eth0").unwrap(), LinkStatus::Up);
        assert_eq!(link.calls(), 1);
    }
}
