use std::cell::RefCell;
use std::rc::Rc;

use super::{DisplaySink, Frame};
use crate::Result;

#[derive(Debug, Default)]
pub struct FakeDisplayLog {
    pub inits: usize,
    pub clears: usize,
    pub frames: Vec<Frame>,
}

/// Display that records every call; clones share the same log so tests can
/// inspect it after handing the display to the frame loop.
#[derive(Clone)]
pub struct FakeDisplay {
    width: u32,
    height: u32,
    log: Rc<RefCell<FakeDisplayLog>>,
}

impl FakeDisplay {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            log: Rc::default(),
        }
    }

    pub fn pushes(&self) -> usize {
        self.log.borrow().frames.len()
    }

    pub fn clears(&self) -> usize {
        self.log.borrow().clears
    }

    pub fn inits(&self) -> usize {
        self.log.borrow().inits
    }

    pub fn last_frame(&self) -> Option<Frame> {
        self.log.borrow().frames.last().cloned()
    }
}

impl DisplaySink for FakeDisplay {
    fn init(&mut self) -> Result<()> {
        self.log.borrow_mut().inits += 1;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.log.borrow_mut().clears += 1;
        Ok(())
    }

    fn push(&mut self, frame: &Frame) -> Result<()> {
        self.log.borrow_mut().frames.push(frame.clone());
        Ok(())
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}
