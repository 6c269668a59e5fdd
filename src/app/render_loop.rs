use std::cell::Cell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use log::{debug, info};

use super::polling::StatusPoller;
use crate::display::battery::render_battery;
use crate::display::overlays::{render_screen, RowCursors};
use crate::display::scroll::{ScrollSettings, ScrollingText};
use crate::display::{DisplaySink, Frame, Layout, BATTERY_HEIGHT, BATTERY_WIDTH};
use crate::screen::{select_screen, Screen};
use crate::state::BatteryLevel;
use crate::Result;

/// Wall-clock source for scrolling, as time since the Unix epoch.
pub trait Clock {
    fn now(&self) -> Duration;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
    }
}

/// Clock advanced by hand. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new(start: Duration) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, now: Duration) {
        self.now.set(now);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Settings fixed when the loop is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopSettings {
    pub interface: String,
    pub dev_mode: bool,
    pub tick: Duration,
    pub scroll: ScrollSettings,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            interface: crate::config::DEFAULT_INTERFACE.to_string(),
            dev_mode: false,
            tick: Duration::from_millis(crate::config::DEFAULT_TICK_MS),
            scroll: ScrollSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

/// What one tick decided and drew.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub screen: Screen,
    pub battery: BatteryLevel,
    pub battery_redrawn: bool,
}

/// Poll, pick a screen, draw it and push the frame, once per tick.
///
/// The loop owns the only frame buffer. Between ticks it keeps the buffer,
/// the last drawn battery level and one scroll cursor per text row.
pub struct FrameLoop<D: DisplaySink, C: Clock = SystemClock> {
    settings: LoopSettings,
    poller: StatusPoller,
    display: D,
    clock: C,
    frame: Frame,
    layout: Layout,
    scroller: ScrollingText,
    cursors: RowCursors,
    last_battery: Option<BatteryLevel>,
    last_screen: Option<&'static str>,
    state: LoopState,
    ticks: u64,
}

impl<D: DisplaySink> FrameLoop<D, SystemClock> {
    pub fn new(settings: LoopSettings, poller: StatusPoller, display: D) -> Self {
        Self::with_clock(settings, poller, display, SystemClock)
    }
}

impl<D: DisplaySink, C: Clock> FrameLoop<D, C> {
    pub fn with_clock(settings: LoopSettings, poller: StatusPoller, display: D, clock: C) -> Self {
        let (width, height) = (display.width(), display.height());
        let scroller = ScrollingText::new(settings.scroll);
        Self {
            settings,
            poller,
            display,
            clock,
            frame: Frame::new(width, height),
            layout: Layout::new(width, height),
            scroller,
            cursors: RowCursors::default(),
            last_battery: None,
            last_screen: None,
            state: LoopState::Stopped,
            ticks: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Initialise and blank the display, entering `Running`.
    pub fn start(&mut self) -> Result<()> {
        self.display.init()?;
        self.display.clear()?;
        self.state = LoopState::Running;
        info!(
            "frame loop running on {} ({}x{}, tick {:?}{})",
            self.settings.interface,
            self.layout.width,
            self.layout.height,
            self.settings.tick,
            if self.settings.dev_mode { ", dev mode" } else { "" }
        );
        Ok(())
    }

    /// One iteration: poll, redraw the battery if it changed, draw the
    /// screen and push. Only display errors escape.
    pub fn tick(&mut self) -> Result<TickReport> {
        let snapshot = if self.settings.dev_mode {
            self.poller.poll_battery_only()
        } else {
            self.poller.poll()
        };

        let battery_redrawn = self.last_battery != Some(snapshot.battery);
        if battery_redrawn {
            self.frame.clear(BinaryColor::Off).ok();
            render_battery(
                &mut self.frame,
                self.layout.battery_origin,
                snapshot.battery,
                BATTERY_WIDTH,
                BATTERY_HEIGHT,
            );
            debug!("battery now {}", snapshot.battery);
            self.last_battery = Some(snapshot.battery);
        }

        let screen = if self.settings.dev_mode {
            Screen::DevDemo
        } else {
            select_screen(&snapshot)
        };
        if self.last_screen != Some(screen.name()) {
            info!("screen -> {}", screen.name());
            self.last_screen = Some(screen.name());
        }

        render_screen(
            &mut self.frame,
            &self.layout,
            &screen,
            &self.settings.interface,
            &self.scroller,
            self.clock.now(),
            &mut self.cursors,
        );
        self.display.push(&self.frame)?;
        self.ticks += 1;

        Ok(TickReport {
            screen,
            battery: snapshot.battery,
            battery_redrawn,
        })
    }

    /// Tick until `running` is cleared. The flag is checked before each tick,
    /// so the last tick always completes its push.
    pub fn run(&mut self, running: &AtomicBool) -> Result<()> {
        self.start()?;
        while running.load(Ordering::SeqCst) {
            let started = Instant::now();
            self.tick()?;
            let elapsed = started.elapsed();
            if elapsed < self.settings.tick {
                thread::sleep(self.settings.tick - elapsed);
            }
        }
        self.state = LoopState::Stopped;
        info!("frame loop stopped after {} ticks", self.ticks);
        Ok(())
    }
}
