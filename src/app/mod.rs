use crate::{
    cli::RunOptions,
    config::{self, Config, DisplayKind},
    display::{scroll::ScrollSettings, DisplaySink, FramebufferDisplay, HeadlessDisplay},
    probe::{BatterySocket, LldpCtl, SysfsLink},
    Result,
};
use log::info;
use std::{net::SocketAddr, path::Path, str::FromStr, time::Duration};

mod lifecycle;
pub mod logger;
pub mod polling;
pub mod render_loop;

use lifecycle::create_shutdown_flag;
pub use logger::{LogLevel, Logger};
pub use polling::StatusPoller;
pub use render_loop::{
    Clock, FrameLoop, LoopSettings, LoopState, ManualClock, SystemClock, TickReport,
};

/// Config for the daemon: the file values with CLI overrides applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub interface: String,
    pub dev_mode: bool,
    pub tick_ms: u64,
    pub probe_timeout_ms: u64,
    pub battery_addr: SocketAddr,
    pub lldpctl_path: String,
    pub sysfs_net_root: String,
    pub scroll: ScrollSettings,
    pub width: u32,
    pub height: u32,
    pub display: DisplayKind,
    pub framebuffer_path: String,
    pub log_level: LogLevel,
    pub log_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let cfg = Config::default();
        Self {
            interface: cfg.interface,
            dev_mode: cfg.dev_mode,
            tick_ms: cfg.tick_ms,
            probe_timeout_ms: cfg.probe_timeout_ms,
            battery_addr: SocketAddr::from(([127, 0, 0, 1], 8423)),
            lldpctl_path: cfg.lldpctl_path,
            sysfs_net_root: cfg.sysfs_net_root,
            scroll: ScrollSettings::default(),
            width: cfg.width,
            height: cfg.height,
            display: cfg.display,
            framebuffer_path: cfg.framebuffer_path,
            log_level: LogLevel::default(),
            log_file: None,
        }
    }
}

impl AppConfig {
    pub fn from_sources(config: Config, opts: RunOptions) -> Result<Self> {
        let mut merged = config;
        if let Some(interface) = opts.interface {
            merged.interface = interface;
        }
        merged.dev_mode |= opts.dev_mode;
        if let Some(tick_ms) = opts.tick_ms {
            merged.tick_ms = tick_ms;
        }
        if let Some(timeout) = opts.probe_timeout_ms {
            merged.probe_timeout_ms = timeout;
        }
        if let Some(addr) = opts.battery_addr {
            merged.battery_addr = addr;
        }
        if let Some(display) = opts.display {
            merged.display = display;
        }
        if let Some(path) = opts.framebuffer_path {
            merged.framebuffer_path = path;
        }
        let log_level = match opts.log_level.as_deref() {
            Some(raw) => LogLevel::from_str(raw).map_err(|_| {
                crate::Error::InvalidArgs(format!(
                    "unknown log level '{raw}' (expected error, warn, info, debug or trace)"
                ))
            })?,
            None => LogLevel::default(),
        };
        Self::from_config(merged, log_level, opts.log_file)
    }

    fn from_config(cfg: Config, log_level: LogLevel, log_file: Option<String>) -> Result<Self> {
        config::validate(&cfg)?;
        Ok(Self {
            battery_addr: cfg.battery_socket_addr()?,
            interface: cfg.interface,
            dev_mode: cfg.dev_mode,
            tick_ms: cfg.tick_ms,
            probe_timeout_ms: cfg.probe_timeout_ms,
            lldpctl_path: cfg.lldpctl_path,
            sysfs_net_root: cfg.sysfs_net_root,
            scroll: ScrollSettings {
                pixels_per_second: cfg.scroll_px_per_sec,
                gap: cfg.scroll_gap_px,
                static_max_chars: cfg.static_max_chars,
            },
            width: cfg.width,
            height: cfg.height,
            display: cfg.display,
            framebuffer_path: cfg.framebuffer_path,
            log_level,
            log_file,
        })
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn loop_settings(&self) -> LoopSettings {
        LoopSettings {
            interface: self.interface.clone(),
            dev_mode: self.dev_mode,
            tick: Duration::from_millis(self.tick_ms),
            scroll: self.scroll,
        }
    }

    /// Poller backed by sysfs, `lldpctl` and the battery socket.
    pub fn build_poller(&self) -> StatusPoller {
        StatusPoller::new(
            self.interface.clone(),
            Box::new(SysfsLink::new(&self.sysfs_net_root)),
            Box::new(LldpCtl::new(self.lldpctl_path.clone(), self.probe_timeout())),
            Box::new(BatterySocket::new(self.battery_addr, self.probe_timeout())),
        )
    }

    pub fn build_display(&self) -> Box<dyn DisplaySink> {
        match self.display {
            DisplayKind::Headless => Box::new(HeadlessDisplay::new(self.width, self.height)),
            DisplayKind::Framebuffer => Box::new(FramebufferDisplay::new(
                &self.framebuffer_path,
                self.width,
                self.height,
            )),
        }
    }
}

pub struct App {
    config: AppConfig,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        Logger::new(config.log_level, config.log_file.clone())?.install();
        Ok(Self { config })
    }

    pub fn from_options(opts: RunOptions) -> Result<Self> {
        let cfg_file = match opts.config_path.as_deref() {
            Some(path) => Config::load_from_path(Path::new(path))?,
            None => Config::load_or_default()?,
        };
        let merged = AppConfig::from_sources(cfg_file, opts)?;
        Self::new(merged)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Entry point for the daemon: runs the frame loop until ctrl-c or SIGTERM.
    pub fn run(&self) -> Result<()> {
        let config = &self.config;
        info!(
            "port-finder {} start (interface={}, display={}, tick={}ms)",
            env!("CARGO_PKG_VERSION"),
            config.interface,
            config.display,
            config.tick_ms
        );
        let running = create_shutdown_flag()?;
        let mut frame_loop =
            FrameLoop::new(config.loop_settings(), config.build_poller(), config.build_display());
        frame_loop.run(&running)?;
        info!("daemon exiting");
        Ok(())
    }
}
