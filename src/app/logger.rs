use std::fs::{File, OpenOptions};
use std::io::Write;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::SystemTime;

use log::{LevelFilter, Metadata, Record};

use crate::Result;

const LEVEL_ENV: &str = "PORT_FINDER_LOG_LEVEL";
const PATH_ENV: &str = "PORT_FINDER_LOG_PATH";

/// Log verbosity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    #[default]
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl FromStr for LogLevel {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(()),
        }
    }
}

impl LogLevel {
    pub fn to_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// An environment value beats the configured level when it parses.
pub fn resolve_level(configured: LogLevel, env_value: Option<&str>) -> LogLevel {
    env_value
        .and_then(|raw| LogLevel::from_str(raw).ok())
        .unwrap_or(configured)
}

/// `log` backend writing to stderr and, optionally, appending to a file.
pub struct Logger {
    level: LogLevel,
    file: Option<Mutex<File>>,
}

impl Logger {
    /// Build from configured values, letting `PORT_FINDER_LOG_LEVEL` and
    /// `PORT_FINDER_LOG_PATH` override them.
    pub fn new(level: LogLevel, file_path: Option<String>) -> Result<Self> {
        let env_level = std::env::var(LEVEL_ENV).ok();
        let level = resolve_level(level, env_level.as_deref());
        let path = file_path.or_else(|| std::env::var(PATH_ENV).ok());
        Self::with_level(level, path.as_deref())
    }

    pub fn with_level(level: LogLevel, file_path: Option<&str>) -> Result<Self> {
        let file = match file_path {
            Some(path) => Some(Mutex::new(
                OpenOptions::new().create(true).append(true).open(path)?,
            )),
            None => None,
        };
        Ok(Self { level, file })
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Register as the global `log` backend. A backend installed earlier
    /// (tests, embedding binaries) is left in place.
    pub fn install(self) {
        let filter = self.level.to_filter();
        if log::set_boxed_logger(Box::new(self)).is_ok() {
            log::set_max_level(filter);
        }
    }

    fn format_line(record: &Record) -> String {
        format!(
            "[{}] [{}] {}: {}",
            humantime::format_rfc3339_millis(SystemTime::now()),
            record.level(),
            record.target(),
            record.args()
        )
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level.to_filter()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = Self::format_line(record);
        eprintln!("{line}");
        if let Some(file) = self.file.as_ref() {
            if let Ok(mut file) = file.lock() {
                let _ = writeln!(file, "{line}");
            }
        }
    }

    fn flush(&self) {
        if let Some(file) = self.file.as_ref() {
            if let Ok(mut file) = file.lock() {
                let _ = file.flush();
            }
        }
    }
}
