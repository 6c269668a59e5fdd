use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::PathBuf;

use log::{debug, info, trace};

use super::{DisplaySink, Frame};
use crate::{Error, Result};

/// Sink that only logs. Used when no panel is attached.
pub struct HeadlessDisplay {
    width: u32,
    height: u32,
    pushes: u64,
}

impl HeadlessDisplay {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pushes: 0,
        }
    }
}

impl DisplaySink for HeadlessDisplay {
    fn init(&mut self) -> Result<()> {
        info!("headless display {}x{} ready", self.width, self.height);
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        debug!("headless display cleared");
        Ok(())
    }

    fn push(&mut self, frame: &Frame) -> Result<()> {
        self.pushes += 1;
        trace!(
            "headless push #{} ({} lit pixels)",
            self.pushes,
            frame.lit_pixels()
        );
        Ok(())
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

/// Writes each frame, page encoded, to a device node or plain file.
///
/// The file is rewritten from offset 0 on every push, which suits character
/// devices exposed by SSD13xx kernel drivers as well as a regular file that a
/// separate process forwards to the panel.
pub struct FramebufferDisplay {
    path: PathBuf,
    width: u32,
    height: u32,
    file: Option<File>,
}

impl FramebufferDisplay {
    pub fn new(path: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self {
            path: path.into(),
            width,
            height,
            file: None,
        }
    }

    fn write_pages(&mut self, pages: &[u8]) -> Result<()> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| Error::Display(format!("{} not initialised", self.path.display())))?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(pages)?;
        file.flush()?;
        Ok(())
    }
}

impl DisplaySink for FramebufferDisplay {
    fn init(&mut self) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .map_err(|e| Error::Display(format!("create {}: {e}", dir.display())))?;
        }
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|e| Error::Display(format!("open {}: {e}", self.path.display())))?;
        self.file = Some(file);
        info!(
            "framebuffer display {}x{} on {}",
            self.width,
            self.height,
            self.path.display()
        );
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        let blank = Frame::new(self.width, self.height);
        self.write_pages(&blank.to_pages())
    }

    fn push(&mut self, frame: &Frame) -> Result<()> {
        if frame.width() != self.width || frame.height() != self.height {
            return Err(Error::Display(format!(
                "frame is {}x{}, display is {}x{}",
                frame.width(),
                frame.height(),
                self.width,
                self.height
            )));
        }
        self.write_pages(&frame.to_pages())
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}
