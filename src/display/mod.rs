use embedded_graphics::mono_font::{ascii::FONT_5X8, MonoFont};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::Result;

pub mod battery;
pub mod fake;
pub mod frame;
pub mod overlays;
pub mod scroll;
pub mod sink;

pub use frame::Frame;
pub use sink::{FramebufferDisplay, HeadlessDisplay};

/// Font used for every text row.
pub const FONT: &MonoFont<'static> = &FONT_5X8;
pub const ROW_HEIGHT: u32 = 8;
pub const TEXT_ROWS: u8 = 4;

pub const BATTERY_WIDTH: u32 = 10;
pub const BATTERY_HEIGHT: u32 = 5;
/// Room reserved right of the gauge for the widest label, `100%`.
const BATTERY_LABEL_RESERVE: u32 = 4 * 5 + 2;

/// Something that accepts finished frames. The transport behind it is not our concern.
pub trait DisplaySink {
    fn init(&mut self) -> Result<()>;
    fn clear(&mut self) -> Result<()>;
    fn push(&mut self, frame: &Frame) -> Result<()>;
    fn width(&self) -> u32;
    fn height(&self) -> u32;
}

impl<T: DisplaySink + ?Sized> DisplaySink for Box<T> {
    fn init(&mut self) -> Result<()> {
        (**self).init()
    }

    fn clear(&mut self) -> Result<()> {
        (**self).clear()
    }

    fn push(&mut self, frame: &Frame) -> Result<()> {
        (**self).push(frame)
    }

    fn width(&self) -> u32 {
        (**self).width()
    }

    fn height(&self) -> u32 {
        (**self).height()
    }
}

/// Pixel positions of the text rows and battery gauge for a panel size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
    pub battery_origin: Point,
}

impl Layout {
    pub fn new(width: u32, height: u32) -> Self {
        let gauge = BATTERY_WIDTH + BATTERY_WIDTH / 5;
        let x = width.saturating_sub(gauge + BATTERY_LABEL_RESERVE + 1);
        Self {
            width,
            height,
            battery_origin: Point::new(x as i32, 1),
        }
    }

    pub fn row_origin(&self, row: u8) -> Point {
        Point::new(0, (row as u32 * ROW_HEIGHT) as i32)
    }

    /// Usable width of a text row. Row 0 stops short of the battery gauge.
    pub fn row_width(&self, row: u8) -> u32 {
        if row == 0 {
            (self.battery_origin.x as u32).saturating_sub(1)
        } else {
            self.width
        }
    }

    pub fn row_area(&self, row: u8) -> Rectangle {
        Rectangle::new(self.row_origin(row), Size::new(self.row_width(row), ROW_HEIGHT))
    }
}

/// Pixel width of `text` in the row font.
pub fn text_width(text: &str) -> u32 {
    let advance = FONT.character_size.width + FONT.character_spacing;
    text.chars().count() as u32 * advance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_keeps_header_clear_of_battery() {
        let layout = Layout::new(128, 32);
        assert_eq!(layout.battery_origin, Point::new(93, 1));
        assert_eq!(layout.row_width(0), 92);
        assert_eq!(layout.row_width(3), 128);
        assert_eq!(layout.row_origin(2), Point::new(0, 16));
    }

    #[test]
    fn text_width_uses_five_pixel_cells() {
        assert_eq!(text_width(""), 0);
        assert_eq!(text_width("LLDP Information"), 80);
    }
}
