use std::time::Duration;

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::text::{Baseline, Text};

use super::{text_width, Frame, FONT, ROW_HEIGHT};

pub const DEFAULT_PIXELS_PER_SECOND: u32 = 25;
pub const DEFAULT_GAP_PX: u32 = 25;
pub const DEFAULT_STATIC_MAX_CHARS: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollSettings {
    pub pixels_per_second: u32,
    /// Blank pixels between the end of the text and its next repetition.
    pub gap: u32,
    /// Text up to this many characters is drawn without scrolling, provided it fits its row.
    pub static_max_chars: usize,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            pixels_per_second: DEFAULT_PIXELS_PER_SECOND,
            gap: DEFAULT_GAP_PX,
            static_max_chars: DEFAULT_STATIC_MAX_CHARS,
        }
    }
}

/// Cursor of one displayed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollState {
    pub text: String,
    /// Always in `[0, text_width + region_width)`.
    pub offset: u32,
    pub region_width: u32,
    /// Wall-clock time (since the epoch) at which this text first appeared.
    pub shown_since: Duration,
}

/// Marquee renderer. Offsets come from the wall clock, so scroll speed does not
/// depend on how often frames are drawn.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScrollingText {
    settings: ScrollSettings,
}

impl ScrollingText {
    pub fn new(settings: ScrollSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> ScrollSettings {
        self.settings
    }

    /// Text scrolls when it is longer than `static_max_chars` or wider than its row.
    pub fn needs_scroll(&self, text: &str, region_width: u32) -> bool {
        text.chars().count() > self.settings.static_max_chars || text_width(text) > region_width
    }

    /// Offset after `elapsed` for text `text_px` wide in a region `region_width` wide.
    pub fn offset_at(&self, text_px: u32, region_width: u32, elapsed: Duration) -> u32 {
        let period = (text_px + region_width) as u128;
        if period == 0 {
            return 0;
        }
        let travelled = elapsed.as_millis() * self.settings.pixels_per_second as u128 / 1000;
        (travelled % period) as u32
    }

    /// Draw `text` into the row at `origin` and return the updated cursor.
    ///
    /// `previous` is the cursor from the last frame; it is carried forward only
    /// while the text is unchanged, otherwise scrolling restarts from offset 0.
    /// Identical arguments always produce identical pixels.
    pub fn render(
        &self,
        frame: &mut Frame,
        origin: Point,
        region_width: u32,
        text: &str,
        now: Duration,
        previous: Option<&ScrollState>,
    ) -> ScrollState {
        let area = Rectangle::new(origin, Size::new(region_width, ROW_HEIGHT));
        frame.fill_solid(&area, BinaryColor::Off).ok();

        let shown_since = match previous {
            Some(prev) if prev.text == text && prev.region_width == region_width => {
                prev.shown_since
            }
            _ => now,
        };
        let style = MonoTextStyle::new(FONT, BinaryColor::On);
        let mut target = frame.clipped(&area);

        if !self.needs_scroll(text, region_width) {
            Text::with_baseline(text, origin, style, Baseline::Top)
                .draw(&mut target)
                .ok();
            return ScrollState {
                text: text.to_string(),
                offset: 0,
                region_width,
                shown_since,
            };
        }

        let text_px = text_width(text);
        let offset = self.offset_at(text_px, region_width, now.saturating_sub(shown_since));
        let first_x = origin.x - offset as i32;
        let second_x = first_x + (text_px + self.settings.gap) as i32;
        for x in [first_x, second_x] {
            Text::with_baseline(text, Point::new(x, origin.y), style, Baseline::Top)
                .draw(&mut target)
                .ok();
        }

        ScrollState {
            text: text.to_string(),
            offset,
            region_width,
            shown_since,
        }
    }
}
