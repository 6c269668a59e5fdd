use std::time::Duration;

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};

use super::{
    scroll::{ScrollState, ScrollingText},
    Frame, Layout, FONT, TEXT_ROWS,
};
use crate::screen::Screen;

/// Per-row scroll cursors kept by the frame loop between ticks.
pub type RowCursors = [Option<ScrollState>; TEXT_ROWS as usize];

/// Blank every text row. Row 0 stops short of the battery gauge.
pub fn clear_text_rows(frame: &mut Frame, layout: &Layout) {
    for row in 0..TEXT_ROWS {
        frame.fill_solid(&layout.row_area(row), BinaryColor::Off).ok();
    }
}

/// Clear one row and draw `text` left-aligned without scrolling.
pub fn draw_static_line(frame: &mut Frame, layout: &Layout, row: u8, text: &str) {
    let area = layout.row_area(row);
    frame.fill_solid(&area, BinaryColor::Off).ok();
    let style = MonoTextStyle::new(FONT, BinaryColor::On);
    Text::with_baseline(text, area.top_left, style, Baseline::Top)
        .draw(&mut frame.clipped(&area))
        .ok();
}

/// Draw `screen` into the text rows.
///
/// Status screens wipe all rows and draw fixed lines; neighbor screens draw a
/// fixed header and hand each data line to the scroller, keeping its cursor in
/// `cursors` for the next tick.
pub fn render_screen(
    frame: &mut Frame,
    layout: &Layout,
    screen: &Screen,
    interface: &str,
    scroller: &ScrollingText,
    now: Duration,
    cursors: &mut RowCursors,
) {
    if !screen.has_header() {
        clear_text_rows(frame, layout);
        for cursor in cursors.iter_mut() {
            *cursor = None;
        }
    }

    for line in screen.lines(interface) {
        let row = line.row.min(TEXT_ROWS - 1);
        let slot = &mut cursors[row as usize];
        if !line.scroll {
            draw_static_line(frame, layout, row, &line.text);
            *slot = None;
            continue;
        }
        let next = scroller.render(
            frame,
            layout.row_origin(row),
            layout.row_width(row),
            &line.text,
            now,
            slot.as_ref(),
        );
        if slot.as_ref().map(|s| s.text != next.text).unwrap_or(true) {
            log::debug!("row {row} now shows '{}'", next.text);
        }
        *slot = Some(next);
    }
}
