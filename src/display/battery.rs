use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle, RoundedRectangle};
use embedded_graphics::text::{Baseline, Text};

use super::{Frame, FONT};
use crate::state::BatteryLevel;

const LABEL_GAP: i32 = 2;

/// Width of the charge bar inside a gauge of `width` pixels.
pub fn fill_width(level: BatteryLevel, width: u32) -> u32 {
    width.saturating_sub(2) * level.percent() as u32 / 100
}

/// Draw the gauge body, its terminal nub, the charge bar and the percentage label.
pub fn render_battery(
    frame: &mut Frame,
    position: Point,
    level: BatteryLevel,
    width: u32,
    height: u32,
) {
    let on = PrimitiveStyle::with_fill(BinaryColor::On);
    let off = PrimitiveStyle::with_fill(BinaryColor::Off);

    RoundedRectangle::with_equal_corners(
        Rectangle::new(position, Size::new(width, height)),
        Size::new(1, 1),
    )
    .into_styled(on)
    .draw(frame)
    .ok();

    let nub = Size::new((width / 5).max(1), (height / 2).max(1));
    let nub_origin =
        position + Point::new(width as i32, (height.saturating_sub(nub.height) / 2) as i32);
    Rectangle::new(nub_origin, nub).into_styled(on).draw(frame).ok();

    let inner = Size::new(width.saturating_sub(2), height.saturating_sub(2));
    let inner_origin = position + Point::new(1, 1);
    Rectangle::new(inner_origin, inner).into_styled(off).draw(frame).ok();
    Rectangle::new(inner_origin, Size::new(fill_width(level, width), inner.height))
        .into_styled(on)
        .draw(frame)
        .ok();

    let label_x = nub_origin.x + nub.width as i32 + LABEL_GAP;
    let label_y = (position.y - 1).max(0);
    let style = MonoTextStyle::new(FONT, BinaryColor::On);
    Text::with_baseline(&level.label(), Point::new(label_x, label_y), style, Baseline::Top)
        .draw(frame)
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit_in_row(frame: &Frame, y: u32, x0: u32, x1: u32) -> u32 {
        (x0..x1).filter(|&x| frame.pixel(x, y)).count() as u32
    }

    #[test]
    fn fill_width_spans_zero_to_inner_width() {
        assert_eq!(fill_width(BatteryLevel::Percent(0), 10), 0);
        assert_eq!(fill_width(BatteryLevel::Percent(100), 10), 8);
        assert_eq!(fill_width(BatteryLevel::Percent(55), 10), 4);
        assert_eq!(fill_width(BatteryLevel::Unknown, 10), 0);
    }

    #[test]
    fn fill_width_is_monotonic_in_level() {
        let mut last = 0;
        for pct in 0..=100u8 {
            let w = fill_width(BatteryLevel::Percent(pct), 24);
            assert!(w >= last, "fill shrank at {pct}%");
            last = w;
        }
        assert_eq!(last, 22);
    }

    #[test]
    fn gauge_interior_shows_charge_bar() {
        let origin = Point::new(4, 2);
        for (level, expected) in [(0u8, 0u32), (50, 4), (100, 8)] {
            let mut frame = Frame::new(64, 16);
            render_battery(&mut frame, origin, BatteryLevel::Percent(level), 10, 5);
            // interior row spans x 5..13 at y 3
            assert_eq!(lit_in_row(&frame, 3, 5, 13), expected, "level {level}");
            // body edges stay solid
            assert!(frame.pixel(4, 3));
            assert!(frame.pixel(13, 3));
        }
    }

    #[test]
    fn nub_sits_right_of_body() {
        let mut frame = Frame::new(64, 16);
        render_battery(&mut frame, Point::new(0, 1), BatteryLevel::Percent(30), 10, 5);
        assert!(frame.pixel(10, 2));
        assert!(frame.pixel(11, 3));
        assert!(!frame.pixel(10, 1));
    }

    #[test]
    fn label_is_drawn_after_nub() {
        let mut frame = Frame::new(64, 16);
        render_battery(&mut frame, Point::new(0, 1), BatteryLevel::Percent(80), 10, 5);
        let label_pixels = (14..40).any(|x| (0..8).any(|y| frame.pixel(x, y)));
        assert!(label_pixels);
    }
}
