use core::convert::Infallible;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::Pixel;

/// Monochrome bitmap, one bit per pixel, rows packed MSB first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    stride: usize,
    bits: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32) -> Self {
        let stride = (width as usize).div_ceil(8);
        Self {
            width,
            height,
            stride,
            bits: vec![0; stride * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let idx = y as usize * self.stride + (x as usize / 8);
        self.bits[idx] & (0x80 >> (x % 8)) != 0
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, on: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = y as usize * self.stride + (x as usize / 8);
        let mask = 0x80 >> (x % 8);
        if on {
            self.bits[idx] |= mask;
        } else {
            self.bits[idx] &= !mask;
        }
    }

    pub fn lit_pixels(&self) -> usize {
        self.bits.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Export in page-major order: each byte holds eight vertical pixels,
    /// LSB on top, pages of eight rows left to right. This is the layout
    /// SSD1305/SSD1306 controllers expect in horizontal addressing mode.
    pub fn to_pages(&self) -> Vec<u8> {
        let pages = self.height.div_ceil(8);
        let mut out = Vec::with_capacity((pages * self.width) as usize);
        for page in 0..pages {
            for x in 0..self.width {
                let mut byte = 0u8;
                for bit in 0..8 {
                    if self.pixel(x, page * 8 + bit) {
                        byte |= 1 << bit;
                    }
                }
                out.push(byte);
            }
        }
        out
    }
}

impl OriginDimensions for Frame {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for Frame {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 {
                continue;
            }
            self.set_pixel(point.x as u32, point.y as u32, color.is_on());
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        let fill = if color.is_on() { 0xff } else { 0x00 };
        self.bits.fill(fill);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

    #[test]
    fn set_and_read_pixels_ignores_out_of_bounds() {
        let mut frame = Frame::new(10, 4);
        frame.set_pixel(9, 3, true);
        frame.set_pixel(10, 0, true);
        assert!(frame.pixel(9, 3));
        assert!(!frame.pixel(10, 0));
        assert_eq!(frame.lit_pixels(), 1);
    }

    #[test]
    fn draw_target_clips_negative_coordinates() {
        let mut frame = Frame::new(8, 8);
        Rectangle::new(Point::new(-4, -4), Size::new(6, 6))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut frame)
            .ok();
        assert_eq!(frame.lit_pixels(), 4);
        assert!(frame.pixel(1, 1));
        assert!(!frame.pixel(2, 2));
    }

    #[test]
    fn clear_fills_every_pixel() {
        let mut frame = Frame::new(12, 3);
        frame.clear(BinaryColor::On).ok();
        assert!(frame.pixel(11, 2));
        frame.clear(BinaryColor::Off).ok();
        assert_eq!(frame.lit_pixels(), 0);
    }

    #[test]
    fn pages_pack_columns_lsb_on_top() {
        let mut frame = Frame::new(4, 16);
        frame.set_pixel(0, 0, true);
        frame.set_pixel(1, 7, true);
        frame.set_pixel(2, 8, true);
        let pages = frame.to_pages();
        assert_eq!(pages.len(), 8);
        assert_eq!(&pages[..4], &[0x01, 0x80, 0x00, 0x00]);
        assert_eq!(&pages[4..], &[0x00, 0x00, 0x01, 0x00]);
    }
}
