//! In-memory draw buffer backing the display.

use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Size},
    pixelcolor::{Rgb888, RgbColor},
    Pixel,
};

use crate::types::Frame;

/// Largest surface the toolkit will allocate (8192 x 8192).
pub const MAX_PIXELS: usize = 8192 * 8192;

/// Row-major RGB draw buffer.
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<Rgb888>,
    dirty: bool,
}

impl Surface {
    /// Allocate a black surface. Returns `None` when the pixel count
    /// exceeds [`MAX_PIXELS`] or the allocation fails.
    pub fn try_new(width: u32, height: u32) -> Option<Self> {
        let len = (width as usize).checked_mul(height as usize)?;
        if len > MAX_PIXELS {
            return None;
        }
        let mut pixels = Vec::new();
        pixels.try_reserve_exact(len).ok()?;
        pixels.resize(len, Rgb888::BLACK);
        Some(Self {
            width,
            height,
            pixels,
            dirty: true,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns the dirty flag and clears it.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    pub fn frame(&self) -> Frame<'_> {
        Frame {
            width: self.width,
            height: self.height,
            pixels: &self.pixels,
        }
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgb888) {
        if x >= self.width || y >= self.height {
            return;
        }
        let offset = (y as usize) * (self.width as usize) + x as usize;
        self.pixels[offset] = color;
    }
}

impl OriginDimensions for Surface {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for Surface {
    type Color = Rgb888;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            if coord.x >= 0 && coord.y >= 0 {
                self.set_pixel(coord.x as u32, coord.y as u32, color);
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.pixels.fill(color);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::{
        prelude::*,
        primitives::{PrimitiveStyle, Rectangle},
    };

    #[test]
    fn test_draw_clips_to_bounds() {
        let mut surface = Surface::try_new(4, 4).unwrap();
        Rectangle::new(Point::new(-2, -2), Size::new(4, 4))
            .into_styled(PrimitiveStyle::with_fill(Rgb888::WHITE))
            .draw(&mut surface)
            .unwrap();

        let frame = surface.frame();
        assert_eq!(frame.pixel(0, 0), Some(Rgb888::WHITE));
        assert_eq!(frame.pixel(1, 1), Some(Rgb888::WHITE));
        assert_eq!(frame.pixel(2, 2), Some(Rgb888::BLACK));
    }

    #[test]
    fn test_oversized_surface_rejected() {
        assert!(Surface::try_new(u32::MAX, u32::MAX).is_none());
        assert!(Surface::try_new(8193, 8192).is_none());
        assert!(Surface::try_new(8192, 1).is_some());
    }

    #[test]
    fn test_dirty_flag_is_consumed() {
        let mut surface = Surface::try_new(2, 2).unwrap();
        assert!(surface.take_dirty());
        assert!(!surface.take_dirty());
        surface.mark_dirty();
        assert!(surface.take_dirty());
    }
}
