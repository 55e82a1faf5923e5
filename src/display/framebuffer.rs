//! RGB565 framebuffer
//!
//! Bounds-checked in-memory copy of the panel. Regions of it can be streamed
//! through the tiler via [`FramebufferRegion`].

use super::color::Rgb565;
use crate::stream::PixelSource;

/// Framebuffer for an RGB565 panel
#[derive(Clone)]
pub struct Framebuffer {
    width: u16,
    height: u16,
    buffer: Vec<u16>,
}

impl Framebuffer {
    /// Create a new framebuffer initialized to black
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            buffer: vec![0; width as usize * height as usize],
        }
    }

    /// Build from packed 24-bit RGB bytes (`R G B R G B ...`, raster order)
    pub fn from_rgb888_bytes(width: u16, height: u16, bytes: &[u8]) -> Option<Self> {
        if bytes.len() != width as usize * height as usize * 3 {
            return None;
        }

        let buffer = bytes
            .chunks_exact(3)
            .map(|px| Rgb565::from_rgb(px[0], px[1], px[2]).0)
            .collect();

        Some(Self {
            width,
            height,
            buffer,
        })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    /// Get pixel at coordinates
    pub fn get_pixel(&self, x: u16, y: u16) -> Option<Rgb565> {
        self.index(x, y).map(|i| Rgb565(self.buffer[i]))
    }

    /// Set pixel at coordinates (bounds-checked)
    pub fn set_pixel(&mut self, x: u16, y: u16, color: Rgb565) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.buffer[i] = color.0;
                true
            }
            None => false,
        }
    }

    /// Clear framebuffer to a solid color
    pub fn clear(&mut self, color: Rgb565) {
        self.buffer.fill(color.0);
    }

    /// Raw pixel words in raster order
    pub fn as_slice(&self) -> &[u16] {
        &self.buffer
    }

    /// Fill a rectangle (bounds-checked)
    pub fn fill_rect(&mut self, x: u16, y: u16, w: u16, h: u16, color: Rgb565) -> bool {
        if x as u32 + w as u32 > self.width as u32 || y as u32 + h as u32 > self.height as u32 {
            return false;
        }

        let stride = self.width as usize;
        for row in y as usize..(y + h) as usize {
            let start = row * stride + x as usize;
            self.buffer[start..start + w as usize].fill(color.0);
        }
        true
    }

    /// View of a rectangle for streaming
    pub fn region(&self, x: u16, w: u16, y: u16, h: u16) -> FramebufferRegion<'_> {
        FramebufferRegion {
            framebuffer: self,
            x,
            w,
            y,
            h,
        }
    }
}

/// Rectangle of a framebuffer read in raster order
#[derive(Clone, Copy)]
pub struct FramebufferRegion<'a> {
    framebuffer: &'a Framebuffer,
    x: u16,
    w: u16,
    y: u16,
    h: u16,
}

impl PixelSource for FramebufferRegion<'_> {
    fn pixel(&self, index: u32) -> Rgb565 {
        if index >= self.w as u32 * self.h as u32 {
            return Rgb565::BLACK;
        }
        let w = self.w as u32;
        let x = self.x as u32 + index % w;
        let y = self.y as u32 + index / w;
        self.framebuffer
            .get_pixel(x as u16, y as u16)
            .unwrap_or(Rgb565::BLACK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_checks() {
        let mut fb = Framebuffer::new(4, 3);
        assert!(fb.set_pixel(3, 2, Rgb565::RED));
        assert!(!fb.set_pixel(4, 0, Rgb565::RED));
        assert_eq!(fb.get_pixel(3, 2), Some(Rgb565::RED));
        assert_eq!(fb.get_pixel(0, 3), None);
    }

    #[test]
    fn test_fill_rect() {
        let mut fb = Framebuffer::new(4, 3);
        assert!(fb.fill_rect(1, 1, 2, 2, Rgb565::BLUE));
        assert!(!fb.fill_rect(3, 0, 2, 1, Rgb565::BLUE));

        let blue: Vec<usize> = fb
            .as_slice()
            .iter()
            .enumerate()
            .filter(|(_, &p)| p == Rgb565::BLUE.0)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(blue, vec![5, 6, 9, 10]);
    }

    #[test]
    fn test_from_rgb888_bytes() {
        let bytes = [0xFF, 0, 0, 0, 0xFF, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF];
        let fb = Framebuffer::from_rgb888_bytes(2, 2, &bytes).unwrap();
        assert_eq!(
            fb.as_slice(),
            &[Rgb565::RED.0, Rgb565::GREEN.0, Rgb565::BLUE.0, Rgb565::WHITE.0]
        );
        assert!(Framebuffer::from_rgb888_bytes(2, 2, &bytes[..9]).is_none());
    }

    #[test]
    fn test_region_reads_raster_order() {
        let mut fb = Framebuffer::new(4, 4);
        for y in 0..4 {
            for x in 0..4 {
                fb.set_pixel(x, y, Rgb565(y * 10 + x));
            }
        }

        let region = fb.region(1, 2, 2, 2);
        let pixels: Vec<u16> = (0..4).map(|i| region.pixel(i).0).collect();
        assert_eq!(pixels, vec![21, 22, 31, 32]);
    }
}
