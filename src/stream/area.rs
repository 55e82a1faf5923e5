//! Panel geometry and rectangle clamping

use crate::display::color::Rgb565;

/// Inclusive rectangle in device pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x1: u16,
    pub x2: u16,
    pub y1: u16,
    pub y2: u16,
}

impl Rect {
    pub const fn new(x1: u16, x2: u16, y1: u16, y2: u16) -> Self {
        Self { x1, x2, y1, y2 }
    }

    pub const fn width(&self) -> u32 {
        self.x2 as u32 + 1 - self.x1 as u32
    }

    pub const fn height(&self) -> u32 {
        self.y2 as u32 + 1 - self.y1 as u32
    }
}

/// Active panel dimensions, fixed for the lifetime of a display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: u16,
    pub height: u16,
}

impl Geometry {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Staging bytes per pixel, always the RGB565 wire size
    pub const fn bytes_per_pixel(&self) -> u32 {
        Rgb565::BYTES
    }

    /// Whole-panel rectangle
    pub const fn full(&self) -> Rect {
        Rect::new(0, self.width.saturating_sub(1), 0, self.height.saturating_sub(1))
    }

    /// True if `[x, x+w) × [y, y+h)` lies on the panel
    pub fn contains(&self, x: u32, w: u32, y: u32, h: u32) -> bool {
        x.saturating_add(w) <= self.width as u32 && y.saturating_add(h) <= self.height as u32
    }

    pub const fn pixel_count(&self) -> u32 {
        self.width as u32 * self.height as u32
    }
}

/// Window for a region starting at `(x_start, y_start)`.
///
/// The far corner is pulled back onto the panel; the start corner is taken
/// as given, so callers validate it first.
pub fn clamp(geometry: &Geometry, x_start: u16, width: u16, y_start: u16, height: u16) -> Rect {
    let x2 = (x_start as u32 + width as u32).saturating_sub(1);
    let y2 = (y_start as u32 + height as u32).saturating_sub(1);

    let max_x = (geometry.width as u32).saturating_sub(1);
    let max_y = (geometry.height as u32).saturating_sub(1);

    Rect {
        x1: x_start,
        x2: x2.min(max_x) as u16,
        y1: y_start,
        y2: y2.min(max_y) as u16,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PORTRAIT: Geometry = Geometry::new(240, 320);

    #[test]
    fn test_clamp_inside_panel() {
        let r = clamp(&PORTRAIT, 10, 20, 30, 40);
        assert_eq!(r, Rect::new(10, 29, 30, 69));
        assert_eq!(r.width(), 20);
        assert_eq!(r.height(), 40);
    }

    #[test]
    fn test_clamp_pulls_far_corner_back() {
        let r = clamp(&PORTRAIT, 200, 100, 300, 100);
        assert_eq!(r, Rect::new(200, 239, 300, 319));
    }

    #[test]
    fn test_clamp_never_exceeds_panel() {
        for x in (0..240u16).step_by(17) {
            for y in (0..320u16).step_by(23) {
                for span in [1u16, 7, 64, 240, 320, u16::MAX] {
                    let r = clamp(&PORTRAIT, x, span, y, span);
                    assert!(r.x2 < PORTRAIT.width);
                    assert!(r.y2 < PORTRAIT.height);
                }
            }
        }
    }

    #[test]
    fn test_contains() {
        assert!(PORTRAIT.contains(0, 240, 0, 320));
        assert!(PORTRAIT.contains(239, 1, 319, 1));
        assert!(!PORTRAIT.contains(1, 240, 0, 1));
        assert!(!PORTRAIT.contains(0, 1, 320, 1));
        assert!(PORTRAIT.contains(240, 0, 0, 0));
    }

    #[test]
    fn test_full() {
        assert_eq!(PORTRAIT.full(), Rect::new(0, 239, 0, 319));
        assert_eq!(PORTRAIT.pixel_count(), 76_800);
        assert_eq!(PORTRAIT.bytes_per_pixel(), Rgb565::BYTES);
    }

    #[test]
    fn test_empty_panel_does_not_underflow() {
        let empty = Geometry::new(0, 320);
        assert_eq!(empty.full(), Rect::new(0, 0, 0, 319));
        assert_eq!(clamp(&empty, 0, 10, 0, 10), Rect::new(0, 0, 0, 9));
        assert!(!empty.contains(0, 1, 0, 1));
    }
}
