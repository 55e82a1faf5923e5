//! Display drivers and graphics primitives
//!
//! Provides the ILI9341 controller driver, the RGB565 codec, and a
//! framebuffer, tied together by [`Display`].

pub mod color;
pub mod framebuffer;
pub mod ili9341;

pub use color::{parse_rgb888, PixelOrder, Rgb565};
pub use framebuffer::{Framebuffer, FramebufferRegion};
pub use ili9341::{DisplayError, Ili9341, Orientation, PixelMode};

use log::info;
use std::time::Duration;

use crate::config::PanelConfig;
use crate::stream::{BufferPool, FillReport, Geometry, PixelSource, Solid, TileScheduler};
use crate::transport::Transport;

/// High-level display interface
pub struct Display<T: Transport> {
    controller: Ili9341<T>,
    geometry: Geometry,
    pool: BufferPool,
    framebuffer: Framebuffer,
    dirty: bool,
}

impl<T: Transport> Display<T> {
    /// Create a display over `transport` using the panel settings in `config`
    pub fn new(transport: T, config: &PanelConfig) -> Result<Self, DisplayError> {
        config
            .validate()
            .map_err(|e| DisplayError::Config(format!("{:#}", e)))?;

        let controller = Ili9341::new(transport, config.orientation, config.pixel_mode)
            .with_init_delay(Duration::from_millis(config.init_delay_ms));
        let geometry = config.geometry();

        Ok(Self {
            controller,
            geometry,
            pool: BufferPool::new(config.buffer_capacity),
            framebuffer: Framebuffer::new(geometry.width, geometry.height),
            dirty: true,
        })
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn controller(&self) -> &Ili9341<T> {
        &self.controller
    }

    pub fn into_transport(self) -> T {
        self.controller.into_transport()
    }

    /// Initialize the controller and address the whole panel
    pub fn init(&mut self) -> Result<(), DisplayError> {
        self.controller.init()?;
        self.controller.set_window(self.geometry.full())?;
        info!(
            "display ready: {}x{}, {} byte staging buffers",
            self.geometry.width,
            self.geometry.height,
            self.pool.capacity_bytes()
        );
        Ok(())
    }

    /// Stream to a panel that is already running, without resetting it
    pub fn attach(&mut self) {
        self.controller.attach();
    }

    /// Blank or unblank the panel
    pub fn set_display_on(&mut self, on: bool) -> Result<(), DisplayError> {
        if !self.controller.is_initialized() {
            return Err(DisplayError::NotInitialized);
        }
        if on {
            self.controller.display_on()?;
        } else {
            self.controller.display_off()?;
        }
        Ok(())
    }

    /// Fill a rectangle with a packed `0xRRGGBB` color
    pub fn fill_rect(
        &mut self,
        rgb888: u32,
        x: u16,
        width: u16,
        y: u16,
        height: u16,
    ) -> Result<FillReport, DisplayError> {
        self.stream(&Solid::from_rgb888(rgb888), x, width, y, height)
    }

    /// Paint the whole panel
    pub fn set_background(&mut self, rgb888: u32) -> Result<FillReport, DisplayError> {
        let Geometry { width, height, .. } = self.geometry;
        self.fill_rect(rgb888, 0, width, 0, height)
    }

    /// Stream a rectangle of `framebuffer` to the same place on the panel
    pub fn blit(
        &mut self,
        framebuffer: &Framebuffer,
        x: u16,
        width: u16,
        y: u16,
        height: u16,
    ) -> Result<FillReport, DisplayError> {
        self.check_framebuffer(framebuffer)?;
        self.stream(&framebuffer.region(x, width, y, height), x, width, y, height)
    }

    /// Stream any pixel source into a rectangle
    pub fn stream<S: PixelSource + ?Sized>(
        &mut self,
        source: &S,
        x: u16,
        width: u16,
        y: u16,
        height: u16,
    ) -> Result<FillReport, DisplayError> {
        if !self.controller.is_initialized() {
            return Err(DisplayError::NotInitialized);
        }

        let report = TileScheduler::new(self.geometry, &mut self.pool)
            .fill(&mut self.controller, source, x, width, y, height)?;
        Ok(report)
    }

    /// Get mutable access to the framebuffer
    pub fn framebuffer_mut(&mut self) -> &mut Framebuffer {
        self.dirty = true;
        &mut self.framebuffer
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the framebuffer to a solid color
    pub fn clear(&mut self, color: Rgb565) {
        self.framebuffer.clear(color);
        self.dirty = true;
    }

    /// Refresh the panel from the framebuffer if it changed
    pub fn refresh(&mut self) -> Result<Option<FillReport>, DisplayError> {
        if !self.dirty {
            return Ok(None);
        }
        if !self.controller.is_initialized() {
            return Err(DisplayError::NotInitialized);
        }

        let Geometry { width, height, .. } = self.geometry;
        let region = self.framebuffer.region(0, width, 0, height);
        let report = TileScheduler::new(self.geometry, &mut self.pool)
            .fill(&mut self.controller, &region, 0, width, 0, height)?;

        self.dirty = false;
        Ok(Some(report))
    }

    fn check_framebuffer(&self, framebuffer: &Framebuffer) -> Result<(), DisplayError> {
        if framebuffer.width() != self.geometry.width || framebuffer.height() != self.geometry.height {
            return Err(DisplayError::FramebufferMismatch {
                width: self.geometry.width,
                height: self.geometry.height,
                actual_width: framebuffer.width(),
                actual_height: framebuffer.height(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::ili9341::cmd;
    use crate::stream::StreamError;
    use crate::transport::{CaptureTransport, Mode};

    fn config() -> PanelConfig {
        PanelConfig {
            init_delay_ms: 0,
            ..PanelConfig::default()
        }
    }

    fn ready_display(config: &PanelConfig) -> Display<CaptureTransport> {
        let mut display = Display::new(CaptureTransport::new(), config).unwrap();
        display.init().unwrap();
        display
    }

    #[test]
    fn test_fill_before_init() {
        let mut display = Display::new(CaptureTransport::new(), &config()).unwrap();
        let err = display.fill_rect(0xFF0000, 0, 10, 0, 10).unwrap_err();
        assert!(matches!(err, DisplayError::NotInitialized));
        assert!(display.into_transport().frames().is_empty());
    }

    #[test]
    fn test_rejects_invalid_config() {
        let zero_width = PanelConfig {
            native_width: 0,
            ..config()
        };
        let err = Display::new(CaptureTransport::new(), &zero_width).err().unwrap();
        assert!(matches!(err, DisplayError::Config(ref msg) if msg.contains("non-zero")));

        let tiny_buffers = PanelConfig {
            buffer_capacity: 1,
            ..config()
        };
        assert!(matches!(
            Display::new(CaptureTransport::new(), &tiny_buffers),
            Err(DisplayError::Config(_))
        ));
    }

    #[test]
    fn test_attach_skips_bring_up() {
        let mut display = Display::new(CaptureTransport::new(), &config()).unwrap();
        display.attach();
        display.fill_rect(0xFF0000, 0, 1, 0, 1).unwrap();

        let commands = display.controller().transport().commands();
        assert_eq!(commands, vec![cmd::CASET, cmd::PASET, cmd::RAMWR]);
    }

    #[test]
    fn test_blank_and_unblank() {
        let mut display = Display::new(CaptureTransport::new(), &config()).unwrap();
        assert!(matches!(
            display.set_display_on(false),
            Err(DisplayError::NotInitialized)
        ));

        display.attach();
        display.set_display_on(false).unwrap();
        display.set_display_on(true).unwrap();
        assert_eq!(
            display.controller().transport().commands(),
            vec![cmd::DISPOFF, cmd::DISPON]
        );
    }

    #[test]
    fn test_init_addresses_full_panel() {
        let display = ready_display(&config());
        let frames = display.controller().transport().frames();
        let n = frames.len();
        assert_eq!(frames[n - 4].payload, vec![cmd::CASET]);
        assert_eq!(frames[n - 3].payload, vec![0, 0, 0, 239]);
        assert_eq!(frames[n - 1].payload, vec![0, 0, 0x01, 0x3F]);
    }

    #[test]
    fn test_background_covers_panel() {
        let mut display = ready_display(&config());
        let report = display.set_background(0x00FF00).unwrap();

        // 5120-pixel buffers against 240-pixel rows: a full tile then a
        // 160-pixel row remainder, 14 times, then a 12-row tail
        assert_eq!(report.bytes_sent, 153_600);
        assert_eq!(report.tiles, 29);

        let t = display.controller().transport();
        assert_eq!(t.payload_bytes(Mode::Data16), 153_600);
        let first_pixels = t
            .frames()
            .iter()
            .find(|f| f.mode == Mode::Data16)
            .unwrap();
        assert_eq!(&first_pixels.payload[..2], &Rgb565::GREEN.0.to_ne_bytes());
    }

    #[test]
    fn test_out_of_bounds_fill() {
        let mut display = ready_display(&config());
        let before = display.controller().transport().frames().len();

        let err = display.fill_rect(0xFFFFFF, 230, 20, 0, 10).unwrap_err();
        assert!(matches!(
            err,
            DisplayError::Stream(StreamError::OutOfBounds { .. })
        ));
        assert_eq!(display.controller().transport().frames().len(), before);
    }

    #[test]
    fn test_landscape_geometry() {
        let config = PanelConfig {
            orientation: Orientation::Landscape,
            ..config()
        };
        let mut display = ready_display(&config);
        assert_eq!(display.geometry().width, 320);
        assert!(display.fill_rect(0, 300, 20, 0, 240).is_ok());
    }

    #[test]
    fn test_refresh_only_when_dirty() {
        let mut display = ready_display(&config());
        display.clear(Rgb565::BLUE);

        let report = display.refresh().unwrap().unwrap();
        assert_eq!(report.bytes_sent, 240 * 320 * 2);
        assert!(!display.is_dirty());
        assert!(display.refresh().unwrap().is_none());

        display.framebuffer_mut().set_pixel(0, 0, Rgb565::RED);
        assert!(display.refresh().unwrap().is_some());
    }

    #[test]
    fn test_blit_region() {
        let config = PanelConfig {
            pixel_mode: PixelMode::Data8,
            ..config()
        };
        let mut display = ready_display(&config);
        let mut fb = Framebuffer::new(240, 320);
        fb.fill_rect(10, 10, 2, 1, Rgb565::RED);

        display.blit(&fb, 10, 2, 10, 1).unwrap();
        let t = display.controller().transport();
        let last = t.frames().last().unwrap();
        assert_eq!(last.mode, Mode::Data8);
        assert_eq!(last.payload, vec![0xF8, 0x00, 0xF8, 0x00]);

        let small = Framebuffer::new(10, 10);
        assert!(matches!(
            display.blit(&small, 0, 1, 0, 1),
            Err(DisplayError::FramebufferMismatch { .. })
        ));
    }
}
