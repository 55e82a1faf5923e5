//! ILI9341 LCD Controller Driver
//!
//! Driver for the ILI9341 TFT LCD controller, commonly found on 2.8" and
//! 3.2" SPI displays, speaking through a framed [`Transport`].

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::display::color::PixelOrder;
use crate::stream::{PixelPort, Rect, StreamError};
use crate::transport::{Mode, Transport, TransportError};

/// ILI9341 commands
pub mod cmd {
    pub const SWRESET: u8 = 0x01;
    pub const SLPOUT: u8 = 0x11;
    pub const DISPOFF: u8 = 0x28;
    pub const DISPON: u8 = 0x29;
    pub const CASET: u8 = 0x2A;    // Column address set
    pub const PASET: u8 = 0x2B;    // Page address set
    pub const RAMWR: u8 = 0x2C;    // Memory write
    pub const MADCTL: u8 = 0x36;   // Memory access control
    pub const PIXFMT: u8 = 0x3A;   // Pixel format
}

/// MADCTL bits
pub mod madctl {
    pub const MY: u8 = 0x80;
    pub const MX: u8 = 0x40;
    pub const MV: u8 = 0x20;
    pub const BGR: u8 = 0x08;
}

/// PIXFMT parameter selecting 16 bits/pixel on both interfaces
pub const PIXFMT_RGB565: u8 = 0x55;

/// Native panel dimensions (portrait)
pub const WIDTH: u16 = 240;
pub const HEIGHT: u16 = 320;

/// Panel orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    /// MADCTL parameter for this orientation
    pub const fn madctl(self) -> u8 {
        match self {
            Orientation::Portrait => madctl::MY | madctl::MX | madctl::BGR,
            Orientation::Landscape => madctl::MV | madctl::MY | madctl::BGR,
        }
    }

    /// Active `(width, height)` for a panel of the given native size
    pub const fn active_size(self, native_width: u16, native_height: u16) -> (u16, u16) {
        match self {
            Orientation::Portrait => (native_width, native_height),
            Orientation::Landscape => (native_height, native_width),
        }
    }
}

/// How pixel data frames are sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelMode {
    /// 16-bit SPI words, host byte order in the buffer
    #[default]
    Data16,
    /// 8-bit SPI words, big-endian bytes in the buffer
    Data8,
}

impl PixelMode {
    pub const fn frame_mode(self) -> Mode {
        match self {
            PixelMode::Data16 => Mode::Data16,
            PixelMode::Data8 => Mode::Data8,
        }
    }

    pub const fn pixel_order(self) -> PixelOrder {
        match self {
            PixelMode::Data16 => PixelOrder::Native,
            PixelMode::Data8 => PixelOrder::BigEndian,
        }
    }
}

/// ILI9341 driver
pub struct Ili9341<T: Transport> {
    transport: T,
    orientation: Orientation,
    pixel_mode: PixelMode,
    init_delay: Duration,
    initialized: bool,
}

impl<T: Transport> Ili9341<T> {
    /// Create a new ILI9341 driver instance
    pub fn new(transport: T, orientation: Orientation, pixel_mode: PixelMode) -> Self {
        Self {
            transport,
            orientation,
            pixel_mode,
            init_delay: Duration::from_millis(120),
            initialized: false,
        }
    }

    /// Delay after reset and sleep-out during [`init`](Self::init)
    pub fn with_init_delay(mut self, delay: Duration) -> Self {
        self.init_delay = delay;
        self
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn pixel_mode(&self) -> PixelMode {
        self.pixel_mode
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Bring the controller out of reset.
    ///
    /// Panel-specific power and gamma tables are left to the kernel driver;
    /// this only establishes what the streaming path depends on.
    pub fn init(&mut self) -> Result<(), DisplayError> {
        self.transport.command(cmd::SWRESET)?;
        self.delay();
        self.transport.command(cmd::SLPOUT)?;
        self.delay();
        self.transport.command_with(cmd::PIXFMT, &[PIXFMT_RGB565])?;
        self.set_orientation(self.orientation)?;
        self.transport.command(cmd::DISPON)?;

        self.initialized = true;
        info!("ILI9341 initialized ({:?})", self.orientation);
        Ok(())
    }

    /// Take over a controller that an earlier session already brought up
    pub fn attach(&mut self) {
        debug!("attaching to initialized ILI9341");
        self.initialized = true;
    }

    /// Program memory access control for `orientation`
    pub fn set_orientation(&mut self, orientation: Orientation) -> Result<(), DisplayError> {
        self.transport
            .command_with(cmd::MADCTL, &[orientation.madctl()])?;
        self.orientation = orientation;
        Ok(())
    }

    /// Set the drawing window
    pub fn set_window(&mut self, window: Rect) -> Result<(), TransportError> {
        let [x1h, x1l] = window.x1.to_be_bytes();
        let [x2h, x2l] = window.x2.to_be_bytes();
        self.transport.command_with(cmd::CASET, &[x1h, x1l, x2h, x2l])?;

        let [y1h, y1l] = window.y1.to_be_bytes();
        let [y2h, y2l] = window.y2.to_be_bytes();
        self.transport.command_with(cmd::PASET, &[y1h, y1l, y2h, y2l])
    }

    /// Start a memory write at the window origin
    pub fn begin_write(&mut self) -> Result<(), TransportError> {
        self.transport.command(cmd::RAMWR)
    }

    /// Write encoded pixel bytes to the current window
    pub fn write_pixels(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.transport
            .write_frame(self.pixel_mode.frame_mode(), data)
    }

    /// Unblank the panel
    pub fn display_on(&mut self) -> Result<(), TransportError> {
        self.transport.command(cmd::DISPON)
    }

    /// Blank the panel; display RAM is kept
    pub fn display_off(&mut self) -> Result<(), TransportError> {
        self.transport.command(cmd::DISPOFF)
    }

    fn delay(&self) {
        if !self.init_delay.is_zero() {
            debug!("waiting {:?}", self.init_delay);
            std::thread::sleep(self.init_delay);
        }
    }
}

impl<T: Transport> PixelPort for Ili9341<T> {
    fn set_window(&mut self, window: Rect) -> Result<(), TransportError> {
        Ili9341::set_window(self, window)
    }

    fn begin_write(&mut self) -> Result<(), TransportError> {
        Ili9341::begin_write(self)
    }

    fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.write_pixels(data)
    }

    fn pixel_order(&self) -> PixelOrder {
        self.pixel_mode.pixel_order()
    }
}

/// Display errors
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("display not initialized")]
    NotInitialized,

    #[error("invalid panel config: {0}")]
    Config(String),

    #[error("framebuffer is {actual_width}x{actual_height}, panel is {width}x{height}")]
    FramebufferMismatch {
        width: u16,
        height: u16,
        actual_width: u16,
        actual_height: u16,
    },

    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}
