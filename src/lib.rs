//! Pixel streaming for ILI9341 SPI LCDs
//!
//! Drives a 240×320 TFT panel through the framed command/data character
//! device exported by the kernel-side SPI driver. Fills and framebuffer
//! updates are cut into staging-buffer sized tiles and pushed in raster
//! order.
//!
//! # Architecture
//!
//! ```text
//! Application / lcd-stream CLI
//!     │
//!     ▼
//! ┌─────────────────────┐
//! │ Display             │  init, fill_rect, blit, refresh
//! └──────────┬──────────┘
//!            ▼
//! ┌─────────────────────┐    ┌──────────────┐
//! │ TileScheduler       │───▶│ BufferPool   │  2 × 10 KiB
//! └──────────┬──────────┘    └──────────────┘
//!            ▼ PixelPort
//! ┌─────────────────────┐
//! │ Ili9341             │  CASET / PASET / RAMWR
//! └──────────┬──────────┘
//!            ▼ Transport
//! ┌─────────────────────┐
//! │ CharDevice          │  [mode byte | payload] per write
//! └──────────┬──────────┘
//!            ▼
//!       /dev/ili9341
//! ```

pub mod config;
pub mod display;
pub mod stream;
pub mod transport;

// Re-export main types
pub use config::PanelConfig;
pub use display::{Display, DisplayError, Framebuffer, Orientation, PixelMode, Rgb565};
pub use stream::{FillReport, Geometry, PixelPort, Rect, StreamError};
pub use transport::{CaptureTransport, CharDevice, Mode, Transport, TransportError};
