//! Tiled double-buffer pixel streaming
//!
//! A fill request is cut into transmits no larger than one staging buffer:
//!
//! ```text
//!  fill(source, x, w, y, h)
//!          │
//!          ▼
//!  ┌───────────────┐  next tile   ┌────────────┐
//!  │ TileScheduler │─────────────▶│ AreaClamp  │
//!  └───────┬───────┘              └────────────┘
//!          │ acquire / release
//!          ▼
//!  ┌───────────────┐  pixels      ┌────────────┐
//!  │  BufferPool   │◀─────────────│ PixelSource│
//!  └───────┬───────┘              └────────────┘
//!          │ set_window, begin_write, send
//!          ▼
//!  ┌───────────────┐
//!  │   PixelPort   │
//!  └───────────────┘
//! ```
//!
//! Everything runs on the caller's thread; each port call blocks until the
//! transfer is done, so at most one staging buffer is ever busy.

pub mod area;
pub mod pool;
pub mod tiler;

pub use area::{clamp, Geometry, Rect};
pub use pool::{BufferId, BufferPool, BufferState, PoolError};
pub use tiler::{FillJob, FillReport, PixelSource, Solid, Tile, TileScheduler};

use thiserror::Error;

use crate::display::color::PixelOrder;
use crate::transport::TransportError;

/// Destination of tiled pixel writes
///
/// The scheduler only ever calls these in the order `set_window`,
/// `begin_write`, `send`. A window stays addressed until the next
/// `set_window`.
pub trait PixelPort {
    /// Address the controller window
    fn set_window(&mut self, window: Rect) -> Result<(), TransportError>;

    /// Start a memory write at the window origin
    fn begin_write(&mut self) -> Result<(), TransportError>;

    /// Push encoded pixel bytes
    fn send(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// Byte layout `send` expects for each pixel
    fn pixel_order(&self) -> PixelOrder {
        PixelOrder::BigEndian
    }
}

/// Streaming errors
#[derive(Debug, Error)]
pub enum StreamError {
    #[error(
        "region {width}x{height} at ({x}, {y}) exceeds {panel_width}x{panel_height} panel"
    )]
    OutOfBounds {
        x: u16,
        width: u16,
        y: u16,
        height: u16,
        panel_width: u16,
        panel_height: u16,
    },

    #[error("no staging buffer available")]
    NoBufferAvailable,

    #[error("staging buffer of {capacity} bytes cannot hold a pixel")]
    BufferTooSmall { capacity: usize },

    #[error("staging buffer misuse: {0}")]
    Pool(PoolError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl From<PoolError> for StreamError {
    fn from(err: PoolError) -> Self {
        match err {
            PoolError::NoBufferAvailable => StreamError::NoBufferAvailable,
            other => StreamError::Pool(other),
        }
    }
}
