//! Raster-order tiling of a fill into staging-buffer sized transmits
//!
//! # Window addressing
//!
//! Each tile sets the controller window from the tile's start pixel to the
//! far corner of the *whole* requested region, then pushes at most one
//! buffer's worth of pixels. The controller's write pointer auto-increments
//! and wraps inside that window, so the pixels land in raster order even
//! though a transmit covers only part of it. The next tile re-addresses
//! from its own start pixel.

use log::{debug, error};

use super::area::{clamp, Geometry, Rect};
use super::pool::{BufferId, BufferPool};
use super::{PixelPort, StreamError};
use crate::display::color::{PixelOrder, Rgb565};

/// Supplies pixels of a region in raster order
pub trait PixelSource {
    /// Pixel at raster index `index` within the region
    fn pixel(&self, index: u32) -> Rgb565;

    /// Write `out.len() / Rgb565::BYTES` pixels starting at raster index `start`
    fn fill(&self, start: u32, out: &mut [u8], order: PixelOrder) {
        for (i, chunk) in out.chunks_exact_mut(Rgb565::BYTES as usize).enumerate() {
            self.pixel(start + i as u32).write(chunk, order);
        }
    }
}

/// A single color repeated over the region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Solid(pub Rgb565);

impl Solid {
    pub const fn from_rgb888(rgb888: u32) -> Self {
        Self(Rgb565::from_rgb888(rgb888))
    }
}

impl PixelSource for Solid {
    fn pixel(&self, _index: u32) -> Rgb565 {
        self.0
    }
}

/// Requested region and progress of one fill
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillJob {
    pub x_start: u16,
    pub width: u16,
    pub y_start: u16,
    pub height: u16,
    pub total_bytes: u32,
    pub bytes_sent: u32,
}

impl FillJob {
    pub fn new(geometry: &Geometry, x_start: u16, width: u16, y_start: u16, height: u16) -> Self {
        Self {
            x_start,
            width,
            y_start,
            height,
            total_bytes: width as u32 * height as u32 * geometry.bytes_per_pixel(),
            bytes_sent: 0,
        }
    }

    pub fn remaining_bytes(&self) -> u32 {
        self.total_bytes - self.bytes_sent
    }

    pub fn is_done(&self) -> bool {
        self.bytes_sent >= self.total_bytes
    }
}

/// One planned transmit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    /// Window addressed before the transmit
    pub window: Rect,
    /// Raster index of the first pixel within the region
    pub first_pixel: u32,
    /// Pixels carried by this transmit
    pub pixels: u32,
}

/// Outcome of a completed fill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FillReport {
    pub tiles: u32,
    pub bytes_sent: u32,
}

/// Drives fills through a buffer pool into a pixel port
pub struct TileScheduler<'a> {
    geometry: Geometry,
    pool: &'a mut BufferPool,
}

impl<'a> TileScheduler<'a> {
    pub fn new(geometry: Geometry, pool: &'a mut BufferPool) -> Self {
        Self { geometry, pool }
    }

    /// Plan the next tile of `job` without touching the pool or port
    pub fn next_tile(&self, job: &FillJob) -> Option<Tile> {
        if job.is_done() {
            return None;
        }

        let bpp = self.geometry.bytes_per_pixel();
        let width = job.width as u32;
        let pixels_sent = job.bytes_sent / bpp;

        let x1 = job.x_start as u32 + pixels_sent % width;
        let y1 = job.y_start as u32 + pixels_sent / width;

        let npix = if x1 != job.x_start as u32 {
            // Mid-row resume: finish the current row only
            job.x_start as u32 + width - x1
        } else {
            job.remaining_bytes() / bpp
        };
        let npix = npix.min(self.pool.capacity_pixels(bpp));

        let window = clamp(&self.geometry, x1 as u16, job.width, y1 as u16, job.height);

        Some(Tile {
            window,
            first_pixel: pixels_sent,
            pixels: npix,
        })
    }

    /// Stream `source` into `[x_start, x_start+width) × [y_start, y_start+height)`
    pub fn fill<P, S>(
        &mut self,
        port: &mut P,
        source: &S,
        x_start: u16,
        width: u16,
        y_start: u16,
        height: u16,
    ) -> Result<FillReport, StreamError>
    where
        P: PixelPort + ?Sized,
        S: PixelSource + ?Sized,
    {
        if !self
            .geometry
            .contains(x_start as u32, width as u32, y_start as u32, height as u32)
        {
            return Err(StreamError::OutOfBounds {
                x: x_start,
                width,
                y: y_start,
                height,
                panel_width: self.geometry.width,
                panel_height: self.geometry.height,
            });
        }

        let mut job = FillJob::new(&self.geometry, x_start, width, y_start, height);
        let mut report = FillReport::default();

        if self.pool.capacity_pixels(self.geometry.bytes_per_pixel()) == 0 && !job.is_done() {
            return Err(StreamError::BufferTooSmall {
                capacity: self.pool.capacity_bytes(),
            });
        }

        while let Some(tile) = self.next_tile(&job) {
            let len = self.transmit(port, source, &tile)?;
            job.bytes_sent += len;
            report.tiles += 1;
        }

        report.bytes_sent = job.bytes_sent;
        debug!(
            "fill {}x{} at ({}, {}): {} bytes in {} tiles",
            width, height, x_start, y_start, report.bytes_sent, report.tiles
        );
        Ok(report)
    }

    /// Fill one staging buffer and push it through the port
    fn transmit<P, S>(&mut self, port: &mut P, source: &S, tile: &Tile) -> Result<u32, StreamError>
    where
        P: PixelPort + ?Sized,
        S: PixelSource + ?Sized,
    {
        let id = self.pool.acquire().map_err(|e| {
            error!("staging buffer pool exhausted during synchronous fill: {}", e);
            StreamError::NoBufferAvailable
        })?;

        let len = (tile.pixels * self.geometry.bytes_per_pixel()) as usize;
        let result = self.send_buffer(port, source, tile, id, len);

        // Release before surfacing any transport error
        self.pool.release(id)?;
        result?;

        debug!(
            "tile [{}..={}]x[{}..={}] pixel {} +{}",
            tile.window.x1,
            tile.window.x2,
            tile.window.y1,
            tile.window.y2,
            tile.first_pixel,
            tile.pixels
        );
        Ok(len as u32)
    }

    fn send_buffer<P, S>(
        &mut self,
        port: &mut P,
        source: &S,
        tile: &Tile,
        id: BufferId,
        len: usize,
    ) -> Result<(), StreamError>
    where
        P: PixelPort + ?Sized,
        S: PixelSource + ?Sized,
    {
        let order = port.pixel_order();
        let buffer = self.pool.buffer_mut(id)?;
        source.fill(tile.first_pixel, &mut buffer[..len], order);

        let data = self.pool.mark_in_flight(id, len)?;
        port.set_window(tile.window)?;
        port.begin_write()?;
        port.send(data)?;
        Ok(())
    }
}
