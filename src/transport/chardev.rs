//! Character device transport
//!
//! Writes frames to the node exported by the kernel-side ILI9341 driver
//! (`/dev/ili9341` by default). The driver reads the mode byte, toggles
//! D/CX and the SPI word size accordingly, and pushes the payload out.
//!
//! # Framing
//!
//! One frame is one `write(2)`. `write_all` is deliberately not used: a
//! partial write retried as a second call would be parsed by the driver as a
//! new frame with a bogus mode byte.

use log::{debug, warn};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::{encode_frame, Mode, Transport, TransportError};

/// Default device node created by the kernel driver
pub const DEFAULT_DEVICE_PATH: &str = "/dev/ili9341";

/// Frame sink backed by a device node (or any writable file)
pub struct CharDevice {
    path: PathBuf,
    file: Option<File>,
    frames_written: u64,
}

impl CharDevice {
    /// Open the device node for writing
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TransportError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().write(true).open(&path)?;
        debug!("opened LCD device {}", path.display());

        Ok(Self {
            path,
            file: Some(file),
            frames_written: 0,
        })
    }

    /// Path of the underlying node
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of frames successfully written
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Close the node; further writes fail with [`TransportError::Closed`]
    pub fn close(&mut self) {
        if self.file.take().is_some() {
            debug!("closed LCD device {}", self.path.display());
        }
    }
}

impl Transport for CharDevice {
    fn write_frame(&mut self, mode: Mode, payload: &[u8]) -> Result<(), TransportError> {
        if payload.is_empty() {
            // The driver drops writes shorter than two bytes anyway
            warn!("ignoring empty {} frame", mode);
            return Ok(());
        }

        let file = self.file.as_mut().ok_or(TransportError::Closed)?;
        let frame = encode_frame(mode, payload);
        let written = file.write(&frame)?;
        if written != frame.len() {
            return Err(TransportError::ShortWrite {
                expected: frame.len(),
                written,
            });
        }

        self.frames_written += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_frames_land_in_node() {
        let node = NamedTempFile::new().unwrap();
        let mut dev = CharDevice::open(node.path()).unwrap();

        dev.command(0x2C).unwrap();
        dev.write_frame(Mode::Data16, &[0xF8, 0x00, 0xF8, 0x00]).unwrap();
        assert_eq!(dev.frames_written(), 2);

        let bytes = std::fs::read(node.path()).unwrap();
        assert_eq!(bytes, vec![0x00, 0x2C, 0x03, 0xF8, 0x00, 0xF8, 0x00]);
    }

    #[test]
    fn test_empty_frame_is_not_written() {
        let node = NamedTempFile::new().unwrap();
        let mut dev = CharDevice::open(node.path()).unwrap();

        dev.data(&[]).unwrap();
        assert_eq!(dev.frames_written(), 0);
        assert!(std::fs::read(node.path()).unwrap().is_empty());
    }

    #[test]
    fn test_write_after_close_fails() {
        let node = NamedTempFile::new().unwrap();
        let mut dev = CharDevice::open(node.path()).unwrap();
        dev.close();

        assert!(matches!(dev.command(0x00), Err(TransportError::Closed)));
    }

    #[test]
    fn test_missing_node() {
        let dir = tempfile::tempdir().unwrap();
        let result = CharDevice::open(dir.path().join("ili9341"));
        assert!(matches!(result, Err(TransportError::Io(_))));
    }
}
