//! In-memory frame recorder
//!
//! Stands in for the device node on dry runs and in tests. Frames are kept
//! exactly as they would have been written.

use super::{encode_frame, Mode, Transport, TransportError};

/// One recorded frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub mode: Mode,
    pub payload: Vec<u8>,
}

impl Frame {
    pub fn new(mode: Mode, payload: Vec<u8>) -> Self {
        Self { mode, payload }
    }

    /// Bytes as they would appear on the device node
    pub fn to_bytes(&self) -> Vec<u8> {
        encode_frame(self.mode, &self.payload)
    }
}

/// Transport that records every frame
#[derive(Debug, Default)]
pub struct CaptureTransport {
    frames: Vec<Frame>,
    fail_after: Option<usize>,
}

impl CaptureTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `frames` more frames, then fail every write with an I/O error
    pub fn failing_after(frames: usize) -> Self {
        Self {
            frames: Vec::new(),
            fail_after: Some(frames),
        }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Concatenated byte stream of all frames
    pub fn to_bytes(&self) -> Vec<u8> {
        self.frames.iter().flat_map(Frame::to_bytes).collect()
    }

    /// Opcodes of all command frames, in order
    pub fn commands(&self) -> Vec<u8> {
        self.frames
            .iter()
            .filter(|f| f.mode == Mode::Command)
            .filter_map(|f| f.payload.first().copied())
            .collect()
    }

    /// Total payload bytes carried by data frames of the given mode
    pub fn payload_bytes(&self, mode: Mode) -> usize {
        self.frames
            .iter()
            .filter(|f| f.mode == mode)
            .map(|f| f.payload.len())
            .sum()
    }
}

impl Transport for CaptureTransport {
    fn write_frame(&mut self, mode: Mode, payload: &[u8]) -> Result<(), TransportError> {
        if payload.is_empty() {
            return Ok(());
        }
        if let Some(limit) = self.fail_after {
            if self.frames.len() >= limit {
                return Err(TransportError::Io(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "injected transport failure",
                )));
            }
        }

        self.frames.push(Frame::new(mode, payload.to_vec()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_frames_in_order() {
        let mut t = CaptureTransport::new();
        t.command(0x2A).unwrap();
        t.data(&[0, 0, 0, 239]).unwrap();

        assert_eq!(t.commands(), vec![0x2A]);
        assert_eq!(t.payload_bytes(Mode::Data8), 4);
        assert_eq!(t.to_bytes(), vec![0x00, 0x2A, 0x01, 0, 0, 0, 239]);
    }

    #[test]
    fn test_injected_failure() {
        let mut t = CaptureTransport::failing_after(1);
        t.command(0x01).unwrap();

        let err = t.command(0x11).unwrap_err();
        assert!(matches!(err, TransportError::Io(_)));
        assert_eq!(t.frames().len(), 1);
    }
}
