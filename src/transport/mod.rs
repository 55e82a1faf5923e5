//! Framed command/data transport to the LCD character device
//!
//! Every write to the device node is a single frame:
//!
//! | Byte  | Meaning                                                   |
//! |-------|-----------------------------------------------------------|
//! | 0     | mode: bit0 `0`=command `1`=data, bit1 `0`=8-bit `1`=16-bit |
//! | 1..N  | payload (one opcode for commands, parameter/pixel words)   |
//!
//! The mode byte only exists at this edge. Everything above it talks in
//! terms of [`Mode`].

pub mod capture;
pub mod chardev;

pub use capture::{CaptureTransport, Frame};
pub use chardev::CharDevice;

use thiserror::Error;

/// Mode byte bits
mod bits {
    /// Set for data frames, clear for command frames
    pub const DATA: u8 = 1 << 0;
    /// Set for 16-bit word data frames
    pub const WORD16: u8 = 1 << 1;
}

/// Kind of frame written to the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Single opcode byte, sent with D/CX low
    Command,
    /// Parameter or pixel bytes, 8 bits per SPI word
    Data8,
    /// Pixel words, 16 bits per SPI word
    Data16,
}

impl Mode {
    /// Serialize to the on-wire mode byte
    pub const fn to_byte(self) -> u8 {
        match self {
            Mode::Command => 0,
            Mode::Data8 => bits::DATA,
            Mode::Data16 => bits::DATA | bits::WORD16,
        }
    }

    /// Parse a mode byte the way the kernel driver does.
    ///
    /// Bit1 is only meaningful for data frames.
    pub const fn from_byte(byte: u8) -> Self {
        if byte & bits::DATA == 0 {
            Mode::Command
        } else if byte & bits::WORD16 == 0 {
            Mode::Data8
        } else {
            Mode::Data16
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Command => write!(f, "CMD"),
            Mode::Data8 => write!(f, "DATA8"),
            Mode::Data16 => write!(f, "DATA16"),
        }
    }
}

/// Build the exact byte sequence for one frame
pub fn encode_frame(mode: Mode, payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(payload.len() + 1);
    frame.push(mode.to_byte());
    frame.extend_from_slice(payload);
    frame
}

/// Byte-oriented sink for framed writes
///
/// Calls are synchronous: they return once the frame has been handed to
/// the device in full.
pub trait Transport {
    /// Write one frame
    fn write_frame(&mut self, mode: Mode, payload: &[u8]) -> Result<(), TransportError>;

    /// Send a single command opcode
    fn command(&mut self, opcode: u8) -> Result<(), TransportError> {
        self.write_frame(Mode::Command, &[opcode])
    }

    /// Send 8-bit parameter bytes
    fn data(&mut self, params: &[u8]) -> Result<(), TransportError> {
        self.write_frame(Mode::Data8, params)
    }

    /// Send a command followed by its parameters
    fn command_with(&mut self, opcode: u8, params: &[u8]) -> Result<(), TransportError> {
        self.command(opcode)?;
        if !params.is_empty() {
            self.data(params)?;
        }
        Ok(())
    }
}

/// Transport errors
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("device I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("short write: {written} of {expected} frame bytes accepted")]
    ShortWrite { expected: usize, written: usize },

    #[error("transport closed")]
    Closed,
}
