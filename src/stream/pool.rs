//! Double staging buffer pool
//!
//! Two fixed-capacity buffers allocated once. A buffer moves
//! `Free → Filling → InFlight → Free`; the pool hands out the buffer that was
//! not returned last so a future pipelined port can fill one while the other
//! is on the wire.

use thiserror::Error;

/// Default capacity of each staging buffer
pub const DEFAULT_CAPACITY: usize = 10 * 1024;

/// Number of staging buffers in a pool
pub const BUFFER_COUNT: usize = 2;

/// Staging buffer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferState {
    Free,
    Filling,
    InFlight,
}

/// Handle to one of the pool's buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferId(usize);

impl BufferId {
    pub const fn index(self) -> usize {
        self.0
    }
}

struct Slot {
    data: Box<[u8]>,
    state: BufferState,
}

/// Owner of the two staging buffers
pub struct BufferPool {
    slots: [Slot; BUFFER_COUNT],
    capacity: usize,
    last: Option<usize>,
}

impl BufferPool {
    /// Allocate two buffers of `capacity` bytes each
    pub fn new(capacity: usize) -> Self {
        let slot = || Slot {
            data: vec![0u8; capacity].into_boxed_slice(),
            state: BufferState::Free,
        };

        Self {
            slots: [slot(), slot()],
            capacity,
            last: None,
        }
    }

    pub fn capacity_bytes(&self) -> usize {
        self.capacity
    }

    /// Whole pixels that fit in one buffer
    pub fn capacity_pixels(&self, bytes_per_pixel: u32) -> u32 {
        (self.capacity / bytes_per_pixel as usize) as u32
    }

    pub fn state(&self, id: BufferId) -> BufferState {
        self.slots[id.0].state
    }

    /// Number of buffers not currently `Free`
    pub fn busy(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.state != BufferState::Free)
            .count()
    }

    /// Take a free buffer for filling
    pub fn acquire(&mut self) -> Result<BufferId, PoolError> {
        // Prefer the buffer that was not handed out last
        let preferred = match self.last {
            Some(i) => (i + 1) % BUFFER_COUNT,
            None => 0,
        };

        let index = (0..BUFFER_COUNT)
            .map(|n| (preferred + n) % BUFFER_COUNT)
            .find(|&i| self.slots[i].state == BufferState::Free)
            .ok_or(PoolError::NoBufferAvailable)?;

        self.slots[index].state = BufferState::Filling;
        self.last = Some(index);
        Ok(BufferId(index))
    }

    /// Writable contents of a buffer being filled
    pub fn buffer_mut(&mut self, id: BufferId) -> Result<&mut [u8], PoolError> {
        let slot = &mut self.slots[id.0];
        match slot.state {
            BufferState::Filling => Ok(&mut slot.data[..]),
            state => Err(PoolError::WrongState {
                expected: BufferState::Filling,
                actual: state,
            }),
        }
    }

    /// Hand a filled buffer to the transport, returning its first `len` bytes
    pub fn mark_in_flight(&mut self, id: BufferId, len: usize) -> Result<&[u8], PoolError> {
        let slot = &mut self.slots[id.0];
        if slot.state != BufferState::Filling {
            return Err(PoolError::WrongState {
                expected: BufferState::Filling,
                actual: slot.state,
            });
        }

        slot.state = BufferState::InFlight;
        Ok(&slot.data[..len.min(self.capacity)])
    }

    /// Return a held buffer to the pool
    pub fn release(&mut self, id: BufferId) -> Result<(), PoolError> {
        let slot = &mut self.slots[id.0];
        if slot.state == BufferState::Free {
            return Err(PoolError::NotHeld(id.0));
        }
        slot.state = BufferState::Free;
        Ok(())
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Pool errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("no staging buffer available")]
    NoBufferAvailable,

    #[error("staging buffer {0} is not held")]
    NotHeld(usize),

    #[error("staging buffer is {actual:?}, expected {expected:?}")]
    WrongState {
        expected: BufferState,
        actual: BufferState,
    },
}
