//! Byte buffers sitting between the blocking caller and the engine.
//!
//! Both directions use the same shape: a growable byte sequence plus a
//! consumed-offset cursor. Consumers advance the cursor instead of shifting
//! bytes; once the cursor reaches the end, the buffer compacts back to
//! empty, which bounds growth under sustained traffic.

use alloc::vec::Vec;

/// Transmit queue with a fixed logical capacity.
///
/// `capacity` bounds the number of *pending* (buffered but unsent) bytes,
/// not the backing allocation; the backing vector compacts whenever the
/// cursor catches up with the tail.
#[derive(Debug)]
pub(crate) struct TxBuffer {
    buf: Vec<u8>,
    head: usize,
    capacity: usize,
}

impl TxBuffer {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            buf: Vec::new(),
            head: 0,
            capacity,
        }
    }

    /// Bytes buffered and not yet handed to the engine.
    pub(crate) fn pending(&self) -> usize {
        self.buf.len() - self.head
    }

    /// Room left for the caller before the queue is full.
    pub(crate) fn free(&self) -> usize {
        self.capacity.saturating_sub(self.pending())
    }

    /// Copy as much of `data` as fits, returning the number of bytes taken.
    pub(crate) fn push(&mut self, data: &[u8]) -> usize {
        let take = self.free().min(data.len());
        self.buf.extend_from_slice(&data[..take]);
        take
    }

    /// The not-yet-sent tail, in write order.
    pub(crate) fn unsent(&self) -> &[u8] {
        &self.buf[self.head..]
    }

    /// Mark `len` bytes as handed off; compacts once fully consumed.
    pub(crate) fn consume(&mut self, len: usize) {
        debug_assert!(self.head + len <= self.buf.len());
        self.head += len;
        if self.head == self.buf.len() {
            self.buf.clear();
            self.head = 0;
        }
    }

    /// Drop everything, pending bytes included.
    pub(crate) fn reset(&mut self) {
        self.buf.clear();
        self.head = 0;
    }

    /// Pre-allocate the backing storage up to the logical capacity.
    pub(crate) fn reserve_capacity(&mut self) {
        self.buf.reserve(self.capacity);
    }
}

/// Receive queue; grows with whatever the engine delivers.
///
/// Growth is fallible: the caller decides what a failed [`RxBuffer::append`]
/// means for the connection. A partial append never happens.
#[derive(Debug, Default)]
pub(crate) struct RxBuffer {
    buf: Vec<u8>,
    head: usize,
}

impl RxBuffer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Bytes delivered by the engine and not yet read.
    pub(crate) fn available(&self) -> usize {
        self.buf.len() - self.head
    }

    /// Append delivered bytes, all or nothing.
    pub(crate) fn append(&mut self, data: &[u8]) -> Result<(), ()> {
        self.buf.try_reserve(data.len()).map_err(|_| ())?;
        self.buf.extend_from_slice(data);
        Ok(())
    }

    /// Next unread byte, without consuming it.
    pub(crate) fn peek(&self) -> Option<u8> {
        self.buf.get(self.head).copied()
    }

    /// Copy up to `out.len()` unread bytes into `out` and consume them;
    /// compacts once fully consumed.
    pub(crate) fn read(&mut self, out: &mut [u8]) -> usize {
        let take = self.available().min(out.len());
        out[..take].copy_from_slice(&self.buf[self.head..self.head + take]);
        self.head += take;
        if self.head == self.buf.len() {
            self.buf.clear();
            self.head = 0;
        }
        take
    }
}
