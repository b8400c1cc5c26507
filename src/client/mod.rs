//! A blocking TCP client on top of an asynchronous engine.
//!
//! [`SyncClient`] reconciles two worlds: the application wants calls that
//! return when the work is done, while the engine only offers non-blocking
//! operations plus completion callbacks. The client buffers writes and
//! reads, wires its own handlers into the session's callback slots, and
//! waits by running the engine's event pump until a condition holds.
//!
//! Clients are cheap to clone and clones share everything: the session,
//! the transmit queue and the receive queue. The last clone to go away
//! tears the session down. This makes it safe to park a client in a queue,
//! return it by value, or hand copies to different parts of the firmware.

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use core::cell::RefCell;
use core::fmt;

use crate::buffer::{RxBuffer, TxBuffer};
use crate::error::Error;
use crate::transport::{Connection, Endpoint, Engine, SharedConnection, TcpState};

/// Default transmit queue capacity: one full-size TCP segment.
pub const DEFAULT_TX_CAPACITY: usize = 1460;

/// State shared by every clone of a client.
///
/// Dropping the last clone drops this, and the `Drop` impl is the single
/// place the session is released: callbacks detached, session aborted.
struct Inner<C: Connection> {
    conn: Option<SharedConnection<C>>,
    tx: TxBuffer,
    rx: RxBuffer,
}

impl<C: Connection> Inner<C> {
    /// Hand buffered transmit bytes to the engine while it advertises
    /// capacity, in write order. Stops early when the engine accepts fewer
    /// bytes than offered.
    fn drain(&mut self) -> usize {
        let Some(conn) = self.conn.clone() else {
            return 0;
        };
        let mut conn = conn.borrow_mut();
        drain(&mut self.tx, &mut *conn)
    }
}

impl<C: Connection> Drop for Inner<C> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            detach_and_abort(&conn);
        }
    }
}

/// Unbind every callback slot, then abort the session.
///
/// Detaching first keeps the abort from re-entering the disconnect handler
/// of a client that is going away.
fn detach_and_abort<C: Connection>(conn: &SharedConnection<C>) {
    let mut c = conn.borrow_mut();
    c.on_connect(None);
    c.on_disconnect(None);
    c.on_data(None);
    c.on_ack(None);
    c.on_timeout(None);
    c.abort();
}

/// The transmit drain shared by the write path and the ack handler.
fn drain<C: Connection>(tx: &mut TxBuffer, conn: &mut C) -> usize {
    let mut total = 0;

    while conn.connected() && conn.can_send() && tx.pending() > 0 {
        let offer = conn.space().min(tx.pending());
        let accepted = conn.send(&tx.unsent()[..offer]);
        tx.consume(accepted);
        total += accepted;

        if accepted != offer {
            // Engine-side backpressure; try again on the next ack.
            break;
        }
    }

    total
}

/// Bind the disconnect handler.
///
/// Bound before a connection attempt starts, so a failure during the
/// attempt is observable to the blocking wait.
fn attach_disconnect<C: Connection>(weak: &Weak<RefCell<Inner<C>>>, conn: &mut C) {
    let w = weak.clone();
    conn.on_disconnect(Some(Box::new(move || {
        let Some(inner) = w.upgrade() else { return };
        let mut guard = inner.borrow_mut();
        let state = &mut *guard;
        // Unsent bytes die with the session; received bytes stay readable.
        state.conn = None;
        state.tx.reset();
    })));
}

/// Bind the handlers that only make sense on an established session:
/// ack drains the transmit queue, data feeds the receive queue, and a
/// receive-idle timeout closes the session.
fn attach_established<C: Connection>(weak: &Weak<RefCell<Inner<C>>>, conn: &mut C) {
    let w = weak.clone();
    conn.on_ack(Some(Box::new(move |conn: &mut C, _len: usize, _elapsed_ms: u32| {
        let Some(inner) = w.upgrade() else { return };
        let mut guard = inner.borrow_mut();
        let state = &mut *guard;
        drain(&mut state.tx, conn);
    })));

    let w = weak.clone();
    conn.on_data(Some(Box::new(move |conn: &mut C, data: &[u8]| {
        let Some(inner) = w.upgrade() else { return };
        // Credit is released when the application reads, not on arrival.
        conn.ack_later();
        if inner.borrow_mut().rx.append(data).is_err() {
            // Out of memory; abort instead of corrupting the stream.
            conn.abort();
        }
    })));

    conn.on_timeout(Some(Box::new(move |conn: &mut C, _elapsed_ms: u32| {
        conn.close(false);
    })));
}

/// Connect-completion transition: reset the transmit queue, pre-reserve its
/// capacity, and bind the established-state handlers.
fn established<C: Connection>(inner: &Rc<RefCell<Inner<C>>>, conn: &mut C) {
    {
        let mut state = inner.borrow_mut();
        state.tx.reset();
        state.tx.reserve_capacity();
    }
    attach_established(&Rc::downgrade(inner), conn);
}

/// A blocking TCP client.
///
/// Wraps one session of an asynchronous engine `E` and exposes ordinary
/// connect/write/read semantics. Waiting is cooperative: blocking calls
/// run [`Engine::poll`] in a loop, during which any engine callback,
/// including disconnect, may fire and is tolerated.
pub struct SyncClient<E: Engine> {
    engine: E,
    inner: Rc<RefCell<Inner<E::Conn>>>,
}

impl<E: Engine> SyncClient<E> {
    /// Unbound client with the default transmit capacity.
    pub fn new(engine: E) -> Self {
        Self::with_tx_capacity(engine, DEFAULT_TX_CAPACITY)
    }

    /// Unbound client whose transmit queue holds up to `tx_capacity`
    /// pending bytes.
    pub fn with_tx_capacity(engine: E, tx_capacity: usize) -> Self {
        let mut tx = TxBuffer::new(tx_capacity);
        tx.reserve_capacity();
        Self {
            engine,
            inner: Rc::new(RefCell::new(Inner {
                conn: None,
                tx,
                rx: RxBuffer::new(),
            })),
        }
    }

    /// Client bound to an existing session, e.g. one the engine accepted.
    ///
    /// All handlers are attached immediately, so data the session delivers
    /// from now on lands in this client's receive queue.
    pub fn from_connection(
        engine: E,
        conn: SharedConnection<E::Conn>,
        tx_capacity: usize,
    ) -> Self {
        let mut tx = TxBuffer::new(tx_capacity);
        tx.reserve_capacity();
        let inner = Rc::new(RefCell::new(Inner {
            conn: Some(Rc::clone(&conn)),
            tx,
            rx: RxBuffer::new(),
        }));

        let weak = Rc::downgrade(&inner);
        {
            let mut c = conn.borrow_mut();
            attach_disconnect(&weak, &mut *c);
            attach_established(&weak, &mut *c);
        }

        Self { engine, inner }
    }

    /// Connect to `endpoint` and block until the attempt resolves.
    ///
    /// Refuses with [`Error::AlreadyConnected`] when a connection is live.
    /// Otherwise any stale session is discarded, a fresh one is opened and
    /// wired up, and the call waits on the event pump until the session is
    /// established or the engine gives up on it.
    pub fn connect(&mut self, endpoint: &Endpoint) -> Result<(), Error> {
        if self.connected() {
            return Err(Error::AlreadyConnected);
        }

        if let Some(stale) = self.inner.borrow_mut().conn.take() {
            detach_and_abort(&stale);
        }

        let conn = self.engine.open()?;

        let weak = Rc::downgrade(&self.inner);
        {
            let mut c = conn.borrow_mut();
            let w = weak.clone();
            c.on_connect(Some(Box::new(move |conn: &mut E::Conn| {
                if let Some(inner) = w.upgrade() {
                    established(&inner, conn);
                }
            })));
            attach_disconnect(&weak, &mut *c);
        }
        self.inner.borrow_mut().conn = Some(Rc::clone(&conn));

        if !conn.borrow_mut().connect(endpoint) {
            return Err(Error::ConnectFailed);
        }

        loop {
            let waiting = {
                let state = self.inner.borrow();
                match state.conn.as_ref() {
                    None => false,
                    Some(conn) => {
                        let c = conn.borrow();
                        !c.connected() && !c.disconnecting()
                    }
                }
            };
            if !waiting {
                break;
            }
            self.engine.poll();
        }

        if self.connected() {
            Ok(())
        } else {
            Err(Error::ConnectionRefused)
        }
    }

    /// Write `data`, blocking on transmit capacity, and return how many
    /// bytes were accepted.
    ///
    /// A return value smaller than `data.len()` is the short-write
    /// contract, not an error: either the connection dropped mid-wait or
    /// the engine stopped taking bytes. The caller retries the rest.
    pub fn write(&mut self, data: &[u8]) -> Result<usize, Error> {
        if !self.connected() {
            return Err(Error::NotConnected);
        }

        let mut written = 0;

        while written < data.len() {
            if self.inner.borrow().tx.free() == 0 {
                if !self.wait_send_capacity() {
                    // Connection lost while waiting; report what we took.
                    return Ok(written);
                }

                let mut guard = self.inner.borrow_mut();
                let state = &mut *guard;
                state.drain();
                if state.tx.free() == 0 {
                    break;
                }
            }

            written += self.inner.borrow_mut().tx.push(&data[written..]);
        }

        if self.send_ready() {
            self.inner.borrow_mut().drain();
        }

        Ok(written)
    }

    /// Write a single byte. See [`SyncClient::write`].
    pub fn write_byte(&mut self, byte: u8) -> Result<usize, Error> {
        self.write(&[byte])
    }

    /// Read up to `buf.len()` bytes from the receive queue.
    ///
    /// Returns `None` when no data is buffered, which is distinct from
    /// `Some(0)` (only possible for an empty `buf`). Consumed bytes are
    /// acknowledged to the engine while the connection is live, releasing
    /// receive credit; after a disconnect, buffered data remains readable.
    pub fn read(&mut self, buf: &mut [u8]) -> Option<usize> {
        let mut guard = self.inner.borrow_mut();
        let state = &mut *guard;

        if state.rx.available() == 0 {
            return None;
        }

        let n = state.rx.read(buf);
        if n > 0 {
            if let Some(conn) = state.conn.as_ref() {
                let mut c = conn.borrow_mut();
                if c.connected() {
                    c.ack(n);
                }
            }
        }

        Some(n)
    }

    /// Read a single byte, or `None` when no data is buffered.
    pub fn read_byte(&mut self) -> Option<u8> {
        let mut byte = [0u8; 1];
        match self.read(&mut byte) {
            Some(1) => Some(byte[0]),
            _ => None,
        }
    }

    /// Next unread byte without consuming it, or `None` when empty.
    pub fn peek(&self) -> Option<u8> {
        self.inner.borrow().rx.peek()
    }

    /// Number of received bytes not yet read.
    pub fn available(&self) -> usize {
        self.inner.borrow().rx.available()
    }

    /// Block until the transmit queue has drained into the engine.
    ///
    /// Returns whether the queue is empty afterwards; `false` means the
    /// connection was lost, or the engine would not take the rest.
    /// `max_wait_ms` is reserved; the wait ends when the queue drains or
    /// the connection drops.
    pub fn flush(&mut self, max_wait_ms: u32) -> bool {
        let _ = max_wait_ms;

        if !self.connected() {
            return false;
        }

        if self.inner.borrow().tx.pending() > 0 {
            if !self.wait_send_capacity() {
                return false;
            }
            self.inner.borrow_mut().drain();
        }

        self.inner.borrow().tx.pending() == 0
    }

    /// Request a forced close of the session.
    ///
    /// Best effort: unsent engine-side data is discarded and the request
    /// always reports success, with or without a live session.
    /// `max_wait_ms` is reserved.
    pub fn stop(&mut self, max_wait_ms: u32) -> bool {
        let _ = max_wait_ms;

        let conn = self.inner.borrow().conn.clone();
        if let Some(conn) = conn {
            conn.borrow_mut().close(true);
        }

        true
    }

    /// Whether the session is established.
    pub fn connected(&self) -> bool {
        let state = self.inner.borrow();
        match state.conn.as_ref() {
            Some(conn) => conn.borrow().connected(),
            None => false,
        }
    }

    /// TCP state of the session; [`TcpState::Closed`] when unbound.
    pub fn status(&self) -> TcpState {
        let state = self.inner.borrow();
        match state.conn.as_ref() {
            Some(conn) => conn.borrow().state(),
            None => TcpState::Closed,
        }
    }

    /// Set the session's receive-idle timeout in seconds.
    pub fn set_timeout(&mut self, seconds: u32) {
        let conn = self.inner.borrow().conn.clone();
        if let Some(conn) = conn {
            conn.borrow_mut().set_rx_timeout(seconds);
        }
    }

    /// Run the event pump until the engine advertises send capacity.
    ///
    /// Returns `false` when the connection went away instead. The session
    /// is re-checked from scratch on every iteration because a disconnect
    /// callback may fire at any point during a poll.
    fn wait_send_capacity(&mut self) -> bool {
        loop {
            {
                let state = self.inner.borrow();
                let Some(conn) = state.conn.as_ref() else {
                    return false;
                };
                let c = conn.borrow();
                if !c.connected() {
                    return false;
                }
                if c.can_send() {
                    return true;
                }
            }
            self.engine.poll();
        }
    }

    /// Whether a drain attempt is worthwhile right now.
    fn send_ready(&self) -> bool {
        let state = self.inner.borrow();
        match state.conn.as_ref() {
            Some(conn) => {
                let c = conn.borrow();
                c.connected() && c.can_send()
            }
            None => false,
        }
    }
}

impl<E: Engine + Clone> Clone for SyncClient<E> {
    /// Another owner of the same session and buffers. The session is torn
    /// down once, when the last clone is dropped.
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E: Engine> fmt::Debug for SyncClient<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("SyncClient");
        match self.inner.try_borrow() {
            Ok(state) => {
                s.field("bound", &state.conn.is_some())
                    .field("tx_pending", &state.tx.pending())
                    .field("rx_available", &state.rx.available());
            }
            Err(_) => {
                s.field("state", &"<in callback>");
            }
        }
        s.finish_non_exhaustive()
    }
}
