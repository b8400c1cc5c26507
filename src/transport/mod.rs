//! Engine-facing traits for asynchronous TCP transports.
//!
//! The client in this crate does not talk to the network itself. It sits on
//! top of an asynchronous TCP engine (lwIP-style stacks, offload modems,
//! simulated transports) that establishes connections, retransmits, and
//! delivers completion events through callbacks. This module defines the
//! two seams such an engine must satisfy:
//!
//! - [`Connection`]: one TCP session inside the engine, with non-blocking
//!   send/close/abort operations, window queries, and five registerable
//!   callback slots.
//! - [`Engine`]: the handle the application already owns; it allocates
//!   sessions and runs one round of pending network and timer events on
//!   demand.
//!
//! Callbacks are bound closures rather than function pointers with opaque
//! context. A dispatched callback receives the session as `&mut Self`, so a
//! handler can acknowledge, close or abort the session without going back
//! through a shared handle it might already be holding.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::RefCell;
use heapless::String;

use crate::error::Error;

/// Maximum length of a hostname stored in an [`Endpoint`].
pub const MAX_HOST_LEN: usize = 64;

/// Shared handle to an engine-owned session.
///
/// Both the client and the engine keep a strong reference to the session
/// while it is alive; single-core cooperative scheduling makes the
/// non-atomic `Rc` sufficient.
pub type SharedConnection<C> = Rc<RefCell<C>>;

/// Invoked when a connection attempt completes successfully.
pub type ConnectCallback<C> = Box<dyn FnMut(&mut C)>;

/// Invoked when the session leaves the established state for any reason.
///
/// The engine destroys the session object once this dispatch returns; the
/// handler must drop every reference it keeps to the session.
pub type DisconnectCallback = Box<dyn FnMut()>;

/// Invoked with a slice of bytes the engine received in order.
pub type DataCallback<C> = Box<dyn FnMut(&mut C, &[u8])>;

/// Invoked when the peer acknowledged `len` sent bytes after `elapsed_ms`.
pub type AckCallback<C> = Box<dyn FnMut(&mut C, usize, u32)>;

/// Invoked when the receive-idle timeout expired after `elapsed_ms`.
pub type TimeoutCallback<C> = Box<dyn FnMut(&mut C, u32)>;

/// TCP session state as reported by the engine.
///
/// `Closed` doubles as the neutral answer for a client with no session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TcpState {
    /// No session, or the session has fully closed.
    Closed,
    /// Passive open, waiting for a peer.
    Listen,
    /// Active open sent, waiting for the peer's answer.
    SynSent,
    /// Passive open answered, handshake in progress.
    SynRcvd,
    /// Connection established, data may flow.
    Established,
    /// Local close sent, waiting for acknowledgment.
    FinWait1,
    /// Local close acknowledged, waiting for the peer's close.
    FinWait2,
    /// Peer closed, local side still open.
    CloseWait,
    /// Both sides closing simultaneously.
    Closing,
    /// Final acknowledgment outstanding.
    LastAck,
    /// Waiting out stray segments before releasing the port.
    TimeWait,
}

/// The remote side of a connection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Remote {
    /// A hostname the engine resolves itself.
    Host(String<MAX_HOST_LEN>),
    /// A literal IPv4 address.
    Ip([u8; 4]),
}

/// Where and how to connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Hostname or address of the peer.
    pub remote: Remote,
    /// TCP port of the peer.
    pub port: u16,
    /// Ask the engine for a TLS-protected session. Passed through to the
    /// engine untouched; engines without TLS support refuse the attempt.
    pub secure: bool,
}

impl Endpoint {
    /// Endpoint for a hostname the engine will resolve.
    ///
    /// Fails with [`Error::InvalidAddress`] if `host` exceeds
    /// [`MAX_HOST_LEN`] bytes.
    pub fn host(host: &str, port: u16) -> Result<Self, Error> {
        let host = String::try_from(host).map_err(|_| Error::InvalidAddress)?;
        Ok(Self {
            remote: Remote::Host(host),
            port,
            secure: false,
        })
    }

    /// Endpoint for a literal IPv4 address.
    pub fn ip(octets: [u8; 4], port: u16) -> Self {
        Self {
            remote: Remote::Ip(octets),
            port,
            secure: false,
        }
    }

    /// Request a TLS-protected session from the engine.
    pub fn secure(mut self) -> Self {
        self.secure = true;
        self
    }
}

/// One TCP session owned by the asynchronous engine.
///
/// All operations are non-blocking; completion is reported through the
/// callback slots. Implementations dispatch callbacks only from
/// [`Engine::poll`], never from inside another method of this trait.
/// Sessions are owned, `'static` objects: the boxed handlers stored in
/// their slots outlive any borrow of the client that installed them.
pub trait Connection: 'static {
    /// Begin a connection attempt to `endpoint`.
    ///
    /// Returns whether the attempt was initiated. Completion is reported
    /// through the `on_connect` callback, failure through `on_disconnect`.
    fn connect(&mut self, endpoint: &Endpoint) -> bool;

    /// Queue bytes for transmission, returning how many were accepted.
    ///
    /// The engine must copy the accepted bytes before returning; the caller
    /// reuses and compacts the slice's backing storage. Accepting fewer
    /// bytes than offered signals engine-side backpressure.
    fn send(&mut self, data: &[u8]) -> usize;

    /// Bytes of send window the engine currently advertises.
    fn space(&self) -> usize;

    /// Whether [`Connection::send`] would currently accept any bytes.
    fn can_send(&self) -> bool;

    /// Release `len` bytes of receive flow-control credit.
    fn ack(&mut self, len: usize);

    /// Defer the engine's own acknowledgment of delivered data.
    ///
    /// After this call the engine withholds receive credit until the bytes
    /// are explicitly acknowledged with [`Connection::ack`].
    fn ack_later(&mut self);

    /// Close the session; `force` discards unsent engine-side data.
    fn close(&mut self, force: bool);

    /// Tear the session down immediately (RST), discarding all state.
    fn abort(&mut self);

    /// Whether the session is established.
    fn connected(&self) -> bool;

    /// Whether the session is in the middle of going down.
    fn disconnecting(&self) -> bool;

    /// Current TCP state of the session.
    fn state(&self) -> TcpState;

    /// Set the receive-idle timeout in seconds; `0` disables it.
    fn set_rx_timeout(&mut self, seconds: u32);

    /// Install or clear the connect-completion callback.
    fn on_connect(&mut self, callback: Option<ConnectCallback<Self>>)
    where
        Self: Sized;

    /// Install or clear the disconnect callback.
    fn on_disconnect(&mut self, callback: Option<DisconnectCallback>);

    /// Install or clear the data-arrival callback.
    fn on_data(&mut self, callback: Option<DataCallback<Self>>)
    where
        Self: Sized;

    /// Install or clear the send-acknowledged callback.
    fn on_ack(&mut self, callback: Option<AckCallback<Self>>)
    where
        Self: Sized;

    /// Install or clear the receive-idle timeout callback.
    fn on_timeout(&mut self, callback: Option<TimeoutCallback<Self>>)
    where
        Self: Sized;
}

/// Handle to the asynchronous engine and the platform's event processing.
///
/// Blocking operations in this crate wait by calling [`Engine::poll`] in a
/// loop; the handle is cloned into every client copy, so implementations
/// are expected to be cheap shared references to the actual engine.
pub trait Engine {
    /// The engine's session type.
    type Conn: Connection;

    /// Allocate a fresh, unconnected session.
    fn open(&mut self) -> Result<SharedConnection<Self::Conn>, Error>;

    /// Process pending network and timer events once, dispatching callbacks.
    ///
    /// Implementations must take a callback out of its slot for the duration
    /// of a dispatch (handlers may re-install slots on the session they are
    /// handed) and must keep their own strong [`SharedConnection`] reference
    /// alive until the dispatch returns, since a disconnect handler drops
    /// the client's reference as part of running.
    fn poll(&mut self);
}
