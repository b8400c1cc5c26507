//! Common error type for client operations

/// A common error type for blocking client operations.
///
/// This enum covers the connection-lifecycle failures a caller can observe.
/// Backpressure and "no data yet" are not errors: `write` reports
/// backpressure through its short-write return value, and `read`/`peek`
/// report an empty receive buffer as `None`.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// An operation was attempted without a live connection.
    NotConnected,
    /// `connect` was called while a connection is already established.
    AlreadyConnected,
    /// The engine could not allocate a new session.
    NoResources,
    /// The engine rejected the connection attempt outright.
    ConnectFailed,
    /// The connection attempt ended without reaching the established state.
    ConnectionRefused,
    /// An invalid or oversized address was provided.
    InvalidAddress,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::NotConnected => defmt::write!(f, "NotConnected"),
            Error::AlreadyConnected => defmt::write!(f, "AlreadyConnected"),
            Error::NoResources => defmt::write!(f, "NoResources"),
            Error::ConnectFailed => defmt::write!(f, "ConnectFailed"),
            Error::ConnectionRefused => defmt::write!(f, "ConnectionRefused"),
            Error::InvalidAddress => defmt::write!(f, "InvalidAddress"),
        }
    }
}
