//! # synctcp - Blocking TCP for asynchronous embedded network engines
//!
//! A blocking-style TCP client for embedded systems whose network stack only
//! exposes an asynchronous, callback-driven interface. Application code gets
//! ordinary `connect`/`write`/`read` semantics; underneath, the client
//! buffers in both directions, drains the transmit buffer as the engine
//! advertises capacity, and implements every blocking operation as a
//! cooperative loop over the platform's event pump.
//!
//! ## Features
//!
//! - **Blocking API over callbacks**: `connect`, `write`, `read`, `flush`
//!   and `stop` on top of connect/data/ack/disconnect events
//! - **Bounded transmit buffering**: backpressure surfaces as short writes,
//!   never as lost bytes or reordering
//! - **Receive-side flow control**: unread data withholds engine credit;
//!   credit is released only as the application consumes bytes
//! - **Shared ownership**: clients can be cloned, queued and returned by
//!   value; the underlying session is torn down exactly once, by the last
//!   owner
//! - **Engine-agnostic**: any TCP engine that can satisfy the
//!   [`transport::Connection`] and [`transport::Engine`] traits will do
//!
//! ## Usage
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! synctcp = "0.1.0"
//! ```
//!
//! ### Writing a request and reading the reply
//!
//! ```rust,no_run
//! use synctcp::client::SyncClient;
//! use synctcp::transport::Endpoint;
//! # use synctcp::transport::{Connection, Engine, SharedConnection, TcpState};
//! # use synctcp::transport::{ConnectCallback, DisconnectCallback, DataCallback, AckCallback, TimeoutCallback};
//! # use std::rc::Rc;
//! # use std::cell::RefCell;
//! # #[derive(Default)]
//! # struct NullConn;
//! # impl Connection for NullConn {
//! #     fn connect(&mut self, _endpoint: &Endpoint) -> bool { true }
//! #     fn send(&mut self, data: &[u8]) -> usize { data.len() }
//! #     fn space(&self) -> usize { 1460 }
//! #     fn can_send(&self) -> bool { true }
//! #     fn ack(&mut self, _len: usize) {}
//! #     fn ack_later(&mut self) {}
//! #     fn close(&mut self, _force: bool) {}
//! #     fn abort(&mut self) {}
//! #     fn connected(&self) -> bool { true }
//! #     fn disconnecting(&self) -> bool { false }
//! #     fn state(&self) -> TcpState { TcpState::Established }
//! #     fn set_rx_timeout(&mut self, _seconds: u32) {}
//! #     fn on_connect(&mut self, _callback: Option<ConnectCallback<Self>>) {}
//! #     fn on_disconnect(&mut self, _callback: Option<DisconnectCallback>) {}
//! #     fn on_data(&mut self, _callback: Option<DataCallback<Self>>) {}
//! #     fn on_ack(&mut self, _callback: Option<AckCallback<Self>>) {}
//! #     fn on_timeout(&mut self, _callback: Option<TimeoutCallback<Self>>) {}
//! # }
//! # #[derive(Clone)]
//! # struct NullEngine;
//! # impl Engine for NullEngine {
//! #     type Conn = NullConn;
//! #     fn open(&mut self) -> Result<SharedConnection<NullConn>, synctcp::error::Error> {
//! #         Ok(Rc::new(RefCell::new(NullConn)))
//! #     }
//! #     fn poll(&mut self) {}
//! # }
//! # let engine = NullEngine;
//!
//! let mut client = SyncClient::new(engine);
//! let endpoint = Endpoint::host("example.com", 80)?;
//!
//! client.connect(&endpoint)?;
//! client.write(b"GET / HTTP/1.0\r\n\r\n")?;
//! client.flush(0);
//!
//! let mut response = [0u8; 512];
//! while client.connected() || client.available() > 0 {
//!     if let Some(n) = client.read(&mut response) {
//!         let _reply = &response[..n];
//!     }
//! }
//! client.stop(0);
//! # Ok::<(), synctcp::error::Error>(())
//! ```
//!
//! ## Concurrency model
//!
//! The crate assumes a single logical thread of control: the engine delivers
//! events from a processing step ([`transport::Engine::poll`]) that the
//! application, or a blocking call inside this crate, invokes explicitly.
//! There are no locks and no worker threads. Any engine callback, including
//! disconnect, may run while a blocking call is waiting, so every wait loop
//! re-checks connection liveness on each iteration.
//!
//! ## Platform Support
//!
//! This library is designed to work on:
//! - Embedded microcontrollers (ARM Cortex-M, RISC-V, etc.) with an allocator
//! - Linux-based devices (Raspberry Pi, etc.)
//! - Any platform supporting Rust's `core` + `alloc` libraries
//!
//! ## Optional Features
//!
//! - `std`: Enable standard library support (default: disabled)
//! - `defmt`: Enable defmt formatting support for embedded debugging

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

extern crate alloc;

/// Common error type for client operations.
pub mod error;

/// Traits and types the asynchronous engine must provide.
pub mod transport;

pub(crate) mod buffer;

/// The blocking client built on top of an asynchronous engine.
pub mod client;
