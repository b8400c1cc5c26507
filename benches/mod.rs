use std::cell::RefCell;
use std::hint::black_box;
use std::rc::Rc;

use criterion::{Criterion, criterion_group, criterion_main};
use synctcp::client::SyncClient;
use synctcp::error::Error;
use synctcp::transport::{
    AckCallback, ConnectCallback, Connection, DataCallback, DisconnectCallback, Endpoint, Engine,
    SharedConnection, TcpState, TimeoutCallback,
};

/// An engine that always has window and swallows every byte, so the
/// benches measure the client's buffering, not a simulated network.
struct BenchConn {
    swallowed: usize,
    on_connect: Option<ConnectCallback<BenchConn>>,
    on_disconnect: Option<DisconnectCallback>,
    on_data: Option<DataCallback<BenchConn>>,
    on_ack: Option<AckCallback<BenchConn>>,
    on_timeout: Option<TimeoutCallback<BenchConn>>,
}

impl BenchConn {
    fn new() -> Self {
        Self {
            swallowed: 0,
            on_connect: None,
            on_disconnect: None,
            on_data: None,
            on_ack: None,
            on_timeout: None,
        }
    }
}

impl Connection for BenchConn {
    fn connect(&mut self, _endpoint: &Endpoint) -> bool {
        true
    }

    fn send(&mut self, data: &[u8]) -> usize {
        self.swallowed = self.swallowed.wrapping_add(data.len());
        data.len()
    }

    fn space(&self) -> usize {
        usize::MAX
    }

    fn can_send(&self) -> bool {
        true
    }

    fn ack(&mut self, _len: usize) {}

    fn ack_later(&mut self) {}

    fn close(&mut self, _force: bool) {}

    fn abort(&mut self) {}

    fn connected(&self) -> bool {
        true
    }

    fn disconnecting(&self) -> bool {
        false
    }

    fn state(&self) -> TcpState {
        TcpState::Established
    }

    fn set_rx_timeout(&mut self, _seconds: u32) {}

    fn on_connect(&mut self, callback: Option<ConnectCallback<Self>>) {
        self.on_connect = callback;
    }

    fn on_disconnect(&mut self, callback: Option<DisconnectCallback>) {
        self.on_disconnect = callback;
    }

    fn on_data(&mut self, callback: Option<DataCallback<Self>>) {
        self.on_data = callback;
    }

    fn on_ack(&mut self, callback: Option<AckCallback<Self>>) {
        self.on_ack = callback;
    }

    fn on_timeout(&mut self, callback: Option<TimeoutCallback<Self>>) {
        self.on_timeout = callback;
    }
}

#[derive(Clone)]
struct BenchEngine;

impl Engine for BenchEngine {
    type Conn = BenchConn;

    fn open(&mut self) -> Result<SharedConnection<BenchConn>, Error> {
        Ok(Rc::new(RefCell::new(BenchConn::new())))
    }

    fn poll(&mut self) {}
}

fn bound_client(tx_capacity: usize) -> (SharedConnection<BenchConn>, SyncClient<BenchEngine>) {
    let conn = Rc::new(RefCell::new(BenchConn::new()));
    let client = SyncClient::from_connection(BenchEngine, Rc::clone(&conn), tx_capacity);
    (conn, client)
}

fn deliver(conn: &SharedConnection<BenchConn>, data: &[u8]) {
    let cb = conn.borrow_mut().on_data.take();
    if let Some(mut cb) = cb {
        {
            let mut c = conn.borrow_mut();
            cb(&mut *c, data);
        }
        conn.borrow_mut().on_data = Some(cb);
    }
}

fn bench_write_drain(c: &mut Criterion) {
    let (conn, mut client) = bound_client(4096);
    let payload = [0xA5u8; 1024];

    c.bench_function("write_drain_1k", |b| {
        b.iter(|| client.write(black_box(&payload)).unwrap())
    });

    black_box(conn.borrow().swallowed);
}

fn bench_deliver_read(c: &mut Criterion) {
    let (conn, mut client) = bound_client(4096);
    let payload = [0x5Au8; 1024];
    let mut out = [0u8; 1024];

    c.bench_function("deliver_read_1k", |b| {
        b.iter(|| {
            deliver(&conn, black_box(&payload));
            while client.read(&mut out).is_some() {}
        })
    });
}

criterion_group!(benches, bench_write_drain, bench_deliver_read);
criterion_main!(benches);
