//! Streamer pump: reads the recorded event file and paces it out over a
//! single accepted TCP connection.

use crate::event_source::EventSource;
use crate::wire;
use socket2::{Domain, Socket, Type};
use std::io::{self, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::info;

/// Events accumulated per batch before a send (§4.4's `B`).
const BATCH_SIZE: usize = 1024;

/// Bind a listening socket with address-reuse enabled, accept exactly one
/// client, and close the listener. SO_REUSEADDR isn't set by `std`'s
/// `TcpListener::bind`, so the socket is built and bound through `socket2`
/// first and then handed back as a standard `TcpListener`.
fn listen_and_accept_one(addr: SocketAddr) -> io::Result<TcpStream> {
    let domain = if addr.is_ipv6() { Domain::IPV6 } else { Domain::IPV4 };
    let socket = Socket::new(domain, Type::STREAM, None)?;
    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.listen(1)?;
    let listener: TcpListener = socket.into();
    info!(%addr, "streamer listening");
    let (stream, peer) = listener.accept()?;
    info!(%peer, "streamer accepted client");
    Ok(stream)
    // `listener` is dropped here, closing it after the one accept.
}

/// Write `buf` in full, retrying on partial writes (`send_all` semantics).
fn send_all(stream: &mut TcpStream, buf: &[u8]) -> io::Result<()> {
    stream.write_all(buf)
}

/// Run the streamer role: bind, accept one client, drain the event file in
/// paced batches, close.
pub fn run(dbn_path: &Path, host: &str, port: u16, rate: u64) -> io::Result<()> {
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("bad host:port: {e}")))?;
    let mut stream = listen_and_accept_one(addr)?;

    let mut source = EventSource::open(dbn_path)?;
    let mut batch: Vec<u8> = Vec::with_capacity(BATCH_SIZE * wire::W);
    let mut batch_events = 0usize;
    let mut sent_events: u64 = 0;
    let start = Instant::now();

    loop {
        match source.next_event()? {
            Some(event) => {
                batch.extend_from_slice(&wire::encode(&event));
                batch_events += 1;
                if batch_events == BATCH_SIZE {
                    flush_batch(&mut stream, &mut batch, &mut batch_events, &mut sent_events, rate, start)?;
                }
            }
            None => break,
        }
    }
    if batch_events > 0 {
        flush_batch(&mut stream, &mut batch, &mut batch_events, &mut sent_events, rate, start)?;
    }

    info!(sent_events, "streamer finished, closing connection");
    Ok(())
}

fn flush_batch(
    stream: &mut TcpStream,
    batch: &mut Vec<u8>,
    batch_events: &mut usize,
    sent_events: &mut u64,
    rate: u64,
    start: Instant,
) -> io::Result<()> {
    send_all(stream, batch)?;
    batch.clear();
    *sent_events += *batch_events as u64;
    *batch_events = 0;

    if rate > 0 {
        let ideal = Duration::from_secs_f64(*sent_events as f64 / rate as f64);
        let elapsed = start.elapsed();
        if elapsed < ideal {
            std::thread::sleep(ideal - elapsed);
        }
    }
    Ok(())
}
