//! Engine pump: connects to the streamer, applies every received record to
//! a book, and reports per-event latency.

use crate::orderbook::{DepthSnapshot, OrderBook};
use crate::wire;
use serde::Serialize;
use std::io::{self, Read};
use std::net::TcpStream;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Latency samples are pre-reserved to this many slots to avoid reallocating
/// the vector during the hot loop (§5's resource note); growing past it is
/// permitted, just not expected in a normal run.
const LATENCY_VEC_RESERVE: usize = 1_000_000;

#[derive(Serialize)]
struct MetricLine {
    metric: &'static str,
    value: f64,
}

fn emit_metric(metric: &'static str, value: f64) {
    if let Ok(line) = serde_json::to_string(&MetricLine { metric, value }) {
        eprintln!("{line}");
    }
}

/// How the read loop ended: a clean record-boundary EOF, or a short read in
/// the middle of a record (§7 band 3 — counted as end-of-stream for metrics
/// and snapshot purposes, but the caller must still exit 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    CleanEof,
    Truncated,
}

/// Read exactly `wire::W` bytes, or report which kind of end-of-stream was hit.
fn read_one_record(stream: &mut TcpStream) -> io::Result<Option<[u8; wire::W]>> {
    let mut buf = [0u8; wire::W];
    let mut filled = 0;
    while filled < wire::W {
        let n = stream.read(&mut buf[filled..])?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "stream truncated mid-record",
            ));
        }
        filled += n;
    }
    Ok(Some(buf))
}

/// Run the engine role: connect, apply every record, report percentiles and
/// a final snapshot. Returns how the stream ended; the caller maps
/// [`Termination::Truncated`] to exit code 1 per §7.
pub fn run(host: &str, port: u16, out_path: &Path, levels: usize) -> io::Result<Termination> {
    let mut stream = TcpStream::connect((host, port))?;
    info!(host, port, "engine connected");

    let mut book = OrderBook::new();
    let mut latencies_us: Vec<f64> = Vec::with_capacity(LATENCY_VEC_RESERVE);
    let mut errors: u64 = 0;
    let wall_start = Instant::now();

    let termination = loop {
        let record = match read_one_record(&mut stream) {
            Ok(Some(record)) => record,
            Ok(None) => break Termination::CleanEof,
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break Termination::Truncated,
            Err(e) => return Err(e),
        };
        let event = match wire::decode(&record) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "dropping malformed wire record");
                errors += 1;
                continue;
            }
        };

        let t0 = Instant::now();
        let result = book.apply(&event);
        let t1 = Instant::now();
        latencies_us.push(t1.duration_since(t0).as_secs_f64() * 1_000_000.0);
        if result.is_err() {
            errors += 1;
        }
    };

    let wall_time = wall_start.elapsed();
    report(&latencies_us, wall_time, errors);
    DepthSnapshot::build(&book, levels).write_to(out_path)?;

    info!(?termination, errors, "engine finished");
    Ok(termination)
}

fn nearest_rank(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    let idx = ((n as f64) * p).floor() as usize;
    sorted[idx.min(n - 1)]
}

fn report(latencies_us: &[f64], wall_time: Duration, errors: u64) {
    if latencies_us.is_empty() {
        info!(errors, "engine saw no records");
        return;
    }
    let mut sorted = latencies_us.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("latencies are never NaN"));

    let p95 = nearest_rank(&sorted, 0.95);
    let p99 = nearest_rank(&sorted, 0.99);
    let throughput = sorted.len() as f64 / wall_time.as_secs_f64().max(f64::EPSILON);

    emit_metric("latency_p95_us", p95);
    emit_metric("latency_p99_us", p99);
    emit_metric("throughput_events_per_sec", throughput);
}
