//! Replay role: drain the recorded event file straight into a fresh book,
//! no sockets, no latency tracking.

use crate::event_source::EventSource;
use crate::orderbook::{DepthSnapshot, OrderBook};
use std::io;
use std::path::Path;
use tracing::{info, warn};

/// Default depth for the replay role's single end-of-stream snapshot.
pub const REPLAY_SNAPSHOT_DEPTH: usize = 10;

/// Apply every event from `dbn_path` to a fresh book and write one depth-10
/// snapshot to `out_path` at end-of-stream.
pub fn run(dbn_path: &Path, out_path: &Path) -> io::Result<()> {
    let mut source = EventSource::open(dbn_path)?;
    let mut book = OrderBook::new();
    let mut applied = 0u64;
    let mut errors = 0u64;

    while let Some(event) = source.next_event()? {
        applied += 1;
        if book.apply(&event).is_err() {
            errors += 1;
        }
    }

    info!(applied, errors, "replay complete");
    DepthSnapshot::build(&book, REPLAY_SNAPSHOT_DEPTH).write_to(out_path)?;
    if errors > 0 {
        warn!(errors, "replay encountered recoverable apply errors");
    }
    Ok(())
}
