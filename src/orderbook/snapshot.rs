//! Depth snapshot: a read-only top-of-book + depth-N projection of the book.

use super::book::OrderBook;
use serde::Serialize;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use tracing::info;

/// One row of `levels`: the `k`-th bid and/or ask, whichever side still has a
/// level at that depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DepthLevel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bid_price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bid_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ask_price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ask_size: Option<u64>,
}

/// The full snapshot document written to the output path (§6's "Snapshot
/// file" shape).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepthSnapshot {
    pub best_bid: Option<i64>,
    pub best_bid_size: Option<u64>,
    pub best_ask: Option<i64>,
    pub best_ask_size: Option<u64>,
    pub bid_levels: usize,
    pub ask_levels: usize,
    pub levels: Vec<DepthLevel>,
}

impl DepthSnapshot {
    /// Build a depth-`n` snapshot of `book`. Does not mutate the book; in the
    /// single-threaded execution model there is nothing else to coordinate
    /// with, so this is a plain read.
    pub fn build(book: &OrderBook, n: usize) -> Self {
        let best_bid = book.best_bid();
        let best_ask = book.best_ask();
        let (bid_levels, ask_levels) = book.level_counts();

        let mut levels = Vec::with_capacity(n);
        for k in 0..n {
            let bid = book.bid_level(k);
            let ask = book.ask_level(k);
            if bid.is_none() && ask.is_none() {
                break;
            }
            levels.push(DepthLevel {
                bid_price: bid.map(|l| l.price),
                bid_size: bid.map(|l| l.aggregate_size),
                ask_price: ask.map(|l| l.price),
                ask_size: ask.map(|l| l.aggregate_size),
            });
        }

        DepthSnapshot {
            best_bid: best_bid.map(|l| l.price),
            best_bid_size: best_bid.map(|l| l.aggregate_size),
            best_ask: best_ask.map(|l| l.price),
            best_ask_size: best_ask.map(|l| l.aggregate_size),
            bid_levels,
            ask_levels,
            levels,
        }
    }

    /// Pretty-print with a 2-space indent and a trailing newline, matching
    /// the snapshot file format.
    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        let mut json = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        json.push('\n');
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        info!(path = %path.display(), "wrote snapshot");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mbo::{Action, MboEvent, MboFlags, Side};

    fn ev(action: Action, side: Side, id: u64, price: i64, size: u32) -> MboEvent {
        MboEvent {
            ts_recv: 0,
            ts_event: 0,
            order_id: id,
            side,
            action,
            price,
            size,
            flags: MboFlags::empty(),
        }
    }

    #[test]
    fn empty_book_has_no_levels() {
        let book = OrderBook::new();
        let snap = DepthSnapshot::build(&book, 5);
        assert_eq!(snap.best_bid, None);
        assert_eq!(snap.best_ask, None);
        assert!(snap.levels.is_empty());
    }

    #[test]
    fn snapshot_pairs_levels_and_stops_when_both_sides_exhausted() {
        let mut book = OrderBook::new();
        book.apply(&ev(Action::Add, Side::Bid, 1, 100, 10)).unwrap();
        book.apply(&ev(Action::Add, Side::Bid, 2, 99, 5)).unwrap();
        book.apply(&ev(Action::Add, Side::Ask, 3, 101, 7)).unwrap();

        let snap = DepthSnapshot::build(&book, 5);
        assert_eq!(snap.best_bid, Some(100));
        assert_eq!(snap.best_bid_size, Some(10));
        assert_eq!(snap.best_ask, Some(101));
        assert_eq!(snap.bid_levels, 2);
        assert_eq!(snap.ask_levels, 1);
        assert_eq!(snap.levels.len(), 2);
        assert_eq!(snap.levels[0].bid_price, Some(100));
        assert_eq!(snap.levels[0].ask_price, Some(101));
        assert_eq!(snap.levels[1].bid_price, Some(99));
        assert_eq!(snap.levels[1].ask_price, None);
    }

    #[test]
    fn serializes_to_pretty_json() {
        let book = OrderBook::new();
        let snap = DepthSnapshot::build(&book, 5);
        let json = serde_json::to_string_pretty(&snap).unwrap();
        assert!(json.contains("\"best_bid\": null"));
        assert!(json.contains("\"levels\": []"));
    }
}
