//! # MBO Order Book Engine
//!
//! A limit order book driven by market-by-order (MBO) events, plus the
//! two-process pipeline that feeds it over a TCP link:
//!
//! - [`mbo`] — the MBO event model (`MboEvent`, `Side`, `Action`, `MboFlags`).
//! - [`orderbook`] — the `apply` state machine, price levels, and depth
//!   snapshots.
//! - [`wire`] — the fixed-width binary codec shared by the recorded-event
//!   file and the TCP link.
//! - [`event_source`] — sequential reader (and test-fixture writer) for a
//!   recorded event file.
//! - [`streamer`] — the streamer pump: accepts one client, paces recorded
//!   events out over TCP.
//! - [`engine`] — the engine pump: consumes the TCP link, applies every
//!   record, reports latency percentiles and a final snapshot.
//! - [`replay`] — the replay role: drains a recorded file straight into a
//!   fresh book, no sockets involved.
//! - [`cli`] — the `--mode={replay|streamer|engine}` command-line surface.
//!
//! `main.rs` wires these into the `mbo-book` binary's three runtime roles.

pub mod cli;
pub mod engine;
pub mod event_source;
pub mod mbo;
pub mod orderbook;
pub mod prelude;
pub mod replay;
pub mod streamer;
pub mod wire;
