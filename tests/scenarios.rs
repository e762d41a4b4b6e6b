//! The named end-to-end scenarios from spec §8, driven through the public
//! crate API against a real TCP loopback for the streamer↔engine case.

use mbo_book::event_source::{EventFileWriter, EventSource};
use mbo_book::mbo::{Action, MboEvent, MboFlags, Side};
use mbo_book::orderbook::OrderBook;
use std::io;
use std::net::TcpStream;
use std::time::{Duration, Instant};

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
fn scenario_1_add_then_drain() {
    let mut book = OrderBook::new();
    book.apply(&ev(Action::Add, Side::Bid, 1, 100, 10)).unwrap();
    book.apply(&ev(Action::Add, Side::Bid, 2, 100, 5)).unwrap();
    book.apply(&ev(Action::Cancel, Side::Bid, 1, 100, 10)).unwrap();
    assert_eq!(book.queue_position(2).unwrap(), 0);
    book.apply(&ev(Action::Cancel, Side::Bid, 2, 100, 5)).unwrap();
    assert!(book.best_bid().is_none());
}

#[test]
fn scenario_2_priority_after_resize_up() {
    let mut book = OrderBook::new();
    book.apply(&ev(Action::Add, Side::Bid, 1, 100, 5)).unwrap();
    book.apply(&ev(Action::Add, Side::Bid, 2, 100, 5)).unwrap();
    book.apply(&ev(Action::Modify, Side::Bid, 1, 100, 10)).unwrap();
    assert_eq!(book.queue_position(2).unwrap(), 0);
    assert_eq!(book.queue_position(1).unwrap(), 5);
}

#[test]
fn scenario_3_modify_unknown_becomes_add() {
    let mut book = OrderBook::new();
    book.apply(&ev(Action::Modify, Side::Bid, 42, 99, 3)).unwrap();
    let level = book.best_bid().unwrap();
    assert_eq!(level.price, 99);
    assert_eq!(level.aggregate_size, 3);
}

#[test]
fn scenario_4_cancel_over_fails_cleanly() {
    let mut book = OrderBook::new();
    book.apply(&ev(Action::Add, Side::Ask, 1, 200, 5)).unwrap();
    let before = book.clone();
    assert!(book.apply(&ev(Action::Cancel, Side::Ask, 1, 200, 7)).is_err());
    assert_eq!(book, before);
    let level = book.best_ask().unwrap();
    assert_eq!(level.price, 200);
    assert_eq!(level.aggregate_size, 5);
}

#[test]
fn scenario_5_top_of_book_add_replaces_side() {
    let mut book = OrderBook::new();
    book.apply(&ev(Action::Add, Side::Bid, 1, 100, 1)).unwrap();
    book.apply(&ev(Action::Add, Side::Bid, 2, 99, 1)).unwrap();
    book.apply(&ev(Action::Add, Side::Bid, 3, 98, 1)).unwrap();

    let tob = MboEvent {
        ts_recv: 0,
        ts_event: 0,
        order_id: 0,
        side: Side::Bid,
        action: Action::Add,
        price: 101,
        size: 1,
        flags: MboFlags::TOB,
    };
    book.apply(&tob).unwrap();

    assert_eq!(book.level_counts().0, 1);
    let level = book.best_bid().unwrap();
    assert_eq!(level.price, 101);
    assert_eq!(level.aggregate_size, 1);
    assert!(book.queue_position(0).is_err());
}

/// Builds a 10,000-event canned sequence exercising Add/Cancel/Modify across
/// a handful of ids and prices on both sides.
fn canned_sequence() -> Vec<MboEvent> {
    let mut events = Vec::with_capacity(10_000);
    let mut next_id = 1u64;
    for i in 0..2_500u64 {
        let bid_id = next_id;
        next_id += 1;
        let ask_id = next_id;
        next_id += 1;

        let bid_price = 10_000 - (i % 25) as i64;
        let ask_price = 10_100 + (i % 25) as i64;

        events.push(ev(Action::Add, Side::Bid, bid_id, bid_price, 10 + (i % 7) as u32));
        events.push(ev(Action::Add, Side::Ask, ask_id, ask_price, 10 + (i % 5) as u32));

        if i % 3 == 0 {
            events.push(ev(Action::Modify, Side::Bid, bid_id, bid_price, 20 + (i % 7) as u32));
        } else {
            events.push(ev(Action::Cancel, Side::Bid, bid_id, bid_price, 5));
        }
        events.push(ev(Action::Cancel, Side::Ask, ask_id, ask_price, 3));
    }
    events
}

/// (Scenario 6) Streamer↔engine replay parity: feeding a canned sequence
/// through the TCP path with `--rate=0` must produce the same final
/// snapshot as applying the same sequence directly via the replay role.
#[test]
fn scenario_6_streamer_engine_matches_replay() {
    let dir = tempfile::tempdir().unwrap();
    let dbn_path = dir.path().join("events.bin");
    {
        let mut writer = EventFileWriter::create(&dbn_path).unwrap();
        for event in canned_sequence() {
            writer.write_event(&event).unwrap();
        }
        writer.flush().unwrap();
    }

    let replay_out = dir.path().join("replay.json");
    mbo_book::replay::run(&dbn_path, &replay_out).unwrap();

    let port = 19_411u16;
    let streamer_dbn = dbn_path.clone();
    let streamer_thread = std::thread::spawn(move || {
        mbo_book::streamer::run(&streamer_dbn, "127.0.0.1", port, 0)
    });

    let engine_out = dir.path().join("engine.json");
    let deadline = Instant::now() + Duration::from_secs(5);
    let termination = loop {
        match mbo_book::engine::run("127.0.0.1", port, &engine_out, 10) {
            Ok(termination) => break termination,
            Err(e) if e.kind() == io::ErrorKind::ConnectionRefused && Instant::now() < deadline => {
                std::thread::sleep(Duration::from_millis(20));
            }
            Err(e) => panic!("engine run failed: {e}"),
        }
    };
    assert_eq!(termination, mbo_book::engine::Termination::CleanEof);

    streamer_thread.join().unwrap().unwrap();

    let replay_json = std::fs::read_to_string(&replay_out).unwrap();
    let engine_json = std::fs::read_to_string(&engine_out).unwrap();
    assert_eq!(replay_json, engine_json);
}

/// Confirms the wire link carries every record: connecting and reading
/// nothing when the streamer has nothing to send still closes cleanly.
#[test]
fn empty_event_file_yields_empty_stream() {
    let dir = tempfile::tempdir().unwrap();
    let dbn_path = dir.path().join("empty.bin");
    EventFileWriter::create(&dbn_path).unwrap().flush().unwrap();
    assert!(EventSource::open(&dbn_path).unwrap().next_event().unwrap().is_none());

    let port = 19_412u16;
    let streamer_dbn = dbn_path.clone();
    let streamer_thread = std::thread::spawn(move || {
        mbo_book::streamer::run(&streamer_dbn, "127.0.0.1", port, 0)
    });

    let deadline = Instant::now() + Duration::from_secs(5);
    let stream = loop {
        match TcpStream::connect(("127.0.0.1", port)) {
            Ok(stream) => break stream,
            Err(e) if e.kind() == io::ErrorKind::ConnectionRefused && Instant::now() < deadline => {
                std::thread::sleep(Duration::from_millis(20));
            }
            Err(e) => panic!("connect failed: {e}"),
        }
    };
    drop(stream);
    streamer_thread.join().unwrap().unwrap();
}
