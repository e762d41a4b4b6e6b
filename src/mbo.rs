//! Market-by-order event model.
//!
//! An [`MboEvent`] is the unit of work the order book [`apply`](crate::orderbook::OrderBook::apply)s:
//! a single change to a single identified order. The shape here mirrors the
//! wire record in [`crate::wire`] field-for-field; the two are kept in sync by
//! hand since the wire codec owns byte order and width, not this module.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Sentinel price meaning "no price" — never a valid level key (invariant I5).
pub const UNDEF_PRICE: i64 = i64::MAX;

/// Which side of the book an order or level belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Side {
    Bid = 0,
    Ask = 1,
    None = 2,
}

/// What an [`MboEvent`] does to the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Action {
    Clear = 0,
    Add = 1,
    Cancel = 2,
    Modify = 3,
    Trade = 4,
    Fill = 5,
    None = 6,
}

impl Action {
    /// Decode a raw byte from the wire, rejecting anything not in the enum.
    pub fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Action::Clear),
            1 => Some(Action::Add),
            2 => Some(Action::Cancel),
            3 => Some(Action::Modify),
            4 => Some(Action::Trade),
            5 => Some(Action::Fill),
            6 => Some(Action::None),
            _ => None,
        }
    }
}

bitflags! {
    /// Per-event flag bits. Only [`MboFlags::TOB`] affects book semantics
    /// (§4.1's top-of-book Add path); the rest are carried for wire fidelity.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct MboFlags: u8 {
        /// This is the last event in a group sharing one `ts_event`.
        const LAST = 1 << 0;
        /// This event summarizes the top of its side rather than one resting order.
        const TOB = 1 << 1;
        /// This event was produced from a startup snapshot, not live flow.
        const SNAPSHOT = 1 << 2;
    }
}

impl MboFlags {
    #[inline]
    pub fn is_tob(self) -> bool {
        self.contains(MboFlags::TOB)
    }
}

/// A single market-by-order event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MboEvent {
    /// Timestamp the event was received locally, nanoseconds since epoch.
    pub ts_recv: i64,
    /// Timestamp the event occurred at the venue, nanoseconds since epoch.
    pub ts_event: i64,
    /// Identifies a resting order while it lives. Reused once cancelled.
    pub order_id: u64,
    pub side: Side,
    pub action: Action,
    /// Fixed-point price in ticks. [`UNDEF_PRICE`] means "no price".
    pub price: i64,
    pub size: u32,
    pub flags: MboFlags,
}

impl MboEvent {
    #[inline]
    pub fn has_price(&self) -> bool {
        self.price != UNDEF_PRICE
    }
}
