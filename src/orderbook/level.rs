//! A single resting order and the price level that queues it.

use crate::mbo::{MboEvent, Side};

/// One resting order, holding just enough of its originating event to answer
/// queries and to be mutated in place by a same-price, non-increasing-size
/// Modify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestingOrder {
    pub order_id: u64,
    pub side: Side,
    pub price: i64,
    pub size: u32,
    /// Set for the single summary order a top-of-book Add installs. Such
    /// orders sit in a level like any other but are never in the order
    /// index and are excluded from [`Level::order_count`] (§4.2).
    pub is_tob: bool,
}

impl RestingOrder {
    pub fn from_event(event: &MboEvent) -> Self {
        RestingOrder {
            order_id: event.order_id,
            side: event.side,
            price: event.price,
            size: event.size,
            is_tob: false,
        }
    }

    /// Build the sole order installed by a top-of-book Add.
    pub fn tob_from_event(event: &MboEvent) -> Self {
        RestingOrder {
            is_tob: true,
            ..Self::from_event(event)
        }
    }
}

/// The queue of resting orders at one (side, price) pair, in arrival order.
///
/// A level is created on insertion of its first order and removed when its
/// last order leaves (invariant I2) — callers, not this type, enforce that by
/// dropping the level once `orders` is empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Level {
    pub orders: Vec<RestingOrder>,
}

impl Level {
    pub fn new() -> Self {
        Level { orders: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn aggregate_size(&self) -> u64 {
        self.orders.iter().map(|o| o.size as u64).sum()
    }

    /// Number of resting orders, excluding any marked top-of-book (§4.2's
    /// `PriceLevel::order_count` definition).
    pub fn order_count(&self) -> usize {
        self.orders.iter().filter(|o| !o.is_tob).count()
    }

    /// Index of the order with the given id, if resting at this level.
    pub fn position_of(&self, order_id: u64) -> Option<usize> {
        self.orders.iter().position(|o| o.order_id == order_id)
    }

    /// Sum of sizes of every order strictly ahead of `order_id` in the queue.
    pub fn queue_position(&self, order_id: u64) -> Option<u64> {
        let idx = self.position_of(order_id)?;
        Some(self.orders[..idx].iter().map(|o| o.size as u64).sum())
    }
}

/// A read-only projection of a level: `(price, aggregate_size, order_count)`.
/// `order_count` excludes top-of-book summary orders, per [`Level::order_count`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceLevel {
    pub price: i64,
    pub aggregate_size: u64,
    pub order_count: usize,
}
