//! Core `OrderBook` implementation: the single-threaded MBO state machine.

use super::error::ApplyError;
use super::level::{Level, PriceLevel, RestingOrder};
use crate::mbo::{Action, MboEvent, Side, UNDEF_PRICE};
use std::collections::{BTreeMap, HashMap};
use std::collections::btree_map::Entry;
use std::cmp::Reverse;
use tracing::{trace, warn};

/// The order book: per-side price-ordered levels and a per-order index.
///
/// Bids are keyed by `Reverse<i64>` so that iteration in key order is
/// descending price order (I3/§3's side-book traversal requirement); asks are
/// keyed directly for ascending order. Both maps satisfy I2: a key is removed
/// the moment its level empties.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct OrderBook {
    bids: BTreeMap<Reverse<i64>, Level>,
    asks: BTreeMap<i64, Level>,
    /// order_id -> (side, price). Top-of-book orders are never entered here
    /// (Open Question, resolved: TOB orders are summaries, not resting
    /// orders, and a later Modify/Cancel against their id must "not find" it).
    index: HashMap<u64, (Side, i64)>,
}

impl OrderBook {
    pub fn new() -> Self {
        OrderBook::default()
    }

    /// Drive the state machine. On error the book is left byte-identical to
    /// its state before the call (P6) — every fallible path below validates
    /// before it mutates.
    pub fn apply(&mut self, event: &MboEvent) -> Result<(), ApplyError> {
        trace!(
            action = ?event.action,
            side = ?event.side,
            price = event.price,
            size = event.size,
            order_id = event.order_id,
            "apply"
        );
        let result = match event.action {
            Action::Clear => {
                self.clear();
                Ok(())
            }
            Action::Add => self.add(event),
            Action::Cancel => self.cancel(event),
            Action::Modify => self.modify(event),
            Action::Trade | Action::Fill | Action::None => Ok(()),
        };
        if let Err(ref e) = result {
            warn!(order_id = event.order_id, error = %e, "apply failed");
        }
        result
    }

    fn clear(&mut self) {
        self.bids.clear();
        self.asks.clear();
        self.index.clear();
    }

    fn add(&mut self, event: &MboEvent) -> Result<(), ApplyError> {
        if event.side == Side::None {
            return Err(ApplyError::invalid_argument("add with side None"));
        }
        if event.flags.is_tob() {
            self.add_tob(event);
            return Ok(());
        }
        if self.index.contains_key(&event.order_id) {
            return Err(ApplyError::invalid_argument(format!(
                "duplicate order id {} on Add",
                event.order_id
            )));
        }
        self.insert_resting(event);
        Ok(())
    }

    /// Replace the entire named side with a single level holding the
    /// top-of-book summary order, or clear the side if the event's price is
    /// [`UNDEF_PRICE`]. The summary order rests in the level like any other
    /// (so `best_bid`/`best_ask`/snapshots see it) but is marked
    /// [`RestingOrder::is_tob`] and, per the Open Question this preserves, is
    /// never entered into `index`.
    fn add_tob(&mut self, event: &MboEvent) {
        match event.side {
            Side::Bid => {
                self.bids.clear();
                if event.price != UNDEF_PRICE {
                    self.bids.insert(
                        Reverse(event.price),
                        Level {
                            orders: vec![RestingOrder::tob_from_event(event)],
                        },
                    );
                }
            }
            Side::Ask => {
                self.asks.clear();
                if event.price != UNDEF_PRICE {
                    self.asks.insert(
                        event.price,
                        Level {
                            orders: vec![RestingOrder::tob_from_event(event)],
                        },
                    );
                }
            }
            Side::None => {}
        }
    }

    fn insert_resting(&mut self, event: &MboEvent) {
        let order = RestingOrder::from_event(event);
        match event.side {
            Side::Bid => {
                self.bids
                    .entry(Reverse(event.price))
                    .or_insert_with(Level::new)
                    .orders
                    .push(order);
            }
            Side::Ask => {
                self.asks
                    .entry(event.price)
                    .or_insert_with(Level::new)
                    .orders
                    .push(order);
            }
            Side::None => {}
        }
        self.index.insert(event.order_id, (event.side, event.price));
    }

    fn cancel(&mut self, event: &MboEvent) -> Result<(), ApplyError> {
        let removed_level_should_drop = match event.side {
            Side::Bid => {
                let key = Reverse(event.price);
                let level = self.bids.get_mut(&key).ok_or_else(|| {
                    ApplyError::invalid_argument(format!(
                        "cancel against unknown bid level {}",
                        event.price
                    ))
                })?;
                let drop_level = cancel_in_level(level, event)?;
                if drop_level {
                    self.bids.remove(&key);
                }
                drop_level
            }
            Side::Ask => {
                let key = event.price;
                let level = self.asks.get_mut(&key).ok_or_else(|| {
                    ApplyError::invalid_argument(format!(
                        "cancel against unknown ask level {}",
                        event.price
                    ))
                })?;
                let drop_level = cancel_in_level(level, event)?;
                if drop_level {
                    self.asks.remove(&key);
                }
                drop_level
            }
            Side::None => {
                return Err(ApplyError::invalid_argument("cancel with side None"));
            }
        };
        let _ = removed_level_should_drop;
        Ok(())
    }

    fn modify(&mut self, event: &MboEvent) -> Result<(), ApplyError> {
        let Some(&(current_side, current_price)) = self.index.get(&event.order_id) else {
            return self.add(event);
        };
        if current_side != event.side {
            return Err(ApplyError::logic_error(format!(
                "modify changes side for order {}",
                event.order_id
            )));
        }

        let resting_size = self.level_mut(current_side, current_price)
            .and_then(|level| level.position_of(event.order_id).map(|i| level.orders[i].size))
            .ok_or_else(|| {
                ApplyError::invalid_argument(format!(
                    "order {} missing from its indexed level",
                    event.order_id
                ))
            })?;

        if current_price == event.price && event.size <= resting_size {
            let level = self
                .level_mut(current_side, current_price)
                .expect("level looked up above");
            let idx = level.position_of(event.order_id).expect("looked up above");
            level.orders[idx].size = event.size;
            return Ok(());
        }

        self.remove_resting(current_side, current_price, event.order_id);
        self.insert_resting(event);
        Ok(())
    }

    fn remove_resting(&mut self, side: Side, price: i64, order_id: u64) {
        match side {
            Side::Bid => {
                let key = Reverse(price);
                if let Entry::Occupied(mut entry) = self.bids.entry(key) {
                    if let Some(idx) = entry.get().position_of(order_id) {
                        entry.get_mut().orders.remove(idx);
                    }
                    if entry.get().is_empty() {
                        entry.remove();
                    }
                }
            }
            Side::Ask => {
                let key = price;
                if let Entry::Occupied(mut entry) = self.asks.entry(key) {
                    if let Some(idx) = entry.get().position_of(order_id) {
                        entry.get_mut().orders.remove(idx);
                    }
                    if entry.get().is_empty() {
                        entry.remove();
                    }
                }
            }
            Side::None => {}
        }
        self.index.remove(&order_id);
    }

    fn level_mut(&mut self, side: Side, price: i64) -> Option<&mut Level> {
        match side {
            Side::Bid => self.bids.get_mut(&Reverse(price)),
            Side::Ask => self.asks.get_mut(&price),
            Side::None => None,
        }
    }

    fn level(&self, side: Side, price: i64) -> Option<&Level> {
        match side {
            Side::Bid => self.bids.get(&Reverse(price)),
            Side::Ask => self.asks.get(&price),
            Side::None => None,
        }
    }

    /// The inside bid, if any resting levels exist on that side.
    pub fn best_bid(&self) -> Option<PriceLevel> {
        self.bids.iter().next().map(|(Reverse(price), level)| PriceLevel {
            price: *price,
            aggregate_size: level.aggregate_size(),
            order_count: level.order_count(),
        })
    }

    /// The inside ask, if any resting levels exist on that side.
    pub fn best_ask(&self) -> Option<PriceLevel> {
        self.asks.iter().next().map(|(price, level)| PriceLevel {
            price: *price,
            aggregate_size: level.aggregate_size(),
            order_count: level.order_count(),
        })
    }

    /// The `k`-th bid level from the inside, `k` >= 0.
    pub fn bid_level(&self, k: usize) -> Option<PriceLevel> {
        self.bids.iter().nth(k).map(|(Reverse(price), level)| PriceLevel {
            price: *price,
            aggregate_size: level.aggregate_size(),
            order_count: level.order_count(),
        })
    }

    /// The `k`-th ask level from the inside, `k` >= 0.
    pub fn ask_level(&self, k: usize) -> Option<PriceLevel> {
        self.asks.iter().nth(k).map(|(price, level)| PriceLevel {
            price: *price,
            aggregate_size: level.aggregate_size(),
            order_count: level.order_count(),
        })
    }

    /// `(number of bid levels, number of ask levels)`.
    pub fn level_counts(&self) -> (usize, usize) {
        (self.bids.len(), self.asks.len())
    }

    /// Sum of sizes resting ahead of `order_id` at its level. Fails if the
    /// order is unknown — this includes top-of-book summary ids, which are
    /// never indexed (see the Open Question noted on [`OrderBook::index`]).
    pub fn queue_position(&self, order_id: u64) -> Result<u64, ApplyError> {
        let &(side, price) = self.index.get(&order_id).ok_or_else(|| {
            ApplyError::invalid_argument(format!("unknown order id {order_id}"))
        })?;
        self.level(side, price)
            .and_then(|level| level.queue_position(order_id))
            .ok_or_else(|| {
                ApplyError::invalid_argument(format!(
                    "order {order_id} missing from its indexed level"
                ))
            })
    }
}

/// Cancel the named order within `level`; returns whether the level emptied.
/// Does not touch the order index or the level map — the caller does that
/// once it knows whether to drop the level's map entry too.
fn cancel_in_level(level: &mut Level, event: &MboEvent) -> Result<bool, ApplyError> {
    let idx = level.position_of(event.order_id).ok_or_else(|| {
        ApplyError::invalid_argument(format!(
            "cancel against unknown order id {}",
            event.order_id
        ))
    })?;
    let resting = &mut level.orders[idx];
    if event.size > resting.size {
        return Err(ApplyError::logic_error(format!(
            "cancel size {} exceeds resting size {} for order {}",
            event.size, resting.size, event.order_id
        )));
    }
    resting.size -= event.size;
    if resting.size == 0 {
        level.orders.remove(idx);
    }
    Ok(level.is_empty())
}
