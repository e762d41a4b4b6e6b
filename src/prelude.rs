//! Prelude module that re-exports the crate's commonly used types.
//!
//! ```rust
//! use mbo_book::prelude::*;
//! ```

pub use crate::cli::{Args, Mode};
pub use crate::mbo::{Action, MboEvent, MboFlags, Side, UNDEF_PRICE};
pub use crate::orderbook::{ApplyError, DepthLevel, DepthSnapshot, OrderBook, PriceLevel};
pub use crate::wire;
