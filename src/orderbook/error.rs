//! Errors `apply` can return.
//!
//! Both kinds are recoverable: the caller counts the event and continues
//! (§4.1 Error discipline, §7 band 2). `apply` guarantees the book is left
//! byte-identical to its pre-call state when either is returned (P6).

use thiserror::Error;

/// A failed [`apply`](crate::orderbook::OrderBook::apply) call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApplyError {
    /// The event refers to something that should exist and does not: an
    /// unknown level, an unknown order id on Cancel, a duplicate order id on
    /// Add, or an unrecognized action.
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// The event contradicts the book: a Cancel exceeding resting size, or a
    /// Modify that changes an order's side.
    #[error("logic error: {reason}")]
    LogicError { reason: String },
}

impl ApplyError {
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        ApplyError::InvalidArgument {
            reason: reason.into(),
        }
    }

    pub fn logic_error(reason: impl Into<String>) -> Self {
        ApplyError::LogicError {
            reason: reason.into(),
        }
    }
}
