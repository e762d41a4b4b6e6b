//! Fixed-width binary codec for an [`MboEvent`] on the TCP link.
//!
//! Byte order and field widths are pinned explicitly (`zerocopy`'s
//! little-endian integer wrappers) rather than inherited from the host, so
//! streamer and engine can run on different machines. The record carries
//! every field in §3 with no framing, no length prefix, and no delimiter —
//! the stream is a concatenation of `W`-byte records.

use crate::mbo::{Action, MboEvent, MboFlags, Side};
use zerocopy::byteorder::little_endian::{I64, U32, U64};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// On-wire representation of one [`MboEvent`]. Field order here is the wire's
/// field order; it has no bearing on [`MboEvent`]'s own field order.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
struct WireEvent {
    ts_recv: I64,
    ts_event: I64,
    order_id: U64,
    price: I64,
    size: U32,
    side: u8,
    action: u8,
    flags: u8,
    _reserved: u8,
}

/// Width in bytes of one wire record. A compile-time constant agreed by
/// streamer and engine; a partial trailing record of this width is a hard
/// truncation error on the receiving side.
pub const W: usize = std::mem::size_of::<WireEvent>();

/// An event whose `side`, `action`, or `flags` byte did not decode to a
/// known value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("malformed wire record: {reason}")]
pub struct DecodeError {
    reason: &'static str,
}

fn side_to_u8(side: Side) -> u8 {
    side as u8
}

fn side_from_u8(raw: u8) -> Option<Side> {
    match raw {
        0 => Some(Side::Bid),
        1 => Some(Side::Ask),
        2 => Some(Side::None),
        _ => None,
    }
}

/// Serialize `event` into exactly [`W`] bytes.
pub fn encode(event: &MboEvent) -> [u8; W] {
    let wire = WireEvent {
        ts_recv: I64::new(event.ts_recv),
        ts_event: I64::new(event.ts_event),
        order_id: U64::new(event.order_id),
        price: I64::new(event.price),
        size: U32::new(event.size),
        side: side_to_u8(event.side),
        action: event.action as u8,
        flags: event.flags.bits(),
        _reserved: 0,
    };
    let mut buf = [0u8; W];
    buf.copy_from_slice(wire.as_bytes());
    buf
}

/// Parse exactly [`W`] bytes into an [`MboEvent`].
///
/// Satisfies law L3 (`decode(encode(e)) == e`) for every value `encode` can
/// produce; `decode` additionally rejects byte patterns `encode` never
/// produces (an unknown side/action byte, or reserved flag bits).
pub fn decode(bytes: &[u8; W]) -> Result<MboEvent, DecodeError> {
    let wire = WireEvent::read_from_bytes(bytes.as_slice()).map_err(|_| DecodeError {
        reason: "buffer is not a valid wire record",
    })?;
    let side = side_from_u8(wire.side).ok_or(DecodeError {
        reason: "unknown side byte",
    })?;
    let action = Action::from_u8(wire.action).ok_or(DecodeError {
        reason: "unknown action byte",
    })?;
    let flags = MboFlags::from_bits(wire.flags).ok_or(DecodeError {
        reason: "unknown flag bits set",
    })?;
    Ok(MboEvent {
        ts_recv: wire.ts_recv.get(),
        ts_event: wire.ts_event.get(),
        order_id: wire.order_id.get(),
        side,
        action,
        price: wire.price.get(),
        size: wire.size.get(),
        flags,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mbo::UNDEF_PRICE;

    fn sample() -> MboEvent {
        MboEvent {
            ts_recv: 1_700_000_000_000_000_000,
            ts_event: 1_700_000_000_000_000_123,
            order_id: 42,
            side: Side::Bid,
            action: Action::Modify,
            price: 123_456,
            size: 789,
            flags: MboFlags::TOB | MboFlags::LAST,
        }
    }

    #[test]
    fn round_trips_a_representative_event() {
        let e = sample();
        let decoded = decode(&encode(&e)).unwrap();
        assert_eq!(decoded, e);
    }

    #[test]
    fn round_trips_undef_price_and_empty_flags() {
        let mut e = sample();
        e.price = UNDEF_PRICE;
        e.flags = MboFlags::empty();
        let decoded = decode(&encode(&e)).unwrap();
        assert_eq!(decoded, e);
    }

    #[test]
    fn rejects_unknown_action_byte() {
        let mut buf = encode(&sample());
        let action_offset = 8 + 8 + 8 + 8 + 4 + 1;
        buf[action_offset] = 0xFF;
        assert!(decode(&buf).is_err());
    }

    #[test]
    fn width_is_stable() {
        assert_eq!(W, std::mem::size_of::<WireEvent>());
        assert!(W > 0);
    }
}
