//! QUIC variable-length integers, [RFC 9000 Section 16](https://www.rfc-editor.org/rfc/rfc9000.html#name-variable-length-integer-enc).
//!
//! The two most significant bits of the first byte give the encoded length (1, 2, 4 or 8 bytes);
//! the remaining bits hold the value in network byte order.

use bytes::{Buf, BufMut};
use thiserror::Error;

/// Largest value representable in 62 bits.
pub const MAX: u64 = (1 << 62) - 1;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Error)]
pub enum DecodeError {
    #[error("varint truncated: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Error)]
#[error("value {0} does not fit in a varint")]
pub struct ValueTooLarge(pub u64);

pub fn encoded_len(value: u64) -> usize {
    if value < (1 << 6) {
        1
    }
    else if value < (1 << 14) {
        2
    }
    else if value < (1 << 30) {
        4
    }
    else {
        8
    }
}

pub fn encode_u64<T>(value: u64, out: &mut T) -> Result<(), ValueTooLarge> where T : BufMut {
    if value > MAX {
        return Err(ValueTooLarge(value));
    }
    match encoded_len(value) {
        1 => out.put_u8(value as u8),
        2 => out.put_u16(0x4000 | value as u16),
        4 => out.put_u32(0x8000_0000 | value as u32),
        _ => out.put_u64(0xc000_0000_0000_0000 | value),
    }
    Ok(())
}

pub fn decode_u64<T>(buf: &mut T) -> Result<u64, DecodeError> where T : Buf {
    if !buf.has_remaining() {
        return Err(DecodeError::Truncated { needed: 1, available: 0 });
    }
    let needed = 1usize << (buf.chunk()[0] >> 6);
    if buf.remaining() < needed {
        return Err(DecodeError::Truncated { needed, available: buf.remaining() });
    }
    let value = match needed {
        1 => (buf.get_u8() & 0x3f) as u64,
        2 => (buf.get_u16() & 0x3fff) as u64,
        4 => (buf.get_u32() & 0x3fff_ffff) as u64,
        _ => buf.get_u64() & MAX,
    };
    Ok(value)
}
