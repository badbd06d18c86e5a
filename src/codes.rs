//! Mapping between WebTransport application error codes and HTTP/3 stream error codes.
//!
//! WebTransport stream resets travel as HTTP/3 error codes in the range
//! [`FIRST_ERROR_CODE`]..=[`LAST_ERROR_CODE`]. Every 32-bit application code has exactly one
//! image in that range. The code points `0x1f * N + 0x21` are reserved for greasing and are
//! skipped by the encoding, so one HTTP/3 code in each block of `0x1f` never decodes.

use std::fmt;
use quinn::VarInt;
use crate::error::CodeError;

pub const FIRST_ERROR_CODE: u64 = 0x52e4a40fa8db;
pub const LAST_ERROR_CODE: u64 = 0x52e5ac983162;

/// Code used to reject a stream that was buffered for a session which never materialized
/// (H3_WEBTRANSPORT_BUFFERED_STREAM_REJECTED).
pub const BUFFERED_STREAM_REJECTED_ERROR_CODE: u64 = 0x3994bd84;

/// Application error code carried by a stream reset.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StreamErrorCode(pub u32);

/// Application error code carried by a session close. Not interchangeable with
/// [`StreamErrorCode`] even though both are 32 bits wide.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionErrorCode(pub u32);

impl From<u32> for StreamErrorCode {
    fn from(code: u32) -> Self {
        StreamErrorCode(code)
    }
}

impl From<u32> for SessionErrorCode {
    fn from(code: u32) -> Self {
        SessionErrorCode(code)
    }
}

impl fmt::Display for StreamErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for SessionErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StreamErrorCode {
    pub fn to_http_code(self) -> u64 {
        encode(self)
    }

    /// The encoded code as a QUIC varint, ready for `SendStream::reset` or `RecvStream::stop`.
    pub fn to_varint(self) -> VarInt {
        VarInt::from_u64(encode(self)).expect("LAST_ERROR_CODE < 2^62, so every encoded value fits")
    }
}

pub fn encode(code: StreamErrorCode) -> u64 {
    let n = code.0 as u64;
    FIRST_ERROR_CODE + n + n / 0x1e
}

pub fn decode(http_code: u64) -> Result<StreamErrorCode, CodeError> {
    if http_code < FIRST_ERROR_CODE || http_code > LAST_ERROR_CODE {
        return Err(CodeError::OutOfRange(http_code));
    }
    if is_grease_slot(http_code) {
        return Err(CodeError::InvalidPosition(http_code));
    }
    let shifted = http_code - FIRST_ERROR_CODE;
    u32::try_from(shifted - shifted / 0x1f)
        .map(StreamErrorCode)
        .map_err(|_| CodeError::OutOfRange(http_code))
}

/// True for the reserved `0x1f * N + 0x21` code points. Evaluated on the absolute HTTP/3 code,
/// not on the offset from [`FIRST_ERROR_CODE`].
pub fn is_grease_slot(http_code: u64) -> bool {
    http_code >= 0x21 && (http_code - 0x21) % 0x1f == 0
}
