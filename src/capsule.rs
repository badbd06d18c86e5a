//! CLOSE_WEBTRANSPORT_SESSION capsule.
//!
//! ```text
//! CLOSE_WEBTRANSPORT_SESSION Capsule {
//!   Type (i) = 0x2843,
//!   Length (i),
//!   Application Error Code (32),
//!   Application Error Message (..8192),
//! }
//! ```

use bytes::{Buf, BufMut};
use thiserror::Error;
use crate::codes::SessionErrorCode;
use crate::error::SessionError;
use crate::varint;

pub const CLOSE_WEBTRANSPORT_SESSION: u64 = 0x2843;

/// Longest permitted error message, in bytes. Every `CloseSession` holds at most this many.
pub const MAX_MESSAGE_LEN: usize = 1024;

#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum CapsuleError {
    #[error("capsule truncated")]
    Truncated,
    #[error("unexpected capsule type {0:#x}")]
    UnexpectedType(u64),
    #[error("error message too long: {0} bytes")]
    MessageTooLong(usize),
    #[error("error message is not valid UTF-8")]
    InvalidUtf8,
    #[error("capsule length {0} shorter than error code")]
    LengthMismatch(u64),
}

impl From<varint::DecodeError> for CapsuleError {
    fn from(_: varint::DecodeError) -> Self {
        CapsuleError::Truncated
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct CloseSession {
    code: SessionErrorCode,
    message: String,
}

impl CloseSession {
    pub fn new<T: Into<String>>(code: SessionErrorCode, message: T) -> Result<CloseSession, CapsuleError> {
        let message = message.into();
        if message.len() > MAX_MESSAGE_LEN {
            return Err(CapsuleError::MessageTooLong(message.len()));
        }
        Ok(CloseSession { code, message })
    }

    pub fn code(&self) -> SessionErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn encode<T>(&self, out: &mut T) where T : BufMut {
        let len = 4 + self.message.len() as u64;
        varint::encode_u64(CLOSE_WEBTRANSPORT_SESSION, out)
            .expect("capsule type fits in a varint");
        varint::encode_u64(len, out)
            .expect("message is at most MAX_MESSAGE_LEN bytes, so length fits in a varint");
        out.put_u32(self.code.0);
        out.put_slice(self.message.as_bytes());
    }

    pub fn decode<T>(buf: &mut T) -> Result<CloseSession, CapsuleError> where T : Buf {
        let capsule_type = varint::decode_u64(buf)?;
        if capsule_type != CLOSE_WEBTRANSPORT_SESSION {
            return Err(CapsuleError::UnexpectedType(capsule_type));
        }
        let len = varint::decode_u64(buf)?;
        if len < 4 {
            return Err(CapsuleError::LengthMismatch(len));
        }
        let message_len = usize::try_from(len - 4).map_err(|_| CapsuleError::MessageTooLong(usize::MAX))?;
        if message_len > MAX_MESSAGE_LEN {
            return Err(CapsuleError::MessageTooLong(message_len));
        }
        if buf.remaining() < 4 + message_len {
            return Err(CapsuleError::Truncated);
        }
        let code = SessionErrorCode(buf.get_u32());
        let mut message = vec![0u8; message_len];
        buf.copy_to_slice(&mut message);
        let message = String::from_utf8(message).map_err(|_| CapsuleError::InvalidUtf8)?;
        Ok(CloseSession { code, message })
    }

    pub fn into_session_error(self, remote: bool) -> SessionError {
        SessionError::new(remote, self.code, self.message)
    }
}

impl From<&SessionError> for CloseSession {
    /// Messages longer than [`MAX_MESSAGE_LEN`] are cut at the last character boundary that fits.
    fn from(e: &SessionError) -> Self {
        let mut end = e.message.len().min(MAX_MESSAGE_LEN);
        while !e.message.is_char_boundary(end) {
            end -= 1;
        }
        CloseSession { code: e.code, message: e.message[..end].to_string() }
    }
}
