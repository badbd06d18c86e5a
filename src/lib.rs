//! WebTransport error codes over QUIC.
//!
//! Translates WebTransport stream error codes to and from the HTTP/3 error codes carried by
//! QUIC RESET_STREAM and STOP_SENDING frames, and recognizes which transport errors belong
//! to WebTransport at all.

pub mod codes;
pub mod error;
pub mod classify;
pub mod capsule;
pub mod varint;
pub mod util;

pub use codes::{
    StreamErrorCode,
    SessionErrorCode,
    FIRST_ERROR_CODE,
    LAST_ERROR_CODE,
    BUFFERED_STREAM_REJECTED_ERROR_CODE,
};
pub use error::{CodeError, StreamError, SessionError};
pub use classify::{Classification, Classifier};
