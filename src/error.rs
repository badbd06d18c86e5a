use std::error::Error;
use thiserror::Error;
use crate::codes::{StreamErrorCode, SessionErrorCode};

/// Reasons an HTTP/3 error code is not the image of a WebTransport stream error code.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Error)]
pub enum CodeError {
    #[error("error code outside of expected range: {0:#x}")]
    OutOfRange(u64),
    #[error("invalid error code: {0:#x}")]
    InvalidPosition(u64),
}

/// Returned from stream operations (read, write) when the stream is canceled.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Error)]
#[error("stream canceled with error code {code}")]
pub struct StreamError {
    pub code: StreamErrorCode,
    pub remote: bool,
}

impl StreamError {
    pub fn new(code: StreamErrorCode, remote: bool) -> StreamError {
        StreamError { code, remote }
    }

    /// Matches any `StreamError`, whatever its code or direction, anywhere in the chain of `err`.
    pub fn is_stream_error(err: &(dyn Error + 'static)) -> bool {
        find_cause::<StreamError>(err).is_some()
    }
}

/// A WebTransport session was closed, by the peer or locally.
#[derive(Debug, PartialEq, Eq, Clone, Error)]
#[error("session canceled, remote: {remote} error code: {code} msg: {message}")]
pub struct SessionError {
    pub remote: bool,
    pub code: SessionErrorCode,
    pub message: String,
}

impl SessionError {
    pub fn new<T: Into<String>>(remote: bool, code: SessionErrorCode, message: T) -> SessionError {
        SessionError { remote, code, message: message.into() }
    }
}

/// Finds the first `T` in the source chain of `err`.
pub(crate) fn find_cause<'a, T: Error + 'static>(err: &'a (dyn Error + 'static)) -> Option<&'a T> {
    find_map_cause(err, &mut |e| e.downcast_ref::<T>())
}

/// Walks the source chain of `err` and returns the first value `f` produces. Errors boxed inside
/// a `std::io::Error` (as quinn's `AsyncRead`/`AsyncWrite` adapters produce) are looked through
/// as well, since `io::Error::source` skips the boxed error itself.
pub(crate) fn find_map_cause<'a, R, F>(err: &'a (dyn Error + 'static), f: &mut F) -> Option<R>
where
    F: FnMut(&'a (dyn Error + 'static)) -> Option<R>,
{
    let mut next = Some(err);
    while let Some(e) = next {
        if let Some(found) = f(e) {
            return Some(found);
        }
        if let Some(inner) = e.downcast_ref::<std::io::Error>().and_then(|io| io.get_ref()) {
            if let Some(found) = find_map_cause(inner, f) {
                return Some(found);
            }
        }
        next = e.source();
    }
    None
}
