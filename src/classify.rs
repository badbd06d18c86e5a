//! Deciding whether a transport error is a WebTransport stream termination.

use std::error::Error;
use quinn::{ReadError, ReadExactError, ReadToEndError, VarInt, WriteError};
use crate::codes;
use crate::error::{find_map_cause, CodeError, StreamError};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Classification {
    /// No error was supplied.
    Absent,
    /// The error is not, and does not wrap, a stream reset or stop.
    KindMismatch,
    /// The stream was reset with the session-close code.
    SessionClose,
    /// The stream was reset with an encoded WebTransport code.
    Stream(StreamError),
    /// The stream was reset with a code that does not belong to WebTransport.
    Rejected(CodeError),
}

impl Classification {
    pub fn is_protocol_error(&self) -> bool {
        matches!(self, Classification::SessionClose | Classification::Stream(_))
    }

    pub fn into_stream_error(self) -> Option<StreamError> {
        match self {
            Classification::Stream(e) => Some(e),
            _ => None,
        }
    }
}

/// Classifies transport errors against the WebTransport error code space.
///
/// The session-close code belongs to the session layer and is supplied by it.
#[derive(Debug, Clone, Copy)]
pub struct Classifier {
    session_close_code: VarInt,
}

impl Classifier {
    pub fn new(session_close_code: VarInt) -> Classifier {
        Classifier { session_close_code }
    }

    pub fn session_close_code(&self) -> VarInt {
        self.session_close_code
    }

    pub fn classify(&self, err: Option<&(dyn Error + 'static)>) -> Classification {
        let err = match err {
            Some(err) => err,
            None => return Classification::Absent,
        };
        let code = match reset_code(err) {
            Some(code) => code,
            None => return Classification::KindMismatch,
        };
        if code == self.session_close_code {
            return Classification::SessionClose;
        }
        match codes::decode(code.into_inner()) {
            Ok(code) => Classification::Stream(StreamError::new(code, true)),
            Err(e) => Classification::Rejected(e),
        }
    }

    pub fn is_protocol_error(&self, err: Option<&(dyn Error + 'static)>) -> bool {
        self.classify(err).is_protocol_error()
    }

    /// Replaces a transport error with the [`StreamError`] it encodes, if any.
    pub fn stream_error(&self, err: &(dyn Error + 'static)) -> Option<StreamError> {
        self.classify(Some(err)).into_stream_error()
    }
}

/// The application code of a peer's RESET_STREAM or STOP_SENDING, wherever it sits in the chain.
pub fn reset_code(err: &(dyn Error + 'static)) -> Option<VarInt> {
    find_map_cause(err, &mut |e| {
        if let Some(ReadError::Reset(code)) = e.downcast_ref::<ReadError>() {
            return Some(*code);
        }
        if let Some(ReadExactError::ReadError(ReadError::Reset(code))) = e.downcast_ref::<ReadExactError>() {
            return Some(*code);
        }
        if let Some(ReadToEndError::Read(ReadError::Reset(code))) = e.downcast_ref::<ReadToEndError>() {
            return Some(*code);
        }
        match e.downcast_ref::<WriteError>() {
            Some(WriteError::Stopped(code)) => Some(*code),
            _ => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use std::io;
    use quinn::{ReadError, ReadExactError, ReadToEndError, VarInt, WriteError};
    use crate::codes::{StreamErrorCode, FIRST_ERROR_CODE, LAST_ERROR_CODE, BUFFERED_STREAM_REJECTED_ERROR_CODE};
    use crate::error::{CodeError, SessionError, StreamError};
    use crate::codes::SessionErrorCode;
    use super::{Classification, Classifier, reset_code};

    const SESSION_GONE: u32 = 0x170d7b68;

    fn classifier() -> Classifier {
        Classifier::new(VarInt::from_u32(SESSION_GONE))
    }

    fn reset(code: u64) -> ReadError {
        ReadError::Reset(VarInt::from_u64(code).unwrap())
    }

    #[test]
    fn absent() {
        assert_eq!(classifier().classify(None), Classification::Absent);
        assert!(!classifier().is_protocol_error(None));
    }

    #[test]
    fn unrelated_errors() {
        let c = classifier();
        let io_err = io::Error::from(io::ErrorKind::BrokenPipe);
        assert_eq!(c.classify(Some(&io_err)), Classification::KindMismatch);
        let session = SessionError::new(true, SessionErrorCode(1), "x");
        assert!(!c.is_protocol_error(Some(&session)));
        assert!(!c.is_protocol_error(Some(&ReadError::UnknownStream)));
        assert!(!c.is_protocol_error(Some(&WriteError::UnknownStream)));
        assert!(!c.is_protocol_error(Some(&ReadExactError::ReadError(ReadError::UnknownStream))));
        assert!(!c.is_protocol_error(Some(&ReadToEndError::TooLong)));
    }

    #[test]
    fn session_close_code() {
        let e = reset(SESSION_GONE as u64);
        assert_eq!(classifier().classify(Some(&e)), Classification::SessionClose);
        assert!(classifier().is_protocol_error(Some(&e)));
        assert_eq!(classifier().stream_error(&e), None);
    }

    #[test]
    fn encoded_stream_code() {
        let e = ReadError::Reset(StreamErrorCode(42).to_varint());
        let expected = StreamError::new(StreamErrorCode(42), true);
        assert_eq!(classifier().classify(Some(&e)), Classification::Stream(expected));
        assert_eq!(classifier().stream_error(&e), Some(expected));
    }

    #[test]
    fn codes_outside_window() {
        let c = classifier();
        let e = reset(LAST_ERROR_CODE + 1);
        assert_eq!(c.classify(Some(&e)), Classification::Rejected(CodeError::OutOfRange(LAST_ERROR_CODE + 1)));
        assert!(!c.is_protocol_error(Some(&e)));
        assert!(!c.is_protocol_error(Some(&reset(BUFFERED_STREAM_REJECTED_ERROR_CODE))));
        assert!(!c.is_protocol_error(Some(&reset(0))));
    }

    #[test]
    fn grease_slot_rejected() {
        let code = FIRST_ERROR_CODE + 0x1e;
        let e = reset(code);
        assert_eq!(classifier().classify(Some(&e)), Classification::Rejected(CodeError::InvalidPosition(code)));
    }

    #[test]
    fn stopped_write() {
        let e = WriteError::Stopped(StreamErrorCode(5).to_varint());
        assert_eq!(classifier().stream_error(&e), Some(StreamError::new(StreamErrorCode(5), true)));
    }

    #[test]
    fn wrapped_resets() {
        let c = classifier();
        let code = StreamErrorCode(0).to_varint();

        let exact = ReadExactError::ReadError(ReadError::Reset(code));
        assert!(c.is_protocol_error(Some(&exact)));

        let to_end = ReadToEndError::Read(ReadError::Reset(code));
        assert!(c.is_protocol_error(Some(&to_end)));

        let io_err: io::Error = io::Error::new(io::ErrorKind::ConnectionReset, ReadError::Reset(code));
        assert!(c.is_protocol_error(Some(&io_err)));

        let boxed: Box<dyn std::error::Error> = Box::new(io::Error::new(
            io::ErrorKind::ConnectionReset,
            WriteError::Stopped(code),
        ));
        assert!(c.is_protocol_error(Some(&*boxed)));
    }

    #[derive(Debug, thiserror::Error)]
    #[error("stream failed")]
    struct StreamFailed(#[source] Box<dyn std::error::Error + Send + Sync>);

    #[test]
    fn stop_found_beneath_wrappers() {
        let code = StreamErrorCode(11).to_varint();
        let chain = StreamFailed(Box::new(io::Error::new(
            io::ErrorKind::BrokenPipe,
            StreamFailed(Box::new(WriteError::Stopped(code))),
        )));
        assert_eq!(reset_code(&chain), Some(code));
        assert_eq!(classifier().stream_error(&chain), Some(StreamError::new(StreamErrorCode(11), true)));

        let unknown = StreamFailed(Box::new(io::Error::new(
            io::ErrorKind::Other,
            StreamFailed(Box::new(ReadError::UnknownStream)),
        )));
        assert_eq!(reset_code(&unknown), None);
        assert_eq!(classifier().classify(Some(&unknown)), Classification::KindMismatch);
    }

    #[test]
    fn reset_code_extraction() {
        assert_eq!(reset_code(&reset(FIRST_ERROR_CODE)), Some(VarInt::from_u64(FIRST_ERROR_CODE).unwrap()));
        assert_eq!(reset_code(&ReadError::UnknownStream), None);
    }
}
