//! Core error types.

use std::fmt;

/// Errors raised while decoding a request.
///
/// Argument unification and content negotiation never fail; only reading
/// the request body can.
#[derive(Debug)]
pub enum Error {
    /// Invalid HTTP request.
    InvalidRequest(String),

    /// Malformed multipart body.
    Multipart(multer::Error),

    /// I/O error.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidRequest(msg) => write!(f, "invalid request: {}", msg),
            Error::Multipart(e) => write!(f, "multipart error: {}", e),
            Error::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Multipart(e) => Some(e),
            Error::Io(e) => Some(e),
            Error::InvalidRequest(_) => None,
        }
    }
}

impl From<multer::Error> for Error {
    fn from(e: multer::Error) -> Self {
        Error::Multipart(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
