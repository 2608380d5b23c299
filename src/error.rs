//! Unified error type.

use std::fmt;

use http::StatusCode;

/// The error type carried through the middleware chain and returned by
/// kawa's fallible operations.
///
/// Middleware return `Err(Error)` to abort the chain; the dispatch boundary
/// is the single place that catches it, maps it to a status code, and writes
/// the message as the response body. [`Error::Io`] surfaces infrastructure
/// failures: binding to a port or accepting a connection.
#[derive(Debug)]
pub enum Error {
    /// The requested resource does not exist. Maps to `404 Not Found`.
    NotFound(String),
    /// Any other application failure. Maps to `500 Internal Server Error`.
    Internal(String),
    /// An I/O failure from the transport layer.
    Io(std::io::Error),
}

impl Error {
    /// A generic failure. Maps to `500 Internal Server Error`.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// A missing-resource failure. Maps to `404 Not Found`.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// The status code this error finalizes to.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message written as the response body. Falls back to
    /// `"Internal error"` when the error carries no message.
    pub fn message(&self) -> String {
        let msg = match self {
            Self::NotFound(m) | Self::Internal(m) => m.clone(),
            Self::Io(e) => e.to_string(),
        };
        if msg.is_empty() { "Internal error".to_owned() } else { msg }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(m) | Self::Internal(m) => f.write_str(m),
            Self::Io(e) => write!(f, "io: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        assert_eq!(Error::not_found("missing").status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn everything_else_maps_to_500() {
        assert_eq!(Error::internal("boom").status(), StatusCode::INTERNAL_SERVER_ERROR);
        let io = Error::from(std::io::Error::other("net down"));
        assert_eq!(io.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn empty_message_falls_back() {
        assert_eq!(Error::internal("").message(), "Internal error");
        assert_eq!(Error::internal("boom").message(), "boom");
    }
}
