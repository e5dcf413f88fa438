//! HTTP-facing error taxonomy

use thiserror::Error;

/// Errors a request can surface at the HTTP boundary.
///
/// The queue engine itself never fails: a read miss, whether immediate or
/// after a long-poll deadline, is a normal outcome. These variants exist so
/// the transport can map malformed requests and misses onto status codes in
/// one place.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing key or value on a write.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Read miss. An immediate miss and an expired long-poll are
    /// indistinguishable to the caller.
    #[error("not found")]
    NotFound,

    /// Any method other than PUT or GET.
    #[error("method not supported")]
    MethodNotSupported,
}

impl ApiError {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::NotFound => 404,
            Self::MethodNotSupported => 405,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::BadRequest("missing value".into()).http_status(), 400);
        assert_eq!(ApiError::NotFound.http_status(), 404);
        assert_eq!(ApiError::MethodNotSupported.http_status(), 405);
    }

    #[test]
    fn test_bad_request_message() {
        let err = ApiError::BadRequest("missing key".into());
        assert_eq!(err.to_string(), "bad request: missing key");
    }
}
