//! Outgoing response view and body serialization.
//!
//! Middleware never build wire responses. They mutate the [`Response`] view
//! on the context — body, status, headers — and the dispatcher serializes
//! whatever the view holds once the chain has fully resolved.

use bytes::Bytes;
use http::header::{self, HeaderValue};
use http::{HeaderMap, StatusCode};
use http_body_util::Full;

// ── Body ─────────────────────────────────────────────────────────────────────

/// The response body as set by middleware.
///
/// Only the final value observed after the chain completes is sent:
///
/// - [`Body::Text`] is written verbatim as `text/plain; charset=utf-8`.
/// - [`Body::Json`] is serialized with [`serde_json`] as `application/json`.
/// - [`Body::Empty`] sends no bytes — a request no middleware touched
///   finalizes as an empty `200 OK`.
#[derive(Debug, Default)]
pub enum Body {
    #[default]
    Empty,
    Text(String),
    Json(serde_json::Value),
}

impl From<&str> for Body {
    fn from(s: &str) -> Self { Self::Text(s.to_owned()) }
}

impl From<String> for Body {
    fn from(s: String) -> Self { Self::Text(s) }
}

impl From<serde_json::Value> for Body {
    fn from(v: serde_json::Value) -> Self { Self::Json(v) }
}

// ── Response ─────────────────────────────────────────────────────────────────

/// The response side of a [`Context`](crate::Context).
///
/// Starts as an empty `200 OK`. `body` and `status` may be rewritten any
/// number of times during the chain's lifetime; finalization reads the last
/// write.
#[derive(Debug)]
pub struct Response {
    body: Body,
    status: StatusCode,
    headers: HeaderMap,
}

impl Response {
    pub(crate) fn new() -> Self {
        Self {
            body: Body::Empty,
            status: StatusCode::OK,
            headers: HeaderMap::new(),
        }
    }

    pub fn body(&self) -> &Body { &self.body }

    pub fn set_body(&mut self, body: impl Into<Body>) {
        self.body = body.into();
    }

    pub fn status(&self) -> StatusCode { self.status }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn headers_mut(&mut self) -> &mut HeaderMap { &mut self.headers }

    /// Serializes the view into a wire response. Called exactly once per
    /// request, after the chain resolved or the error boundary ran.
    ///
    /// A content-type set explicitly by middleware wins over the one implied
    /// by the body variant.
    pub(crate) fn finalize(self) -> http::Response<Full<Bytes>> {
        let mut status = self.status;
        let (content_type, bytes) = match self.body {
            Body::Empty => (None, Bytes::new()),
            Body::Text(s) => (Some("text/plain; charset=utf-8"), Bytes::from(s)),
            Body::Json(v) => match serde_json::to_vec(&v) {
                Ok(b) => (Some("application/json"), Bytes::from(b)),
                Err(e) => {
                    status = StatusCode::INTERNAL_SERVER_ERROR;
                    (
                        Some("text/plain; charset=utf-8"),
                        Bytes::from(format!("body serialization failed: {e}")),
                    )
                }
            },
        };

        let mut res = http::Response::new(Full::new(bytes));
        *res.status_mut() = status;
        *res.headers_mut() = self.headers;
        if let Some(ct) = content_type {
            res.headers_mut()
                .entry(header::CONTENT_TYPE)
                .or_insert(HeaderValue::from_static(ct));
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_empty_ok() {
        let res = Response::new().finalize();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers().get(header::CONTENT_TYPE), None);
    }

    #[test]
    fn text_body_is_plain_text() {
        let mut view = Response::new();
        view.set_body("hello");
        let res = view.finalize();
        assert_eq!(
            res.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
    }

    #[test]
    fn json_body_is_serialized() {
        let mut view = Response::new();
        view.set_body(serde_json::json!({ "id": 1 }));
        let res = view.finalize();
        assert_eq!(
            res.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn explicit_content_type_wins() {
        let mut view = Response::new();
        view.set_body("<p>hi</p>");
        view.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/html; charset=utf-8"),
        );
        let res = view.finalize();
        assert_eq!(
            res.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/html; charset=utf-8"
        );
    }

    #[test]
    fn last_write_wins() {
        let mut view = Response::new();
        view.set_body("first");
        view.set_status(StatusCode::ACCEPTED);
        view.set_body("second");
        assert!(matches!(view.body(), Body::Text(s) if s == "second"));
        assert_eq!(view.status(), StatusCode::ACCEPTED);
    }
}
