//! Per-request context and field delegation.
//!
//! # Why delegation?
//!
//! `Context` stores nothing of its own — every field physically lives on the
//! [`Request`] or [`Response`] view it embeds. Middleware still read and
//! write `ctx.query()`, `ctx.body()`, `ctx.set_status(..)` directly, without
//! knowing (or caring) which view owns the field.
//!
//! The forwarding accessors are generated from the two declarative tables at
//! the bottom of this file, `delegate_get!` and `delegate_set!`. Adding a
//! convenience field to the context is one line in a table, not a
//! hand-written accessor pair, and the tables are compiled once — the views
//! they forward to are created fresh per request at no extra cost.

use http::StatusCode;

use crate::request::{Query, Request};
use crate::response::{Body, Response};

/// The per-request aggregate threaded through the middleware chain.
///
/// Created fresh for every inbound request and dropped once the response is
/// written; never reused or shared across requests. Middleware receive it by
/// value, pass it down the chain through [`Next::run`](crate::Next::run), and
/// get it back when downstream resolves — mutation before and after `next`
/// both land on the same views.
///
/// The embedded views are public for direct access; the delegated accessors
/// below cover the common fields.
#[derive(Debug)]
pub struct Context {
    pub request: Request,
    pub response: Response,
}

impl Context {
    pub(crate) fn new(request: Request) -> Self {
        Self { request, response: Response::new() }
    }
}

// ── Delegation tables ─────────────────────────────────────────────────────────

/// Read delegation: `field -> return type`, forwarded to the named view.
macro_rules! delegate_get {
    ($target:ident => $( $(#[$meta:meta])* $field:ident -> $ty:ty ),+ $(,)?) => {
        impl Context {
            $(
                $(#[$meta])*
                pub fn $field(&self) -> $ty {
                    self.$target.$field()
                }
            )+
        }
    };
}

/// Write delegation: `setter(value type)`, forwarded to the named view.
macro_rules! delegate_set {
    ($target:ident => $( $(#[$meta:meta])* $setter:ident($ty:ty) ),+ $(,)?) => {
        impl Context {
            $(
                $(#[$meta])*
                pub fn $setter(&mut self, value: $ty) {
                    self.$target.$setter(value)
                }
            )+
        }
    };
}

delegate_get!(request =>
    /// Parsed query parameters, delegated to [`Request::query`].
    query -> Query,
);

delegate_get!(response =>
    /// The response body as last set, delegated to [`Response::body`].
    body -> &Body,
    /// The response status, delegated to [`Response::status`].
    status -> StatusCode,
);

delegate_set!(response =>
    /// Sets the response body, delegated to [`Response::set_body`].
    set_body(impl Into<Body>),
    /// Sets the response status, delegated to [`Response::set_status`].
    set_status(StatusCode),
);

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn ctx(uri: &str) -> Context {
        let (parts, _) = http::Request::builder()
            .uri(uri)
            .body(())
            .unwrap()
            .into_parts();
        Context::new(Request::new(parts, Bytes::new()))
    }

    #[test]
    fn reads_delegate_to_the_owning_view() {
        let ctx = ctx("/x?a=1&a=2&b=3");
        assert_eq!(ctx.query().get("a"), Some("2"));
        assert_eq!(ctx.status(), StatusCode::OK);
        assert!(matches!(ctx.body(), Body::Empty));
    }

    #[test]
    fn writes_delegate_to_the_response_view() {
        let mut ctx = ctx("/");
        ctx.set_body("hello");
        ctx.set_status(StatusCode::CREATED);
        assert!(matches!(ctx.response.body(), Body::Text(s) if s == "hello"));
        assert_eq!(ctx.response.status(), StatusCode::CREATED);
    }
}
