//! Application: middleware registration, per-request dispatch, and the
//! error boundary.
//!
//! [`App`] is configuration: an ordered middleware list and an error-observer
//! list, both frozen when serving begins. [`Dispatcher`] is the per-request
//! handler handed to the transport: it builds a fresh [`Context`], runs the
//! composed chain exactly once, and finalizes whatever the chain left behind.
//!
//! A request moves through four states: context *created*, chain *composing*,
//! then *resolved* (normal finalization from `ctx.body`/`ctx.status`) or
//! *failed* (the error boundary below), and finally *responded*.

use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use tracing::{debug, error};

use crate::context::Context;
use crate::error::Error;
use crate::middleware::{BoxedMiddleware, Middleware, Next};
use crate::request::Request;
use crate::response::Response;
use crate::server::Server;

/// An error observer registered via [`App::on_error`].
type ErrorObserver = Arc<dyn Fn(&Error) + Send + Sync + 'static>;

// ── App ──────────────────────────────────────────────────────────────────────

/// The application: an ordered middleware chain plus error observers.
///
/// Build it once at startup; registration order is execution order. Each
/// call returns `self` so registrations chain naturally:
///
/// ```rust,no_run
/// use kawa::{App, Context, Error, Next};
///
/// #[tokio::main]
/// async fn main() {
///     let app = App::new()
///         .use_fn(log)
///         .use_fn(hello)
///         .on_error(|err| eprintln!("request failed: {err}"));
///
///     app.listen("0.0.0.0:3000").await.unwrap();
/// }
///
/// async fn log(ctx: Context, next: Next) -> Result<Context, Error> {
///     let path = ctx.request.path().to_owned();
///     let ctx = next.run(ctx).await?;          // yield downstream
///     println!("{path} -> {}", ctx.status());  // runs on the way back up
///     Ok(ctx)
/// }
///
/// async fn hello(mut ctx: Context, next: Next) -> Result<Context, Error> {
///     ctx.set_body("hello");
///     next.run(ctx).await
/// }
/// ```
pub struct App {
    stack: Vec<BoxedMiddleware>,
    observers: Vec<ErrorObserver>,
}

impl App {
    pub fn new() -> Self {
        Self { stack: Vec::new(), observers: Vec::new() }
    }

    /// Appends a middleware to the chain. Returns `self` for chaining.
    ///
    /// The first middleware registered is the outermost layer of the onion:
    /// it runs first on the way down and last on the way up.
    pub fn use_fn(mut self, middleware: impl Middleware) -> Self {
        self.stack.push(middleware.into_boxed_middleware());
        self
    }

    /// Subscribes an observer to chain failures. Returns `self` for chaining.
    ///
    /// Every observer is called with each error the dispatch boundary
    /// catches, after the error response has been prepared. Zero observers
    /// is a valid, silent state — errors are still mapped and responded to.
    pub fn on_error(mut self, observer: impl Fn(&Error) + Send + Sync + 'static) -> Self {
        self.observers.push(Arc::new(observer));
        self
    }

    /// Freezes the configuration into the per-request handler handed to the
    /// transport.
    pub fn into_dispatcher(self) -> Dispatcher {
        Dispatcher {
            stack: self.stack.into(),
            observers: self.observers.into(),
        }
    }

    /// Binds `addr` and serves this application until graceful shutdown.
    ///
    /// Shorthand for [`Server::bind(addr).serve(app)`](Server::serve).
    pub async fn listen(self, addr: &str) -> Result<(), Error> {
        Server::bind(addr).serve(self).await
    }
}

impl Default for App {
    fn default() -> Self { Self::new() }
}

// ── Dispatcher ───────────────────────────────────────────────────────────────

/// The per-request handler: one of these (cheaply cloned, two `Arc`s) serves
/// every request of every connection.
#[derive(Clone)]
pub struct Dispatcher {
    stack: Arc<[BoxedMiddleware]>,
    observers: Arc<[ErrorObserver]>,
}

impl Dispatcher {
    /// Drives one request through the chain and produces its wire response.
    ///
    /// Generic over the request body so the server can pass
    /// `hyper::body::Incoming` and tests can pass `Full<Bytes>`. Never
    /// fails: every error becomes a response via the boundary below.
    pub async fn dispatch<B>(&self, req: http::Request<B>) -> http::Response<Full<Bytes>>
    where
        B: hyper::body::Body<Data = Bytes> + Send,
        B::Error: std::fmt::Display,
    {
        let (parts, body) = req.into_parts();
        let body = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                return self.fail(Error::internal(format!("failed to read request body: {e}")));
            }
        };

        // One fresh context per request; nothing outlives the response.
        let ctx = Context::new(Request::new(parts, body));

        match Next::compose(Arc::clone(&self.stack)).run(ctx).await {
            Ok(ctx) => {
                debug!(status = %ctx.status(), "chain resolved");
                ctx.response.finalize()
            }
            Err(err) => self.fail(err),
        }
    }

    /// The single centralized error boundary.
    ///
    /// Maps the failure to a status code, writes its message as a plain-text
    /// body, then notifies every observer with the original error.
    fn fail(&self, err: Error) -> http::Response<Full<Bytes>> {
        error!(status = %err.status(), "chain failed: {err}");

        let mut response = Response::new();
        response.set_status(err.status());
        response.set_body(err.message());
        let wire = response.finalize();

        for observer in self.observers.iter() {
            (**observer)(&err);
        }

        wire
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn noop(ctx: Context, next: Next) -> Result<Context, Error> {
        next.run(ctx).await
    }

    #[test]
    fn registration_preserves_call_order() {
        let app = App::new().use_fn(noop).use_fn(noop).use_fn(noop);
        assert_eq!(app.stack.len(), 3);

        let before: Vec<_> = app.stack.iter().map(Arc::as_ptr).collect();
        let dispatcher = app.into_dispatcher();
        let after: Vec<_> = dispatcher.stack.iter().map(Arc::as_ptr).collect();
        // Freezing must not reorder the chain.
        assert_eq!(before, after);
    }

    #[test]
    fn zero_observers_is_valid() {
        let dispatcher = App::new().into_dispatcher();
        assert!(dispatcher.observers.is_empty());
    }
}
