//! Middleware trait, type erasure, and onion composition.
//!
//! # How the chain is stored
//!
//! The application needs to hold middleware of *different* concrete types in
//! one ordered list. Rust collections can only hold one type, so we use
//! **trait objects** (`dyn ErasedMiddleware`) to hide each concrete
//! middleware behind a common interface.
//!
//! The chain from user code to vtable call is:
//!
//! ```text
//! async fn auth(ctx: Context, next: Next) -> Result<Context, Error> { … }
//!        ↓ app.use_fn(auth)
//! auth.into_boxed_middleware()                     ← Middleware blanket impl
//!        ↓
//! Arc::new(FnMiddleware(auth))                     ← heap-allocated wrapper
//!        ↓  stored as BoxedMiddleware = Arc<dyn ErasedMiddleware>
//! mw.handle(ctx, next)  at request time            ← one vtable dispatch
//! ```
//!
//! # How the chain executes
//!
//! [`Next`] is the continuation: the full middleware list plus a cursor.
//! `next.run(ctx)` invokes the middleware at the cursor with a `Next`
//! advanced by one; past the end it is the terminal no-op that hands the
//! context back. Each middleware therefore wraps everything registered after
//! it — code before its `next.run(ctx).await` runs on the way down the
//! onion, code after runs on the way back up, and skipping the call
//! short-circuits the rest of the chain entirely.
//!
//! Registration order is execution order: the first middleware registered is
//! the outermost layer.
//!
//! # Why double invocation cannot happen
//!
//! `Next::run` consumes both the continuation and the context. Invoking a
//! continuation twice — which would silently re-execute every downstream
//! middleware — is a compile error, not a runtime guard.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::Context;
use crate::error::Error;

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future carrying the context through the
/// chain, or the failure that aborted it.
///
/// `Pin<Box<…>>` is required because the async runtime must be able to poll
/// the future in-place — it cannot move it in memory after the first poll.
/// `Send + 'static` let tokio move the future across threads safely.
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Result<Context, Error>> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Middleware` trait's `into_boxed_middleware`
/// method. External crates cannot usefully interact with this trait.
#[doc(hidden)]
pub trait ErasedMiddleware {
    fn handle(&self, ctx: Context, next: Next) -> BoxFuture;
}

/// A heap-allocated, type-erased middleware shared across concurrent
/// requests.
///
/// `#[doc(hidden)] pub` for the same reason as `ErasedMiddleware`.
/// `Arc` gives cheap, thread-safe shared ownership — one atomic reference
/// count increment per invocation — without copying the middleware.
#[doc(hidden)]
pub type BoxedMiddleware = Arc<dyn ErasedMiddleware + Send + Sync + 'static>;

// ── Public Middleware trait ───────────────────────────────────────────────────

/// Implemented for every valid middleware.
///
/// You never implement this yourself. It is automatically satisfied for any
/// `async fn` with the signature:
///
/// ```text
/// async fn name(ctx: Context, next: Next) -> Result<Context, Error>
/// ```
///
/// The middleware may mutate `ctx` before awaiting `next.run(ctx)` (runs on
/// the way down), after it resolves (runs on the way up), or return without
/// calling it at all (short-circuits the chain). Returning `Err` aborts the
/// chain; the error propagates through every awaiting caller up to the
/// dispatch boundary, untouched.
///
/// The trait is **sealed** (via the private `Sealed` supertrait): only the
/// blanket impl below can satisfy it. This prevents accidental misuse and
/// keeps the API surface stable across versions.
pub trait Middleware: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_middleware(self) -> BoxedMiddleware;
}

/// The sealing module. Because `Sealed` is private, external crates cannot
/// name it and therefore cannot implement `Middleware` on their own types.
mod private {
    pub trait Sealed {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

impl<F, Fut> private::Sealed for F
where
    F: Fn(Context, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Context, Error>> + Send + 'static,
{
}

/// Implement `Middleware` for any function with the right signature:
/// named `async fn` items, closures returning futures, any struct
/// implementing `Fn`.
impl<F, Fut> Middleware for F
where
    F: Fn(Context, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Context, Error>> + Send + 'static,
{
    fn into_boxed_middleware(self) -> BoxedMiddleware {
        Arc::new(FnMiddleware(self))
    }
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

/// Newtype wrapper that holds a concrete middleware `F` and implements
/// [`ErasedMiddleware`], bridging the typed world to the trait-object world.
struct FnMiddleware<F>(F);

impl<F, Fut> ErasedMiddleware for FnMiddleware<F>
where
    F: Fn(Context, Next) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Context, Error>> + Send + 'static,
{
    fn handle(&self, ctx: Context, next: Next) -> BoxFuture {
        Box::pin((self.0)(ctx, next))
    }
}

// ── Next ─────────────────────────────────────────────────────────────────────

/// The continuation handed to each middleware: "run everything registered
/// after me".
///
/// Holds the shared middleware list and a cursor, so advancing the chain is
/// one `Arc` clone — no per-request allocation of continuations.
pub struct Next {
    stack: Arc<[BoxedMiddleware]>,
    index: usize,
}

impl Next {
    /// The composed chain entry point: a continuation positioned at the
    /// outermost middleware. Invoked exactly once per request.
    pub(crate) fn compose(stack: Arc<[BoxedMiddleware]>) -> Self {
        Self { stack, index: 0 }
    }

    /// Yields the context to the rest of the chain and resolves once every
    /// downstream middleware has resolved (or rejects with the first error).
    ///
    /// Consumes `self` and `ctx`: a continuation cannot be invoked twice.
    pub async fn run(self, ctx: Context) -> Result<Context, Error> {
        let Next { stack, index } = self;
        let middleware = stack.get(index).cloned();
        match middleware {
            Some(mw) => mw.handle(ctx, Next { stack, index: index + 1 }).await,
            // Terminal no-op: the innermost middleware called next.
            None => Ok(ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use bytes::Bytes;

    use crate::request::Request;

    fn ctx() -> Context {
        let (parts, _) = http::Request::builder().uri("/").body(()).unwrap().into_parts();
        Context::new(Request::new(parts, Bytes::new()))
    }

    fn recorder(log: &Arc<Mutex<Vec<String>>>, name: &str) -> BoxedMiddleware {
        let log = Arc::clone(log);
        let name = name.to_owned();
        let f = move |ctx: Context, next: Next| {
            let log = Arc::clone(&log);
            let name = name.clone();
            async move {
                log.lock().unwrap().push(format!("{name} down"));
                let ctx = next.run(ctx).await?;
                log.lock().unwrap().push(format!("{name} up"));
                Ok(ctx)
            }
        };
        f.into_boxed_middleware()
    }

    #[tokio::test]
    async fn empty_chain_is_a_no_op() {
        let chain = Next::compose(Vec::new().into());
        let ctx = chain.run(ctx()).await.unwrap();
        assert_eq!(ctx.status(), http::StatusCode::OK);
    }

    #[tokio::test]
    async fn onion_ordering() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let stack: Arc<[BoxedMiddleware]> = vec![
            recorder(&log, "m0"),
            recorder(&log, "m1"),
            recorder(&log, "m2"),
        ]
        .into();

        Next::compose(stack).run(ctx()).await.unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            ["m0 down", "m1 down", "m2 down", "m2 up", "m1 up", "m0 up"]
        );
    }

    #[tokio::test]
    async fn skipping_next_short_circuits() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log1 = Arc::clone(&log);
        let short = move |mut c: Context, _next: Next| {
            let log = Arc::clone(&log1);
            async move {
                log.lock().unwrap().push("short".to_owned());
                c.set_body("early");
                Ok(c)
            }
        };

        let stack: Arc<[BoxedMiddleware]> =
            vec![short.into_boxed_middleware(), recorder(&log, "never")].into();

        let ctx = Next::compose(stack).run(ctx()).await.unwrap();

        assert_eq!(*log.lock().unwrap(), ["short"]);
        assert!(matches!(ctx.body(), crate::Body::Text(s) if s == "early"));
    }

    #[tokio::test]
    async fn errors_propagate_through_awaiting_callers() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let failing = |_: Context, _: Next| async {
            Err::<Context, Error>(Error::internal("boom"))
        };

        let stack: Arc<[BoxedMiddleware]> = vec![
            recorder(&log, "outer"),
            failing.into_boxed_middleware(),
            recorder(&log, "inner"),
        ]
        .into();

        let err = Next::compose(stack).run(ctx()).await.unwrap_err();

        assert_eq!(err.message(), "boom");
        // The outer middleware never ran its way-up code, inner never ran.
        assert_eq!(*log.lock().unwrap(), ["outer down"]);
    }
}
