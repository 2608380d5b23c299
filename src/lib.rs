//! # kawa
//!
//! A minimal Koa-style async middleware framework.
//! Nothing more. Nothing less.
//!
//! ## The contract
//!
//! An application is an ordered list of middleware. Each inbound request
//! gets one fresh [`Context`]; the middleware are composed into a single
//! onion-shaped chain around it and run exactly once — strictly in
//! registration order on the way down, strictly in reverse on the way up.
//! A middleware decides whether downstream runs at all by awaiting (or
//! skipping) its continuation, [`Next`].
//!
//! What kawa is not: a router, a connection pool, or a protocol
//! implementation. HTTP framing belongs to hyper; request-scoped control
//! flow belongs here.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use kawa::{App, Context, Error, Next};
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = App::new()
//!         .use_fn(timing)
//!         .use_fn(hello)
//!         .on_error(|err| eprintln!("request failed: {err}"));
//!
//!     app.listen("0.0.0.0:3000").await.unwrap();
//! }
//!
//! // Outermost layer: work before `next` runs on the way down,
//! // work after `next` runs on the way back up.
//! async fn timing(ctx: Context, next: Next) -> Result<Context, Error> {
//!     let start = std::time::Instant::now();
//!     let ctx = next.run(ctx).await?;
//!     println!("handled in {:?}", start.elapsed());
//!     Ok(ctx)
//! }
//!
//! async fn hello(mut ctx: Context, next: Next) -> Result<Context, Error> {
//!     let name = ctx.query().get("name").unwrap_or("world").to_owned();
//!     ctx.set_body(format!("hello, {name}"));
//!     next.run(ctx).await
//! }
//! ```
//!
//! ## Errors
//!
//! Middleware abort the chain by returning [`Error`]; nothing catches it on
//! the way up except the dispatch boundary, which maps it to a status code
//! (404 for [`Error::NotFound`], 500 otherwise), writes the message as the
//! response body, and notifies any observers registered with
//! [`App::on_error`]. A middleware failure never crashes the process.

mod app;
mod context;
mod error;
mod middleware;
mod request;
mod response;
mod server;

pub use app::{App, Dispatcher};
pub use context::Context;
pub use error::Error;
pub use middleware::{Middleware, Next};
pub use request::{Query, Request};
pub use response::{Body, Response};
pub use server::Server;

// The status half of the context surface is plain `http::StatusCode`;
// re-exported so applications do not need a direct `http` dependency.
pub use http::StatusCode;
