//! Minimal kawa example — an onion of three middleware plus an error observer.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/
//!   curl 'http://localhost:3000/greet?name=alice'
//!   curl -i http://localhost:3000/boom
//!   curl -i http://localhost:3000/missing

use kawa::{App, Context, Error, Next, StatusCode};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let app = App::new()
        .use_fn(access_log)
        .use_fn(fail_routes)
        .use_fn(greet)
        .on_error(|err| eprintln!("observed failure: {err}"));

    app.listen("0.0.0.0:3000").await.expect("server error");
}

// Outermost: logs on the way back up, after everything downstream resolved.
async fn access_log(ctx: Context, next: Next) -> Result<Context, Error> {
    let path = ctx.request.path().to_owned();
    let ctx = next.run(ctx).await?;
    println!("{path} -> {}", ctx.status());
    Ok(ctx)
}

// Demonstrates the error boundary: these paths abort the chain before the
// greeting middleware ever runs.
async fn fail_routes(ctx: Context, next: Next) -> Result<Context, Error> {
    match ctx.request.path() {
        "/boom" => Err(Error::internal("something broke")),
        "/missing" => Err(Error::not_found("no such page")),
        _ => next.run(ctx).await,
    }
}

// Innermost: sets the body, then a JSON body on the way up for /greet.
async fn greet(mut ctx: Context, next: Next) -> Result<Context, Error> {
    let name = ctx.query().get("name").unwrap_or("world").to_owned();
    ctx.set_body(format!("hello, {name}"));

    let mut ctx = next.run(ctx).await?;

    if ctx.request.path() == "/greet" {
        ctx.set_body(serde_json::json!({ "greeting": format!("hello, {name}") }));
        ctx.set_status(StatusCode::OK);
    }
    Ok(ctx)
}
