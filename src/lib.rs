//! # hexttp
//!
//! Uniform JSON response envelopes and request correlation for hyper
//! services.
//!
//! ## The contract
//!
//! Handlers say *what happened*. hexttp decides how it looks on the wire and
//! whether it is worth a log line.
//!
//! - A handler returns an [`Envelope`] (or `None`): status, payload and a
//!   severity hint derived from the status class.
//! - [`make`] binds that handler to the dispatch adapter; the [`Router`]
//!   registers nothing else. The adapter writes
//!   `{"status","data","meta"?}` for success, `{"status","msg"}` for errors,
//!   and a bare `204` for nothing.
//! - Client errors log one `warn!` record, server errors one `error!`
//!   record, successes nothing. Handlers never log their own outcome.
//! - Every request carries a correlation id ([`middleware::Tagger`]): the
//!   client's `X-Request-ID` if it sent one, a fresh UUID v4 otherwise. The
//!   same id goes back on the response and into every log record.
//! - A `500` never leaks detail: the client reads `"internal error"`, the
//!   diagnostic goes to the log.
//!
//! Not in scope: content negotiation, authentication, anything a reverse
//! proxy already does. The [`Router`] and [`Server`] are the thinnest host
//! that makes the envelope protocol usable.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use hexttp::{Envelope, Request, Router, Server, make};
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Router::new()
//!         .get("/users/{id}", make(get_user))
//!         .post("/users", make(create_user));
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! async fn get_user(req: Request) -> Envelope {
//!     match req.param("id") {
//!         Some("1") => Envelope::ok(serde_json::json!({ "id": 1, "name": "alice" })),
//!         Some(_) => Envelope::not_found("user missing"),
//!         None => Envelope::invalid_id(),
//!     }
//! }
//!
//! #[derive(serde::Deserialize)]
//! struct NewUser { name: String }
//!
//! async fn create_user(req: Request) -> Envelope {
//!     let Ok(input) = req.json::<NewUser>() else {
//!         return Envelope::invalid_json();
//!     };
//!     Envelope::created(serde_json::json!({ "id": 2, "name": input.name }))
//! }
//! ```

mod dispatch;
mod envelope;
mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod health;
pub mod middleware;

#[cfg(test)]
mod test_support;

pub use dispatch::{Dispatch, Exchange, make, render};
pub use envelope::{Envelope, Payload, Severity};
pub use error::Error;
pub use handler::Handler;
pub use http::{Method, StatusCode};
pub use request::Request;
pub use response::{Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
