//! Middleware layer.
//!
//! Middleware intercepts requests and responses and is the right place for
//! cross-cutting concerns. hexttp ships one: request correlation. The
//! [`Router`](crate::Router) applies its [`Tagger`] to every request before
//! lookup, so envelope handlers and the dispatch adapter can always read the
//! identifier back from the request.

mod correlation;

pub use correlation::{Correlation, IdProvider, REQUEST_ID_HEADER, Tagger, UuidV4};
