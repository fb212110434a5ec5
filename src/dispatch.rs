//! Dispatch adapter: envelope handlers in, transport handlers out.
//!
//! ```text
//! async fn get_user(req: Request) -> Envelope { … }  ← user writes this
//!        ↓ make(get_user)
//! Exchange::of(&req)                                ← path + correlation, taken
//!        ↓                                            before the handler owns req
//! get_user(req).await                               ← Envelope or None
//!        ↓ render(envelope, &exchange)
//! 204, no body           if None or 204
//! status + JSON body     otherwise
//! one warn!/error!       if the severity asks for it
//! ```
//!
//! This is the only place where a [`Severity`] becomes a log record.
//! Handlers never log their own outcome.

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use http::StatusCode;
use tracing::{error, warn};

use crate::envelope::{Envelope, Severity};
use crate::handler::{BoxFuture, ErasedHandler, private};
use crate::middleware::Correlation;
use crate::request::Request;
use crate::response::Response;

const INTERNAL_ERROR_BODY: &[u8] = br#"{"status":"Internal Server Error","msg":"internal error"}"#;

/// What the adapter needs to remember about a request after the handler
/// has taken ownership of it.
#[derive(Debug, Clone)]
pub struct Exchange {
    path: String,
    correlation: Option<Correlation>,
}

impl Exchange {
    pub fn of(req: &Request) -> Self {
        Self {
            path: req.path().to_owned(),
            correlation: req.correlation().cloned(),
        }
    }

    pub fn path(&self) -> &str { &self.path }

    /// The correlation id, or `""` for an untagged request.
    pub fn request_id(&self) -> &str {
        self.correlation.as_ref().map_or("", Correlation::id)
    }

    pub fn elapsed(&self) -> Duration {
        self.correlation.as_ref().map_or(Duration::ZERO, Correlation::elapsed)
    }
}

/// Wraps an envelope handler into the [`Dispatch`] the router registers.
///
/// The handler may return [`Envelope`] or `Option<Envelope>`; `None` means
/// "nothing to say" and is written as `204 No Content`.
///
/// ```rust,no_run
/// use hexttp::{Envelope, Request, Router, make};
///
/// async fn get_user(req: Request) -> Envelope {
///     match req.param("id").map(str::parse::<u64>) {
///         Some(Ok(id)) => Envelope::ok(serde_json::json!({ "id": id })),
///         _ => Envelope::invalid_id(),
///     }
/// }
///
/// let app = Router::new().get("/users/{id}", make(get_user));
/// ```
pub fn make<F, Fut, R>(handler: F) -> Dispatch<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Into<Option<Envelope>> + Send + 'static,
{
    Dispatch(handler)
}

/// An envelope handler bound to the dispatch adapter. Built by [`make`].
pub struct Dispatch<F>(F);

impl<F, Fut, R> private::Sealed for Dispatch<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Into<Option<Envelope>> + Send + 'static,
{
}

impl<F, Fut, R> ErasedHandler for Dispatch<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Into<Option<Envelope>> + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let exchange = Exchange::of(&req);
        let outcome = (self.0)(req);
        Box::pin(async move { render(outcome.await.into(), &exchange) })
    }
}

/// Serializes an envelope into a [`Response`] and emits its log record.
///
/// Exactly one response comes out, and at most one log record:
/// - `None` or `204`: bare `204`, nothing logged.
/// - otherwise: `application/json` body, logged at warn/error per severity.
/// - body that cannot be encoded: fixed `500` body, logged at error.
pub fn render(envelope: Option<Envelope>, exchange: &Exchange) -> Response {
    let Some(envelope) = envelope.filter(|e| e.status != StatusCode::NO_CONTENT) else {
        return Response::status(StatusCode::NO_CONTENT);
    };

    let body = match envelope.encode() {
        Ok(body) => body,
        Err(err) => {
            error!(
                requestID = exchange.request_id(),
                duration = ?exchange.elapsed(),
                status = StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                path = exchange.path(),
                body = "internal error",
                attempted = envelope.status.as_u16(),
                error = %err,
                "failed to encode response body"
            );
            return Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .json(Bytes::from_static(INTERNAL_ERROR_BODY));
        }
    };

    log_outcome(&envelope, exchange);

    Response::builder().status(envelope.status).json(body)
}

fn log_outcome(envelope: &Envelope, exchange: &Exchange) {
    let status = envelope.status.as_u16();
    let body = envelope.body().map_or_else(|| "null".to_owned(), ToString::to_string);

    match envelope.severity {
        Severity::Error => error!(
            requestID = exchange.request_id(),
            duration = ?exchange.elapsed(),
            status,
            path = exchange.path(),
            body = %body,
            diagnostic = envelope.diagnostic(),
            "HTTP API error"
        ),
        Severity::Warn => warn!(
            requestID = exchange.request_id(),
            duration = ?exchange.elapsed(),
            status,
            path = exchange.path(),
            body = %body,
            "client error"
        ),
        Severity::None => {}
    }
}
