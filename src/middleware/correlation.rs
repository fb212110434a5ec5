//! Request correlation: one identifier per request/response pair.
//!
//! The [`Tagger`] runs before routing. It reuses a client-supplied
//! `X-Request-ID` when there is one, otherwise asks its [`IdProvider`] for a
//! fresh token, and records when the request arrived. The resulting
//! [`Correlation`] is stored on the [`Request`] itself, so two in-flight
//! requests never see each other's context. On the way out the same
//! identifier is stamped on the response.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use http::header::{HeaderName, HeaderValue};
use rand::distributions::{Alphanumeric, DistString};
use tracing::warn;
use uuid::Uuid;

use crate::request::Request;
use crate::response::Response;

/// Header carrying the correlation identifier, both directions.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const FALLBACK_TOKEN_LEN: usize = 32;

// ── Correlation ───────────────────────────────────────────────────────────────

/// The correlation context of one request. Read-only once created.
#[derive(Debug, Clone)]
pub struct Correlation {
    id: String,
    started: Instant,
}

impl Correlation {
    pub(crate) fn new(id: String, started: Instant) -> Self {
        Self { id, started }
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn started(&self) -> Instant { self.started }

    /// Time since the request was tagged.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

// ── IdProvider ────────────────────────────────────────────────────────────────

/// Source of fresh correlation identifiers.
///
/// Returning `None` is allowed: the tagger then falls back to a random
/// 32-character alphanumeric token instead of failing the request.
pub trait IdProvider: Send + Sync + 'static {
    fn next_id(&self) -> Option<String>;
}

/// Default provider: hyphenated UUID v4 strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidV4;

impl IdProvider for UuidV4 {
    fn next_id(&self) -> Option<String> {
        Some(Uuid::new_v4().to_string())
    }
}

fn fallback_token() -> String {
    Alphanumeric.sample_string(&mut rand::thread_rng(), FALLBACK_TOKEN_LEN)
}

// ── Tagger ────────────────────────────────────────────────────────────────────

/// Assigns or propagates the correlation identifier of each request.
///
/// ```rust
/// use hexttp::middleware::Tagger;
///
/// let tagger = Tagger::default().header("x-correlation-id");
/// ```
#[derive(Clone)]
pub struct Tagger {
    header: HeaderName,
    provider: Arc<dyn IdProvider>,
}

impl Tagger {
    pub fn new() -> Self {
        Self {
            header: HeaderName::from_static(REQUEST_ID_HEADER),
            provider: Arc::new(UuidV4),
        }
    }

    /// Use a different header name for both the inbound and outbound side.
    ///
    /// # Panics
    ///
    /// Panics if `name` is not a valid lowercase header name. Call this at
    /// startup, like route registration.
    pub fn header(mut self, name: &'static str) -> Self {
        self.header = HeaderName::from_static(name);
        self
    }

    /// Replace the identifier source.
    pub fn provider(mut self, provider: impl IdProvider) -> Self {
        self.provider = Arc::new(provider);
        self
    }

    pub fn header_name(&self) -> &HeaderName { &self.header }

    /// Attaches a [`Correlation`] to `req` and returns a copy for the caller.
    ///
    /// Never fails: an absent, empty or non-ASCII header means a fresh id,
    /// and a provider that yields nothing usable means a random token.
    pub fn tag(&self, req: &mut Request) -> Correlation {
        let started = Instant::now();

        let id = match req.header(self.header.as_str()) {
            Some(id) if !id.is_empty() => id.to_owned(),
            _ => self.generate(),
        };

        let correlation = Correlation::new(id, started);
        req.correlation = Some(correlation.clone());
        correlation
    }

    /// Sets the correlation identifier on the outgoing response.
    pub fn stamp(&self, correlation: &Correlation, res: &mut Response) {
        // tag() only ever keeps ids that are valid header values.
        if let Ok(value) = HeaderValue::from_str(correlation.id()) {
            res.headers_mut().insert(self.header.clone(), value);
        }
    }

    fn generate(&self) -> String {
        match self.provider.next_id() {
            Some(id) if !id.is_empty() && HeaderValue::from_str(&id).is_ok() => id,
            Some(id) => {
                warn!(id = %id, "id provider returned an unusable token, using fallback");
                fallback_token()
            }
            None => fallback_token(),
        }
    }
}

impl Default for Tagger {
    fn default() -> Self { Self::new() }
}

impl fmt::Debug for Tagger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tagger").field("header", &self.header).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use bytes::Bytes;
    use http::StatusCode;

    use super::*;

    fn request(id: Option<&str>) -> Request {
        let mut builder = http::Request::builder().uri("/users/1");
        if let Some(id) = id {
            builder = builder.header("X-Request-ID", id);
        }
        builder.body(Bytes::new()).unwrap().into()
    }

    struct Broken;

    impl IdProvider for Broken {
        fn next_id(&self) -> Option<String> { None }
    }

    struct Garbage;

    impl IdProvider for Garbage {
        fn next_id(&self) -> Option<String> { Some("line\nbreak".to_owned()) }
    }

    #[test]
    fn client_id_is_passed_through() {
        let tagger = Tagger::default();
        let mut req = request(Some("abc-123"));

        let correlation = tagger.tag(&mut req);
        assert_eq!(correlation.id(), "abc-123");
        assert_eq!(req.request_id(), Some("abc-123"));

        let mut res = Response::status(StatusCode::OK);
        tagger.stamp(&correlation, &mut res);
        assert_eq!(res.headers()["x-request-id"], "abc-123");
    }

    #[test]
    fn missing_or_empty_header_generates_uuid() {
        let tagger = Tagger::default();

        for mut req in [request(None), request(Some(""))] {
            let correlation = tagger.tag(&mut req);
            assert!(Uuid::parse_str(correlation.id()).is_ok(), "{}", correlation.id());
        }
    }

    #[test]
    fn generated_ids_are_distinct() {
        let tagger = Tagger::default();
        let ids: HashSet<String> = (0..64)
            .map(|_| tagger.tag(&mut request(None)).id().to_owned())
            .collect();
        assert_eq!(ids.len(), 64);
    }

    #[test]
    fn failing_provider_falls_back_to_random_token() {
        for tagger in [Tagger::default().provider(Broken), Tagger::default().provider(Garbage)] {
            let correlation = tagger.tag(&mut request(None));
            assert_eq!(correlation.id().len(), FALLBACK_TOKEN_LEN);
            assert!(correlation.id().chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn custom_header_name() {
        let tagger = Tagger::default().header("x-correlation-id");
        let mut req: Request = http::Request::builder()
            .header("X-Correlation-ID", "corr-9")
            .body(Bytes::new())
            .unwrap()
            .into();

        let correlation = tagger.tag(&mut req);
        let mut res = Response::status(StatusCode::OK);
        tagger.stamp(&correlation, &mut res);

        assert_eq!(res.headers()["x-correlation-id"], "corr-9");
        assert!(res.headers().get(REQUEST_ID_HEADER).is_none());
    }

    #[test]
    fn elapsed_grows_from_start() {
        let correlation = Tagger::default().tag(&mut request(None));
        assert!(correlation.elapsed() >= Duration::ZERO);
        assert!(correlation.started() <= Instant::now());
    }
}
