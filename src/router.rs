//! Radix-tree request router with request correlation.
//!
//! One tree per HTTP method, O(path-length) lookup. Every request, matched or
//! not, is tagged with a correlation id before lookup and the id is stamped
//! on the response after the handler returns.

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use matchit::Router as MatchitRouter;

use crate::dispatch::{Exchange, render};
use crate::envelope::Envelope;
use crate::handler::{BoxedHandler, Handler};
use crate::middleware::Tagger;
use crate::request::Request;
use crate::response::Response;

/// The application router.
///
/// Build it once at startup and pass it to [`Server::serve`](crate::Server::serve).
/// Registration methods return `self` so calls chain.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    tagger: Tagger,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new(), tagger: Tagger::default() }
    }

    /// Register a handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax, read back with `req.param("name")`.
    ///
    /// # Panics
    ///
    /// Panics if the path is not a valid route or conflicts with one already
    /// registered for the same method.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::GET, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::POST, path, handler)
    }

    pub fn put(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::PUT, path, handler)
    }

    pub fn patch(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::PATCH, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::DELETE, path, handler)
    }

    /// Replace the default `X-Request-ID` / UUID v4 tagger.
    pub fn tagger(mut self, tagger: Tagger) -> Self {
        self.tagger = tagger;
        self
    }

    /// Tags, routes and answers one request.
    ///
    /// Unmatched routes get a `404 {"status":"Not Found","msg":"route not found"}`
    /// through the same dispatch path as handler envelopes.
    pub async fn handle(&self, mut req: Request) -> Response {
        let correlation = self.tagger.tag(&mut req);

        let mut res = match self.lookup(req.method(), req.path()) {
            Some((handler, params)) => {
                req.params = params;
                handler.call(req).await
            }
            None => render(Some(Envelope::not_found("route not found")), &Exchange::of(&req)),
        };

        self.tagger.stamp(&correlation, &mut res);
        res
    }

    /// Answers a request the host could not hand to a route (for instance
    /// because its body could not be read) with `envelope`. The request is
    /// still tagged, logged and stamped like any routed one.
    pub(crate) fn reject(&self, mut req: Request, envelope: Envelope) -> Response {
        let correlation = self.tagger.tag(&mut req);
        let mut res = render(Some(envelope), &Exchange::of(&req));
        self.tagger.stamp(&correlation, &mut res);
        res
    }

    fn lookup(
        &self,
        method: &Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}
