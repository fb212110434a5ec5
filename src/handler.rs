//! Handler trait and type erasure.
//!
//! The router stores handlers of different concrete types in one map, so
//! each one is boxed behind `dyn ErasedHandler`:
//!
//! ```text
//! make(get_user)                        ← Dispatch<F>, the only Handler
//!        ↓ router.get("/users/{id}", …)
//! handler.into_boxed_handler()          ← Arc::new(dispatch)
//!        ↓
//! handler.call(req)  at request time    ← one vtable dispatch
//!        ↓
//! Box::pin(async { render(fut.await, &exchange) })
//! ```
//!
//! Per request that costs one Arc clone and one virtual call.
//!
//! `Handler` is sealed and implemented only by [`Dispatch`](crate::Dispatch),
//! so every registered route answers through the envelope adapter. A plain
//! function returning a status does not register:
//!
//! ```rust,compile_fail
//! use hexttp::{Request, Router, StatusCode};
//!
//! async fn raw(_req: Request) -> StatusCode {
//!     StatusCode::NOT_FOUND
//! }
//!
//! let _ = Router::new().get("/raw", raw);
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::Response;

/// A heap-allocated, type-erased future that resolves to a [`Response`].
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// A route handler the [`Router`](crate::Router) accepts.
///
/// Obtained from [`make`](crate::make); there is no other implementation.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

impl<H> Handler for H
where
    H: private::Sealed + ErasedHandler + Send + Sync + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(self)
    }
}

pub(crate) mod private {
    pub trait Sealed {}
}
