//! Built-in Kubernetes health-check handlers.
//!
//! | Check | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can the pod serve traffic? Failure → pulled from load-balancer. |
//!
//! Both are envelope handlers, so they answer with the same JSON shape as the
//! rest of the API and carry the request id like any other route:
//!
//! ```rust,no_run
//! use hexttp::{Router, health, make};
//!
//! let app = Router::new()
//!     .get("/healthz", make(health::liveness))
//!     .get("/readyz", make(health::readiness));
//! ```
//!
//! Gate readiness on your dependencies with your own handler:
//!
//! ```rust,no_run
//! use hexttp::{Envelope, Request, StatusCode};
//!
//! async fn readiness(_req: Request) -> Envelope {
//!     if dependencies_are_healthy().await {
//!         Envelope::ok("ready")
//!     } else {
//!         Envelope::new(StatusCode::SERVICE_UNAVAILABLE, "not ready")
//!     }
//! }
//!
//! async fn dependencies_are_healthy() -> bool { true }
//! ```

use crate::{Envelope, Request};

/// Always `200 {"status":"OK","data":"ok"}`. No dependencies.
pub async fn liveness(_req: Request) -> Envelope {
    Envelope::ok("ok")
}

/// Default readiness: `200 {"status":"OK","data":"ready"}`.
pub async fn readiness(_req: Request) -> Envelope {
    Envelope::ok("ready")
}
