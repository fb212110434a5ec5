//! Minimal hexttp example: CRUD-style envelope handlers and health checks.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl -i http://localhost:3000/users/1
//!   curl -i http://localhost:3000/users/42 -H 'x-request-id: abc-123'
//!   curl -i -X POST http://localhost:3000/users -d '{"name":"alice"}'
//!   curl -i -X POST http://localhost:3000/users -d 'not json'
//!   curl -i -X DELETE http://localhost:3000/users/1
//!   curl -i http://localhost:3000/healthz

use std::collections::BTreeMap;

use hexttp::{Envelope, Request, Router, Server, health, make};
use serde::Deserialize;
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let app = Router::new()
        .get("/users/{id}",    make(get_user))
        .post("/users",        make(create_user))
        .delete("/users/{id}", make(delete_user))
        .get("/healthz",       make(health::liveness))
        .get("/readyz",        make(health::readiness));

    if let Err(e) = Server::bind("0.0.0.0:3000").serve(app).await {
        tracing::error!("server error: {e}");
    }
}

// GET /users/{id}
//   1      → 200 {"status":"OK","data":{...}}
//   other  → 404 {"status":"Not Found","msg":"user missing"}  + warn record
//   "boom" → 500 {"status":"Internal Server Error","msg":"internal error"} + error record
async fn get_user(req: Request) -> Envelope {
    match req.param("id") {
        Some("boom") => Envelope::internal_error("db timeout"),
        Some(id) => match id.parse::<u64>() {
            Ok(1) => Envelope::ok(json!({ "id": 1, "name": "alice" })),
            Ok(_) => Envelope::not_found("user missing"),
            Err(_) => Envelope::invalid_id(),
        },
        None => Envelope::invalid_id(),
    }
}

#[derive(Deserialize)]
struct NewUser {
    name: String,
}

// POST /users
async fn create_user(req: Request) -> Envelope {
    let Ok(input) = req.json::<NewUser>() else {
        return Envelope::invalid_json();
    };

    if input.name.len() < 2 {
        let mut fields = BTreeMap::new();
        fields.insert("name".to_owned(), "must be at least 2 characters".to_owned());
        return Envelope::invalid_request_data(fields);
    }

    Envelope::created(json!({ "id": 99, "name": input.name })).meta("location", "/users/99")
}

// DELETE /users/{id} → 204 No Content
async fn delete_user(_req: Request) -> Option<Envelope> {
    None
}
