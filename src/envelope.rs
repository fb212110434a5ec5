//! The response envelope: what a handler says happened.
//!
//! An [`Envelope`] is a status code, an optional [`Payload`] and a
//! [`Severity`] hint. It knows nothing about headers or sockets. The
//! dispatch adapter turns it into one of two wire shapes:
//!
//! ```text
//! status <  400   {"status": "<reason>", "data": <payload>, "meta"?: {...}}
//! status >= 400   {"status": "<reason>", "msg":  <payload>}
//! ```
//!
//! | Constructor                       | Status | Severity | Body                   |
//! |-----------------------------------|--------|----------|------------------------|
//! | [`ok`](Envelope::ok)              | 200    | none     | data                   |
//! | [`created`](Envelope::created)    | 201    | none     | data                   |
//! | [`updated`](Envelope::updated)    | 202    | none     | data                   |
//! | [`no_content`](Envelope::no_content) | 204 | none     | none                   |
//! | [`invalid_json`](Envelope::invalid_json) | 400 | warn | `"invalid body request"` |
//! | [`invalid_request_data`](Envelope::invalid_request_data) | 400 | warn | field → message |
//! | [`invalid_id`](Envelope::invalid_id) | 400 | warn     | `"invalid id"`         |
//! | [`unauthorized`](Envelope::unauthorized) | 401 | warn | `"unauthorized"`       |
//! | [`forbidden`](Envelope::forbidden) | 403   | warn     | `"forbidden"`          |
//! | [`not_found`](Envelope::not_found) | 404   | warn     | error text             |
//! | [`already_exist`](Envelope::already_exist) | 409 | warn | error text           |
//! | [`internal_error`](Envelope::internal_error) | 500 | error | `"internal error"` |

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use http::StatusCode;
use serde::Serialize;
use serde_json::{Map, Value};

// ── Severity ──────────────────────────────────────────────────────────────────

/// Log-severity hint carried by an envelope.
///
/// Always derived from the status class, never picked by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    None,
    Warn,
    Error,
}

impl Severity {
    /// 5xx → `Error`, 4xx → `Warn`, anything else → `None`.
    pub fn for_status(status: StatusCode) -> Self {
        if status.is_server_error() {
            Self::Error
        } else if status.is_client_error() {
            Self::Warn
        } else {
            Self::None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None  => "",
            Self::Warn  => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Payload ───────────────────────────────────────────────────────────────────

/// The dynamic body of an envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Text(String),
    Fields(BTreeMap<String, String>),
    Json(Value),
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self { Self::Text(s.to_owned()) }
}

impl From<String> for Payload {
    fn from(s: String) -> Self { Self::Text(s) }
}

impl From<BTreeMap<String, String>> for Payload {
    fn from(fields: BTreeMap<String, String>) -> Self { Self::Fields(fields) }
}

impl From<HashMap<String, String>> for Payload {
    fn from(fields: HashMap<String, String>) -> Self { Self::Fields(fields.into_iter().collect()) }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self { Self::Json(value) }
}

/// Text payloads print as-is; structured ones as compact JSON.
impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            other => match serde_json::to_string(other) {
                Ok(json) => f.write_str(&json),
                Err(_) => write!(f, "{other:?}"),
            },
        }
    }
}

// ── Envelope ──────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub(crate) enum Body {
    Empty,
    Ready(Payload),
    /// The handler's data could not be turned into JSON. Kept until dispatch
    /// so the failure is logged there instead of panicking in the handler.
    Unencodable(serde_json::Error),
}

impl Body {
    fn encode(data: impl Serialize) -> Self {
        match serde_json::to_value(data) {
            Ok(value) => Self::Ready(Payload::Json(value)),
            Err(err) => Self::Unencodable(err),
        }
    }
}

/// A handler outcome. Built once, never modified, consumed by dispatch.
#[derive(Debug)]
#[must_use]
pub struct Envelope {
    pub(crate) status: StatusCode,
    pub(crate) body: Body,
    pub(crate) meta: Option<Map<String, Value>>,
    pub(crate) severity: Severity,
    pub(crate) diagnostic: Option<String>,
}

impl Envelope {
    fn with_body(status: StatusCode, body: Body) -> Self {
        Self {
            status,
            body,
            meta: None,
            severity: Severity::for_status(status),
            diagnostic: None,
        }
    }

    fn message(status: StatusCode, payload: impl Into<Payload>) -> Self {
        Self::with_body(status, Body::Ready(payload.into()))
    }

    /// Any status with any serializable data. The severity still follows
    /// the status class.
    pub fn new(status: StatusCode, data: impl Serialize) -> Self {
        Self::with_body(status, Body::encode(data))
    }

    pub fn ok(data: impl Serialize) -> Self {
        Self::new(StatusCode::OK, data)
    }

    pub fn created(data: impl Serialize) -> Self {
        Self::new(StatusCode::CREATED, data)
    }

    /// `202 Accepted`.
    pub fn updated(data: impl Serialize) -> Self {
        Self::new(StatusCode::ACCEPTED, data)
    }

    pub fn no_content() -> Self {
        Self::with_body(StatusCode::NO_CONTENT, Body::Empty)
    }

    /// The request body could not be decoded.
    pub fn invalid_json() -> Self {
        Self::message(StatusCode::BAD_REQUEST, "invalid body request")
    }

    /// Field-level validation failures, `field → message`.
    pub fn invalid_request_data<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let fields = fields.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self::message(StatusCode::BAD_REQUEST, Payload::Fields(fields))
    }

    pub fn invalid_id() -> Self {
        Self::message(StatusCode::BAD_REQUEST, "invalid id")
    }

    pub fn not_found(err: impl fmt::Display) -> Self {
        Self::message(StatusCode::NOT_FOUND, err.to_string())
    }

    pub fn already_exist(err: impl fmt::Display) -> Self {
        Self::message(StatusCode::CONFLICT, err.to_string())
    }

    /// `500` with the fixed client message `"internal error"`.
    ///
    /// `msg` never reaches the client. It is kept as the envelope's
    /// diagnostic and written to the error log record.
    pub fn internal_error(msg: impl Into<String>) -> Self {
        Self {
            diagnostic: Some(msg.into()),
            ..Self::message(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }

    pub fn unauthorized() -> Self {
        Self::message(StatusCode::UNAUTHORIZED, "unauthorized")
    }

    pub fn forbidden() -> Self {
        Self::message(StatusCode::FORBIDDEN, "forbidden")
    }

    /// Adds an entry to the success body's `meta` object (pagination,
    /// cursors, counts). Ignored on the wire for error statuses.
    pub fn meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.get_or_insert_with(Map::new).insert(key.into(), value.into());
        self
    }

    pub fn status(&self) -> StatusCode { self.status }
    pub fn severity(&self) -> Severity { self.severity }

    /// The payload, if there is one and it could be encoded.
    pub fn body(&self) -> Option<&Payload> {
        match &self.body {
            Body::Ready(payload) => Some(payload),
            Body::Empty | Body::Unencodable(_) => None,
        }
    }

    pub fn meta_map(&self) -> Option<&Map<String, Value>> { self.meta.as_ref() }
    pub fn diagnostic(&self) -> Option<&str> { self.diagnostic.as_deref() }

    /// Serializes the wire body.
    pub(crate) fn encode(&self) -> Result<Vec<u8>, EncodeError<'_>> {
        let payload = match &self.body {
            Body::Ready(payload) => Some(payload),
            Body::Empty => None,
            Body::Unencodable(err) => return Err(EncodeError::Payload(err)),
        };
        let status = self.status.canonical_reason().unwrap_or_default();

        let wire = if self.status.as_u16() >= 400 {
            WireBody::Failure { status, msg: payload }
        } else {
            WireBody::Success { status, data: payload, meta: self.meta.as_ref() }
        };
        serde_json::to_vec(&wire).map_err(EncodeError::Wire)
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum WireBody<'a> {
    Success {
        status: &'static str,
        data: Option<&'a Payload>,
        #[serde(skip_serializing_if = "Option::is_none")]
        meta: Option<&'a Map<String, Value>>,
    },
    Failure {
        status: &'static str,
        msg: Option<&'a Payload>,
    },
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum EncodeError<'a> {
    #[error("payload is not serializable: {0}")]
    Payload(&'a serde_json::Error),
    #[error("wire body encoding failed: {0}")]
    Wire(serde_json::Error),
}

#[cfg(test)]
mod tests {
    use serde::ser::{Error as _, Serializer};
    use serde_json::json;

    use super::*;

    fn wire(envelope: &Envelope) -> Value {
        serde_json::from_slice(&envelope.encode().unwrap()).unwrap()
    }

    fn keys(value: &Value) -> Vec<&str> {
        let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    struct Opaque;

    impl Serialize for Opaque {
        fn serialize<S: Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("opaque handle"))
        }
    }

    #[test]
    fn constructor_table() {
        let cases = [
            (Envelope::ok(1), 200, Severity::None),
            (Envelope::created(1), 201, Severity::None),
            (Envelope::updated(1), 202, Severity::None),
            (Envelope::no_content(), 204, Severity::None),
            (Envelope::invalid_json(), 400, Severity::Warn),
            (Envelope::invalid_request_data(BTreeMap::<String, String>::new()), 400, Severity::Warn),
            (Envelope::invalid_id(), 400, Severity::Warn),
            (Envelope::unauthorized(), 401, Severity::Warn),
            (Envelope::forbidden(), 403, Severity::Warn),
            (Envelope::not_found("x"), 404, Severity::Warn),
            (Envelope::already_exist("x"), 409, Severity::Warn),
            (Envelope::internal_error("x"), 500, Severity::Error),
        ];

        for (envelope, status, severity) in cases {
            assert_eq!(envelope.status().as_u16(), status);
            assert_eq!(envelope.severity(), severity, "status {status}");
        }
    }

    #[test]
    fn fixed_messages() {
        assert_eq!(Envelope::invalid_json().body(), Some(&Payload::from("invalid body request")));
        assert_eq!(Envelope::invalid_id().body(), Some(&Payload::from("invalid id")));
        assert_eq!(Envelope::unauthorized().body(), Some(&Payload::from("unauthorized")));
        assert_eq!(Envelope::forbidden().body(), Some(&Payload::from("forbidden")));
        assert_eq!(Envelope::no_content().body(), None);
    }

    #[test]
    fn severity_follows_status_class() {
        assert_eq!(Envelope::new(StatusCode::IM_A_TEAPOT, "tea").severity(), Severity::Warn);
        assert_eq!(Envelope::new(StatusCode::BAD_GATEWAY, "down").severity(), Severity::Error);
        assert_eq!(Envelope::new(StatusCode::FOUND, "/x").severity(), Severity::None);
        assert_eq!(Severity::Warn.to_string(), "warn");
        assert_eq!(Severity::None.as_str(), "");
    }

    #[test]
    fn success_shape() {
        let body = wire(&Envelope::ok(json!({"id": 1})));
        assert_eq!(body, json!({"status": "OK", "data": {"id": 1}}));

        let body = wire(&Envelope::created(json!([1, 2])).meta("total", 2));
        assert_eq!(keys(&body), ["data", "meta", "status"]);
        assert_eq!(body["status"], "Created");
        assert_eq!(body["meta"], json!({"total": 2}));
    }

    #[test]
    fn error_shape() {
        let body = wire(&Envelope::not_found("user missing"));
        assert_eq!(body, json!({"status": "Not Found", "msg": "user missing"}));

        let body = wire(&Envelope::forbidden().meta("ignored", true));
        assert_eq!(keys(&body), ["msg", "status"]);
    }

    #[test]
    fn validation_fields_are_an_object() {
        let mut fields = HashMap::new();
        fields.insert("email".to_owned(), "required".to_owned());

        let body = wire(&Envelope::invalid_request_data(fields));
        assert_eq!(body, json!({"status": "Bad Request", "msg": {"email": "required"}}));

        let envelope = Envelope::invalid_request_data([("name", "too short"), ("age", "not a number")]);
        let expected: BTreeMap<String, String> = [
            ("age".to_owned(), "not a number".to_owned()),
            ("name".to_owned(), "too short".to_owned()),
        ]
        .into();
        assert_eq!(envelope.body(), Some(&Payload::Fields(expected)));
    }

    #[test]
    fn internal_error_hides_diagnostic() {
        let envelope = Envelope::internal_error("db timeout");
        assert_eq!(envelope.diagnostic(), Some("db timeout"));

        let body = wire(&envelope);
        assert_eq!(body, json!({"status": "Internal Server Error", "msg": "internal error"}));
    }

    #[test]
    fn already_exist_uses_error_text() {
        let err = std::io::Error::new(std::io::ErrorKind::AlreadyExists, "email taken");
        assert_eq!(wire(&Envelope::already_exist(err))["msg"], "email taken");
    }

    #[test]
    fn unencodable_data_surfaces_at_encode() {
        let envelope = Envelope::ok(Opaque);
        assert_eq!(envelope.body(), None);
        assert!(matches!(envelope.encode(), Err(EncodeError::Payload(_))));
    }

    #[test]
    fn payload_display() {
        assert_eq!(Payload::from("plain").to_string(), "plain");
        assert_eq!(Payload::from(json!({"a": 1})).to_string(), r#"{"a":1}"#);
    }
}
