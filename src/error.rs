//! Unified error type.

/// The error type returned by hexttp's fallible operations.
///
/// Application-level outcomes (404, 409, 500, ...) are expressed as
/// [`Envelope`](crate::Envelope) values, not as `Error`s. This type surfaces
/// infrastructure failures: parsing the bind address, binding to a port or
/// accepting a connection.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid socket address `{addr}`: {source}")]
    Addr {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },
}
