//! Structured error types for the Polybridge client.

use thiserror::Error;

/// Errors produced by client construction, request validation, and the
/// HTTP request/response cycle.
///
/// Any error aborts the in-progress fetch; no partial results are returned
/// and nothing is retried.
#[derive(Debug, Error)]
pub enum PolybridgeError {
    /// Client misconfiguration (missing API key, unbuildable HTTP client).
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid caller-supplied argument.
    #[error("invalid argument: {0}")]
    Validation(String),

    /// Non-2xx HTTP response. `detail` carries the decoded error envelope
    /// when the body had one, else the leading raw response text.
    #[error("HTTP {status} from {endpoint}: {detail}")]
    Transport {
        status: u16,
        endpoint: String,
        detail: String,
    },

    /// HTTP 200 whose body carried an `error` field.
    #[error("API returned error: {0}")]
    Api(String),

    /// Connection, timeout, or body-read failure from the transport.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A 2xx body that could not be decoded as the expected JSON shape.
    #[error("failed to decode {endpoint} response: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    /// Dataframe construction failed.
    #[error("dataframe error: {0}")]
    Frame(#[from] polars::prelude::PolarsError),
}
