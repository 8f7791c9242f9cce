//! Blocking HTTP layer.
//!
//! One JSON POST per call, authenticated with the `X-API-Key` header. Any
//! decoded body may carry an `error` field (an object or a bare string);
//! that envelope is surfaced both on non-2xx statuses and on HTTP 200.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::PolybridgeError;

/// How much raw body text an error message may carry when the body is not
/// a recognizable error envelope.
const RAW_BODY_LIMIT: usize = 500;

pub(crate) struct Transport {
    http: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
}

impl Transport {
    pub fn new(
        api_key: String,
        base_url: String,
        timeout: Duration,
        http: Option<reqwest::blocking::Client>,
    ) -> Result<Self, PolybridgeError> {
        if api_key.trim().is_empty() {
            return Err(PolybridgeError::Config("API key is required".into()));
        }
        let http = match http {
            Some(client) => client,
            None => reqwest::blocking::Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| {
                    PolybridgeError::Config(format!("failed to build HTTP client: {e}"))
                })?,
        };
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// POST `payload` to `endpoint` and decode the JSON response.
    pub fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        payload: &impl Serialize,
    ) -> Result<T, PolybridgeError> {
        let url = format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'));
        let response = self
            .http
            .post(&url)
            .header("X-API-Key", &self.api_key)
            .json(payload)
            .send()?;

        let status = response.status();
        let body = response.text()?;
        debug!(endpoint, status = status.as_u16(), bytes = body.len(), "api response");

        if !status.is_success() {
            return Err(PolybridgeError::Transport {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
                detail: error_detail(&body),
            });
        }

        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|source| PolybridgeError::Decode {
                endpoint: endpoint.to_string(),
                source,
            })?;

        // The service reports some failures with HTTP 200 and an `error`
        // field in the body.
        if let Some(error) = value.get("error") {
            return Err(PolybridgeError::Api(api_message(error)));
        }

        serde_json::from_value(value).map_err(|source| PolybridgeError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Structured {
        code: Option<String>,
        message: Option<String>,
        detail: Option<serde_json::Value>,
    },
    Text(String),
}

/// Best-effort error detail for a non-2xx body: the decoded envelope when
/// there is one, else the leading raw text.
fn error_detail(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope { error: Some(envelope) }) => describe(&envelope),
        _ => truncate(body, RAW_BODY_LIMIT),
    }
}

fn describe(error: &ErrorBody) -> String {
    match error {
        ErrorBody::Structured {
            code,
            message,
            detail,
        } => {
            let mut out = format!(
                "code: {}, message: {}",
                code.as_deref().unwrap_or("UNKNOWN"),
                message.as_deref().unwrap_or("no message"),
            );
            if let Some(detail) = detail {
                out.push_str(&format!(", detail: {detail}"));
            }
            out
        }
        ErrorBody::Text(text) => text.clone(),
    }
}

/// Message for an `error` field found in an HTTP 200 body.
fn api_message(error: &serde_json::Value) -> String {
    if let Some(message) = error.get("message").and_then(serde_json::Value::as_str) {
        return message.to_string();
    }
    match error.as_str() {
        Some(text) => text.to_string(),
        None => error.to_string(),
    }
}

fn truncate(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
