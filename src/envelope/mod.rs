//! Turns raw transport outcomes into a single success/error contract.
//!
//! Two entry points exist because the backend is not uniform about what it
//! sends back:
//!
//! - [`Normalizer::normalize`] accepts any body. Text that is not JSON is
//!   wrapped into `{ message, status, code }`, and only a `200` counts as
//!   success.
//! - [`Normalizer::normalize_strict`] is for endpoints that always answer
//!   JSON. Anything `>= 400` fails and the notification comes from the
//!   body's `error` field.
//!
//! Callers never parse response bodies themselves; they match on the
//! returned [`NormalizedResult`].

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::future::Future;

use crate::error::{ApiError, TransportError, SERVER_ERROR_MESSAGE};
use crate::notify::Notifier;
use crate::transport::RequestOutcome;

/// `Ok` carries the parsed payload, `Err` the classified failure
pub type NormalizedResult = Result<Value, ApiError>;

#[derive(Debug, Clone)]
pub struct Normalizer {
    notifier: Notifier,
}

impl Normalizer {
    pub fn new(notifier: Notifier) -> Self {
        Self { notifier }
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Best-effort normalization. With `suppress_notify` set the sink is
    /// never called, whatever the outcome.
    pub async fn normalize<F>(&self, call: F, suppress_notify: bool) -> NormalizedResult
    where
        F: Future<Output = Result<RequestOutcome, TransportError>>,
    {
        let (status_code, text) = match read_body(call.await) {
            Ok(read) => read,
            Err((status_code, err)) => {
                tracing::warn!("Transport failure (status {:?}): {}", status_code, err);
                if suppress_notify {
                    return Err(ApiError::transport(status_code));
                }
                self.notifier.notify(SERVER_ERROR_MESSAGE);
                return Err(ApiError::server_error());
            }
        };

        let body = serde_json::from_str::<Value>(&text).unwrap_or_else(|_| {
            json!({
                "message": text,
                "status": status_code,
                "code": status_code,
            })
        });

        if status_code == 200 {
            tracing::debug!("Response 200 accepted");
            return Ok(body);
        }

        if !suppress_notify {
            if let Some(message) = notifiable_text(&body, "message") {
                self.notifier.notify(message);
            }
        }
        let message = body.get("message").map(value_text).unwrap_or_default();

        let status = body_number(&body, &["status", "statusCode"]).or(Some(status_code));
        let code = body_number(&body, &["code"]).or(Some(status_code));
        tracing::warn!("Request failed with status {}: {}", status_code, message);

        Err(ApiError::application(message, status, code))
    }

    /// Strict JSON normalization: every status `>= 400` is a failure and is
    /// always reported through the sink.
    pub async fn normalize_strict<F>(&self, call: F) -> NormalizedResult
    where
        F: Future<Output = Result<RequestOutcome, TransportError>>,
    {
        let outcome = match call.await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!("Transport failure: {}", err);
                self.notifier.notify(SERVER_ERROR_MESSAGE);
                return Err(ApiError::server_error());
            }
        };
        let status_code = outcome.status_code;

        let body: Value = match serde_json::from_slice(&outcome.body) {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!("Expected JSON body with status {}: {}", status_code, err);
                self.notifier.notify(SERVER_ERROR_MESSAGE);
                return Err(ApiError::transport(Some(status_code)));
            }
        };

        if status_code >= 400 {
            if let Some(message) = notifiable_text(&body, "error") {
                self.notifier.notify(message);
            }
            let message = body.get("error").map(value_text).unwrap_or_default();
            tracing::warn!("Request failed with status {}: {}", status_code, message);
            return Err(ApiError::application(message, Some(status_code), Some(status_code)));
        }

        tracing::debug!("Response {} accepted", status_code);
        Ok(body)
    }

    /// [`Self::normalize`] followed by decoding the payload into `T`.
    /// A payload of the wrong shape fails without notification.
    pub async fn normalize_as<T, F>(&self, call: F, suppress_notify: bool) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        F: Future<Output = Result<RequestOutcome, TransportError>>,
    {
        let body = self.normalize(call, suppress_notify).await?;
        serde_json::from_value(body).map_err(|err| {
            tracing::warn!("Unexpected response payload: {}", err);
            ApiError::transport(Some(200))
        })
    }
}

/// Status plus decoded text, or whatever status was known when reading failed
fn read_body(
    outcome: Result<RequestOutcome, TransportError>,
) -> Result<(u16, String), (Option<u16>, TransportError)> {
    let outcome = outcome.map_err(|err| (None, err))?;
    let text = outcome
        .read_text()
        .map_err(|err| (Some(outcome.status_code), err))?;
    Ok((outcome.status_code, text))
}

/// Only a non-empty string is worth showing; `0`, `false` or `{}` are not
fn notifiable_text<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key)
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
}

fn body_number(body: &Value, keys: &[&str]) -> Option<u16> {
    keys.iter()
        .filter_map(|key| body.get(*key))
        .find_map(|v| v.as_u64())
        .and_then(|n| u16::try_from(n).ok())
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
