use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::error::TransportError;

/// Method, path, headers and optional JSON body for one backend call
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: Method,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post_json(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).json(body)
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Raw status and body of a completed call, consumed once by the normalizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOutcome {
    pub status_code: u16,
    pub body: Vec<u8>,
}

impl RequestOutcome {
    pub fn new(status_code: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status_code,
            body: body.into(),
        }
    }

    pub fn text(status_code: u16, body: &str) -> Self {
        Self::new(status_code, body.as_bytes().to_vec())
    }

    pub fn json(status_code: u16, body: &Value) -> Self {
        Self::new(status_code, body.to_string().into_bytes())
    }

    /// Decode the body as text; a non UTF-8 body counts as a failed read
    pub fn read_text(&self) -> Result<String, TransportError> {
        Ok(String::from_utf8(self.body.clone())?)
    }
}

/// Capability to issue a request and eventually receive status plus body.
///
/// Timeouts and cancellation belong to the implementation; callers assume
/// every call resolves.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn perform(&self, request: RequestDescriptor) -> Result<RequestOutcome, TransportError>;
}

/// `reqwest` backed transport rooted at the backend base URL
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        Ok(Self {
            client: reqwest::Client::new(),
            base_url: Url::parse(base_url)?,
            timeout,
        })
    }

    pub fn from_config(config: &crate::config::ApiConfig) -> Result<Self, TransportError> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn perform(&self, request: RequestDescriptor) -> Result<RequestOutcome, TransportError> {
        let url = self.base_url.join(&request.path)?;
        tracing::debug!("{} {}", request.method, url);

        let mut builder = self
            .client
            .request(request.method, url)
            .timeout(self.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.to_string());
        }

        let response = builder.send().await?;
        let status_code = response.status().as_u16();
        let body = response.bytes().await?;

        Ok(RequestOutcome::new(status_code, body.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn post_json_sets_content_type_and_body() {
        let req = RequestDescriptor::post_json("/cosmos/api/sudo", json!({"password": "pw"}));
        assert_eq!(req.method, Method::POST);
        assert!(req
            .headers
            .iter()
            .any(|(k, v)| k == "Content-Type" && v == "application/json"));
        assert_eq!(req.body, Some(json!({"password": "pw"})));
    }

    #[test]
    fn invalid_utf8_body_fails_to_read() {
        let outcome = RequestOutcome::new(200, vec![0xff, 0xfe, 0x00]);
        assert!(matches!(outcome.read_text(), Err(TransportError::InvalidBody(_))));
    }

    #[test]
    fn rejects_malformed_base_url() {
        assert!(HttpTransport::new("not a url", Duration::from_secs(1)).is_err());
    }
}
