//! Network seam used by the sandbox `ajax` capability.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::{SandboxError, SandboxResult};

/// HTTP method of an AJAX request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// `GET`
    #[default]
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
}

/// A request issued through a sandbox.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AjaxRequest {
    /// Method.
    pub method: HttpMethod,
    /// Absolute URL, or a path resolved against the transport's base URL.
    pub url: String,
    /// Query parameters appended to the URL.
    pub query: Vec<(String, String)>,
    /// JSON body.
    pub body: Option<Value>,
    /// Extra request headers.
    pub headers: Vec<(String, String)>,
}

impl AjaxRequest {
    /// A `GET` request.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// A `POST` request.
    #[must_use]
    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            ..Self::default()
        }
    }

    /// Append a query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Set the JSON body.
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Add a request header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// A response received through a sandbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AjaxResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: String,
}

impl AjaxResponse {
    /// Whether the status is 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SandboxError::Decode`] if the body does not fit `T`.
    pub fn json<T: DeserializeOwned>(&self) -> SandboxResult<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Asynchronous request transport.
///
/// The core imposes no ordering or cancellation over in-flight requests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and wait for its response.
    async fn send(&self, request: AjaxRequest) -> SandboxResult<AjaxResponse>;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Option<Url>,
    default_headers: Vec<(String, String)>,
}

impl HttpTransport {
    /// Build a transport with a request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`SandboxError::Transport`] if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> SandboxResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SandboxError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: None,
            default_headers: Vec::new(),
        })
    }

    /// Resolve relative request URLs against `base`.
    ///
    /// # Errors
    ///
    /// Returns [`SandboxError::InvalidUrl`] if `base` is not an absolute URL.
    pub fn with_base_url(mut self, base: &str) -> SandboxResult<Self> {
        let url = Url::parse(base).map_err(|e| SandboxError::InvalidUrl {
            url: base.to_owned(),
            reason: e.to_string(),
        })?;
        self.base_url = Some(url);
        Ok(self)
    }

    /// Send `name: value` with every request (e.g. a CSRF token header).
    #[must_use]
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Resolve a request URL to an absolute one.
    ///
    /// # Errors
    ///
    /// Returns [`SandboxError::InvalidUrl`] for relative URLs without a base
    /// URL, or URLs that do not parse.
    pub fn resolve(&self, raw: &str) -> SandboxResult<Url> {
        let invalid = |reason: String| SandboxError::InvalidUrl {
            url: raw.to_owned(),
            reason,
        };
        match Url::parse(raw) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => self
                .base_url
                .as_ref()
                .ok_or_else(|| invalid("relative url without a base url".to_owned()))?
                .join(raw)
                .map_err(|e| invalid(e.to_string())),
            Err(e) => Err(invalid(e.to_string())),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: AjaxRequest) -> SandboxResult<AjaxResponse> {
        let url = self.resolve(&request.url)?;
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        debug!(method = %method, url = %url, "sending request");

        let mut builder = self.client.request(method, url);
        for (name, value) in self.default_headers.iter().chain(&request.headers) {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| SandboxError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| SandboxError::Transport(e.to_string()))?;

        debug!(status, bytes = body.len(), "received response");
        Ok(AjaxResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_builders() {
        let request = AjaxRequest::post("/api/action/package_search")
            .query("q", "water")
            .json(json!({"rows": 5}))
            .header("X-CSRF-Token", "abc");
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.query, vec![("q".to_owned(), "water".to_owned())]);
        assert_eq!(request.body, Some(json!({"rows": 5})));
        assert_eq!(request.headers.len(), 1);
    }

    #[test]
    fn test_response_helpers() {
        let response = AjaxResponse {
            status: 200,
            body: r#"{"success": true}"#.to_owned(),
        };
        assert!(response.is_success());
        let value: Value = response.json().unwrap();
        assert_eq!(value["success"], json!(true));

        let failed = AjaxResponse {
            status: 409,
            body: "not json".to_owned(),
        };
        assert!(!failed.is_success());
        assert!(matches!(failed.json::<Value>(), Err(SandboxError::Decode(_))));
    }

    #[test]
    fn test_resolve_relative_against_base() {
        let transport = HttpTransport::new(Duration::from_secs(5))
            .unwrap()
            .with_base_url("https://catalog.example.org/")
            .unwrap();
        assert_eq!(
            transport.resolve("/api/3/action/status_show").unwrap().as_str(),
            "https://catalog.example.org/api/3/action/status_show"
        );
        assert_eq!(
            transport.resolve("https://other.example.org/x").unwrap().host_str(),
            Some("other.example.org")
        );
    }

    #[test]
    fn test_resolve_relative_without_base_fails() {
        let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
        assert!(matches!(
            transport.resolve("/api/3/action/status_show"),
            Err(SandboxError::InvalidUrl { .. })
        ));
        assert!(matches!(
            transport.clone().with_base_url("not a url"),
            Err(SandboxError::InvalidUrl { .. })
        ));
    }
}
