//! HTTP utilities for Bitrise REST API calls

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;

use super::error::{ProviderError, Result};

const USER_AGENT: &str = concat!("terraform-provider-bitrise/", env!("CARGO_PKG_VERSION"));

/// Status, content type and body of one API response
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: String,
}

impl ApiResponse {
    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|source| ProviderError::Decode {
            url: url.to_string(),
            source,
        })
    }

    /// Whether the server labelled the body as JSON
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.contains("application/json"))
    }
}

/// HTTP client wrapper with the Bitrise authorization header baked in
#[derive(Clone, Debug)]
pub struct BitriseHttpClient {
    client: Client,
}

impl BitriseHttpClient {
    /// Create a new HTTP client that sends `token` as the `Authorization` header
    ///
    /// An empty token is allowed; the API rejects the first request instead.
    pub fn new(token: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if !token.is_empty() {
            let mut value = HeaderValue::from_str(token).map_err(|e| {
                ProviderError::Request(format!("token is not a valid header value: {e}"))
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| ProviderError::Request(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Send one request and collect the full response
    ///
    /// Does not interpret the status code.
    pub async fn send(&self, method: Method, url: &str, body: Option<Vec<u8>>) -> Result<ApiResponse> {
        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = request
            .send()
            .await
            .map_err(|source| classify_send_error(url, source))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .text()
            .await
            .map_err(|source| classify_send_error(url, source))?;

        Ok(ApiResponse {
            status,
            content_type,
            body,
        })
    }
}

fn classify_send_error(url: &str, source: reqwest::Error) -> ProviderError {
    if source.is_builder() {
        ProviderError::Request(source.to_string())
    } else if source.is_timeout() {
        ProviderError::DeadlineExceeded {
            url: url.to_string(),
        }
    } else {
        ProviderError::Transport {
            url: url.to_string(),
            source,
        }
    }
}
