//! Bitrise Client
//!
//! [`ClientFactory`] is the one network capability handed to every resource
//! and data source. It turns the resolved [`ProviderConfig`] into a
//! [`BitriseClient`] per operation; the client applies the status policy of
//! a [`RestCall`] and reports each step to the configured observer.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use super::context::OpContext;
use super::error::{ProviderError, Result};
use super::http::{ApiResponse, BitriseHttpClient};
use super::observe::{RequestObserver, TracingObserver};
use super::rest::RestCall;
use crate::config::ProviderConfig;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Builds authenticated clients from the provider configuration
#[derive(Clone, Debug)]
pub struct ClientFactory {
    config: ProviderConfig,
    timeout: Option<Duration>,
    observer: Arc<dyn RequestObserver>,
}

impl ClientFactory {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            timeout: Some(DEFAULT_TIMEOUT),
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn RequestObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Create a client for one operation
    pub fn client(&self) -> Result<BitriseClient> {
        let http = BitriseHttpClient::new(self.config.token(), self.timeout)?;
        Ok(BitriseClient {
            http,
            endpoint: self.config.endpoint().to_string(),
            observer: Arc::clone(&self.observer),
        })
    }
}

/// Authenticated client bound to one endpoint
#[derive(Clone, Debug)]
pub struct BitriseClient {
    http: BitriseHttpClient,
    endpoint: String,
    observer: Arc<dyn RequestObserver>,
}

impl BitriseClient {
    /// Join an API path onto the endpoint
    pub fn url(&self, path: &str) -> Result<String> {
        let raw = format!("{}{}", self.endpoint, path);
        Url::parse(&raw)
            .map(String::from)
            .map_err(|e| ProviderError::Request(format!("invalid URL {raw:?}: {e}")))
    }

    /// Send a call and apply its status policy
    ///
    /// Accepted statuses return the response, 404 becomes
    /// [`ProviderError::NotFound`], anything else [`ProviderError::Api`].
    pub async fn send(
        &self,
        ctx: &OpContext,
        call: &RestCall,
        body: Option<Vec<u8>>,
    ) -> Result<ApiResponse> {
        let result = self.send_inner(ctx, call, body).await;
        if let Err(ref err) = result {
            self.observer.error_detected(call, err);
        }
        result
    }

    async fn send_inner(
        &self,
        ctx: &OpContext,
        call: &RestCall,
        body: Option<Vec<u8>>,
    ) -> Result<ApiResponse> {
        let url = self.url(call.path())?;
        self.observer.request_built(call, &url);

        let response = ctx
            .guard(&url, self.http.send(call.method().clone(), &url, body))
            .await?;
        self.observer
            .response_received(call, response.status, &response.body);

        if call.accepts(response.status) {
            return Ok(response);
        }

        if response.status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound {
                operation: call.operation().to_string(),
                url,
                body: response.body,
            });
        }

        Err(ProviderError::Api {
            operation: call.operation().to_string(),
            status: response.status,
            body: response.body,
        })
    }

    /// Send a call with a JSON payload
    pub async fn execute<P>(&self, ctx: &OpContext, call: &RestCall, payload: &P) -> Result<ApiResponse>
    where
        P: Serialize + ?Sized,
    {
        let body = serde_json::to_vec(payload).map_err(ProviderError::Encode);
        let body = match body {
            Ok(body) => body,
            Err(err) => {
                self.observer.error_detected(call, &err);
                return Err(err);
            }
        };
        self.send(ctx, call, Some(body)).await
    }

    /// Send a call with a JSON payload and decode the JSON response
    pub async fn call<P, R>(&self, ctx: &OpContext, call: &RestCall, payload: &P) -> Result<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self.execute(ctx, call, payload).await?;
        self.decode(call, &response)
    }

    /// Fetch and decode a JSON response; 404 is an error
    pub async fn get<R>(&self, ctx: &OpContext, call: &RestCall) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let response = self.send(ctx, call, None).await?;
        self.decode(call, &response)
    }

    /// Fetch a body-less call; 404 yields `None`
    pub async fn fetch_response(&self, ctx: &OpContext, call: &RestCall) -> Result<Option<ApiResponse>> {
        match self.send(ctx, call, None).await {
            Ok(response) => Ok(Some(response)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Fetch and decode a JSON response; 404 yields `None`
    pub async fn fetch<R>(&self, ctx: &OpContext, call: &RestCall) -> Result<Option<R>>
    where
        R: DeserializeOwned,
    {
        match self.fetch_response(ctx, call).await? {
            Some(response) => self.decode(call, &response).map(Some),
            None => Ok(None),
        }
    }

    fn decode<R: DeserializeOwned>(&self, call: &RestCall, response: &ApiResponse) -> Result<R> {
        let url = self.url(call.path())?;
        response.json(&url).inspect_err(|err| {
            self.observer.error_detected(call, err);
        })
    }
}
