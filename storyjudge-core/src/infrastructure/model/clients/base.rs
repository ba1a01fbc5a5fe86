//! Base HTTP client with shared logic

use crate::infrastructure::model::types::{ProviderError, ProviderKind};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Base HTTP client with shared functionality
#[derive(Clone)]
pub struct HttpClientBase {
    pub provider: ProviderKind,
    pub endpoint: String,
    pub http: Client,
}

impl HttpClientBase {
    pub fn new(
        provider: ProviderKind,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            provider,
            endpoint: endpoint.into(),
            http: Client::builder().timeout(timeout).build()?,
        })
    }

    /// Build URL from endpoint and path
    pub fn build_url(&self, path: &str) -> String {
        let base = self.endpoint.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    /// Post JSON with bearer auth
    pub async fn post_with_bearer<Req, Res>(
        &self,
        url: &str,
        api_key: &str,
        body: &Req,
    ) -> Result<Res, ProviderError>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        let request = self.http.post(url).bearer_auth(api_key).json(body);
        self.execute(request).await
    }

    /// Post JSON with a custom auth header (for Anthropic)
    pub async fn post_with_headers<Req, Res>(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &Req,
    ) -> Result<Res, ProviderError>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        let request = headers
            .iter()
            .fold(self.http.post(url), |req, (name, value)| req.header(*name, *value))
            .json(body);
        self.execute(request).await
    }

    /// Post JSON with query param auth (for Gemini)
    pub async fn post_with_query_key<Req, Res>(
        &self,
        url: &str,
        api_key: &str,
        body: &Req,
    ) -> Result<Res, ProviderError>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        let request = self.http.post(url).query(&[("key", api_key)]).json(body);
        self.execute(request).await
    }

    /// Sends the request and classifies any failure exactly once.
    async fn execute<Res>(&self, request: RequestBuilder) -> Result<Res, ProviderError>
    where
        Res: DeserializeOwned,
    {
        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::network(self.provider, &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::status(self.provider, status, &body));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ProviderError::network(self.provider, &e))?;

        serde_json::from_slice(&body).map_err(|e| {
            ProviderError::fatal(self.provider, format!("unexpected response body: {e}"))
        })
    }
}
