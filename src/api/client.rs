//! Blocking JSON client for the surveillance backend.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::AppConfigData;

use super::error::ApiError;

const USER_AGENT: &str = concat!("denguewatch/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
pub struct ApiClient {
    agent: ureq::Agent,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            base_url: base_url.into(),
            token: None,
        }
    }

    pub fn from_config(config: &AppConfigData) -> Self {
        Self::new(
            config.api_base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: &str, path: &str) -> ureq::Request {
        let url = self.url(path);
        debug!("{method} {url}");

        let request = self
            .agent
            .request(method, &url)
            .set("Accept", "application/json")
            .set("User-Agent", USER_AGENT);

        match &self.token {
            Some(token) => request.set("Authorization", &format!("Bearer {token}")),
            None => request,
        }
    }

    pub fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.get_with_query(path, &[])
    }

    pub fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let request = query
            .iter()
            .fold(self.request("GET", path), |req, (k, v)| req.query(k, v));
        let response = request.call().map_err(|e| log_failure("GET", path, e))?;
        decode_body(response)
    }

    pub fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let response = self
            .request("POST", path)
            .send_json(body)
            .map_err(|e| log_failure("POST", path, e))?;
        decode_body(response)
    }

    pub fn put<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let response = self
            .request("PUT", path)
            .send_json(body)
            .map_err(|e| log_failure("PUT", path, e))?;
        decode_body(response)
    }

    /// Send a request whose response body is irrelevant
    pub fn send(&self, method: &str, path: &str) -> Result<(), ApiError> {
        self.request(method, path)
            .call()
            .map_err(|e| log_failure(method, path, e))?;
        Ok(())
    }
}

fn log_failure(method: &str, path: &str, err: ureq::Error) -> ApiError {
    let err = ApiError::from(err);
    warn!("{method} {path} failed: {err}");
    err
}

fn decode_body<T: DeserializeOwned>(response: ureq::Response) -> Result<T, ApiError> {
    let body = response
        .into_string()
        .map_err(|e| ApiError::Network(format!("Failed to read response: {e}")))?;

    // Empty bodies decode as `null` so `()` and `Option<_>` targets work
    let body = if body.trim().is_empty() { "null" } else { body.as_str() };

    serde_json::from_str(body).map_err(|e| {
        warn!("Failed to decode response: {e}");
        ApiError::Decode(e.to_string())
    })
}
