//! Blocking JSON transport shared by the OpenAI-compatible clients.

use crate::config::ProviderConfig;
use crate::retry::{with_retry, CancelToken, RetryPolicy};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use slidekit_core::{Error, Result};

#[derive(Deserialize)]
struct ErrorResponse {
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// POSTs JSON to an OpenAI-compatible API with retries.
#[derive(Debug, Clone)]
pub(crate) struct HttpClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: Option<String>,
    policy: RetryPolicy,
    cancel: CancelToken,
}

impl HttpClient {
    pub(crate) fn new(config: &ProviderConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::DependencyMissing(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            policy: config.retry_policy(),
            cancel: CancelToken::new(),
        })
    }

    pub(crate) fn set_cancel_token(&mut self, cancel: CancelToken) {
        self.cancel = cancel;
    }

    pub(crate) fn post_json<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        with_retry(&self.policy, &self.cancel, || self.post_once(path, body))
    }

    fn post_once<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut request = self.client.post(&url).json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().map_err(|e| transport_error(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .and_then(|e| e.error)
                .and_then(|e| e.message)
                .unwrap_or(body);
            return Err(status_error(status.as_u16(), message));
        }

        response.json::<Resp>().map_err(|e| {
            Error::permanent(
                Some(status.as_u16()),
                format!("Failed to parse response from {}: {}", url, e),
            )
        })
    }
}

/// Rate limits and server-side failures are worth retrying; client errors are not.
pub(crate) fn status_error(status: u16, message: String) -> Error {
    if status == 429 || (500..600).contains(&status) {
        Error::transient(Some(status), message)
    } else {
        Error::permanent(Some(status), message)
    }
}

fn transport_error(url: &str, e: reqwest::Error) -> Error {
    let message = format!("Request to {} failed: {}", url, e);
    if e.is_timeout() || e.is_connect() || e.is_request() {
        Error::transient(None, message)
    } else {
        Error::permanent(None, message)
    }
}
