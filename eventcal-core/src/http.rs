//! Thin HTTP layer shared by the listing walker and the detail resolver.

use std::time::Duration;

use tracing::debug;

use crate::config::HarvestConfig;
use crate::error::{HarvestError, HarvestResult};

/// GET-only client with a fixed user agent and per-request timeout.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(user_agent: &str, timeout: Duration) -> HarvestResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| HarvestError::Config(format!("Could not build HTTP client: {e}")))?;

        Ok(HttpClient { client })
    }

    pub fn from_config(config: &HarvestConfig) -> HarvestResult<Self> {
        Self::new(&config.user_agent, config.timeout())
    }

    /// Fetch `url` and return its body as text.
    ///
    /// Any non-2xx status is an error; timeouts surface as transport errors.
    pub async fn get_text(&self, url: &str) -> HarvestResult<String> {
        debug!(url, "GET");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HarvestError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| transport_error(url, e))
    }
}

fn transport_error(url: &str, err: reqwest::Error) -> HarvestError {
    let message = if err.is_timeout() {
        "timed out".to_string()
    } else {
        err.to_string()
    };

    HarvestError::Transport {
        url: url.to_string(),
        message,
    }
}
