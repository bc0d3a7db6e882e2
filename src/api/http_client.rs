use log::{debug, warn};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tokio::time::sleep;

use super::client::ClientConfig;
use crate::error::{Result, SanctionsError};

/// Create an HTTP client with the source download settings
pub fn create_client(timeout_secs: u64, user_agent: &str) -> Result<Client> {
    ClientBuilder::new()
        .pool_max_idle_per_host(2)
        .pool_idle_timeout(Duration::from_secs(30))
        .timeout(Duration::from_secs(timeout_secs))
        .tcp_keepalive(Duration::from_secs(60))
        .user_agent(user_agent)
        .use_rustls_tls()
        .build()
        .map_err(SanctionsError::Fetch)
}

/// Downloads one source document, whole, as raw bytes
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    url: String,
    config: ClientConfig,
    client: Client,
}

impl HttpFetcher {
    pub fn new(url: impl Into<String>, config: ClientConfig) -> Result<Self> {
        let client = create_client(config.timeout, &config.user_agent)?;
        Ok(Self {
            url: url.into(),
            config,
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the body as bytes, retrying transient failures with exponential backoff
    pub async fn fetch_bytes(&self) -> Result<Vec<u8>> {
        let attempts = self.config.max_retries.max(1);
        let mut retry_delay = Duration::from_millis(self.config.retry_base_delay);
        let mut last_error = None;

        for attempt in 0..attempts {
            if attempt > 0 {
                sleep(retry_delay).await;
                retry_delay *= 2; // Exponential backoff
            }

            match self.fetch_once().await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() && attempt + 1 < attempts => {
                    warn!(
                        "Fetching {} failed (attempt {}/{}): {}",
                        self.url,
                        attempt + 1,
                        attempts,
                        e
                    );
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error
            .unwrap_or_else(|| SanctionsError::Other("Request failed after all retries".to_string())))
    }

    async fn fetch_once(&self) -> Result<Vec<u8>> {
        debug!("GET {}", self.url);
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| SanctionsError::from_transport(e, &self.url, self.config.timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SanctionsError::HttpStatus {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SanctionsError::from_transport(e, &self.url, self.config.timeout))?;
        debug!("Downloaded {} bytes from {}", body.len(), self.url);

        Ok(body.to_vec())
    }
}
