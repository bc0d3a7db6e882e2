use async_trait::async_trait;
use std::sync::Arc;

use super::eu::EuSource;
use super::ofac::OfacSource;
use super::types::SanctionRecord;
use super::DatasetKind;
use crate::config::Config;
use crate::error::Result;

/// Trait for sanctions list sources
#[async_trait]
pub trait SanctionsSource: Send + Sync {
    /// Download and normalize the complete list, in document order
    async fn fetch_records(&self) -> Result<Vec<SanctionRecord>>;

    /// Dataset this source feeds
    fn dataset(&self) -> DatasetKind;

    /// Location the list is downloaded from
    fn url(&self) -> &str;
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout in seconds
    pub timeout: u64,
    /// Maximum number of attempts per download
    pub max_retries: u32,
    /// Base delay for exponential backoff (milliseconds)
    pub retry_base_delay: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            max_retries: 1,
            retry_base_delay: 500,
            user_agent: format!("sanctions-watch/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl From<&Config> for ClientConfig {
    fn from(config: &Config) -> Self {
        Self {
            timeout: config.refresh.fetch_timeout_secs,
            max_retries: config.refresh.max_retries,
            retry_base_delay: config.refresh.retry_base_delay_ms,
            user_agent: config.refresh.user_agent.clone(),
        }
    }
}

/// Factory for creating sources
pub struct SourceFactory;

impl SourceFactory {
    /// Create the source for a dataset using the configured URL and client settings
    pub fn create(kind: DatasetKind, config: &Config) -> Result<Arc<dyn SanctionsSource>> {
        let url = config.source_url(kind).to_string();
        let client_config = ClientConfig::from(config);
        match kind {
            DatasetKind::Ofac => Ok(Arc::new(OfacSource::new(url, client_config)?)),
            DatasetKind::Eu => Ok(Arc::new(EuSource::new(url, client_config)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_from_settings() {
        let mut config = Config::default();
        config.refresh.fetch_timeout_secs = 12;
        config.refresh.max_retries = 4;

        let client_config = ClientConfig::from(&config);
        assert_eq!(client_config.timeout, 12);
        assert_eq!(client_config.max_retries, 4);
    }

    #[test]
    fn test_factory_uses_configured_url() {
        let mut config = Config::default();
        config.sources.eu_url = "http://localhost:9000/eu.xml".to_string();

        let source = SourceFactory::create(DatasetKind::Eu, &config).unwrap();
        assert_eq!(source.dataset(), DatasetKind::Eu);
        assert_eq!(source.url(), "http://localhost:9000/eu.xml");

        let source = SourceFactory::create(DatasetKind::Ofac, &config).unwrap();
        assert_eq!(source.url(), crate::config::DEFAULT_OFAC_URL);
    }
}
