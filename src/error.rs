use thiserror::Error;

#[derive(Debug, Error)]
pub enum SanctionsError {
    #[error("Network error: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("Timeout: request to {url} timed out after {seconds} seconds")]
    Timeout { url: String, seconds: u64 },

    #[error("HTTP error: {url} returned status {status}")]
    HttpStatus { status: u16, url: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Dataset unavailable: {0}")]
    Unavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{0}")]
    Other(String),
}

impl From<config::ConfigError> for SanctionsError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl SanctionsError {
    /// Classify a transport error, separating deadline expiry from other failures
    pub fn from_transport(err: reqwest::Error, url: &str, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
                seconds: timeout_secs,
            }
        } else {
            Self::Fetch(err)
        }
    }

    /// Whether this error came out of the fetch stage of a refresh
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Self::Fetch(_) | Self::Timeout { .. } | Self::HttpStatus { .. }
        )
    }

    /// Get user-friendly hint for the error
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::Fetch(_) | Self::Timeout { .. } => {
                Some("Check your internet connection and the configured source URLs.".to_string())
            }
            Self::HttpStatus { status, .. } if *status == 404 => Some(
                "The publisher may have moved the list. Update sources.* in the configuration."
                    .to_string(),
            ),
            Self::Decode(_) => Some(
                "The downloaded file is not in the expected character encoding.".to_string(),
            ),
            Self::Persistence(_) => {
                Some("Check that the storage directory exists and is writable.".to_string())
            }
            Self::Config(_) => Some(
                "Run 'sanctions-watch config path' to locate the configuration file.".to_string(),
            ),
            _ => None,
        }
    }

    /// Check if the error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Fetch(_) | Self::Timeout { .. } => true,
            Self::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, SanctionsError>;
