use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::api::DatasetKind;
use crate::error::{Result, SanctionsError};

const CONFIG_DIR_NAME: &str = ".sanctions-watch";
const CONFIG_FILE_NAME: &str = "config.yaml";
const ENV_PREFIX: &str = "SANCTIONS";

pub const DEFAULT_OFAC_URL: &str = "https://www.treasury.gov/ofac/downloads/sdn.xml";
pub const DEFAULT_EU_URL: &str = "https://webgate.ec.europa.eu/fsd/fsf/public/files/xmlFullSanctionsList_1_1/content?token=dG9rZW4tMjAxNw";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub refresh: RefreshConfig,
    pub search: SearchConfig,
    pub sources: SourcesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the HTTP API listens on
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding one persisted snapshot file per dataset
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("sanctions-watch"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RefreshConfig {
    /// Seconds between scheduled refresh cycles (default: 6 hours)
    pub interval_secs: u64,
    /// Hard deadline for one source download
    pub fetch_timeout_secs: u64,
    /// Download attempts per refresh cycle
    pub max_retries: u32,
    /// Base delay for exponential backoff between attempts (milliseconds)
    pub retry_base_delay_ms: u64,
    pub user_agent: String,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: 6 * 60 * 60,
            fetch_timeout_secs: 30,
            max_retries: 1,
            retry_base_delay_ms: 500,
            user_agent: format!("sanctions-watch/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    /// Result cap applied when the caller does not pass a limit
    pub default_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: crate::query::DEFAULT_SEARCH_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SourcesConfig {
    pub ofac_url: String,
    pub eu_url: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            ofac_url: DEFAULT_OFAC_URL.to_string(),
            eu_url: DEFAULT_EU_URL.to_string(),
        }
    }
}

impl Config {
    /// Get the configuration directory path
    pub fn config_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir()
            .ok_or_else(|| SanctionsError::Config("Could not determine home directory".to_string()))?;

        Ok(home_dir.join(CONFIG_DIR_NAME))
    }

    /// Get the configuration file full path
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_path()?.join(CONFIG_FILE_NAME))
    }

    /// Write a default configuration file if none exists yet
    pub fn initialize(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SanctionsError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        fs::write(path, Self::default().to_yaml()?)
            .map_err(|e| SanctionsError::Config(format!("Failed to write config file: {}", e)))?;

        // Set file permissions to 0600 on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = fs::Permissions::from_mode(0o600);
            fs::set_permissions(path, permissions)
                .map_err(|e| SanctionsError::Config(format!("Failed to set file permissions: {}", e)))?;
        }

        Ok(true)
    }

    /// Load configuration: defaults, then the YAML file (if present), then
    /// `SANCTIONS_*` environment variables (`__` separates nested keys).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file_path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::config_file_path()?,
        };

        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?)
            .add_source(
                config::File::from(file_path)
                    .format(config::FileFormat::Yaml)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the refresh pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("sources.ofac_url", &self.sources.ofac_url),
            ("sources.eu_url", &self.sources.eu_url),
        ] {
            let url = Url::parse(value)
                .map_err(|e| SanctionsError::Config(format!("{} is not a valid URL: {}", key, e)))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(SanctionsError::Config(format!(
                    "{} must use http or https, got '{}'",
                    key,
                    url.scheme()
                )));
            }
        }

        if self.refresh.interval_secs == 0 {
            return Err(SanctionsError::Config(
                "refresh.interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.refresh.fetch_timeout_secs == 0 {
            return Err(SanctionsError::Config(
                "refresh.fetch_timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| SanctionsError::Config(format!("Failed to serialize config: {}", e)))
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh.interval_secs)
    }

    /// Source URL for a dataset
    pub fn source_url(&self, kind: DatasetKind) -> &str {
        match kind {
            DatasetKind::Ofac => &self.sources.ofac_url,
            DatasetKind::Eu => &self.sources.eu_url,
        }
    }

    /// Persisted snapshot location for a dataset
    pub fn cache_file(&self, kind: DatasetKind) -> PathBuf {
        self.storage.data_dir.join(kind.cache_file_name())
    }
}
