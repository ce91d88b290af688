use atelier_persist::StoreBackend;
use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub image: ImageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(skip)]
    pub pollinations_api_token: Option<String>,
    #[serde(skip)]
    pub bfl_api_key: Option<String>,
    #[serde(skip)]
    pub mongodb_uri: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_request_timeout() -> u64 {
    300
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    #[serde(default)]
    pub origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    #[serde(default = "default_database")]
    pub mongodb_database: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: default_store_path(),
            mongodb_database: default_database(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("data/threads")
}

fn default_database() -> String {
    "atelier".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub base_url: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: atelier_llm::pollinations::POLLINATIONS_TEXT_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageConfig {
    pub pollinations_base_url: String,
    pub bfl_base_url: String,
    pub poll_interval_ms: u64,
    pub max_attempts: u32,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            pollinations_base_url: atelier_image::pollinations::POLLINATIONS_IMAGE_BASE.to_string(),
            bfl_base_url: atelier_image::bfl::BFL_API_BASE.to_string(),
            poll_interval_ms: 2000,
            max_attempts: 30,
        }
    }
}

impl ImageConfig {
    pub fn poll_config(&self) -> atelier_image::PollConfig {
        atelier_image::PollConfig::new(Duration::from_millis(self.poll_interval_ms), self.max_attempts)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables `ATELIER_<SECTION>__<KEY>`, e.g. `ATELIER_SERVER__PORT`
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("ATELIER")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.origins")
                    .try_parsing(true),
            );

        let mut cfg: Config = builder.build()?.try_deserialize()?;
        cfg.load_secrets();
        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder().add_source(File::from(path.as_ref()));
        builder.build()?.try_deserialize()
    }

    fn load_secrets(&mut self) {
        self.pollinations_api_token = non_empty_env("POLLINATIONS_API_TOKEN");
        self.bfl_api_key = non_empty_env("BFL_API_KEY");
        self.mongodb_uri = non_empty_env("MONGODB_URI");
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
