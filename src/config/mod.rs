use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;
use tracing::info;

use crate::types::error::{OrchestratedError, Result};

/// Global configuration instance
static CONFIG: OnceCell<RwLock<AppConfig>> = OnceCell::new();

/// Environment variable overriding the gateway API key
pub const GATEWAY_API_KEY_ENV: &str = "UNIPILE_API_KEY";
/// Environment variable overriding the gateway base URL
pub const GATEWAY_BASE_URL_ENV: &str = "UNIPILE_BASE_URL";
/// Environment variable supplying the generator API key
pub const GENERATOR_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Messaging gateway connection
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Reply suggestion generator
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Sync loop behavior
    #[serde(default)]
    pub sync: SyncSettings,
}

/// Messaging gateway (aggregation API) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the aggregation API, e.g. `https://api1.unipile.com:13111/api/v1`
    pub base_url: String,

    /// Static API key sent in the `X-API-KEY` header
    pub api_key: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,

    /// Origin the hosted connection flow redirects back to
    #[serde(default = "default_redirect_origin")]
    pub redirect_origin: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            timeout_secs: default_request_timeout(),
            redirect_origin: default_redirect_origin(),
        }
    }
}

/// Suggestion generator (generative-language API) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// API key; usually supplied via the GEMINI_API_KEY environment variable
    pub api_key: Option<String>,

    /// Model identifier
    #[serde(default = "default_generator_model")]
    pub model: String,

    /// Base URL of the generative-language API
    #[serde(default = "default_generator_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_generator_model(),
            base_url: default_generator_base_url(),
            timeout_secs: default_request_timeout(),
        }
    }
}

/// Sync loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Poll interval for the active view, in seconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            poll_interval_seconds: default_poll_interval(),
        }
    }
}

fn default_request_timeout() -> u64 {
    30
}

fn default_redirect_origin() -> String {
    "http://localhost:3000".to_string()
}

fn default_generator_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_generator_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_poll_interval() -> u64 {
    60
}

impl AppConfig {
    /// Parse a config from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Apply environment variable overrides on top of file values
    ///
    /// API keys are expected to come from the environment in most
    /// deployments; file values act as a fallback.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = env::var(GATEWAY_API_KEY_ENV) {
            if !key.is_empty() {
                self.gateway.api_key = key;
            }
        }
        if let Ok(url) = env::var(GATEWAY_BASE_URL_ENV) {
            if !url.is_empty() {
                self.gateway.base_url = url;
            }
        }
        if let Ok(key) = env::var(GENERATOR_API_KEY_ENV) {
            if !key.is_empty() {
                self.generator.api_key = Some(key);
            }
        }
    }
}

/// Get default config paths
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // XDG config path
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("orchestrated").join("config.toml"));
    }

    // Home directory fallback
    if let Some(home_dir) = dirs::home_dir() {
        paths.push(
            home_dir
                .join(".config")
                .join("orchestrated")
                .join("config.toml"),
        );
    }

    paths
}

/// Initialize configuration from default paths
pub fn init_config() -> Result<()> {
    info!("Initializing configuration from default paths");

    for path in default_config_paths() {
        if path.exists() {
            info!("Found config at: {:?}", path);
            return init_config_from_path(&path);
        }
    }

    // No config found; env overrides may still supply everything needed
    info!("No config file found, using defaults with env overrides");
    let mut config = AppConfig::default();
    config.apply_env_overrides();
    set_config(config)
}

/// Initialize configuration from a specific path
pub fn init_config_from_path(path: &PathBuf) -> Result<()> {
    info!("Loading configuration from: {:?}", path);

    let content = fs::read_to_string(path)
        .map_err(|e| OrchestratedError::Config(format!("Failed to read config: {}", e)))?;

    let mut config = AppConfig::from_toml_str(&content)?;
    config.apply_env_overrides();
    set_config(config)
}

/// Set the global configuration
fn set_config(config: AppConfig) -> Result<()> {
    match CONFIG.get() {
        Some(lock) => {
            let mut guard = lock
                .write()
                .map_err(|e| OrchestratedError::Config(format!("Failed to lock config: {}", e)))?;
            *guard = config;
        }
        None => {
            CONFIG.set(RwLock::new(config)).ok();
        }
    }
    Ok(())
}

/// Get a clone of the current configuration
pub fn get_config() -> AppConfig {
    CONFIG
        .get()
        .and_then(|lock| lock.read().ok().map(|guard| guard.clone()))
        .unwrap_or_default()
}

/// Check if configuration is initialized
pub fn is_initialized() -> bool {
    CONFIG.get().is_some()
}
