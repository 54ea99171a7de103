//! Configuration management with TOML, environment variables, and CLI overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Catalogue host
    #[serde(default = "default_catalogue_base_url")]
    pub catalogue_base_url: String,

    /// COE results page
    #[serde(default = "default_benchmark_url")]
    pub benchmark_url: String,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Base delay between requests in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Random jitter added to delay (0 to this value)
    #[serde(default = "default_delay_jitter_ms")]
    pub delay_jitter_ms: u64,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Attempts per detail page before it becomes a NIL row
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Upper bound on pages fetched per listing query
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Results per new-catalogue page
    #[serde(default = "default_new_page_size")]
    pub new_page_size: u32,

    /// Results per used-catalogue page
    #[serde(default = "default_used_page_size")]
    pub used_page_size: u32,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Write the report here instead of stdout
    #[serde(default)]
    pub output: Option<PathBuf>,
}

fn default_catalogue_base_url() -> String {
    crate::sgcarmart::catalogue::DEFAULT_BASE_URL.to_string()
}

fn default_benchmark_url() -> String {
    crate::coe::DEFAULT_BENCHMARK_URL.to_string()
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_delay_jitter_ms() -> u64 {
    1000
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    crate::listing::retry::DEFAULT_MAX_ATTEMPTS
}

fn default_max_pages() -> u32 {
    50
}

fn default_new_page_size() -> u32 {
    60
}

fn default_used_page_size() -> u32 {
    100
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalogue_base_url: default_catalogue_base_url(),
            benchmark_url: default_benchmark_url(),
            proxy: None,
            delay_ms: default_delay_ms(),
            delay_jitter_ms: default_delay_jitter_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
            max_pages: default_max_pages(),
            new_page_size: default_new_page_size(),
            used_page_size: default_used_page_size(),
            format: OutputFormat::Table,
            output: None,
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        // 1. Explicit path takes precedence
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        // 2. Try current directory
        let local_config = Path::new("vpes.toml");
        if local_config.exists() {
            debug!("Found vpes.toml in current directory");
            return Self::from_file(local_config);
        }

        // 3. Try XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("vpes").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        // 4. Return default config
        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(proxy) = std::env::var("VPES_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Ok(delay) = std::env::var("VPES_DELAY") {
            if let Ok(d) = delay.parse() {
                self.delay_ms = d;
            }
        }

        if let Ok(retries) = std::env::var("VPES_MAX_RETRIES") {
            if let Ok(r) = retries.parse() {
                self.max_retries = r;
            }
        }

        if let Ok(timeout) = std::env::var("VPES_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                self.request_timeout_secs = t;
            }
        }

        self
    }
}

/// Output format for reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Markdown,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use: table, json, markdown, csv", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
