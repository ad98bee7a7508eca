use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tripgraph: TripgraphConfig,
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub places: PlacesConfig,
    #[serde(default)]
    pub encyclopedia: EncyclopediaConfig,
    #[serde(default)]
    pub http_server: HttpServerConfig,
}

/// Process-level settings
#[derive(Debug, Clone, Deserialize)]
pub struct TripgraphConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// JSON file mirroring the set of destinations already ingested.
    #[serde(default = "default_known_destinations_path")]
    pub known_destinations_path: PathBuf,
}

impl Default for TripgraphConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            known_destinations_path: default_known_destinations_path(),
        }
    }
}

/// Which graph store backs the knowledge graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphBackend {
    Sqlite,
    Memory,
}

/// Knowledge graph configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GraphConfig {
    #[serde(default = "default_backend")]
    pub backend: GraphBackend,
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    /// Largest cutoff used by the context traverser.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            db_path: default_db_path(),
            max_depth: default_max_depth(),
        }
    }
}

/// Text generation service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_gemini_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_generation_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_gemini_key_env(),
            model: default_model(),
            endpoint: default_generation_endpoint(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            max_output_tokens: default_max_output_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Place search configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PlacesConfig {
    #[serde(default = "default_gemini_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_places_endpoint")]
    pub endpoint: String,
    /// Search radius in meters.
    #[serde(default = "default_radius")]
    pub radius: u32,
    #[serde(default = "default_query_prefix")]
    pub query_prefix: String,
    /// Number of top search results whose encyclopedia text feeds extraction.
    #[serde(default = "default_context_places")]
    pub context_places: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_gemini_key_env(),
            endpoint: default_places_endpoint(),
            radius: default_radius(),
            query_prefix: default_query_prefix(),
            context_places: default_context_places(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Encyclopedia lookup configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EncyclopediaConfig {
    #[serde(default = "default_encyclopedia_endpoint")]
    pub endpoint: String,
    /// LRU capacity for fetched extracts (0 disables caching).
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EncyclopediaConfig {
    fn default() -> Self {
        Self {
            endpoint: default_encyclopedia_endpoint(),
            cache_capacity: default_cache_capacity(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "default_http_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub port: u16,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_http_host(),
            port: default_http_port(),
            allowed_origins: Vec::new(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_known_destinations_path() -> PathBuf {
    PathBuf::from("existing_places.json")
}

fn default_backend() -> GraphBackend {
    GraphBackend::Sqlite
}

fn default_db_path() -> PathBuf {
    PathBuf::from("tripgraph.db")
}

fn default_max_depth() -> usize {
    3
}

fn default_gemini_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_model() -> String {
    "gemini-1.5-pro".to_string()
}

fn default_generation_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1/models".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_top_p() -> f32 {
    0.8
}

fn default_top_k() -> u32 {
    40
}

fn default_max_output_tokens() -> u32 {
    8192
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_places_endpoint() -> String {
    "https://maps.googleapis.com/maps/api/place/textsearch/json".to_string()
}

fn default_radius() -> u32 {
    20000
}

fn default_query_prefix() -> String {
    "Most Popular places in ".to_string()
}

fn default_context_places() -> usize {
    2
}

fn default_encyclopedia_endpoint() -> String {
    "https://en.wikipedia.org/w/api.php".to_string()
}

fn default_cache_capacity() -> usize {
    256
}

fn default_http_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    5000
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in TRIPGRAPH_CONFIG environment variable
    /// 2. ./config.toml in current directory
    ///
    /// A missing ./config.toml is not an error: every field has a default.
    /// A missing file named by TRIPGRAPH_CONFIG is.
    pub fn load() -> Result<Self> {
        let _ = dotenv::dotenv();

        let (config_path, explicit) = match std::env::var("TRIPGRAPH_CONFIG") {
            Ok(path) => (PathBuf::from(path), true),
            Err(_) => (PathBuf::from("config.toml"), false),
        };

        if !explicit && !config_path.exists() {
            log::debug!("No config.toml found, using defaults");
            let config = Config::default();
            config.validate()?;
            return Ok(config);
        }

        let config_str = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        Self::from_toml(&config_str)
            .with_context(|| format!("Invalid config file: {}", config_path.display()))
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(config_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(config_str).context("Failed to parse config.toml")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.graph.max_depth == 0 {
            anyhow::bail!("graph.max_depth must be greater than 0");
        }

        if self.places.context_places == 0 {
            anyhow::bail!("places.context_places must be greater than 0");
        }

        if !(0.0..=2.0).contains(&self.generation.temperature) {
            anyhow::bail!("generation.temperature must be between 0.0 and 2.0");
        }

        if self.generation.model.trim().is_empty() {
            anyhow::bail!("generation.model must not be empty");
        }

        Ok(())
    }

    /// Get database path
    pub fn db_path(&self) -> &Path {
        &self.graph.db_path
    }

    /// Get the known-destinations file path
    pub fn known_destinations_path(&self) -> &Path {
        &self.tripgraph.known_destinations_path
    }
}
