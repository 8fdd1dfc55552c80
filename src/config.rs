use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::core::enrich::{DEFAULT_FALLBACK_DESCRIPTION, DEFAULT_MAX_ENRICHED};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub datastore: DatastoreSettings,
    pub enrichment: EnrichmentSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

/// Which data store backend serves skill and profile reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatastoreBackend {
    Supabase,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatastoreSettings {
    #[serde(default = "default_backend")]
    pub backend: DatastoreBackend,
    /// REST base URL (supabase backend)
    pub url: Option<String>,
    /// Service role key (supabase backend)
    pub service_key: Option<String>,
    /// Connection string (postgres backend)
    pub database_url: Option<String>,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

fn default_backend() -> DatastoreBackend { DatastoreBackend::Supabase }

#[derive(Debug, Clone, Deserialize)]
pub struct EnrichmentSettings {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_enriched")]
    pub max_enriched: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_fallback_description")]
    pub fallback_description: String,
}

fn default_endpoint() -> String { "https://ai.gateway.lovable.dev/v1/chat/completions".to_string() }
fn default_model() -> String { "google/gemini-2.5-flash".to_string() }
fn default_max_enriched() -> usize { DEFAULT_MAX_ENRICHED }
fn default_timeout_secs() -> u64 { 30 }
fn default_fallback_description() -> String { DEFAULT_FALLBACK_DESCRIPTION.to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with SKILL_MATCH__)
    /// 5. Well-known variables such as SUPABASE_URL
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., SKILL_MATCH__SERVER__PORT -> server.port
            .add_source(env_source())
            .build()?;

        apply_well_known_env(settings, |key| std::env::var(key).ok())?.try_deserialize()
    }

    /// Endpoint, key and timeout checks that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.datastore.backend {
            DatastoreBackend::Supabase => {
                if self.datastore.url.as_deref().map_or(true, str::is_empty) {
                    return Err(ConfigError::Message("datastore.url is required for the supabase backend".into()));
                }
                if self.datastore.service_key.as_deref().map_or(true, str::is_empty) {
                    return Err(ConfigError::Message(
                        "datastore.service_key is required for the supabase backend".into(),
                    ));
                }
            }
            DatastoreBackend::Postgres => {
                if self.datastore.database_url.as_deref().map_or(true, str::is_empty) {
                    return Err(ConfigError::Message(
                        "datastore.database_url is required for the postgres backend".into(),
                    ));
                }
            }
        }

        if self.enrichment.timeout_secs == 0 {
            return Err(ConfigError::Message("enrichment.timeout_secs must be positive".into()));
        }

        Ok(())
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("SKILL_MATCH")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Environment variables the hosting platform sets under fixed names
const WELL_KNOWN_ENV: &[(&str, &str)] = &[
    ("SUPABASE_URL", "datastore.url"),
    ("SUPABASE_SERVICE_ROLE_KEY", "datastore.service_key"),
    ("DATABASE_URL", "datastore.database_url"),
    ("AI_GATEWAY_API_KEY", "enrichment.api_key"),
];

fn apply_well_known_env<F>(settings: Config, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut builder = Config::builder().add_source(settings);

    for (var, key) in WELL_KNOWN_ENV {
        if let Some(value) = lookup(var).filter(|v| !v.is_empty()) {
            builder = builder.set_override(*key, value)?;
        }
    }

    builder.build()
}
