//! Configuration loading and validation for the resource API.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if any required variable is missing or invalid.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Validated resource API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// ID Permanence private key, hex- or base64-encoded. **Required.**
    /// Never logged.
    pub id_permanence_secret: String,

    /// Port the HTTP server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Public base URI used when building response links.
    #[serde(default = "default_base_uri")]
    pub base_uri: String,

    /// Page size applied when the request omits `page-size`.
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Largest accepted `page-size` value.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,

    /// OTLP endpoint for span export. Optional; spans stay local when unset.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_listen_port() -> u16 {
    8100
}
fn default_base_uri() -> String {
    "https://localhost:8100".into()
}
fn default_page_size() -> u32 {
    25
}
fn default_max_page_size() -> u32 {
    1000
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        if self.id_permanence_secret.trim().is_empty() {
            anyhow::bail!("ID_PERMANENCE_SECRET is required and must not be empty");
        }
        if self.base_uri.trim().is_empty() {
            anyhow::bail!("BASE_URI must not be empty");
        }
        if self.default_page_size == 0 {
            anyhow::bail!("DEFAULT_PAGE_SIZE must be > 0");
        }
        if self.max_page_size < self.default_page_size {
            anyhow::bail!("MAX_PAGE_SIZE must be >= DEFAULT_PAGE_SIZE");
        }
        Ok(())
    }
}
