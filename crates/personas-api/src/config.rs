//! Server configuration, read from an optional TOML file layered under
//! `PERSONAS_*` environment variables.

use std::path::PathBuf;

use serde::Deserialize;

/// Runtime server configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                 String,
  pub port:                 u16,
  pub store_path:           PathBuf,
  /// CORS allow-list. Empty means no cross-origin access.
  #[serde(default)]
  pub allowed_origins:      Vec<String>,
  pub request_timeout_secs: u64,
}

impl ServerConfig {
  /// Load from `path` (missing file is fine) and the environment.
  ///
  /// `PERSONAS_ALLOWED_ORIGINS` takes a comma-separated list.
  pub fn load(path: PathBuf) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .set_default("host", "127.0.0.1")?
      .set_default("port", 8080_i64)?
      .set_default("store_path", "personas.db")?
      .set_default("request_timeout_secs", 30_i64)?
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("PERSONAS")
          .try_parsing(true)
          .list_separator(",")
          .with_list_parse_key("allowed_origins"),
      )
      .build()?
      .try_deserialize()
  }
}
