//! Configuration loading from disk and the environment.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {name}: '{value}'")]
    InvalidEnv { name: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: TOML file (if given), then environment overrides, then validation.
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => ServiceConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply `PORT`, `DB_PATH`, `BASIC_AUTH_USER_ID`, `BASIC_AUTH_PASSWORD` and
/// `DRAIN_TIMEOUT_SECS`. Empty values are treated as unset.
pub fn apply_env_overrides<F>(config: &mut ServiceConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

    if let Some(port) = get("PORT") {
        config.listener.bind_address = normalize_bind_address(&port);
    }
    if let Some(path) = get("DB_PATH") {
        config.database.path = PathBuf::from(path);
    }
    if let Some(user_id) = get("BASIC_AUTH_USER_ID") {
        config.auth.user_id = Some(user_id);
    }
    if let Some(password) = get("BASIC_AUTH_PASSWORD") {
        config.auth.password = Some(password);
    }
    if let Some(secs) = get("DRAIN_TIMEOUT_SECS") {
        config.shutdown.drain_timeout_secs = secs.parse().map_err(|_| ConfigError::InvalidEnv {
            name: "DRAIN_TIMEOUT_SECS",
            value: secs.clone(),
        })?;
    }

    Ok(())
}

/// Accepts `:8080`, `8080` or a full `host:port`.
pub fn normalize_bind_address(port: &str) -> String {
    if let Some(rest) = port.strip_prefix(':') {
        format!("0.0.0.0:{rest}")
    } else if port.chars().all(|c| c.is_ascii_digit()) {
        format!("0.0.0.0:{port}")
    } else {
        port.to_string()
    }
}
