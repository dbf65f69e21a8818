//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

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

pub const WEATHER_API_KEY_ENV: &str = "AGGREGATOR_WEATHER_API_KEY";
pub const NEWS_API_KEY_ENV: &str = "AGGREGATOR_NEWS_API_KEY";
pub const PLAYLIST_CLIENT_ID_ENV: &str = "AGGREGATOR_PLAYLIST_CLIENT_ID";
pub const PLAYLIST_CLIENT_SECRET_ENV: &str = "AGGREGATOR_PLAYLIST_CLIENT_SECRET";

/// Load and validate configuration from a TOML file.
///
/// `None` starts from defaults. Environment overrides apply in both cases.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut config = match path {
        Some(path) => parse_config(&fs::read_to_string(path)?)?,
        None => AppConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Parse TOML text without validating it.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Replace secrets with values from `lookup` when present and non-empty.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let targets: [(&str, &mut String); 4] = [
        (WEATHER_API_KEY_ENV, &mut config.weather.api_key),
        (NEWS_API_KEY_ENV, &mut config.news.api_key),
        (PLAYLIST_CLIENT_ID_ENV, &mut config.playlist.client_id),
        (PLAYLIST_CLIENT_SECRET_ENV, &mut config.playlist.client_secret),
    ];

    for (name, field) in targets {
        if let Some(value) = lookup(name).filter(|v| !v.trim().is_empty()) {
            *field = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = parse_config(
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [cache]
            lock_timeout_ms = 250

            [news]
            query = "rust"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.cache.lock_timeout_ms, 250);
        assert_eq!(config.cache.weather_ttl_secs, 86_400);
        assert_eq!(config.cache.token_ttl_secs, 3000);
        assert_eq!(config.news.query, "rust");
        assert_eq!(config.weather.location, "Athens,GR");
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let err = parse_config("[listener\nbind_address = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_env_overrides_secrets() {
        let env: HashMap<&str, &str> = HashMap::from([
            (WEATHER_API_KEY_ENV, "weather-key"),
            (PLAYLIST_CLIENT_SECRET_ENV, "shh"),
            (NEWS_API_KEY_ENV, "  "),
        ]);
        let mut config = AppConfig::default();
        config.news.api_key = "from-file".to_string();

        apply_env_overrides(&mut config, |name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.weather.api_key, "weather-key");
        assert_eq!(config.playlist.client_secret, "shh");
        assert_eq!(config.news.api_key, "from-file");
        assert_eq!(config.playlist.client_id, "");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Some(Path::new("/nonexistent/aggregator.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
