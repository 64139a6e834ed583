//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid environment override {name}: {message}")]
    Env { name: &'static str, message: String },

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

/// Load and validate configuration from a TOML file, then apply
/// environment overrides.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: GatewayConfig = toml::from_str(&content)?;
    finalize(config)
}

/// Defaults plus environment overrides, for runs without a config file.
pub fn load_default() -> Result<GatewayConfig, ConfigError> {
    finalize(GatewayConfig::default())
}

fn finalize(mut config: GatewayConfig) -> Result<GatewayConfig, ConfigError> {
    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Overlay `JWT_SECRET`, `ADMIN_USERNAME`, `ADMIN_PASSWORD` and `GATEWAY_ENV`.
///
/// Empty values are ignored. The backend URL variables are not handled
/// here; they are resolved per request by the upstream provider.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(secret) = get("JWT_SECRET") {
        config.auth.secret = Some(secret);
    }
    if let Some(username) = get("ADMIN_USERNAME") {
        config.admin.username = username;
    }
    if let Some(password) = get("ADMIN_PASSWORD") {
        config.admin.password = Some(password);
    }
    if let Some(env) = get("GATEWAY_ENV") {
        config.auth.environment = env.parse().map_err(|message| ConfigError::Env {
            name: "GATEWAY_ENV",
            message,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::Environment;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_env_overrides_applied() {
        let mut config = GatewayConfig::default();
        apply_env_overrides(
            &mut config,
            lookup(&[
                ("JWT_SECRET", "s3cret"),
                ("ADMIN_USERNAME", "chef"),
                ("ADMIN_PASSWORD", "hunter2"),
                ("GATEWAY_ENV", "production"),
            ]),
        )
        .unwrap();

        assert_eq!(config.auth.secret.as_deref(), Some("s3cret"));
        assert_eq!(config.admin.username, "chef");
        assert_eq!(config.admin.password.as_deref(), Some("hunter2"));
        assert_eq!(config.auth.environment, Environment::Production);
    }

    #[test]
    fn test_empty_env_values_ignored() {
        let mut config = GatewayConfig::default();
        config.auth.secret = Some("from-file".into());
        apply_env_overrides(&mut config, lookup(&[("JWT_SECRET", "  ")])).unwrap();
        assert_eq!(config.auth.secret.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_bad_environment_rejected() {
        let mut config = GatewayConfig::default();
        let err = apply_env_overrides(&mut config, lookup(&[("GATEWAY_ENV", "qa")])).unwrap_err();
        assert!(matches!(err, ConfigError::Env { name: "GATEWAY_ENV", .. }));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [listener]
            bind_address = "127.0.0.1:4000"

            [upstream]
            fallback_url = "http://backend.internal:3001/api"
            request_timeout_secs = 10
            "#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:4000");
        assert_eq!(config.upstream.fallback_url, "http://backend.internal:3001/api");
        assert_eq!(config.upstream.request_timeout_secs, 10);
    }

    #[test]
    fn test_load_config_reports_validation_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[upstream]\nconnect_timeout_secs = 0").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref e) if e.len() == 1));
        assert!(err.to_string().contains("upstream.connect_timeout_secs"));
    }

    #[test]
    fn test_load_config_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[upstream\nfallback_url = 1").unwrap();
        assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));
    }
}
