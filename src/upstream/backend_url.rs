//! Backend base URL resolution.
//!
//! The gateway asks a [`BackendUrlProvider`] for the base URL on every
//! request. Production uses [`EnvBackendUrl`]; tests and embedders can hand
//! in a [`FixedBackendUrl`] without touching the process environment.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::config::GatewayConfig;

/// Checked first.
pub const PUBLIC_API_URL_VAR: &str = "NEXT_PUBLIC_API_URL";
/// Checked when [`PUBLIC_API_URL_VAR`] is unset.
pub const BACKEND_API_URL_VAR: &str = "BACKEND_API_URL";

/// Source of the upstream base URL.
pub trait BackendUrlProvider: Send + Sync {
    /// Base URL without trailing slashes.
    fn backend_url(&self) -> String;
}

/// Pick the first non-empty candidate and strip trailing slashes.
pub fn resolve_backend_url<F>(lookup: F, fallback: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let base = [PUBLIC_API_URL_VAR, BACKEND_API_URL_VAR]
        .into_iter()
        .filter_map(|name| lookup(name))
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string());
    base.trim().trim_end_matches('/').to_string()
}

/// Reads the environment on each call, falling back to the live config.
#[derive(Clone)]
pub struct EnvBackendUrl {
    config: Arc<ArcSwap<GatewayConfig>>,
}

impl EnvBackendUrl {
    pub fn new(config: Arc<ArcSwap<GatewayConfig>>) -> Self {
        Self { config }
    }

    /// True when neither variable is set and the fallback is in use.
    pub fn using_fallback(&self) -> bool {
        [PUBLIC_API_URL_VAR, BACKEND_API_URL_VAR]
            .iter()
            .all(|name| std::env::var(name).map(|v| v.trim().is_empty()).unwrap_or(true))
    }
}

impl BackendUrlProvider for EnvBackendUrl {
    fn backend_url(&self) -> String {
        let config = self.config.load();
        resolve_backend_url(|name| std::env::var(name).ok(), &config.upstream.fallback_url)
    }
}

/// A constant base URL.
#[derive(Debug, Clone)]
pub struct FixedBackendUrl(String);

impl FixedBackendUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into().trim_end_matches('/').to_string())
    }
}

impl BackendUrlProvider for FixedBackendUrl {
    fn backend_url(&self) -> String {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_BACKEND_URL;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_public_url_wins() {
        let url = resolve_backend_url(
            env(&[
                (PUBLIC_API_URL_VAR, "https://api.example.com/api/"),
                (BACKEND_API_URL_VAR, "http://internal:3001/api"),
            ]),
            DEFAULT_BACKEND_URL,
        );
        assert_eq!(url, "https://api.example.com/api");
    }

    #[test]
    fn test_backend_url_second() {
        let url = resolve_backend_url(
            env(&[(BACKEND_API_URL_VAR, "http://internal:3001/api")]),
            DEFAULT_BACKEND_URL,
        );
        assert_eq!(url, "http://internal:3001/api");
    }

    #[test]
    fn test_empty_values_fall_through() {
        let url = resolve_backend_url(
            env(&[(PUBLIC_API_URL_VAR, ""), (BACKEND_API_URL_VAR, "  ")]),
            DEFAULT_BACKEND_URL,
        );
        assert_eq!(url, "http://localhost:3001/api");
    }

    #[test]
    fn test_strips_all_trailing_slashes() {
        let url = resolve_backend_url(env(&[]), "http://localhost:3001/api///");
        assert_eq!(url, "http://localhost:3001/api");
        assert_eq!(FixedBackendUrl::new("http://b/api//").backend_url(), "http://b/api");
    }

    #[test]
    fn test_env_provider_follows_config_fallback() {
        let live = Arc::new(ArcSwap::from_pointee(GatewayConfig::default()));
        let provider = EnvBackendUrl::new(live.clone());
        if !provider.using_fallback() {
            return;
        }
        assert_eq!(provider.backend_url(), DEFAULT_BACKEND_URL);

        let mut next = GatewayConfig::default();
        next.upstream.fallback_url = "http://127.0.0.1:4001/api/".into();
        live.store(Arc::new(next));
        assert_eq!(provider.backend_url(), "http://127.0.0.1:4001/api");
    }
}
