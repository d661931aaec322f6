//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `origin` is not an absolute http(s) URL
    /// - `cache_prefix` or `cache_version` is empty or contains whitespace
    /// - `shell_manifest` is empty or has a path not starting with `/`
    /// - a `network_only_routes` pattern is empty or not starting with `/`
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        match url::Url::parse(&self.origin) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.host_str().is_some() => {}
            Ok(url) => return Err(invalid("origin", format!("unsupported origin: {url}"))),
            Err(e) => return Err(invalid("origin", e.to_string())),
        }

        for (field, value) in [("cache_prefix", &self.cache_prefix), ("cache_version", &self.cache_version)] {
            if value.is_empty() {
                return Err(invalid(field, "must not be empty"));
            }
            if value.chars().any(char::is_whitespace) {
                return Err(invalid(field, "must not contain whitespace"));
            }
        }

        if self.shell_manifest.is_empty() {
            return Err(invalid("shell_manifest", "must list at least one path"));
        }
        if let Some(path) = self.shell_manifest.iter().find(|p| !p.starts_with('/')) {
            return Err(invalid("shell_manifest", format!("path must start with '/': {path}")));
        }

        if let Some(pattern) = self.network_only_routes.iter().find(|p| !p.starts_with('/')) {
            return Err(invalid("network_only_routes", format!("pattern must start with '/': {pattern:?}")));
        }

        if self.max_bytes == 0 {
            return Err(invalid("max_bytes", "must be greater than 0"));
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(invalid("max_bytes", "must not exceed 50MB"));
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if self.network_only_routes.is_empty() {
            tracing::warn!("network_only_routes is empty; API responses will be cached like shell resources");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::ShellManifest;

    fn field_of(result: Result<(), ConfigError>) -> String {
        match result {
            Err(ConfigError::Invalid { field, .. }) => field,
            other => panic!("expected invalid config, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_origin() {
        let config = AppConfig { origin: "not a url".into(), ..Default::default() };
        assert_eq!(field_of(config.validate()), "origin");

        let config = AppConfig { origin: "file:///srv/app".into(), ..Default::default() };
        assert_eq!(field_of(config.validate()), "origin");
    }

    #[test]
    fn test_validate_version() {
        let config = AppConfig { cache_version: String::new(), ..Default::default() };
        assert_eq!(field_of(config.validate()), "cache_version");

        let config = AppConfig { cache_version: "v 2".into(), ..Default::default() };
        assert_eq!(field_of(config.validate()), "cache_version");
    }

    #[test]
    fn test_validate_manifest() {
        let config = AppConfig { shell_manifest: ShellManifest::new(Vec::<String>::new()), ..Default::default() };
        assert_eq!(field_of(config.validate()), "shell_manifest");

        let config = AppConfig { shell_manifest: ShellManifest::new(["/", "index.html"]), ..Default::default() };
        assert_eq!(field_of(config.validate()), "shell_manifest");
    }

    #[test]
    fn test_validate_routes() {
        let config = AppConfig { network_only_routes: vec!["api/*".into()], ..Default::default() };
        assert_eq!(field_of(config.validate()), "network_only_routes");
    }

    #[test]
    fn test_validate_limits() {
        let config = AppConfig { max_bytes: 0, ..Default::default() };
        assert_eq!(field_of(config.validate()), "max_bytes");

        let config = AppConfig { timeout_ms: 50, ..Default::default() };
        assert_eq!(field_of(config.validate()), "timeout_ms");

        let config = AppConfig { timeout_ms: 301_000, ..Default::default() };
        assert_eq!(field_of(config.validate()), "timeout_ms");

        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        assert_eq!(field_of(config.validate()), "user_agent");
    }

    #[test]
    fn test_validate_max_values() {
        let config = AppConfig { max_bytes: 50 * 1024 * 1024, timeout_ms: 300_000, ..Default::default() };
        assert!(config.validate().is_ok());
    }
}
