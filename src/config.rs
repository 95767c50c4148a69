use serde::{Deserialize, Serialize};

use crate::scenario::{TOP_K_DEFAULT, clamp_top_k};

pub const DEFAULT_API_BASE: &str = "http://localhost:8000/api";
pub const DEFAULT_CONFIG_FILE: &str = "ethics_dashboard.toml";
pub const DEFAULT_LOG_FILTER: &str = "ethics_dashboard=info";
pub const RECORDS_LIMIT_DEFAULT: usize = 20;
const RECORDS_LIMIT_MAX: usize = 500;

/// Main configuration loaded from ethics_dashboard.toml and environment variables
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    /// Runtime configuration loaded from environment variables
    #[serde(skip)]
    pub runtime: RuntimeConfig,
}

/// Simulation backend location
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
        }
    }
}

/// Parameters used before a scenario supplies its own
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DefaultsConfig {
    pub top_k: i64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            top_k: TOP_K_DEFAULT,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DisplayConfig {
    /// Rows in the records preview before "show all".
    pub records_limit: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            records_limit: RECORDS_LIMIT_DEFAULT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub log_level: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl RuntimeConfig {
    pub fn load_from_env() -> Self {
        Self {
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string()),
        }
    }
}

impl Config {
    /// Load configuration from TOML file and environment variables.
    /// Uses ETHICS_DASHBOARD_CONFIG or defaults to "ethics_dashboard.toml".
    pub fn load() -> crate::error::Result<Self> {
        // ETHICS_ENV_FILE if set, else ./.env when present
        if let Ok(env_path) = std::env::var("ETHICS_ENV_FILE") {
            let _ = dotenvy::from_path(env_path);
        } else {
            let _ = dotenvy::from_path(".env");
        }

        let config_path = std::env::var("ETHICS_DASHBOARD_CONFIG")
            .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        let mut config: Config = if let Ok(content) = std::fs::read_to_string(&config_path) {
            Self::from_toml_str(&content)?
        } else {
            tracing::warn!("Config file {} not found, using defaults", config_path);
            Self::default()
        };

        config.apply_env_overrides();
        config.runtime = RuntimeConfig::load_from_env();
        config.validate();
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> crate::error::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Env-first overrides. Unparsable numbers are ignored with a warning.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(base) = std::env::var("ETHICS_API_BASE") {
            self.api.base_url = base;
            tracing::debug!("ETHICS_API_BASE env override applied");
        }
        if let Ok(raw) = std::env::var("ETHICS_DEFAULT_TOP_K") {
            match raw.trim().parse::<i64>() {
                Ok(v) => self.defaults.top_k = v,
                Err(_) => tracing::warn!("Ignoring ETHICS_DEFAULT_TOP_K '{}': not an integer", raw),
            }
        }
        if let Ok(raw) = std::env::var("ETHICS_RECORDS_LIMIT") {
            match raw.trim().parse::<usize>() {
                Ok(v) => self.display.records_limit = v,
                Err(_) => tracing::warn!("Ignoring ETHICS_RECORDS_LIMIT '{}': not a count", raw),
            }
        }
    }

    /// Clamp out-of-range values, warning on each change.
    pub fn validate(&mut self) {
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://")
        {
            tracing::warn!(
                "API base URL '{}' doesn't start with http:// or https://",
                self.api.base_url
            );
        }
        let trimmed = self.api.base_url.trim_end_matches('/');
        if trimmed.len() != self.api.base_url.len() {
            self.api.base_url = trimmed.to_string();
        }

        let top_k = clamp_top_k(self.defaults.top_k);
        if top_k != self.defaults.top_k {
            tracing::warn!(
                "defaults.top_k {} out of range, clamping to {}",
                self.defaults.top_k,
                top_k
            );
            self.defaults.top_k = top_k;
        }

        if self.display.records_limit == 0 {
            tracing::warn!("display.records_limit 0 is invalid, using {}", RECORDS_LIMIT_DEFAULT);
            self.display.records_limit = RECORDS_LIMIT_DEFAULT;
        } else if self.display.records_limit > RECORDS_LIMIT_MAX {
            tracing::warn!(
                "display.records_limit {} exceeds max {}, clamping",
                self.display.records_limit,
                RECORDS_LIMIT_MAX
            );
            self.display.records_limit = RECORDS_LIMIT_MAX;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:8000/api");
        assert_eq!(config.defaults.top_k, 10);
        assert_eq!(config.display.records_limit, 20);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = Config::from_toml_str("[api]\nbase_url = \"http://sim:9000/api/\"\n").unwrap();
        assert_eq!(config.api.base_url, "http://sim:9000/api/");
        assert_eq!(config.defaults.top_k, 10);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = Config::from_toml_str("[defaults]\ntop_k = \"many\"").unwrap_err();
        assert!(matches!(err, crate::error::DashboardError::Config { .. }));
    }

    #[test]
    fn test_validate_clamps() {
        let mut config = Config::default();
        config.api.base_url = "http://sim/api/".into();
        config.defaults.top_k = 400;
        config.display.records_limit = 0;
        config.validate();
        assert_eq!(config.api.base_url, "http://sim/api");
        assert_eq!(config.defaults.top_k, 50);
        assert_eq!(config.display.records_limit, RECORDS_LIMIT_DEFAULT);
    }
}
