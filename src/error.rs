//! Domain-specific error types for ethics-dashboard

use thiserror::Error;

/// Main error type for the dashboard and its simulator client
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// User-facing input problem, raised before any network call.
    #[error("{message}")]
    Validation { message: String },

    /// Generic per-endpoint failure; the transport detail is only logged.
    #[error("{message}")]
    Request { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Export error: {message}")]
    Export { message: String },
}

impl DashboardError {
    pub fn validation(message: impl Into<String>) -> Self {
        DashboardError::Validation {
            message: message.into(),
        }
    }

    pub fn request(message: impl Into<String>) -> Self {
        DashboardError::Request {
            message: message.into(),
        }
    }

    /// True for errors the user caused and can fix from the UI.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            DashboardError::Validation { .. } | DashboardError::Request { .. }
        )
    }
}

impl From<serde_json::Error> for DashboardError {
    fn from(err: serde_json::Error) -> Self {
        DashboardError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for DashboardError {
    fn from(err: toml::de::Error) -> Self {
        DashboardError::Config {
            message: format!("Invalid config file: {}", err),
        }
    }
}

impl From<csv::Error> for DashboardError {
    fn from(err: csv::Error) -> Self {
        DashboardError::Export {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for DashboardError {
    fn from(err: std::io::Error) -> Self {
        DashboardError::Export {
            message: err.to_string(),
        }
    }
}

/// Result type alias for dashboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_error_shows_only_generic_message() {
        let err = DashboardError::request("Simulation failed");
        assert_eq!(err.to_string(), "Simulation failed");
        assert!(err.is_user_facing());
    }

    #[test]
    fn test_config_error_is_not_user_facing() {
        let err = DashboardError::Config {
            message: "bad".into(),
        };
        assert!(!err.is_user_facing());
        assert_eq!(err.to_string(), "Configuration error: bad");
    }
}
