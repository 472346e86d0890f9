//! Gateway error types

use thiserror::Error;

/// Why an integration read produced no records
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{integration} integration is not configured or enabled")]
    NotConfigured { integration: &'static str },

    #[error("{integration} credential variable {variable} is not set")]
    MissingCredentials {
        integration: &'static str,
        variable: String,
    },

    #[error("{integration} responded with HTTP {status}")]
    Upstream { integration: &'static str, status: u16 },

    #[error("{integration} is unreachable: {source}")]
    Transport {
        integration: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{integration} returned a body that is not JSON: {source}")]
    InvalidBody {
        integration: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl GatewayError {
    pub fn integration(&self) -> &'static str {
        match self {
            GatewayError::NotConfigured { integration }
            | GatewayError::MissingCredentials { integration, .. }
            | GatewayError::Upstream { integration, .. }
            | GatewayError::Transport { integration, .. }
            | GatewayError::InvalidBody { integration, .. } => *integration,
        }
    }

    /// Whether fixing dashboard settings would resolve the error
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            GatewayError::NotConfigured { .. } | GatewayError::MissingCredentials { .. }
        )
    }
}

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;
