//! Hosted backend client.
//!
//! # Architecture
//!
//! - Catalog and orders live in a hosted backend-as-a-service and are
//!   reached over its REST interface with `reqwest`
//! - The backend is source of truth - NO local sync, direct API calls
//! - In-memory caching via `moka` for catalog reads (5 minute TTL)
//! - Order writes are never cached
//!
//! The client implements the core [`kurohana_core::OrderGateway`] and
//! [`kurohana_core::CatalogReader`] contracts, so the checkout engine only
//! ever sees the traits.

mod client;
mod orders;
pub mod types;

pub use client::BackendClient;

use kurohana_core::GatewayError;
use thiserror::Error;

/// Errors that can occur when talking to the hosted backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed (network, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {message}")]
    Api { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A write expected a representation back and got none.
    #[error("empty response from backend")]
    EmptyResponse,
}

impl From<BackendError> for GatewayError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Http(e) => Self::Unavailable(e.to_string()),
            BackendError::Api { status, message } => {
                if (500..600).contains(&status) {
                    Self::Unavailable(format!("{status}: {message}"))
                } else {
                    Self::Rejected(format!("{status}: {message}"))
                }
            }
            BackendError::Parse(e) => Self::InvalidResponse(e.to_string()),
            BackendError::EmptyResponse => Self::InvalidResponse("empty response".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = BackendError::Api {
            status: 400,
            message: "missing required column".to_string(),
        };
        assert_eq!(err.to_string(), "backend returned 400: missing required column");
    }

    #[test]
    fn test_gateway_mapping_splits_on_status() {
        let rejected: GatewayError = BackendError::Api {
            status: 422,
            message: "bad row".to_string(),
        }
        .into();
        assert!(matches!(rejected, GatewayError::Rejected(_)));

        let unavailable: GatewayError = BackendError::Api {
            status: 503,
            message: "maintenance".to_string(),
        }
        .into();
        assert!(matches!(unavailable, GatewayError::Unavailable(_)));
    }
}
