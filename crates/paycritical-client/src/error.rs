//! Paycritical gateway error types.
//!
//! The first five variants are derived from the HTTP status of a completed
//! round trip (see [`crate::validation::validate_response`]). Transport and
//! deserialization failures are kept apart from them so a caller can tell
//! "the server said no" from "the server was never reached".

use crate::transport::BoxError;

/// Errors from Paycritical gateway calls.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// HTTP 400: the request was rejected as invalid.
    #[error("request rejected as invalid ({code}): {description}")]
    Validation { code: String, description: String },

    /// HTTP 401: the credential is missing or malformed.
    #[error("unauthorized: {body}")]
    Unauthorized { body: String },

    /// HTTP 403: the credential was presented but rejected.
    #[error("forbidden: {body}")]
    Forbidden { body: String },

    /// HTTP 500: server-side fault. The body usually carries an event id
    /// to quote to Paycritical support.
    #[error("gateway internal server error: {body}")]
    InternalServerError { body: String },

    /// Any other non-2xx status.
    #[error("gateway returned {status}: {body}")]
    Api { status: u16, body: String },

    /// The request never produced an HTTP response.
    #[error("HTTP error calling {endpoint}: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: BoxError,
    },

    /// A request payload could not be encoded as JSON.
    #[error("failed to serialize request for {endpoint}: {source}")]
    Serialization {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    /// A 2xx body did not match the expected response shape.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl GatewayError {
    /// HTTP status an API-level error was derived from.
    ///
    /// `None` for failures that happened without a gateway answer.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Validation { .. } => Some(400),
            Self::Unauthorized { .. } => Some(401),
            Self::Forbidden { .. } => Some(403),
            Self::InternalServerError { .. } => Some(500),
            Self::Api { status, .. } => Some(*status),
            Self::Transport { .. }
            | Self::Serialization { .. }
            | Self::Deserialization { .. }
            | Self::Config(_) => None,
        }
    }

    /// Whether re-issuing the same call unchanged could succeed.
    ///
    /// Advisory only. The gateway client never retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::InternalServerError { .. } | Self::Transport { .. })
    }
}
