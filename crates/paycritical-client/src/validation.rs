//! Response classification.
//!
//! Every round trip passes through [`validate_response`] before any
//! success-path decoding. Status codes are checked in a fixed order:
//! 2xx, 400, 401, 403, 500, then everything else falls into
//! [`GatewayError::Api`]. A code without its own arm (404, 409, 502, ...)
//! therefore always lands in the generic bucket.

use serde::{Deserialize, Deserializer};

use crate::error::GatewayError;

/// Fallback code used when a 400 body is not a validation summary.
pub const DEFAULT_VALIDATION_CODE: &str = "400";

/// Fallback description used when a 400 body is not a validation summary.
pub const DEFAULT_VALIDATION_DESCRIPTION: &str = "The request is invalid.";

/// `{code, description}` pair returned by the gateway with HTTP 400.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ValidationSummary {
    #[serde(deserialize_with = "string_or_number")]
    pub code: String,
    pub description: String,
}

impl Default for ValidationSummary {
    fn default() -> Self {
        Self {
            code: DEFAULT_VALIDATION_CODE.to_string(),
            description: DEFAULT_VALIDATION_DESCRIPTION.to_string(),
        }
    }
}

impl ValidationSummary {
    /// Parse a 400 body, falling back to the default summary when the body
    /// is empty, not JSON, or lacks either field.
    pub fn from_body(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }
}

/// Classify an HTTP status and body.
///
/// Returns `Ok(())` for any status in `200..=299`. For every other status
/// the body is carried into the error verbatim, except for 400 where it is
/// parsed as a [`ValidationSummary`].
pub fn validate_response(status: u16, body: &str) -> Result<(), GatewayError> {
    if (200..=299).contains(&status) {
        return Ok(());
    }

    match status {
        400 => {
            let summary = ValidationSummary::from_body(body);
            Err(GatewayError::Validation {
                code: summary.code,
                description: summary.description,
            })
        }
        401 => Err(GatewayError::Unauthorized {
            body: body.to_string(),
        }),
        403 => Err(GatewayError::Forbidden {
            body: body.to_string(),
        }),
        500 => Err(GatewayError::InternalServerError {
            body: body.to_string(),
        }),
        _ => Err(GatewayError::Api {
            status,
            body: body.to_string(),
        }),
    }
}

/// Accept `"code": "E42"` as well as `"code": 42`.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Code {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Code::deserialize(deserializer)? {
        Code::Text(s) => s,
        Code::Number(n) => n.to_string(),
    })
}
