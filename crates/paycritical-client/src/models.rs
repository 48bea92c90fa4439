//! Response types matching the Paycritical POS API schemas.
//!
//! Status fields are kept as strings: the lifecycle states are owned by the
//! gateway and the client never branches on them. Unknown fields are ignored,
//! and a JSON `null` reads the same as a missing field.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Status a QR code reports until a payment is attached to it.
pub const QR_CODE_REQUESTED: &str = "Requested";

/// Server-side classification of a payment request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    /// Reserve the amount; settle later through captures.
    Authorization,
    /// Reserve and settle immediately.
    Capture,
    /// Forward-compatible catch-all.
    #[serde(other)]
    Unknown,
}

/// Payment request as returned by `POST /api/payment`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub payment_id: String,
    #[serde(default)]
    pub payment_human_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default)]
    pub transaction_type: Option<TransactionType>,
    #[serde(default)]
    pub amount: Option<Decimal>,
}

/// Payment as returned by `GET /api/payment/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatus {
    #[serde(default)]
    pub payment_id: Option<String>,
    #[serde(default)]
    pub payment_human_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default)]
    pub transaction_type: Option<TransactionType>,
    #[serde(default)]
    pub amount: Option<Decimal>,
}

/// Authorization details as returned by `GET /api/payment/{id}/authorization`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Authorization {
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    /// Gateway-local timestamp, passed through as sent
    /// (e.g. `2021-09-25T14:10:43.017`, no offset).
    #[serde(default)]
    pub expiration: Option<String>,
    #[serde(default)]
    pub remaining_amount: Option<Decimal>,
    /// Captures taken against this authorization, oldest first.
    #[serde(default, deserialize_with = "null_as_default")]
    pub captures: Vec<Capture>,
}

/// A single capture against an authorization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capture {
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// QR code as returned by `POST /api/qrcode`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrCode {
    pub qr_code_id: String,
}

/// QR code status as returned by `GET /api/qrCode/{id}`.
///
/// The gateway answers 204 while nobody has paid the code yet; that answer
/// and a body without a `status` both read as [`QR_CODE_REQUESTED`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QrCodeStatus {
    pub payment_id: Option<String>,
    pub payment_human_id: Option<String>,
    #[serde(deserialize_with = "null_as_requested")]
    pub status: String,
}

impl Default for QrCodeStatus {
    fn default() -> Self {
        Self {
            payment_id: None,
            payment_human_id: None,
            status: QR_CODE_REQUESTED.to_string(),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn null_as_requested<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)
        .map(|status| status.unwrap_or_else(|| QR_CODE_REQUESTED.to_string()))
}
