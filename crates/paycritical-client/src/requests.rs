//! Request bodies, one shape per mutating operation.
//!
//! Amounts go over the wire as base-10 strings (`"1.23"`), never as JSON
//! numbers. Trailing zeros are dropped, so `0.10` and `0.1` send the same
//! `"0.1"`.

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

use crate::models::TransactionType;

/// Body of `POST /api/payment`, shared by authorization and capture requests.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    #[serde(serialize_with = "amount_string")]
    pub amount: Decimal,
    pub order_ref: String,
    pub phone_number: String,
    pub transaction_type: TransactionType,
}

impl PaymentRequest {
    /// Reserve `amount` on the customer's phone; settle later with captures.
    pub fn authorization(amount: Decimal, phone_number: &str, order_ref: &str) -> Self {
        Self::new(amount, phone_number, order_ref, TransactionType::Authorization)
    }

    /// Reserve and settle `amount` in one step.
    pub fn capture(amount: Decimal, phone_number: &str, order_ref: &str) -> Self {
        Self::new(amount, phone_number, order_ref, TransactionType::Capture)
    }

    fn new(
        amount: Decimal,
        phone_number: &str,
        order_ref: &str,
        transaction_type: TransactionType,
    ) -> Self {
        Self {
            amount,
            order_ref: order_ref.to_string(),
            phone_number: phone_number.to_string(),
            transaction_type,
        }
    }
}

/// Body of `POST /api/payment/resend`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResendPaymentRequest {
    pub payment_id: String,
}

/// Body of `POST /api/qrcode`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QrCodeRequest {
    #[serde(serialize_with = "amount_string")]
    pub amount: Decimal,
    pub order_ref: String,
}

/// Body of `PUT /api/payment/cancel`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelPaymentRequest {
    pub payment_id: String,
}

/// Body of `PUT /api/payment/refund`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundPaymentRequest {
    pub payment_id: String,
    #[serde(serialize_with = "amount_string")]
    pub amount: Decimal,
}

/// Body of `PUT /api/payment/capture`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturePaymentRequest {
    pub payment_id: String,
    #[serde(serialize_with = "amount_string")]
    pub amount: Decimal,
}

fn amount_string<S: Serializer>(amount: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&amount.normalize().to_string())
}
