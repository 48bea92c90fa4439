// SPDX-License-Identifier: BUSL-1.1
//! In-memory storage backend using DashMap.
//!
//! Payments and QR codes each get their own `DashMap<Uuid, _>`. Records are
//! typed so lifecycle checks in the routes read as plain field comparisons.

use std::sync::Arc;

use chrono::{Duration, NaiveDateTime, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use uuid::Uuid;

pub const REQUESTED: &str = "Requested";
pub const COMPLETED: &str = "Completed";
pub const REJECTED_BY_USER: &str = "RejectedByUser";
pub const CANCELLED: &str = "Cancelled";
pub const REFUNDED: &str = "Refunded";

pub const AUTHORIZATION: &str = "Authorization";
pub const CAPTURE: &str = "Capture";

/// How long a payment request stays answerable.
const REQUEST_TTL_HOURS: i64 = 24;

/// A payment request and everything that happened to it since.
#[derive(Debug, Clone)]
pub struct PaymentRecord {
    pub payment_id: Uuid,
    pub human_id: String,
    pub status: String,
    pub transaction_type: String,
    pub amount: Decimal,
    pub order_ref: String,
    pub phone_number: String,
    pub expiration: NaiveDateTime,
    /// Amount still capturable (authorizations only).
    pub remaining_amount: Decimal,
    pub refunded_amount: Decimal,
    pub captures: Vec<CaptureRecord>,
}

impl PaymentRecord {
    pub fn new(
        amount: Decimal,
        order_ref: &str,
        phone_number: &str,
        transaction_type: &str,
    ) -> Self {
        let payment_id = Uuid::new_v4();
        let remaining_amount = if transaction_type == AUTHORIZATION {
            amount
        } else {
            Decimal::ZERO
        };
        Self {
            payment_id,
            human_id: human_id(payment_id),
            status: REQUESTED.to_string(),
            transaction_type: transaction_type.to_string(),
            amount,
            order_ref: order_ref.to_string(),
            phone_number: phone_number.to_string(),
            expiration: Utc::now().naive_utc() + Duration::hours(REQUEST_TTL_HOURS),
            remaining_amount,
            refunded_amount: Decimal::ZERO,
            captures: Vec::new(),
        }
    }

    pub fn is_authorization(&self) -> bool {
        self.transaction_type == AUTHORIZATION
    }
}

#[derive(Debug, Clone)]
pub struct CaptureRecord {
    pub amount: Decimal,
    pub date: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct QrCodeRecord {
    pub qr_code_id: Uuid,
    pub amount: Decimal,
    pub order_ref: String,
    /// Set once somebody paid the code.
    pub payment_id: Option<Uuid>,
}

/// Eight upper-case characters a customer can read out over the phone.
fn human_id(id: Uuid) -> String {
    id.simple().to_string()[..8].to_uppercase()
}

/// Inner storage holding all DashMaps.
struct Inner {
    payments: DashMap<Uuid, PaymentRecord>,
    qr_codes: DashMap<Uuid, QrCodeRecord>,
    api_key: Option<String>,
}

/// Shared application state holding all in-memory stores.
///
/// Cheaply cloneable via `Arc`; all clones share the same data.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

impl AppState {
    /// `api_key`, when set, is the only `Authorization` value accepted.
    /// Without it any `Basic` credential passes.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            inner: Arc::new(Inner {
                payments: DashMap::new(),
                qr_codes: DashMap::new(),
                api_key,
            }),
        }
    }

    pub fn payments(&self) -> &DashMap<Uuid, PaymentRecord> {
        &self.inner.payments
    }

    pub fn qr_codes(&self) -> &DashMap<Uuid, QrCodeRecord> {
        &self.inner.qr_codes
    }

    pub fn api_key(&self) -> Option<&str> {
        self.inner.api_key.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_starts_fully_capturable() {
        let rec = PaymentRecord::new(Decimal::new(123, 2), "o-1", "+351911111111", AUTHORIZATION);
        assert_eq!(rec.status, REQUESTED);
        assert_eq!(rec.remaining_amount, Decimal::new(123, 2));
        assert!(rec.is_authorization());
    }

    #[test]
    fn capture_has_nothing_left_to_capture() {
        let rec = PaymentRecord::new(Decimal::new(125, 2), "o-2", "+351911111111", CAPTURE);
        assert_eq!(rec.remaining_amount, Decimal::ZERO);
        assert!(!rec.is_authorization());
    }

    #[test]
    fn human_id_is_eight_upper_case_chars() {
        let rec = PaymentRecord::new(Decimal::ONE, "o-3", "+351911111111", CAPTURE);
        assert_eq!(rec.human_id.len(), 8);
        assert_eq!(rec.human_id, rec.human_id.to_uppercase());
    }
}
