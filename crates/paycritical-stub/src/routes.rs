// SPDX-License-Identifier: BUSL-1.1
//! Route definitions for the Paycritical gateway stub.
//!
//! Implements the POS endpoints that `paycritical-client` calls, with
//! responses that deserialize cleanly into the client's types (camelCase
//! JSON, amounts as numbers on the way out, strings on the way in).
//!
//! The `/simulator` routes stand in for the customer's phone: they accept or
//! reject a payment request and pay a QR code. They are not part of the
//! gateway API and skip the credential check.

use std::str::FromStr;

use axum::{
    extract::{Path, Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::store::{
    AppState, CaptureRecord, PaymentRecord, QrCodeRecord, AUTHORIZATION as AUTHORIZATION_TYPE,
    CANCELLED, CAPTURE, COMPLETED, REFUNDED, REJECTED_BY_USER, REQUESTED,
};

/// Gateway-local timestamp format, millisecond precision and no offset.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Build the complete router with all gateway stub routes.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/api/payment", post(payment_create))
        .route("/api/payment/resend", post(payment_resend))
        .route("/api/payment/cancel", put(payment_cancel))
        .route("/api/payment/refund", put(payment_refund))
        .route("/api/payment/capture", put(payment_capture))
        .route("/api/payment/{id}", get(payment_get))
        .route("/api/payment/{id}/authorization", get(authorization_get))
        .route("/api/qrcode", post(qr_code_create))
        .route("/api/qrCode/{id}", get(qr_code_get))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_credential,
        ));

    Router::new()
        // Health
        .route("/health", get(health))
        .merge(api)
        // Customer-side simulation
        .route("/simulator/payment/{id}/accept", post(simulate_accept))
        .route("/simulator/payment/{id}/reject", post(simulate_reject))
        .route("/simulator/qrcode/{id}/pay", post(simulate_qr_code_payment))
        // Fallback: 501 Not Implemented
        .fallback(not_implemented)
        .with_state(state)
}

// ── Credential check ────────────────────────────────────────────────

async fn require_credential(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let presented = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .filter(|v| v.starts_with("Basic "));

    let Some(presented) = presented else {
        return (StatusCode::UNAUTHORIZED, "Basic authentication not set").into_response();
    };

    if let Some(expected) = state.api_key() {
        if presented != expected {
            return (StatusCode::FORBIDDEN, "The provided authentication is incorrect.")
                .into_response();
        }
    }

    next.run(request).await
}

// ── Health ──────────────────────────────────────────────────────────

async fn health() -> StatusCode {
    StatusCode::OK
}

// ── Payments ────────────────────────────────────────────────────────

fn parse_payment_request(body: &Value) -> Result<PaymentRecord, Response> {
    let amount = amount_field(body)?;
    let order_ref = text_field(body, "orderRef")?;
    let phone_number = phone_field(body)?;
    let transaction_type = match text_field(body, "transactionType")? {
        t @ (AUTHORIZATION_TYPE | CAPTURE) => t,
        other => {
            return Err(invalid(
                "InvalidTransactionType",
                format!("Transaction type '{other}' is not supported."),
            ))
        }
    };
    Ok(PaymentRecord::new(
        amount,
        order_ref,
        phone_number,
        transaction_type,
    ))
}

async fn payment_create(State(state): State<AppState>, Json(body): Json<Value>) -> Response {
    let record = match parse_payment_request(&body) {
        Ok(record) => record,
        Err(rejection) => return rejection,
    };

    tracing::debug!(payment_id = %record.payment_id, kind = %record.transaction_type, "payment requested");
    let created = payment_json(&record);
    state.payments().insert(record.payment_id, record);
    (StatusCode::CREATED, Json(created)).into_response()
}

async fn payment_get(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(id) = parse_id(&id) else {
        return payment_not_found(&id);
    };
    match state.payments().get(&id) {
        Some(entry) => Json(payment_json(entry.value())).into_response(),
        None => payment_not_found(&id.to_string()),
    }
}

async fn authorization_get(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(id) = parse_id(&id) else {
        return payment_not_found(&id);
    };
    let Some(entry) = state.payments().get(&id) else {
        return payment_not_found(&id.to_string());
    };
    let payment = entry.value();
    if !payment.is_authorization() {
        return invalid(
            "NotAnAuthorization",
            "The payment was not requested as an authorization.",
        );
    }

    let captures: Vec<Value> = payment
        .captures
        .iter()
        .map(|c| json!({"amount": number(c.amount), "date": timestamp(c.date)}))
        .collect();
    Json(json!({
        "status": payment.status,
        "expiration": timestamp(payment.expiration),
        "remainingAmount": number(payment.remaining_amount),
        "captures": captures,
    }))
    .into_response()
}

async fn payment_resend(State(state): State<AppState>, Json(body): Json<Value>) -> Response {
    with_payment(&state, &body, |payment| {
        require_status(payment, REQUESTED)?;
        tracing::debug!(payment_id = %payment.payment_id, "payment notification re-sent");
        Ok(())
    })
}

async fn payment_cancel(State(state): State<AppState>, Json(body): Json<Value>) -> Response {
    with_payment(&state, &body, |payment| {
        require_status(payment, REQUESTED)?;
        payment.status = CANCELLED.to_string();
        Ok(())
    })
}

async fn payment_refund(State(state): State<AppState>, Json(body): Json<Value>) -> Response {
    let amount = match amount_field(&body) {
        Ok(amount) => amount,
        Err(rejection) => return rejection,
    };
    with_payment(&state, &body, |payment| {
        if payment.is_authorization() {
            return Err(invalid(
                "NotACapture",
                "Only payments requested as a capture can be refunded.",
            ));
        }
        require_status(payment, COMPLETED)?;
        if payment.refunded_amount + amount > payment.amount {
            return Err(invalid(
                "AmountExceedsRefundable",
                format!(
                    "At most {} can still be refunded.",
                    payment.amount - payment.refunded_amount
                ),
            ));
        }
        payment.refunded_amount += amount;
        if payment.refunded_amount == payment.amount {
            payment.status = REFUNDED.to_string();
        }
        Ok(())
    })
}

async fn payment_capture(State(state): State<AppState>, Json(body): Json<Value>) -> Response {
    let amount = match amount_field(&body) {
        Ok(amount) => amount,
        Err(rejection) => return rejection,
    };
    with_payment(&state, &body, |payment| {
        if !payment.is_authorization() {
            return Err(invalid(
                "NotAnAuthorization",
                "Only authorizations can be captured.",
            ));
        }
        require_status(payment, COMPLETED)?;
        if amount > payment.remaining_amount {
            return Err(invalid(
                "AmountExceedsRemaining",
                format!("At most {} can still be captured.", payment.remaining_amount),
            ));
        }
        payment.remaining_amount -= amount;
        payment.captures.push(CaptureRecord {
            amount,
            date: Utc::now().naive_utc(),
        });
        Ok(())
    })
}

// ── QR codes ────────────────────────────────────────────────────────

async fn qr_code_create(State(state): State<AppState>, Json(body): Json<Value>) -> Response {
    let (amount, order_ref) = match amount_field(&body)
        .and_then(|amount| text_field(&body, "orderRef").map(|order_ref| (amount, order_ref)))
    {
        Ok(fields) => fields,
        Err(rejection) => return rejection,
    };

    let qr_code_id = Uuid::new_v4();
    state.qr_codes().insert(
        qr_code_id,
        QrCodeRecord {
            qr_code_id,
            amount,
            order_ref: order_ref.to_string(),
            payment_id: None,
        },
    );
    (
        StatusCode::CREATED,
        Json(json!({"qrCodeId": qr_code_id.to_string()})),
    )
        .into_response()
}

async fn qr_code_get(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(qr) = parse_id(&id).and_then(|id| state.qr_codes().get(&id).map(|e| e.value().clone()))
    else {
        return (StatusCode::NOT_FOUND, format!("QR code {id} not found")).into_response();
    };

    // Nothing to report until somebody pays the code.
    let Some(payment_id) = qr.payment_id else {
        return StatusCode::NO_CONTENT.into_response();
    };

    match state.payments().get(&payment_id) {
        Some(entry) => Json(json!({
            "paymentId": payment_id.to_string(),
            "paymentHumanId": entry.human_id,
            "status": entry.status,
        }))
        .into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

// ── Customer-side simulation ────────────────────────────────────────

async fn simulate_accept(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    answer_request(&state, &id, COMPLETED)
}

async fn simulate_reject(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    answer_request(&state, &id, REJECTED_BY_USER)
}

async fn simulate_qr_code_payment(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(qr_id) = parse_id(&id) else {
        return (StatusCode::NOT_FOUND, format!("QR code {id} not found")).into_response();
    };
    let Some(mut qr) = state.qr_codes().get_mut(&qr_id) else {
        return (StatusCode::NOT_FOUND, format!("QR code {id} not found")).into_response();
    };
    if qr.payment_id.is_some() {
        return invalid("QrCodeAlreadyPaid", "The QR code has already been paid.");
    }

    let mut payment = PaymentRecord::new(qr.amount, &qr.order_ref, "", CAPTURE);
    payment.status = COMPLETED.to_string();
    let body = payment_json(&payment);
    qr.payment_id = Some(payment.payment_id);
    state.payments().insert(payment.payment_id, payment);
    Json(body).into_response()
}

fn answer_request(state: &AppState, id: &str, outcome: &str) -> Response {
    let Some(payment_id) = parse_id(id) else {
        return payment_not_found(id);
    };
    let Some(mut payment) = state.payments().get_mut(&payment_id) else {
        return payment_not_found(id);
    };
    if let Err(rejection) = require_status(&payment, REQUESTED) {
        return rejection;
    }
    payment.status = outcome.to_string();
    Json(payment_json(&payment)).into_response()
}

// ── Fallback ────────────────────────────────────────────────────────

async fn not_implemented() -> StatusCode {
    StatusCode::NOT_IMPLEMENTED
}

// ── Helpers ─────────────────────────────────────────────────────────

/// Look up the payment named by the body's `paymentId` and apply `change`.
/// Answers 200 with an empty body on success.
fn with_payment(
    state: &AppState,
    body: &Value,
    change: impl FnOnce(&mut PaymentRecord) -> Result<(), Response>,
) -> Response {
    let raw_id = match text_field(body, "paymentId") {
        Ok(id) => id,
        Err(rejection) => return rejection,
    };
    let Some(id) = parse_id(raw_id) else {
        return payment_not_found(raw_id);
    };
    let Some(mut entry) = state.payments().get_mut(&id) else {
        return payment_not_found(raw_id);
    };
    match change(entry.value_mut()) {
        Ok(()) => StatusCode::OK.into_response(),
        Err(rejection) => rejection,
    }
}

fn require_status(payment: &PaymentRecord, expected: &str) -> Result<(), Response> {
    if payment.status == expected {
        return Ok(());
    }
    Err(invalid(
        "InvalidPaymentStatus",
        format!(
            "Payment is {} but must be {expected} for this operation.",
            payment.status
        ),
    ))
}

fn payment_json(payment: &PaymentRecord) -> Value {
    json!({
        "paymentId": payment.payment_id.to_string(),
        "paymentHumanId": payment.human_id,
        "status": payment.status,
        "transactionType": payment.transaction_type,
        "amount": number(payment.amount),
    })
}

/// 400 with a validation summary body.
fn invalid(code: &str, description: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"code": code, "description": description.into()})),
    )
        .into_response()
}

fn payment_not_found(id: &str) -> Response {
    (StatusCode::NOT_FOUND, format!("Payment {id} not found")).into_response()
}

fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}

fn text_field<'a>(body: &'a Value, name: &str) -> Result<&'a str, Response> {
    match body.get(name).and_then(Value::as_str).map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(invalid(
            &format!("Missing{}", capitalize(name)),
            format!("The field '{name}' is required."),
        )),
    }
}

/// Amounts arrive as decimal strings; plain JSON numbers are tolerated.
fn amount_field(body: &Value) -> Result<Decimal, Response> {
    let parsed = match body.get("amount") {
        Some(Value::String(s)) => Decimal::from_str(s.trim()).ok(),
        Some(Value::Number(n)) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    };
    match parsed {
        Some(amount) if amount > Decimal::ZERO => Ok(amount),
        _ => Err(invalid(
            "InvalidAmount",
            "The amount must be a positive decimal number.",
        )),
    }
}

/// International format: `+` followed by 8 to 15 digits.
fn phone_field(body: &Value) -> Result<&str, Response> {
    let phone = text_field(body, "phoneNumber")?;
    let digits = phone.strip_prefix('+').unwrap_or("");
    if (8..=15).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit()) {
        Ok(phone)
    } else {
        Err(invalid(
            "InvalidPhoneNumber",
            format!("The phone number '{phone}' is not valid."),
        ))
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn number(amount: Decimal) -> Value {
    amount
        .normalize()
        .to_string()
        .parse::<serde_json::Number>()
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn timestamp(at: NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}
