//! Contract tests for PaymentGateway against a mocked Paycritical POS API.
//!
//! ## Endpoints Tested
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | GET    | `/api/payment/{id}` | `get_payment_status_*` |
//! | GET    | `/api/payment/{id}/authorization` | `get_authorization_details_*` |
//! | POST   | `/api/payment` | `request_authorization_*`, `request_payment_*` |
//! | POST   | `/api/payment/resend` | `resend_payment_*` |
//! | POST   | `/api/qrcode` | `request_qr_code_*` |
//! | GET    | `/api/qrCode/{id}` | `get_qr_code_status_*` |
//! | PUT    | `/api/payment/cancel` | `cancel_payment_request_*` |
//! | PUT    | `/api/payment/refund` | `refund_payment_request_*` |
//! | PUT    | `/api/payment/capture` | `capture_payment_request_*` |

use paycritical_client::{GatewayConfig, GatewayError, PaymentGateway, TransactionType};
use rust_decimal::Decimal;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "Basic b09Ca2VldXA6b09Ca2VldXB4S204UVBETWhlWWkwTTVoeXpMcTVCa1A=";

fn test_gateway(mock_server: &MockServer) -> PaymentGateway {
    let config = GatewayConfig::new(TOKEN, &mock_server.uri()).unwrap();
    PaymentGateway::new(config).unwrap()
}

// ── GET /api/payment/{id} ───────────────────────────────────────────

#[tokio::test]
async fn get_payment_status_sends_headers_and_returns_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/payment/6d419e63-6c0d-4331-bbe6-e80586d6299c"))
        .and(header("Authorization", TOKEN))
        .and(header("Accept", "application/json"))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "paymentId": "6d419e63-6c0d-4331-bbe6-e80586d6299c",
            "status": "Completed",
            "transactionType": "Authorization",
            "amount": 1.23
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let gateway = test_gateway(&mock_server);
    let status = gateway
        .get_payment_status("6d419e63-6c0d-4331-bbe6-e80586d6299c")
        .await
        .unwrap();
    assert_eq!(status.status, "Completed");
    assert_eq!(status.transaction_type, Some(TransactionType::Authorization));
    assert_eq!(status.amount, Some(Decimal::new(123, 2)));
}

#[tokio::test]
async fn get_payment_status_unknown_id_is_generic_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/payment/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&mock_server)
        .await;

    let gateway = test_gateway(&mock_server);
    match gateway.get_payment_status("missing").await {
        Err(GatewayError::Api { status, body }) => {
            assert_eq!(status, 404);
            assert_eq!(body, "not found");
        }
        other => panic!("expected generic API error, got {other:?}"),
    }
}

// ── GET /api/payment/{id}/authorization ─────────────────────────────

#[tokio::test]
async fn get_authorization_details_returns_authorization() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/payment/c14af8ec-d2f4-4d9d-a351-2ce119cb9bb9/authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "RejectedByUser",
            "expiration": "2021-09-25T14:10:43.017",
            "remainingAmount": 1.23,
            "captures": []
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let gateway = test_gateway(&mock_server);
    let auth = gateway
        .get_authorization_details("c14af8ec-d2f4-4d9d-a351-2ce119cb9bb9")
        .await
        .unwrap();
    assert_eq!(auth.status, "RejectedByUser");
    assert_eq!(auth.expiration.as_deref(), Some("2021-09-25T14:10:43.017"));
    assert_eq!(auth.remaining_amount, Some(Decimal::new(123, 2)));
    assert_eq!(auth.remaining_amount.unwrap().to_string(), "1.23");
    assert!(auth.captures.is_empty());
}

#[tokio::test]
async fn get_authorization_details_tolerates_null_fields() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/payment/c14af8ec-d2f4-4d9d-a351-2ce119cb9bb9/authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "RejectedByUser",
            "expiration": null,
            "remainingAmount": null,
            "captures": null
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let gateway = test_gateway(&mock_server);
    let auth = gateway
        .get_authorization_details("c14af8ec-d2f4-4d9d-a351-2ce119cb9bb9")
        .await
        .unwrap();
    assert_eq!(auth.status, "RejectedByUser");
    assert!(auth.expiration.is_none());
    assert!(auth.remaining_amount.is_none());
    assert!(auth.captures.is_empty());
}

#[tokio::test]
async fn get_authorization_details_server_fault_keeps_event_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/payment/p-1/authorization"))
        .respond_with(
            ResponseTemplate::new(500).set_body_string(r#"{"eventId":"9f1c2d"}"#),
        )
        .mount(&mock_server)
        .await;

    let gateway = test_gateway(&mock_server);
    let err = gateway.get_authorization_details("p-1").await.unwrap_err();
    assert!(err.is_retryable());
    match err {
        GatewayError::InternalServerError { body } => assert_eq!(body, r#"{"eventId":"9f1c2d"}"#),
        other => panic!("expected internal server error, got {other:?}"),
    }
}

// ── POST /api/payment ───────────────────────────────────────────────

#[tokio::test]
async fn request_authorization_sends_string_amount_and_authorization_type() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/payment"))
        .and(body_json(json!({
            "amount": "1.23",
            "orderRef": "order-001",
            "phoneNumber": "+351911111111",
            "transactionType": "Authorization"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "paymentId": "c14af8ec-d2f4-4d9d-a351-2ce119cb9bb9",
            "paymentHumanId": "LQ50EWPO",
            "status": "Requested"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let gateway = test_gateway(&mock_server);
    let payment = gateway
        .request_authorization(Decimal::new(123, 2), "+351911111111", "order-001")
        .await
        .unwrap();
    assert_eq!(payment.status, "Requested");
    assert_eq!(payment.payment_id, "c14af8ec-d2f4-4d9d-a351-2ce119cb9bb9");
    assert_eq!(payment.payment_human_id.as_deref(), Some("LQ50EWPO"));
}

#[tokio::test]
async fn request_payment_sends_capture_type() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/payment"))
        .and(body_json(json!({
            "amount": "1.23",
            "orderRef": "order-001",
            "phoneNumber": "+351911111111",
            "transactionType": "Capture"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "paymentId": "p-2",
            "status": "Requested"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let gateway = test_gateway(&mock_server);
    let payment = gateway
        .request_payment(Decimal::new(123, 2), "+351911111111", "order-001")
        .await
        .unwrap();
    assert_eq!(payment.payment_id, "p-2");
    assert!(payment.payment_human_id.is_none());
}

#[tokio::test]
async fn request_payment_validation_summary_is_surfaced() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/payment"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": "InvalidPhoneNumber",
            "description": "The phone number is not valid."
        })))
        .mount(&mock_server)
        .await;

    let gateway = test_gateway(&mock_server);
    match gateway
        .request_payment(Decimal::new(125, 2), "12", "order-002")
        .await
    {
        Err(GatewayError::Validation { code, description }) => {
            assert_eq!(code, "InvalidPhoneNumber");
            assert_eq!(description, "The phone number is not valid.");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn request_payment_unparseable_400_uses_default_summary() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/payment"))
        .respond_with(ResponseTemplate::new(400).set_body_string("<html>Bad Request</html>"))
        .mount(&mock_server)
        .await;

    let gateway = test_gateway(&mock_server);
    match gateway
        .request_payment(Decimal::new(125, 2), "+351911111111", "order-003")
        .await
    {
        Err(GatewayError::Validation { code, description }) => {
            assert_eq!(code, "400");
            assert_eq!(description, "The request is invalid.");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn request_authorization_without_credential_is_unauthorized() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/payment"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Basic authentication not set"))
        .mount(&mock_server)
        .await;

    let gateway = test_gateway(&mock_server);
    match gateway
        .request_authorization(Decimal::new(1, 0), "+351911111111", "order-004")
        .await
    {
        Err(GatewayError::Unauthorized { body }) => {
            assert_eq!(body, "Basic authentication not set");
        }
        other => panic!("expected unauthorized error, got {other:?}"),
    }
}

// ── POST /api/payment/resend ────────────────────────────────────────

#[tokio::test]
async fn resend_payment_sends_payment_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/payment/resend"))
        .and(body_json(json!({"paymentId": "p-3"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let gateway = test_gateway(&mock_server);
    gateway.resend_payment("p-3").await.unwrap();
}

#[tokio::test]
async fn resend_payment_forbidden_keeps_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/payment/resend"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden-text"))
        .mount(&mock_server)
        .await;

    let gateway = test_gateway(&mock_server);
    match gateway.resend_payment("p-3").await {
        Err(GatewayError::Forbidden { body }) => assert_eq!(body, "forbidden-text"),
        other => panic!("expected forbidden error, got {other:?}"),
    }
}

// ── POST /api/qrcode ────────────────────────────────────────────────

#[tokio::test]
async fn request_qr_code_returns_qr_code_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/qrcode"))
        .and(body_json(json!({"amount": "0.1", "orderRef": "AAAA"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"qrCodeId": "abc123"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let gateway = test_gateway(&mock_server);
    let qr = gateway
        .request_qr_code(Decimal::new(10, 2), "AAAA")
        .await
        .unwrap();
    assert_eq!(qr.qr_code_id, "abc123");
}

// ── GET /api/qrCode/{id} ────────────────────────────────────────────

#[tokio::test]
async fn get_qr_code_status_no_content_is_requested() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/qrCode/abc123"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let gateway = test_gateway(&mock_server);
    let status = gateway.get_qr_code_status("abc123").await.unwrap();
    assert_eq!(status.status, "Requested");
    assert!(status.payment_id.is_none());
    assert!(status.payment_human_id.is_none());
}

#[tokio::test]
async fn get_qr_code_status_completed_links_payment() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/qrCode/f6530724-b143-4df6-8a10-b346b435e7b0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "paymentId": "6d419e63-6c0d-4331-bbe6-e80586d6299c",
            "paymentHumanId": "LQ50EWPO",
            "status": "Completed"
        })))
        .mount(&mock_server)
        .await;

    let gateway = test_gateway(&mock_server);
    let status = gateway
        .get_qr_code_status("f6530724-b143-4df6-8a10-b346b435e7b0")
        .await
        .unwrap();
    assert_eq!(status.status, "Completed");
    assert_eq!(status.payment_human_id.as_deref(), Some("LQ50EWPO"));
    assert_eq!(
        status.payment_id.as_deref(),
        Some("6d419e63-6c0d-4331-bbe6-e80586d6299c")
    );
}

// ── PUT /api/payment/cancel ─────────────────────────────────────────

#[tokio::test]
async fn cancel_payment_request_sends_put_with_payment_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/payment/cancel"))
        .and(body_json(json!({"paymentId": "p-4"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let gateway = test_gateway(&mock_server);
    gateway.cancel_payment_request("p-4").await.unwrap();
}

// ── PUT /api/payment/refund ─────────────────────────────────────────

#[tokio::test]
async fn refund_payment_request_sends_amount_as_string() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/payment/refund"))
        .and(body_json(json!({"paymentId": "p-5", "amount": "1.25"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let gateway = test_gateway(&mock_server);
    gateway
        .refund_payment_request("p-5", Decimal::new(125, 2))
        .await
        .unwrap();
}

// ── PUT /api/payment/capture ────────────────────────────────────────

#[tokio::test]
async fn capture_payment_request_sends_amount_as_string() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/payment/capture"))
        .and(body_json(json!({"paymentId": "p-6", "amount": "1.23"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let gateway = test_gateway(&mock_server);
    gateway
        .capture_payment_request("p-6", Decimal::new(123, 2))
        .await
        .unwrap();
}

#[tokio::test]
async fn capture_payment_request_conflict_is_generic_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/payment/capture"))
        .respond_with(ResponseTemplate::new(409).set_body_string("already captured"))
        .mount(&mock_server)
        .await;

    let gateway = test_gateway(&mock_server);
    let err = gateway
        .capture_payment_request("p-6", Decimal::new(123, 2))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(409));
    assert!(matches!(err, GatewayError::Api { ref body, .. } if body == "already captured"));
}

// ── Transport ───────────────────────────────────────────────────────

#[tokio::test]
async fn unreachable_gateway_is_transport_error() {
    // Port 1 is never listening.
    let config = GatewayConfig::new(TOKEN, "http://127.0.0.1:1").unwrap();
    let gateway = PaymentGateway::new(config).unwrap();

    let err = gateway.get_payment_status("p-1").await.unwrap_err();
    assert!(err.status_code().is_none());
    assert!(
        matches!(err, GatewayError::Transport { ref endpoint, .. } if endpoint == "GET /api/payment/p-1"),
        "{err:?}"
    );
}
