//! # paycritical-client -- Typed Rust client for the Paycritical POS API
//!
//! One façade, [`PaymentGateway`], maps each gateway endpoint to one async
//! method:
//!
//! | Method | Verb | Path |
//! |--------|------|------|
//! | [`PaymentGateway::get_payment_status`] | GET | `/api/payment/{id}` |
//! | [`PaymentGateway::get_authorization_details`] | GET | `/api/payment/{id}/authorization` |
//! | [`PaymentGateway::request_authorization`] | POST | `/api/payment` |
//! | [`PaymentGateway::request_payment`] | POST | `/api/payment` |
//! | [`PaymentGateway::resend_payment`] | POST | `/api/payment/resend` |
//! | [`PaymentGateway::request_qr_code`] | POST | `/api/qrcode` |
//! | [`PaymentGateway::get_qr_code_status`] | GET | `/api/qrCode/{id}` |
//! | [`PaymentGateway::cancel_payment_request`] | PUT | `/api/payment/cancel` |
//! | [`PaymentGateway::refund_payment_request`] | PUT | `/api/payment/refund` |
//! | [`PaymentGateway::capture_payment_request`] | PUT | `/api/payment/capture` |
//!
//! Each call is exactly one round trip. There is no retry, no caching and
//! no client-side timeout: wrap calls in `tokio::time::timeout` or hand a
//! configured `reqwest::Client` to [`ReqwestTransport::from_client`] when a
//! deadline is needed.
//!
//! ## Errors
//!
//! Non-2xx answers become [`GatewayError::Validation`] (400),
//! [`GatewayError::Unauthorized`] (401), [`GatewayError::Forbidden`] (403),
//! [`GatewayError::InternalServerError`] (500) or [`GatewayError::Api`]
//! (anything else). Network failures are [`GatewayError::Transport`].

pub mod config;
pub mod error;
pub mod models;
pub mod requests;
pub mod transport;
pub mod validation;

pub use config::{ConfigError, GatewayConfig};
pub use error::GatewayError;
pub use models::{
    Authorization, Capture, Payment, PaymentStatus, QrCode, QrCodeStatus, TransactionType,
};
pub use transport::{GatewayRequest, GatewayResponse, HttpTransport, ReqwestTransport};
pub use validation::ValidationSummary;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::requests::{
    CancelPaymentRequest, CapturePaymentRequest, PaymentRequest, QrCodeRequest,
    RefundPaymentRequest, ResendPaymentRequest,
};

/// Client for the Paycritical POS API.
///
/// Holds the credential, the base URL and a transport; none of them change
/// after construction, so a gateway can be shared across tasks and called
/// concurrently without coordination.
#[derive(Debug, Clone)]
pub struct PaymentGateway<T = ReqwestTransport> {
    transport: T,
    base_url: Url,
    authorization: HeaderValue,
}

impl PaymentGateway<ReqwestTransport> {
    /// Create a gateway backed by a default [`ReqwestTransport`].
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        Self::with_transport(config, ReqwestTransport::new()?)
    }
}

impl<T: HttpTransport> PaymentGateway<T> {
    /// Create a gateway that sends every request through `transport`.
    pub fn with_transport(config: GatewayConfig, transport: T) -> Result<Self, GatewayError> {
        let mut authorization = HeaderValue::from_str(config.api_key.as_str())
            .map_err(|_| ConfigError::InvalidApiKey)?;
        authorization.set_sensitive(true);

        if config.base_url.cannot_be_a_base() {
            return Err(ConfigError::UnsupportedBaseUrl(config.base_url.to_string()).into());
        }

        Ok(Self {
            transport,
            base_url: config.base_url,
            authorization,
        })
    }

    /// Base URL every request path is appended to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Get the status of a payment.
    ///
    /// Calls `GET {base_url}/api/payment/{payment_id}`.
    pub async fn get_payment_status(&self, payment_id: &str) -> Result<PaymentStatus, GatewayError> {
        self.get(&["api", "payment", payment_id]).await?.json()
    }

    /// Get the details of an authorization, including its captures.
    ///
    /// Calls `GET {base_url}/api/payment/{payment_id}/authorization`.
    pub async fn get_authorization_details(
        &self,
        payment_id: &str,
    ) -> Result<Authorization, GatewayError> {
        self.get(&["api", "payment", payment_id, "authorization"])
            .await?
            .json()
    }

    /// Ask the customer at `phone_number` to authorize `amount`.
    ///
    /// Calls `POST {base_url}/api/payment` with `transactionType = "Authorization"`.
    pub async fn request_authorization(
        &self,
        amount: Decimal,
        phone_number: &str,
        order_ref: &str,
    ) -> Result<Payment, GatewayError> {
        let body = PaymentRequest::authorization(amount, phone_number, order_ref);
        self.send(Method::POST, &["api", "payment"], &body)
            .await?
            .json()
    }

    /// Ask the customer at `phone_number` to pay `amount`.
    ///
    /// Calls `POST {base_url}/api/payment` with `transactionType = "Capture"`.
    pub async fn request_payment(
        &self,
        amount: Decimal,
        phone_number: &str,
        order_ref: &str,
    ) -> Result<Payment, GatewayError> {
        let body = PaymentRequest::capture(amount, phone_number, order_ref);
        self.send(Method::POST, &["api", "payment"], &body)
            .await?
            .json()
    }

    /// Re-send the notification for a pending payment request.
    ///
    /// Calls `POST {base_url}/api/payment/resend`.
    pub async fn resend_payment(&self, payment_id: &str) -> Result<(), GatewayError> {
        let body = ResendPaymentRequest {
            payment_id: payment_id.to_string(),
        };
        self.send(Method::POST, &["api", "payment", "resend"], &body)
            .await?;
        Ok(())
    }

    /// Request a QR code the customer can scan to pay `amount`.
    ///
    /// Calls `POST {base_url}/api/qrcode`.
    pub async fn request_qr_code(
        &self,
        amount: Decimal,
        order_ref: &str,
    ) -> Result<QrCode, GatewayError> {
        let body = QrCodeRequest {
            amount,
            order_ref: order_ref.to_string(),
        };
        self.send(Method::POST, &["api", "qrcode"], &body)
            .await?
            .json()
    }

    /// Get the status of a QR code.
    ///
    /// Calls `GET {base_url}/api/qrCode/{qr_code_id}`. A 204 answer means
    /// the code has not been paid yet and yields a status of `"Requested"`.
    pub async fn get_qr_code_status(&self, qr_code_id: &str) -> Result<QrCodeStatus, GatewayError> {
        let exchange = self.get(&["api", "qrCode", qr_code_id]).await?;
        if exchange.status == 204 {
            return Ok(QrCodeStatus::default());
        }
        exchange.json()
    }

    /// Cancel a payment request that has not been answered yet.
    ///
    /// Calls `PUT {base_url}/api/payment/cancel`.
    pub async fn cancel_payment_request(&self, payment_id: &str) -> Result<(), GatewayError> {
        let body = CancelPaymentRequest {
            payment_id: payment_id.to_string(),
        };
        self.send(Method::PUT, &["api", "payment", "cancel"], &body)
            .await?;
        Ok(())
    }

    /// Refund `amount` of a completed payment.
    ///
    /// Calls `PUT {base_url}/api/payment/refund`.
    pub async fn refund_payment_request(
        &self,
        payment_id: &str,
        amount: Decimal,
    ) -> Result<(), GatewayError> {
        let body = RefundPaymentRequest {
            payment_id: payment_id.to_string(),
            amount,
        };
        self.send(Method::PUT, &["api", "payment", "refund"], &body)
            .await?;
        Ok(())
    }

    /// Capture `amount` of an accepted authorization.
    ///
    /// Calls `PUT {base_url}/api/payment/capture`.
    pub async fn capture_payment_request(
        &self,
        payment_id: &str,
        amount: Decimal,
    ) -> Result<(), GatewayError> {
        let body = CapturePaymentRequest {
            payment_id: payment_id.to_string(),
            amount,
        };
        self.send(Method::PUT, &["api", "payment", "capture"], &body)
            .await?;
        Ok(())
    }

    async fn get(&self, segments: &[&str]) -> Result<Exchange, GatewayError> {
        self.dispatch(Method::GET, segments, None).await
    }

    async fn send<B: Serialize>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<Exchange, GatewayError> {
        let body = serde_json::to_string(body).map_err(|source| GatewayError::Serialization {
            endpoint: endpoint_label(&method, segments),
            source,
        })?;
        self.dispatch(method, segments, Some(body)).await
    }

    /// One round trip: shape, send, classify.
    async fn dispatch(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<String>,
    ) -> Result<Exchange, GatewayError> {
        let endpoint = endpoint_label(&method, segments);
        let request = GatewayRequest {
            method,
            url: self.url(segments)?,
            headers: self.headers(),
            body,
        };

        let response = self
            .transport
            .execute(request)
            .await
            .map_err(|source| GatewayError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;

        tracing::debug!(%endpoint, status = response.status, "paycritical gateway responded");
        validation::validate_response(response.status, &response.body)?;

        Ok(Exchange {
            endpoint,
            status: response.status,
            body: response.body,
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ConfigError::UnsupportedBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, self.authorization.clone());
        headers
    }
}

/// A round trip that passed status validation.
struct Exchange {
    endpoint: String,
    status: u16,
    body: String,
}

impl Exchange {
    fn json<R: DeserializeOwned>(&self) -> Result<R, GatewayError> {
        serde_json::from_str(&self.body).map_err(|source| GatewayError::Deserialization {
            endpoint: self.endpoint.clone(),
            source,
        })
    }
}

fn endpoint_label(method: &Method, segments: &[&str]) -> String {
    format!("{method} /{}", segments.join("/"))
}
