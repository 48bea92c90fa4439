//! Transport seam between the gateway client and the HTTP stack.
//!
//! [`crate::PaymentGateway`] shapes requests and classifies responses; an
//! [`HttpTransport`] only moves bytes. The production transport is
//! [`ReqwestTransport`]. Tests substitute their own implementation.

use std::future::Future;

use reqwest::header::HeaderMap;
use reqwest::Method;
use url::Url;

use crate::error::GatewayError;

/// Boxed error returned by transports.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A fully shaped gateway request.
#[derive(Debug, Clone)]
pub struct GatewayRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    /// JSON body; `None` for GET requests.
    pub body: Option<String>,
}

/// Status and raw body of a completed round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayResponse {
    pub status: u16,
    pub body: String,
}

/// Executes one HTTP round trip.
///
/// An `Err` means no HTTP response was obtained (DNS failure, refused
/// connection, timeout, unreadable body). Any response, whatever its status,
/// is an `Ok`: status classification belongs to the gateway client.
pub trait HttpTransport: Send + Sync {
    fn execute(
        &self,
        request: GatewayRequest,
    ) -> impl Future<Output = Result<GatewayResponse, BoxError>> + Send;
}

/// [`HttpTransport`] backed by a `reqwest::Client`.
///
/// `reqwest::Client` is reference counted internally, so clones share one
/// connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport with reqwest defaults. No timeout is set.
    pub fn new() -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| GatewayError::Transport {
                endpoint: "client_init".into(),
                source: Box::new(e),
            })?;
        Ok(Self { http })
    }

    /// Wrap a caller-configured client (timeouts, proxies, TLS roots).
    pub fn from_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl HttpTransport for ReqwestTransport {
    fn execute(
        &self,
        request: GatewayRequest,
    ) -> impl Future<Output = Result<GatewayResponse, BoxError>> + Send {
        let mut builder = self
            .http
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        async move {
            let resp = builder.send().await?;
            let status = resp.status().as_u16();
            let body = resp.text().await?;
            Ok(GatewayResponse { status, body })
        }
    }
}
