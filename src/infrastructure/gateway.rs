//! Clients for the remote edge functions: stock reservation and the Netopia
//! hosted payment page.
//!
//! Both are plain JSON-over-HTTPS calls under one base URL, authenticated
//! with an optional bearer key. Nothing is retried.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::GatewayError;
use crate::domain::ports::{PaymentGateway, PaymentRequest, ReservationRequest, StockReservations};

const RESERVE_STOCK: &str = "reserve-stock";
const NETOPIA_PAYMENT: &str = "netopia-payment";

/// Shared HTTP client for the functions endpoint.
#[derive(Clone)]
pub struct FunctionsClient {
    inner: Arc<FunctionsClientInner>,
}

struct FunctionsClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl FunctionsClient {
    pub fn new(
        base_url: &str,
        api_key: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = api_key {
            let value = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| GatewayError::Transport(format!("Invalid API key format: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(FunctionsClientInner {
                client,
                base_url: base_url.trim_end_matches('/').to_string(),
            }),
        })
    }

    fn url(&self, function: &str) -> String {
        format!("{}/{}", self.inner.base_url, function)
    }

    async fn invoke<B, T>(&self, function: &str, body: &B) -> Result<T, GatewayError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .inner
            .client
            .post(self.url(function))
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(GatewayError::Rejected(error_message(&text).unwrap_or_else(
                || format!("{function} answered HTTP {}", status.as_u16()),
            )));
        }

        serde_json::from_str(&text)
            .map_err(|e| {
                GatewayError::Transport(format!("Failed to parse {function} response: {e}"))
            })
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// Pull a human-readable reason out of an error response body.
fn error_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed.error.or(parsed.message).filter(|m| !m.is_empty())
}

// ── Stock reservation ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ReservationResponse {
    #[serde(default)]
    reservations: Vec<ReservationEntry>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReservationEntry {
    id: Uuid,
}

fn reservation_ids(response: ReservationResponse) -> Result<Vec<Uuid>, GatewayError> {
    if let Some(error) = response.error {
        return Err(GatewayError::Rejected(error));
    }
    if response.reservations.is_empty() {
        return Err(GatewayError::Rejected(
            "no reservation was created".to_string(),
        ));
    }
    Ok(response.reservations.into_iter().map(|r| r.id).collect())
}

pub struct HttpStockReservations {
    client: FunctionsClient,
}

impl HttpStockReservations {
    pub fn new(client: FunctionsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StockReservations for HttpStockReservations {
    async fn reserve(&self, request: ReservationRequest) -> Result<Vec<Uuid>, GatewayError> {
        let response: ReservationResponse = self.client.invoke(RESERVE_STOCK, &request).await?;
        reservation_ids(response)
    }
}

// ── Netopia payment ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentResponse {
    #[serde(default)]
    success: bool,
    payment_url: Option<String>,
    error: Option<String>,
}

fn payment_url(response: PaymentResponse) -> Result<String, GatewayError> {
    match response {
        PaymentResponse {
            success: true,
            payment_url: Some(url),
            ..
        } if !url.is_empty() => Ok(url),
        PaymentResponse {
            error: Some(error), ..
        } => Err(GatewayError::Rejected(error)),
        _ => Err(GatewayError::Rejected(
            "payment gateway returned no payment URL".to_string(),
        )),
    }
}

pub struct NetopiaGateway {
    client: FunctionsClient,
}

impl NetopiaGateway {
    pub fn new(client: FunctionsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PaymentGateway for NetopiaGateway {
    async fn start_payment(&self, request: PaymentRequest) -> Result<String, GatewayError> {
        let response: PaymentResponse = self.client.invoke(NETOPIA_PAYMENT, &request).await?;
        payment_url(response)
    }
}
