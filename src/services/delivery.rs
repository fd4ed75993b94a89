use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{instrument, warn};

use crate::errors::ServiceError;

/// Carrier name to provider network code mapping.
const PROVIDER_NETWORKS: &[(&str, i32)] = &[
    ("MTN", 1),
    ("GLO", 2),
    ("AIRTEL", 3),
    ("9MOBILE", 4),
];

/// Resolve a carrier name to the fulfillment provider's numeric network
/// code. Carrier names are matched case-insensitively.
pub fn provider_network_code(network: &str) -> Option<i32> {
    let upper = network.to_ascii_uppercase();
    PROVIDER_NETWORKS
        .iter()
        .find(|(name, _)| *name == upper)
        .map(|(_, code)| *code)
}

/// A fulfillment request for one data bundle.
///
/// `tx_ref` doubles as the idempotency token: the provider applies
/// at-least-once semantics, and the token is what makes controller-level
/// retries safe against double charging.
#[derive(Debug, Clone)]
pub struct DeliveryRequest {
    pub tx_ref: String,
    pub network_code: i32,
    pub mobile_number: String,
    pub provider_plan_id: i32,
}

/// Outcome of a fulfillment attempt. The raw provider response is retained
/// for diagnostics on failure, but only a confirmed success produces a
/// receipt eligible for persistence.
#[derive(Debug, Clone)]
pub enum DeliveryOutcome {
    Delivered { receipt: Value },
    Failed { response: Option<Value> },
}

impl DeliveryOutcome {
    /// Interpret the provider's ambiguous success schema.
    ///
    /// Two shapes are accepted as success: an explicit `success: true`
    /// boolean, or a `status: "delivered"` string. The provider emits either
    /// depending on endpoint version, so both are checked; when only one of
    /// the two signals success the mismatch is logged.
    pub fn from_response(body: Value) -> Self {
        let flag = body
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let status_delivered = body
            .get("status")
            .and_then(Value::as_str)
            .map(|s| s == "delivered")
            .unwrap_or(false);

        if flag || status_delivered {
            if flag != status_delivered {
                warn!(
                    success_flag = flag,
                    status_delivered,
                    "provider success schema ambiguous; accepting single positive signal"
                );
            }
            DeliveryOutcome::Delivered { receipt: body }
        } else {
            DeliveryOutcome::Failed {
                response: Some(body),
            }
        }
    }
}

/// Issues fulfillment requests to the data delivery provider.
#[async_trait]
pub trait DeliveryProvider: Send + Sync {
    async fn deliver(&self, request: &DeliveryRequest) -> DeliveryOutcome;
}

/// Amigo-style delivery client: `POST {base}/data/` with API-key and
/// idempotency headers.
pub struct AmigoClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AmigoClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::InternalError(format!("http client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl DeliveryProvider for AmigoClient {
    #[instrument(skip(self), fields(tx_ref = %request.tx_ref, network = request.network_code))]
    async fn deliver(&self, request: &DeliveryRequest) -> DeliveryOutcome {
        let url = format!("{}/data/", self.base_url);
        let payload = json!({
            "network": request.network_code,
            "mobile_number": request.mobile_number,
            "plan": request.provider_plan_id,
            "Ported_number": true,
        });

        let response = match self
            .http
            .post(&url)
            .header("X-API-Key", &self.api_key)
            .header("Idempotency-Key", &request.tx_ref)
            .json(&payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "fulfillment call failed");
                return DeliveryOutcome::Failed { response: None };
            }
        };

        let status = response.status();
        let body = response.json::<Value>().await.ok();

        if !status.is_success() {
            warn!(status = %status, "fulfillment provider returned non-success status");
            return DeliveryOutcome::Failed { response: body };
        }

        match body {
            Some(body) => DeliveryOutcome::from_response(body),
            None => {
                warn!("fulfillment response body could not be decoded");
                DeliveryOutcome::Failed { response: None }
            }
        }
    }
}
