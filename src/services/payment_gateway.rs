use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{instrument, warn};

use crate::errors::ServiceError;

/// Outcome of a payment verification attempt.
///
/// `Unreachable` is distinct from `NotConfirmed`: a gateway that cannot be
/// reached has said nothing about the charge, and must never be treated as
/// a negative verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// The gateway reports a successful charge covering the expected amount.
    Confirmed { amount_observed: i64 },
    /// The gateway answered: the charge is not (yet) successful, or it does
    /// not cover the expected amount.
    NotConfirmed,
    /// Transport error, non-2xx answer, or undecodable body.
    Unreachable,
}

/// Lookup-by-reference verification against the payment gateway.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn verify(&self, tx_ref: &str, expected_amount: i64) -> VerifyOutcome;
}

#[derive(Debug, Deserialize)]
struct VerifyEnvelope {
    status: String,
    data: Option<VerifyData>,
}

#[derive(Debug, Deserialize)]
struct VerifyData {
    status: String,
    amount: f64,
}

/// Flutterwave-style gateway client
/// (`GET /v3/transactions/verify_by_reference?tx_ref=...`).
pub struct FlutterwaveGateway {
    http: reqwest::Client,
    base_url: String,
    secret_key: String,
}

impl FlutterwaveGateway {
    pub fn new(
        base_url: &str,
        secret_key: &str,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::InternalError(format!("http client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            secret_key: secret_key.to_string(),
        })
    }

    fn interpret(envelope: &VerifyEnvelope, expected_amount: i64) -> VerifyOutcome {
        if envelope.status != "success" {
            return VerifyOutcome::NotConfirmed;
        }
        let Some(data) = &envelope.data else {
            return VerifyOutcome::NotConfirmed;
        };
        if data.status != "successful" {
            return VerifyOutcome::NotConfirmed;
        }
        if data.amount < expected_amount as f64 {
            warn!(
                observed = data.amount,
                expected = expected_amount,
                "gateway confirmed charge below expected amount"
            );
            return VerifyOutcome::NotConfirmed;
        }
        VerifyOutcome::Confirmed {
            amount_observed: data.amount as i64,
        }
    }
}

#[async_trait]
impl PaymentGateway for FlutterwaveGateway {
    #[instrument(skip(self), fields(tx_ref = %tx_ref))]
    async fn verify(&self, tx_ref: &str, expected_amount: i64) -> VerifyOutcome {
        let url = format!("{}/v3/transactions/verify_by_reference", self.base_url);

        let response = match self
            .http
            .get(&url)
            .query(&[("tx_ref", tx_ref)])
            .bearer_auth(&self.secret_key)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "gateway verify call failed");
                return VerifyOutcome::Unreachable;
            }
        };

        if !response.status().is_success() {
            warn!(status = %response.status(), "gateway verify returned non-success status");
            return VerifyOutcome::Unreachable;
        }

        match response.json::<VerifyEnvelope>().await {
            Ok(envelope) => Self::interpret(&envelope, expected_amount),
            Err(e) => {
                warn!(error = %e, "gateway verify body could not be decoded");
                VerifyOutcome::Unreachable
            }
        }
    }
}
