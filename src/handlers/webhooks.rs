use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::{errors::ServiceError, AppState};

// POST /api/v1/webhooks/flutterwave
//
// The gateway's asynchronous settlement trigger. Authenticity is a
// pre-shared token in the `verif-hash` header; a mismatch is rejected
// before the store is touched. The gateway retries undelivered webhooks,
// so any accepted event is acknowledged regardless of business outcome.
#[utoipa::path(
    post,
    path = "/api/v1/webhooks/flutterwave",
    request_body = String,
    responses(
        (status = 200, description = "Webhook acknowledged"),
        (status = 401, description = "Invalid signature", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown reference", body = crate::errors::ErrorResponse),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse)
    ),
    tag = "Webhooks"
)]
pub async fn flutterwave_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ServiceError> {
    let provided = headers
        .get("verif-hash")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    if !constant_time_eq(provided, &state.config.webhook_secret) {
        warn!("webhook signature verification failed");
        return Err(ServiceError::Unauthorized(
            "invalid webhook signature".to_string(),
        ));
    }

    let payload: Value = serde_json::from_slice(&body)
        .map_err(|e| ServiceError::BadRequest(format!("invalid json: {e}")))?;
    // Event fields may be nested under `data` depending on gateway version.
    let event = payload.get("data").unwrap_or(&payload);

    let status = event.get("status").and_then(Value::as_str).unwrap_or("");
    if status != "successful" {
        info!(status, "ignoring webhook with non-successful status");
        return Ok(Json(json!({ "received": true })));
    }

    let reference = event
        .get("txRef")
        .or_else(|| event.get("tx_ref"))
        .and_then(Value::as_str)
        .ok_or_else(|| {
            ServiceError::BadRequest("webhook payload missing transaction reference".to_string())
        })?;

    let new_status = state.services.reconciliation.reconcile(reference).await?;
    info!(%reference, status = %new_status, "webhook reconciled");

    Ok(Json(json!({ "received": true })))
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut res = 0u8;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes()) {
        res |= x ^ y;
    }
    res == 0
}

pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/flutterwave", post(flutterwave_webhook))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_strings_match() {
        assert!(constant_time_eq("whsec_abc123", "whsec_abc123"));
    }

    #[test]
    fn different_strings_do_not_match() {
        assert!(!constant_time_eq("whsec_abc123", "whsec_abc124"));
        assert!(!constant_time_eq("whsec_abc123", "whsec_abc12"));
        assert!(!constant_time_eq("", "whsec_abc123"));
    }
}
