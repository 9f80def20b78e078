use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Router,
};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;
use tracing::{info, warn};

use crate::error::AppError;
use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Deserialize)]
struct CheckoutWebhook {
    meta: WebhookMeta,
}

#[derive(Debug, Deserialize)]
struct WebhookMeta {
    event_name: String,
    #[serde(default)]
    custom_data: Option<CustomData>,
}

#[derive(Debug, Deserialize)]
struct CustomData {
    #[serde(rename = "squareId")]
    square_id: Option<Value>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/webhooks/checkout", post(handle_checkout_webhook))
}

/// POST /v1/webhooks/checkout
/// Receive order notifications from the checkout provider. An order for
/// a reserved cell flips it to purchased.
async fn handle_checkout_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    // The signature covers the raw body, so verify before parsing
    verify_signature(&state.webhook.signing_secret, &headers, &body)?;

    let payload: CheckoutWebhook = serde_json::from_slice(&body)
        .map_err(|e| AppError::ValidationError(format!("Malformed webhook payload: {}", e)))?;

    if payload.meta.event_name != "order_created" {
        info!("Ignoring webhook event {}", payload.meta.event_name);
        return Ok(StatusCode::OK);
    }

    let square_id = payload
        .meta
        .custom_data
        .as_ref()
        .and_then(|data| data.square_id.as_ref())
        .and_then(parse_square_id)
        .ok_or_else(|| AppError::ValidationError("Webhook carried no square id".to_string()))?;

    let marked = state
        .squares
        .mark_purchased(square_id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    if marked {
        info!("Square {} marked as purchased via webhook", square_id);
    } else {
        // Acknowledge anyway: the provider would retry a non-2xx
        // forever, and the order itself is real
        warn!("Payment confirmed for unknown square {}", square_id);
    }

    Ok(StatusCode::OK)
}

// The provider echoes custom data back as it was submitted, except that
// some providers stringify numbers along the way
fn parse_square_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn verify_signature(secret: &str, headers: &HeaderMap, body: &[u8]) -> Result<(), AppError> {
    let signature = headers
        .get("X-Signature")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::AuthenticationError("invalid webhook signature".to_string()))?;

    let raw = hex::decode(signature)
        .map_err(|_| AppError::AuthenticationError("invalid webhook signature".to_string()))?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    mac.update(body);
    mac.verify_slice(&raw)
        .map_err(|_| AppError::AuthenticationError("invalid webhook signature".to_string()))?;

    Ok(())
}
