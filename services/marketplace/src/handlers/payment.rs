use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::MarketplaceError;
use crate::handlers::{ApiQuery, MessageResponse};
use crate::infra::stripe::{
    STRIPE_SIGNATURE, WEBHOOK_TOLERANCE_SECS, parse_payment_event, verify_webhook_signature,
};
use crate::state::AppState;
use crate::usecase::order::ApplyPaymentEventUseCase;

// ── GET /payments/success ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SuccessQuery {
    pub session_id: Option<String>,
}

pub async fn payment_success(ApiQuery(query): ApiQuery<SuccessQuery>) -> Json<MessageResponse> {
    tracing::debug!(session_id = ?query.session_id, "checkout returned");
    MessageResponse::new("payment successful")
}

// ── GET /payments/cancel ─────────────────────────────────────────────────────

pub async fn payment_cancel() -> Json<MessageResponse> {
    MessageResponse::new("payment cancelled")
}

// ── POST /payments/webhook ───────────────────────────────────────────────────

#[derive(Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

/// Provider notification. The body is read raw because the signature covers
/// the exact bytes sent.
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, MarketplaceError> {
    let Some(secret) = state.webhook_secret.as_deref() else {
        tracing::warn!("payment webhook received but no webhook secret is configured");
        return Err(MarketplaceError::InvalidSignature);
    };
    let signature = headers
        .get(STRIPE_SIGNATURE)
        .and_then(|v| v.to_str().ok())
        .ok_or(MarketplaceError::InvalidSignature)?;
    verify_webhook_signature(
        &body,
        signature,
        secret,
        Utc::now().timestamp(),
        WEBHOOK_TOLERANCE_SECS,
    )?;

    if let Some(event) = parse_payment_event(&body)? {
        let usecase = ApplyPaymentEventUseCase {
            repo: state.order_repo(),
        };
        usecase.execute(&event).await?;
    }
    Ok(Json(WebhookAck { received: true }))
}
