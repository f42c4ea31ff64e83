use anyhow::Context as _;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use learnhub_domain::order::PaymentStatus;

use crate::domain::repository::PaymentPort;
use crate::domain::types::{CheckoutRequest, CheckoutSession, PaymentEvent};
use crate::error::MarketplaceError;

/// Header carrying the webhook signature.
pub const STRIPE_SIGNATURE: &str = "stripe-signature";

/// Maximum accepted age of a signed webhook, in seconds.
pub const WEBHOOK_TOLERANCE_SECS: i64 = 300;

const CURRENCY: &str = "usd";

/// Stripe Checkout client over the form-encoded REST API.
#[derive(Clone)]
pub struct StripeClient {
    pub http: reqwest::Client,
    pub secret_key: String,
    pub api_base: String,
}

#[derive(Deserialize)]
struct SessionResponse {
    id: String,
    url: Option<String>,
}

/// Form fields for a one-item card checkout.
pub fn checkout_form(request: &CheckoutRequest) -> Vec<(&'static str, String)> {
    let mut form = vec![
        ("mode", "payment".to_owned()),
        ("payment_method_types[0]", "card".to_owned()),
        ("line_items[0][quantity]", "1".to_owned()),
        ("line_items[0][price_data][currency]", CURRENCY.to_owned()),
        (
            "line_items[0][price_data][unit_amount]",
            request.unit_amount.to_string(),
        ),
        (
            "line_items[0][price_data][product_data][name]",
            request.product_name.clone(),
        ),
        ("success_url", request.success_url.clone()),
        ("cancel_url", request.cancel_url.clone()),
        ("metadata[courseId]", request.course_id.to_string()),
        ("metadata[studentId]", request.student_id.to_string()),
    ];
    // Stripe rejects an empty description.
    if let Some(description) = request
        .product_description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
    {
        form.push((
            "line_items[0][price_data][product_data][description]",
            description.to_owned(),
        ));
    }
    form
}

impl PaymentPort for StripeClient {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, MarketplaceError> {
        let url = format!(
            "{}/v1/checkout/sessions",
            self.api_base.trim_end_matches('/')
        );
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.secret_key)
            .form(&checkout_form(request))
            .send()
            .await
            .context("send checkout session request")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("stripe responded {status}: {body}").into());
        }

        let session: SessionResponse = response
            .json()
            .await
            .context("decode checkout session")?;
        let url = session
            .url
            .with_context(|| format!("checkout session {} has no url", session.id))?;
        Ok(CheckoutSession {
            id: session.id,
            url,
        })
    }
}

// ── Webhooks ─────────────────────────────────────────────────────────────────

/// Check a `Stripe-Signature` header (`t=<unix>,v1=<hex>[,v1=<hex>…]`)
/// against the raw request body.
///
/// The signed payload is `"{t}.{body}"` under HMAC-SHA256. Timestamps older
/// than `tolerance` seconds relative to `now` are rejected.
pub fn verify_webhook_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: i64,
    tolerance: i64,
) -> Result<(), MarketplaceError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(MarketplaceError::InvalidSignature)?;
    if signatures.is_empty() || (now - timestamp).abs() > tolerance {
        return Err(MarketplaceError::InvalidSignature);
    }

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|e| anyhow::anyhow!("webhook secret: {e}"))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);

    let matched = signatures.iter().any(|candidate| {
        hex::decode(candidate)
            .map(|bytes| mac.clone().verify_slice(&bytes).is_ok())
            .unwrap_or(false)
    });
    if matched {
        Ok(())
    } else {
        Err(MarketplaceError::InvalidSignature)
    }
}

#[derive(Deserialize)]
struct WebhookEvent {
    #[serde(rename = "type")]
    kind: String,
    data: WebhookData,
}

#[derive(Deserialize)]
struct WebhookData {
    object: SessionObject,
}

#[derive(Deserialize)]
struct SessionObject {
    id: String,
    payment_status: Option<String>,
}

/// Map a verified webhook body onto an order status change.
///
/// Returns `None` for event types that do not affect orders, and for
/// completed sessions whose payment is still settling.
pub fn parse_payment_event(payload: &[u8]) -> Result<Option<PaymentEvent>, MarketplaceError> {
    let event: WebhookEvent = serde_json::from_slice(payload)
        .map_err(|e| MarketplaceError::InvalidBody(e.to_string()))?;
    let session = event.data.object;

    let status = match event.kind.as_str() {
        // Free checkouts complete with `no_payment_required`.
        "checkout.session.completed" => match session.payment_status.as_deref() {
            Some("paid" | "no_payment_required") => PaymentStatus::Completed,
            _ => return Ok(None),
        },
        "checkout.session.async_payment_succeeded" => PaymentStatus::Completed,
        "checkout.session.expired" | "checkout.session.async_payment_failed" => {
            PaymentStatus::Failed
        }
        _ => return Ok(None),
    };

    Ok(Some(PaymentEvent {
        session_id: session.id,
        status,
    }))
}
