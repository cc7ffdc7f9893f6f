//! Payment webhook signature verification and event classification.

use crate::error::{IntegrationError, IntegrationResult};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "Stripe-Signature";
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Verify a `t=<unix>,v1=<hex>` signature header against `payload`.
///
/// A header that cannot be parsed is an error. A well-formed header whose
/// signatures don't match, or whose timestamp is older than `tolerance_secs`
/// relative to `now`, yields `Ok(false)`. Any one of several `v1` entries may
/// match, which is how the processor signals secret rotation.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance_secs: i64,
    now: i64,
) -> IntegrationResult<bool> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = part.split_once('=').ok_or_else(|| {
            IntegrationError::InvalidSignatureHeader(format!("malformed element {part:?}"))
        })?;
        match key {
            "t" => {
                let ts = value.parse::<i64>().map_err(|_| {
                    IntegrationError::InvalidSignatureHeader(format!("bad timestamp {value:?}"))
                })?;
                timestamp = Some(ts);
            }
            "v1" => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp
        .ok_or_else(|| IntegrationError::InvalidSignatureHeader("missing timestamp".into()))?;
    if signatures.is_empty() {
        return Err(IntegrationError::InvalidSignatureHeader(
            "missing v1 signature".into(),
        ));
    }

    if now - timestamp > tolerance_secs {
        return Ok(false);
    }

    Ok(signatures
        .iter()
        .filter_map(|sig| hex::decode(sig).ok())
        .any(|sig| {
            let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
                Ok(mac) => mac,
                Err(_) => return false,
            };
            mac.update(timestamp.to_string().as_bytes());
            mac.update(b".");
            mac.update(payload);
            // verify_slice compares in constant time
            mac.verify_slice(&sig).is_ok()
        }))
}

/// [`verify_signature`] against the current wall clock.
pub fn verify_signature_now(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance_secs: i64,
) -> IntegrationResult<bool> {
    verify_signature(
        payload,
        header,
        secret,
        tolerance_secs,
        chrono::Utc::now().timestamp(),
    )
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub data: EventData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventData {
    pub object: Value,
}

impl WebhookEvent {
    pub fn parse(payload: &[u8]) -> IntegrationResult<Self> {
        serde_json::from_slice(payload).map_err(|e| IntegrationError::Decode(e.to_string()))
    }
}

/// Who paid for what, as far as the event tells us.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentDetails {
    pub object_id: String,
    pub customer_email: Option<String>,
    pub customer_name: Option<String>,
    pub company: Option<String>,
    pub plan_name: Option<String>,
    /// Minor currency units
    pub amount: i64,
}

impl PaymentDetails {
    /// Name, email and plan are needed before anyone can be emailed.
    pub fn is_complete(&self) -> bool {
        self.customer_email.is_some() && self.customer_name.is_some() && self.plan_name.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaymentEvent {
    PaymentSucceeded(PaymentDetails),
    CheckoutCompleted(PaymentDetails),
    InvoicePaid { invoice_id: String },
    InvoiceFailed { invoice_id: String },
    Ignored(String),
}

fn text(value: &Value, pointer: &str) -> Option<String> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn object_id(object: &Value) -> String {
    text(object, "/id").unwrap_or_default()
}

impl PaymentEvent {
    pub fn from_event(event: WebhookEvent) -> Self {
        let object = &event.data.object;
        match event.kind.as_str() {
            "payment_intent.succeeded" => Self::PaymentSucceeded(PaymentDetails {
                object_id: object_id(object),
                customer_email: text(object, "/metadata/customer_email"),
                customer_name: text(object, "/metadata/customer_name"),
                company: text(object, "/metadata/company"),
                plan_name: text(object, "/metadata/plan_name"),
                amount: object.get("amount").and_then(Value::as_i64).unwrap_or(0),
            }),
            "checkout.session.completed" => Self::CheckoutCompleted(PaymentDetails {
                object_id: object_id(object),
                customer_email: text(object, "/customer_email")
                    .or_else(|| text(object, "/customer_details/email"))
                    .or_else(|| text(object, "/metadata/customer_email")),
                customer_name: text(object, "/customer_details/name")
                    .or_else(|| text(object, "/metadata/customer_name")),
                company: text(object, "/metadata/company"),
                plan_name: text(object, "/metadata/plan_name"),
                amount: object
                    .get("amount_total")
                    .and_then(Value::as_i64)
                    .unwrap_or(0),
            }),
            "invoice.payment_succeeded" => Self::InvoicePaid {
                invoice_id: object_id(object),
            },
            "invoice.payment_failed" => Self::InvoiceFailed {
                invoice_id: object_id(object),
            },
            _ => Self::Ignored(event.kind),
        }
    }
}
