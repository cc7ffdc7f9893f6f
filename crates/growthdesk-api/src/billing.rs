//! Setup-fee payments, monthly subscriptions and payment-event follow-up.
//!
//! Multi-step operations are not transactional: a customer created before a
//! later step fails is left in place at the processor.

use crate::emails::{self, PaymentReceipt};
use crate::error::{ApiError, ApiResult};
use crate::AppState;
use chrono::Utc;
use growthdesk_core::{cents_to_major, Plan, PlanSummary};
use growthdesk_integrations::{
    verify_signature_now, Metadata, NewCheckoutSession, NewCustomer, NewPaymentIntent,
    NewRecurringPrice, NewSubscription, PaymentDetails, PaymentEvent, WebhookEvent,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

fn metadata<const N: usize>(pairs: [(&str, &str); N]) -> Metadata {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn text(value: &Option<String>) -> &str {
    value.as_deref().map(str::trim).unwrap_or_default()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentIntentRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub shopify_url: Option<String>,
    #[serde(default)]
    pub plan: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntentResponse {
    pub client_secret: Option<String>,
    pub customer_id: String,
    pub subscription_id: Option<String>,
    pub plan_info: PlanSummary,
}

/// Customer, setup-fee intent, then a trialing monthly subscription.
pub async fn start_plan_payment(
    state: &AppState,
    request: &PaymentIntentRequest,
) -> ApiResult<PaymentIntentResponse> {
    let plan: Plan = match request.plan.as_deref() {
        None => Plan::default(),
        Some(key) => key
            .parse()
            .map_err(|_| ApiError::BadRequest("Invalid plan selected".into()))?,
    };
    let payments = &state.settings.payments;
    let name = text(&request.name);
    let email = text(&request.email);
    let company = text(&request.company);

    let customer = state
        .payments
        .create_customer(&NewCustomer {
            email: email.to_string(),
            name: name.to_string(),
            metadata: metadata([
                ("company", company),
                ("phone", text(&request.phone)),
                ("shopify_url", text(&request.shopify_url)),
                ("plan", plan.key()),
            ]),
        })
        .await
        .map_err(|e| {
            error!(error = %e, "Error creating payment customer");
            ApiError::Internal("Failed to create customer".into())
        })?;

    let intent = state
        .payments
        .create_payment_intent(&NewPaymentIntent {
            amount: plan.setup_fee_cents(),
            currency: payments.currency.clone(),
            customer: customer.id.clone(),
            description: format!("{} - Setup Fee", plan.name()),
            metadata: metadata([
                ("plan", plan.key()),
                ("plan_name", plan.name()),
                ("customer_name", name),
                ("customer_email", email),
                ("company", company),
                ("type", "setup_fee"),
            ]),
        })
        .await
        .map_err(|e| {
            error!(customer_id = %customer.id, error = %e, "Error creating payment intent");
            ApiError::Internal("Failed to create payment intent".into())
        })?;

    let subscription_id = match create_monthly_subscription(
        state,
        plan,
        &customer.id,
        name,
        email,
        company,
    )
    .await
    {
        Ok(id) => Some(id),
        Err(e) => {
            warn!(customer_id = %customer.id, error = %e, "Continuing without subscription");
            None
        }
    };

    info!(
        customer_id = %customer.id,
        payment_intent = %intent.id,
        plan = %plan,
        subscribed = subscription_id.is_some(),
        "Plan payment started"
    );

    Ok(PaymentIntentResponse {
        client_secret: intent.client_secret,
        customer_id: customer.id,
        subscription_id,
        plan_info: plan.summary(),
    })
}

async fn create_monthly_subscription(
    state: &AppState,
    plan: Plan,
    customer_id: &str,
    name: &str,
    email: &str,
    company: &str,
) -> ApiResult<String> {
    let payments = &state.settings.payments;
    let price = state
        .payments
        .create_recurring_price(&NewRecurringPrice {
            unit_amount: plan.monthly_fee_cents(),
            currency: payments.currency.clone(),
            interval: "month".into(),
            product_name: format!("{} - Monthly Service", plan.name()),
        })
        .await?;

    let trial_end = Utc::now().timestamp() + i64::from(payments.trial_days) * SECONDS_PER_DAY;
    let subscription = state
        .payments
        .create_subscription(&NewSubscription {
            customer: customer_id.to_string(),
            price: price.id,
            trial_end,
            metadata: metadata([
                ("plan", plan.key()),
                ("plan_name", plan.name()),
                ("customer_name", name),
                ("customer_email", email),
                ("company", company),
            ]),
        })
        .await?;
    Ok(subscription.id)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfirmPaymentRequest {
    #[serde(default)]
    pub payment_intent_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmPaymentResponse {
    pub success: bool,
    pub customer_email_sent: bool,
    pub notification_email_sent: bool,
    /// Major currency units
    pub amount: f64,
    pub plan_name: Option<String>,
}

pub async fn confirm_payment(
    state: &AppState,
    request: &ConfirmPaymentRequest,
) -> ApiResult<ConfirmPaymentResponse> {
    let id = text(&request.payment_intent_id);
    if id.is_empty() {
        return Err(ApiError::BadRequest("Payment intent ID required".into()));
    }

    let intent = state
        .payments
        .retrieve_payment_intent(id)
        .await
        .map_err(|e| {
            warn!(payment_intent = %id, error = %e, "Could not retrieve payment intent");
            ApiError::BadRequest("Invalid payment intent".into())
        })?;
    if !intent.is_succeeded() {
        return Err(ApiError::BadRequest("Payment not successful".into()));
    }

    let field = |key: &str| intent.metadata.get(key).cloned().unwrap_or_default();
    let plan_name = intent.metadata.get("plan_name").cloned();
    let receipt = PaymentReceipt {
        customer_email: field("customer_email"),
        customer_name: field("customer_name"),
        company: intent.metadata.get("company").cloned(),
        plan_name: plan_name.clone().unwrap_or_default(),
        amount: cents_to_major(intent.amount),
        recurring: true,
    };
    let (customer_email_sent, notification_email_sent) =
        send_payment_emails(state, &receipt).await;

    Ok(ConfirmPaymentResponse {
        success: true,
        customer_email_sent,
        notification_email_sent,
        amount: receipt.amount,
        plan_name,
    })
}

/// Confirmation to the customer, then the sales-inbox alert.
pub async fn send_payment_emails(state: &AppState, receipt: &PaymentReceipt) -> (bool, bool) {
    let now = Utc::now();

    let customer_sent = match state
        .email
        .send(&emails::payment_confirmation(receipt, now))
        .await
    {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Failed to send payment confirmation email");
            false
        }
    };

    let notification =
        emails::payment_notification(receipt, &state.settings.email.notify_email, now);
    let notification_sent = match state.email.send(&notification).await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Failed to send payment notification email");
            false
        }
    };

    info!(
        customer = customer_sent,
        admin = notification_sent,
        plan = %receipt.plan_name,
        "Payment emails processed"
    );
    (customer_sent, notification_sent)
}

/// Authenticate a raw webhook body and act on the event it carries.
pub async fn handle_webhook(
    state: &AppState,
    payload: &[u8],
    signature: Option<&str>,
) -> ApiResult<PaymentEvent> {
    let secret = state.settings.stripe_webhook_secret().ok_or_else(|| {
        error!("Webhook received but no webhook secret is configured");
        ApiError::Internal("Webhook secret not configured".into())
    })?;

    let invalid = || ApiError::BadRequest("Invalid signature".into());
    let header = signature.ok_or_else(invalid)?;
    match verify_signature_now(
        payload,
        header,
        secret,
        state.settings.payments.webhook_tolerance_secs,
    ) {
        Ok(true) => {}
        Ok(false) => {
            warn!("Webhook signature mismatch or stale timestamp");
            return Err(invalid());
        }
        Err(e) => {
            warn!(error = %e, "Malformed webhook signature header");
            return Err(invalid());
        }
    }

    let event = WebhookEvent::parse(payload)
        .map_err(|_| ApiError::BadRequest("Invalid payload".into()))?;
    let event_id = event.id.clone();
    let event = PaymentEvent::from_event(event);

    match &event {
        PaymentEvent::PaymentSucceeded(details) => {
            info!(payment_intent = %details.object_id, "Payment succeeded");
            match receipt_from(details, None) {
                Some(receipt) if details.is_complete() => {
                    send_payment_emails(state, &receipt).await;
                }
                _ => warn!(
                    payment_intent = %details.object_id,
                    "Missing customer data in payment metadata"
                ),
            }
        }
        PaymentEvent::CheckoutCompleted(details) => {
            info!(session = %details.object_id, "Checkout session completed");
            match receipt_from(details, Some("Customer")) {
                Some(receipt) => {
                    send_payment_emails(state, &receipt).await;
                }
                None => warn!(
                    session = %details.object_id,
                    "Missing customer data in checkout session"
                ),
            }
        }
        PaymentEvent::InvoicePaid { invoice_id } => {
            info!(invoice = %invoice_id, "Subscription payment succeeded");
        }
        PaymentEvent::InvoiceFailed { invoice_id } => {
            warn!(invoice = %invoice_id, "Subscription payment failed");
        }
        PaymentEvent::Ignored(kind) => {
            debug!(event = %event_id, kind = %kind, "Ignoring webhook event");
        }
    }

    Ok(event)
}

fn receipt_from(details: &PaymentDetails, default_name: Option<&str>) -> Option<PaymentReceipt> {
    let customer_name = details
        .customer_name
        .clone()
        .or_else(|| default_name.map(str::to_string))?;
    Some(PaymentReceipt {
        customer_email: details.customer_email.clone()?,
        customer_name,
        company: details.company.clone(),
        plan_name: details.plan_name.clone()?,
        amount: cents_to_major(details.amount),
        recurring: true,
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub client_secret: Option<String>,
    pub customer_id: String,
    pub plan_info: PlanSummary,
}

fn or_default<'a>(value: &'a Option<String>, fallback: &'a str) -> &'a str {
    match text(value) {
        "" => fallback,
        v => v,
    }
}

/// Embedded one-time checkout for the plan's setup fee.
pub async fn create_checkout(
    state: &AppState,
    request: &CheckoutRequest,
) -> ApiResult<CheckoutResponse> {
    let plan = request
        .plan
        .as_deref()
        .and_then(|key| key.parse::<Plan>().ok())
        .unwrap_or_default();
    let name = or_default(&request.name, "Customer");
    let email = or_default(&request.email, "customer@example.com");
    let company = or_default(&request.company, "Company");
    let website = or_default(&request.website, "https://example.com");
    let payments = &state.settings.payments;

    let internal = |e: growthdesk_integrations::IntegrationError| {
        error!(error = %e, "Error creating checkout session");
        ApiError::Internal(e.to_string())
    };

    let customer = match state
        .payments
        .find_customer_by_email(email)
        .await
        .map_err(internal)?
    {
        Some(existing) => existing,
        None => state
            .payments
            .create_customer(&NewCustomer {
                email: email.to_string(),
                name: name.to_string(),
                metadata: metadata([
                    ("company", company),
                    ("website", website),
                    ("plan", plan.key()),
                ]),
            })
            .await
            .map_err(internal)?,
    };

    let setup_fee = cents_to_major(plan.setup_fee_cents()).to_string();
    let monthly_fee = cents_to_major(plan.monthly_fee_cents()).to_string();
    let session = state
        .payments
        .create_checkout_session(&NewCheckoutSession {
            customer: customer.id.clone(),
            currency: payments.currency.clone(),
            product_name: format!("{} - Setup Fee", plan.name()),
            product_description: format!("One-time setup fee for {}", plan.name()),
            unit_amount: plan.setup_fee_cents(),
            return_url: format!(
                "{}/payment-success?session_id={{CHECKOUT_SESSION_ID}}",
                payments.return_url_base.trim_end_matches('/')
            ),
            metadata: metadata([
                ("plan", plan.key()),
                ("plan_name", plan.name()),
                ("customer_name", name),
                ("customer_email", email),
                ("company", company),
                ("customer_website", website),
                ("setup_fee", setup_fee.as_str()),
                ("monthly_fee", monthly_fee.as_str()),
            ]),
        })
        .await
        .map_err(internal)?;

    info!(
        customer_id = %customer.id,
        session = %session.id,
        plan = %plan,
        "Checkout session created"
    );

    Ok(CheckoutResponse {
        client_secret: session.client_secret,
        customer_id: customer.id,
        plan_info: plan.summary(),
    })
}
