//! Payment processor client.
//!
//! Stripe's REST API takes `application/x-www-form-urlencoded` bodies with
//! bracketed keys for nested values (`metadata[plan]`,
//! `line_items[0][quantity]`), so each request type flattens itself into a
//! list of pairs before it is sent.

use crate::error::{IntegrationError, IntegrationResult};
use crate::http;
use async_trait::async_trait;
use growthdesk_core::Settings;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

pub type Metadata = BTreeMap<String, String>;

type Form = Vec<(String, String)>;

fn push(form: &mut Form, key: impl Into<String>, value: impl ToString) {
    form.push((key.into(), value.to_string()));
}

fn push_metadata(form: &mut Form, prefix: &str, metadata: &Metadata) {
    for (key, value) in metadata {
        push(form, format!("{prefix}[{key}]"), value);
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewCustomer {
    pub email: String,
    pub name: String,
    pub metadata: Metadata,
}

impl NewCustomer {
    pub(crate) fn form(&self) -> Form {
        let mut form = Form::new();
        push(&mut form, "email", &self.email);
        push(&mut form, "name", &self.name);
        push_metadata(&mut form, "metadata", &self.metadata);
        form
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewPaymentIntent {
    /// Minor currency units
    pub amount: i64,
    pub currency: String,
    pub customer: String,
    pub description: String,
    pub metadata: Metadata,
}

impl NewPaymentIntent {
    pub(crate) fn form(&self) -> Form {
        let mut form = Form::new();
        push(&mut form, "amount", self.amount);
        push(&mut form, "currency", &self.currency);
        push(&mut form, "customer", &self.customer);
        push(&mut form, "description", &self.description);
        push_metadata(&mut form, "metadata", &self.metadata);
        form
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    pub status: String,
    pub amount: i64,
    #[serde(default)]
    pub metadata: Metadata,
}

impl PaymentIntent {
    pub fn is_succeeded(&self) -> bool {
        self.status == "succeeded"
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewRecurringPrice {
    pub unit_amount: i64,
    pub currency: String,
    /// `day`, `week`, `month` or `year`
    pub interval: String,
    pub product_name: String,
}

impl NewRecurringPrice {
    pub(crate) fn form(&self) -> Form {
        let mut form = Form::new();
        push(&mut form, "unit_amount", self.unit_amount);
        push(&mut form, "currency", &self.currency);
        push(&mut form, "recurring[interval]", &self.interval);
        push(&mut form, "product_data[name]", &self.product_name);
        form
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewSubscription {
    pub customer: String,
    pub price: String,
    /// Unix seconds
    pub trial_end: i64,
    pub metadata: Metadata,
}

impl NewSubscription {
    pub(crate) fn form(&self) -> Form {
        let mut form = Form::new();
        push(&mut form, "customer", &self.customer);
        push(&mut form, "items[0][price]", &self.price);
        push(&mut form, "trial_end", self.trial_end);
        push_metadata(&mut form, "metadata", &self.metadata);
        form
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Embedded, one-time checkout for a single line item.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewCheckoutSession {
    pub customer: String,
    pub currency: String,
    pub product_name: String,
    pub product_description: String,
    pub unit_amount: i64,
    pub return_url: String,
    pub metadata: Metadata,
}

impl NewCheckoutSession {
    pub(crate) fn form(&self) -> Form {
        let mut form = Form::new();
        push(&mut form, "customer", &self.customer);
        push(&mut form, "payment_method_types[0]", "card");
        push(&mut form, "line_items[0][price_data][currency]", &self.currency);
        push(
            &mut form,
            "line_items[0][price_data][product_data][name]",
            &self.product_name,
        );
        push(
            &mut form,
            "line_items[0][price_data][product_data][description]",
            &self.product_description,
        );
        push(
            &mut form,
            "line_items[0][price_data][unit_amount]",
            self.unit_amount,
        );
        push(&mut form, "line_items[0][quantity]", 1);
        push(&mut form, "mode", "payment");
        push(&mut form, "ui_mode", "embedded");
        push(&mut form, "return_url", &self.return_url);
        push_metadata(&mut form, "metadata", &self.metadata);
        form
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
}

#[derive(Deserialize)]
struct List<T> {
    data: Vec<T>,
}

#[async_trait]
pub trait PaymentClient: Send + Sync {
    async fn create_customer(&self, customer: &NewCustomer) -> IntegrationResult<Customer>;

    /// First customer registered under `email`, if any.
    async fn find_customer_by_email(&self, email: &str) -> IntegrationResult<Option<Customer>>;

    async fn create_payment_intent(
        &self,
        intent: &NewPaymentIntent,
    ) -> IntegrationResult<PaymentIntent>;

    async fn retrieve_payment_intent(&self, id: &str) -> IntegrationResult<PaymentIntent>;

    async fn create_recurring_price(&self, price: &NewRecurringPrice) -> IntegrationResult<Price>;

    async fn create_subscription(
        &self,
        subscription: &NewSubscription,
    ) -> IntegrationResult<Subscription>;

    async fn create_checkout_session(
        &self,
        session: &NewCheckoutSession,
    ) -> IntegrationResult<CheckoutSession>;

    fn is_configured(&self) -> bool;
}

#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: Option<SecretString>,
    pub api_base: String,
    pub timeout_secs: u64,
}

impl StripeConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            secret_key: settings.secrets.stripe_secret_key.clone(),
            api_base: settings.payments.api_base.clone(),
            timeout_secs: settings.payments.timeout_secs,
        }
    }
}

pub struct StripeClient {
    config: StripeConfig,
    client: Client,
}

impl StripeClient {
    pub fn new(config: StripeConfig) -> IntegrationResult<Self> {
        let client = http::build_client(config.timeout_secs)?;
        Ok(Self { config, client })
    }

    fn secret_key(&self) -> IntegrationResult<&str> {
        self.config
            .secret_key
            .as_ref()
            .map(|k| k.expose_secret())
            .ok_or(IntegrationError::NotConfigured("Stripe"))
    }

    async fn post_form<T: serde::de::DeserializeOwned>(
        &self,
        segments: &[&str],
        form: &Form,
    ) -> IntegrationResult<T> {
        let key = self.secret_key()?;
        let url = http::endpoint(&self.config.api_base, segments)?;
        debug!(path = %url.path(), "Stripe POST");
        let response = self
            .client
            .post(url)
            .bearer_auth(key)
            .form(form)
            .send()
            .await?;
        http::decode("Stripe", response).await
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> IntegrationResult<T> {
        let key = self.secret_key()?;
        let url = http::endpoint(&self.config.api_base, segments)?;
        debug!(path = %url.path(), "Stripe GET");
        let response = self
            .client
            .get(url)
            .bearer_auth(key)
            .query(query)
            .send()
            .await?;
        http::decode("Stripe", response).await
    }
}

#[async_trait]
impl PaymentClient for StripeClient {
    async fn create_customer(&self, customer: &NewCustomer) -> IntegrationResult<Customer> {
        self.post_form(&["v1", "customers"], &customer.form()).await
    }

    async fn find_customer_by_email(&self, email: &str) -> IntegrationResult<Option<Customer>> {
        let list: List<Customer> = self
            .get(&["v1", "customers"], &[("email", email), ("limit", "1")])
            .await?;
        Ok(list.data.into_iter().next())
    }

    async fn create_payment_intent(
        &self,
        intent: &NewPaymentIntent,
    ) -> IntegrationResult<PaymentIntent> {
        self.post_form(&["v1", "payment_intents"], &intent.form())
            .await
    }

    async fn retrieve_payment_intent(&self, id: &str) -> IntegrationResult<PaymentIntent> {
        if id.trim().is_empty() {
            return Err(IntegrationError::InvalidRequest(
                "payment intent id is empty".into(),
            ));
        }
        self.get(&["v1", "payment_intents", id], &[]).await
    }

    async fn create_recurring_price(&self, price: &NewRecurringPrice) -> IntegrationResult<Price> {
        self.post_form(&["v1", "prices"], &price.form()).await
    }

    async fn create_subscription(
        &self,
        subscription: &NewSubscription,
    ) -> IntegrationResult<Subscription> {
        self.post_form(&["v1", "subscriptions"], &subscription.form())
            .await
    }

    async fn create_checkout_session(
        &self,
        session: &NewCheckoutSession,
    ) -> IntegrationResult<CheckoutSession> {
        self.post_form(&["v1", "checkout", "sessions"], &session.form())
            .await
    }

    fn is_configured(&self) -> bool {
        self.config.secret_key.is_some()
    }
}
