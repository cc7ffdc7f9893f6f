//! In-memory collaborators for exercising the router and workflows.
#![allow(dead_code)]

use async_trait::async_trait;
use growthdesk_api::AppState;
use growthdesk_core::Settings;
use growthdesk_integrations::*;
use hmac::{Hmac, Mac};
use parking_lot::Mutex;
use secrecy::SecretString;
use sha2::Sha256;
use std::sync::Arc;

pub const WEBHOOK_SECRET: &str = "whsec_test_secret";

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<EmailMessage>>,
    pub unconfigured: bool,
    /// Recipients whose delivery is rejected
    pub reject: Vec<String>,
}

impl RecordingMailer {
    pub fn recipients(&self) -> Vec<String> {
        self.sent.lock().iter().map(|m| m.to.email.clone()).collect()
    }

    pub fn subjects(&self) -> Vec<String> {
        self.sent.lock().iter().map(|m| m.subject.clone()).collect()
    }
}

#[async_trait]
impl EmailSender for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> IntegrationResult<()> {
        if self.unconfigured {
            return Err(IntegrationError::NotConfigured("SendGrid"));
        }
        if self.reject.contains(&message.to.email) {
            return Err(IntegrationError::Api {
                service: "SendGrid",
                status: 400,
                body: "rejected".into(),
            });
        }
        self.sent.lock().push(message.clone());
        Ok(())
    }

    fn is_configured(&self) -> bool {
        !self.unconfigured
    }
}

#[derive(Default)]
pub struct RecordingCrm {
    pub leads: Mutex<Vec<CrmLead>>,
    pub unconfigured: bool,
    pub fail: bool,
}

#[async_trait]
impl CrmClient for RecordingCrm {
    async fn upsert_lead(&self, lead: &CrmLead) -> IntegrationResult<CrmOutcome> {
        if self.fail {
            return Err(IntegrationError::Api {
                service: "HubSpot",
                status: 500,
                body: "boom".into(),
            });
        }
        self.leads.lock().push(lead.clone());
        Ok(CrmOutcome {
            contact_id: "101".into(),
            created: true,
            deal_id: Some("301".into()),
        })
    }

    fn is_configured(&self) -> bool {
        !self.unconfigured
    }
}

#[derive(Default)]
pub struct FakePayments {
    pub customers: Mutex<Vec<NewCustomer>>,
    pub intents: Mutex<Vec<NewPaymentIntent>>,
    pub prices: Mutex<Vec<NewRecurringPrice>>,
    pub subscriptions: Mutex<Vec<NewSubscription>>,
    pub sessions: Mutex<Vec<NewCheckoutSession>>,
    pub existing_customer: Option<Customer>,
    pub retrievable: Vec<PaymentIntent>,
    pub fail_customer: bool,
    pub fail_subscription: bool,
}

fn declined(message: &str) -> IntegrationError {
    IntegrationError::Api {
        service: "Stripe",
        status: 402,
        body: message.into(),
    }
}

#[async_trait]
impl PaymentClient for FakePayments {
    async fn create_customer(&self, customer: &NewCustomer) -> IntegrationResult<Customer> {
        if self.fail_customer {
            return Err(declined("customer rejected"));
        }
        self.customers.lock().push(customer.clone());
        Ok(Customer {
            id: "cus_new".into(),
            email: Some(customer.email.clone()),
            name: Some(customer.name.clone()),
            metadata: customer.metadata.clone(),
        })
    }

    async fn find_customer_by_email(&self, email: &str) -> IntegrationResult<Option<Customer>> {
        Ok(self
            .existing_customer
            .clone()
            .filter(|c| c.email.as_deref() == Some(email)))
    }

    async fn create_payment_intent(
        &self,
        intent: &NewPaymentIntent,
    ) -> IntegrationResult<PaymentIntent> {
        self.intents.lock().push(intent.clone());
        Ok(PaymentIntent {
            id: "pi_new".into(),
            client_secret: Some("pi_new_secret".into()),
            status: "requires_payment_method".into(),
            amount: intent.amount,
            metadata: intent.metadata.clone(),
        })
    }

    async fn retrieve_payment_intent(&self, id: &str) -> IntegrationResult<PaymentIntent> {
        self.retrievable
            .iter()
            .find(|i| i.id == id)
            .cloned()
            .ok_or_else(|| IntegrationError::Api {
                service: "Stripe",
                status: 404,
                body: format!("No such payment_intent: '{id}'"),
            })
    }

    async fn create_recurring_price(&self, price: &NewRecurringPrice) -> IntegrationResult<Price> {
        self.prices.lock().push(price.clone());
        Ok(Price {
            id: "price_monthly".into(),
        })
    }

    async fn create_subscription(
        &self,
        subscription: &NewSubscription,
    ) -> IntegrationResult<Subscription> {
        if self.fail_subscription {
            return Err(declined("subscription rejected"));
        }
        self.subscriptions.lock().push(subscription.clone());
        Ok(Subscription {
            id: "sub_1".into(),
            status: Some("trialing".into()),
        })
    }

    async fn create_checkout_session(
        &self,
        session: &NewCheckoutSession,
    ) -> IntegrationResult<CheckoutSession> {
        self.sessions.lock().push(session.clone());
        Ok(CheckoutSession {
            id: "cs_1".into(),
            client_secret: Some("cs_1_secret".into()),
        })
    }

    fn is_configured(&self) -> bool {
        true
    }
}

pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.email.notify_email = "sales@growthdesk.example".into();
    settings.email.booking_url = "https://growthdesk.example/book".into();
    settings.payments.return_url_base = "https://growthdesk.example/".into();
    settings.secrets.stripe_webhook_secret = Some(SecretString::from(WEBHOOK_SECRET.to_string()));
    settings
}

pub struct Harness {
    pub state: AppState,
    pub mailer: Arc<RecordingMailer>,
    pub crm: Arc<RecordingCrm>,
    pub payments: Arc<FakePayments>,
}

impl Harness {
    pub fn new(mailer: RecordingMailer, crm: RecordingCrm, payments: FakePayments) -> Self {
        Self::with_settings(test_settings(), mailer, crm, payments)
    }

    pub fn with_settings(
        settings: Settings,
        mailer: RecordingMailer,
        crm: RecordingCrm,
        payments: FakePayments,
    ) -> Self {
        let mailer = Arc::new(mailer);
        let crm = Arc::new(crm);
        let payments = Arc::new(payments);
        let state =
            AppState::with_collaborators(settings, mailer.clone(), crm.clone(), payments.clone());
        Self {
            state,
            mailer,
            crm,
            payments,
        }
    }

    pub fn healthy() -> Self {
        Self::new(
            RecordingMailer::default(),
            RecordingCrm::default(),
            FakePayments::default(),
        )
    }
}

pub fn sign(payload: &[u8], timestamp: i64) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(WEBHOOK_SECRET.as_bytes()).unwrap();
    mac.update(format!("{timestamp}.").as_bytes());
    mac.update(payload);
    format!(
        "t={timestamp},v1={}",
        hex::encode(mac.finalize().into_bytes())
    )
}
