pub mod crm;
pub mod email;
pub mod error;
mod http;
pub mod payments;
pub mod webhook;

pub use crm::{CrmClient, CrmLead, CrmOutcome, HubSpotClient, HubSpotConfig};
pub use email::{EmailAddress, EmailMessage, EmailSender, SendGridClient, SendGridConfig};
pub use error::{IntegrationError, IntegrationResult};
pub use payments::{
    CheckoutSession, Customer, Metadata, NewCheckoutSession, NewCustomer, NewPaymentIntent,
    NewRecurringPrice, NewSubscription, PaymentClient, PaymentIntent, Price, StripeClient,
    StripeConfig, Subscription,
};
pub use webhook::{
    verify_signature, verify_signature_now, EventData, PaymentDetails, PaymentEvent, WebhookEvent,
    DEFAULT_TOLERANCE_SECS, SIGNATURE_HEADER,
};
