use growthdesk_core::Settings;
use growthdesk_integrations::{
    CrmClient, EmailSender, HubSpotClient, HubSpotConfig, IntegrationResult, PaymentClient,
    SendGridClient, SendGridConfig, StripeClient, StripeConfig,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub email: Arc<dyn EmailSender>,
    pub crm: Arc<dyn CrmClient>,
    pub payments: Arc<dyn PaymentClient>,
}

impl AppState {
    /// Wire the HTTP-backed clients from settings.
    pub fn new(settings: Settings) -> IntegrationResult<Self> {
        let email = Arc::new(SendGridClient::new(SendGridConfig::from_settings(&settings))?);
        let crm = Arc::new(HubSpotClient::new(HubSpotConfig::from_settings(&settings))?);
        let payments = Arc::new(StripeClient::new(StripeConfig::from_settings(&settings))?);
        Ok(Self::with_collaborators(settings, email, crm, payments))
    }

    pub fn with_collaborators(
        settings: Settings,
        email: Arc<dyn EmailSender>,
        crm: Arc<dyn CrmClient>,
        payments: Arc<dyn PaymentClient>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            email,
            crm,
            payments,
        }
    }
}
