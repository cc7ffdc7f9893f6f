use crate::error::{api_error, IntegrationError, IntegrationResult};
use crate::http;
use async_trait::async_trait;
use growthdesk_core::{LeadSubmission, RoiProjection, Settings};
use reqwest::{Client, StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

/// HubSpot's built-in contact-to-deal association type.
const DEAL_TO_CONTACT_ASSOCIATION: u32 = 3;

/// Lead fields forwarded to the CRM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrmLead {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub phone: String,
    pub website: String,
    pub monthly_revenue: f64,
    pub business_category: String,
    pub monthly_increase: f64,
    pub annual_increase: f64,
    pub lead_score: u8,
}

impl CrmLead {
    pub fn from_submission(
        submission: &LeadSubmission,
        projection: &RoiProjection,
        lead_score: u8,
    ) -> Self {
        let contact = &submission.contact;
        Self {
            email: contact.email.trim().to_string(),
            first_name: contact.first_name.clone(),
            last_name: contact.last_name.clone(),
            company: contact.company.clone(),
            phone: contact.phone.clone(),
            website: contact.website.clone(),
            monthly_revenue: submission.metrics.monthly_revenue,
            business_category: submission.metrics.business_category.to_string(),
            monthly_increase: projection.monthly_increase,
            annual_increase: projection.annual_increase,
            lead_score,
        }
    }

    fn company_or_unknown(&self) -> &str {
        let company = self.company.trim();
        if company.is_empty() {
            "Unknown Company"
        } else {
            company
        }
    }

    pub(crate) fn contact_properties(&self) -> Value {
        json!({
            "properties": {
                "email": self.email,
                "firstname": self.first_name,
                "lastname": self.last_name,
                "company": self.company,
                "phone": self.phone,
                "website": self.website,
                "lifecyclestage": "lead",
                "notes": format!(
                    "ROI Calculator Submission - Monthly Revenue: ${}, Business Category: {}, Projected Monthly Increase: ${}, Lead Score: {}",
                    self.monthly_revenue, self.business_category, self.monthly_increase, self.lead_score
                ),
            }
        })
    }

    pub(crate) fn deal_body(&self, contact_id: &str) -> Value {
        json!({
            "properties": {
                "dealname": format!("ROI Calculator Lead - {}", self.company_or_unknown()),
                "dealstage": "appointmentscheduled",
                "pipeline": "default",
                "amount": self.annual_increase.to_string(),
                "deal_source": "ROI Calculator",
                "monthly_revenue": self.monthly_revenue.to_string(),
                "projected_increase": self.monthly_increase.to_string(),
                "lead_score": self.lead_score.to_string(),
            },
            "associations": [{
                "to": {"id": contact_id},
                "types": [{
                    "associationCategory": "HUBSPOT_DEFINED",
                    "associationTypeId": DEAL_TO_CONTACT_ASSOCIATION,
                }],
            }],
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrmOutcome {
    pub contact_id: String,
    /// `false` when an existing contact was updated
    pub created: bool,
    /// `None` when the deal could not be created
    pub deal_id: Option<String>,
}

#[async_trait]
pub trait CrmClient: Send + Sync {
    async fn upsert_lead(&self, lead: &CrmLead) -> IntegrationResult<CrmOutcome>;

    fn is_configured(&self) -> bool;
}

#[derive(Debug, Clone)]
pub struct HubSpotConfig {
    pub api_key: Option<SecretString>,
    pub portal_id: Option<String>,
    pub api_base: String,
    pub timeout_secs: u64,
}

impl HubSpotConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            api_key: settings.secrets.hubspot_api_key.clone(),
            portal_id: settings.secrets.hubspot_portal_id.clone(),
            api_base: settings.crm.api_base.clone(),
            timeout_secs: settings.crm.timeout_secs,
        }
    }
}

#[derive(Deserialize)]
struct ObjectRef {
    id: String,
}

/// HubSpot CRM v3 client: contact upsert followed by an associated deal.
pub struct HubSpotClient {
    config: HubSpotConfig,
    client: Client,
}

impl HubSpotClient {
    pub fn new(config: HubSpotConfig) -> IntegrationResult<Self> {
        let client = http::build_client(config.timeout_secs)?;
        Ok(Self { config, client })
    }

    fn url(&self, segments: &[&str]) -> IntegrationResult<Url> {
        http::endpoint(&self.config.api_base, segments)
    }

    async fn read_id(response: reqwest::Response) -> IntegrationResult<String> {
        http::decode::<ObjectRef>("HubSpot", response)
            .await
            .map(|r| r.id)
    }

    async fn create_or_update_contact(
        &self,
        api_key: &str,
        lead: &CrmLead,
    ) -> IntegrationResult<(String, bool)> {
        let body = lead.contact_properties();
        let response = self
            .client
            .post(self.url(&["crm", "v3", "objects", "contacts"])?)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        match response.status() {
            StatusCode::CREATED => Ok((Self::read_id(response).await?, true)),
            StatusCode::CONFLICT => {
                let response = self
                    .client
                    .patch(self.url(&["crm", "v3", "objects", "contacts", &lead.email])?)
                    .query(&[("idProperty", "email")])
                    .bearer_auth(api_key)
                    .json(&body)
                    .send()
                    .await?;
                if response.status() == StatusCode::OK {
                    Ok((Self::read_id(response).await?, false))
                } else {
                    Err(api_error("HubSpot", response).await)
                }
            }
            _ => Err(api_error("HubSpot", response).await),
        }
    }

    async fn create_deal(
        &self,
        api_key: &str,
        lead: &CrmLead,
        contact_id: &str,
    ) -> IntegrationResult<String> {
        let response = self
            .client
            .post(self.url(&["crm", "v3", "objects", "deals"])?)
            .bearer_auth(api_key)
            .json(&lead.deal_body(contact_id))
            .send()
            .await?;
        if response.status() == StatusCode::CREATED {
            Self::read_id(response).await
        } else {
            Err(api_error("HubSpot", response).await)
        }
    }
}

#[async_trait]
impl CrmClient for HubSpotClient {
    async fn upsert_lead(&self, lead: &CrmLead) -> IntegrationResult<CrmOutcome> {
        let api_key = match (&self.config.api_key, &self.config.portal_id) {
            (Some(key), Some(_)) => key.expose_secret(),
            _ => return Err(IntegrationError::NotConfigured("HubSpot")),
        };
        if lead.email.is_empty() {
            return Err(IntegrationError::InvalidRequest(
                "lead has no email address".into(),
            ));
        }

        let (contact_id, created) = self.create_or_update_contact(api_key, lead).await?;
        info!(contact_id = %contact_id, created, "HubSpot contact upserted");

        let deal_id = match self.create_deal(api_key, lead, &contact_id).await {
            Ok(id) => {
                info!(deal_id = %id, "HubSpot deal created");
                Some(id)
            }
            Err(e) => {
                warn!(error = %e, "Failed to create HubSpot deal");
                None
            }
        };

        Ok(CrmOutcome {
            contact_id,
            created,
            deal_id,
        })
    }

    fn is_configured(&self) -> bool {
        self.config.api_key.is_some() && self.config.portal_id.is_some()
    }
}
