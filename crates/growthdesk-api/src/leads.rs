use crate::{emails, AppState};
use growthdesk_core::{lead_score, project, LeadSubmission, RoiProjection};
use growthdesk_integrations::CrmLead;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Which follow-up side effects went through for a lead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReport {
    pub email_sent: bool,
    pub lead_notification_sent: bool,
    pub crm_submitted: bool,
    pub email_configured: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadReport {
    pub projection: RoiProjection,
    pub lead_score: u8,
    pub delivery: DeliveryReport,
}

/// Project, score and fan a calculator submission out to email and CRM.
///
/// Side effects run one after another; a failed step is logged and recorded
/// in the [`DeliveryReport`] but never stops the steps after it.
pub async fn process_lead(state: &AppState, submission: &LeadSubmission) -> LeadReport {
    let projection = project(&submission.metrics);
    let score = lead_score(submission, &projection);
    let email = submission.contact.email.trim();

    info!(
        email = %email,
        category = %submission.metrics.business_category,
        monthly_increase = projection.monthly_increase,
        lead_score = score,
        "Processing ROI calculator lead"
    );
    if !projection.has_opportunity() {
        warn!(
            monthly_increase = projection.monthly_increase,
            "Projection shows no revenue increase; reporting as-is"
        );
    }

    let mut delivery = DeliveryReport {
        email_configured: state.email.is_configured(),
        ..Default::default()
    };

    if email.is_empty() {
        debug!("Lead has no email address; skipping ROI report");
    } else {
        let report = emails::roi_report(submission, &projection, &state.settings.email.booking_url);
        match state.email.send(&report).await {
            Ok(()) => delivery.email_sent = true,
            Err(e) => warn!(error = %e, "Failed to send ROI report email"),
        }
    }

    let notification = emails::lead_notification(
        submission,
        &projection,
        score,
        &state.settings.email.notify_email,
    );
    match state.email.send(&notification).await {
        Ok(()) => delivery.lead_notification_sent = true,
        Err(e) => warn!(error = %e, "Failed to send lead notification email"),
    }

    if state.crm.is_configured() {
        let lead = CrmLead::from_submission(submission, &projection, score);
        match state.crm.upsert_lead(&lead).await {
            Ok(outcome) => {
                delivery.crm_submitted = true;
                info!(
                    contact_id = %outcome.contact_id,
                    created = outcome.created,
                    deal_created = outcome.deal_id.is_some(),
                    "Lead submitted to CRM"
                );
            }
            Err(e) => warn!(error = %e, "Failed to submit lead to CRM"),
        }
    } else {
        debug!("CRM not configured; skipping lead submission");
    }

    LeadReport {
        projection,
        lead_score: score,
        delivery,
    }
}
