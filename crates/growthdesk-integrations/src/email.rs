use crate::error::{api_error, IntegrationError, IntegrationResult};
use crate::http;
use async_trait::async_trait;
use growthdesk_core::Settings;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl EmailAddress {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
        }
    }

    pub fn named(email: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            email: email.into(),
            name: (!name.trim().is_empty()).then_some(name),
        }
    }
}

/// A rendered transactional email, independent of the delivery provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: EmailAddress,
    pub subject: String,
    pub html: String,
    pub text: Option<String>,
    pub reply_to: Option<EmailAddress>,
    pub categories: Vec<String>,
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> IntegrationResult<()>;

    /// Whether credentials are present. Unconfigured senders fail every send.
    fn is_configured(&self) -> bool;
}

#[derive(Debug, Clone)]
pub struct SendGridConfig {
    pub api_key: Option<SecretString>,
    pub api_base: String,
    pub from: EmailAddress,
    pub timeout_secs: u64,
}

impl SendGridConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            api_key: settings.secrets.sendgrid_api_key.clone(),
            api_base: settings.email.api_base.clone(),
            from: EmailAddress::named(&settings.email.from_email, &settings.email.from_name),
            timeout_secs: settings.email.timeout_secs,
        }
    }
}

/// SendGrid v3 `mail/send` client
pub struct SendGridClient {
    config: SendGridConfig,
    client: Client,
}

impl SendGridClient {
    pub fn new(config: SendGridConfig) -> IntegrationResult<Self> {
        let client = http::build_client(config.timeout_secs)?;
        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!("{}/v3/mail/send", self.config.api_base.trim_end_matches('/'))
    }

    pub(crate) fn request_body(&self, message: &EmailMessage) -> Value {
        let mut content = Vec::with_capacity(2);
        if let Some(text) = &message.text {
            content.push(json!({"type": "text/plain", "value": text}));
        }
        content.push(json!({"type": "text/html", "value": message.html}));

        let mut body = json!({
            "personalizations": [{
                "to": [message.to],
                "subject": message.subject,
            }],
            "from": self.config.from,
            "content": content,
        });
        if let Some(reply_to) = &message.reply_to {
            body["reply_to"] = json!(reply_to);
        }
        if !message.categories.is_empty() {
            body["categories"] = json!(message.categories);
        }
        body
    }
}

#[async_trait]
impl EmailSender for SendGridClient {
    async fn send(&self, message: &EmailMessage) -> IntegrationResult<()> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or(IntegrationError::NotConfigured("SendGrid"))?;
        if message.to.email.trim().is_empty() {
            return Err(IntegrationError::InvalidRequest(
                "recipient email is empty".into(),
            ));
        }

        debug!(subject = %message.subject, "Sending email via SendGrid");
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key.expose_secret())
            .json(&self.request_body(message))
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 200 || status.as_u16() == 202 {
            info!(to = %message.to.email, "Email accepted by SendGrid");
            Ok(())
        } else {
            Err(api_error("SendGrid", response).await)
        }
    }

    fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_key: Option<&str>) -> SendGridClient {
        SendGridClient::new(SendGridConfig {
            api_key: api_key.map(|k| SecretString::from(k.to_string())),
            api_base: "https://api.sendgrid.com/".into(),
            from: EmailAddress::named("hello@shop.example", "Shop Team"),
            timeout_secs: 5,
        })
        .unwrap()
    }

    fn message() -> EmailMessage {
        EmailMessage {
            to: EmailAddress::named("ada@shop.example", "Ada"),
            subject: "Hi".into(),
            html: "<p>Hi</p>".into(),
            text: Some("Hi".into()),
            reply_to: None,
            categories: vec!["roi-report".into()],
        }
    }

    #[test]
    fn body_puts_plain_text_before_html() {
        let body = client(Some("SG.key")).request_body(&message());
        assert_eq!(body["content"][0]["type"], "text/plain");
        assert_eq!(body["content"][1]["type"], "text/html");
        assert_eq!(body["personalizations"][0]["to"][0]["email"], "ada@shop.example");
        assert_eq!(body["from"]["name"], "Shop Team");
        assert_eq!(body["categories"][0], "roi-report");
        assert!(body.get("reply_to").is_none());
    }

    #[test]
    fn html_only_message_has_single_part() {
        let mut msg = message();
        msg.text = None;
        msg.reply_to = Some(EmailAddress::new("lead@shop.example"));
        let body = client(Some("SG.key")).request_body(&msg);
        assert_eq!(body["content"].as_array().unwrap().len(), 1);
        assert_eq!(body["reply_to"]["email"], "lead@shop.example");
        assert!(body["reply_to"].get("name").is_none());
    }

    #[test]
    fn endpoint_trims_trailing_slash() {
        assert_eq!(
            client(None).endpoint(),
            "https://api.sendgrid.com/v3/mail/send"
        );
    }

    #[test]
    fn blank_names_are_dropped() {
        assert_eq!(EmailAddress::named("a@b.c", "  ").name, None);
    }

    #[tokio::test]
    async fn unconfigured_client_fails_without_network() {
        let sender = client(None);
        assert!(!sender.is_configured());
        let err = sender.send(&message()).await.unwrap_err();
        assert!(matches!(err, IntegrationError::NotConfigured("SendGrid")));
    }
}
