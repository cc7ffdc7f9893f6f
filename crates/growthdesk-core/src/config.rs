use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config as cfg;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::info;

pub const ENV_PREFIX: &str = "GROWTHDESK";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

/// Transactional email delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub api_base: String,
    pub from_email: String,
    pub from_name: String,
    /// Sales inbox that receives lead and payment notifications
    pub notify_email: String,
    /// Call-to-action link in the ROI report
    pub booking_url: String,
    pub timeout_secs: u64,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.sendgrid.com".into(),
            from_email: "hello@growthdesk.example".into(),
            from_name: "GrowthDesk Team".into(),
            notify_email: "hello@growthdesk.example".into(),
            booking_url: "https://growthdesk.example/contact".into(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrmConfig {
    pub api_base: String,
    pub timeout_secs: u64,
}

impl Default for CrmConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.hubapi.com".into(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentsConfig {
    pub api_base: String,
    pub currency: String,
    /// Free days before the first recurring charge
    pub trial_days: u32,
    /// Public origin the embedded checkout returns to
    pub return_url_base: String,
    /// Maximum age of a webhook signature timestamp
    pub webhook_tolerance_secs: i64,
    pub timeout_secs: u64,
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.stripe.com".into(),
            currency: "usd".into(),
            trial_days: 7,
            return_url_base: "http://localhost:3000".into(),
            webhook_tolerance_secs: 300,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SecretsConfig {
    // Do not serialize secrets; allow deserialization from config/env only.
    #[serde(default, skip_serializing)]
    pub sendgrid_api_key: Option<SecretString>,
    #[serde(default, skip_serializing)]
    pub hubspot_api_key: Option<SecretString>,
    #[serde(default)]
    pub hubspot_portal_id: Option<String>,
    #[serde(default, skip_serializing)]
    pub stripe_secret_key: Option<SecretString>,
    #[serde(default, skip_serializing)]
    pub stripe_webhook_secret: Option<SecretString>,
}

impl SecretsConfig {
    /// Fill unset secrets from the unprefixed variable names older
    /// deployments export (`SENDGRID_API_KEY`, `STRIPE_SECRET_KEY`, ...).
    pub fn apply_legacy_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .map(SecretString::from)
        };

        if self.sendgrid_api_key.is_none() {
            self.sendgrid_api_key = secret("SENDGRID_API_KEY");
        }
        if self.hubspot_api_key.is_none() {
            self.hubspot_api_key = secret("HUBSPOT_API_KEY");
        }
        if self.hubspot_portal_id.is_none() {
            self.hubspot_portal_id = lookup("HUBSPOT_PORTAL_ID").filter(|v| !v.trim().is_empty());
        }
        if self.stripe_secret_key.is_none() {
            self.stripe_secret_key = secret("STRIPE_SECRET_KEY");
        }
        if self.stripe_webhook_secret.is_none() {
            self.stripe_webhook_secret = secret("STRIPE_WEBHOOK_SECRET");
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "Settings::default_env")]
    pub env: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub crm: CrmConfig,
    #[serde(default)]
    pub payments: PaymentsConfig,
    #[serde(default)]
    pub secrets: SecretsConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            env: Self::default_env(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            email: EmailConfig::default(),
            crm: CrmConfig::default(),
            payments: PaymentsConfig::default(),
            secrets: SecretsConfig::default(),
        }
    }
}

impl Settings {
    pub fn default_env() -> String {
        env::var("APP_ENV")
            .ok()
            .or_else(|| env::var("RUST_ENV").ok())
            .unwrap_or_else(|| "development".to_string())
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            !self.server.host.trim().is_empty(),
            "server.host cannot be empty"
        );
        anyhow::ensure!(self.server.port > 0, "server.port must be > 0");
        anyhow::ensure!(
            self.email.from_email.contains('@'),
            "email.from_email must be an email address"
        );
        anyhow::ensure!(
            self.email.notify_email.contains('@'),
            "email.notify_email must be an email address"
        );
        for (key, base) in [
            ("email.api_base", &self.email.api_base),
            ("crm.api_base", &self.crm.api_base),
            ("payments.api_base", &self.payments.api_base),
            ("payments.return_url_base", &self.payments.return_url_base),
        ] {
            anyhow::ensure!(
                base.starts_with("http://") || base.starts_with("https://"),
                "{key} must be an http(s) URL"
            );
        }
        anyhow::ensure!(
            self.payments.currency.len() == 3
                && self.payments.currency.chars().all(|c| c.is_ascii_alphabetic()),
            "payments.currency must be a 3-letter ISO code"
        );
        anyhow::ensure!(
            self.payments.trial_days <= 730,
            "payments.trial_days must be 0..=730"
        );
        anyhow::ensure!(
            self.payments.webhook_tolerance_secs > 0,
            "payments.webhook_tolerance_secs must be > 0"
        );

        Ok(())
    }

    pub fn sendgrid_api_key(&self) -> Option<&str> {
        self.secrets
            .sendgrid_api_key
            .as_ref()
            .map(|s| s.expose_secret())
    }

    pub fn stripe_webhook_secret(&self) -> Option<&str> {
        self.secrets
            .stripe_webhook_secret
            .as_ref()
            .map(|s| s.expose_secret())
    }
}

#[derive(Debug)]
pub struct ConfigManager;

impl ConfigManager {
    /// Resolve, load, back-fill legacy secrets and validate in one step.
    pub fn load(config_dir: Option<PathBuf>, env_override: Option<String>) -> Result<Settings> {
        let env_name = env_override.unwrap_or_else(Settings::default_env);
        let config_dir = Self::get_config_dir(config_dir);
        let mut settings = Self::load_from_sources(&config_dir, &env_name)?;
        settings.env = env_name;
        settings
            .secrets
            .apply_legacy_env(|name| env::var(name).ok());
        settings.validate()?;
        Ok(settings)
    }

    /// Get the default configuration directory.
    ///
    /// Priority order:
    /// 1. ~/.growthdesk/ (user-level config)
    /// 2. ./config/ (project-level config)
    /// 3. Current directory (fallback)
    pub fn default_config_dir() -> PathBuf {
        if let Some(home_dir) = dirs::home_dir() {
            let user_dir = home_dir.join(".growthdesk");
            if user_dir.exists() {
                info!("Using config directory: {:?}", user_dir);
                return user_dir;
            }
        }

        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let project_config = cwd.join("config");
        if project_config.exists() {
            info!("Using config directory: {:?}", project_config);
            return project_config;
        }

        info!("Using config directory: {:?}", cwd);
        cwd
    }

    pub fn get_config_dir(custom_path: Option<PathBuf>) -> PathBuf {
        custom_path.unwrap_or_else(Self::default_config_dir)
    }

    pub fn load_from_sources(config_dir: &Path, env_name: &str) -> Result<Settings> {
        let settings: Settings = cfg::Config::builder()
            .add_source(cfg::File::from(config_dir.join("default.toml")).required(false))
            .add_source(cfg::File::from(config_dir.join("default.yaml")).required(false))
            .add_source(cfg::File::from(config_dir.join("default.json")).required(false))
            .add_source(
                cfg::File::from(config_dir.join(format!("{}.toml", env_name))).required(false),
            )
            .add_source(
                cfg::File::from(config_dir.join(format!("{}.yaml", env_name))).required(false),
            )
            .add_source(
                cfg::File::from(config_dir.join(format!("{}.json", env_name))).required(false),
            )
            .add_source(cfg::File::from(config_dir.join("local.toml")).required(false))
            .add_source(cfg::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .context("building configuration")?
            .try_deserialize()
            .context("deserializing configuration")?;
        Ok(settings)
    }
}
