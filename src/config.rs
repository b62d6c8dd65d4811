//! Application configuration management with security considerations.
//!
//! Every value is read once from the environment at startup (a `.env` file in
//! the working directory is loaded first when present) and then shared
//! read-only with every server worker.
//!
//! # Security Notes
//! - Sensitive fields are clearly marked and should never be logged
//! - Production environments should use secure secret management systems

use anyhow::Context;
use envconfig::Envconfig;
use std::time::Duration;

/// Application configuration with security-aware field management.
///
/// The variable names match the ones shown in the Meta developer dashboard
/// quick start, so an existing `.env` can be reused as is.
#[derive(Envconfig, Clone)]
pub struct AppConfig {
    /// 🔒 SENSITIVE: WhatsApp Business (system user) access token
    /// Security: Store in secure secret management system
    #[envconfig(from = "ACCESS_TOKEN")]
    pub access_token: String,

    /// WhatsApp Business phone number ID (SEMI-SENSITIVE)
    /// Used to build the send endpoint, don't log in production
    #[envconfig(from = "PHONE_NUMBER_ID")]
    pub phone_number_id: String,

    /// Graph API version used in the send endpoint (NON-SENSITIVE)
    #[envconfig(from = "VERSION", default = "v22.0")]
    pub api_version: String,

    /// 🔒 SENSITIVE: Token echoed back by Meta during the webhook subscription
    #[envconfig(from = "VERIFY_TOKEN")]
    pub verify_token: String,

    /// 🔒 SENSITIVE: App secret used by Meta to sign webhook deliveries
    /// When absent every webhook delivery is rejected
    #[envconfig(from = "APP_SECRET")]
    pub app_secret: Option<String>,

    /// Meta application ID (NON-SENSITIVE)
    #[envconfig(from = "APP_ID")]
    pub app_id: Option<String>,

    /// Default recipient for the `send-menu` command (SEMI-SENSITIVE)
    #[envconfig(from = "RECIPIENT_WAID")]
    pub recipient_waid: Option<String>,

    /// Business display phone number (NON-SENSITIVE)
    #[envconfig(from = "YOUR_PHONE_NUMBER")]
    pub your_phone_number: Option<String>,

    /// Graph API base url (NON-SENSITIVE)
    #[envconfig(from = "GRAPH_API_BASE", default = "https://graph.facebook.com")]
    pub graph_api_base: String,

    /// Host address for web server binding (NON-SENSITIVE)
    #[envconfig(from = "WEB_SERVER_HOST", default = "0.0.0.0")]
    pub web_server_host: String,

    /// Port for web server binding (NON-SENSITIVE)
    #[envconfig(from = "WEB_SERVER_PORT", default = "8000")]
    pub web_server_port: u16,

    /// Seconds a processed message id is remembered
    #[envconfig(from = "DEDUP_RETENTION_SECS", default = "86400")]
    pub dedup_retention_secs: u64,

    /// Max amount of message ids remembered at once
    #[envconfig(from = "DEDUP_CAPACITY", default = "10000")]
    pub dedup_capacity: usize,

    /// First name used in the menu greeting when the sender has no profile name
    #[envconfig(from = "PROFILE_NAME_FALLBACK", default = "there")]
    pub profile_name_fallback: String,

    /// 🔒 SENSITIVE: Logfire write token, logs stay local without it
    #[envconfig(from = "LOGFIRE_TOKEN")]
    pub logfire_token: Option<String>,
}

impl AppConfig {
    /// Constructs the WhatsApp Business API endpoint for sending messages
    pub fn send_msg_endpoint(&self) -> String {
        format!(
            "{base}/{version}/{id}/messages",
            base = self.graph_api_base.trim_end_matches('/'),
            version = self.api_version,
            id = self.phone_number_id
        )
    }

    /// Address the web server binds to
    pub fn server_addr(&self) -> (String, u16) {
        (self.web_server_host.clone(), self.web_server_port)
    }

    pub fn dedup_retention(&self) -> Duration {
        Duration::from_secs(self.dedup_retention_secs)
    }
}

/// Loads the configuration, reading a `.env` file first when one exists.
pub fn load() -> anyhow::Result<AppConfig> {
    // a missing .env is fine, the variables may come from the environment
    dotenvy::dotenv().ok();

    AppConfig::init_from_env()
        .context("failed to load configuration, check the required environment variables")
}
