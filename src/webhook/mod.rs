//! Webhook handlers for external integrations
//!
//! ## Modules
//!
//! - [`whatsapp`] - WhatsApp Business API webhook handlers
//! - [`routes`] - Route configuration for the webhook endpoints

pub mod routes;
pub mod whatsapp;

use crate::config::AppConfig;
use std::sync::Arc;
use whatsapp::{client::ImplMessageSender, dedup::DedupTracker};

/// State shared by every server worker
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub whatsapp_client: ImplMessageSender,
    pub dedup: Arc<DedupTracker>,
}

impl AppState {
    pub fn new(config: AppConfig, whatsapp_client: ImplMessageSender) -> Self {
        let dedup = DedupTracker::new(config.dedup_retention(), config.dedup_capacity);

        Self {
            config: Arc::new(config),
            whatsapp_client,
            dedup: Arc::new(dedup),
        }
    }
}
