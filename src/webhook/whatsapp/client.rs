//! # WhatsApp API Client
//!
//! This module provides a client for sending messages to WhatsApp Business API.
//! Every send is a single POST with a fixed timeout, failures are reported
//! back to the caller and never retried.

use super::schemas::{OutgoingMessage, WhatsAppMessageResponse};
use crate::{config::AppConfig, consts};
use anyhow::Context;
use async_trait::async_trait;
use derive_more::{Display, Error};
use std::{sync::Arc, time::Duration};

/// Why an outbound send failed
#[derive(Debug, Display, Error)]
pub enum SendError {
    /// No response within the send timeout
    #[display("request to WhatsApp API timed out")]
    Timeout,
    /// Transport error, non 2xx status or undecodable response
    #[display("{_0}")]
    Failed(#[error(not(source))] String),
}

impl From<reqwest::Error> for SendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return SendError::Timeout;
        }
        SendError::Failed(format!("request to WhatsApp API failed: {err}"))
    }
}

/// Sends messages on behalf of the business phone number
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, message: &OutgoingMessage) -> Result<WhatsAppMessageResponse, SendError>;
}

pub type ImplMessageSender = Arc<dyn MessageSender>;

/// WhatsApp API client for sending messages
pub struct WhatsAppClient {
    /// HTTP client for making API requests
    client: reqwest::Client,
    /// WhatsApp Business API endpoint for sending messages
    endpoint: String,
    /// Authentication token
    auth_token: String,
}

impl WhatsAppClient {
    /// Creates a new WhatsApp client from the app configuration
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        Self::build(
            config.send_msg_endpoint(),
            config.access_token.clone(),
            consts::SEND_TIMEOUT,
        )
    }

    fn build(endpoint: String, auth_token: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")?;

        Ok(Self {
            client,
            endpoint,
            auth_token,
        })
    }
}

#[async_trait]
impl MessageSender for WhatsAppClient {
    #[tracing::instrument(name = "whatsapp_send", skip_all, fields(msg_type = message.msg_type()))]
    async fn send(&self, message: &OutgoingMessage) -> Result<WhatsAppMessageResponse, SendError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.auth_token)
            .json(message)
            .send()
            .await
            .inspect_err(|e| {
                logfire::error!(
                    "Request to WhatsApp API failed: {error}",
                    error = e.to_string()
                )
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());

            logfire::error!(
                "WhatsApp API returned error status {status}: {body}",
                status = status.to_string(),
                body = body.clone()
            );

            return Err(SendError::Failed(format!(
                "WhatsApp API returned error status {status}: {body}"
            )));
        }

        Ok(response.json::<WhatsAppMessageResponse>().await?)
    }
}
