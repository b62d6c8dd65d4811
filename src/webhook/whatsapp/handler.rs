//! # WhatsApp Webhook Handler
//!
//! This module handles incoming webhook events from WhatsApp Business API:
//! it validates the shape of a delivery, skips messages already handled and
//! answers every new message following the clinic menu.

use super::{
    client::{ImplMessageSender, SendError},
    dedup::DedupTracker,
    menu,
    schemas::{Contact, Message, WebhookPayload},
};
use crate::{errors::WebhookError, metric};

/// Message answered during a webhook delivery
#[derive(Debug, PartialEq)]
pub struct ProcessedMessage {
    pub from: String,
    pub body: String,
}

/// Result of processing a webhook delivery
#[derive(Debug, Default, PartialEq)]
pub struct WebhookOutcome {
    /// New messages answered, in delivery order
    pub processed: Vec<ProcessedMessage>,
    /// Status updates received (sent, delivered, read, ...)
    pub statuses: usize,
}

/// Checks if the incoming webhook event has a valid WhatsApp message structure.
///
/// The body must have `object` and `entry` keys and the first change of the
/// first entry must carry `messages` or `statuses`.
pub fn is_valid_message_event(body: &serde_json::Value) -> bool {
    if body.get("object").is_none() || body.get("entry").is_none() {
        return false;
    }

    body.get("entry")
        .and_then(|entry| entry.get(0))
        .and_then(|entry| entry.get("changes"))
        .and_then(|changes| changes.get(0))
        .and_then(|change| change.get("value"))
        .is_some_and(|value| value.get("messages").is_some() || value.get("statuses").is_some())
}

/// Parses and validates a raw webhook body.
///
/// # Errors
///
/// * [`WebhookError::InvalidPayload`] for an empty body or invalid JSON
/// * [`WebhookError::MalformedEvent`] when the JSON is not a WhatsApp event
///   or misses a required key (the key is named in the message)
pub fn parse_webhook(body: &[u8]) -> Result<WebhookPayload, WebhookError> {
    if body.is_empty() {
        return Err(WebhookError::InvalidPayload("No data provided".into()));
    }

    let json: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| WebhookError::InvalidPayload(format!("Invalid JSON provided: {e}")))?;

    if !is_valid_message_event(&json) {
        return Err(WebhookError::MalformedEvent("Not a WhatsApp API event".into()));
    }

    let payload: WebhookPayload =
        serde_json::from_value(json).map_err(|e| WebhookError::MalformedEvent(e.to_string()))?;

    let missing_key = payload
        .entry
        .iter()
        .flat_map(|entry| &entry.changes)
        .flat_map(|change| change.value.messages.iter().flatten())
        .find_map(Message::missing_key);

    match missing_key {
        Some(key) => Err(WebhookError::MalformedEvent(key.to_string())),
        None => Ok(payload),
    }
}

/// Answers a single message, returns how many messages were sent back
///
/// # Arguments
///
/// * `message` - The message to handle
/// * `contact` - Profile of the sender, when the delivery includes it
/// * `client` - WhatsApp API client for sending messages
/// * `name_fallback` - First name used when the sender has no profile name
pub async fn handle_user_message(
    message: &Message,
    contact: Option<&Contact>,
    client: &ImplMessageSender,
    name_fallback: &str,
) -> Result<usize, SendError> {
    let to = contact
        .map(|contact| contact.wa_id.as_str())
        .unwrap_or(message.from.as_str());
    let first_name = menu::first_name(contact.and_then(Contact::display_name), name_fallback);

    let replies = menu::plan_replies(message, to, first_name);
    for reply in &replies {
        client.send(reply).await?;
    }

    Ok(replies.len())
}

/// Main webhook processor
///
/// Every message of every change is answered once: ids already seen are
/// skipped. Messages without any reply are not reported as processed. When answering a message fails its id is released, so the
/// redelivery Meta makes after the error response is answered again.
///
/// # Returns
///
/// The messages answered and the amount of status updates received
pub async fn process_webhook(
    payload: &WebhookPayload,
    client: &ImplMessageSender,
    dedup: &DedupTracker,
    name_fallback: &str,
) -> Result<WebhookOutcome, WebhookError> {
    let mut outcome = WebhookOutcome::default();

    for value in payload.entry.iter().flat_map(|entry| &entry.changes).map(|c| &c.value) {
        if let Some(statuses) = &value.statuses {
            outcome.statuses += statuses.len();
        }

        for message in value.messages.iter().flatten() {
            if !dedup.mark_seen(&message.id).await {
                logfire::info!(
                    "Message {id} has already been processed. Skipping.",
                    id = message.id.clone()
                );
                metric::incr_webhook_event_statds("duplicate");
                continue;
            }

            logfire::info!(
                "Handling {msg_type} message {id}",
                msg_type = message.msg_type.clone(),
                id = message.id.clone()
            );

            let contact = value.contact_for(&message.from);
            let sent = match handle_user_message(message, contact, client, name_fallback).await {
                Ok(sent) => sent,
                Err(e) => {
                    dedup.forget(&message.id).await;
                    metric::incr_webhook_event_statds("send_failed");
                    return Err(e.into());
                }
            };

            // nothing to answer, e.g. an unknown menu option
            if sent == 0 {
                continue;
            }

            metric::incr_webhook_event_statds("processed");
            outcome.processed.push(ProcessedMessage {
                from: message.from.clone(),
                body: message.text_body().to_string(),
            });
        }
    }

    if outcome.statuses > 0 {
        logfire::info!(
            "Received {count} status updates",
            count = outcome.statuses.to_string()
        );
        metric::incr_webhook_event_statds("status_update");
    }

    Ok(outcome)
}
