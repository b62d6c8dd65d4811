//! # WhatsApp Webhook Schemas
//!
//! Data structures for the JSON payload WhatsApp posts to the webhook when a
//! user writes to the business number or when the status of a sent message
//! changes. Only the keys the bot reads are required, everything else is
//! optional so new fields on Meta's side don't break decoding.

use serde::{Deserialize, Serialize};

/// Root webhook payload from WhatsApp
#[derive(Debug, Deserialize, Serialize)]
pub struct WebhookPayload {
    /// The object type, typically "whatsapp_business_account"
    pub object: String,
    /// Array of entry objects containing the actual data
    pub entry: Vec<Entry>,
}

/// Entry object containing changes
#[derive(Debug, Deserialize, Serialize)]
pub struct Entry {
    /// Business Account ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Array of changes that occurred
    pub changes: Vec<Change>,
}

/// Change object containing the actual webhook data
#[derive(Debug, Deserialize, Serialize)]
pub struct Change {
    /// The field that changed (e.g., "messages")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// The value containing the actual data
    pub value: Value,
}

/// Value object containing messages, statuses and the senders profile
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Value {
    /// Messaging product (e.g., "whatsapp")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messaging_product: Option<String>,
    /// Metadata about the business phone number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    /// Array of contacts (senders)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contacts: Option<Vec<Contact>>,
    /// Array of messages received
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<Message>>,
    /// Array of statuses (for sent messages)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statuses: Option<Vec<Status>>,
}

impl Value {
    /// Finds the contact that sent `wa_id`, falling back to the first contact
    pub fn contact_for(&self, wa_id: &str) -> Option<&Contact> {
        let contacts = self.contacts.as_ref()?;

        contacts
            .iter()
            .find(|contact| contact.wa_id == wa_id)
            .or_else(|| contacts.first())
    }
}

/// Metadata about the WhatsApp Business phone number
#[derive(Debug, Deserialize, Serialize)]
pub struct Metadata {
    pub display_phone_number: Option<String>,
    pub phone_number_id: Option<String>,
}

/// Contact information for the message sender
#[derive(Debug, Deserialize, Serialize)]
pub struct Contact {
    /// Profile information
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
    /// WhatsApp ID (phone number)
    pub wa_id: String,
}

impl Contact {
    /// Display name of the contact when it has a non blank one
    pub fn display_name(&self) -> Option<&str> {
        self.profile
            .as_ref()
            .and_then(|profile| profile.name.as_deref())
            .filter(|name| !name.trim().is_empty())
    }
}

/// Profile information
#[derive(Debug, Deserialize, Serialize)]
pub struct Profile {
    /// Display name of the contact
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Message object
#[derive(Debug, Deserialize, Serialize)]
pub struct Message {
    /// Sender's WhatsApp ID (phone number)
    pub from: String,
    /// Message ID, unique per delivery
    pub id: String,
    /// Timestamp of the message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Message type (text, interactive, image, ...)
    #[serde(rename = "type")]
    pub msg_type: String,
    /// Text message content (if type is "text")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextMessage>,
    /// Interactive reply content (if type is "interactive")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interactive: Option<InteractiveMessage>,
    /// Context (if this is a reply to another message)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Context>,
}

impl Message {
    /// Text body of the message, empty for non text messages
    pub fn text_body(&self) -> &str {
        self.text.as_ref().map(|text| text.body.as_str()).unwrap_or("")
    }

    /// Key the message type requires but the message lacks, e.g. a
    /// `list_reply` interactive message without its `list_reply` object
    pub fn missing_key(&self) -> Option<&'static str> {
        if self.msg_type != "interactive" {
            return None;
        }

        let Some(interactive) = &self.interactive else {
            return Some("interactive");
        };

        (interactive.interactive_type == "list_reply" && interactive.list_reply.is_none())
            .then_some("list_reply")
    }

    /// Row id selected by the user when the message answers a list message
    pub fn list_reply_id(&self) -> Option<&str> {
        if self.msg_type != "interactive" {
            return None;
        }

        let interactive = self.interactive.as_ref()?;
        if interactive.interactive_type != "list_reply" {
            return None;
        }

        interactive.list_reply.as_ref().map(|reply| reply.id.as_str())
    }
}

/// Text message content
#[derive(Debug, Deserialize, Serialize)]
pub struct TextMessage {
    /// The text body of the message
    pub body: String,
}

/// Interactive reply sent back by the user
#[derive(Debug, Deserialize, Serialize)]
pub struct InteractiveMessage {
    /// "list_reply" or "button_reply"
    #[serde(rename = "type")]
    pub interactive_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_reply: Option<Reply>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_reply: Option<Reply>,
}

/// Row or button picked by the user
#[derive(Debug, Deserialize, Serialize)]
pub struct Reply {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Context for reply messages
#[derive(Debug, Deserialize, Serialize)]
pub struct Context {
    /// Sender of the message being replied to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Message ID being referenced
    pub id: String,
}

/// Status update for sent messages
#[derive(Debug, Deserialize, Serialize)]
pub struct Status {
    /// Message ID
    pub id: String,
    /// Status (sent, delivered, read, failed)
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<String>,
}
