//! # WhatsApp Outgoing Message Schemas
//!
//! This module contains data structures for sending messages to WhatsApp Business API.
//! These schemas define the JSON payload structure for various message types.

use crate::consts::{MESSAGING_PRODUCT, RECIPIENT_TYPE_INDIVIDUAL};
use serde::{Deserialize, Serialize};

/// Any message the bot can send
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum OutgoingMessage {
    Text(OutgoingTextMessage),
    Interactive(OutgoingInteractiveMessage),
    Contacts(OutgoingContactsMessage),
    Location(OutgoingLocationMessage),
}

impl OutgoingMessage {
    /// Recipient's WhatsApp ID
    pub fn to(&self) -> &str {
        match self {
            OutgoingMessage::Text(message) => &message.to,
            OutgoingMessage::Interactive(message) => &message.to,
            OutgoingMessage::Contacts(message) => &message.to,
            OutgoingMessage::Location(message) => &message.to,
        }
    }

    /// Message type as named by the API
    pub fn msg_type(&self) -> &str {
        match self {
            OutgoingMessage::Text(message) => &message.msg_type,
            OutgoingMessage::Interactive(message) => &message.msg_type,
            OutgoingMessage::Contacts(message) => &message.msg_type,
            OutgoingMessage::Location(message) => &message.msg_type,
        }
    }
}

/// Text message to send to WhatsApp
#[derive(Debug, Serialize, Deserialize)]
pub struct OutgoingTextMessage {
    /// Messaging product, always "whatsapp"
    pub messaging_product: String,
    pub recipient_type: String,
    /// Recipient's WhatsApp ID (phone number)
    pub to: String,
    /// Message being quoted by this one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<MessageContext>,
    /// Message type
    #[serde(rename = "type")]
    pub msg_type: String,
    /// Text content
    pub text: OutgoingTextContent,
}

impl OutgoingTextMessage {
    /// Creates a new text message
    pub fn new(to: String, body: String) -> Self {
        Self {
            messaging_product: MESSAGING_PRODUCT.to_string(),
            recipient_type: RECIPIENT_TYPE_INDIVIDUAL.to_string(),
            to,
            context: None,
            msg_type: "text".to_string(),
            text: OutgoingTextContent {
                preview_url: false,
                body,
            },
        }
    }

    /// Quotes the message with id `message_id`
    pub fn reply_to(mut self, message_id: String) -> Self {
        self.context = Some(MessageContext { message_id });
        self
    }

    /// Renders a preview of the first url in the body
    pub fn with_preview_url(mut self) -> Self {
        self.text.preview_url = true;
        self
    }
}

/// Text content for outgoing messages
#[derive(Debug, Serialize, Deserialize)]
pub struct OutgoingTextContent {
    pub preview_url: bool,
    /// Message body text
    pub body: String,
}

/// Reference to a previous message
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageContext {
    pub message_id: String,
}

/// Interactive list message to send to WhatsApp
#[derive(Debug, Serialize, Deserialize)]
pub struct OutgoingInteractiveMessage {
    /// Messaging product, always "whatsapp"
    pub messaging_product: String,
    pub recipient_type: String,
    /// Recipient's WhatsApp ID (phone number)
    pub to: String,
    /// Message type, "interactive"
    #[serde(rename = "type")]
    pub msg_type: String,
    /// Interactive content
    pub interactive: InteractiveContent,
}

impl OutgoingInteractiveMessage {
    /// Creates a new interactive list message with a single section
    pub fn new_list(
        to: String,
        header: String,
        body: String,
        footer: Option<String>,
        button_text: String,
        section: InteractiveSection,
    ) -> Self {
        Self {
            messaging_product: MESSAGING_PRODUCT.to_string(),
            recipient_type: RECIPIENT_TYPE_INDIVIDUAL.to_string(),
            to,
            msg_type: "interactive".to_string(),
            interactive: InteractiveContent {
                interactive_type: "list".to_string(),
                header: Some(InteractiveHeader {
                    header_type: "text".to_string(),
                    text: header,
                }),
                body: InteractiveBody { text: body },
                footer: footer.map(|text| InteractiveFooter { text }),
                action: InteractiveAction {
                    button: button_text,
                    sections: vec![section],
                },
            },
        }
    }
}

/// Interactive content structure
#[derive(Debug, Serialize, Deserialize)]
pub struct InteractiveContent {
    /// Type of interactive message (e.g., "list")
    #[serde(rename = "type")]
    pub interactive_type: String,
    /// Optional header
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<InteractiveHeader>,
    /// Body text
    pub body: InteractiveBody,
    /// Optional footer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<InteractiveFooter>,
    /// Action (button and sections)
    pub action: InteractiveAction,
}

/// Interactive message header
#[derive(Debug, Serialize, Deserialize)]
pub struct InteractiveHeader {
    /// Header type (e.g., "text")
    #[serde(rename = "type")]
    pub header_type: String,
    /// Header text
    pub text: String,
}

/// Interactive message body
#[derive(Debug, Serialize, Deserialize)]
pub struct InteractiveBody {
    /// Body text
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InteractiveFooter {
    pub text: String,
}

/// Interactive action (button and sections)
#[derive(Debug, Serialize, Deserialize)]
pub struct InteractiveAction {
    /// Button text
    pub button: String,
    /// List sections
    pub sections: Vec<InteractiveSection>,
}

/// Interactive section containing rows
#[derive(Debug, Serialize, Deserialize)]
pub struct InteractiveSection {
    /// Optional section title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// List of rows in the section
    pub rows: Vec<InteractiveRow>,
}

/// Interactive row (list item)
#[derive(Debug, Serialize, Deserialize)]
pub struct InteractiveRow {
    /// Unique row ID
    pub id: String,
    /// Row title (displayed to user)
    pub title: String,
    /// Optional row description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl InteractiveRow {
    /// Creates a new interactive row with description
    pub fn new_with_description(id: String, title: String, description: String) -> Self {
        Self {
            id,
            title,
            description: Some(description),
        }
    }
}

/// Contact card message to send to WhatsApp
#[derive(Debug, Serialize, Deserialize)]
pub struct OutgoingContactsMessage {
    pub messaging_product: String,
    pub recipient_type: String,
    pub to: String,
    /// Message type, "contacts"
    #[serde(rename = "type")]
    pub msg_type: String,
    pub contacts: Vec<ContactCard>,
}

impl OutgoingContactsMessage {
    /// Creates a message sharing a single contact card
    pub fn new(to: String, card: ContactCard) -> Self {
        Self {
            messaging_product: MESSAGING_PRODUCT.to_string(),
            recipient_type: RECIPIENT_TYPE_INDIVIDUAL.to_string(),
            to,
            msg_type: "contacts".to_string(),
            contacts: vec![card],
        }
    }
}

/// Structured contact (vCard like)
#[derive(Debug, Serialize, Deserialize)]
pub struct ContactCard {
    pub name: ContactName,
    pub phones: Vec<ContactPhone>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContactName {
    pub formatted_name: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContactPhone {
    pub phone: String,
    /// Phone kind, e.g. "WORK"
    #[serde(rename = "type")]
    pub phone_type: String,
    /// Adds a "message" button in the card when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wa_id: Option<String>,
}

/// Location message to send to WhatsApp
#[derive(Debug, Serialize, Deserialize)]
pub struct OutgoingLocationMessage {
    pub messaging_product: String,
    pub recipient_type: String,
    pub to: String,
    /// Message type, "location"
    #[serde(rename = "type")]
    pub msg_type: String,
    pub location: LocationContent,
}

impl OutgoingLocationMessage {
    pub fn new(to: String, location: LocationContent) -> Self {
        Self {
            messaging_product: MESSAGING_PRODUCT.to_string(),
            recipient_type: RECIPIENT_TYPE_INDIVIDUAL.to_string(),
            to,
            msg_type: "location".to_string(),
            location,
        }
    }
}

/// Pinned location
#[derive(Debug, Serialize, Deserialize)]
pub struct LocationContent {
    /// Latitude, sent as a string as the API accepts it
    pub latitude: String,
    pub longitude: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Response from WhatsApp API when sending a message
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct WhatsAppMessageResponse {
    /// Messaging product
    #[serde(default)]
    pub messaging_product: String,
    /// Array of contacts (recipients)
    #[serde(default)]
    pub contacts: Vec<WhatsAppContact>,
    /// Array of messages sent
    #[serde(default)]
    pub messages: Vec<WhatsAppMessageStatus>,
}

/// Contact information in response
#[derive(Debug, Serialize, Deserialize)]
pub struct WhatsAppContact {
    /// WhatsApp ID of the contact
    pub wa_id: String,
    /// Input phone number
    #[serde(default)]
    pub input: String,
}

/// Message status in response
#[derive(Debug, Serialize, Deserialize)]
pub struct WhatsAppMessageStatus {
    /// Message ID
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_reply_serialization() {
        let message = OutgoingMessage::Text(
            OutgoingTextMessage::new("5215512345678".into(), "hola".into())
                .reply_to("wamid.1".into()),
        );

        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "messaging_product": "whatsapp",
                "recipient_type": "individual",
                "to": "5215512345678",
                "context": {"message_id": "wamid.1"},
                "type": "text",
                "text": {"preview_url": false, "body": "hola"}
            })
        );
    }

    #[test]
    fn test_location_serialization_skips_empty_fields() {
        let message = OutgoingMessage::Location(OutgoingLocationMessage::new(
            "5215512345678".into(),
            LocationContent {
                latitude: "1.5".into(),
                longitude: "-2.5".into(),
                name: Some("Clinic".into()),
                address: None,
            },
        ));

        let value = serde_json::to_value(&message).unwrap();

        assert_eq!(value["type"], "location");
        assert_eq!(value["location"]["latitude"], "1.5");
        assert!(value["location"].get("address").is_none());
        assert!(value.get("context").is_none());
    }

    #[test]
    fn test_lenient_send_response() {
        let response: WhatsAppMessageResponse = serde_json::from_str(
            r#"{"messaging_product":"whatsapp","messages":[{"id":"wamid.out"}]}"#,
        )
        .unwrap();

        assert!(response.contacts.is_empty());
        assert_eq!(response.messages[0].id, "wamid.out");
    }
}
