//! # Clinic menu
//!
//! The bot only knows one conversation: a list message with five services and
//! a scripted answer for each of them. Both the rows of the list and the
//! answers come from [`MENU`], adding a service is adding an entry there.

use super::schemas::{
    ContactCard, ContactName, ContactPhone, InteractiveRow, InteractiveSection, LocationContent,
    Message, OutgoingContactsMessage, OutgoingInteractiveMessage, OutgoingLocationMessage,
    OutgoingMessage, OutgoingTextMessage,
};
use crate::consts;

/// Single message sent back when a menu option is picked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// Plain text quoting the user's selection
    Text(&'static str),
    /// Text with the url preview enabled
    Link(&'static str),
    /// Clinic contact card
    ContactCard,
    /// Clinic pinned location
    Location,
}

/// Row of the main menu and the replies it triggers, in order
#[derive(Debug)]
pub struct MenuEntry {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub replies: &'static [Reply],
}

pub const MENU: [MenuEntry; 5] = [
    MenuEntry {
        id: "option1",
        title: "📅 Book a Consultation",
        description: "Schedule your consult today",
        replies: &[
            Reply::Text(
                "You have selected to book a consultation.\nPlease contact us to schedule your appointment.",
            ),
            Reply::ContactCard,
        ],
    },
    MenuEntry {
        id: "option2",
        title: "💻 Book Online",
        description: "Quick and easy online booking",
        replies: &[Reply::Text(
            "You have selected *online booking*.\nPlease visit our website at https://www.exampleclinic.com/appointments to book your appointment online.",
        )],
    },
    MenuEntry {
        id: "option3",
        title: "📍 Get Directions",
        description: "Find us with ease",
        replies: &[Reply::Text("Here is the location of our clinic:"), Reply::Location],
    },
    MenuEntry {
        id: "option4",
        title: "⭐ Leave a Review",
        description: "Share your experience with us",
        replies: &[
            Reply::Text("Loved our care? Let us know!\nGive us 5 stars to help us grow!"),
            Reply::Link("Please visit https://g.page/r/example-clinic/review"),
        ],
    },
    MenuEntry {
        id: "option5",
        title: "🔄 Request Refill",
        description: "Easily request a prescription refill",
        replies: &[Reply::Text(
            "You have selected to request a prescription refill. Please reply with the medication name and dosage, or contact our pharmacy at 123-456-7890.",
        )],
    },
];

const MENU_BODY: &str = "Save time and manage your healthcare easily through WhatsApp.";
const MENU_FOOTER: &str = "👇 Choose an option to get started:";
const MENU_BUTTON: &str = "Explore Services";
const MENU_SECTION_TITLE: &str = "Our Services";

/// Looks up a menu entry by the row id the user picked
pub fn find_option(id: &str) -> Option<&'static MenuEntry> {
    MENU.iter().find(|entry| entry.id == id)
}

/// First whitespace separated word of the display name, `fallback` when
/// there is no usable name
pub fn first_name<'a>(display_name: Option<&'a str>, fallback: &'a str) -> &'a str {
    display_name
        .and_then(|name| name.split_whitespace().next())
        .unwrap_or(fallback)
}

/// Main list message greeting the user by `first_name`
pub fn main_menu(to: &str, first_name: &str) -> OutgoingMessage {
    let rows = MENU
        .iter()
        .map(|entry| {
            InteractiveRow::new_with_description(
                entry.id.to_string(),
                entry.title.to_string(),
                entry.description.to_string(),
            )
        })
        .collect();

    OutgoingMessage::Interactive(OutgoingInteractiveMessage::new_list(
        to.to_string(),
        format!("Hello {first_name}, Welcome to {}", consts::CLINIC_NAME),
        MENU_BODY.to_string(),
        Some(MENU_FOOTER.to_string()),
        MENU_BUTTON.to_string(),
        InteractiveSection {
            title: Some(MENU_SECTION_TITLE.to_string()),
            rows,
        },
    ))
}

impl Reply {
    /// Builds the message for recipient `to`, text replies quote `reply_to`
    pub fn build(&self, to: &str, reply_to: &str) -> OutgoingMessage {
        match self {
            Reply::Text(body) => OutgoingMessage::Text(
                OutgoingTextMessage::new(to.to_string(), body.to_string())
                    .reply_to(reply_to.to_string()),
            ),
            Reply::Link(body) => OutgoingMessage::Text(
                OutgoingTextMessage::new(to.to_string(), body.to_string()).with_preview_url(),
            ),
            Reply::ContactCard => OutgoingMessage::Contacts(OutgoingContactsMessage::new(
                to.to_string(),
                ContactCard {
                    name: ContactName {
                        formatted_name: consts::CLINIC_CONTACT_FORMATTED_NAME.to_string(),
                        first_name: consts::CLINIC_CONTACT_FIRST_NAME.to_string(),
                        last_name: consts::CLINIC_CONTACT_LAST_NAME.to_string(),
                    },
                    phones: vec![ContactPhone {
                        phone: consts::CLINIC_CONTACT_PHONE.to_string(),
                        phone_type: "WORK".to_string(),
                        wa_id: Some(consts::CLINIC_CONTACT_WA_ID.to_string()),
                    }],
                },
            )),
            Reply::Location => OutgoingMessage::Location(OutgoingLocationMessage::new(
                to.to_string(),
                LocationContent {
                    latitude: consts::CLINIC_LATITUDE.to_string(),
                    longitude: consts::CLINIC_LONGITUDE.to_string(),
                    name: Some(consts::CLINIC_NAME.to_string()),
                    address: None,
                },
            )),
        }
    }
}

/// Decides what to send back for `message`.
///
/// A list reply gets the script of the picked option (nothing for an unknown
/// option), any other message gets the main menu.
pub fn plan_replies(message: &Message, to: &str, first_name: &str) -> Vec<OutgoingMessage> {
    let Some(option_id) = message.list_reply_id() else {
        return vec![main_menu(to, first_name)];
    };

    match find_option(option_id) {
        Some(entry) => entry
            .replies
            .iter()
            .map(|reply| reply.build(to, &message.id))
            .collect(),
        None => {
            logfire::warn!(
                "Unknown menu option selected: {option}",
                option = option_id.to_string()
            );
            crate::metric::incr_webhook_event_statds("unknown_option");
            Vec::new()
        }
    }
}
