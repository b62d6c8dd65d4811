//! WhatsApp webhook integration module
//!
//! ## Submodules
//!
//! - [`routes`] - HTTP endpoint handlers for WhatsApp webhooks
//! - [`security`] - Signature verification of webhook deliveries
//! - [`handler`] - Business logic for processing WhatsApp webhook events
//! - [`menu`] - The clinic menu and the replies of each option
//! - [`dedup`] - Ids of the messages already answered
//! - [`schemas`] - Data structures for WhatsApp payloads (incoming and outgoing)
//! - [`client`] - WhatsApp API client for sending messages

pub mod client;
pub mod dedup;
pub mod handler;
pub mod menu;
pub mod routes;
pub mod schemas;
pub mod security;

// Re-export commonly used items for convenience
pub use routes::{receive, verify};
