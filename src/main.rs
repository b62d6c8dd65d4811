//! # Clinic Bot
//!
//! WhatsApp assistant of a medical clinic: receives the WhatsApp Business
//! webhook and answers every message with a five option service menu.

pub mod action;
pub mod config;
pub mod consts;
pub mod errors;
pub mod logger;
pub mod metric;
pub mod server;
pub mod webhook;

use clap::Parser;

#[ntex::main]
async fn main() -> anyhow::Result<()> {
    let args = action::AppArgs::parse();

    // Initialize configuration
    let app_config = config::load()?;

    // Initialize logging and metrics
    let shutdown_handler = logger::setup_logfire(&app_config)?;

    let result = args.run(app_config).await;

    shutdown_handler.shutdown()?;

    result
}
