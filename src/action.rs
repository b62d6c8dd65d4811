use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use ntex::web;

use crate::{
    config::AppConfig,
    server,
    webhook::{
        self, AppState,
        whatsapp::{
            client::{MessageSender, WhatsAppClient},
            menu,
            security,
        },
    },
};

#[derive(Args, Debug, Clone)]
pub struct SendMenuArgs {
    /// WhatsApp id receiving the menu, defaults to RECIPIENT_WAID
    #[arg(short, long)]
    to: Option<String>,
    /// First name used in the greeting
    #[arg(short, long)]
    name: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct SignArgs {
    /// Payload whose signature is printed
    #[arg(short, long)]
    file: String,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Action {
    /// Run the webhook server
    Serve,
    /// Send the main menu once to a phone number
    SendMenu(SendMenuArgs),
    /// Print the X-Hub-Signature-256 header value of a payload file
    Sign(SignArgs),
}

/// WhatsApp clinic assistant
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct AppArgs {
    #[command(subcommand)]
    pub action: Option<Action>,
}

impl AppArgs {
    pub async fn run(&self, config: AppConfig) -> anyhow::Result<()> {
        match self.action.as_ref().unwrap_or(&Action::Serve) {
            Action::Serve => serve(config).await,
            Action::SendMenu(args) => {
                println!("{}", send_menu(args, &config).await?);
                Ok(())
            }
            Action::Sign(SignArgs { file }) => {
                println!("{}", sign_file(file, &config)?);
                Ok(())
            }
        }
    }
}

/// Sends the main menu once, returns a summary with the sent message ids
async fn send_menu(args: &SendMenuArgs, config: &AppConfig) -> anyhow::Result<String> {
    let to = args
        .to
        .as_ref()
        .or(config.recipient_waid.as_ref())
        .context("no recipient, pass --to or set RECIPIENT_WAID")?;
    let first_name = menu::first_name(args.name.as_deref(), &config.profile_name_fallback);

    let client = WhatsAppClient::new(config)?;
    let response = client
        .send(&menu::main_menu(to, first_name))
        .await
        .map_err(|e| anyhow::anyhow!("menu couldnt be sent: {e}"))?;

    let message_ids: Vec<&str> = response.messages.iter().map(|m| m.id.as_str()).collect();
    Ok(format!("menu sent to {to}: {}", message_ids.join(", ")))
}

/// `X-Hub-Signature-256` header value of the payload stored in `file`
fn sign_file(file: &str, config: &AppConfig) -> anyhow::Result<String> {
    let app_secret = config
        .app_secret
        .as_ref()
        .context("APP_SECRET is required to sign payloads")?;
    let payload = std::fs::read(file).with_context(|| format!("cant read {file}"))?;

    security::sign_payload(&payload, app_secret).context("payload couldnt be signed")
}

/// Starts the web server and blocks until it stops
async fn serve(config: AppConfig) -> anyhow::Result<()> {
    if config.app_secret.is_none() {
        logfire::warn!("APP_SECRET is not set, webhook deliveries will be rejected");
    }

    let server_addr = config.server_addr();
    let client = WhatsAppClient::new(&config)?;
    let app_state = AppState::new(config, Arc::new(client));

    logfire::info!(
        "Starting server on {host}:{port}",
        host = server_addr.0.clone(),
        port = server_addr.1.to_string()
    );

    web::server(move || {
        web::App::new()
            .wrap(web::middleware::Logger::default())
            .wrap(web::middleware::Compress::default())
            .state(app_state.clone())
            .configure(webhook::routes::whatsapp)
            .service((server::home, server::healthz))
    })
    .bind(server_addr)?
    .run()
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
