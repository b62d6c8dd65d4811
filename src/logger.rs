use crate::config::AppConfig;
use logfire::config::{MetricsOptions, SendToLogfire};

/// Sets up logfire logging, tracing and metrics.
///
/// Data only leaves the process when a logfire token is configured, the
/// returned handler must be shut down before exiting to flush it.
pub fn setup_logfire(config: &AppConfig) -> anyhow::Result<logfire::ShutdownHandler> {
    let mut builder = logfire::configure()
        .install_panic_handler()
        .with_metrics(Some(MetricsOptions::default()))
        .send_to_logfire(SendToLogfire::IfTokenPresent);

    if let Some(token) = &config.logfire_token {
        builder = builder.with_token(token);
    }

    Ok(builder.finish()?)
}
