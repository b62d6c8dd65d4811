use crate::webhook::whatsapp::client::SendError;
use derive_more::{Display, Error};
use ntex::{http, web};
use serde_json::json;

/// Every way a webhook request can fail.
///
/// Errors are rendered as `{"error": <kind>, "detail": <message>}` with the
/// status code returned by [`WebhookError::status_code`].
#[derive(Debug, Display, Error)]
pub enum WebhookError {
    #[display("Verification failed")]
    Verification,
    #[display("Missing parameters")]
    MissingParameter,
    #[display("{_0}")]
    InvalidPayload(#[error(not(source))] String),
    #[display("Malformed data provided: {_0}")]
    MalformedEvent(#[error(not(source))] String),
    #[display("Invalid request signature")]
    InvalidSignature,
    #[display("Request timed out")]
    SendTimeout,
    #[display("Failed to send message")]
    SendFailed(#[error(not(source))] String),
    #[display("An unexpected error occurred")]
    Internal(#[error(not(source))] String),
}

impl WebhookError {
    /// Machine readable name of the error
    pub fn kind(&self) -> &'static str {
        match self {
            WebhookError::Verification => "verification_failed",
            WebhookError::MissingParameter => "missing_parameter",
            WebhookError::InvalidPayload(_) => "invalid_payload",
            WebhookError::MalformedEvent(_) => "malformed_event",
            WebhookError::InvalidSignature => "invalid_signature",
            WebhookError::SendTimeout => "send_timeout",
            WebhookError::SendFailed(_) => "send_failed",
            WebhookError::Internal(_) => "internal_error",
        }
    }

    fn get_error_message(&self) -> String {
        match self {
            WebhookError::SendFailed(msg) => format!("[SendFailed] {msg}"),
            WebhookError::Internal(msg) => format!("[Internal] {msg}"),
            _ => format!("[{kind}] {self}", kind = self.kind()),
        }
    }
}

impl From<SendError> for WebhookError {
    fn from(err: SendError) -> Self {
        match err {
            SendError::Timeout => WebhookError::SendTimeout,
            SendError::Failed(msg) => WebhookError::SendFailed(msg),
        }
    }
}

impl web::error::WebResponseError for WebhookError {
    fn error_response(&self, _: &web::HttpRequest) -> web::HttpResponse {
        logfire::error!("{message}", message = self.get_error_message());

        web::HttpResponse::build(self.status_code()).json(&json!({
            "error": self.kind(),
            "detail": self.to_string(),
        }))
    }

    fn status_code(&self) -> http::StatusCode {
        match *self {
            WebhookError::Verification => http::StatusCode::FORBIDDEN,
            WebhookError::MissingParameter
            | WebhookError::InvalidPayload(_)
            | WebhookError::MalformedEvent(_) => http::StatusCode::BAD_REQUEST,
            WebhookError::InvalidSignature => http::StatusCode::UNAUTHORIZED,
            WebhookError::SendTimeout => http::StatusCode::REQUEST_TIMEOUT,
            WebhookError::SendFailed(_) | WebhookError::Internal(_) => {
                http::StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
