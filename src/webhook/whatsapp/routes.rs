//! WhatsApp webhook endpoint handlers
//!
//! This module handles incoming webhook requests from WhatsApp Business API.
//! It implements both the verification endpoint (GET) and the webhook receiver (POST).

use super::{handler, security::SignedBody};
use crate::{errors::WebhookError, metric, webhook::AppState};
use ntex::web;
use serde::Deserialize;
use serde_json::json;
use subtle::ConstantTimeEq;
use tracing::Instrument;

/// Query parameters for webhook verification
#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    /// The mode parameter, should be "subscribe"
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    /// The verification token from WhatsApp
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    /// The challenge string to echo back
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// Webhook verification endpoint (GET)
///
/// WhatsApp sends a GET request to verify the webhook URL.
/// This endpoint validates the verify token and returns the challenge.
///
/// # Returns
/// - 200 with challenge string if verification succeeds
/// - 400 if `hub.mode` or `hub.verify_token` is missing
/// - 403 if verification fails
#[web::get("")]
pub async fn verify(
    query: web::types::Query<VerifyQuery>,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let query = query.into_inner();
    let non_empty = |value: Option<String>| value.filter(|v| !v.is_empty());

    let (Some(mode), Some(token)) = (non_empty(query.mode), non_empty(query.verify_token)) else {
        logfire::warn!("Webhook verification request with missing parameters");
        return Err(WebhookError::MissingParameter.into());
    };

    let token_matches: bool = token
        .as_bytes()
        .ct_eq(app_state.config.verify_token.as_bytes())
        .into();

    if mode != "subscribe" || !token_matches {
        metric::incr_webhook_event_statds("verification_failed");
        return Err(WebhookError::Verification.into());
    }

    logfire::info!("Webhook verified");
    metric::incr_webhook_event_statds("verified");

    Ok(web::HttpResponse::Ok()
        .content_type("text/plain")
        .body(query.challenge.unwrap_or_default()))
}

/// Webhook receiver endpoint (POST)
///
/// Receives webhook events from WhatsApp Business API and answers the new
/// messages synchronously. The body is only parsed after its signature was
/// verified by [`SignedBody`].
///
/// # Returns
/// - 200 `{"status": "success", "from", "message", "processed"}` when at least
///   one new message was answered
/// - 200 `{"status": "no_message_found"}` for status updates, duplicates and
///   unknown menu options
/// - 4xx/5xx with `{"error", "detail"}` otherwise
#[web::post("")]
pub async fn receive(
    body: SignedBody,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let payload = handler::parse_webhook(&body.0)?;

    let outcome = handler::process_webhook(
        &payload,
        &app_state.whatsapp_client,
        &app_state.dedup,
        &app_state.config.profile_name_fallback,
    )
    .instrument(logfire::span!("whatsapp_webhook"))
    .await?;

    let response = match outcome.processed.first() {
        Some(first) => json!({
            "status": "success",
            "from": first.from,
            "message": first.body,
            "processed": outcome.processed.len(),
        }),
        None => json!({"status": "no_message_found"}),
    };

    Ok(web::HttpResponse::Ok().json(&response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{AppConfig, tests::test_config},
        consts,
        webhook::{
            self,
            whatsapp::{
                client::{ImplMessageSender, MockMessageSender, SendError},
                handler::tests::{event_body, list_reply_message, messages_value, text_message},
                schemas::WhatsAppMessageResponse,
                security::sign_payload,
            },
        },
    };
    use ntex::{
        http::{Request, StatusCode},
        web::{App, test},
    };
    use std::sync::Arc;

    const VERIFY_PATH: &str = "/webhook";

    fn sender_expecting(times: usize) -> ImplMessageSender {
        let mut mock = MockMessageSender::new();
        mock.expect_send()
            .times(times)
            .returning(|_| Ok(WhatsAppMessageResponse::default()));
        Arc::new(mock)
    }

    fn failing_sender(err: fn() -> SendError) -> ImplMessageSender {
        let mut mock = MockMessageSender::new();
        mock.expect_send().times(1).returning(move |_| Err(err()));
        Arc::new(mock)
    }

    async fn call(config: AppConfig, client: ImplMessageSender, req: Request) -> (StatusCode, Vec<u8>) {
        let app = test::init_service(
            App::new()
                .state(AppState::new(config, client))
                .configure(webhook::routes::whatsapp),
        )
        .await;

        let resp = test::call_service(&app, req).await;
        let status = resp.status();
        (status, test::read_body(resp).await.to_vec())
    }

    fn verify_request(query: &str) -> Request {
        test::TestRequest::get()
            .uri(&format!("{VERIFY_PATH}?{query}"))
            .to_request()
    }

    fn signed_post(body: &[u8]) -> Request {
        let signature = sign_payload(body, "test-app-secret").unwrap();
        test::TestRequest::post()
            .uri(VERIFY_PATH)
            .header("content-type", "application/json")
            .header(consts::SIGNATURE_HEADER, signature)
            .set_payload(body.to_vec())
            .to_request()
    }

    fn json_body(body: &[u8]) -> serde_json::Value {
        serde_json::from_slice(body).unwrap()
    }

    #[test]
    fn test_verify_query_deserialization() {
        let json = r#"{"hub.mode":"subscribe","hub.verify_token":"test123","hub.challenge":"challenge123"}"#;
        let query: VerifyQuery = serde_json::from_str(json).unwrap();
        assert_eq!(query.mode.as_deref(), Some("subscribe"));
        assert_eq!(query.verify_token.as_deref(), Some("test123"));
        assert_eq!(query.challenge.as_deref(), Some("challenge123"));

        let query: VerifyQuery = serde_json::from_str("{}").unwrap();
        assert!(query.mode.is_none() && query.verify_token.is_none());
    }

    #[ntex::test]
    async fn test_verify_echoes_challenge() {
        let (status, body) = call(
            test_config(),
            sender_expecting(0),
            verify_request(
                "hub.mode=subscribe&hub.verify_token=test-verify-token&hub.challenge=1158201444",
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"1158201444");
    }

    #[ntex::test]
    async fn test_verify_rejects_wrong_token_or_mode() {
        for query in [
            "hub.mode=subscribe&hub.verify_token=nope&hub.challenge=1",
            "hub.mode=unsubscribe&hub.verify_token=test-verify-token&hub.challenge=1",
        ] {
            let (status, body) = call(test_config(), sender_expecting(0), verify_request(query)).await;

            assert_eq!(status, StatusCode::FORBIDDEN, "{query}");
            assert_eq!(json_body(&body)["error"], "verification_failed");
        }
    }

    #[ntex::test]
    async fn test_verify_missing_parameters() {
        for query in [
            "hub.verify_token=test-verify-token&hub.challenge=1",
            "hub.mode=subscribe&hub.challenge=1",
            "hub.mode=&hub.verify_token=test-verify-token",
            "",
        ] {
            let (status, body) = call(test_config(), sender_expecting(0), verify_request(query)).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{query}");
            assert_eq!(json_body(&body)["error"], "missing_parameter");
        }
    }

    #[ntex::test]
    async fn test_receive_first_contact() {
        let body = event_body(messages_value(
            Some("Maria Lopez"),
            json!([text_message("wamid.hi", "hola")]),
        ))
        .to_string();

        let (status, response) =
            call(test_config(), sender_expecting(1), signed_post(body.as_bytes())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json_body(&response),
            json!({"status": "success", "from": "5215512345678", "message": "hola", "processed": 1})
        );
    }

    #[ntex::test]
    async fn test_receive_same_message_twice_sends_once() {
        let body = event_body(messages_value(
            Some("Maria"),
            json!([list_reply_message("wamid.dup", "option1")]),
        ))
        .to_string();

        let app = test::init_service(
            App::new()
                .state(AppState::new(test_config(), sender_expecting(2)))
                .configure(webhook::routes::whatsapp),
        )
        .await;

        let first = test::call_service(&app, signed_post(body.as_bytes())).await;
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(json_body(&test::read_body(first).await)["status"], "success");

        let second = test::call_service(&app, signed_post(body.as_bytes())).await;
        assert_eq!(second.status(), StatusCode::OK);
        assert_eq!(
            json_body(&test::read_body(second).await)["status"],
            "no_message_found"
        );
    }

    #[ntex::test]
    async fn test_receive_unknown_option() {
        let body = event_body(messages_value(
            Some("Maria"),
            json!([list_reply_message("wamid.unknown", "option42")]),
        ))
        .to_string();

        let (status, response) =
            call(test_config(), sender_expecting(0), signed_post(body.as_bytes())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(&response), json!({"status": "no_message_found"}));
    }

    #[ntex::test]
    async fn test_receive_list_reply_without_selection() {
        let body = event_body(messages_value(
            Some("Maria"),
            json!([{
                "from": "5215512345678",
                "id": "wamid.empty",
                "type": "interactive",
                "interactive": {"type": "list_reply"}
            }]),
        ))
        .to_string();

        let (status, response) =
            call(test_config(), sender_expecting(0), signed_post(body.as_bytes())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json_body(&response)["error"], "malformed_event");
    }

    #[ntex::test]
    async fn test_receive_status_update() {
        let body = event_body(json!({
            "statuses": [{"id": "wamid.out", "status": "read", "recipient_id": "5215512345678"}]
        }))
        .to_string();

        let (status, response) =
            call(test_config(), sender_expecting(0), signed_post(body.as_bytes())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(&response), json!({"status": "no_message_found"}));
    }

    #[ntex::test]
    async fn test_receive_invalid_json() {
        let (status, response) =
            call(test_config(), sender_expecting(0), signed_post(b"{\"entry\": [")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json_body(&response)["error"], "invalid_payload");
    }

    #[ntex::test]
    async fn test_receive_not_a_whatsapp_event() {
        let (status, response) = call(
            test_config(),
            sender_expecting(0),
            signed_post(br#"{"object": "page", "entry": []}"#),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json_body(&response)["error"], "malformed_event");
    }

    #[ntex::test]
    async fn test_receive_rejects_bad_signatures() {
        let body = event_body(messages_value(
            Some("Maria"),
            json!([text_message("wamid.sig", "hola")]),
        ))
        .to_string();

        let unsigned = test::TestRequest::post()
            .uri(VERIFY_PATH)
            .set_payload(body.clone())
            .to_request();
        let wrong_secret = test::TestRequest::post()
            .uri(VERIFY_PATH)
            .header(
                consts::SIGNATURE_HEADER,
                sign_payload(body.as_bytes(), "other-secret").unwrap(),
            )
            .set_payload(body.clone())
            .to_request();
        let unsigned_invalid_json = test::TestRequest::post()
            .uri(VERIFY_PATH)
            .set_payload(b"{\"entry\": [".to_vec())
            .to_request();
        let tampered_invalid_json = test::TestRequest::post()
            .uri(VERIFY_PATH)
            .header(
                consts::SIGNATURE_HEADER,
                sign_payload(body.as_bytes(), "test-app-secret").unwrap(),
            )
            .set_payload(b"{\"entry\": [".to_vec())
            .to_request();

        for req in [unsigned, wrong_secret, unsigned_invalid_json, tampered_invalid_json] {
            let (status, response) = call(test_config(), sender_expecting(0), req).await;

            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(json_body(&response)["error"], "invalid_signature");
        }
    }

    #[ntex::test]
    async fn test_receive_without_app_secret_is_rejected() {
        let mut config = test_config();
        config.app_secret = None;
        let body = event_body(messages_value(
            Some("Maria"),
            json!([text_message("wamid.nosecret", "hola")]),
        ))
        .to_string();

        let (status, response) =
            call(config, sender_expecting(0), signed_post(body.as_bytes())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(&response)["error"], "internal_error");
    }

    #[ntex::test]
    async fn test_receive_send_errors() {
        let cases: [(fn() -> SendError, StatusCode, &str); 2] = [
            (|| SendError::Timeout, StatusCode::REQUEST_TIMEOUT, "send_timeout"),
            (
                || SendError::Failed("WhatsApp API returned error status 500".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "send_failed",
            ),
        ];

        for (err, expected_status, expected_kind) in cases {
            let body = event_body(messages_value(
                Some("Maria"),
                json!([text_message("wamid.fail", "hola")]),
            ))
            .to_string();

            let (status, response) =
                call(test_config(), failing_sender(err), signed_post(body.as_bytes())).await;

            assert_eq!(status, expected_status);
            assert_eq!(json_body(&response)["error"], expected_kind);
        }
    }
}
