//! Handlers not linked to the webhook

use ntex::web;
use serde_json::json;

use crate::consts;

/// Plain text welcome line, handy to check the bot is reachable
#[web::get("/")]
pub async fn home() -> impl web::Responder {
    web::HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(consts::HOME_MESSAGE)
}

/// Liveness probe
#[web::get("/healthz")]
pub async fn healthz() -> impl web::Responder {
    web::HttpResponse::Ok().json(&json!({"status": "ok"}))
}
