use ntex::web;

/// Configures webhook routes for external integrations.
///
/// These routes are public endpoints, the WhatsApp receiver authenticates
/// every delivery through its signature instead.
///
/// # Routes
/// - `GET /webhook` - WhatsApp webhook verification
/// - `POST /webhook` - WhatsApp webhook receiver
pub fn whatsapp(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/webhook").service((super::whatsapp::verify, super::whatsapp::receive)),
    );
}
