use std::time::Duration;

/// Outbound send timeout
pub const SEND_TIMEOUT: Duration = Duration::from_secs(10);

pub const SIGNATURE_HEADER: &str = "X-Hub-Signature-256";
pub const SIGNATURE_PREFIX: &str = "sha256=";

pub const MESSAGING_PRODUCT: &str = "whatsapp";
pub const RECIPIENT_TYPE_INDIVIDUAL: &str = "individual";

pub const HOME_MESSAGE: &str = "Welcome to the WhatsApp API!";

pub const CLINIC_NAME: &str = "Example Family Clinic";

pub const CLINIC_CONTACT_FIRST_NAME: &str = "Ana";
pub const CLINIC_CONTACT_LAST_NAME: &str = "Reyes";
pub const CLINIC_CONTACT_FORMATTED_NAME: &str = "Dr. Ana Reyes";
pub const CLINIC_CONTACT_PHONE: &str = "+1 555 010 0100";
pub const CLINIC_CONTACT_WA_ID: &str = "15550100100";

/// Placeholder pin, replace with the clinic location
pub const CLINIC_LATITUDE: &str = "0.00000000";
pub const CLINIC_LONGITUDE: &str = "0.00000000";
