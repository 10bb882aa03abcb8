//! Middleware for logging and cross-origin traffic.

use actix_cors::Cors;
use actix_web::middleware::Logger;

/// Standard request logger:
/// remote-ip "request-line" status-code response-size "referrer" "user-agent"
pub fn request_logger() -> Logger {
    Logger::default()
}

/// Configures CORS (Cross-Origin Resource Sharing).
/// Important if the UI and API ever live on different subdomains.
pub fn cors_policy() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE"])
        .allow_any_header()
        .max_age(3600)
}
