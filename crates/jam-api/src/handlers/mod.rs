//! Route handlers: the flow between HTTP requests and the core traits.

pub mod audio_uploads;
pub mod comments;
pub mod posts;
pub mod profiles;
pub mod reviews;
pub mod users;

use actix_web::HttpResponse;
use serde_json::Value;
use uuid::Uuid;

use jam_core::traits::{BlobStore, IdentityProvider, JamStore};
use jam_core::AppError;

use crate::error::ApiError;
use crate::params::parse_record_id;

/// State shared across all Actix-web workers.
pub struct AppState {
    pub store: Box<dyn JamStore>,
    pub blobs: Box<dyn BlobStore>,
    pub auth: Box<dyn IdentityProvider>,
}

/// GET /health — liveness probe, no auth, no envelope.
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Pulls a required, non-empty string field out of a request body.
pub(crate) fn require_str(value: Option<String>, field: &str) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(format!("Invalid or missing {field}")).into())
}

/// Reads the record id out of a merge patch body (`{"id": "...", ...}`).
pub(crate) fn patch_record_id(patch: &Value) -> Result<Uuid, ApiError> {
    let raw = patch
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::from(AppError::Validation("Invalid or missing ID".to_string())))?;
    parse_record_id(raw)
}
