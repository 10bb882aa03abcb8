//! /api/audio_uploads — metadata CRUD plus the multipart file upload.
//!
//! Upload and metadata creation are two separate calls, as in the original
//! client flow: `POST /api/audio_uploads/upload` stores the bytes and
//! returns the blob reference, which the client then records via
//! `POST /api/audio_uploads`.

use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use futures_util::TryStreamExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use jam_core::models::AudioUpload;
use jam_core::query::{query_list, ListParams};
use jam_core::traits::Collection;
use jam_core::AppError;

use super::{patch_record_id, require_str, AppState};
use crate::error::ApiError;
use crate::identity::Identity;
use crate::params::{parse_record_id, ListQuery};
use crate::response;

pub const MAX_AUDIO_BYTES: usize = 10 * 1024 * 1024;

/// GET: single record by `id`, or a list filtered by `userId` and `search`
/// (title + raw tags), paginated by `cursor`/`limit`.
pub async fn get_audio_uploads(
    data: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let query = ListQuery::parse(req.query_string());

    if let Some(raw) = &query.id {
        let id = parse_record_id(raw)?;
        return match data.store.audio_uploads().get(id).await? {
            Some(upload) => Ok(response::ok(upload)),
            None => Err(AppError::NotFound("Audio upload", raw.clone()).into()),
        };
    }

    let records = data.store.audio_uploads().fetch_all().await?;
    let page = query_list(
        records,
        &ListParams {
            owner_key: query.user_id.clone(),
            search: query.search.clone(),
            cursor: query.cursor_id(),
            limit: query.page_size(),
            ..Default::default()
        },
    );
    Ok(response::list(page.items, page.next_cursor))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAudioUploadInput {
    pub user_id: Option<String>,
    pub filename: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub file_path: Option<String>,
    pub url: Option<String>,
    pub mime_type: Option<String>,
    pub original_name: Option<String>,
    pub size: Option<u64>,
}

/// POST: create the metadata record for an already-stored blob.
pub async fn create_audio_upload(
    data: web::Data<AppState>,
    input: web::Json<CreateAudioUploadInput>,
) -> Result<HttpResponse, ApiError> {
    let input = input.into_inner();
    let upload = AudioUpload {
        id: Uuid::now_v7(),
        user_id: require_str(input.user_id, "userId")?,
        filename: require_str(input.filename, "filename")?,
        title: input.title,
        tags: input.tags,
        file_path: input.file_path,
        url: input.url,
        mime_type: input.mime_type,
        original_name: input.original_name,
        size: input.size,
        created_at: Utc::now(),
    };
    let created = data.store.audio_uploads().insert(upload).await?;
    Ok(response::created(created))
}

/// PUT: partial-field merge by `id`.
pub async fn update_audio_upload(
    data: web::Data<AppState>,
    patch: web::Json<Value>,
) -> Result<HttpResponse, ApiError> {
    let patch = patch.into_inner();
    let id = patch_record_id(&patch)?;
    match data.store.audio_uploads().merge(id, patch).await? {
        Some(upload) => Ok(response::ok(upload)),
        None => Err(AppError::NotFound("Audio upload", id.to_string()).into()),
    }
}

/// DELETE: remove the metadata record by `id`. The stored blob is left
/// behind (no cascading deletes).
pub async fn delete_audio_upload(
    data: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let query = ListQuery::parse(req.query_string());
    let raw = query
        .id
        .ok_or_else(|| ApiError::from(AppError::Validation("Invalid or missing ID".to_string())))?;
    let id = parse_record_id(&raw)?;
    match data.store.audio_uploads().delete(id).await? {
        Some(upload) => Ok(response::ok(upload)),
        None => Err(AppError::NotFound("Audio upload", raw).into()),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub file_path: String,
    pub url: String,
    pub mime_type: String,
    pub user_id: String,
    pub original_name: String,
    pub size: usize,
}

fn bad_multipart(err: actix_multipart::MultipartError) -> ApiError {
    AppError::Validation(format!("Malformed multipart payload: {err}")).into()
}

/// POST /api/audio_uploads/upload — multipart `file` field plus an optional
/// `userId` field. The owner falls back to the authenticated identity, then
/// to "anonymous". Only `audio/*` payloads up to 10 MiB are accepted.
pub async fn upload_audio(
    data: web::Data<AppState>,
    identity: Option<Identity>,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut content_type: Option<String> = None;
    let mut original_name: Option<String> = None;
    let mut form_user_id: Option<String> = None;

    while let Some(mut field) = payload.try_next().await.map_err(bad_multipart)? {
        let name = field.name().to_string();
        match name.as_str() {
            "file" => {
                content_type = field.content_type().map(|m| m.essence_str().to_string());
                original_name = field
                    .content_disposition()
                    .get_filename()
                    .map(sanitize_filename);
                let mut buf: Vec<u8> = Vec::new();
                while let Some(chunk) = field.try_next().await.map_err(bad_multipart)? {
                    if buf.len() + chunk.len() > MAX_AUDIO_BYTES {
                        return Err(AppError::Validation(format!(
                            "File too large. Max size is {}MB",
                            MAX_AUDIO_BYTES / (1024 * 1024)
                        ))
                        .into());
                    }
                    buf.extend_from_slice(&chunk);
                }
                file_bytes = Some(buf);
            }
            "userId" => {
                let mut buf: Vec<u8> = Vec::new();
                while let Some(chunk) = field.try_next().await.map_err(bad_multipart)? {
                    buf.extend_from_slice(&chunk);
                }
                form_user_id = String::from_utf8(buf)
                    .ok()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty());
            }
            _ => {
                // Drain and ignore unknown fields.
                while field.try_next().await.map_err(bad_multipart)?.is_some() {}
            }
        }
    }

    let bytes = file_bytes.ok_or_else(|| {
        ApiError::from(AppError::Validation(
            "Missing or invalid file field".to_string(),
        ))
    })?;
    let mime_type =
        content_type.unwrap_or_else(|| "application/octet-stream".to_string());
    if !mime_type.starts_with("audio/") {
        return Err(AppError::Validation("Only audio uploads are accepted".to_string()).into());
    }

    let user_id = form_user_id
        .or_else(|| identity.map(|i| i.user_id))
        .unwrap_or_else(|| "anonymous".to_string());
    let original_name = original_name
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "audio".to_string());
    let size = bytes.len();

    let path = format!(
        "audio/{}/{}-{}",
        sanitize_filename(&user_id),
        Utc::now().timestamp_millis(),
        original_name
    );
    let stored = data.blobs.put(&path, bytes, &mime_type).await?;

    Ok(response::created(UploadResult {
        file_path: stored.file_path,
        url: stored.url,
        mime_type,
        user_id,
        original_name,
        size,
    }))
}

/// Lowercases, keeps `[a-z0-9.-_]`, collapses dash runs, trims edge dashes.
/// Any path components smuggled into the name are cut off first.
fn sanitize_filename(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("audio");
    let mut collapsed = String::with_capacity(base.len());
    let mut prev_dash = false;
    for ch in base.to_lowercase().chars() {
        let keep = if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_') {
            prev_dash = false;
            ch
        } else {
            if prev_dash {
                continue;
            }
            prev_dash = true;
            '-'
        };
        collapsed.push(keep);
    }
    let trimmed = collapsed.trim_matches('-');
    if trimmed.is_empty() {
        "audio".to_string()
    } else {
        trimmed.to_string()
    }
}
