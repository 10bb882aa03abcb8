//! /api/comments — CRUD for comments under posts and audio uploads.

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use jam_core::models::{Comment, ParentKind};
use jam_core::query::{query_list, ListParams};
use jam_core::traits::Collection;
use jam_core::AppError;

use super::{patch_record_id, require_str, AppState};
use crate::error::ApiError;
use crate::params::{parse_record_id, ListQuery};
use crate::response;

/// GET: single record by `id`, or a list filtered by `parentId` and
/// `search` (comment text only), paginated by `cursor`/`limit`.
pub async fn get_comments(
    data: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let query = ListQuery::parse(req.query_string());

    if let Some(raw) = &query.id {
        let id = parse_record_id(raw)?;
        return match data.store.comments().get(id).await? {
            Some(comment) => Ok(response::ok(comment)),
            None => Err(AppError::NotFound("Comment", raw.clone()).into()),
        };
    }

    // The parent filter key must at least be shaped like a record id.
    if let Some(raw) = &query.parent_id {
        parse_record_id(raw)?;
    }

    let records = data.store.comments().fetch_all().await?;
    let page = query_list(
        records,
        &ListParams {
            owner_key: query.parent_id.clone(),
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
pub struct CreateCommentInput {
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub parent_type: Option<ParentKind>,
    pub parent_id: Option<String>,
    pub text: Option<String>,
}

/// POST: create a comment. Author fields are optional — anonymous comments
/// are allowed. The parent is not verified to exist.
pub async fn create_comment(
    data: web::Data<AppState>,
    input: web::Json<CreateCommentInput>,
) -> Result<HttpResponse, ApiError> {
    let input = input.into_inner();
    let parent_type = input
        .parent_type
        .ok_or_else(|| ApiError::from(AppError::Validation(
            "Invalid or missing parentType".to_string(),
        )))?;
    let parent_raw = require_str(input.parent_id, "parentId")?;
    let comment = Comment {
        id: Uuid::now_v7(),
        user_id: input.user_id.filter(|v| !v.trim().is_empty()),
        user_name: input.user_name,
        parent_type,
        parent_id: parse_record_id(&parent_raw)?,
        text: require_str(input.text, "text")?,
        created_at: Utc::now(),
    };
    let created = data.store.comments().insert(comment).await?;
    Ok(response::created(created))
}

/// PUT: partial-field merge by `id`.
pub async fn update_comment(
    data: web::Data<AppState>,
    patch: web::Json<Value>,
) -> Result<HttpResponse, ApiError> {
    let patch = patch.into_inner();
    let id = patch_record_id(&patch)?;
    match data.store.comments().merge(id, patch).await? {
        Some(comment) => Ok(response::ok(comment)),
        None => Err(AppError::NotFound("Comment", id.to_string()).into()),
    }
}

/// DELETE: remove by `id` query parameter.
pub async fn delete_comment(
    data: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let query = ListQuery::parse(req.query_string());
    let raw = query
        .id
        .ok_or_else(|| ApiError::from(AppError::Validation("Invalid or missing ID".to_string())))?;
    let id = parse_record_id(&raw)?;
    match data.store.comments().delete(id).await? {
        Some(comment) => Ok(response::ok(comment)),
        None => Err(AppError::NotFound("Comment", raw).into()),
    }
}
