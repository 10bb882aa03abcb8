//! /api/posts — CRUD plus the filtered, faceted, paginated newsfeed list.

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use jam_core::models::Post;
use jam_core::query::{query_list, ListParams};
use jam_core::traits::Collection;
use jam_core::AppError;

use super::{patch_record_id, require_str, AppState};
use crate::error::ApiError;
use crate::params::{parse_record_id, ListQuery};
use crate::response;

/// GET: single record by `id`, or a list filtered by `userId`, `search`,
/// `skill`, `instrument`*, `genre`* and paginated by `cursor`/`limit`.
pub async fn get_posts(
    data: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let query = ListQuery::parse(req.query_string());

    if let Some(raw) = &query.id {
        let id = parse_record_id(raw)?;
        return match data.store.posts().get(id).await? {
            Some(post) => Ok(response::ok(post)),
            None => Err(AppError::NotFound("Post", raw.clone()).into()),
        };
    }

    let records = data.store.posts().fetch_all().await?;
    let page = query_list(
        records,
        &ListParams {
            owner_key: query.user_id.clone(),
            search: query.search.clone(),
            facets: query.facet_filter(),
            cursor: query.cursor_id(),
            limit: query.page_size(),
        },
    );
    Ok(response::list(page.items, page.next_cursor))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostInput {
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub audio_upload_id: Option<Uuid>,
    pub album_art_url: Option<String>,
}

/// POST: create a post. A referenced audio upload is not verified to exist;
/// dangling references are allowed.
pub async fn create_post(
    data: web::Data<AppState>,
    input: web::Json<CreatePostInput>,
) -> Result<HttpResponse, ApiError> {
    let input = input.into_inner();
    let post = Post {
        id: Uuid::now_v7(),
        user_id: require_str(input.user_id, "userId")?,
        user_name: input.user_name,
        title: require_str(input.title, "title")?,
        body: require_str(input.body, "body")?,
        tags: input.tags,
        audio_upload_id: input.audio_upload_id,
        album_art_url: input.album_art_url,
        created_at: Utc::now(),
    };
    let created = data.store.posts().insert(post).await?;
    Ok(response::created(created))
}

/// PUT: partial-field merge by `id`, last writer wins.
pub async fn update_post(
    data: web::Data<AppState>,
    patch: web::Json<Value>,
) -> Result<HttpResponse, ApiError> {
    let patch = patch.into_inner();
    let id = patch_record_id(&patch)?;
    match data.store.posts().merge(id, patch).await? {
        Some(post) => Ok(response::ok(post)),
        None => Err(AppError::NotFound("Post", id.to_string()).into()),
    }
}

/// DELETE: remove by `id` query parameter; comments and reviews pointing at
/// the post are left in place (no cascading deletes).
pub async fn delete_post(
    data: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let query = ListQuery::parse(req.query_string());
    let raw = query
        .id
        .ok_or_else(|| AppError::Validation("Invalid or missing ID".to_string()))
        .map_err(ApiError::from)?;
    let id = parse_record_id(&raw)?;
    match data.store.posts().delete(id).await? {
        Some(post) => Ok(response::ok(post)),
        None => Err(AppError::NotFound("Post", raw).into()),
    }
}
