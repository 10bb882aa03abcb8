//! /api/users — legacy self-hosted accounts.
//!
//! Every response goes through the [`SafeUser`] projection; the password
//! hash never leaves the store. Password changes have their own endpoint.

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use jam_core::models::{SafeUser, User};
use jam_core::query::{query_list, ListParams};
use jam_core::traits::Collection;
use jam_core::AppError;

use super::{patch_record_id, require_str, AppState};
use crate::error::ApiError;
use crate::params::{parse_record_id, ListQuery};
use crate::response;

pub const MIN_PASSWORD_LEN: usize = 8;

fn check_password(password: &str) -> Result<(), ApiError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        ))
        .into());
    }
    Ok(())
}

/// GET: single record by `id`, or a list searched over username, preferred
/// genre and instruments, paginated by `cursor`/`limit`.
pub async fn get_users(
    data: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let query = ListQuery::parse(req.query_string());

    if let Some(raw) = &query.id {
        let id = parse_record_id(raw)?;
        return match data.store.users().get(id).await? {
            Some(user) => Ok(response::ok(SafeUser::from(user))),
            None => Err(AppError::NotFound("User", raw.clone()).into()),
        };
    }

    let records = data.store.users().fetch_all().await?;
    let page = query_list(
        records,
        &ListParams {
            search: query.search.clone(),
            cursor: query.cursor_id(),
            limit: query.page_size(),
            ..Default::default()
        },
    );
    let safe: Vec<SafeUser> = page.items.into_iter().map(SafeUser::from).collect();
    Ok(response::list(safe, page.next_cursor))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserInput {
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub instruments: Vec<String>,
    pub preferred_genre: Option<String>,
    pub location: Option<String>,
    pub contact: Option<String>,
}

/// POST: create an account, hashing the password before it ever reaches
/// the store. Display usernames are globally unique.
pub async fn create_user(
    data: web::Data<AppState>,
    input: web::Json<CreateUserInput>,
) -> Result<HttpResponse, ApiError> {
    let input = input.into_inner();
    let username = require_str(input.username, "username")?;
    let password = require_str(input.password, "password")?;
    check_password(&password)?;

    let taken = data
        .store
        .users()
        .fetch_all()
        .await?
        .iter()
        .any(|u| u.username == username);
    if taken {
        return Err(AppError::Validation("Username already taken".to_string()).into());
    }

    let user = User {
        id: Uuid::now_v7(),
        username,
        password_hash: data.auth.hash_password(&password)?,
        instruments: input.instruments,
        preferred_genre: input.preferred_genre,
        location: input.location,
        contact: input.contact,
        created_at: Utc::now(),
    };
    let created = data.store.users().insert(user).await?;
    Ok(response::created(SafeUser::from(created)))
}

/// PUT: partial-field merge by `id`. The hash cannot be written through
/// this route; password changes go through `/api/users/password`.
pub async fn update_user(
    data: web::Data<AppState>,
    patch: web::Json<Value>,
) -> Result<HttpResponse, ApiError> {
    let mut patch = patch.into_inner();
    let id = patch_record_id(&patch)?;
    if let Some(fields) = patch.as_object_mut() {
        fields.remove("passwordHash");
    }
    match data.store.users().merge(id, patch).await? {
        Some(user) => Ok(response::ok(SafeUser::from(user))),
        None => Err(AppError::NotFound("User", id.to_string()).into()),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordInput {
    pub id: Option<String>,
    pub new_password: Option<String>,
}

/// PUT /api/users/password — dedicated password update.
pub async fn update_password(
    data: web::Data<AppState>,
    input: web::Json<UpdatePasswordInput>,
) -> Result<HttpResponse, ApiError> {
    let input = input.into_inner();
    let raw = require_str(input.id, "ID")?;
    let id = parse_record_id(&raw)?;
    let password = input
        .new_password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::from(AppError::Validation(
            "Missing or invalid newPassword".to_string(),
        )))?;
    check_password(&password)?;

    if data.store.users().get(id).await?.is_none() {
        return Err(AppError::NotFound("User", raw).into());
    }

    let hash = data.auth.hash_password(&password)?;
    match data
        .store
        .users()
        .merge(id, json!({ "passwordHash": hash }))
        .await?
    {
        Some(user) => Ok(response::ok(SafeUser::from(user))),
        None => Err(AppError::NotFound("User", raw).into()),
    }
}

/// DELETE: remove by `id` query parameter.
pub async fn delete_user(
    data: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let query = ListQuery::parse(req.query_string());
    let raw = query
        .id
        .ok_or_else(|| ApiError::from(AppError::Validation("Invalid or missing ID".to_string())))?;
    let id = parse_record_id(&raw)?;
    match data.store.users().delete(id).await? {
        Some(user) => Ok(response::ok(SafeUser::from(user))),
        None => Err(AppError::NotFound("User", raw).into()),
    }
}
