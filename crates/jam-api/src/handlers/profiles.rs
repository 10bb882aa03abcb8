//! /api/profile — musician profiles linked one-to-one to an identity.
//!
//! Mutations require a bearer token; reads by username or user id are
//! public. Profile lookups deliberately go through the same full-fetch
//! path as the list endpoints instead of a store-level query.

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use jam_core::models::Profile;
use jam_core::traits::{Collection, JamStore};
use jam_core::AppError;

use super::AppState;
use crate::error::ApiError;
use crate::identity::Identity;
use crate::params::ListQuery;
use crate::response;

async fn find_by_user(store: &dyn JamStore, user_id: &str) -> Result<Option<Profile>, ApiError> {
    Ok(store
        .profiles()
        .fetch_all()
        .await?
        .into_iter()
        .find(|p| p.user_id == user_id))
}

/// GET /api/profile — profile of the authenticated caller; `data` is null
/// when none exists yet.
pub async fn get_my_profile(
    data: web::Data<AppState>,
    identity: Identity,
) -> Result<HttpResponse, ApiError> {
    let profile = find_by_user(data.store.as_ref(), &identity.user_id).await?;
    Ok(response::ok(profile))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfileInput {
    pub username: Option<String>,
    #[serde(default)]
    pub instruments: Vec<String>,
    pub preferred_genre: Option<String>,
    pub location: Option<String>,
    pub contact: Option<String>,
}

/// POST /api/profile — creates the caller's profile. At most one profile
/// may exist per identity, and display usernames are globally unique.
pub async fn create_profile(
    data: web::Data<AppState>,
    identity: Identity,
    input: web::Json<CreateProfileInput>,
) -> Result<HttpResponse, ApiError> {
    let input = input.into_inner();
    let existing = data.store.profiles().fetch_all().await?;

    if existing.iter().any(|p| p.user_id == identity.user_id) {
        return Err(AppError::Validation("Profile already exists".to_string()).into());
    }
    if let Some(username) = input.username.as_deref().filter(|u| !u.is_empty()) {
        if existing.iter().any(|p| p.username.as_deref() == Some(username)) {
            return Err(AppError::Validation("Username already taken".to_string()).into());
        }
    }

    let profile = Profile {
        id: Uuid::now_v7(),
        user_id: identity.user_id,
        username: input.username.filter(|u| !u.trim().is_empty()),
        instruments: input.instruments,
        preferred_genre: input.preferred_genre,
        location: input.location,
        contact: input.contact,
        created_at: Utc::now(),
    };
    let created = data.store.profiles().insert(profile).await?;
    Ok(response::created(created))
}

/// PATCH /api/profile — partial merge of the caller's profile. The
/// identity link itself is immutable.
pub async fn patch_profile(
    data: web::Data<AppState>,
    identity: Identity,
    patch: web::Json<Value>,
) -> Result<HttpResponse, ApiError> {
    let Some(profile) = find_by_user(data.store.as_ref(), &identity.user_id).await? else {
        return Err(AppError::NotFound("Profile", identity.user_id.clone()).into());
    };

    let mut patch = patch.into_inner();
    if let Some(fields) = patch.as_object_mut() {
        fields.remove("userId");
    }
    match data.store.profiles().merge(profile.id, patch).await? {
        Some(updated) => Ok(response::ok(updated)),
        None => Err(AppError::NotFound("Profile", identity.user_id.clone()).into()),
    }
}

/// GET /api/profile/{username} — public lookup by display username.
pub async fn get_profile_by_username(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let username = path.into_inner();
    let profile = data
        .store
        .profiles()
        .fetch_all()
        .await?
        .into_iter()
        .find(|p| p.username.as_deref() == Some(username.as_str()));
    match profile {
        Some(profile) => Ok(response::ok(profile)),
        None => Err(AppError::NotFound("Profile", username).into()),
    }
}

/// GET /api/profile/user/{userId} — public lookup by identity link.
pub async fn get_profile_by_user_id(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();
    match find_by_user(data.store.as_ref(), &user_id).await? {
        Some(profile) => Ok(response::ok(profile)),
        None => Err(AppError::NotFound("Profile", user_id).into()),
    }
}

/// GET /api/all_profiles — every profile, optionally filtered by a
/// case-insensitive `search` over username and preferred genre.
/// Unpaginated, as the original.
pub async fn all_profiles(
    data: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let query = ListQuery::parse(req.query_string());
    let needle = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut profiles = data.store.profiles().fetch_all().await?;
    if let Some(needle) = needle {
        profiles.retain(|p| {
            let username_hit = p
                .username
                .as_deref()
                .map(|u| u.to_lowercase().contains(&needle))
                .unwrap_or(false);
            let genre_hit = p
                .preferred_genre
                .as_deref()
                .map(|g| g.to_lowercase().contains(&needle))
                .unwrap_or(false);
            username_hit || genre_hit
        });
    }
    Ok(response::ok(profiles))
}
