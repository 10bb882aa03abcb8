//! /api/reviews — reviews of posts, with ownership-checked mutation and the
//! aggregated summary the review widget renders.

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use jam_core::models::Review;
use jam_core::rating::{average_rating, star_count};
use jam_core::traits::Collection;
use jam_core::AppError;

use super::{require_str, AppState};
use crate::error::ApiError;
use crate::params::{parse_record_id, ListQuery};
use crate::response;

fn check_rating(rating: i64) -> Result<u8, ApiError> {
    if (1..=5).contains(&rating) {
        Ok(rating as u8)
    } else {
        Err(AppError::Validation("Rating must be between 1 and 5".to_string()).into())
    }
}

/// GET: single record by `id`, reviews of one post by `postId`, or all
/// reviews. Unpaginated, as the original.
pub async fn get_reviews(
    data: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let query = ListQuery::parse(req.query_string());

    if let Some(raw) = &query.id {
        let id = parse_record_id(raw)?;
        return match data.store.reviews().get(id).await? {
            Some(review) => Ok(response::ok(review)),
            None => Err(AppError::NotFound("Review", raw.clone()).into()),
        };
    }

    let mut reviews = data.store.reviews().fetch_all().await?;
    if let Some(raw) = &query.post_id {
        let post_id = parse_record_id(raw)?;
        reviews.retain(|r| r.post_id == post_id);
    }
    Ok(response::ok(reviews))
}

#[derive(Debug, Serialize)]
pub struct ReviewSummary {
    pub average: String,
    pub stars: u8,
    pub count: usize,
}

/// GET /api/reviews/summary?postId=… — display aggregate for one post.
pub async fn review_summary(
    data: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let query = ListQuery::parse(req.query_string());
    let raw = query
        .post_id
        .ok_or_else(|| ApiError::from(AppError::Validation(
            "Invalid or missing postId".to_string(),
        )))?;
    let post_id = parse_record_id(&raw)?;

    let mut reviews = data.store.reviews().fetch_all().await?;
    reviews.retain(|r| r.post_id == post_id);

    Ok(response::ok(ReviewSummary {
        average: average_rating(&reviews),
        stars: star_count(&reviews),
        count: reviews.len(),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewInput {
    pub post_id: Option<String>,
    pub reviewer_user_id: Option<String>,
    pub reviewer_user_name: Option<String>,
    pub rating: Option<i64>,
    pub comment: Option<String>,
}

/// POST: create a review. The reviewer's display name falls back to their
/// profile username when one resolves.
pub async fn create_review(
    data: web::Data<AppState>,
    input: web::Json<CreateReviewInput>,
) -> Result<HttpResponse, ApiError> {
    let input = input.into_inner();
    let reviewer_user_id = require_str(input.reviewer_user_id, "userId")?;
    let post_raw = require_str(input.post_id, "postId")?;
    let post_id = parse_record_id(&post_raw)?;
    let rating = check_rating(input.rating.unwrap_or(0))?;

    let reviewer_user_name = match input.reviewer_user_name {
        Some(name) => Some(name),
        None => data
            .store
            .profiles()
            .fetch_all()
            .await?
            .into_iter()
            .find(|p| p.user_id == reviewer_user_id)
            .and_then(|p| p.username),
    };

    let review = Review {
        id: Uuid::now_v7(),
        post_id,
        reviewer_user_id,
        reviewer_user_name,
        rating,
        comment: input.comment,
        created_at: Utc::now(),
    };
    let created = data.store.reviews().insert(review).await?;
    Ok(response::created(created))
}

/// PUT: partial merge by `id`, only by the original reviewer (403 otherwise).
pub async fn update_review(
    data: web::Data<AppState>,
    patch: web::Json<Value>,
) -> Result<HttpResponse, ApiError> {
    let patch = patch.into_inner();
    let id = super::patch_record_id(&patch)?;
    let caller = patch
        .get("reviewerUserId")
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::from(AppError::Validation("Missing userId".to_string())))?;

    let Some(existing) = data.store.reviews().get(id).await? else {
        return Err(AppError::NotFound("Review", id.to_string()).into());
    };
    if existing.reviewer_user_id != caller {
        return Err(AppError::Forbidden("not the reviewer".to_string()).into());
    }
    if let Some(raw) = patch.get("rating") {
        match raw.as_i64() {
            Some(rating) => {
                check_rating(rating)?;
            }
            None => {
                return Err(
                    AppError::Validation("Rating must be between 1 and 5".to_string()).into(),
                )
            }
        }
    }

    match data.store.reviews().merge(id, patch).await? {
        Some(review) => Ok(response::ok(review)),
        None => Err(AppError::NotFound("Review", id.to_string()).into()),
    }
}

/// DELETE: `id` + `userId` query parameters; only the original reviewer may
/// delete (403 otherwise).
pub async fn delete_review(
    data: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let query = ListQuery::parse(req.query_string());
    let raw = query
        .id
        .ok_or_else(|| ApiError::from(AppError::Validation("Invalid or missing ID".to_string())))?;
    let id = parse_record_id(&raw)?;
    let caller = query
        .user_id
        .ok_or_else(|| ApiError::from(AppError::Validation("Missing userId".to_string())))?;

    let Some(existing) = data.store.reviews().get(id).await? else {
        return Err(AppError::NotFound("Review", raw).into());
    };
    if existing.reviewer_user_id != caller {
        return Err(AppError::Forbidden("not the reviewer".to_string()).into());
    }

    match data.store.reviews().delete(id).await? {
        Some(review) => Ok(response::ok(review)),
        None => Err(AppError::NotFound("Review", raw).into()),
    }
}
