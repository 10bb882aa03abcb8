//! Query-string parsing for the list endpoints.
//!
//! `instrument` and `genre` are repeatable, which rules out the plain
//! `web::Query` extractor, so the raw query string is parsed here instead.
//! Cursor and limit are permissive: a value that does not parse falls back
//! to "no cursor" / the default page size rather than failing the request.

use url::form_urlencoded;
use uuid::Uuid;

use jam_core::query::{FacetFilter, DEFAULT_PAGE_SIZE};
use jam_core::AppError;

use crate::error::ApiError;

#[derive(Debug, Default, Clone)]
pub struct ListQuery {
    pub id: Option<String>,
    pub user_id: Option<String>,
    pub post_id: Option<String>,
    pub parent_id: Option<String>,
    pub search: Option<String>,
    pub skill: Option<String>,
    pub instruments: Vec<String>,
    pub genres: Vec<String>,
    pub cursor: Option<String>,
    pub limit: Option<String>,
}

impl ListQuery {
    pub fn parse(query: &str) -> Self {
        let mut parsed = ListQuery::default();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let value = value.into_owned();
            match key.as_ref() {
                "id" => parsed.id = Some(value),
                "userId" => parsed.user_id = Some(value),
                "postId" => parsed.post_id = Some(value),
                "parentId" => parsed.parent_id = Some(value),
                "search" => parsed.search = Some(value),
                "skill" => parsed.skill = Some(value),
                "instrument" => parsed.instruments.push(value),
                "genre" => parsed.genres.push(value),
                "cursor" => parsed.cursor = Some(value),
                "limit" => parsed.limit = Some(value),
                _ => {}
            }
        }
        parsed
    }

    /// Requested page size; non-numeric or zero falls back to the default.
    /// The engine applies the upper clamp.
    pub fn page_size(&self) -> usize {
        self.limit
            .as_deref()
            .and_then(|raw| raw.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }

    /// Cursor as a record id; anything unparseable means "start at the top".
    pub fn cursor_id(&self) -> Option<Uuid> {
        self.cursor
            .as_deref()
            .and_then(|raw| Uuid::parse_str(raw).ok())
    }

    pub fn facet_filter(&self) -> FacetFilter {
        FacetFilter {
            skill: self.skill.clone().filter(|s| !s.is_empty()),
            instruments: self.instruments.clone(),
            genres: self.genres.clone(),
        }
    }
}

/// Strict record-id parsing for parameters that must be well-formed
/// (`id`, `postId`, `parentId`) — malformed values are a 400.
pub fn parse_record_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| AppError::Validation("Invalid ID format".to_string()).into())
}
