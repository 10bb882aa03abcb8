//! The uniform JSON response envelope:
//! `{ success, data, error?, count?, nextCursor? }`.
//!
//! `nextCursor` is only present on list responses, where `null` explicitly
//! signals an exhausted listing (as opposed to the key being absent).

use actix_web::HttpResponse;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<Option<Uuid>>,
}

impl<T: Serialize> Envelope<T> {
    pub fn success(data: T) -> Self {
        Envelope {
            success: true,
            data: Some(data),
            error: None,
            count: None,
            next_cursor: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Envelope {
            success: false,
            data: None,
            error: Some(message.into()),
            count: None,
            next_cursor: None,
        }
    }
}

/// 200 with a single record (or any serializable payload) in `data`.
pub fn ok<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(Envelope::success(data))
}

/// 201 for freshly created records.
pub fn created<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Created().json(Envelope::success(data))
}

/// 200 with a page of records, its length, and the resume cursor.
pub fn list<T: Serialize>(items: Vec<T>, next_cursor: Option<Uuid>) -> HttpResponse {
    let count = items.len();
    HttpResponse::Ok().json(Envelope {
        success: true,
        data: Some(items),
        error: None,
        count: Some(count),
        next_cursor: Some(next_cursor),
    })
}
