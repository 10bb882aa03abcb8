//! # Domain Models
//!
//! These structs represent the core entities of Jam Session.
//! We use UUID v7 for time-ordered, globally unique identification; its
//! hyphenated form sorts the same way as its bytes, which is what the
//! cursor-pagination contract in [`crate::query`] relies on.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

/// Anything persisted as a document in a store collection.
pub trait Document {
    fn id(&self) -> Uuid;
}

/// A musician's post on the newsfeed (looking for a band, sharing a take, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    /// Identity-provider user id of the author (an opaque string, not a record id)
    pub user_id: String,
    /// Denormalized display name for cheap rendering
    pub user_name: Option<String>,
    pub title: String,
    pub body: String,
    /// Free-form tags; facet tags use the "type:value" convention of [`crate::tags`]
    #[serde(default)]
    pub tags: Vec<String>,
    /// Optional reference to an AudioUpload record
    pub audio_upload_id: Option<Uuid>,
    pub album_art_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// What a comment is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParentKind {
    Post,
    AudioUpload,
}

/// A comment under a post or an audio upload. Comments may be anonymous,
/// so the author fields are optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub parent_type: ParentKind,
    pub parent_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Metadata record for an uploaded audio file. The bytes themselves live in
/// the blob store; `file_path` is the stored reference and `url` the public
/// playback location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioUpload {
    pub id: Uuid,
    pub user_id: String,
    pub filename: String,
    pub title: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub file_path: Option<String>,
    pub url: Option<String>,
    pub mime_type: Option<String>,
    pub original_name: Option<String>,
    pub size: Option<u64>,
    pub created_at: DateTime<Utc>,
}

/// A 1-5 star review of a post. The rating bound is enforced at write time
/// only; stored data is trusted on read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub post_id: Uuid,
    pub reviewer_user_id: String,
    pub reviewer_user_name: Option<String>,
    pub rating: u8,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Legacy self-hosted account. The password hash is stored with the document
/// but must never reach an HTTP response; handlers project through
/// [`SafeUser`] instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    #[serde(default)]
    pub instruments: Vec<String>,
    pub preferred_genre: Option<String>,
    pub location: Option<String>,
    pub contact: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Response projection of [`User`] with the password hash stripped.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeUser {
    pub id: Uuid,
    pub username: String,
    pub instruments: Vec<String>,
    pub preferred_genre: Option<String>,
    pub location: Option<String>,
    pub contact: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for SafeUser {
    fn from(user: User) -> Self {
        SafeUser {
            id: user.id,
            username: user.username,
            instruments: user.instruments,
            preferred_genre: user.preferred_genre,
            location: user.location,
            contact: user.contact,
            created_at: user.created_at,
        }
    }
}

/// Musician profile linked one-to-one to an external identity.
/// At most one profile exists per `user_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    /// Identity-provider user id this profile belongs to
    pub user_id: String,
    /// Globally unique display username
    pub username: Option<String>,
    #[serde(default)]
    pub instruments: Vec<String>,
    pub preferred_genre: Option<String>,
    pub location: Option<String>,
    pub contact: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Document for Post {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Document for Comment {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Document for AudioUpload {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Document for Review {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Document for User {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Document for Profile {
    fn id(&self) -> Uuid {
        self.id
    }
}
