//! # jam-store-sqlite
//!
//! SQLite-backed implementation of the `JamStore` port. Entities are kept
//! as JSON text documents in a single `documents` table keyed by
//! `(collection, id)`, which gives the document-store semantics the domain
//! expects (whole-document reads, shallow merges, last writer wins) on an
//! embedded engine. Ids are stored as hyphenated UUID text so the primary
//! key sorts the same way the pagination cursor does.

use std::marker::PhantomData;
use std::str::FromStr;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use uuid::Uuid;

use jam_core::models::{AudioUpload, Comment, Document, Post, Profile, Review, User};
use jam_core::store::merge_patch;
use jam_core::traits::{Collection, JamStore};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS documents (
    collection TEXT NOT NULL,
    id         TEXT NOT NULL,
    doc        TEXT NOT NULL,
    PRIMARY KEY (collection, id)
)";

/// One typed view over the shared `documents` table.
pub struct SqliteCollection<T> {
    pool: SqlitePool,
    collection: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> SqliteCollection<T> {
    fn new(pool: SqlitePool, collection: &'static str) -> Self {
        Self {
            pool,
            collection,
            _marker: PhantomData,
        }
    }
}

fn decode<T: DeserializeOwned>(doc: &str) -> anyhow::Result<T> {
    Ok(serde_json::from_str(doc)?)
}

#[async_trait]
impl<T> Collection<T> for SqliteCollection<T>
where
    T: Document + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn insert(&self, doc: T) -> anyhow::Result<T> {
        sqlx::query("INSERT INTO documents (collection, id, doc) VALUES (?, ?, ?)")
            .bind(self.collection)
            .bind(doc.id().to_string())
            .bind(serde_json::to_string(&doc)?)
            .execute(&self.pool)
            .await?;
        Ok(doc)
    }

    async fn fetch_all(&self) -> anyhow::Result<Vec<T>> {
        let rows = sqlx::query("SELECT doc FROM documents WHERE collection = ?")
            .bind(self.collection)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| decode(row.get::<String, _>("doc").as_str()))
            .collect()
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<T>> {
        let row = sqlx::query("SELECT doc FROM documents WHERE collection = ? AND id = ?")
            .bind(self.collection)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| decode(row.get::<String, _>("doc").as_str()))
            .transpose()
    }

    /// Read-merge-write inside one transaction so concurrent merges cannot
    /// interleave between the read and the write.
    async fn merge(&self, id: Uuid, patch: Value) -> anyhow::Result<Option<T>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT doc FROM documents WHERE collection = ? AND id = ?")
            .bind(self.collection)
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };

        let current: Value = serde_json::from_str(&row.get::<String, _>("doc"))?;
        let merged = merge_patch(current, &patch);
        // Round-trip through the typed model so a patch cannot corrupt the
        // stored document shape.
        let updated: T = serde_json::from_value(merged)?;

        sqlx::query("UPDATE documents SET doc = ? WHERE collection = ? AND id = ?")
            .bind(serde_json::to_string(&updated)?)
            .bind(self.collection)
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(updated))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<Option<T>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT doc FROM documents WHERE collection = ? AND id = ?")
            .bind(self.collection)
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let doc: T = decode(row.get::<String, _>("doc").as_str())?;

        sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
            .bind(self.collection)
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(doc))
    }
}

pub struct SqliteStore {
    posts: SqliteCollection<Post>,
    comments: SqliteCollection<Comment>,
    audio_uploads: SqliteCollection<AudioUpload>,
    reviews: SqliteCollection<Review>,
    users: SqliteCollection<User>,
    profiles: SqliteCollection<Profile>,
}

impl SqliteStore {
    /// Connects (creating the database file if needed) and ensures the
    /// schema exists.
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        sqlx::query(SCHEMA).execute(&pool).await?;
        log::info!("sqlite document store ready at {url}");

        Ok(Self {
            posts: SqliteCollection::new(pool.clone(), "posts"),
            comments: SqliteCollection::new(pool.clone(), "comments"),
            audio_uploads: SqliteCollection::new(pool.clone(), "audio_uploads"),
            reviews: SqliteCollection::new(pool.clone(), "reviews"),
            users: SqliteCollection::new(pool.clone(), "users"),
            profiles: SqliteCollection::new(pool, "profiles"),
        })
    }
}

impl JamStore for SqliteStore {
    fn posts(&self) -> &dyn Collection<Post> {
        &self.posts
    }

    fn comments(&self) -> &dyn Collection<Comment> {
        &self.comments
    }

    fn audio_uploads(&self) -> &dyn Collection<AudioUpload> {
        &self.audio_uploads
    }

    fn reviews(&self) -> &dyn Collection<Review> {
        &self.reviews
    }

    fn users(&self) -> &dyn Collection<User> {
        &self.users
    }

    fn profiles(&self) -> &dyn Collection<Profile> {
        &self.profiles
    }
}
