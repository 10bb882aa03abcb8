//! In-memory [`JamStore`] implementation for tests and local development.
//!
//! `BTreeMap` behind `std::sync::RwLock` per collection. Semantics mirror
//! the persistent backends: whole-document reads, shallow merge updates,
//! last writer wins.

use std::collections::BTreeMap;
use std::sync::RwLock;

use anyhow::anyhow;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::merge_patch;
use crate::models::{AudioUpload, Comment, Document, Post, Profile, Review, User};
use crate::traits::{Collection, JamStore};

pub struct MemoryCollection<T> {
    docs: RwLock<BTreeMap<Uuid, T>>,
}

impl<T> MemoryCollection<T> {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<T> Default for MemoryCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> Collection<T> for MemoryCollection<T>
where
    T: Document + Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn insert(&self, doc: T) -> anyhow::Result<T> {
        let mut docs = self.docs.write().map_err(|_| anyhow!("lock poisoned"))?;
        docs.insert(doc.id(), doc.clone());
        Ok(doc)
    }

    async fn fetch_all(&self) -> anyhow::Result<Vec<T>> {
        let docs = self.docs.read().map_err(|_| anyhow!("lock poisoned"))?;
        Ok(docs.values().cloned().collect())
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<T>> {
        let docs = self.docs.read().map_err(|_| anyhow!("lock poisoned"))?;
        Ok(docs.get(&id).cloned())
    }

    async fn merge(&self, id: Uuid, patch: Value) -> anyhow::Result<Option<T>> {
        let mut docs = self.docs.write().map_err(|_| anyhow!("lock poisoned"))?;
        let Some(existing) = docs.get(&id) else {
            return Ok(None);
        };
        let merged = merge_patch(serde_json::to_value(existing)?, &patch);
        let updated: T = serde_json::from_value(merged)?;
        docs.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<Option<T>> {
        let mut docs = self.docs.write().map_err(|_| anyhow!("lock poisoned"))?;
        Ok(docs.remove(&id))
    }
}

/// All six collections, in memory.
#[derive(Default)]
pub struct MemoryStore {
    posts: MemoryCollection<Post>,
    comments: MemoryCollection<Comment>,
    audio_uploads: MemoryCollection<AudioUpload>,
    reviews: MemoryCollection<Review>,
    users: MemoryCollection<User>,
    profiles: MemoryCollection<Profile>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JamStore for MemoryStore {
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

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn sample_post() -> Post {
        Post {
            id: Uuid::now_v7(),
            user_id: "u1".to_string(),
            user_name: None,
            title: "first take".to_string(),
            body: "rough mix".to_string(),
            tags: vec!["genre:rock".to_string()],
            audio_upload_id: None,
            album_art_url: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn crud_round_trip() {
        let store = MemoryStore::new();
        let post = store.posts().insert(sample_post()).await.unwrap();

        let fetched = store.posts().get(post.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "first take");

        let updated = store
            .posts()
            .merge(post.id, json!({ "title": "final mix", "id": Uuid::now_v7() }))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "final mix");
        // id is immutable through merge
        assert_eq!(updated.id, post.id);

        let deleted = store.posts().delete(post.id).await.unwrap().unwrap();
        assert_eq!(deleted.title, "final mix");
        assert!(store.posts().get(post.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn merge_of_unknown_id_is_none() {
        let store = MemoryStore::new();
        let result = store
            .posts()
            .merge(Uuid::now_v7(), json!({ "title": "x" }))
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
