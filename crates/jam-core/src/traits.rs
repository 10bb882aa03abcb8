//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::models::{AudioUpload, Comment, Document, Post, Profile, Review, User};

/// One document collection of the record store.
///
/// List endpoints always read through `fetch_all` and filter in application
/// memory (see [`crate::query`]); the store itself only speaks ids and whole
/// documents. Updates are shallow partial-field merges with last-writer-wins
/// semantics, and the `id` field of a stored document is immutable.
#[async_trait]
pub trait Collection<T>: Send + Sync
where
    T: Document,
{
    /// Persists a new document under its own id.
    async fn insert(&self, doc: T) -> anyhow::Result<T>;

    /// Returns the full, unordered collection.
    async fn fetch_all(&self) -> anyhow::Result<Vec<T>>;

    /// Looks a document up by id.
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<T>>;

    /// Merges the top-level fields of `patch` into the stored document and
    /// returns the updated document, or `None` if the id is unknown.
    async fn merge(&self, id: Uuid, patch: Value) -> anyhow::Result<Option<T>>;

    /// Removes a document and returns it, or `None` if the id is unknown.
    async fn delete(&self, id: Uuid) -> anyhow::Result<Option<T>>;
}

/// Data persistence contract bundling the six entity collections.
pub trait JamStore: Send + Sync {
    fn posts(&self) -> &dyn Collection<Post>;
    fn comments(&self) -> &dyn Collection<Comment>;
    fn audio_uploads(&self) -> &dyn Collection<AudioUpload>;
    fn reviews(&self) -> &dyn Collection<Review>;
    fn users(&self) -> &dyn Collection<User>;
    fn profiles(&self) -> &dyn Collection<Profile>;
}

/// Where a stored blob ended up.
#[derive(Debug, Clone)]
pub struct StoredBlob {
    /// Stored reference, relative to the blob root (e.g. "audio/u1/17-demo.mp3")
    pub file_path: String,
    /// Public URL for playback
    pub url: String,
}

/// Blob storage contract for uploaded audio files.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Saves raw bytes under a relative path and returns the stored reference
    /// plus the public URL.
    async fn put(&self, path: &str, data: Vec<u8>, content_type: &str) -> anyhow::Result<StoredBlob>;
}

/// Identity contract. Authentication itself is delegated to whatever issued
/// the bearer token; this port only verifies tokens and handles password
/// hashing for legacy accounts.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verifies a bearer token and returns the user id it names.
    /// An invalid token is `Ok(None)`, not an error.
    async fn authenticate(&self, token: &str) -> anyhow::Result<Option<String>>;

    /// Hashes a plaintext password for storage.
    fn hash_password(&self, password: &str) -> anyhow::Result<String>;

    /// Verifies a plaintext password against a stored hash.
    fn verify_password(&self, password: &str, hash: &str) -> bool;
}
