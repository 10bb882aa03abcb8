//! # jam-auth-simple
//!
//! Self-contained implementation of `IdentityProvider`: bearer tokens are
//! `base64(user id) "." hex(HMAC-SHA256(secret, base64(user id)))`, so any
//! process holding the shared secret can mint and verify them without a
//! network hop. Legacy-account passwords are hashed with Argon2.

use async_trait::async_trait;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString};
use argon2::{Argon2, PasswordVerifier};

use jam_core::traits::IdentityProvider;

type HmacSha256 = Hmac<Sha256>;

pub struct SimpleIdentityProvider {
    /// Shared signing secret (e.g., from an environment variable)
    secret: String,
}

impl SimpleIdentityProvider {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.to_string(),
        }
    }

    fn mac(&self) -> HmacSha256 {
        // HMAC accepts keys of any length, so this cannot fail.
        HmacSha256::new_from_slice(self.secret.as_bytes()).expect("hmac key")
    }

    /// Mints a token for a user id. Used by the seed tool and tests; a real
    /// deployment would swap this plugin for the hosted identity provider.
    pub fn issue_token(&self, user_id: &str) -> String {
        let payload = base64::engine::general_purpose::STANDARD.encode(user_id);
        let sig = self.mac().chain_update(payload.as_bytes()).finalize();
        format!("{}.{}", payload, hex::encode(sig.into_bytes()))
    }
}

#[async_trait]
impl IdentityProvider for SimpleIdentityProvider {
    /// Verifies `payload.signature`; anything that does not check out is
    /// `Ok(None)` rather than an error.
    async fn authenticate(&self, token: &str) -> anyhow::Result<Option<String>> {
        let Some((payload, sig_hex)) = token.split_once('.') else {
            return Ok(None);
        };
        let Ok(sig) = hex::decode(sig_hex) else {
            return Ok(None);
        };
        if self
            .mac()
            .chain_update(payload.as_bytes())
            .verify_slice(&sig)
            .is_err()
        {
            return Ok(None);
        }
        let Ok(raw) = base64::engine::general_purpose::STANDARD.decode(payload) else {
            return Ok(None);
        };
        match String::from_utf8(raw) {
            Ok(user_id) if !user_id.is_empty() => Ok(Some(user_id)),
            _ => Ok(None),
        }
    }

    fn hash_password(&self, password: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("argon2 hashing failed: {e}"))?;
        Ok(hash.to_string())
    }

    /// Verifies a password against a stored Argon2 hash.
    fn verify_password(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(p) => p,
            Err(_) => return false,
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}
