//! Password hashing using bcrypt
//!
//! Provides salted one-way hashing and verification of user passwords.
//!
//! # Performance Considerations
//!
//! bcrypt is intentionally CPU-intensive. Request handlers must use the
//! `*_async` variants, which run the work on the blocking thread pool.

use anyhow::Result;
use todo_api_shared::validation::MAX_PASSWORD_LEN;
use tracing::warn;

/// Password hashing service
///
/// Produces self-describing `$2b$<cost>$<salt><digest>` strings, so the salt
/// and work factor needed for verification always travel with the hash.
#[derive(Debug, Clone, Copy)]
pub struct PasswordService {
    cost: u32,
}

impl PasswordService {
    /// Create a hasher with the given bcrypt work factor (4..=31)
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Work factor used for new hashes
    #[inline]
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a password with a fresh random salt (blocking operation)
    ///
    /// Input past bcrypt's 72-byte window is refused rather than truncated.
    pub fn hash(&self, password: &str) -> Result<String> {
        if password.len() > MAX_PASSWORD_LEN {
            anyhow::bail!("Password exceeds {} bytes", MAX_PASSWORD_LEN);
        }
        bcrypt::hash(password, self.cost)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))
    }

    /// Verify a password against a stored hash (blocking operation)
    ///
    /// A malformed hash never verifies; it is not an error. Neither does a
    /// password longer than anything [`hash`](Self::hash) accepts.
    pub fn verify(password: &str, hash: &str) -> bool {
        if password.len() > MAX_PASSWORD_LEN {
            return false;
        }
        match bcrypt::verify(password, hash) {
            Ok(valid) => valid,
            Err(e) => {
                warn!(error = %e, "Stored password hash could not be parsed");
                false
            }
        }
    }

    /// Hash a password on the blocking thread pool
    pub async fn hash_async(&self, password: String) -> Result<String> {
        let service = *self;
        tokio::task::spawn_blocking(move || service.hash(&password))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }

    /// Verify a password on the blocking thread pool
    pub async fn verify_async(password: String, hash: String) -> bool {
        match tokio::task::spawn_blocking(move || Self::verify(&password, &hash)).await {
            Ok(valid) => valid,
            Err(e) => {
                warn!(error = %e, "Password verification task failed");
                false
            }
        }
    }

    /// Write-path guard: hash `candidate` only if it is not already the
    /// password behind `stored_hash`.
    ///
    /// Returns `None` when the stored hash should be kept as is.
    pub async fn hash_if_changed(&self, candidate: &str, stored_hash: &str) -> Result<Option<String>> {
        if Self::verify_async(candidate.to_string(), stored_hash.to_string()).await {
            return Ok(None);
        }
        self.hash_async(candidate.to_string()).await.map(Some)
    }
}
