//! Bearer token issuing and verification
//!
//! Tokens are HS256-signed JWTs carrying the user id and a purpose tag.
//! They never expire on their own; a token stops working when its record is
//! removed from the owning user (see `services::user`).

use anyhow::Result;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use todo_api_shared::{AuthError, TokenPurpose};
use uuid::Uuid;

/// Claims embedded in every token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: Uuid,
    /// Purpose tag
    pub access: TokenPurpose,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Unique token id, keeps same-second tokens distinct
    pub jti: Uuid,
}

/// Signing and verification keys derived from the process secret
#[derive(Clone)]
struct TokenKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl TokenKeys {
    fn new(secret: &[u8]) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret)),
            decoding: Arc::new(DecodingKey::from_secret(secret)),
        }
    }
}

/// Token codec
///
/// Built once at startup from configuration and cloned into the app state;
/// every clone shares the same keys.
#[derive(Clone)]
pub struct TokenCodec {
    keys: TokenKeys,
    validation: Arc<Validation>,
}

impl TokenCodec {
    pub fn new(secret: &SecretString) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // No exp: revocation happens in storage
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        Self {
            keys: TokenKeys::new(secret.expose_secret().as_bytes()),
            validation: Arc::new(validation),
        }
    }

    /// Sign a new token for `user_id`
    pub fn issue(&self, user_id: Uuid, purpose: TokenPurpose) -> Result<String> {
        let claims = Claims {
            sub: user_id,
            access: purpose,
            iat: Utc::now().timestamp(),
            jti: Uuid::new_v4(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.keys.encoding)
            .map_err(|e| anyhow::anyhow!("Failed to sign {} token: {}", purpose, e))
    }

    /// Check signature and shape of a token
    ///
    /// Does not consult storage: a verified token may still be revoked.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.keys.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)
    }
}
