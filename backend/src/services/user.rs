//! User directory: registration, login and token resolution
//!
//! Two entry points:
//! - [`UserDirectory`] works on the whole user collection
//!   (create, find by credentials, resolve a token)
//! - [`Account`] works on one loaded user
//!   (public profile, open a session, revoke a token, change password, delete)
//!
//! # Performance
//!
//! - Password hashing/verification runs on the blocking thread pool
//! - The token codec is shared by reference (keys derived once at startup)

use crate::auth::{PasswordService, TokenCodec};
use crate::error::ApiError;
use crate::repositories::{NewUser, UserStore};
use std::sync::Arc;
use todo_api_shared::validation::{normalize_email, validate_email, validate_password};
use todo_api_shared::{AuthError, TokenPurpose, TokenRecord, User, UserProfile, ValidationError};
use tracing::{debug, info};
use uuid::Uuid;

/// Collection-scoped user operations
#[derive(Clone)]
pub struct UserDirectory {
    store: Arc<dyn UserStore>,
    codec: TokenCodec,
    passwords: PasswordService,
}

impl UserDirectory {
    pub fn new(store: Arc<dyn UserStore>, codec: TokenCodec, passwords: PasswordService) -> Self {
        Self {
            store,
            codec,
            passwords,
        }
    }

    /// Underlying store, for readiness probes
    pub fn store(&self) -> &dyn UserStore {
        self.store.as_ref()
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Register a new user
    ///
    /// The password is hashed exactly once here; the plaintext never reaches
    /// the store.
    pub async fn create(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let email = normalize_email(email);
        validate_email(&email)?;
        validate_password(password)?;

        if self.store.email_exists(&email).await? {
            return Err(ValidationError::DuplicateEmail.into());
        }

        let password_hash = self
            .passwords
            .hash_async(password.to_string())
            .await
            .map_err(ApiError::Internal)?;

        // A concurrent registration can still win the unique index; the
        // store reports it as DuplicateEmail.
        let user = self
            .store
            .insert_user(NewUser {
                id: Uuid::new_v4(),
                email,
                password_hash,
            })
            .await?;

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Look a user up by email and password
    ///
    /// Unknown email and wrong password fail identically.
    pub async fn find_by_credentials(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let email = normalize_email(email);
        let user = self
            .store
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let valid =
            PasswordService::verify_async(password.to_string(), user.password_hash.clone()).await;
        if !valid {
            debug!(user_id = %user.id, "Password mismatch");
            return Err(AuthError::InvalidCredentials.into());
        }

        Ok(user)
    }

    /// Map a presented token back to its live owner
    ///
    /// Requires both a valid signature and the token still being registered
    /// against the user with purpose `auth`.
    pub async fn resolve_token(&self, token: &str) -> Result<User, ApiError> {
        let claims = self.codec.verify(token)?;
        if claims.access != TokenPurpose::Auth {
            return Err(AuthError::InvalidToken.into());
        }

        match self
            .store
            .find_by_token(claims.sub, token, TokenPurpose::Auth)
            .await?
        {
            Some(user) => Ok(user),
            None => {
                debug!(user_id = %claims.sub, "Token signature valid but not registered");
                Err(AuthError::InvalidToken.into())
            }
        }
    }

    /// Operations scoped to one user
    pub fn account<'a>(&'a self, user: &'a User) -> Account<'a> {
        Account {
            directory: self,
            user,
        }
    }
}

/// User-scoped operations on an already loaded user
///
/// The borrowed [`User`] is a snapshot; mutations go straight to the store
/// and are not reflected in it.
pub struct Account<'a> {
    directory: &'a UserDirectory,
    user: &'a User,
}

impl Account<'_> {
    /// Outward representation: id and email only
    pub fn profile(&self) -> UserProfile {
        self.user.profile()
    }

    /// Sign a new `auth` token and register it against the user
    ///
    /// Existing sessions stay valid.
    pub async fn issue_session(&self) -> Result<String, ApiError> {
        let token = self
            .directory
            .codec
            .issue(self.user.id, TokenPurpose::Auth)
            .map_err(ApiError::Internal)?;

        let stored = self
            .directory
            .store
            .push_token(self.user.id, &TokenRecord::auth(token.clone()))
            .await?;
        if !stored {
            return Err(ApiError::NotFound("User not found".to_string()));
        }

        debug!(user_id = %self.user.id, "Session issued");
        Ok(token)
    }

    /// Remove a token from the user. Removing an absent token is not an error.
    pub async fn revoke_token(&self, token: &str) -> Result<(), ApiError> {
        let removed = self.directory.store.pull_token(self.user.id, token).await?;
        debug!(user_id = %self.user.id, removed, "Token revoked");
        Ok(())
    }

    /// Replace the password, hashing only if it actually changed
    ///
    /// Returns whether a new hash was written.
    pub async fn change_password(&self, new_password: &str) -> Result<bool, ApiError> {
        validate_password(new_password)?;

        let Some(password_hash) = self
            .directory
            .passwords
            .hash_if_changed(new_password, &self.user.password_hash)
            .await
            .map_err(ApiError::Internal)?
        else {
            return Ok(false);
        };

        if !self
            .directory
            .store
            .update_password_hash(self.user.id, &password_hash)
            .await?
        {
            return Err(ApiError::NotFound("User not found".to_string()));
        }

        info!(user_id = %self.user.id, "Password changed");
        Ok(true)
    }

    /// Delete the user with all sessions and todos
    pub async fn delete(&self) -> Result<(), ApiError> {
        self.directory.store.delete_user(self.user.id).await?;
        info!(user_id = %self.user.id, "User deleted");
        Ok(())
    }
}
